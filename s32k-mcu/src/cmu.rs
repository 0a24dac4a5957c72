//! Clock Monitor Unit driver.

use crate::config::clock::MonitorConfig;
use crate::reg::cmu::{self, gcr, ier, rccr, sr, tcr};

/// CMU driver (one instance).
pub struct Cmu<'a> {
    regs: &'a cmu::RegisterBlock,
}

impl<'a> Cmu<'a> {
    /// Create a driver over the given register block.
    pub fn new(regs: &'a cmu::RegisterBlock) -> Self {
        Self { regs }
    }

    /// Program the monitor window and switch the frequency check on.
    ///
    /// Callers must only do this once the monitored clock is confirmed
    /// running; a monitor started against a dead clock trips immediately.
    pub fn configure(&self, cfg: &MonitorConfig) {
        self.regs.gcr.set(0);
        self.regs.sr.set(sr::FLAGS);
        self.regs
            .rccr
            .set(u32::from(cfg.reference_count) << rccr::REF_CNT_SHIFT);
        self.regs.htcr.set(cfg.high_threshold & tcr::THRESHOLD_MASK);
        self.regs.ltcr.set(cfg.low_threshold & tcr::THRESHOLD_MASK);
        let mut word = 0;
        if cfg.interrupt_on_low {
            word |= ier::FLLIE;
        }
        if cfg.interrupt_on_high {
            word |= ier::FHHIE;
        }
        self.regs.ier.set(word);
        self.regs.gcr.set(gcr::FCE);
    }

    /// Stop the frequency check and clear any recorded fault.
    pub fn disable(&self) {
        self.regs.gcr.set(0);
        self.regs.sr.set(sr::FLAGS);
    }

    /// Asserted fault flags.
    pub fn pending(&self) -> u32 {
        self.regs.sr.get() & sr::FLAGS
    }

    /// Clear the given fault flags (write-1-to-clear).
    pub fn clear(&self, flags: u32) {
        self.regs.sr.set(flags & sr::FLAGS);
    }
}
