//! Reset Control Module driver.

use crate::config::{PinFilter, ResetConfig, ResetSources};
use crate::reg::rcm::{self, rpc, rstfltsrw, srie, srs};

/// RCM driver.
pub struct Rcm<'a> {
    regs: &'a rcm::RegisterBlock,
}

impl<'a> Rcm<'a> {
    /// Create a driver over the given register block.
    pub fn new(regs: &'a rcm::RegisterBlock) -> Self {
        Self { regs }
    }

    /// Program reset pin filtering and reset interrupt routing.
    pub fn apply(&self, cfg: &ResetConfig) {
        let mut word = match cfg.pin_filter {
            PinFilter::Disabled => rstfltsrw::DISABLED << rpc::RSTFLTSRW_SHIFT,
            PinFilter::BusClock(width) => {
                let width = width.clamp(1, 32);
                rstfltsrw::BUS_CLOCK << rpc::RSTFLTSRW_SHIFT
                    | u32::from(width - 1) << rpc::RSTFLTSEL_SHIFT
            }
            PinFilter::LpoClock => rstfltsrw::LPO_CLOCK << rpc::RSTFLTSRW_SHIFT,
        };
        if cfg.pin_filter_in_stop {
            word |= rpc::RSTFLTSS;
        }
        self.regs.rpc.set(word);

        self.regs.srie.set(
            cfg.interrupts.sources.bits()
                | (cfg.interrupts.delay as u32) << srie::DELAY_SHIFT,
        );
    }

    /// Reset sources recorded for the most recent reset.
    pub fn reset_sources(&self) -> ResetSources {
        ResetSources::from_bits(self.regs.srs.get() & srs::ALL)
    }

    /// Raw reset status word.
    pub fn raw_status(&self) -> u32 {
        self.regs.srs.get()
    }

    /// Clear the sticky reset status accumulated since the last read-out.
    pub fn clear_sticky(&self) {
        self.regs.ssrs.set(srs::ALL);
    }
}
