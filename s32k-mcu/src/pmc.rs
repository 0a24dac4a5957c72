//! Power Management Controller driver.

use crate::config::LowVoltageConfig;
use crate::reg::pmc::{self, lvdsc1, lvdsc2, regsc};

/// PMC driver.
pub struct Pmc<'a> {
    regs: &'a pmc::RegisterBlock,
}

impl<'a> Pmc<'a> {
    /// Create a driver over the given register block.
    pub fn new(regs: &'a pmc::RegisterBlock) -> Self {
        Self { regs }
    }

    /// Program the low-voltage detect/warn circuitry.
    ///
    /// The acknowledge bits are written along with the configuration so
    /// stale detect/warn flags from before init do not fire an interrupt
    /// the moment it gets enabled.
    pub fn apply(&self, cfg: &LowVoltageConfig) {
        let mut word = lvdsc1::LVDACK;
        if cfg.detect_reset {
            word |= lvdsc1::LVDRE;
        }
        if cfg.detect_interrupt {
            word |= lvdsc1::LVDIE;
        }
        self.regs.lvdsc1.set(word);

        let mut word = lvdsc2::LVWACK;
        if cfg.warning_interrupt {
            word |= lvdsc2::LVWIE;
        }
        self.regs.lvdsc2.set(word);

        let mut word = 0;
        if cfg.bias {
            word |= regsc::BIASEN;
        }
        if cfg.stop_clock_bias_disabled {
            word |= regsc::CLKBIASDIS;
        }
        if cfg.lpo_disabled {
            word |= regsc::LPODIS;
        }
        self.regs.regsc.set(word);
    }
}
