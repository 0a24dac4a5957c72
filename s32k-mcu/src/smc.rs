//! System Mode Controller driver.

use crate::config::{ModeProtection, PowerMode};
use crate::reg::smc::{self, pmctrl, pmprot, pmstat, runm, stopctrl, stopm};
use crate::reg::Rmw;
use core::convert::Infallible;

/// SMC driver.
pub struct Smc<'a> {
    regs: &'a smc::RegisterBlock,
}

impl<'a> Smc<'a> {
    /// Create a driver over the given register block.
    pub fn new(regs: &'a smc::RegisterBlock) -> Self {
        Self { regs }
    }

    /// Program the power mode protection register.
    ///
    /// The hardware latches the first write after reset; later writes are
    /// ignored, which is why this runs once during `init` and never again.
    pub fn set_mode_protection(&self, cfg: &ModeProtection) {
        let mut word = 0;
        if cfg.allow_very_low_power {
            word |= pmprot::AVLP;
        }
        if cfg.allow_high_speed {
            word |= pmprot::AHSRUN;
        }
        self.regs.pmprot.set(word);
    }

    /// Request a run-family mode transition.
    pub fn request_run_mode(&self, mode: PowerMode) {
        let bits = match mode {
            PowerMode::HighSpeedRun => runm::HSRUN,
            PowerMode::VeryLowPowerRun => runm::VLPR,
            _ => runm::RUN,
        };
        self.regs
            .pmctrl
            .modify(|r| r & !pmctrl::RUNM_MASK | bits << pmctrl::RUNM_SHIFT);
    }

    /// Prepare a stop-family mode; the transition happens when the core
    /// executes its sleep instruction.
    pub fn request_stop_mode(&self, mode: PowerMode) {
        let (stop, option) = match mode {
            PowerMode::Stop2 => (stopm::STOP, Some(stopctrl::STOPO_STOP2)),
            PowerMode::VeryLowPowerStop => (stopm::VLPS, None),
            _ => (stopm::STOP, Some(stopctrl::STOPO_STOP1)),
        };
        if let Some(option) = option {
            self.regs
                .stopctrl
                .modify(|r| r & !stopctrl::STOPO_MASK | option << stopctrl::STOPO_SHIFT);
        }
        self.regs
            .pmctrl
            .modify(|r| r & !pmctrl::STOPM_MASK | stop << pmctrl::STOPM_SHIFT);
    }

    /// Probe whether the mode status register reached the given run mode.
    pub fn mode_reached(&self, mode: PowerMode) -> nb::Result<(), Infallible> {
        let expected = match mode {
            PowerMode::HighSpeedRun => pmstat::HSRUN,
            PowerMode::VeryLowPowerRun => pmstat::VLPR,
            _ => pmstat::RUN,
        };
        if self.regs.pmstat.get() == expected {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Raw power mode status.
    pub fn current_mode(&self) -> u32 {
        self.regs.pmstat.get()
    }
}
