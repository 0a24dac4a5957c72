//! System Clock Generator driver.
//!
//! Thin read-modify-write layer over the SCG register block. The methods
//! here program exactly one source or mux each and never wait; the bounded
//! valid-bit polling and the mandated ordering between sources live in
//! [`Mcu::init_clock`](crate::driver::Mcu::init_clock).

use crate::config::clock::{
    FircConfig, MonitorAction, ScgClkout, SircConfig, SircRange, SoscConfig, SoscMode, SourceDivider,
    SpllConfig, SystemClockConfig, SystemClockSetting, SystemClockSource, SystemDividers,
};
use crate::reg::scg::{self, csr, firccsr, sirccsr, sosccfg, sosccsr, spllcfg, spllcsr};
use crate::reg::Rmw;
use core::convert::Infallible;

/// SCG driver.
pub struct Scg<'a> {
    regs: &'a scg::RegisterBlock,
}

fn div_word(div1: SourceDivider, div2: SourceDivider) -> u32 {
    div1.bits() << scg::div::DIV1_SHIFT | div2.bits() << scg::div::DIV2_SHIFT
}

fn setting_word(setting: &SystemClockSetting) -> u32 {
    setting.source.bits() << csr::SCS_SHIFT
        | setting.dividers.core.bits() << csr::DIVCORE_SHIFT
        | setting.dividers.bus.bits() << csr::DIVBUS_SHIFT
        | setting.dividers.slow.bits() << csr::DIVSLOW_SHIFT
}

fn ready(valid: bool) -> nb::Result<(), Infallible> {
    if valid {
        Ok(())
    } else {
        Err(nb::Error::WouldBlock)
    }
}

impl<'a> Scg<'a> {
    /// Create a driver over the given register block.
    pub fn new(regs: &'a scg::RegisterBlock) -> Self {
        Self { regs }
    }

    /// Program and enable the slow IRC.
    ///
    /// The source is disabled first; the range field only accepts writes
    /// while the source is off. Every full-word CSR write also clears the
    /// LK bit, so a previously locked source becomes writable again.
    pub fn configure_sirc(&self, cfg: &SircConfig) {
        self.regs.sirccsr.set(0);
        self.regs.sirccfg.set(match cfg.range {
            SircRange::Range2MHz => 0,
            SircRange::Range8MHz => scg::sirccfg::RANGE,
        });
        self.regs.sircdiv.set(div_word(cfg.div1, cfg.div2));
        let mut word = sirccsr::EN;
        if cfg.enable_in_stop {
            word |= sirccsr::STEN;
        }
        if cfg.enable_in_low_power {
            word |= sirccsr::LPEN;
        }
        self.regs.sirccsr.set(word);
    }

    /// Slow IRC valid-bit probe.
    pub fn sirc_valid(&self) -> nb::Result<(), Infallible> {
        ready(self.regs.sirccsr.get() & sirccsr::VLD != 0)
    }

    /// Program and enable the fast IRC.
    pub fn configure_firc(&self, cfg: &FircConfig) {
        // Disabling also clears a stale monitor fault flag.
        self.regs.firccsr.set(firccsr::ERR);
        // 48 MHz is the only trimmed range on this part.
        self.regs.firccfg.set(0);
        self.regs.fircdiv.set(div_word(cfg.div1, cfg.div2));
        let mut word = firccsr::EN;
        if !cfg.regulator {
            word |= firccsr::REGOFF;
        }
        self.regs.firccsr.set(word);
    }

    /// Switch the fast IRC off.
    pub fn disable_firc(&self) {
        self.regs.firccsr.set(0);
    }

    /// Fast IRC valid-bit probe.
    pub fn firc_valid(&self) -> nb::Result<(), Infallible> {
        ready(self.regs.firccsr.get() & firccsr::VLD != 0)
    }

    /// Program and enable the system oscillator. The clock monitor is not
    /// touched here; enable it with [`Scg::enable_sosc_monitor`] once the
    /// oscillator reported valid.
    pub fn configure_sosc(&self, cfg: &SoscConfig) {
        self.regs.sosccsr.set(sosccsr::ERR);
        let mut word = cfg.range() << sosccfg::RANGE_SHIFT;
        if let SoscMode::Crystal { high_gain } = cfg.mode {
            word |= sosccfg::EREFS;
            if high_gain {
                word |= sosccfg::HGO;
            }
        }
        self.regs.sosccfg.set(word);
        self.regs.soscdiv.set(div_word(cfg.div1, cfg.div2));
        self.regs.sosccsr.set(sosccsr::EN);
    }

    /// Switch the system oscillator off.
    pub fn disable_sosc(&self) {
        self.regs.sosccsr.set(0);
    }

    /// System oscillator valid-bit probe.
    pub fn sosc_valid(&self) -> nb::Result<(), Infallible> {
        ready(self.regs.sosccsr.get() & sosccsr::VLD != 0)
    }

    /// Enable the oscillator loss-of-clock monitor.
    pub fn enable_sosc_monitor(&self, action: MonitorAction) {
        let mut bits = sosccsr::CM;
        if matches!(action, MonitorAction::Reset) {
            bits |= sosccsr::CMRE;
        }
        self.regs.sosccsr.set_bits(bits);
    }

    /// Program and enable the system PLL. Parameter ranges are checked by
    /// [`ClockConfig::validate`](crate::config::clock::ClockConfig::validate)
    /// before this is reached.
    pub fn configure_spll(&self, cfg: &SpllConfig) {
        self.regs.spllcsr.set(spllcsr::ERR);
        self.regs.spllcfg.set(
            u32::from(cfg.prediv - 1) << spllcfg::PREDIV_SHIFT
                | u32::from(cfg.mult - 16) << spllcfg::MULT_SHIFT,
        );
        self.regs.splldiv.set(div_word(cfg.div1, cfg.div2));
        self.regs.spllcsr.set(spllcsr::EN);
    }

    /// Switch the system PLL off.
    pub fn disable_spll(&self) {
        self.regs.spllcsr.set(0);
    }

    /// PLL lock probe.
    pub fn spll_valid(&self) -> nb::Result<(), Infallible> {
        ready(self.pll_locked())
    }

    /// Whether the PLL currently reports lock.
    pub fn pll_locked(&self) -> bool {
        self.regs.spllcsr.get() & spllcsr::VLD != 0
    }

    /// Enable the PLL loss-of-lock monitor.
    pub fn enable_spll_monitor(&self, action: MonitorAction) {
        let mut bits = spllcsr::CM;
        if matches!(action, MonitorAction::Reset) {
            bits |= spllcsr::CMRE;
        }
        self.regs.spllcsr.set_bits(bits);
    }

    /// Disable the oscillator and PLL loss-of-clock monitors.
    pub fn disable_source_monitors(&self) {
        self.regs
            .sosccsr
            .clear_bits(sosccsr::CM | sosccsr::CMRE);
        self.regs
            .spllcsr
            .clear_bits(spllcsr::CM | spllcsr::CMRE);
    }

    /// Route a clock to the SCG CLKOUT mux.
    pub fn select_clkout(&self, source: ScgClkout) {
        self.regs
            .clkoutcnfg
            .set((source as u32) << scg::clkoutcnfg::CLKOUTSEL_SHIFT);
    }

    /// Program the per-mode system clock control registers.
    pub fn apply_system_clocks(&self, cfg: &SystemClockConfig) {
        self.regs.rccr.set(setting_word(&cfg.run));
        if let Some(setting) = &cfg.very_low_power {
            self.regs.vccr.set(setting_word(setting));
        }
        if let Some(setting) = &cfg.high_speed {
            self.regs.hccr.set(setting_word(setting));
        }
    }

    /// Probe whether the active system clock mux reached `source`.
    ///
    /// The CSR mirror lags the control register write while the hardware
    /// completes the switch.
    pub fn system_clock_switched(&self, source: SystemClockSource) -> nb::Result<(), Infallible> {
        let current = (self.regs.csr.get() & csr::SCS_MASK) >> csr::SCS_SHIFT;
        ready(current == source.bits())
    }

    /// Rewrite the run-mode control register to run from the PLL.
    pub fn distribute_pll(&self, dividers: &SystemDividers) {
        self.regs.rccr.set(setting_word(&SystemClockSetting {
            source: SystemClockSource::SystemPll,
            dividers: *dividers,
        }));
    }
}
