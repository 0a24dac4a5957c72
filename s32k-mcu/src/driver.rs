//! Driver façade: the public entry points and the state machine behind
//! them.
//!
//! Every operation follows the same shape: take the per-operation
//! re-entrancy guard, check the driver state, then sequence the IP drivers.
//! Caller mistakes fail the call before the first register write; hardware
//! that misses a deadline is reported through the [`Reporter`] and the
//! sequence carries on, because halfway through a clock tree change there
//! is no safe point to stop at.

use crate::cmu::Cmu;
use crate::config::clock::{ClockConfigError, SourceControl, SystemClockSource};
use crate::config::{
    ClockSetting, McuConfig, ModeSetting, MonitorFault, MonitorUnit, RamSectionSetting,
    ResetSources,
};
use crate::pcc::Pcc;
use crate::pmc::Pmc;
use crate::poll;
use crate::rcm::Rcm;
use crate::reg::cmu::sr;
use crate::reg::scs::aircr;
use crate::reg::Peripherals;
use crate::scg::Scg;
use crate::sim::Sim;
use crate::smc::Smc;
use core::convert::Infallible;
use s32k_mcal_core::{ApiGuard, EventId, Reporter};

/// Errors returned by the driver entry points.
///
/// Each of these is a caller mistake; the call fails before any register
/// is written.
#[derive(Debug)]
pub enum Error {
    /// The driver has not been initialized.
    Uninit,
    /// The driver is locked; re-initialization is not permitted.
    Locked,
    /// The entry point is already executing (re-entered from an interrupt
    /// context).
    Busy,
    /// No clock tree with that index exists in the configuration.
    InvalidClockSetting,
    /// No mode target with that index exists in the configuration.
    InvalidModeSetting,
    /// No RAM section with that index exists in the configuration.
    InvalidRamSection,
    /// A clock operation was requested before any clock tree was applied.
    ClockNotInitialized,
    /// The PLL is not running and locked.
    PllNotLocked,
    /// The selected clock tree failed validation.
    InvalidClockConfig(ClockConfigError),
}

impl From<ClockConfigError> for Error {
    fn from(value: ClockConfigError) -> Self {
        Self::InvalidClockConfig(value)
    }
}

/// Driver lifecycle state.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum McuState {
    /// Not initialized; only `init` is accepted.
    Uninit,
    /// Initialized and re-initializable.
    Initialized,
    /// Initialized with a lockable configuration; terminal.
    Locked,
}

/// PLL lock status.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PllStatus {
    /// PLL reports lock.
    Locked,
    /// PLL enabled but not (yet) locked.
    Unlocked,
    /// Driver uninitialized; the answer would be meaningless.
    Undefined,
}

/// Decoded cause of the most recent reset.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetReason {
    /// Power-on reset.
    PowerOn,
    /// Low-voltage detect.
    LowVoltage,
    /// Loss of external clock.
    LossOfClock,
    /// Loss of PLL lock.
    LossOfLock,
    /// Clock monitor fault.
    ClockMonitor,
    /// Watchdog expiry.
    Watchdog,
    /// External reset pin.
    ExternalPin,
    /// JTAG reset.
    Jtag,
    /// Core lockup.
    CoreLockup,
    /// Software reset request.
    Software,
    /// Debugger reset request.
    Debugger,
    /// Stop mode acknowledge error.
    StopAckError,
    /// More than one source asserted for the same reset.
    Multiple,
    /// Driver uninitialized.
    Undefined,
}

impl From<ResetSources> for ResetReason {
    fn from(sources: ResetSources) -> Self {
        match sources.count() {
            0 => ResetReason::PowerOn,
            1 => {
                if sources.low_voltage() {
                    ResetReason::LowVoltage
                } else if sources.loss_of_clock() {
                    ResetReason::LossOfClock
                } else if sources.loss_of_lock() {
                    ResetReason::LossOfLock
                } else if sources.clock_monitor() {
                    ResetReason::ClockMonitor
                } else if sources.watchdog() {
                    ResetReason::Watchdog
                } else if sources.pin() {
                    ResetReason::ExternalPin
                } else if sources.power_on() {
                    ResetReason::PowerOn
                } else if sources.jtag() {
                    ResetReason::Jtag
                } else if sources.lockup() {
                    ResetReason::CoreLockup
                } else if sources.software() {
                    ResetReason::Software
                } else if sources.debugger() {
                    ResetReason::Debugger
                } else {
                    ResetReason::StopAckError
                }
            }
            _ => ResetReason::Multiple,
        }
    }
}

/// Wait points reported alongside a timeout event.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FailurePoint {
    /// Slow IRC never reported valid.
    SircValid = 1,
    /// Fast IRC never reported valid.
    FircValid = 2,
    /// System oscillator never reported valid.
    SoscValid = 3,
    /// PLL never reported lock.
    SpllValid = 4,
    /// The system clock mux never confirmed the selected source.
    SystemClockSwitch = 5,
    /// The mode controller never confirmed the requested run mode.
    ModeTransition = 6,
}

/// Module version record.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VersionInfo {
    /// AUTOSAR vendor identifier.
    pub vendor_id: u16,
    /// AUTOSAR module identifier.
    pub module_id: u16,
    /// Major software version.
    pub sw_major_version: u8,
    /// Minor software version.
    pub sw_minor_version: u8,
    /// Patch software version.
    pub sw_patch_version: u8,
}

/// Version of this driver.
pub const VERSION: VersionInfo = VersionInfo {
    vendor_id: 43,
    module_id: 101,
    sw_major_version: 0,
    sw_minor_version: 2,
    sw_patch_version: 0,
};

#[derive(Default)]
struct Guards {
    init: ApiGuard,
    clock: ApiGuard,
    distribute: ApiGuard,
    mode: ApiGuard,
    ram: ApiGuard,
    reset: ApiGuard,
}

/// Bounded hardware wait with timeout reporting.
struct HwWait<'r, R> {
    budget: u32,
    event: Option<EventId>,
    reporter: &'r R,
}

impl<R: Reporter> HwWait<'_, R> {
    fn wait(
        &self,
        point: FailurePoint,
        ready: impl FnMut() -> nb::Result<(), Infallible>,
    ) -> bool {
        match poll::poll_limited(self.budget, ready) {
            Ok(()) => true,
            Err(poll::Expired) => {
                if let Some(event) = self.event {
                    self.reporter.report_timeout(event, point as u8);
                }
                false
            }
        }
    }
}

/// The MCU driver.
///
/// Owns the clock, reset and power-mode register blocks and sequences them
/// according to an immutable [`McuConfig`].
pub struct Mcu<'a, R = ()> {
    periph: Peripherals<'a>,
    reporter: R,
    config: Option<&'a McuConfig<'a>>,
    active_clock: Option<usize>,
    state: McuState,
    guards: Guards,
}

impl<'a, R: Reporter> Mcu<'a, R> {
    /// Create an uninitialized driver over the given register blocks.
    pub fn new(periph: Peripherals<'a>, reporter: R) -> Self {
        Self {
            periph,
            reporter,
            config: None,
            active_clock: None,
            state: McuState::Uninit,
            guards: Guards::default(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> McuState {
        self.state
    }

    fn configured(&self) -> Result<&'a McuConfig<'a>, Error> {
        self.config.ok_or(Error::Uninit)
    }

    fn hw_wait(&self, config: &McuConfig<'_>) -> HwWait<'_, R> {
        HwWait {
            budget: config.timeout_loops,
            event: config.events.timeout,
            reporter: &self.reporter,
        }
    }

    /// Initialize the reset controller, low-voltage circuitry and mode
    /// protection.
    ///
    /// With a `lockable` configuration the driver ends up [`McuState::Locked`]
    /// and every further `init` fails without touching hardware.
    pub fn init(&mut self, config: &'a McuConfig<'a>) -> Result<(), Error> {
        let _token = self.guards.init.try_enter().ok_or(Error::Busy)?;
        if self.state == McuState::Locked {
            return Err(Error::Locked);
        }

        Rcm::new(self.periph.rcm).apply(&config.reset);
        Pmc::new(self.periph.pmc).apply(&config.low_voltage);
        Smc::new(self.periph.smc).set_mode_protection(&config.mode_protection);

        self.config = Some(config);
        self.active_clock = None;
        self.state = if config.lockable {
            McuState::Locked
        } else {
            McuState::Initialized
        };
        Ok(())
    }

    /// Program the selected clock tree.
    ///
    /// The ordering is mandated by hardware: SIM routing first, then the
    /// always-on slow IRC, then the remaining sources, then the system
    /// clock mux (which must only select sources that are already valid),
    /// then peripheral gating, and the clock monitors strictly last. A
    /// source that misses its valid deadline is reported and the sequence
    /// continues.
    pub fn init_clock(&mut self, setting: ClockSetting) -> Result<(), Error> {
        let _token = self.guards.clock.try_enter().ok_or(Error::Busy)?;
        let config = self.configured()?;
        let cfg = config
            .clock_configs
            .get(setting.0)
            .ok_or(Error::InvalidClockSetting)?;
        cfg.validate()?;

        let wait = self.hw_wait(config);
        let scg = Scg::new(self.periph.scg);

        Sim::new(self.periph.sim).apply(&cfg.sim);
        if let Some(clkout) = cfg.scg_clkout {
            scg.select_clkout(clkout);
        }

        scg.configure_sirc(&cfg.sirc);
        wait.wait(FailurePoint::SircValid, || scg.sirc_valid());

        match &cfg.firc {
            SourceControl::Unmanaged => {}
            SourceControl::Disabled => scg.disable_firc(),
            SourceControl::Enabled(firc) => {
                scg.configure_firc(firc);
                wait.wait(FailurePoint::FircValid, || scg.firc_valid());
            }
        }

        match &cfg.sosc {
            SourceControl::Unmanaged => {}
            SourceControl::Disabled => scg.disable_sosc(),
            SourceControl::Enabled(sosc) => {
                scg.configure_sosc(sosc);
                wait.wait(FailurePoint::SoscValid, || scg.sosc_valid());
                // The loss-of-clock monitor goes on only after the
                // oscillator is up; enabling it earlier trips it at once.
                if let Some(action) = sosc.monitor {
                    scg.enable_sosc_monitor(action);
                }
            }
        }

        match &cfg.spll {
            SourceControl::Unmanaged => {}
            SourceControl::Disabled => scg.disable_spll(),
            SourceControl::Enabled(spll) => {
                scg.configure_spll(spll);
                wait.wait(FailurePoint::SpllValid, || scg.spll_valid());
                if let Some(action) = spll.monitor {
                    scg.enable_spll_monitor(action);
                }
            }
        }

        scg.apply_system_clocks(&cfg.system);
        wait.wait(FailurePoint::SystemClockSwitch, || {
            scg.system_clock_switched(cfg.system.run.source)
        });

        Pcc::new(self.periph.pcc).configure(cfg.peripherals);

        for monitor in cfg.monitors {
            Cmu::new(self.periph.cmu[monitor.unit as usize]).configure(monitor);
        }

        self.active_clock = Some(setting.0);
        Ok(())
    }

    /// Switch the run-mode system clock over to the PLL.
    ///
    /// Separated from [`Mcu::init_clock`] so the caller decides when the
    /// core starts running from the (faster) PLL clock. Fails unless the
    /// active clock tree drives the PLL and the PLL reports lock.
    pub fn distribute_pll_clock(&mut self) -> Result<(), Error> {
        let _token = self.guards.distribute.try_enter().ok_or(Error::Busy)?;
        let config = self.configured()?;
        let active = self.active_clock.ok_or(Error::ClockNotInitialized)?;
        let cfg = &config.clock_configs[active];
        let SourceControl::Enabled(spll) = &cfg.spll else {
            return Err(Error::PllNotLocked);
        };

        let scg = Scg::new(self.periph.scg);
        if !scg.pll_locked() {
            return Err(Error::PllNotLocked);
        }

        scg.distribute_pll(&spll.distribute_dividers);
        self.hw_wait(config)
            .wait(FailurePoint::SystemClockSwitch, || {
                scg.system_clock_switched(SystemClockSource::SystemPll)
            });
        Ok(())
    }

    /// Transition into the selected power mode.
    ///
    /// Run-family targets are requested and confirmed against the mode
    /// status register. Stop-family targets first get the fixed teardown —
    /// source monitors off, clock monitor units off, FIRC off, SOSC off —
    /// because the hardware refuses (or worse, mishandles) the transition
    /// with monitors and fast clocks running; the actual entry then happens
    /// on the core's next sleep instruction.
    pub fn set_mode(&mut self, setting: ModeSetting) -> Result<(), Error> {
        let _token = self.guards.mode.try_enter().ok_or(Error::Busy)?;
        let config = self.configured()?;
        let mode = config
            .modes
            .get(setting.0)
            .ok_or(Error::InvalidModeSetting)?
            .mode;

        let smc = Smc::new(self.periph.smc);
        if mode.is_low_power() {
            self.low_power_teardown();
            smc.request_stop_mode(mode);
        } else {
            smc.request_run_mode(mode);
            self.hw_wait(config)
                .wait(FailurePoint::ModeTransition, || smc.mode_reached(mode));
        }
        Ok(())
    }

    fn low_power_teardown(&self) {
        let scg = Scg::new(self.periph.scg);
        scg.disable_source_monitors();
        for regs in self.periph.cmu {
            Cmu::new(regs).disable();
        }
        scg.disable_firc();
        scg.disable_sosc();
    }

    /// Fill a configured RAM section with its fill pattern.
    pub fn init_ram_section(&mut self, setting: RamSectionSetting) -> Result<(), Error> {
        let _token = self.guards.ram.try_enter().ok_or(Error::Busy)?;
        let config = self.configured()?;
        let section = config
            .ram_sections
            .get(setting.0)
            .ok_or(Error::InvalidRamSection)?;

        let base = section.base() as *mut u32;
        for i in 0..section.words() {
            // Safety: the RamSection constructor contract guarantees the
            // range is writable RAM.
            unsafe { base.add(i).write_volatile(section.fill()) };
        }
        Ok(())
    }

    /// Lock status of the PLL, [`PllStatus::Undefined`] before `init`.
    pub fn pll_status(&self) -> PllStatus {
        if self.state == McuState::Uninit {
            return PllStatus::Undefined;
        }
        if Scg::new(self.periph.scg).pll_locked() {
            PllStatus::Locked
        } else {
            PllStatus::Unlocked
        }
    }

    /// Decode the cause of the most recent reset and clear the sticky
    /// status accumulated behind it.
    ///
    /// Exactly one recorded source maps to its reason; several at once map
    /// to [`ResetReason::Multiple`]; none at all reads as a power-on reset,
    /// which is what the hardware reports after the supply first comes up.
    pub fn reset_reason(&mut self) -> ResetReason {
        if self.state == McuState::Uninit {
            return ResetReason::Undefined;
        }
        let rcm = Rcm::new(self.periph.rcm);
        let sources = rcm.reset_sources();
        rcm.clear_sticky();
        sources.into()
    }

    /// Raw reset status word, for integrators that want the undecoded bits.
    pub fn reset_raw(&mut self) -> Result<u32, Error> {
        if self.state == McuState::Uninit {
            return Err(Error::Uninit);
        }
        Ok(Rcm::new(self.periph.rcm).raw_status())
    }

    /// Request a system reset. On hardware this call does not return.
    pub fn perform_reset(&mut self) -> Result<(), Error> {
        let _token = self.guards.reset.try_enter().ok_or(Error::Busy)?;
        if self.state == McuState::Uninit {
            return Err(Error::Uninit);
        }
        self.periph
            .scs
            .aircr
            .set(aircr::VECTKEY | aircr::SYSRESETREQ);
        Ok(())
    }

    /// Clock monitor interrupt entry point.
    ///
    /// Clears every asserted monitor fault so the interrupt cannot
    /// re-trigger, then notifies the integrator once per fault. Before
    /// `init` there is no configuration to resolve a callback from, so the
    /// handler only clears.
    pub fn on_clock_monitor_interrupt(&mut self) {
        let notification = match (self.state, self.config) {
            (McuState::Uninit, _) | (_, None) => None,
            (_, Some(config)) => config.clock_failure_notification,
        };
        for (index, regs) in self.periph.cmu.iter().enumerate() {
            let cmu = Cmu::new(regs);
            let pending = cmu.pending();
            if pending == 0 {
                continue;
            }
            cmu.clear(pending);
            let Some(notify) = notification else {
                continue;
            };
            let unit = if index == 0 {
                MonitorUnit::Cmu0
            } else {
                MonitorUnit::Cmu1
            };
            if pending & sr::FLL != 0 {
                notify(unit, MonitorFault::FrequencyLow);
            }
            if pending & sr::FHH != 0 {
                notify(unit, MonitorFault::FrequencyHigh);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::clock::{
        ClockConfig, FircConfig, MonitorAction, MonitorConfig, PeripheralClockConfig,
        PeripheralClockSource, SimClockConfig, SircConfig, SoscConfig, SoscMode, SourceDivider,
        SpllConfig, SystemClockConfig, SystemClockSetting, SystemDivider, SystemDividers,
    };
    use crate::config::{
        LowVoltageConfig, McuEvents, ModeConfig, ModeProtection, PowerMode, RamSection,
        ResetConfig,
    };
    use crate::pcc::Peripheral;
    use crate::reg::{cmu, pcc, pmc, rcm, scg, scs, sim, smc};
    use core::cell::Cell;
    use core::sync::atomic::{AtomicU32, Ordering};
    use fugit::RateExtU32 as _;
    use s32k_mcal_core::EventStatus;

    struct Blocks {
        scg: scg::RegisterBlock,
        sim: sim::RegisterBlock,
        pcc: pcc::RegisterBlock,
        pmc: pmc::RegisterBlock,
        smc: smc::RegisterBlock,
        rcm: rcm::RegisterBlock,
        cmu0: cmu::RegisterBlock,
        cmu1: cmu::RegisterBlock,
        scs: scs::RegisterBlock,
    }

    impl Blocks {
        fn new() -> Self {
            Self {
                scg: scg::RegisterBlock::new(),
                sim: sim::RegisterBlock::new(),
                pcc: pcc::RegisterBlock::new(),
                pmc: pmc::RegisterBlock::new(),
                smc: smc::RegisterBlock::new(),
                rcm: rcm::RegisterBlock::new(),
                cmu0: cmu::RegisterBlock::new(),
                cmu1: cmu::RegisterBlock::new(),
                scs: scs::RegisterBlock::new(),
            }
        }

        fn periph(&self) -> Peripherals<'_> {
            Peripherals {
                scg: &self.scg,
                sim: &self.sim,
                pcc: &self.pcc,
                pmc: &self.pmc,
                smc: &self.smc,
                rcm: &self.rcm,
                cmu: [&self.cmu0, &self.cmu1],
                scs: &self.scs,
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        timeouts: Cell<u32>,
        last: Cell<Option<(EventId, u8)>>,
    }

    impl Reporter for Recorder {
        fn report_status(&self, _event: EventId, _status: EventStatus) {}

        fn report_timeout(&self, event: EventId, failure_point: u8) {
            self.timeouts.set(self.timeouts.get() + 1);
            self.last.set(Some((event, failure_point)));
        }
    }

    const TIMEOUT_EVENT: EventId = EventId(0x21);

    static PERIPHERALS: [PeripheralClockConfig; 1] = [PeripheralClockConfig {
        peripheral: Peripheral::Lpuart0,
        gate: true,
        source: Some(PeripheralClockSource::FircDiv2),
        divider: None,
    }];

    static MONITORS: [MonitorConfig; 1] = [MonitorConfig {
        unit: MonitorUnit::Cmu0,
        reference_count: 100,
        high_threshold: 3000,
        low_threshold: 1000,
        interrupt_on_low: true,
        interrupt_on_high: false,
    }];

    fn run_setting(source: SystemClockSource) -> SystemClockSetting {
        SystemClockSetting {
            source,
            dividers: SystemDividers {
                core: SystemDivider::By1,
                bus: SystemDivider::By2,
                slow: SystemDivider::By4,
            },
        }
    }

    fn clock_config() -> ClockConfig<'static> {
        ClockConfig {
            sim: SimClockConfig::default(),
            scg_clkout: None,
            sirc: SircConfig::default(),
            firc: SourceControl::Enabled(FircConfig::default()),
            sosc: SourceControl::Enabled(SoscConfig {
                frequency: 8u32.MHz(),
                mode: SoscMode::Crystal { high_gain: false },
                div1: SourceDivider::By1,
                div2: SourceDivider::By1,
                monitor: Some(MonitorAction::Interrupt),
            }),
            spll: SourceControl::Enabled(SpllConfig {
                prediv: 1,
                mult: 28,
                div1: SourceDivider::By2,
                div2: SourceDivider::By2,
                monitor: None,
                distribute_dividers: SystemDividers {
                    core: SystemDivider::By2,
                    bus: SystemDivider::By4,
                    slow: SystemDivider::By8,
                },
            }),
            system: SystemClockConfig {
                run: run_setting(SystemClockSource::FastIrc),
                very_low_power: Some(run_setting(SystemClockSource::SlowIrc)),
                high_speed: None,
            },
            peripherals: &PERIPHERALS,
            monitors: &MONITORS,
        }
    }

    fn config<'a>(clocks: &'a [ClockConfig<'a>], lockable: bool) -> McuConfig<'a> {
        McuConfig {
            reset: ResetConfig::default(),
            low_voltage: LowVoltageConfig {
                detect_reset: true,
                bias: true,
                ..LowVoltageConfig::default()
            },
            mode_protection: ModeProtection {
                allow_very_low_power: true,
                allow_high_speed: true,
            },
            clock_configs: clocks,
            modes: &[
                ModeConfig {
                    mode: PowerMode::Run,
                },
                ModeConfig {
                    mode: PowerMode::Stop2,
                },
                ModeConfig {
                    mode: PowerMode::VeryLowPowerStop,
                },
            ],
            ram_sections: &[],
            lockable,
            timeout_loops: 8,
            events: McuEvents {
                timeout: Some(TIMEOUT_EVENT),
            },
            clock_failure_notification: None,
        }
    }

    #[test]
    fn init_locks_when_lockable() {
        let blocks = Blocks::new();
        let clocks = [clock_config()];
        let cfg = config(&clocks, true);
        let mut mcu = Mcu::new(blocks.periph(), Recorder::default());

        assert!(mcu.init(&cfg).is_ok());
        assert_eq!(mcu.state(), McuState::Locked);
        assert!(matches!(mcu.init(&cfg), Err(Error::Locked)));
    }

    #[test]
    fn init_reinitializable_when_not_lockable() {
        let blocks = Blocks::new();
        let clocks = [clock_config()];
        let cfg = config(&clocks, false);
        let mut mcu = Mcu::new(blocks.periph(), Recorder::default());

        assert!(mcu.init(&cfg).is_ok());
        assert_eq!(mcu.state(), McuState::Initialized);
        assert!(mcu.init(&cfg).is_ok());
    }

    #[test]
    fn init_programs_mode_protection_and_lvd() {
        let blocks = Blocks::new();
        let clocks = [clock_config()];
        let cfg = config(&clocks, false);
        let mut mcu = Mcu::new(blocks.periph(), Recorder::default());
        mcu.init(&cfg).unwrap();

        use crate::reg::pmc::lvdsc1;
        use crate::reg::smc::pmprot;
        assert_eq!(blocks.smc.pmprot.get(), pmprot::AVLP | pmprot::AHSRUN);
        assert_eq!(blocks.pmc.lvdsc1.get(), lvdsc1::LVDACK | lvdsc1::LVDRE);
    }

    #[test]
    fn operations_require_init() {
        let blocks = Blocks::new();
        let mut mcu: Mcu<'_, Recorder> = Mcu::new(blocks.periph(), Recorder::default());

        assert!(matches!(mcu.init_clock(ClockSetting(0)), Err(Error::Uninit)));
        assert!(matches!(mcu.set_mode(ModeSetting(0)), Err(Error::Uninit)));
        assert!(matches!(mcu.distribute_pll_clock(), Err(Error::Uninit)));
        assert!(matches!(mcu.perform_reset(), Err(Error::Uninit)));
        assert!(matches!(mcu.reset_raw(), Err(Error::Uninit)));
        assert_eq!(mcu.pll_status(), PllStatus::Undefined);
        assert_eq!(mcu.reset_reason(), ResetReason::Undefined);
    }

    #[test]
    fn init_clock_programs_the_tree_and_reports_each_missed_valid() {
        let blocks = Blocks::new();
        let clocks = [clock_config()];
        let cfg = config(&clocks, false);
        let mut mcu = Mcu::new(blocks.periph(), Recorder::default());
        mcu.init(&cfg).unwrap();

        // Simulated hardware: the mux mirror already reads the requested
        // source, but no source ever asserts its valid bit.
        use crate::reg::scg::{csr, firccsr, scs as scs_enc, sirccsr, sosccsr, spllcfg, spllcsr};
        blocks.scg.csr.set(scs_enc::FIRC << csr::SCS_SHIFT);

        mcu.init_clock(ClockSetting(0)).unwrap();

        assert_ne!(blocks.scg.sirccsr.get() & sirccsr::EN, 0);
        assert_ne!(blocks.scg.firccsr.get() & firccsr::EN, 0);
        assert_ne!(blocks.scg.sosccsr.get() & sosccsr::EN, 0);
        // Oscillator monitor armed even though the valid wait expired.
        assert_ne!(blocks.scg.sosccsr.get() & sosccsr::CM, 0);
        assert_ne!(blocks.scg.spllcsr.get() & spllcsr::EN, 0);
        // PLL word: prediv 1 -> 0, mult 28 -> 12.
        assert_eq!(blocks.scg.spllcfg.get(), 12 << spllcfg::MULT_SHIFT);
        // RCCR carries the run-mode selection.
        assert_eq!(
            blocks.scg.rccr.get(),
            scs_enc::FIRC << csr::SCS_SHIFT | 1 << csr::DIVBUS_SHIFT | 3 << csr::DIVSLOW_SHIFT
        );
        // Peripheral slot gated with the requested source.
        use crate::reg::pcc::pccn;
        let lpuart = blocks.pcc.pccn[Peripheral::Lpuart0.slot()].get();
        assert_ne!(lpuart & pccn::CGC, 0);
        assert_eq!(
            (lpuart & pccn::PCS_MASK) >> pccn::PCS_SHIFT,
            PeripheralClockSource::FircDiv2 as u32
        );
        // Monitor enabled last.
        use crate::reg::cmu::gcr;
        assert_eq!(blocks.cmu0.gcr.get(), gcr::FCE);

        // One report per missed valid: SIRC, FIRC, SOSC, SPLL. The mux
        // switch itself was confirmed by the pre-set mirror.
        assert_eq!(mcu.reporter.timeouts.get(), 4);
        assert_eq!(
            mcu.reporter.last.get(),
            Some((TIMEOUT_EVENT, FailurePoint::SpllValid as u8))
        );
    }

    #[test]
    fn init_clock_rejects_bad_index_and_bad_pll() {
        let blocks = Blocks::new();
        let mut bad = clock_config();
        if let SourceControl::Enabled(pll) = &mut bad.spll {
            pll.mult = 99;
        }
        let clocks = [bad];
        let cfg = config(&clocks, false);
        let mut mcu = Mcu::new(blocks.periph(), Recorder::default());
        mcu.init(&cfg).unwrap();

        assert!(matches!(
            mcu.init_clock(ClockSetting(5)),
            Err(Error::InvalidClockSetting)
        ));
        assert!(matches!(
            mcu.init_clock(ClockSetting(0)),
            Err(Error::InvalidClockConfig(
                ClockConfigError::PllMultOutOfRange(_)
            ))
        ));
        // A rejected tree programs nothing.
        assert_eq!(blocks.scg.sirccsr.get(), 0);
    }

    #[test]
    fn distribute_pll_requires_lock_then_switches() {
        let blocks = Blocks::new();
        let clocks = [clock_config()];
        let cfg = config(&clocks, false);
        let mut mcu = Mcu::new(blocks.periph(), Recorder::default());
        mcu.init(&cfg).unwrap();

        assert!(matches!(
            mcu.distribute_pll_clock(),
            Err(Error::ClockNotInitialized)
        ));

        use crate::reg::scg::{csr, scs as scs_enc, spllcsr};
        blocks.scg.csr.set(scs_enc::FIRC << csr::SCS_SHIFT);
        mcu.init_clock(ClockSetting(0)).unwrap();

        // PLL never locked.
        assert!(matches!(
            mcu.distribute_pll_clock(),
            Err(Error::PllNotLocked)
        ));

        // Hardware locks the PLL and completes the switch.
        blocks.scg.spllcsr.set(spllcsr::EN | spllcsr::VLD);
        blocks.scg.csr.set(scs_enc::SPLL << csr::SCS_SHIFT);
        assert!(mcu.distribute_pll_clock().is_ok());
        assert_eq!(
            (blocks.scg.rccr.get() & csr::SCS_MASK) >> csr::SCS_SHIFT,
            scs_enc::SPLL
        );
        assert_eq!(mcu.pll_status(), PllStatus::Locked);
    }

    #[test]
    fn set_mode_run_confirms_against_status() {
        let blocks = Blocks::new();
        let clocks = [clock_config()];
        let cfg = config(&clocks, false);
        let mut mcu = Mcu::new(blocks.periph(), Recorder::default());
        mcu.init(&cfg).unwrap();

        // The harness mode status register powers up in RUN.
        assert!(mcu.set_mode(ModeSetting(0)).is_ok());
        assert_eq!(mcu.reporter.timeouts.get(), 0);
    }

    #[test]
    fn set_mode_stop_tears_clocks_down_first() {
        let blocks = Blocks::new();
        let clocks = [clock_config()];
        let cfg = config(&clocks, false);
        let mut mcu = Mcu::new(blocks.periph(), Recorder::default());
        mcu.init(&cfg).unwrap();

        use crate::reg::scg::{csr, firccsr, scs as scs_enc, sosccsr};
        blocks.scg.csr.set(scs_enc::FIRC << csr::SCS_SHIFT);
        mcu.init_clock(ClockSetting(0)).unwrap();
        assert_ne!(blocks.scg.firccsr.get() & firccsr::EN, 0);

        assert!(mcu.set_mode(ModeSetting(1)).is_ok());

        assert_eq!(blocks.scg.firccsr.get() & firccsr::EN, 0);
        assert_eq!(blocks.scg.sosccsr.get() & (sosccsr::EN | sosccsr::CM), 0);
        assert_eq!(blocks.cmu0.gcr.get(), 0);
        use crate::reg::smc::{pmctrl, stopctrl};
        assert_eq!(blocks.smc.pmctrl.get() & pmctrl::STOPM_MASK, 0);
        assert_eq!(
            (blocks.smc.stopctrl.get() & stopctrl::STOPO_MASK) >> stopctrl::STOPO_SHIFT,
            stopctrl::STOPO_STOP2
        );
    }

    #[test]
    fn reset_reason_decodes_single_and_multiple_sources() {
        let blocks = Blocks::new();
        let clocks = [clock_config()];
        let cfg = config(&clocks, false);
        let mut mcu = Mcu::new(blocks.periph(), Recorder::default());
        mcu.init(&cfg).unwrap();

        use crate::reg::rcm::srs;
        blocks.rcm.srs.set(srs::WDOG);
        assert_eq!(mcu.reset_reason(), ResetReason::Watchdog);
        // Sticky status cleared on read-out.
        assert_eq!(blocks.rcm.ssrs.get(), srs::ALL);

        blocks.rcm.srs.set(srs::WDOG | srs::PIN);
        assert_eq!(mcu.reset_reason(), ResetReason::Multiple);

        blocks.rcm.srs.set(0);
        assert_eq!(mcu.reset_reason(), ResetReason::PowerOn);

        blocks.rcm.srs.set(srs::POR);
        assert!(matches!(mcu.reset_raw(), Ok(v) if v == srs::POR));
    }

    #[test]
    fn perform_reset_writes_the_keyed_request() {
        let blocks = Blocks::new();
        let clocks = [clock_config()];
        let cfg = config(&clocks, false);
        let mut mcu = Mcu::new(blocks.periph(), Recorder::default());
        mcu.init(&cfg).unwrap();

        assert!(mcu.perform_reset().is_ok());
        assert_eq!(blocks.scs.aircr.get(), aircr::VECTKEY | aircr::SYSRESETREQ);
    }

    #[test]
    fn init_ram_section_fills_the_window() {
        let blocks = Blocks::new();
        let mut ram = [0u32; 16];
        let sections = [unsafe { RamSection::new(ram.as_mut_ptr() as usize, 8, 0xA5A5_A5A5) }];
        let clocks = [clock_config()];
        let mut cfg = config(&clocks, false);
        cfg.ram_sections = &sections;

        let mut mcu = Mcu::new(blocks.periph(), Recorder::default());
        mcu.init(&cfg).unwrap();
        assert!(matches!(
            mcu.init_ram_section(RamSectionSetting(3)),
            Err(Error::InvalidRamSection)
        ));
        mcu.init_ram_section(RamSectionSetting(0)).unwrap();
        drop(mcu);

        assert!(ram[..8].iter().all(|&w| w == 0xA5A5_A5A5));
        assert!(ram[8..].iter().all(|&w| w == 0));
    }

    static NOTIFICATIONS: AtomicU32 = AtomicU32::new(0);

    fn count_notification(unit: MonitorUnit, fault: MonitorFault) {
        assert_eq!(unit, MonitorUnit::Cmu0);
        assert_eq!(fault, MonitorFault::FrequencyLow);
        NOTIFICATIONS.fetch_add(1, Ordering::Relaxed);
    }

    #[test]
    fn monitor_interrupt_notifies_only_after_init() {
        let blocks = Blocks::new();
        let clocks = [clock_config()];
        let mut cfg = config(&clocks, false);
        cfg.clock_failure_notification = Some(count_notification);
        let mut mcu = Mcu::new(blocks.periph(), Recorder::default());

        // Uninitialized: the flag is consumed but nobody is notified.
        blocks.cmu0.sr.set(sr::FLL);
        mcu.on_clock_monitor_interrupt();
        assert_eq!(NOTIFICATIONS.load(Ordering::Relaxed), 0);

        mcu.init(&cfg).unwrap();
        blocks.cmu0.sr.set(sr::FLL);
        mcu.on_clock_monitor_interrupt();
        assert_eq!(NOTIFICATIONS.load(Ordering::Relaxed), 1);
    }
}
