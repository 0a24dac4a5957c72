//! Clock tree configuration
//!
//! One [`ClockConfig`] describes a complete clock tree: the SIM-level
//! routing, the four SCG sources, the system clock mux for each run mode,
//! the per-peripheral gating and the clock monitors. The order in which the
//! driver programs these parts is fixed by hardware and lives in
//! [`Mcu::init_clock`](crate::driver::Mcu::init_clock); the configuration
//! only says *what* to program.

use crate::pcc::Peripheral;
use core::ops::RangeInclusive;
use fugit::HertzU32;

/// Configuration for one selectable clock tree.
pub struct ClockConfig<'a> {
    /// SIM-level clock routing.
    pub sim: SimClockConfig,
    /// SCG CLKOUT pin source; `None` leaves the mux untouched.
    pub scg_clkout: Option<ScgClkout>,
    /// Slow internal RC oscillator. Always programmed; the rest of the chip
    /// falls back to it whenever faster sources go away.
    pub sirc: SircConfig,
    /// Fast internal RC oscillator.
    pub firc: SourceControl<FircConfig>,
    /// External system oscillator.
    pub sosc: SourceControl<SoscConfig>,
    /// System PLL.
    pub spll: SourceControl<SpllConfig>,
    /// System clock selection and dividers per run mode.
    pub system: SystemClockConfig,
    /// Per-peripheral clock gating and source selection.
    pub peripherals: &'a [PeripheralClockConfig],
    /// Clock monitors, enabled last, after every monitored source is up.
    pub monitors: &'a [MonitorConfig],
}

/// Whether a clock source is managed by the driver at all.
///
/// A source that other software owns is left `Unmanaged`; the driver then
/// never touches its registers, in either direction.
#[derive(Copy, Clone)]
pub enum SourceControl<T> {
    /// Not under driver control; left exactly as found.
    Unmanaged,
    /// Switched off by the driver.
    Disabled,
    /// Programmed and enabled by the driver.
    Enabled(T),
}

impl<T> SourceControl<T> {
    /// `true` unless the source is [`SourceControl::Unmanaged`].
    pub fn is_managed(&self) -> bool {
        !matches!(self, SourceControl::Unmanaged)
    }
}

/// Valid ranges of the checked clock parameters.
const PLL_PREDIV: RangeInclusive<u8> = 1..=8;
const PLL_MULT: RangeInclusive<u8> = 16..=47;
const CLKOUT_DIVIDE: RangeInclusive<u8> = 1..=8;
const TRACE_DIVIDE: RangeInclusive<u8> = 1..=8;
const PCC_DIVIDE: RangeInclusive<u8> = 1..=8;

/// Misconfigurations of a [`ClockConfig`].
#[derive(Debug)]
pub enum ClockConfigError {
    /// PLL reference divider is outside the wrapped `RangeInclusive`.
    PllPredivOutOfRange(RangeInclusive<u8>),
    /// PLL multiplier is outside the wrapped `RangeInclusive`.
    PllMultOutOfRange(RangeInclusive<u8>),
    /// CLKOUT divider is outside the wrapped `RangeInclusive`.
    ClkoutDivideOutOfRange(RangeInclusive<u8>),
    /// Trace clock divider is outside the wrapped `RangeInclusive`.
    TraceDivideOutOfRange(RangeInclusive<u8>),
    /// A peripheral clock divider is outside the wrapped `RangeInclusive`.
    PeripheralDivideOutOfRange(RangeInclusive<u8>),
    /// The PLL is enabled but the oscillator feeding it is not.
    PllWithoutOscillator,
}

impl ClockConfig<'_> {
    /// Check every range-constrained parameter of the tree.
    ///
    /// Called by the driver before it touches the first register, so a bad
    /// configuration fails the whole operation instead of leaving the tree
    /// half-programmed.
    pub fn validate(&self) -> Result<(), ClockConfigError> {
        if let Some(clkout) = &self.sim.clkout {
            if !CLKOUT_DIVIDE.contains(&clkout.divide) {
                return Err(ClockConfigError::ClkoutDivideOutOfRange(CLKOUT_DIVIDE));
            }
        }
        if let Some(trace) = &self.sim.trace {
            if !TRACE_DIVIDE.contains(&trace.divide) {
                return Err(ClockConfigError::TraceDivideOutOfRange(TRACE_DIVIDE));
            }
        }
        for entry in self.peripherals {
            if let Some(divider) = &entry.divider {
                if !PCC_DIVIDE.contains(&divider.divide) {
                    return Err(ClockConfigError::PeripheralDivideOutOfRange(PCC_DIVIDE));
                }
            }
        }
        if let SourceControl::Enabled(pll) = &self.spll {
            if !PLL_PREDIV.contains(&pll.prediv) {
                return Err(ClockConfigError::PllPredivOutOfRange(PLL_PREDIV));
            }
            if !PLL_MULT.contains(&pll.mult) {
                return Err(ClockConfigError::PllMultOutOfRange(PLL_MULT));
            }
            // The PLL reference is the system oscillator; a tree that turns
            // the oscillator off while the PLL runs cannot lock.
            if matches!(self.sosc, SourceControl::Disabled) {
                return Err(ClockConfigError::PllWithoutOscillator);
            }
        }
        Ok(())
    }
}

/// SIM-level clock routing.
#[derive(Default, Copy, Clone)]
pub struct SimClockConfig {
    /// CLKOUT pin routing; `None` disables the output.
    pub clkout: Option<ClkoutConfig>,
    /// Low-power oscillator gating and selection.
    pub lpo: LpoConfig,
    /// Platform-side clock gates.
    pub platform_gating: PlatformGating,
    /// Trace clock divider; `None` disables the trace clock.
    pub trace: Option<TraceConfig>,
}

/// CLKOUT pin configuration.
#[derive(Copy, Clone)]
pub struct ClkoutConfig {
    /// Clock routed to the pin.
    pub source: ClkoutSource,
    /// Output divider, 1 to 8.
    pub divide: u8,
}

/// Clocks routable to the CLKOUT pin.
#[derive(Copy, Clone)]
pub enum ClkoutSource {
    /// Whatever the SCG CLKOUT mux selects.
    ScgClkout = 0,
    /// System oscillator DIV2 output.
    SoscDiv2 = 2,
    /// Slow IRC DIV2 output.
    SircDiv2 = 4,
    /// Fast IRC DIV2 output.
    FircDiv2 = 6,
    /// Core clock.
    Hclk = 8,
    /// PLL DIV2 output.
    SpllDiv2 = 9,
    /// Bus clock.
    BusClk = 10,
    /// 128 kHz LPO.
    Lpo128k = 12,
    /// Selected LPO clock.
    LpoClk = 14,
    /// RTC clock.
    RtcClk = 15,
}

/// Low-power oscillator configuration.
#[derive(Copy, Clone)]
pub struct LpoConfig {
    /// Gate for the 1 kHz output.
    pub lpo1k: bool,
    /// Gate for the 32 kHz output.
    pub lpo32k: bool,
    /// Source of the LPO_CLK output.
    pub source: LpoSource,
    /// Source of the RTC clock.
    pub rtc_source: RtcSource,
}

impl Default for LpoConfig {
    fn default() -> Self {
        Self {
            lpo1k: true,
            lpo32k: true,
            source: LpoSource::Lpo128k,
            rtc_source: RtcSource::SoscDiv1,
        }
    }
}

/// LPO_CLK source selection.
#[derive(Copy, Clone)]
pub enum LpoSource {
    /// 128 kHz LPO.
    Lpo128k = 0,
    /// No clock.
    None = 1,
    /// 32 kHz LPO.
    Lpo32k = 2,
    /// 1 kHz LPO.
    Lpo1k = 3,
}

/// RTC clock source selection.
#[derive(Copy, Clone)]
pub enum RtcSource {
    /// System oscillator DIV1 output.
    SoscDiv1 = 0,
    /// 32 kHz LPO.
    Lpo32k = 1,
    /// Dedicated RTC_CLKIN pin.
    RtcClkin = 2,
    /// Fast IRC DIV1 output.
    FircDiv1 = 3,
}

/// Platform-side clock gates. Everything defaults to enabled.
#[derive(Copy, Clone)]
pub struct PlatformGating {
    /// Inter-processor crossbar.
    pub mscm: bool,
    /// Memory protection unit.
    pub mpu: bool,
    /// DMA engine.
    pub dma: bool,
    /// Error reporting module.
    pub erm: bool,
    /// Error injection module.
    pub eim: bool,
}

impl Default for PlatformGating {
    fn default() -> Self {
        Self {
            mscm: true,
            mpu: true,
            dma: true,
            erm: true,
            eim: true,
        }
    }
}

/// Trace clock configuration.
#[derive(Copy, Clone)]
pub struct TraceConfig {
    /// Divider, 1 to 8.
    pub divide: u8,
    /// Add a half-step to the divider.
    pub fraction: bool,
    /// Divide the core clock rather than the platform clock.
    pub core_clock: bool,
}

/// SCG CLKOUT mux selection.
#[derive(Copy, Clone)]
pub enum ScgClkout {
    /// Slow clock.
    SlowClk = 0,
    /// System oscillator.
    Sosc = 1,
    /// Slow IRC.
    Sirc = 2,
    /// Fast IRC.
    Firc = 3,
    /// System PLL.
    Spll = 6,
}

/// Asynchronous divider of a clock source (DIV1/DIV2 outputs).
#[derive(Default, Copy, Clone)]
pub enum SourceDivider {
    /// Output gated off.
    #[default]
    Disabled = 0,
    /// Divide by 1.
    By1 = 1,
    /// Divide by 2.
    By2 = 2,
    /// Divide by 4.
    By4 = 3,
    /// Divide by 8.
    By8 = 4,
    /// Divide by 16.
    By16 = 5,
    /// Divide by 32.
    By32 = 6,
    /// Divide by 64.
    By64 = 7,
}

impl SourceDivider {
    pub(crate) fn bits(self) -> u32 {
        self as u32
    }
}

/// Slow IRC configuration.
#[derive(Copy, Clone)]
pub struct SircConfig {
    /// Output range.
    pub range: SircRange,
    /// DIV1 output divider.
    pub div1: SourceDivider,
    /// DIV2 output divider.
    pub div2: SourceDivider,
    /// Keep running in stop modes.
    pub enable_in_stop: bool,
    /// Keep running in very-low-power modes.
    pub enable_in_low_power: bool,
}

impl Default for SircConfig {
    fn default() -> Self {
        Self {
            range: SircRange::Range8MHz,
            div1: SourceDivider::By1,
            div2: SourceDivider::By1,
            enable_in_stop: false,
            enable_in_low_power: true,
        }
    }
}

/// Slow IRC output range.
#[derive(Copy, Clone)]
pub enum SircRange {
    /// 2 MHz.
    Range2MHz = 0,
    /// 8 MHz.
    Range8MHz = 1,
}

/// Fast IRC configuration.
#[derive(Copy, Clone)]
pub struct FircConfig {
    /// DIV1 output divider.
    pub div1: SourceDivider,
    /// DIV2 output divider.
    pub div2: SourceDivider,
    /// Keep the FIRC regulator on.
    pub regulator: bool,
}

impl Default for FircConfig {
    fn default() -> Self {
        Self {
            div1: SourceDivider::By1,
            div2: SourceDivider::By1,
            regulator: true,
        }
    }
}

/// System oscillator configuration.
#[derive(Copy, Clone)]
pub struct SoscConfig {
    /// Crystal or reference frequency.
    pub frequency: HertzU32,
    /// Oscillator mode.
    pub mode: SoscMode,
    /// DIV1 output divider.
    pub div1: SourceDivider,
    /// DIV2 output divider.
    pub div2: SourceDivider,
    /// Clock monitor behavior; `None` leaves the monitor off.
    pub monitor: Option<MonitorAction>,
}

impl SoscConfig {
    /// Frequency range select derived from the configured frequency.
    pub fn range(&self) -> u32 {
        let hz = self.frequency.to_Hz();
        if hz < 1_000_000 {
            1
        } else if hz <= 8_000_000 {
            2
        } else {
            3
        }
    }
}

/// System oscillator operating mode.
#[derive(Copy, Clone)]
pub enum SoscMode {
    /// External square-wave reference on EXTAL.
    ExternalReference,
    /// Crystal between XTAL and EXTAL.
    Crystal {
        /// High-gain (high swing) operation instead of low-power.
        high_gain: bool,
    },
}

/// Reaction of a source-level clock monitor.
#[derive(Copy, Clone)]
pub enum MonitorAction {
    /// Flag the fault and raise an interrupt.
    Interrupt,
    /// Reset the chip.
    Reset,
}

/// System PLL configuration. The PLL reference is the system oscillator.
#[derive(Copy, Clone)]
pub struct SpllConfig {
    /// Reference divider, 1 to 8.
    pub prediv: u8,
    /// VCO multiplier, 16 to 47.
    pub mult: u8,
    /// DIV1 output divider.
    pub div1: SourceDivider,
    /// DIV2 output divider.
    pub div2: SourceDivider,
    /// Clock monitor behavior; `None` leaves the monitor off.
    pub monitor: Option<MonitorAction>,
    /// System dividers applied together with the switch to the PLL when the
    /// PLL clock is distributed.
    pub distribute_dividers: SystemDividers,
}

/// System clock selection per run mode.
///
/// The run-mode entry is mandatory; the mode controller refuses transitions
/// into modes whose clock control register was never set up.
#[derive(Copy, Clone)]
pub struct SystemClockConfig {
    /// Normal run.
    pub run: SystemClockSetting,
    /// Very-low-power run; `None` leaves VCCR at its reset default.
    pub very_low_power: Option<SystemClockSetting>,
    /// High-speed run; `None` leaves HCCR at its reset default.
    pub high_speed: Option<SystemClockSetting>,
}

/// One system clock mux setting.
#[derive(Copy, Clone)]
pub struct SystemClockSetting {
    /// Selected source.
    pub source: SystemClockSource,
    /// Core/bus/slow dividers.
    pub dividers: SystemDividers,
}

/// Selectable system clock sources.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SystemClockSource {
    /// System oscillator.
    SystemOscillator,
    /// Slow IRC.
    SlowIrc,
    /// Fast IRC.
    FastIrc,
    /// System PLL.
    SystemPll,
}

impl SystemClockSource {
    pub(crate) fn bits(self) -> u32 {
        use crate::reg::scg::scs;
        match self {
            SystemClockSource::SystemOscillator => scs::SOSC,
            SystemClockSource::SlowIrc => scs::SIRC,
            SystemClockSource::FastIrc => scs::FIRC,
            SystemClockSource::SystemPll => scs::SPLL,
        }
    }
}

/// Core, bus and slow (flash) clock dividers.
#[derive(Copy, Clone)]
pub struct SystemDividers {
    /// Core clock divider.
    pub core: SystemDivider,
    /// Bus clock divider.
    pub bus: SystemDivider,
    /// Slow clock divider.
    pub slow: SystemDivider,
}

/// Division factor of a system clock divider.
#[derive(Copy, Clone)]
pub enum SystemDivider {
    /// Divide by 1.
    By1 = 0,
    /// Divide by 2.
    By2 = 1,
    /// Divide by 3.
    By3 = 2,
    /// Divide by 4.
    By4 = 3,
    /// Divide by 5.
    By5 = 4,
    /// Divide by 6.
    By6 = 5,
    /// Divide by 7.
    By7 = 6,
    /// Divide by 8.
    By8 = 7,
    /// Divide by 9.
    By9 = 8,
    /// Divide by 10.
    By10 = 9,
    /// Divide by 11.
    By11 = 10,
    /// Divide by 12.
    By12 = 11,
    /// Divide by 13.
    By13 = 12,
    /// Divide by 14.
    By14 = 13,
    /// Divide by 15.
    By15 = 14,
    /// Divide by 16.
    By16 = 15,
}

impl SystemDivider {
    pub(crate) fn bits(self) -> u32 {
        self as u32
    }
}

/// Clock gating and source selection for one peripheral slot.
#[derive(Copy, Clone)]
pub struct PeripheralClockConfig {
    /// The peripheral slot to program.
    pub peripheral: Peripheral,
    /// Open the clock gate after programming the source.
    pub gate: bool,
    /// Functional clock source for slots that have one; `None` leaves the
    /// select at "off".
    pub source: Option<PeripheralClockSource>,
    /// Fractional divider for slots that have one.
    pub divider: Option<PeripheralDivider>,
}

/// Functional clock sources selectable per peripheral.
#[derive(Copy, Clone)]
pub enum PeripheralClockSource {
    /// System oscillator DIV2 output.
    SoscDiv2 = 1,
    /// Slow IRC DIV2 output.
    SircDiv2 = 2,
    /// Fast IRC DIV2 output.
    FircDiv2 = 3,
    /// System PLL DIV2 output.
    SpllDiv2 = 6,
}

/// Peripheral fractional divider.
#[derive(Copy, Clone)]
pub struct PeripheralDivider {
    /// Divider, 1 to 8.
    pub divide: u8,
    /// Add a half-step to the divider.
    pub fraction: bool,
}

/// Configuration of one clock monitor unit.
#[derive(Copy, Clone)]
pub struct MonitorConfig {
    /// The monitor instance.
    pub unit: crate::config::MonitorUnit,
    /// Reference counter window length.
    pub reference_count: u16,
    /// Upper bound of the expected count.
    pub high_threshold: u32,
    /// Lower bound of the expected count.
    pub low_threshold: u32,
    /// Interrupt when the count falls below the low threshold.
    pub interrupt_on_low: bool,
    /// Interrupt when the count exceeds the high threshold.
    pub interrupt_on_high: bool,
}
