//! MCU driver configuration
//!
//! The whole configuration is a tree of plain `const`-constructible structs.
//! An integrator typically builds one `static McuConfig` per project (the
//! post-build configuration of the system) and hands it to
//! [`Mcu::init`](crate::driver::Mcu::init); nothing in the tree is ever
//! mutated afterwards.

pub mod clock;

pub use clock::ClockConfig;

use crate::reg::rcm::srs;
use bitfield::bitfield;
use s32k_mcal_core::EventId;

/// Selects one of the clock trees in [`McuConfig::clock_configs`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockSetting(pub usize);

/// Selects one of the power mode targets in [`McuConfig::modes`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeSetting(pub usize);

/// Selects one of the RAM sections in [`McuConfig::ram_sections`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RamSectionSetting(pub usize);

/// Root configuration aggregate for the MCU driver.
pub struct McuConfig<'a> {
    /// Reset controller setup (pin filtering, reset interrupts).
    pub reset: ResetConfig,
    /// Low-voltage detect/warn circuitry setup.
    pub low_voltage: LowVoltageConfig,
    /// Which low-power modes the mode controller may enter at all.
    pub mode_protection: ModeProtection,
    /// Selectable clock trees; see [`ClockSetting`].
    pub clock_configs: &'a [ClockConfig<'a>],
    /// Selectable power mode targets; see [`ModeSetting`].
    pub modes: &'a [ModeConfig],
    /// RAM sections the driver may (re-)initialize; see
    /// [`RamSectionSetting`].
    pub ram_sections: &'a [RamSection],
    /// A successful `init` moves the driver into the terminal `Locked`
    /// state; any later `init` is rejected without touching hardware.
    pub lockable: bool,
    /// Poll budget for every hardware-valid wait, in loop iterations.
    pub timeout_loops: u32,
    /// Diagnostic events reported through the integration layer.
    pub events: McuEvents,
    /// Invoked from the clock monitor interrupt handler once per asserted
    /// monitor fault.
    pub clock_failure_notification: Option<fn(MonitorUnit, MonitorFault)>,
}

/// Diagnostic event identifiers. A `None` entry disables the report.
#[derive(Default, Copy, Clone)]
pub struct McuEvents {
    /// Reported (with a failure-point code) when a hardware wait exhausts
    /// [`McuConfig::timeout_loops`].
    pub timeout: Option<EventId>,
}

/// Clock monitor unit identity.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MonitorUnit {
    /// First monitor instance.
    Cmu0 = 0,
    /// Second monitor instance.
    Cmu1 = 1,
}

/// What a clock monitor observed when it raised its interrupt.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MonitorFault {
    /// Monitored frequency fell below the low threshold.
    FrequencyLow,
    /// Monitored frequency exceeded the high threshold.
    FrequencyHigh,
}

bitfield! {
    /// A set of reset sources.
    ///
    /// Bit positions match the hardware reset status register, so the same
    /// type describes both the interrupt-enable configuration and a decoded
    /// reset status.
    #[derive(Copy, Clone, Eq, PartialEq)]
    pub struct ResetSources(u32);

    /// Low-voltage detect
    pub low_voltage, set_low_voltage: 1;
    /// Loss of external clock
    pub loss_of_clock, set_loss_of_clock: 2;
    /// Loss of PLL lock
    pub loss_of_lock, set_loss_of_lock: 3;
    /// Clock monitor loss of clock
    pub clock_monitor, set_clock_monitor: 4;
    /// Watchdog
    pub watchdog, set_watchdog: 5;
    /// External reset pin
    pub pin, set_pin: 6;
    /// Power-on
    pub power_on, set_power_on: 7;
    /// JTAG
    pub jtag, set_jtag: 8;
    /// Core lockup
    pub lockup, set_lockup: 9;
    /// Software request
    pub software, set_software: 10;
    /// Debugger request
    pub debugger, set_debugger: 11;
    /// Stop mode acknowledge error
    pub stop_ack_error, set_stop_ack_error: 13;
}

impl ResetSources {
    /// No sources.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Set with the given raw source bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw value restricted to the defined source bits.
    pub fn bits(&self) -> u32 {
        self.0 & srs::ALL
    }

    /// Number of sources in the set.
    pub fn count(&self) -> u32 {
        self.bits().count_ones()
    }
}

/// Reset pin glitch filter in run and wait modes.
#[derive(Default, Copy, Clone)]
pub enum PinFilter {
    /// All filtering disabled.
    #[default]
    Disabled,
    /// Bus clock filter with a width of 1 to 32 clocks.
    BusClock(u8),
    /// LPO clock filter (fixed width).
    LpoClock,
}

/// Reset controller configuration.
#[derive(Default, Copy, Clone)]
pub struct ResetConfig {
    /// Reset pin filtering while the chip runs.
    pub pin_filter: PinFilter,
    /// Keep the LPO filter active in stop modes.
    pub pin_filter_in_stop: bool,
    /// Sources that raise an interrupt (with a grace delay) instead of
    /// resetting immediately.
    pub interrupts: ResetInterrupts,
}

/// Reset interrupt configuration.
#[derive(Copy, Clone)]
pub struct ResetInterrupts {
    /// Sources to route to the reset interrupt.
    pub sources: ResetSources,
    /// Grace delay before the reset finally asserts.
    pub delay: ResetDelay,
}

impl Default for ResetInterrupts {
    fn default() -> Self {
        Self {
            sources: ResetSources::empty(),
            delay: ResetDelay::Lpo10Cycles,
        }
    }
}

/// Delay between a reset interrupt and the actual reset.
#[derive(Copy, Clone)]
pub enum ResetDelay {
    /// 10 LPO cycles.
    Lpo10Cycles = 0,
    /// 34 LPO cycles.
    Lpo34Cycles = 1,
    /// 130 LPO cycles.
    Lpo130Cycles = 2,
    /// 514 LPO cycles.
    Lpo514Cycles = 3,
}

/// Low-voltage detect/warn configuration.
#[derive(Default, Copy, Clone)]
pub struct LowVoltageConfig {
    /// Reset on low-voltage detect.
    pub detect_reset: bool,
    /// Interrupt on low-voltage detect.
    pub detect_interrupt: bool,
    /// Interrupt on low-voltage warning.
    pub warning_interrupt: bool,
    /// Keep the core bias circuitry enabled (required for low-power modes).
    pub bias: bool,
    /// Disable the clock bias in stop modes.
    pub stop_clock_bias_disabled: bool,
    /// Disable the low-power oscillator entirely.
    pub lpo_disabled: bool,
}

/// Power modes the mode controller may enter. Written once at `init`.
#[derive(Default, Copy, Clone)]
pub struct ModeProtection {
    /// Allow VLPR/VLPS.
    pub allow_very_low_power: bool,
    /// Allow HSRUN.
    pub allow_high_speed: bool,
}

/// One selectable power mode target.
#[derive(Copy, Clone)]
pub struct ModeConfig {
    /// The mode entered when this target is selected.
    pub mode: PowerMode,
}

/// Power mode targets of the mode controller.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerMode {
    /// Normal run.
    Run,
    /// High-speed run.
    HighSpeedRun,
    /// Very-low-power run.
    VeryLowPowerRun,
    /// Stop with system and bus clock gated.
    Stop1,
    /// Stop with the bus clock kept running.
    Stop2,
    /// Very-low-power stop.
    VeryLowPowerStop,
}

impl PowerMode {
    /// `true` for the stop-family targets that require the clock teardown
    /// sequence before the transition request.
    pub fn is_low_power(&self) -> bool {
        matches!(
            self,
            PowerMode::Stop1 | PowerMode::Stop2 | PowerMode::VeryLowPowerStop
        )
    }
}

/// A RAM section the driver may initialize to a known fill pattern.
#[derive(Copy, Clone)]
pub struct RamSection {
    base: usize,
    words: usize,
    fill: u32,
}

impl RamSection {
    /// Describe a RAM section.
    ///
    /// # Safety
    /// `base` must be word-aligned and `[base, base + 4 * words)` must be
    /// plain RAM that is safe to overwrite at any point the section is
    /// passed to [`Mcu::init_ram_section`](crate::driver::Mcu::init_ram_section).
    pub const unsafe fn new(base: usize, words: usize, fill: u32) -> Self {
        Self { base, words, fill }
    }

    pub(crate) fn base(&self) -> usize {
        self.base
    }

    pub(crate) fn words(&self) -> usize {
        self.words
    }

    pub(crate) fn fill(&self) -> u32 {
        self.fill
    }
}
