#![no_std]
#![warn(missing_docs)]
//! # S32K MCU driver
//!
//! ## Overview
//! This crate drives the clock, reset and power-mode hardware of the NXP
//! S32K14x family: the SCG clock sources and system mux, SIM-level clock
//! routing, per-peripheral gating (PCC), low-voltage supervision (PMC),
//! power mode control (SMC), reset control (RCM) and the clock monitor
//! units.
//!
//! It provides the following features:
//!
//! - full clock tree bring-up from an immutable, `const`-constructible
//!   configuration, in the source → mux → gating → monitor order the
//!   hardware mandates
//! - deferred switch-over to the PLL so the caller controls when the core
//!   speeds up
//! - power mode transitions including the stop-mode clock teardown
//! - reset cause decoding and software reset requests
//! - RAM section initialization
//!
//! Every hardware wait is a polling loop with a configured iteration
//! budget. A wait that misses its budget is *reported* through the
//! [`Reporter`](s32k_mcal_core::Reporter) seam and the sequence continues;
//! the drivers never spin forever and never abort a half-applied tree.
//!
//! The driver state machine is deliberately strict: entry points are
//! rejected before `init`, and a configuration marked `lockable` makes the
//! first successful `init` the only one.
//!
//! ## Usage
//!
//! ```no_run
//! use s32k_mcu::config::clock::{
//!     ClockConfig, FircConfig, SimClockConfig, SircConfig, SourceControl, SystemClockConfig,
//!     SystemClockSetting, SystemClockSource, SystemDivider, SystemDividers,
//! };
//! use s32k_mcu::config::{
//!     ClockSetting, LowVoltageConfig, McuConfig, McuEvents, ModeConfig, ModeProtection,
//!     PowerMode, ResetConfig,
//! };
//! use s32k_mcu::driver::Mcu;
//! use s32k_mcu::reg::Peripherals;
//!
//! # fn main() -> Result<(), s32k_mcu::driver::Error> {
//! let clocks = [ClockConfig {
//!     sim: SimClockConfig::default(),
//!     scg_clkout: None,
//!     sirc: SircConfig::default(),
//!     firc: SourceControl::Enabled(FircConfig::default()),
//!     sosc: SourceControl::Unmanaged,
//!     spll: SourceControl::Unmanaged,
//!     system: SystemClockConfig {
//!         run: SystemClockSetting {
//!             source: SystemClockSource::FastIrc,
//!             dividers: SystemDividers {
//!                 core: SystemDivider::By1,
//!                 bus: SystemDivider::By2,
//!                 slow: SystemDivider::By4,
//!             },
//!         },
//!         very_low_power: None,
//!         high_speed: None,
//!     },
//!     peripherals: &[],
//!     monitors: &[],
//! }];
//! let config = McuConfig {
//!     reset: ResetConfig::default(),
//!     low_voltage: LowVoltageConfig::default(),
//!     mode_protection: ModeProtection::default(),
//!     clock_configs: &clocks,
//!     modes: &[ModeConfig {
//!         mode: PowerMode::Run,
//!     }],
//!     ram_sections: &[],
//!     lockable: true,
//!     timeout_loops: 10_000,
//!     events: McuEvents::default(),
//!     clock_failure_notification: None,
//! };
//!
//! // Safety: this is the only place the register blocks are taken.
//! let peripherals = unsafe { Peripherals::steal() };
//! let mut mcu = Mcu::new(peripherals, ());
//! mcu.init(&config)?;
//! mcu.init_clock(ClockSetting(0))?;
//! # Ok(())
//! # }
//! ```
//!
//! The second parameter of [`Mcu::new`](driver::Mcu::new) is the
//! diagnostics sink; `()` discards all hardware failure reports. Projects
//! with an event store implement
//! [`Reporter`](s32k_mcal_core::Reporter) once and pass that instead.

pub mod cmu;
pub mod config;
pub mod driver;
pub mod pcc;
pub mod pmc;
mod poll;
pub mod rcm;
pub mod reg;
pub mod scg;
pub mod sim;
pub mod smc;

pub use fugit;
pub use s32k_mcal_core as core;
