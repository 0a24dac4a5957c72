#![no_std]
#![warn(missing_docs)]
//! # S32K memory error manager
//!
//! ## Overview
//! This crate manages the SRAM ECC machinery of the NXP S32K14x family:
//! the Error Reporting Module (ERM), which records corrected and
//! non-correctable memory errors per SRAM bank together with the faulting
//! address, and the Error Injection Module (EIM), which flips check or
//! data bits on the way into memory so the ECC path can be exercised on
//! purpose.
//!
//! It provides the following features:
//!
//! - fault reporting into a compact [`FaultSet`](fault::FaultSet)
//!   container, one bit per fault identity
//! - deliberate fault injection from preconfigured flip masks, armed per
//!   channel inside a critical section
//! - verified write-1-to-clear fault acknowledgement
//! - an interrupt entry point that clears recorded faults and forwards
//!   them, with the captured error address, to a configured callback
//!
//! The driver follows the same strict lifecycle as its MCU sibling:
//! nothing works before `init`, and a `lockable` configuration makes the
//! first successful `init` the only one.
//!
//! ## Usage
//!
//! ```no_run
//! use s32k_mcem::config::{ChannelConfig, InjectionChannel, McemConfig, MemoryChannel};
//! use s32k_mcem::driver::Mcem;
//! use s32k_mcem::fault::FaultId;
//! use s32k_mcem::reg::Peripherals;
//!
//! # fn main() -> Result<(), s32k_mcem::driver::Error> {
//! let config = McemConfig {
//!     channels: &[ChannelConfig {
//!         channel: MemoryChannel::SramL,
//!         correctable_interrupt: false,
//!         noncorrectable_interrupt: true,
//!     }],
//!     injection: &[InjectionChannel {
//!         channel: MemoryChannel::SramL,
//!         check_bit_mask: 0x01,
//!         data_mask: 0,
//!     }],
//!     lockable: true,
//!     notification: None,
//! };
//!
//! // Safety: this is the only place the register blocks are taken.
//! let peripherals = unsafe { Peripherals::steal() };
//! let mut mcem = Mcem::new(peripherals, ());
//! mcem.init(&config)?;
//!
//! // Exercise the ECC path on one location, then collect the verdict.
//! mcem.inject_fault(FaultId::SramLCorrectable)?;
//! let faults = mcem.errors()?;
//! if !faults.is_empty() {
//!     mcem.clear_faults(faults)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The second parameter of [`Mcem::new`](driver::Mcem::new) provides
//! critical sections for the injection read-modify-write; `()` is the
//! no-masking variant for single-context systems. On a Cortex-M target a
//! newtype over `cortex_m::interrupt::free` is the usual implementation.

pub mod config;
pub mod driver;
pub mod eim;
pub mod erm;
pub mod fault;
pub mod reg;

pub use s32k_mcal_core as core;
