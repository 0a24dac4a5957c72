//! Register blocks of the error injection and error reporting hardware.
//!
//! Same conventions as the MCU driver's register layer: `#[repr(C)]`
//! structs of [`vcell::VolatileCell`] fields, reserved filler between the
//! registers the driver touches.

#[allow(missing_docs)]
pub mod eim;
#[allow(missing_docs)]
pub mod erm;

/// EIM base address.
pub const EIM_BASE: usize = 0x4001_9000;
/// ERM base address.
pub const ERM_BASE: usize = 0x4001_8000;

/// Number of memory channels covered by EIM/ERM on this part.
pub const CHANNELS: usize = 2;

/// Borrowed register blocks of the memory error hardware.
pub struct Peripherals<'a> {
    /// Error Injection Module.
    pub eim: &'a eim::RegisterBlock,
    /// Error Reporting Module.
    pub erm: &'a erm::RegisterBlock,
}

impl Peripherals<'static> {
    /// Conjure the register blocks from their fixed addresses.
    ///
    /// # Safety
    /// The caller must guarantee that at most one [`Peripherals`] instance
    /// is live, that nothing else in the program writes these register
    /// blocks while it exists, and that the code runs on an S32K14x part.
    pub unsafe fn steal() -> Self {
        Self {
            eim: &*(EIM_BASE as *const eim::RegisterBlock),
            erm: &*(ERM_BASE as *const erm::RegisterBlock),
        }
    }
}
