//! ARM System Control Space, reduced to the registers the driver touches.

use vcell::VolatileCell;

/// System Control Block head (CPUID..AIRCR).
#[repr(C)]
pub struct RegisterBlock {
    /// CPUID Base Register
    pub cpuid: VolatileCell<u32>,
    /// Interrupt Control and State Register
    pub icsr: VolatileCell<u32>,
    /// Vector Table Offset Register
    pub vtor: VolatileCell<u32>,
    /// Application Interrupt and Reset Control Register
    pub aircr: VolatileCell<u32>,
}

/// AIRCR fields.
pub mod aircr {
    /// Key that must accompany every write.
    pub const VECTKEY: u32 = 0x05FA << 16;
    /// Request a system reset.
    pub const SYSRESETREQ: u32 = 1 << 2;
}

#[cfg(test)]
impl RegisterBlock {
    pub(crate) fn new() -> Self {
        Self {
            cpuid: VolatileCell::new(0),
            icsr: VolatileCell::new(0),
            vtor: VolatileCell::new(0),
            aircr: VolatileCell::new(0),
        }
    }
}
