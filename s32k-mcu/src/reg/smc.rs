//! System Mode Controller.

use vcell::VolatileCell;

/// SMC register block.
#[repr(C)]
pub struct RegisterBlock {
    /// Version ID Register
    pub verid: VolatileCell<u32>,
    /// Parameter Register
    pub param: VolatileCell<u32>,
    /// Power Mode Protection Register
    pub pmprot: VolatileCell<u32>,
    /// Power Mode Control Register
    pub pmctrl: VolatileCell<u32>,
    /// Stop Control Register
    pub stopctrl: VolatileCell<u32>,
    /// Power Mode Status Register (read-only)
    pub pmstat: VolatileCell<u32>,
}

/// PMPROT fields. Writable once after reset.
pub mod pmprot {
    /// Allow very-low-power modes.
    pub const AVLP: u32 = 1 << 5;
    /// Allow high-speed run mode.
    pub const AHSRUN: u32 = 1 << 7;
}

/// PMCTRL fields.
pub mod pmctrl {
    pub const STOPM_SHIFT: u32 = 0;
    pub const STOPM_MASK: u32 = 0x0000_0007;
    pub const RUNM_SHIFT: u32 = 5;
    pub const RUNM_MASK: u32 = 0x0000_0060;
}

/// RUNM field encodings.
pub mod runm {
    pub const RUN: u32 = 0b00;
    pub const VLPR: u32 = 0b10;
    pub const HSRUN: u32 = 0b11;
}

/// STOPM field encodings.
pub mod stopm {
    pub const STOP: u32 = 0b000;
    pub const VLPS: u32 = 0b010;
}

/// STOPCTRL fields.
pub mod stopctrl {
    pub const STOPO_SHIFT: u32 = 6;
    pub const STOPO_MASK: u32 = 0x0000_00C0;
    /// Stop with both system and bus clock disabled.
    pub const STOPO_STOP1: u32 = 0b01;
    /// Stop with system clock disabled, bus clock running.
    pub const STOPO_STOP2: u32 = 0b10;
}

/// PMSTAT encodings.
pub mod pmstat {
    pub const RUN: u32 = 0x01;
    pub const STOP: u32 = 0x02;
    pub const VLPR: u32 = 0x04;
    pub const VLPS: u32 = 0x10;
    pub const HSRUN: u32 = 0x80;
}

#[cfg(test)]
impl RegisterBlock {
    pub(crate) fn new() -> Self {
        Self {
            verid: VolatileCell::new(0),
            param: VolatileCell::new(0),
            pmprot: VolatileCell::new(0),
            pmctrl: VolatileCell::new(0),
            stopctrl: VolatileCell::new(0),
            pmstat: VolatileCell::new(pmstat::RUN),
        }
    }
}
