//! Reset Control Module.

use vcell::VolatileCell;

/// RCM register block.
#[repr(C)]
pub struct RegisterBlock {
    /// Version ID Register
    pub verid: VolatileCell<u32>,
    /// Parameter Register
    pub param: VolatileCell<u32>,
    /// System Reset Status Register (read-only, reflects the last reset)
    pub srs: VolatileCell<u32>,
    /// Reset Pin Control Register
    pub rpc: VolatileCell<u32>,
    /// Sticky System Reset Status Register (write 1 to clear)
    pub ssrs: VolatileCell<u32>,
    /// System Reset Interrupt Enable Register
    pub srie: VolatileCell<u32>,
}

/// SRS/SSRS/SRIE reset source bits (shared layout).
pub mod srs {
    /// Low-voltage detect.
    pub const LVD: u32 = 1 << 1;
    /// Loss of external clock.
    pub const LOC: u32 = 1 << 2;
    /// Loss of PLL lock.
    pub const LOL: u32 = 1 << 3;
    /// Clock monitor unit loss of clock.
    pub const CMU_LOC: u32 = 1 << 4;
    /// Watchdog.
    pub const WDOG: u32 = 1 << 5;
    /// External reset pin.
    pub const PIN: u32 = 1 << 6;
    /// Power-on reset.
    pub const POR: u32 = 1 << 7;
    /// JTAG reset.
    pub const JTAG: u32 = 1 << 8;
    /// Core lockup.
    pub const LOCKUP: u32 = 1 << 9;
    /// Software reset (SYSRESETREQ).
    pub const SW: u32 = 1 << 10;
    /// Debugger (MDM-AP) reset.
    pub const MDM_AP: u32 = 1 << 11;
    /// Stop mode acknowledge error.
    pub const SACKERR: u32 = 1 << 13;

    /// Every defined reset source.
    pub const ALL: u32 =
        LVD | LOC | LOL | CMU_LOC | WDOG | PIN | POR | JTAG | LOCKUP | SW | MDM_AP | SACKERR;
}

/// RPC fields.
pub mod rpc {
    /// Reset pin filter select in run and wait modes.
    pub const RSTFLTSRW_SHIFT: u32 = 0;
    pub const RSTFLTSRW_MASK: u32 = 0x0000_0003;
    /// Reset pin filter select in stop modes (LPO filter on/off).
    pub const RSTFLTSS: u32 = 1 << 2;
    /// Bus-clock filter width.
    pub const RSTFLTSEL_SHIFT: u32 = 8;
    pub const RSTFLTSEL_MASK: u32 = 0x0000_1F00;
}

/// RSTFLTSRW encodings.
pub mod rstfltsrw {
    pub const DISABLED: u32 = 0b00;
    pub const BUS_CLOCK: u32 = 0b01;
    pub const LPO_CLOCK: u32 = 0b10;
}

/// SRIE fields beyond the shared source bits.
pub mod srie {
    /// Reset delay (LPO cycles before the reset is asserted).
    pub const DELAY_SHIFT: u32 = 0;
    pub const DELAY_MASK: u32 = 0x0000_0003;
}

#[cfg(test)]
impl RegisterBlock {
    pub(crate) fn new() -> Self {
        Self {
            verid: VolatileCell::new(0),
            param: VolatileCell::new(0),
            srs: VolatileCell::new(0),
            rpc: VolatileCell::new(0),
            ssrs: VolatileCell::new(0),
            srie: VolatileCell::new(0),
        }
    }
}
