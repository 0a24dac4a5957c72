//! Memory error manager configuration

use crate::fault::FaultId;

/// Memory channels covered by the error hardware.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MemoryChannel {
    /// Lower SRAM bank.
    SramL = 0,
    /// Upper SRAM bank.
    SramU = 1,
}

/// Root configuration aggregate for the memory error manager.
pub struct McemConfig<'a> {
    /// Interrupt routing per reporting channel.
    pub channels: &'a [ChannelConfig],
    /// Injection masks per channel; a channel without an entry cannot be
    /// used for fault injection.
    pub injection: &'a [InjectionChannel],
    /// A successful `init` moves the driver into the terminal `Locked`
    /// state; any later `init` is rejected without touching hardware.
    pub lockable: bool,
    /// Invoked from the error interrupt handler with the fault identity
    /// and the address of the faulting access.
    pub notification: Option<fn(FaultId, u32)>,
}

/// Interrupt routing of one reporting channel.
#[derive(Copy, Clone)]
pub struct ChannelConfig {
    /// The channel to program.
    pub channel: MemoryChannel,
    /// Interrupt on corrected single-bit errors.
    pub correctable_interrupt: bool,
    /// Interrupt on non-correctable errors.
    pub noncorrectable_interrupt: bool,
}

/// Injection masks of one channel.
///
/// A mask with a single check bit set produces a correctable error on the
/// next read-back; two or more flipped bits produce a non-correctable one.
#[derive(Copy, Clone)]
pub struct InjectionChannel {
    /// The channel the masks apply to.
    pub channel: MemoryChannel,
    /// Check-bit flip mask (7 bits).
    pub check_bit_mask: u8,
    /// Data flip mask.
    pub data_mask: u32,
}
