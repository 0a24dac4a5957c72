//! Error Reporting Module driver.

use crate::config::ChannelConfig;
use crate::fault::{FaultId, FaultSet};
use crate::reg::erm::{self, cr0, sr0};

/// The status flag did not clear on read-back.
#[derive(Debug)]
pub struct ClearFailed;

fn hw_flag(fault: FaultId) -> u32 {
    let channel = fault.channel();
    if fault.is_correctable() {
        sr0::single_bit(channel)
    } else {
        sr0::noncorrectable(channel)
    }
}

/// ERM driver.
pub struct Erm<'a> {
    regs: &'a erm::RegisterBlock,
}

impl<'a> Erm<'a> {
    /// Create a driver over the given register block.
    pub fn new(regs: &'a erm::RegisterBlock) -> Self {
        Self { regs }
    }

    /// Program the per-channel interrupt enables.
    pub fn apply(&self, channels: &[ChannelConfig]) {
        let mut word = 0;
        for cfg in channels {
            let channel = cfg.channel as usize;
            if cfg.correctable_interrupt {
                word |= cr0::single_bit_irq(channel);
            }
            if cfg.noncorrectable_interrupt {
                word |= cr0::noncorrectable_irq(channel);
            }
        }
        self.regs.cr0.set(word);
    }

    /// Clear every recorded event.
    pub fn clear_all(&self) {
        self.regs.sr0.set(sr0::FLAGS);
    }

    /// Map the status register onto a fault container.
    pub fn status(&self) -> FaultSet {
        let raw = self.regs.sr0.get();
        let mut set = FaultSet::empty();
        for index in 0..crate::fault::FAULT_COUNT {
            // The numbering is dense, so the conversion cannot fail here.
            let Ok(fault) = FaultId::try_from(index) else {
                break;
            };
            if raw & hw_flag(fault) != 0 {
                set.insert(fault);
            }
        }
        set
    }

    /// Clear one fault flag and confirm it actually cleared.
    ///
    /// Write-1-to-clear followed by a read-back; the single re-read is the
    /// only verification the hardware protocol gives us.
    pub fn clear(&self, fault: FaultId) -> Result<(), ClearFailed> {
        let flag = hw_flag(fault);
        self.regs.sr0.set(flag);
        if self.regs.sr0.get() & flag == 0 {
            Ok(())
        } else {
            Err(ClearFailed)
        }
    }

    /// Clear one fault flag without verification, for interrupt context.
    pub fn clear_raw(&self, fault: FaultId) {
        self.regs.sr0.set(hw_flag(fault));
    }

    /// Address of the last faulting access on a channel.
    pub fn error_address(&self, channel: usize) -> u32 {
        self.regs.channels[channel].ear.get()
    }
}
