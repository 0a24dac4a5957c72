//! Error Injection Module driver.

use crate::config::{InjectionChannel, MemoryChannel};
use crate::reg::eim::{self, eichen, eimcr, word0};

/// EIM driver.
pub struct Eim<'a> {
    regs: &'a eim::RegisterBlock,
}

impl<'a> Eim<'a> {
    /// Create a driver over the given register block.
    pub fn new(regs: &'a eim::RegisterBlock) -> Self {
        Self { regs }
    }

    /// Switch all injection off.
    pub fn disable(&self) {
        self.regs.eimcr.set(0);
        self.regs.eichen.set(0);
    }

    /// Write the flip masks of one channel. Injection on the channel stays
    /// disabled until [`Eim::enable_channel`].
    pub fn program_channel(&self, injection: &InjectionChannel) {
        let descriptor = &self.regs.channels[injection.channel as usize];
        descriptor
            .word0
            .set(u32::from(injection.check_bit_mask) << word0::CHKBIT_MASK_SHIFT
                & word0::CHKBIT_MASK_MASK);
        descriptor.word1.set(injection.data_mask);
    }

    /// Arm injection on one channel.
    ///
    /// Read-modify-write on a register the interrupt handler may also be
    /// looking at; the caller brackets this in a critical section.
    pub fn enable_channel(&self, channel: MemoryChannel) {
        let current = self.regs.eichen.get();
        self.regs.eichen.set(current | eichen::channel(channel as usize));
    }

    /// Open the global injection gate.
    pub fn enable_global(&self) {
        self.regs.eimcr.set(eimcr::GEIEN);
    }
}
