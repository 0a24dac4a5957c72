//! Peripheral Clock Controller driver.

use crate::config::clock::PeripheralClockConfig;
use crate::reg::pcc::{self, pccn};

/// Peripheral slots of the S32K14x PCC.
///
/// The discriminant is the slot index in the PCC register file.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Peripheral {
    /// Flash controller.
    Ftfc = 32,
    /// DMA channel mux.
    Dmamux = 33,
    /// CAN 0.
    FlexCan0 = 36,
    /// CAN 1.
    FlexCan1 = 37,
    /// FlexTimer 3.
    Ftm3 = 38,
    /// ADC 1.
    Adc1 = 39,
    /// CAN 2.
    FlexCan2 = 43,
    /// SPI 0.
    Lpspi0 = 44,
    /// SPI 1.
    Lpspi1 = 45,
    /// SPI 2.
    Lpspi2 = 46,
    /// Programmable delay block 1.
    Pdb1 = 49,
    /// CRC engine.
    Crc = 50,
    /// Programmable delay block 0.
    Pdb0 = 54,
    /// Low-power interrupt timer.
    Lpit = 55,
    /// FlexTimer 0.
    Ftm0 = 56,
    /// FlexTimer 1.
    Ftm1 = 57,
    /// FlexTimer 2.
    Ftm2 = 58,
    /// ADC 0.
    Adc0 = 59,
    /// Real-time clock.
    Rtc = 61,
    /// Low-power timer.
    Lptmr0 = 64,
    /// Pin control port A.
    PortA = 73,
    /// Pin control port B.
    PortB = 74,
    /// Pin control port C.
    PortC = 75,
    /// Pin control port D.
    PortD = 76,
    /// Pin control port E.
    PortE = 77,
    /// FlexIO.
    FlexIo = 90,
    /// External watchdog monitor.
    Ewm = 97,
    /// I2C 0.
    Lpi2c0 = 102,
    /// I2C 1.
    Lpi2c1 = 103,
    /// UART 0.
    Lpuart0 = 106,
    /// UART 1.
    Lpuart1 = 107,
    /// UART 2.
    Lpuart2 = 108,
    /// Comparator 0.
    Cmp0 = 115,
}

impl Peripheral {
    /// Slot index in the PCC register file.
    pub fn slot(self) -> usize {
        self as usize
    }
}

/// PCC driver.
pub struct Pcc<'a> {
    regs: &'a pcc::RegisterBlock,
}

impl<'a> Pcc<'a> {
    /// Create a driver over the given register block.
    pub fn new(regs: &'a pcc::RegisterBlock) -> Self {
        Self { regs }
    }

    /// Program gating, source and divider for every listed peripheral.
    ///
    /// Slots whose present bit reads clear belong to peripherals this part
    /// does not have; they are skipped without a write.
    pub fn configure(&self, entries: &[PeripheralClockConfig]) {
        for entry in entries {
            self.configure_one(entry);
        }
    }

    fn configure_one(&self, entry: &PeripheralClockConfig) {
        let reg = &self.regs.pccn[entry.peripheral.slot()];
        if reg.get() & pccn::PR == 0 {
            return;
        }
        // The source select only accepts writes while the gate is closed.
        reg.set(0);
        let mut word = 0;
        if let Some(source) = entry.source {
            word |= (source as u32) << pccn::PCS_SHIFT;
        }
        if let Some(divider) = &entry.divider {
            word |= u32::from(divider.divide - 1) << pccn::PCD_SHIFT;
            if divider.fraction {
                word |= pccn::FRAC;
            }
        }
        reg.set(word);
        if entry.gate {
            reg.set(word | pccn::CGC);
        }
    }

    /// Raw PCC word of a slot.
    pub fn read(&self, peripheral: Peripheral) -> u32 {
        self.regs.pccn[peripheral.slot()].get()
    }
}
