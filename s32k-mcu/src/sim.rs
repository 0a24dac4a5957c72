//! System Integration Module driver.

use crate::config::clock::SimClockConfig;
use crate::reg::sim::{self, chipctl, clkdiv4, lpoclks, platcgc};
use crate::reg::Rmw;

/// SIM driver.
pub struct Sim<'a> {
    regs: &'a sim::RegisterBlock,
}

impl<'a> Sim<'a> {
    /// Create a driver over the given register block.
    pub fn new(regs: &'a sim::RegisterBlock) -> Self {
        Self { regs }
    }

    /// Program the SIM-level clock routing.
    pub fn apply(&self, cfg: &SimClockConfig) {
        // Close the CLKOUT gate before re-muxing so the pin never sees a
        // partially switched clock.
        self.regs.chipctl.clear_bits(chipctl::CLKOUTEN);
        self.regs.chipctl.modify(|r| {
            let mut word = r
                & !(chipctl::CLKOUTSEL_MASK
                    | chipctl::CLKOUTDIV_MASK
                    | chipctl::CLKOUTEN
                    | chipctl::TRACECLK_SEL);
            if let Some(clkout) = &cfg.clkout {
                word |= (clkout.source as u32) << chipctl::CLKOUTSEL_SHIFT
                    | u32::from(clkout.divide - 1) << chipctl::CLKOUTDIV_SHIFT
                    | chipctl::CLKOUTEN;
            }
            if let Some(trace) = &cfg.trace {
                if !trace.core_clock {
                    word |= chipctl::TRACECLK_SEL;
                }
            }
            word
        });

        let lpo = &cfg.lpo;
        let mut word = (lpo.source as u32) << lpoclks::LPOCLKSEL_SHIFT
            | (lpo.rtc_source as u32) << lpoclks::RTCCLKSEL_SHIFT;
        if lpo.lpo1k {
            word |= lpoclks::LPO1KCLKEN;
        }
        if lpo.lpo32k {
            word |= lpoclks::LPO32KCLKEN;
        }
        self.regs.lpoclks.set(word);

        let gating = &cfg.platform_gating;
        let mut word = 0;
        if gating.mscm {
            word |= platcgc::CGCMSCM;
        }
        if gating.mpu {
            word |= platcgc::CGCMPU;
        }
        if gating.dma {
            word |= platcgc::CGCDMA;
        }
        if gating.erm {
            word |= platcgc::CGCERM;
        }
        if gating.eim {
            word |= platcgc::CGCEIM;
        }
        self.regs.platcgc.set(word);

        self.regs.clkdiv4.set(match &cfg.trace {
            Some(trace) => {
                let mut word =
                    clkdiv4::TRACEDIVEN | u32::from(trace.divide - 1) << clkdiv4::TRACEDIV_SHIFT;
                if trace.fraction {
                    word |= clkdiv4::TRACEFRAC;
                }
                word
            }
            None => 0,
        });
    }
}
