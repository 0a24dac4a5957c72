//! Driver façade: the public entry points and the state machine behind
//! them.
//!
//! The shape mirrors the MCU driver: per-operation re-entrancy guards,
//! strict lifecycle checks before any register is touched, and a terminal
//! locked state for configurations that forbid re-initialization. The one
//! extra ingredient is the critical section around fault injection, whose
//! read-modify-write on the shared enable register may otherwise race the
//! error interrupt handler.

use crate::config::McemConfig;
use crate::eim::Eim;
use crate::erm::{ClearFailed, Erm};
use crate::fault::{FaultId, FaultSet};
use crate::reg::Peripherals;
use s32k_mcal_core::{ApiGuard, InterruptControl};

/// Errors returned by the driver entry points.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The driver has not been initialized.
    Uninit,
    /// The driver is locked; re-initialization is not permitted.
    Locked,
    /// The entry point is already executing (re-entered from an interrupt
    /// context).
    Busy,
    /// The configuration has no injection masks for the fault's channel.
    NoInjectionChannel,
    /// A status flag did not clear on read-back.
    ClearFailed,
}

impl From<ClearFailed> for Error {
    fn from(_: ClearFailed) -> Self {
        Self::ClearFailed
    }
}

/// Driver lifecycle state.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum McemState {
    /// Not initialized; only `init` is accepted.
    Uninit,
    /// Initialized and re-initializable.
    Initialized,
    /// Initialized with a lockable configuration; terminal.
    Locked,
}

/// Module version record.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VersionInfo {
    /// AUTOSAR vendor identifier.
    pub vendor_id: u16,
    /// AUTOSAR module identifier.
    pub module_id: u16,
    /// Major software version.
    pub sw_major_version: u8,
    /// Minor software version.
    pub sw_minor_version: u8,
    /// Patch software version.
    pub sw_patch_version: u8,
}

/// Version of this driver.
pub const VERSION: VersionInfo = VersionInfo {
    vendor_id: 43,
    module_id: 255,
    sw_major_version: 0,
    sw_minor_version: 2,
    sw_patch_version: 0,
};

#[derive(Default)]
struct Guards {
    init: ApiGuard,
    inject: ApiGuard,
    errors: ApiGuard,
    clear: ApiGuard,
}

/// The memory error manager.
///
/// Owns the EIM and ERM register blocks; injection masks, interrupt
/// routing and the notification callback come from an immutable
/// [`McemConfig`].
pub struct Mcem<'a, I = ()> {
    periph: Peripherals<'a>,
    irq: I,
    config: Option<&'a McemConfig<'a>>,
    state: McemState,
    guards: Guards,
}

impl<'a, I: InterruptControl> Mcem<'a, I> {
    /// Create an uninitialized driver over the given register blocks.
    pub fn new(periph: Peripherals<'a>, irq: I) -> Self {
        Self {
            periph,
            irq,
            config: None,
            state: McemState::Uninit,
            guards: Guards::default(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> McemState {
        self.state
    }

    fn configured(&self) -> Result<&'a McemConfig<'a>, Error> {
        if self.state == McemState::Uninit {
            return Err(Error::Uninit);
        }
        self.config.ok_or(Error::Uninit)
    }

    /// Program interrupt routing, clear stale status and preload the
    /// injection masks. Injection itself stays globally disabled until a
    /// fault is explicitly injected.
    pub fn init(&mut self, config: &'a McemConfig<'a>) -> Result<(), Error> {
        let _token = self.guards.init.try_enter().ok_or(Error::Busy)?;
        if self.state == McemState::Locked {
            return Err(Error::Locked);
        }

        let erm = Erm::new(self.periph.erm);
        erm.apply(config.channels);
        erm.clear_all();

        let eim = Eim::new(self.periph.eim);
        eim.disable();
        for injection in config.injection {
            eim.program_channel(injection);
        }

        self.config = Some(config);
        self.state = if config.lockable {
            McemState::Locked
        } else {
            McemState::Initialized
        };
        Ok(())
    }

    /// Arm error injection for the given fault.
    ///
    /// The masks written at `init` take effect on the channel's next
    /// write-then-read sequence, which the caller performs on a location of
    /// its choosing. Rejected while uninitialized.
    pub fn inject_fault(&mut self, fault: FaultId) -> Result<(), Error> {
        let _token = self.guards.inject.try_enter().ok_or(Error::Busy)?;
        let config = self.configured()?;
        let channel = self.injection_channel(config, fault)?;

        let eim = Eim::new(self.periph.eim);
        self.irq.free(|| {
            eim.enable_channel(channel);
            eim.enable_global();
        });
        Ok(())
    }

    /// Arm error injection for every fault in the set.
    pub fn inject_faults(&mut self, faults: FaultSet) -> Result<(), Error> {
        let _token = self.guards.inject.try_enter().ok_or(Error::Busy)?;
        let config = self.configured()?;
        for fault in faults.iter() {
            self.injection_channel(config, fault)?;
        }

        let eim = Eim::new(self.periph.eim);
        self.irq.free(|| {
            for fault in faults.iter() {
                // Validated above; cannot fail anymore.
                if let Ok(channel) = self.injection_channel(config, fault) {
                    eim.enable_channel(channel);
                }
            }
            eim.enable_global();
        });
        Ok(())
    }

    fn injection_channel(
        &self,
        config: &McemConfig<'_>,
        fault: FaultId,
    ) -> Result<crate::config::MemoryChannel, Error> {
        config
            .injection
            .iter()
            .map(|injection| injection.channel)
            .find(|channel| *channel as usize == fault.channel())
            .ok_or(Error::NoInjectionChannel)
    }

    /// Collect the recorded faults into a container.
    ///
    /// An empty container is the all-clear; any set bit means the
    /// corresponding fault was detected since the last clear.
    pub fn errors(&mut self) -> Result<FaultSet, Error> {
        let _token = self.guards.errors.try_enter().ok_or(Error::Busy)?;
        self.configured()?;
        Ok(Erm::new(self.periph.erm).status())
    }

    /// Clear one recorded fault, verifying the flag actually went away.
    pub fn clear_fault(&mut self, fault: FaultId) -> Result<(), Error> {
        let _token = self.guards.clear.try_enter().ok_or(Error::Busy)?;
        self.configured()?;
        Erm::new(self.periph.erm).clear(fault)?;
        Ok(())
    }

    /// Clear every fault in the set; fails on the first flag that refuses.
    pub fn clear_faults(&mut self, faults: FaultSet) -> Result<(), Error> {
        let _token = self.guards.clear.try_enter().ok_or(Error::Busy)?;
        self.configured()?;
        let erm = Erm::new(self.periph.erm);
        for fault in faults.iter() {
            erm.clear(fault)?;
        }
        Ok(())
    }

    /// Error interrupt entry point.
    ///
    /// Clears every recorded fault so the interrupt cannot re-trigger,
    /// then notifies the integrator with the fault identity and the
    /// captured error address. Before `init` there is no configuration to
    /// resolve a callback from, so the handler only clears.
    pub fn handle_interrupt(&mut self) {
        let erm = Erm::new(self.periph.erm);
        let notification = match (self.state, self.config) {
            (McemState::Uninit, _) | (_, None) => None,
            (_, Some(config)) => config.notification,
        };
        for fault in erm.status().iter() {
            let address = erm.error_address(fault.channel());
            erm.clear_raw(fault);
            if let Some(notify) = notification {
                notify(fault, address);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{ChannelConfig, InjectionChannel, MemoryChannel};
    use crate::reg::{eim, erm};
    use core::cell::Cell;
    use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    struct Blocks {
        eim: eim::RegisterBlock,
        erm: erm::RegisterBlock,
    }

    impl Blocks {
        fn new() -> Self {
            Self {
                eim: eim::RegisterBlock::new(),
                erm: erm::RegisterBlock::new(),
            }
        }

        fn periph(&self) -> Peripherals<'_> {
            Peripherals {
                eim: &self.eim,
                erm: &self.erm,
            }
        }

        // Simulated hardware reaction: the write-1-to-clear performed by
        // `clear_all` during init leaves plain memory with the flags set,
        // so reset the cell the way real hardware would.
        fn settle_status(&self) {
            self.erm.sr0.set(0);
        }
    }

    #[derive(Default)]
    struct CountingIrq(Cell<u32>);

    impl InterruptControl for &CountingIrq {
        fn free<R>(&self, f: impl FnOnce() -> R) -> R {
            self.0.set(self.0.get() + 1);
            f()
        }
    }

    fn config() -> McemConfig<'static> {
        McemConfig {
            channels: &[
                ChannelConfig {
                    channel: MemoryChannel::SramL,
                    correctable_interrupt: false,
                    noncorrectable_interrupt: true,
                },
                ChannelConfig {
                    channel: MemoryChannel::SramU,
                    correctable_interrupt: true,
                    noncorrectable_interrupt: true,
                },
            ],
            injection: &[InjectionChannel {
                channel: MemoryChannel::SramL,
                check_bit_mask: 0x01,
                data_mask: 0,
            }],
            lockable: false,
            notification: None,
        }
    }

    #[test]
    fn init_locks_when_lockable() {
        let blocks = Blocks::new();
        let mut cfg = config();
        cfg.lockable = true;
        let irq = CountingIrq::default();
        let mut mcem = Mcem::new(blocks.periph(), &irq);

        assert!(mcem.init(&cfg).is_ok());
        assert_eq!(mcem.state(), McemState::Locked);
        assert!(matches!(mcem.init(&cfg), Err(Error::Locked)));
    }

    #[test]
    fn init_programs_interrupt_routing_and_masks() {
        let blocks = Blocks::new();
        let cfg = config();
        let irq = CountingIrq::default();
        let mut mcem = Mcem::new(blocks.periph(), &irq);
        mcem.init(&cfg).unwrap();

        use crate::reg::erm::cr0;
        assert_eq!(
            blocks.erm.cr0.get(),
            cr0::noncorrectable_irq(0) | cr0::single_bit_irq(1) | cr0::noncorrectable_irq(1)
        );
        use crate::reg::eim::word0;
        assert_eq!(
            blocks.eim.channels[0].word0.get(),
            1 << word0::CHKBIT_MASK_SHIFT
        );
        // Injection prepared but not armed.
        assert_eq!(blocks.eim.eimcr.get(), 0);
        assert_eq!(blocks.eim.eichen.get(), 0);
    }

    #[test]
    fn inject_rejected_while_uninit_then_accepted() {
        let blocks = Blocks::new();
        let cfg = config();
        let irq = CountingIrq::default();
        let mut mcem = Mcem::new(blocks.periph(), &irq);

        assert!(matches!(
            mcem.inject_fault(FaultId::SramLCorrectable),
            Err(Error::Uninit)
        ));
        assert_eq!(irq.0.get(), 0);

        mcem.init(&cfg).unwrap();
        assert!(mcem.inject_fault(FaultId::SramLCorrectable).is_ok());

        use crate::reg::eim::{eichen, eimcr};
        assert_eq!(blocks.eim.eimcr.get(), eimcr::GEIEN);
        assert_eq!(blocks.eim.eichen.get(), eichen::channel(0));
        // The enable sequence ran under exactly one critical section.
        assert_eq!(irq.0.get(), 1);
    }

    #[test]
    fn inject_requires_a_configured_channel() {
        let blocks = Blocks::new();
        let cfg = config();
        let irq = CountingIrq::default();
        let mut mcem = Mcem::new(blocks.periph(), &irq);
        mcem.init(&cfg).unwrap();

        // Only SramL carries injection masks in this configuration.
        assert!(matches!(
            mcem.inject_fault(FaultId::SramUNoncorrectable),
            Err(Error::NoInjectionChannel)
        ));
        assert_eq!(blocks.eim.eimcr.get(), 0);
    }

    #[test]
    fn errors_is_empty_while_the_status_register_reads_zero() {
        let blocks = Blocks::new();
        let cfg = config();
        let irq = CountingIrq::default();
        let mut mcem = Mcem::new(blocks.periph(), &irq);
        mcem.init(&cfg).unwrap();
        blocks.settle_status();

        assert!(mcem.errors().unwrap().is_empty());
    }

    #[test]
    fn errors_maps_status_bits_onto_the_container() {
        let blocks = Blocks::new();
        let cfg = config();
        let irq = CountingIrq::default();
        let mut mcem = Mcem::new(blocks.periph(), &irq);
        mcem.init(&cfg).unwrap();
        blocks.settle_status();

        use crate::reg::erm::sr0;
        blocks.erm.sr0.set(sr0::single_bit(1));
        let faults = mcem.errors().unwrap();
        assert!(faults.contains(FaultId::SramUCorrectable));
        assert_eq!(faults.iter().count(), 1);

        blocks.erm.sr0.set(sr0::noncorrectable(0) | sr0::single_bit(0));
        let faults = mcem.errors().unwrap();
        assert!(faults.contains(FaultId::SramLCorrectable));
        assert!(faults.contains(FaultId::SramLNoncorrectable));
        assert_eq!(faults.iter().count(), 2);
    }

    #[test]
    fn inject_get_clear_round_trip() {
        let blocks = Blocks::new();
        let cfg = config();
        let irq = CountingIrq::default();
        let mut mcem = Mcem::new(blocks.periph(), &irq);
        mcem.init(&cfg).unwrap();
        blocks.settle_status();

        mcem.inject_fault(FaultId::SramLNoncorrectable).unwrap();
        // Simulated hardware: the armed channel trips on the next access
        // and records the fault.
        use crate::reg::erm::sr0;
        blocks.erm.sr0.set(sr0::noncorrectable(0));

        let faults = mcem.errors().unwrap();
        assert!(faults.contains(FaultId::SramLNoncorrectable));

        // Simulated hardware: the flag obeys the write-1-to-clear.
        blocks.settle_status();
        assert!(mcem.errors().unwrap().is_empty());
    }

    #[test]
    fn clear_fault_writes_the_flag_and_detects_a_stuck_bit() {
        let blocks = Blocks::new();
        let cfg = config();
        let irq = CountingIrq::default();
        let mut mcem = Mcem::new(blocks.periph(), &irq);
        mcem.init(&cfg).unwrap();

        use crate::reg::erm::sr0;
        blocks.erm.sr0.set(sr0::single_bit(0) | sr0::noncorrectable(1));

        // Plain test memory keeps the written bit asserted, which is
        // exactly what a stuck flag looks like to the read-back check.
        assert!(matches!(
            mcem.clear_fault(FaultId::SramLCorrectable),
            Err(Error::ClearFailed)
        ));
        assert_eq!(blocks.erm.sr0.get(), sr0::single_bit(0));
    }

    static NOTIFIED_FAULTS: AtomicU32 = AtomicU32::new(0);
    static NOTIFIED_ADDRESS: AtomicUsize = AtomicUsize::new(0);

    fn record_notification(fault: FaultId, address: u32) {
        assert_eq!(fault, FaultId::SramLNoncorrectable);
        NOTIFIED_FAULTS.fetch_add(1, Ordering::Relaxed);
        NOTIFIED_ADDRESS.store(address as usize, Ordering::Relaxed);
    }

    #[test]
    fn interrupt_handler_notifies_with_the_faulting_address() {
        let blocks = Blocks::new();
        let mut cfg = config();
        cfg.notification = Some(record_notification);
        let irq = CountingIrq::default();
        let mut mcem = Mcem::new(blocks.periph(), &irq);

        use crate::reg::erm::sr0;

        // Uninitialized: the flag is consumed but nobody is notified.
        blocks.erm.sr0.set(sr0::noncorrectable(0));
        mcem.handle_interrupt();
        assert_eq!(NOTIFIED_FAULTS.load(Ordering::Relaxed), 0);

        mcem.init(&cfg).unwrap();
        blocks.settle_status();
        blocks.erm.channels[0].ear.set(0x2000_1234);
        blocks.erm.sr0.set(sr0::noncorrectable(0));
        mcem.handle_interrupt();
        assert_eq!(NOTIFIED_FAULTS.load(Ordering::Relaxed), 1);
        assert_eq!(NOTIFIED_ADDRESS.load(Ordering::Relaxed), 0x2000_1234);
    }
}
