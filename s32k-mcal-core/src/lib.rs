#![no_std]
#![warn(missing_docs)]

//! `s32k-mcal-core` provides a set of essential abstractions that serve as a
//! thin integration layer between the platform independent [`s32k-mcu`] /
//! [`s32k-mcem`] driver crates and the project that integrates them.
//!
//! The drivers never talk to a diagnostic manager or an interrupt controller
//! directly; both concerns are behind the traits in this crate so that the
//! integrator decides where hardware failure reports go and how critical
//! sections are entered on a given system. The unit type `()` implements
//! every trait as a no-op, which is the "diagnostics compiled out"
//! configuration.
//!
//! [`s32k-mcu`]: <https://docs.rs/crate/s32k-mcu/>
//! [`s32k-mcem`]: <https://docs.rs/crate/s32k-mcem/>

use core::sync::atomic::{AtomicBool, Ordering};

/// Identifier of a diagnostic event, assigned by the integrator.
///
/// The drivers do not interpret the value; it is handed back verbatim to the
/// [`Reporter`] so the integrator can route it into whatever event store the
/// system uses.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventId(pub u16);

/// Qualification of a reported diagnostic event.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventStatus {
    /// The monitored condition passed.
    Passed,
    /// The monitored condition failed.
    Failed,
}

/// Sink for hardware diagnostic events.
///
/// Hardware failures detected by the drivers (an oscillator that never
/// reports valid, a mode transition that never completes) are *reported*, not
/// returned: the affected operation carries on with the rest of its sequence
/// because the hardware offers no safe universal abort path. The report is
/// the only trace such a failure leaves.
///
/// Implementations must be callable from any context the driver entry points
/// run in; the drivers never call the reporter from an interrupt handler.
///
/// # Examples
/// ```
/// use s32k_mcal_core::{EventId, EventStatus, Reporter};
///
/// struct EventLog;
///
/// impl Reporter for EventLog {
///     fn report_status(&self, event: EventId, status: EventStatus) {
///         // forward to the system's diagnostic event manager
///         let _ = (event, status);
///     }
/// }
/// ```
pub trait Reporter {
    /// Report the qualification result of a monitored condition.
    fn report_status(&self, event: EventId, status: EventStatus);

    /// Report a hardware wait that exhausted its poll budget.
    ///
    /// `failure_point` identifies which wait inside a multi-stage sequence
    /// timed out; the code is driver specific and stable across releases.
    /// The default implementation drops the extended data and reports a
    /// plain failure.
    fn report_timeout(&self, event: EventId, failure_point: u8) {
        let _ = failure_point;
        self.report_status(event, EventStatus::Failed);
    }
}

/// Diagnostics compiled out.
impl Reporter for () {
    fn report_status(&self, _event: EventId, _status: EventStatus) {}
}

impl<R: Reporter> Reporter for &R {
    fn report_status(&self, event: EventId, status: EventStatus) {
        R::report_status(self, event, status)
    }

    fn report_timeout(&self, event: EventId, failure_point: u8) {
        R::report_timeout(self, event, failure_point)
    }
}

/// Provider of interrupt-free critical sections.
///
/// The drivers bracket the few read-modify-write sequences that may race
/// with their own interrupt handlers (fault injection being the prime
/// example) in [`InterruptControl::free`]. Everything else relies on the
/// single-context execution model and needs no masking.
///
/// On a bare-metal ARM target this is typically a newtype over
/// `cortex_m::interrupt::free`; on a host test it is `()`.
pub trait InterruptControl {
    /// Run `f` with interrupts masked.
    fn free<R>(&self, f: impl FnOnce() -> R) -> R;
}

/// No masking; valid whenever nothing can preempt the caller.
impl InterruptControl for () {
    fn free<R>(&self, f: impl FnOnce() -> R) -> R {
        f()
    }
}

/// Re-entrancy guard for a single driver entry point.
///
/// Each public driver operation owns one guard. The guard is taken at entry
/// and released when the returned [`ApiToken`] is dropped; a second take
/// while a token is live fails, which is how a call re-entered from an
/// interrupt context gets rejected before it touches hardware.
///
/// The flag is a real atomic, so the rejection holds under preemption and on
/// multi-core parts, not just under the cooperative single-context model the
/// drivers otherwise assume.
pub struct ApiGuard(AtomicBool);
impl ApiGuard {
    /// Create a released guard.
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Take the guard, or `None` if a call is already in flight.
    pub fn try_enter(&self) -> Option<ApiToken<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| ApiToken(&self.0))
    }
}

impl Default for ApiGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof that an [`ApiGuard`] is held; releases it on drop.
pub struct ApiToken<'a>(&'a AtomicBool);

impl Drop for ApiToken<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn guard_rejects_reentry() {
        let guard = ApiGuard::new();
        let token = guard.try_enter();
        assert!(token.is_some());
        assert!(guard.try_enter().is_none());
    }

    #[test]
    fn guard_releases_on_drop() {
        let guard = ApiGuard::new();
        drop(guard.try_enter());
        assert!(guard.try_enter().is_some());
    }

    #[test]
    fn default_timeout_report_degrades_to_failed_status() {
        use core::cell::Cell;

        struct Recorder(Cell<Option<(EventId, EventStatus)>>);
        impl Reporter for Recorder {
            fn report_status(&self, event: EventId, status: EventStatus) {
                self.0.set(Some((event, status)));
            }
        }

        let recorder = Recorder(Cell::new(None));
        recorder.report_timeout(EventId(7), 3);
        assert_eq!(recorder.0.get(), Some((EventId(7), EventStatus::Failed)));
    }
}
