//! Bounded polling over non-blocking hardware status checks.
//!
//! Hardware waits in this driver never block open-endedly: every wait is a
//! loop over an [`nb`]-style readiness probe with a fixed iteration budget.
//! The budget comes from the configuration, the reaction to an expired
//! budget (report and carry on) from the caller.

use core::convert::Infallible;

/// The poll budget ran out before the hardware reported ready.
pub(crate) struct Expired;

/// Probe `ready` up to `budget` times.
pub(crate) fn poll_limited(
    budget: u32,
    mut ready: impl FnMut() -> nb::Result<(), Infallible>,
) -> Result<(), Expired> {
    for _ in 0..budget {
        match ready() {
            Ok(()) => return Ok(()),
            Err(nb::Error::WouldBlock) => continue,
            Err(nb::Error::Other(never)) => match never {},
        }
    }
    Err(Expired)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn expires_after_exactly_the_budget() {
        let mut calls = 0;
        let result = poll_limited(100, || {
            calls += 1;
            Err(nb::Error::WouldBlock)
        });
        assert!(result.is_err());
        assert_eq!(calls, 100);
    }

    #[test]
    fn stops_on_first_ready() {
        let mut calls = 0;
        let result = poll_limited(100, || {
            calls += 1;
            if calls == 3 {
                Ok(())
            } else {
                Err(nb::Error::WouldBlock)
            }
        });
        assert!(result.is_ok());
        assert_eq!(calls, 3);
    }

    #[test]
    fn zero_budget_never_probes() {
        let mut calls = 0;
        let result = poll_limited(0, || {
            calls += 1;
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(calls, 0);
    }
}
