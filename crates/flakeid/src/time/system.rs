use std::time::{SystemTime, UNIX_EPOCH};

use crate::TimeSource;

/// Reads [`SystemTime::now`] on every call.
///
/// The wall clock can be stepped backwards by NTP or an operator; generators
/// surface that as [`crate::Error::ClockRegression`]. Prefer
/// [`crate::MonotonicClock`] for long-lived generators.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
            })
    }
}
