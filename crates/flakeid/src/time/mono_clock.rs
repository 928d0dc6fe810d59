use core::time::Duration;
use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use crate::TimeSource;

/// Shared ticker thread that updates every millisecond.
#[derive(Debug)]
struct SharedTickerInner {
    current: AtomicU64,
    _handle: OnceLock<JoinHandle<()>>,
}

/// A monotonic time source aligned to the UNIX epoch.
///
/// The wall clock is read once, at construction. From then on a background
/// thread advances a shared counter from a monotonic timer (`Instant`) once
/// per millisecond, so readings never go backward even if the system clock is
/// adjusted. Clones share the same ticker; the thread exits once the last
/// clone is dropped.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<SharedTickerInner>,
    start_millis: u64,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Starts a new ticker anchored to the current wall-clock time.
    ///
    /// A wall clock set before 1970 anchors the clock at `0`.
    ///
    /// # Example
    ///
    /// ```
    /// use flakeid::{MonotonicClock, TimeSource};
    ///
    /// let clock = MonotonicClock::new();
    /// let a = clock.now_millis();
    /// std::thread::sleep(std::time::Duration::from_millis(3));
    /// assert!(clock.now_millis() >= a);
    /// ```
    pub fn new() -> Self {
        let start = Instant::now();
        let start_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
            });

        let inner = Arc::new(SharedTickerInner {
            current: AtomicU64::new(0),
            _handle: OnceLock::new(),
        });

        let weak_inner = Arc::downgrade(&inner);
        let handle = thread::spawn(move || {
            let mut tick = 0;

            loop {
                let Some(inner_ref) = weak_inner.upgrade() else {
                    break;
                };

                // Absolute target time of the next tick
                let target = start + Duration::from_millis(tick);

                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                inner_ref.current.store(now_ms, Ordering::Release);

                // Align to the next tick after the actual time
                tick = now_ms.saturating_add(1);
            }
        });

        // Freshly created, so the cell is empty.
        let _ = inner._handle.set(handle);

        Self {
            inner,
            start_millis,
        }
    }
}

impl TimeSource for MonotonicClock {
    /// Wall-clock time at construction plus the monotonic time elapsed since.
    fn now_millis(&self) -> u64 {
        self.start_millis
            .saturating_add(self.inner.current.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_clock_never_goes_backward() {
        let clock = MonotonicClock::new();
        let mut last = clock.now_millis();
        for _ in 0..10_000 {
            let now = clock.now_millis();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn monotonic_clock_advances() {
        let clock = MonotonicClock::new();
        let before = clock.now_millis();
        thread::sleep(Duration::from_millis(20));
        assert!(clock.now_millis() > before);
    }

    #[test]
    fn clones_share_the_ticker() {
        let clock = MonotonicClock::new();
        let clone = clock.clone();
        assert!(Arc::ptr_eq(&clock.inner, &clone.inner));
        assert_eq!(clock.start_millis, clone.start_millis);
    }
}
