use core::time::Duration;
use std::{rc::Rc, sync::Arc};

/// Default epoch: Wednesday, January 1, 2020 00:00:00 UTC
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_577_836_800_000);

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC
pub const DISCORD_EPOCH: Duration = Duration::from_millis(1_420_070_400_000);

/// Instagram epoch: Saturday, January 1, 2011 00:00:00 UTC
pub const INSTAGRAM_EPOCH: Duration = Duration::from_millis(1_293_840_000_000);

/// Mastodon uses standard UNIX epoch: Thursday, January 1, 1970 00:00:00 UTC
pub const MASTODON_EPOCH: Duration = Duration::from_millis(0);

/// A source of wall-clock time in milliseconds since the UNIX epoch.
///
/// Generators subtract their configured epoch from this reading. Implement it
/// to plug in a mocked clock for tests.
///
/// # Example
///
/// ```
/// use flakeid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn now_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.now_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since 1970-01-01 UTC.
    fn now_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Rc<T> {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Box<T> {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}
