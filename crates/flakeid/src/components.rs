use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

/// The lossless decomposition of an identifier.
///
/// Produced by [`crate::Config::decode`] and [`crate::IdGenerator::decode`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParsedComponents {
    /// Absolute time the identifier was issued, in milliseconds since the UNIX
    /// epoch (`epoch + elapsed_millis`).
    pub timestamp_millis: u64,
    /// Raw timestamp field: milliseconds since the configured epoch.
    pub elapsed_millis: u64,
    pub region: u64,
    pub app: u64,
    pub machine: u64,
    pub sequence: u64,
}

impl ParsedComponents {
    /// Absolute issue time as a [`Duration`] since the UNIX epoch.
    pub const fn timestamp(&self) -> Duration {
        Duration::from_millis(self.timestamp_millis)
    }

    /// Absolute issue time as a [`SystemTime`], or `None` if the platform
    /// cannot represent it.
    pub fn system_time(&self) -> Option<SystemTime> {
        UNIX_EPOCH.checked_add(self.timestamp())
    }
}

/// A point-in-time view of a generator's committed state.
///
/// Reading it never mutates the generator.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Snapshot {
    /// Last committed timestamp, in milliseconds since the UNIX epoch.
    pub last_timestamp_millis: u64,
    /// Last committed timestamp, in milliseconds since the configured epoch.
    pub last_elapsed_millis: u64,
    /// Last committed sequence within that millisecond.
    pub sequence: u64,
}
