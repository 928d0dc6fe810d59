use core::cmp::Ordering;

use crate::{
    Config, EntityKind, Error, Field, Fields, Result, Snapshot,
    layout::{shl, shr},
};

/// Committed generator state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct State {
    /// Last committed timestamp, in milliseconds since the configured epoch.
    pub(crate) timestamp: u64,
    /// Last sequence issued within `timestamp`.
    pub(crate) sequence: u64,
}

/// Result of applying the transition rule to one clock reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// Commit this state and issue an identifier from it.
    Advance(State),
    /// Every sequence value of the current millisecond has been issued.
    Exhausted,
}

/// The transition rule and packing shared by every generator strategy.
///
/// The state word packs the sequence into the low `sequence` bits and the
/// timestamp above it, so the whole state fits one `u64` and can be swapped
/// atomically.
#[derive(Clone, Debug)]
pub(crate) struct Engine {
    config: Config,
    epoch_millis: u64,
    max_timestamp: u64,
    max_sequence: u64,
    sequence_bits: u8,
    topology: u64,
}

impl Engine {
    pub(crate) fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let layout = config.layout();
        Ok(Self {
            epoch_millis: config.epoch_millis(),
            max_timestamp: layout.max_timestamp(),
            max_sequence: layout.max_sequence(),
            sequence_bits: layout.bits(Field::Sequence),
            topology: config.pack(0, 0),
            config,
        })
    }

    pub(crate) const fn config(&self) -> &Config {
        &self.config
    }

    /// Topology bits of this generator's own identity, already in position.
    pub(crate) const fn topology(&self) -> u64 {
        self.topology
    }

    /// Topology bits with the app field replaced by the entity's code.
    pub(crate) fn topology_for(&self, kind: &EntityKind) -> Result<u64> {
        let layout = self.config.layout();
        layout.check(Field::App, kind.code())?;
        let topology = self.config.topology();
        Ok(layout.pack(&Fields {
            region: topology.region,
            app: kind.code(),
            machine: topology.machine,
            ..Fields::default()
        }))
    }

    /// State at construction: the current reading with sequence zero.
    ///
    /// A reading before the epoch starts at zero and one past the timestamp
    /// range is clamped to its maximum; generation then reports the condition.
    pub(crate) fn initial_state(&self, now: u64) -> State {
        State {
            timestamp: now
                .saturating_sub(self.epoch_millis)
                .min(self.max_timestamp),
            sequence: 0,
        }
    }

    pub(crate) fn restored_state(&self, timestamp: u64, sequence: u64) -> Result<State> {
        let layout = self.config.layout();
        layout.check(Field::Timestamp, timestamp)?;
        layout.check(Field::Sequence, sequence)?;
        Ok(State {
            timestamp,
            sequence,
        })
    }

    pub(crate) const fn encode_state(&self, state: State) -> u64 {
        shl(state.timestamp, self.sequence_bits) | (state.sequence & self.max_sequence)
    }

    pub(crate) const fn decode_state(&self, raw: u64) -> State {
        State {
            timestamp: shr(raw, self.sequence_bits),
            sequence: raw & self.max_sequence,
        }
    }

    /// Applies the transition rule to a clock reading (milliseconds since the
    /// UNIX epoch) and the last committed state.
    ///
    /// - behind the committed timestamp: [`Error::ClockRegression`]
    /// - same millisecond: next sequence, or [`Step::Exhausted`] at the maximum
    /// - later millisecond: sequence restarts at zero, unless the timestamp no
    ///   longer fits ([`Error::TimestampOverflow`])
    pub(crate) fn transition(&self, now: u64, current: State) -> Result<Step> {
        let now = self.elapsed(now)?;
        match now.cmp(&current.timestamp) {
            Ordering::Equal => {
                if current.sequence < self.max_sequence {
                    Ok(Step::Advance(State {
                        timestamp: now,
                        sequence: current.sequence + 1,
                    }))
                } else {
                    Ok(Step::Exhausted)
                }
            }
            Ordering::Greater => {
                if now > self.max_timestamp {
                    return Err(self.cold_timestamp_overflow(now));
                }
                Ok(Step::Advance(State {
                    timestamp: now,
                    sequence: 0,
                }))
            }
            Ordering::Less => Err(Self::cold_clock_behind(now, current.timestamp)),
        }
    }

    /// Packs a committed state with the given topology bits.
    pub(crate) const fn pack_id(&self, state: State, topology: u64) -> u64 {
        let layout = self.config.layout();
        layout.place(Field::Timestamp, state.timestamp)
            | topology
            | layout.place(Field::Sequence, state.sequence)
    }

    pub(crate) fn snapshot(&self, state: State) -> Snapshot {
        Snapshot {
            last_timestamp_millis: self.epoch_millis.saturating_add(state.timestamp),
            last_elapsed_millis: state.timestamp,
            sequence: state.sequence,
        }
    }

    fn elapsed(&self, now: u64) -> Result<u64> {
        now.checked_sub(self.epoch_millis)
            .ok_or_else(|| self.cold_epoch_in_future(now))
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, last: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(now, last, "clock moved backwards");
        Error::ClockRegression { now, last }
    }

    #[cold]
    #[inline(never)]
    fn cold_timestamp_overflow(&self, timestamp: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(timestamp, max = self.max_timestamp, "timestamp field exhausted");
        Error::TimestampOverflow {
            timestamp,
            max: self.max_timestamp,
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_epoch_in_future(&self, now: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(now, epoch = self.epoch_millis, "epoch is in the future");
        Error::EpochInFuture {
            now,
            epoch: self.epoch_millis,
        }
    }
}
