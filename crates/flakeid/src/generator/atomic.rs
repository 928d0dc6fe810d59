use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Config, EntityKind, IdGenStatus, IdGenerator, Result, Snapshot, TimeSource,
    generator::engine::{Engine, State, Step},
};

/// A lock-free generator that commits state with compare-and-swap.
///
/// The `(timestamp, sequence)` state lives in a single [`AtomicU64`]. Each
/// attempt loads the word, reads the clock, computes the next word, and
/// publishes it with `compare_exchange`. A caller that loses the race commits
/// nothing and retries from a fresh clock reading.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ No blocking other than crossing a millisecond boundary
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access is sacrificed for higher throughput
///
/// ## See Also
/// - [`LockGenerator`]
///
/// [`LockGenerator`]: crate::LockGenerator
pub struct AtomicGenerator<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    engine: Engine,
    time: T,
}

impl<T> AtomicGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator whose state starts at the current clock reading
    /// with sequence zero.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidLayout`] or
    /// [`crate::Error::FieldOverflow`] if `config` does not validate.
    ///
    /// # Example
    /// ```
    /// use flakeid::{AtomicGenerator, Config, IdGenerator, MonotonicClock, Topology};
    ///
    /// let generator = AtomicGenerator::new(Config::new(Topology::new(2, 1, 7)), MonotonicClock::new())?;
    /// let a = generator.generate()?;
    /// let b = generator.generate()?;
    /// assert!(a < b);
    /// # Ok::<(), flakeid::Error>(())
    /// ```
    pub fn new(config: Config, time: T) -> Result<Self> {
        let engine = Engine::new(config)?;
        let state = engine.initial_state(time.now_millis());
        Ok(Self::with_state(engine, state, time))
    }

    /// Creates a generator preloaded with an explicit committed state.
    ///
    /// `timestamp` is in milliseconds since the configured epoch and
    /// `sequence` is the last sequence considered issued within it.
    ///
    /// # ⚠️ Note
    /// State is never persisted across restarts, so this exists for tests and
    /// tooling. In typical use cases, you should prefer [`Self::new`].
    ///
    /// # Errors
    ///
    /// As [`Self::new`], plus [`crate::Error::FieldOverflow`] if `timestamp`
    /// or `sequence` does not fit the layout.
    pub fn from_state(config: Config, timestamp: u64, sequence: u64, time: T) -> Result<Self> {
        let engine = Engine::new(config)?;
        let state = engine.restored_state(timestamp, sequence)?;
        Ok(Self::with_state(engine, state, time))
    }

    fn with_state(engine: Engine, state: State, time: T) -> Self {
        let initial = engine.encode_state(state);
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(initial)),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(initial),
            engine,
            time,
        }
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    fn poll_with(&self, topology: u64) -> Result<IdGenStatus> {
        // Load before reading the clock: any state observed here was committed
        // from a reading that happens-before ours, so a regression is real.
        let current_raw = self.state.load(Ordering::Acquire);
        let now = self.time.now_millis();

        let next = match self
            .engine
            .transition(now, self.engine.decode_state(current_raw))?
        {
            Step::Advance(next) => next,
            Step::Exhausted => return Ok(IdGenStatus::Pending { yield_for: 1 }),
        };

        if self
            .state
            .compare_exchange(
                current_raw,
                self.engine.encode_state(next),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            Ok(IdGenStatus::Ready {
                id: self.engine.pack_id(next, topology),
            })
        } else {
            // Another caller committed first. Retry immediately.
            Ok(IdGenStatus::Pending { yield_for: 0 })
        }
    }
}

impl<T> IdGenerator for AtomicGenerator<T>
where
    T: TimeSource,
{
    fn config(&self) -> &Config {
        self.engine.config()
    }

    fn try_poll_id(&self) -> Result<IdGenStatus> {
        self.poll_with(self.engine.topology())
    }

    fn try_poll_id_for(&self, kind: &EntityKind) -> Result<IdGenStatus> {
        let topology = self.engine.topology_for(kind)?;
        self.poll_with(topology)
    }

    fn snapshot(&self) -> Result<Snapshot> {
        let state = self.engine.decode_state(self.state.load(Ordering::Acquire));
        Ok(self.engine.snapshot(state))
    }
}
