#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Config, EntityKind, IdGenStatus, IdGenerator, Result, Snapshot, TimeSource,
    generator::{
        Mutex,
        engine::{Engine, State, Step},
    },
};

/// A lock-based generator with one critical section per attempt.
///
/// The clock is read, the transition rule applied, and the new state written
/// back while holding the lock.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Fair access across threads
///
/// ## Recommended When
/// - Fair access across threads is important
/// - Your target doesn't support 64-bit atomics
///
/// ## See Also
/// - [`AtomicGenerator`]
///
/// [`AtomicGenerator`]: crate::AtomicGenerator
pub struct LockGenerator<T>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<u64>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<u64>,
    engine: Engine,
    time: T,
}

impl<T> LockGenerator<T>
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
    /// use flakeid::{Config, IdGenerator, LockGenerator, SystemClock, Topology};
    ///
    /// let generator = LockGenerator::new(Config::new(Topology::new(0, 0, 9)), SystemClock)?;
    /// let ids = generator.generate_batch(3)?;
    /// assert!(ids.windows(2).all(|w| w[0] < w[1]));
    /// # Ok::<(), flakeid::Error>(())
    /// ```
    pub fn new(config: Config, time: T) -> Result<Self> {
        let engine = Engine::new(config)?;
        let state = engine.initial_state(time.now_millis());
        Ok(Self::with_state(engine, state, time))
    }

    /// Creates a generator preloaded with an explicit committed state.
    ///
    /// See [`crate::AtomicGenerator::from_state`].
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
            state: crossbeam_utils::CachePadded::new(Mutex::new(initial)),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(initial),
            engine,
            time,
        }
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    fn poll_with(&self, topology: u64) -> Result<IdGenStatus> {
        let mut state = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        // Read under the lock so no later commit can precede this reading.
        let now = self.time.now_millis();

        match self
            .engine
            .transition(now, self.engine.decode_state(*state))?
        {
            Step::Advance(next) => {
                *state = self.engine.encode_state(next);
                Ok(IdGenStatus::Ready {
                    id: self.engine.pack_id(next, topology),
                })
            }
            Step::Exhausted => Ok(IdGenStatus::Pending { yield_for: 1 }),
        }
    }
}

impl<T> IdGenerator for LockGenerator<T>
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
        let raw = {
            #[cfg(feature = "parking-lot")]
            {
                *self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                *self.state.lock()?
            }
        };
        Ok(self.engine.snapshot(self.engine.decode_state(raw)))
    }
}
