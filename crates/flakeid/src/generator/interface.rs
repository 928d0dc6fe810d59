use core::time::Duration;

use crate::{Config, EntityKind, Error, IdGenStatus, ParsedComponents, Result, Snapshot};

/// How long [`IdGenerator::generate`] sleeps between polls while the
/// sequence space of the current millisecond is exhausted.
pub const EXHAUSTED_BACKOFF: Duration = Duration::from_micros(50);

/// Upper bound on what [`IdGenerator::generate_batch`] reserves up front.
const MAX_BATCH_PREALLOC: usize = 4096;

/// The generator contract shared by [`crate::AtomicGenerator`] and
/// [`crate::LockGenerator`].
///
/// Implementations only provide the non-blocking [`Self::try_poll_id`] family;
/// the blocking, batch, and decode operations are derived from it.
///
/// A generator is meant to be created once and passed by reference (or in an
/// `Arc`) to every caller that needs identifiers.
pub trait IdGenerator {
    /// The configuration this generator was built from.
    fn config(&self) -> &Config;

    /// Makes one attempt at committing the next `(timestamp, sequence)` pair.
    ///
    /// Never blocks. See [`IdGenStatus`] for the meaning of `Pending`.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock is behind the committed state
    /// - [`Error::EpochInFuture`] if the clock is behind the epoch
    /// - [`Error::TimestampOverflow`] if the layout's time range is used up
    /// - `Error::LockPoisoned` for a poisoned lock-based generator (std
    ///   mutex only)
    fn try_poll_id(&self) -> Result<IdGenStatus>;

    /// Like [`Self::try_poll_id`], with the app field set to `kind`'s code
    /// instead of the configured app ID.
    ///
    /// The sequence counter is shared by every kind, so identifiers stay
    /// unique across kinds. They sort in issue order only within one kind:
    /// the app field sits above the sequence, so within a millisecond an
    /// identifier with a higher code sorts after one with a lower code
    /// regardless of which was issued first.
    ///
    /// # Errors
    ///
    /// As [`Self::try_poll_id`], plus [`Error::FieldOverflow`] if the code
    /// does not fit the app field.
    fn try_poll_id_for(&self, kind: &EntityKind) -> Result<IdGenStatus>;

    /// Reads the committed state without changing it.
    ///
    /// # Errors
    ///
    /// `Error::LockPoisoned` for a poisoned lock-based generator (std mutex
    /// only).
    fn snapshot(&self) -> Result<Snapshot>;

    /// Generates the next identifier, blocking while the sequence space of the
    /// current millisecond is exhausted.
    ///
    /// Blocking lasts until the clock reaches the next millisecond and never
    /// reuses or skips a sequence value. Every successful call consumes
    /// exactly one sequence slot.
    ///
    /// # Errors
    ///
    /// As [`Self::try_poll_id`]. Errors are returned immediately and never
    /// retried here.
    fn generate(&self) -> Result<u64> {
        poll_until_ready(|| self.try_poll_id())
    }

    /// Blocking counterpart of [`Self::try_poll_id_for`].
    ///
    /// Ordered by issue within `kind` only; see [`Self::try_poll_id_for`].
    ///
    /// # Errors
    ///
    /// As [`Self::try_poll_id_for`].
    fn generate_for(&self, kind: &EntityKind) -> Result<u64> {
        poll_until_ready(|| self.try_poll_id_for(kind))
    }

    /// Generates `count` identifiers with `count` sequential calls to
    /// [`Self::generate`].
    ///
    /// The batch is not atomic: when element `index` fails, the identifiers
    /// before it have already been issued and their sequence slots are spent.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `count` is zero
    /// - [`Error::Batch`] wrapping the first failure and its index
    fn generate_batch(&self, count: usize) -> Result<Vec<u64>> {
        if count == 0 {
            return Err(Error::InvalidArgument {
                reason: "batch size must be positive",
            });
        }

        let mut ids = Vec::with_capacity(count.min(MAX_BATCH_PREALLOC));
        for index in 0..count {
            let id = self.generate().map_err(|source| Error::Batch {
                index,
                source: Box::new(source),
            })?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Splits an identifier into its components using this generator's layout
    /// and epoch. Never fails.
    fn decode(&self, id: u64) -> ParsedComponents {
        self.config().decode(id)
    }
}

fn poll_until_ready(mut poll: impl FnMut() -> Result<IdGenStatus>) -> Result<u64> {
    loop {
        match poll()? {
            IdGenStatus::Ready { id } => return Ok(id),
            // Lost a race for the state word
            IdGenStatus::Pending { yield_for: 0 } => core::hint::spin_loop(),
            IdGenStatus::Pending { .. } => std::thread::sleep(EXHAUSTED_BACKOFF),
        }
    }
}
