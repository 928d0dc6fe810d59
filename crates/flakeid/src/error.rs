use crate::{CodecError, Field};

/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `flakeid` can produce.
///
/// Configuration problems ([`Error::InvalidLayout`], [`Error::FieldOverflow`])
/// are reported when a generator is built and never during generation.
/// Runtime errors are surfaced as-is; the only condition recovered internally
/// is sequence exhaustion, which blocks until the next millisecond.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The five field widths of a [`crate::BitLayout`] do not sum to 64.
    #[error("bit layout must sum to 64 bits, got {total}")]
    InvalidLayout {
        /// Sum of the configured widths.
        total: u32,
    },

    /// A value does not fit the bit width allotted to its field.
    ///
    /// A zero-width field only accepts the value `0`.
    #[error("{field} value {value} exceeds the field maximum {max}")]
    FieldOverflow {
        field: Field,
        value: u64,
        max: u64,
    },

    /// The clock returned a time earlier than the last committed timestamp.
    ///
    /// The committed state is left untouched. Retrying is up to the caller.
    /// A reading earlier than the epoch itself is reported as
    /// [`Error::EpochInFuture`] instead; [`Error::is_clock_regression`]
    /// matches both.
    #[error("clock moved backwards: {now}ms is behind the last issued {last}ms")]
    ClockRegression {
        /// Clock reading, in milliseconds since the configured epoch.
        now: u64,
        /// Last committed timestamp, in milliseconds since the configured
        /// epoch.
        last: u64,
    },

    /// The clock reading is earlier than the configured epoch.
    ///
    /// The before-epoch counterpart of [`Error::ClockRegression`].
    #[error("epoch {epoch}ms is in the future of the clock reading {now}ms")]
    EpochInFuture {
        /// Clock reading, in milliseconds since the UNIX epoch.
        now: u64,
        /// Configured epoch, in milliseconds since the UNIX epoch.
        epoch: u64,
    },

    /// Elapsed time since the epoch no longer fits the timestamp field.
    ///
    /// This is terminal for the epoch/layout combination.
    #[error("timestamp {timestamp}ms exceeds the layout maximum {max}ms")]
    TimestampOverflow { timestamp: u64, max: u64 },

    /// An argument was rejected before any work was done.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: &'static str },

    /// An element of a batch failed. Elements before `index` were issued and
    /// their sequence slots are spent.
    #[error("failed to generate ID {index} of batch: {source}")]
    Batch { index: usize, source: Box<Error> },

    /// A thread panicked while holding the generator lock.
    #[cfg_attr(docsrs, doc(cfg(all(feature = "lock", not(feature = "parking-lot")))))]
    #[cfg(all(feature = "lock", not(feature = "parking-lot")))]
    #[error("generator lock poisoned")]
    LockPoisoned,

    /// A string form could not be decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// An entity prefix is empty or contains the separator.
    #[error("invalid entity prefix {prefix:?}")]
    InvalidPrefix { prefix: String },

    /// An entity with the same name, code, or prefix is already registered.
    #[error("entity {name:?} conflicts with registered entity {existing:?}")]
    DuplicateEntity { name: String, existing: String },

    /// A public ID carries a prefix with no registered entity.
    #[error("unknown prefix {prefix:?}")]
    UnknownPrefix { prefix: String },

    /// A public ID has no prefix separator.
    #[error("malformed public id {id:?}")]
    MalformedPublicId { id: String },
}

impl Error {
    /// Whether the clock read behind where generation can continue, either
    /// behind the committed state or behind the epoch.
    pub const fn is_clock_regression(&self) -> bool {
        matches!(self, Self::ClockRegression { .. } | Self::EpochInFuture { .. })
    }
}

#[cfg(all(feature = "lock", not(feature = "parking-lot")))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg_attr(docsrs, doc(cfg(all(feature = "lock", not(feature = "parking-lot")))))]
#[cfg(all(feature = "lock", not(feature = "parking-lot")))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
