/// The outcome of one attempt at the transition rule.
///
/// Returned by [`crate::IdGenerator::try_poll_id`], which never blocks:
///
/// - [`IdGenStatus::Ready`] carries a newly committed identifier.
/// - [`IdGenStatus::Pending`] means nothing was committed and no sequence slot
///   was consumed. `yield_for` is `1` when the sequence space of the current
///   millisecond is exhausted, and `0` when another caller won the race for
///   the state word and the attempt can be retried immediately.
///
/// # Example
///
/// ```
/// use flakeid::{AtomicGenerator, Config, IdGenStatus, IdGenerator, SystemClock, Topology};
///
/// let generator = AtomicGenerator::new(Config::new(Topology::new(1, 1, 1)), SystemClock)?;
/// let id = loop {
///     match generator.try_poll_id()? {
///         IdGenStatus::Ready { id } => break id,
///         IdGenStatus::Pending { .. } => std::thread::yield_now(),
///     }
/// };
/// assert_eq!(generator.decode(id).machine, 1);
/// # Ok::<(), flakeid::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique identifier was committed.
    Ready {
        /// The packed identifier.
        id: u64,
    },
    /// No identifier was committed; back off before retrying.
    Pending {
        /// Milliseconds to wait before retrying.
        yield_for: u64,
    },
}
