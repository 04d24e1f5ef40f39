use crate::error::StoreResult;
use crate::history::HistoryIter;
use crate::record::{CommitReceipt, KeyWrite};
use crate::transaction::LedgerTransaction;

/// Keyed state and per-key history, as seen by one unit of work.
///
/// This is the only surface the lifecycle engine depends on. Implementations
/// must satisfy these invariants:
/// - `get_state` returns `Ok(None)` for a missing key; `Err` is reserved for
///   genuine read failures.
/// - Each accepted `put_state` yields exactly one new version of the key once
///   the surrounding unit of work commits.
/// - `history_for_key` yields versions in the substrate's native order
///   (oldest first for the bundled substrates) and the returned iterator
///   releases its cursor when finished or dropped.
pub trait LedgerState {
    /// Read the current value of a key.
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write a new value for a key.
    fn put_state(&self, key: &str, value: Vec<u8>) -> StoreResult<()>;

    /// Open a forward-only cursor over every version of a key.
    fn history_for_key(&self, key: &str) -> StoreResult<HistoryIter<'_>>;

    /// Check whether a key currently holds a value.
    fn state_exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get_state(key)?.is_some())
    }
}

/// A versioned key-value substrate that commits whole write sets.
pub trait Ledger: Send + Sync {
    /// Read the committed value of a key.
    fn read_committed(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Snapshot the committed history of a key.
    fn committed_history(&self, key: &str) -> StoreResult<HistoryIter<'_>>;

    /// Atomically append one version per write and assign a transaction id.
    ///
    /// An empty write set commits nothing but still yields a receipt.
    fn commit_writes(&self, writes: Vec<KeyWrite>) -> StoreResult<CommitReceipt>;

    /// Number of history cursors handed out and not yet released.
    fn open_cursors(&self) -> usize;

    /// Start a unit of work against this ledger.
    fn begin(&self) -> LedgerTransaction<'_, Self>
    where
        Self: Sized,
    {
        LedgerTransaction::new(self)
    }
}
