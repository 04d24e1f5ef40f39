use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{StoreError, StoreResult};
use crate::history::{HistoryIter, SnapshotCursor};
use crate::record::{CommitReceipt, KeyWrite};
use crate::traits::{Ledger, LedgerState};
use crate::versioned::VersionedState;

/// In-memory versioned ledger for tests, local demos, and embedding.
///
/// Commits are serialized behind a `RwLock`; each accepted write appends one
/// version to its key. Used directly as a [`LedgerState`], every `put_state`
/// commits on its own.
pub struct InMemoryLedger {
    inner: RwLock<VersionedState>,
    cursors: Arc<AtomicUsize>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(VersionedState::default()),
            cursors: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of keys that have ever been written.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.key_count())
    }

    /// Returns `true` if nothing has been committed.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Number of versions recorded for a key, tombstones included.
    pub fn version_count(&self, key: &str) -> StoreResult<usize> {
        Ok(self.read()?.version_count(key))
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, VersionedState>> {
        self.inner
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, VersionedState>> {
        self.inner
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger for InMemoryLedger {
    fn read_committed(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.read()?.current(key))
    }

    fn committed_history(&self, key: &str) -> StoreResult<HistoryIter<'_>> {
        let versions = self.read()?.history(key);
        Ok(HistoryIter::new(SnapshotCursor::new(
            versions,
            self.cursors.clone(),
        )))
    }

    fn commit_writes(&self, writes: Vec<KeyWrite>) -> StoreResult<CommitReceipt> {
        let mut state = self.write()?;
        let tx = state.prepare(writes)?;
        state.apply(&tx);
        Ok(CommitReceipt {
            tx_id: tx.tx_id,
            timestamp: tx.timestamp,
            keys_written: tx.writes.len(),
        })
    }

    fn open_cursors(&self) -> usize {
        self.cursors.load(Ordering::SeqCst)
    }
}

impl LedgerState for InMemoryLedger {
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.read_committed(key)
    }

    fn put_state(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        self.commit_writes(vec![KeyWrite {
            key: key.to_string(),
            value: Some(value),
        }])
        .map(|_| ())
    }

    fn history_for_key(&self, key: &str) -> StoreResult<HistoryIter<'_>> {
        self.committed_history(key)
    }
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedger")
            .field("key_count", &self.len().ok())
            .field("open_cursors", &self.open_cursors())
            .finish()
    }
}
