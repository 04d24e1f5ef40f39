use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard};

use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::history::{HistoryIter, SnapshotCursor};
use crate::record::{CommitReceipt, KeyWrite};
use crate::traits::{Ledger, LedgerState};
use crate::versioned::VersionedState;
use crate::wal::{WalConfig, WriteAheadLog};

/// Durable versioned ledger backed by a write-ahead log.
///
/// The versioned map lives in memory and is rebuilt on open by replaying
/// the log. A transaction is appended to the log before it becomes visible,
/// so a crash never exposes a version that was not persisted.
pub struct FileLedger {
    wal: WriteAheadLog,
    inner: RwLock<VersionedState>,
    cursors: Arc<AtomicUsize>,
}

impl FileLedger {
    /// Open (or create) a ledger at `path`, replaying every intact transaction.
    ///
    /// A torn tail left by a crash is cut off first, so commits made after
    /// reopening land on a clean frame boundary.
    pub fn open(path: &Path, config: WalConfig) -> StoreResult<Self> {
        let (wal, recovery) = WriteAheadLog::open(path, config)?;
        let mut state = VersionedState::default();
        for tx in &recovery.transactions {
            state.apply(tx);
        }
        info!(
            path = %path.display(),
            transactions = recovery.transactions.len(),
            keys = state.key_count(),
            "ledger opened"
        );
        Ok(Self {
            wal,
            inner: RwLock::new(state),
            cursors: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn path(&self) -> &Path {
        self.wal.path()
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
}

impl Ledger for FileLedger {
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
        let mut state = self
            .inner
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))?;
        let tx = state.prepare(writes)?;
        if !tx.writes.is_empty() {
            self.wal.append(&tx)?;
            state.apply(&tx);
        }
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

impl LedgerState for FileLedger {
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

impl std::fmt::Debug for FileLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLedger")
            .field("path", &self.wal.path())
            .field("wal_len", &self.wal.len().ok())
            .finish()
    }
}
