use std::collections::HashMap;

use lc_types::{CommitTimestamp, TxId};

use crate::error::{StoreError, StoreResult};
use crate::record::{CommittedTx, KeyWrite, VersionedRecord};

/// Versioned key map shared by the bundled substrates.
#[derive(Debug, Default)]
pub(crate) struct VersionedState {
    keys: HashMap<String, Vec<VersionedRecord>>,
    last_timestamp: Option<CommitTimestamp>,
}

impl VersionedState {
    /// Current value: the latest version unless it is a tombstone.
    pub fn current(&self, key: &str) -> Option<Vec<u8>> {
        self.keys
            .get(key)
            .and_then(|versions| versions.last())
            .filter(|latest| !latest.is_delete)
            .map(|latest| latest.value.clone())
    }

    pub fn history(&self, key: &str) -> Vec<VersionedRecord> {
        self.keys.get(key).cloned().unwrap_or_default()
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn version_count(&self, key: &str) -> usize {
        self.keys.get(key).map(Vec::len).unwrap_or(0)
    }

    /// Stamp a write set with a fresh id and a strictly increasing timestamp.
    pub fn prepare(&self, writes: Vec<KeyWrite>) -> StoreResult<CommittedTx> {
        if writes.iter().any(|w| w.key.is_empty()) {
            return Err(StoreError::EmptyKey);
        }
        Ok(CommittedTx {
            tx_id: TxId::generate(),
            timestamp: self.next_timestamp(),
            writes,
        })
    }

    pub fn apply(&mut self, tx: &CommittedTx) {
        for write in &tx.writes {
            self.keys
                .entry(write.key.clone())
                .or_default()
                .push(VersionedRecord::from_write(write, &tx.tx_id, tx.timestamp));
        }
        self.last_timestamp = Some(
            self.last_timestamp
                .map_or(tx.timestamp, |last| last.max(tx.timestamp)),
        );
    }

    fn next_timestamp(&self) -> CommitTimestamp {
        let now = CommitTimestamp::now();
        match self.last_timestamp {
            Some(prev) if now <= prev => {
                if prev.nanos + 1 < 1_000_000_000 {
                    CommitTimestamp::new(prev.seconds, prev.nanos + 1)
                } else {
                    CommitTimestamp::new(prev.seconds.saturating_add(1), 0)
                }
            }
            _ => now,
        }
    }
}
