use lc_types::{CommitTimestamp, TxId};
use serde::{Deserialize, Serialize};

/// One historical version of a key.
///
/// An empty `value` together with `is_delete` marks a tombstone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedRecord {
    pub value: Vec<u8>,
    pub tx_id: TxId,
    pub timestamp: CommitTimestamp,
    pub is_delete: bool,
}

impl VersionedRecord {
    /// Build the version a committed write leaves behind.
    pub fn from_write(write: &KeyWrite, tx_id: &TxId, timestamp: CommitTimestamp) -> Self {
        match &write.value {
            Some(value) => Self {
                value: value.clone(),
                tx_id: tx_id.clone(),
                timestamp,
                is_delete: false,
            },
            None => Self {
                value: Vec::new(),
                tx_id: tx_id.clone(),
                timestamp,
                is_delete: true,
            },
        }
    }
}

/// A buffered write: `None` deletes the key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyWrite {
    pub key: String,
    pub value: Option<Vec<u8>>,
}

/// A committed transaction's write set, as persisted by durable substrates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedTx {
    pub tx_id: TxId,
    pub timestamp: CommitTimestamp,
    pub writes: Vec<KeyWrite>,
}

/// Outcome of committing a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub tx_id: TxId,
    pub timestamp: CommitTimestamp,
    /// Number of keys that received a new version.
    pub keys_written: usize,
}
