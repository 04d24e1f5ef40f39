use chrono::{DateTime, Utc};
use lc_store::{LedgerState, VersionedRecord};
use lc_types::{Credit, TxId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec;
use crate::error::{ChaincodeError, ChaincodeResult};

/// One point-in-time snapshot of a credit with its provenance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub record: Credit,
    #[serde(rename = "txId")]
    pub tx_id: TxId,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "isDelete")]
    pub is_delete: bool,
}

/// Rebuilds the sequence of credit snapshots from per-key ledger history.
pub struct HistoryReconstructor;

impl HistoryReconstructor {
    /// Every recorded version of `credit_id`, in the substrate's order.
    ///
    /// All-or-nothing: the first version that cannot be decoded (or whose
    /// timestamp is out of range) aborts the query. The history cursor is
    /// released on every path. An unknown id yields an empty history.
    pub fn credit_history<S: LedgerState + ?Sized>(
        state: &S,
        credit_id: &str,
    ) -> ChaincodeResult<Vec<HistoryEntry>> {
        debug!(credit_id, "get credit history");

        let mut versions = state.history_for_key(credit_id)?;
        let mut entries = Vec::new();
        for version in versions.by_ref() {
            entries.push(Self::snapshot(credit_id, version?)?);
        }
        versions.finish()?;

        debug!(credit_id, versions = entries.len(), "credit history assembled");
        Ok(entries)
    }

    fn snapshot(credit_id: &str, version: VersionedRecord) -> ChaincodeResult<HistoryEntry> {
        let record = if version.value.is_empty() {
            Credit::tombstone(credit_id)
        } else {
            codec::decode(&version.value)?
        };
        let timestamp = version
            .timestamp
            .to_datetime()
            .map_err(|e| ChaincodeError::Decode(e.to_string()))?;

        Ok(HistoryEntry {
            record,
            tx_id: version.tx_id,
            timestamp,
            is_delete: version.is_delete,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use lc_store::{
        HistoryCursor, HistoryIter, InMemoryLedger, Ledger, SnapshotCursor, StoreError,
        StoreResult,
    };
    use lc_types::{CommitTimestamp, CreditStatus};

    use super::*;
    use crate::lifecycle::CreditLifecycle;

    /// Substrate serving a fixed history, for shapes the bundled ledgers never produce.
    struct ScriptedHistory {
        versions: Vec<VersionedRecord>,
        fail_after: Option<usize>,
        cursors: Arc<AtomicUsize>,
    }

    impl ScriptedHistory {
        fn new(versions: Vec<VersionedRecord>) -> Self {
            Self {
                versions,
                fail_after: None,
                cursors: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    struct FailingCursor {
        inner: SnapshotCursor,
        remaining: usize,
    }

    impl HistoryCursor for FailingCursor {
        fn next_version(&mut self) -> StoreResult<Option<VersionedRecord>> {
            if self.remaining == 0 {
                return Err(StoreError::Backend("history iterator failed".into()));
            }
            self.remaining -= 1;
            self.inner.next_version()
        }

        fn close(&mut self) -> StoreResult<()> {
            self.inner.close()
        }
    }

    impl LedgerState for ScriptedHistory {
        fn get_state(&self, _key: &str) -> StoreResult<Option<Vec<u8>>> {
            Ok(None)
        }

        fn put_state(&self, _key: &str, _value: Vec<u8>) -> StoreResult<()> {
            Err(StoreError::Backend("read-only".into()))
        }

        fn history_for_key(&self, _key: &str) -> StoreResult<HistoryIter<'_>> {
            let inner = SnapshotCursor::new(self.versions.clone(), self.cursors.clone());
            Ok(match self.fail_after {
                Some(remaining) => HistoryIter::new(FailingCursor { inner, remaining }),
                None => HistoryIter::new(inner),
            })
        }
    }

    fn version(value: &[u8], n: i64, is_delete: bool) -> VersionedRecord {
        VersionedRecord {
            value: value.to_vec(),
            tx_id: TxId::from(format!("tx{n}")),
            timestamp: CommitTimestamp::new(1_700_000_000 + n, 0),
            is_delete,
        }
    }

    fn payload(credit: &Credit) -> Vec<u8> {
        codec::encode(credit).unwrap()
    }

    #[test]
    fn one_entry_per_version_in_order() {
        let engine = CreditLifecycle::default();
        let ledger = InMemoryLedger::new();
        engine
            .register_credit(&ledger, "C1", "alice", "FL100", 20, 500)
            .unwrap();
        engine.transfer_credit(&ledger, "C1", "bob").unwrap();
        engine.verify_credit(&ledger, "C1").unwrap();

        let history = HistoryReconstructor::credit_history(&ledger, "C1").unwrap();
        let statuses: Vec<_> = history.iter().map(|e| e.record.status).collect();
        assert_eq!(
            statuses,
            vec![
                Some(CreditStatus::Registered),
                Some(CreditStatus::Transfered),
                Some(CreditStatus::Verified),
            ]
        );
        assert!(history.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert!(history.iter().all(|e| !e.is_delete));
        assert_eq!(ledger.open_cursors(), 0);
    }

    #[test]
    fn unknown_credit_has_empty_history() {
        let ledger = InMemoryLedger::new();
        assert!(HistoryReconstructor::credit_history(&ledger, "ghost")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn tombstone_becomes_id_only_record() {
        let registered = Credit::register("C1", "alice", "FL100", 20, 500);
        let state = ScriptedHistory::new(vec![
            version(&payload(&registered), 1, false),
            version(b"", 2, true),
        ]);

        let history = HistoryReconstructor::credit_history(&state, "C1").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].record, registered);
        assert_eq!(history[1].record, Credit::tombstone("C1"));
        assert!(history[1].is_delete);
        assert_eq!(history[1].tx_id, TxId::from("tx2"));
    }

    #[test]
    fn real_deletions_show_up_as_tombstones() {
        let engine = CreditLifecycle::default();
        let ledger = InMemoryLedger::new();
        engine
            .register_credit(&ledger, "C1", "alice", "FL100", 20, 500)
            .unwrap();
        let tx = ledger.begin();
        tx.del_state("C1").unwrap();
        tx.commit().unwrap();

        let history = HistoryReconstructor::credit_history(&ledger, "C1").unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[1].is_delete);
        assert_eq!(history[1].record.credit_id, "C1");
        assert_eq!(history[1].record.status, None);
    }

    #[test]
    fn one_bad_version_fails_whole_query_and_releases_cursor() {
        let good = Credit::register("C1", "alice", "FL100", 20, 500);
        let state = ScriptedHistory::new(vec![
            version(&payload(&good), 1, false),
            version(b"{garbage", 2, false),
            version(&payload(&good), 3, false),
        ]);

        let err = HistoryReconstructor::credit_history(&state, "C1").unwrap_err();
        assert!(matches!(err, ChaincodeError::Decode(_)));
        assert_eq!(state.cursors.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn iteration_failure_is_storage_error_and_releases_cursor() {
        let good = Credit::register("C1", "alice", "FL100", 20, 500);
        let mut state = ScriptedHistory::new(vec![
            version(&payload(&good), 1, false),
            version(&payload(&good), 2, false),
        ]);
        state.fail_after = Some(1);

        let err = HistoryReconstructor::credit_history(&state, "C1").unwrap_err();
        assert!(matches!(err, ChaincodeError::Storage(StoreError::Backend(_))));
        assert_eq!(state.cursors.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalid_timestamp_is_decode_error() {
        let good = Credit::register("C1", "alice", "FL100", 20, 500);
        let mut bad_time = version(&payload(&good), 1, false);
        bad_time.timestamp = CommitTimestamp::new(1, -5);
        let state = ScriptedHistory::new(vec![bad_time]);

        assert!(matches!(
            HistoryReconstructor::credit_history(&state, "C1"),
            Err(ChaincodeError::Decode(_))
        ));
    }

    #[test]
    fn each_call_requeries_the_substrate() {
        let engine = CreditLifecycle::default();
        let ledger = InMemoryLedger::new();
        engine
            .register_credit(&ledger, "C1", "alice", "FL100", 20, 500)
            .unwrap();
        let first = HistoryReconstructor::credit_history(&ledger, "C1").unwrap();
        engine.execute_credit(&ledger, "C1").unwrap();
        let second = HistoryReconstructor::credit_history(&ledger, "C1").unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
        assert_eq!(second[0], first[0]);
    }

    #[test]
    fn entry_json_field_names() {
        let entry = HistoryEntry {
            record: Credit::tombstone("C1"),
            tx_id: TxId::from("abc"),
            timestamp: CommitTimestamp::new(0, 0).to_datetime().unwrap(),
            is_delete: true,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["txId"], "abc");
        assert_eq!(json["isDelete"], true);
        assert_eq!(json["record"]["creditid"], "C1");
        assert_eq!(json["timestamp"], "1970-01-01T00:00:00Z");
    }
}
