use std::cell::RefCell;
use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::history::HistoryIter;
use crate::record::{CommitReceipt, KeyWrite};
use crate::traits::{Ledger, LedgerState};

/// One unit of work against a [`Ledger`].
///
/// Reads go straight to committed state; writes are buffered in a write set
/// (the last write to a key wins) and only reach the ledger on
/// [`commit`](Self::commit). Dropping the transaction discards the write set,
/// so a failed operation leaves no trace.
pub struct LedgerTransaction<'a, L: Ledger + ?Sized> {
    ledger: &'a L,
    writes: RefCell<BTreeMap<String, Option<Vec<u8>>>>,
}

impl<'a, L: Ledger + ?Sized> LedgerTransaction<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self {
            ledger,
            writes: RefCell::new(BTreeMap::new()),
        }
    }

    /// Buffer a deletion; commits as a tombstone version.
    pub fn del_state(&self, key: &str) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        self.writes.borrow_mut().insert(key.to_string(), None);
        Ok(())
    }

    /// Number of keys with a buffered write.
    pub fn pending_writes(&self) -> usize {
        self.writes.borrow().len()
    }

    /// Commit the write set as a single transaction.
    pub fn commit(self) -> StoreResult<CommitReceipt> {
        let writes: Vec<KeyWrite> = self
            .writes
            .into_inner()
            .into_iter()
            .map(|(key, value)| KeyWrite { key, value })
            .collect();
        let receipt = self.ledger.commit_writes(writes)?;
        debug!(
            tx_id = %receipt.tx_id,
            keys = receipt.keys_written,
            "transaction committed"
        );
        Ok(receipt)
    }

    /// Discard the write set.
    pub fn rollback(self) {
        debug!(discarded = self.pending_writes(), "transaction rolled back");
    }
}

impl<L: Ledger + ?Sized> LedgerState for LedgerTransaction<'_, L> {
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.ledger.read_committed(key)
    }

    fn put_state(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        self.writes.borrow_mut().insert(key.to_string(), Some(value));
        Ok(())
    }

    fn history_for_key(&self, key: &str) -> StoreResult<HistoryIter<'_>> {
        self.ledger.committed_history(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLedger;

    #[test]
    fn writes_invisible_until_commit() {
        let ledger = InMemoryLedger::new();
        let tx = ledger.begin();
        tx.put_state("k", b"v".to_vec()).unwrap();
        assert_eq!(tx.get_state("k").unwrap(), None);
        assert_eq!(ledger.read_committed("k").unwrap(), None);

        let receipt = tx.commit().unwrap();
        assert_eq!(receipt.keys_written, 1);
        assert_eq!(ledger.read_committed("k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn last_write_wins_within_transaction() {
        let ledger = InMemoryLedger::new();
        let tx = ledger.begin();
        tx.put_state("k", b"first".to_vec()).unwrap();
        tx.put_state("k", b"second".to_vec()).unwrap();
        assert_eq!(tx.pending_writes(), 1);
        tx.commit().unwrap();

        assert_eq!(ledger.version_count("k").unwrap(), 1);
        assert_eq!(ledger.read_committed("k").unwrap(), Some(b"second".to_vec()));
    }

    #[test]
    fn rollback_discards_writes() {
        let ledger = InMemoryLedger::new();
        let tx = ledger.begin();
        tx.put_state("k", b"v".to_vec()).unwrap();
        tx.rollback();
        assert_eq!(ledger.version_count("k").unwrap(), 0);

        {
            let tx = ledger.begin();
            tx.put_state("k", b"v".to_vec()).unwrap();
        }
        assert_eq!(ledger.version_count("k").unwrap(), 0);
    }

    #[test]
    fn empty_transaction_commits_nothing() {
        let ledger = InMemoryLedger::new();
        let receipt = ledger.begin().commit().unwrap();
        assert_eq!(receipt.keys_written, 0);
        assert!(ledger.is_empty().unwrap());
    }

    #[test]
    fn delete_commits_tombstone() {
        let ledger = InMemoryLedger::new();
        let tx = ledger.begin();
        tx.put_state("k", b"v".to_vec()).unwrap();
        tx.commit().unwrap();

        let tx = ledger.begin();
        tx.del_state("k").unwrap();
        let receipt = tx.commit().unwrap();

        assert!(!ledger.state_exists("k").unwrap());
        let history: Vec<_> = ledger
            .history_for_key("k")
            .unwrap()
            .collect::<StoreResult<_>>()
            .unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[1].is_delete);
        assert!(history[1].value.is_empty());
        assert_eq!(history[1].tx_id, receipt.tx_id);
    }

    #[test]
    fn empty_key_rejected() {
        let ledger = InMemoryLedger::new();
        let tx = ledger.begin();
        assert!(matches!(tx.put_state("", vec![1]), Err(StoreError::EmptyKey)));
        assert!(matches!(tx.del_state(""), Err(StoreError::EmptyKey)));
    }
}
