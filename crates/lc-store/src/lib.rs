//! Ledger substrate adapter for the luggage credit ledger.
//!
//! The lifecycle engine never talks to a storage engine directly. It consumes
//! exactly two capabilities through [`LedgerState`]:
//!
//! - keyed `get` / `put` / `exists` over opaque byte payloads
//! - an ordered, forward-only per-key history ([`HistoryIter`])
//!
//! # Substrates
//!
//! All substrates implement the [`Ledger`] trait and hand out
//! [`LedgerTransaction`] views, which buffer writes until commit:
//!
//! - [`InMemoryLedger`] -- `HashMap`-based substrate for tests and embedding
//! - [`FileLedger`] -- the same versioned map, made durable by a write-ahead log
//!
//! # Design Rules
//!
//! 1. Absence is `Ok(None)`, never an error.
//! 2. Every committed write to a key appends exactly one version to its history.
//! 3. Transaction reads observe committed state only.
//! 4. History cursors are released exactly once, on every exit path.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod history;
pub mod memory;
pub mod record;
pub mod traits;
pub mod transaction;
mod versioned;
pub mod wal;

pub use error::{StoreError, StoreResult};
pub use file::FileLedger;
pub use history::{HistoryCursor, HistoryIter, SnapshotCursor};
pub use memory::InMemoryLedger;
pub use record::{CommitReceipt, CommittedTx, KeyWrite, VersionedRecord};
pub use traits::{Ledger, LedgerState};
pub use transaction::LedgerTransaction;
pub use wal::{Recovery, SyncMode, WalConfig, WriteAheadLog};
