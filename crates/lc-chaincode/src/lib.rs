//! Luggage credit lifecycle on top of a versioned key-value ledger.
//!
//! This crate is the core of the system. It provides:
//! - The credit record codec (stable JSON payloads)
//! - `CreditLifecycle`, the state machine for register / transfer / verify / execute
//! - An explicit transition table, enforced or advisory per `LifecyclePolicy`
//! - `HistoryReconstructor`, which turns per-key versions into credit snapshots
//! - `CreditContract`, the fixed set of named operations exposed to invokers
//!
//! Everything here talks to storage through [`lc_store::LedgerState`], so the
//! engine runs unchanged against an in-memory fake, the durable file ledger,
//! or an external substrate adapter.

pub mod codec;
pub mod config;
pub mod contract;
pub mod error;
pub mod history;
pub mod lifecycle;
pub mod transition;

pub use config::{DecodePolicy, LifecyclePolicy};
pub use contract::{CreditContract, Function};
pub use error::{ChaincodeError, ChaincodeResult, ContractError, ContractResult, ErrorKind};
pub use history::{HistoryEntry, HistoryReconstructor};
pub use lifecycle::CreditLifecycle;
pub use transition::{Operation, TransitionMode, TransitionTable};

pub use lc_types::{Credit, CreditStatus, TxId};
