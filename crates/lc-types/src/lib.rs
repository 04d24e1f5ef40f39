//! Foundation types for the luggage credit ledger.
//!
//! This crate provides the entity and provenance types shared by the
//! substrate adapter, the lifecycle engine, and the outer surfaces. Every
//! other `lc-*` crate depends on `lc-types`.
//!
//! # Key Types
//!
//! - [`Credit`]: The tradable luggage allowance record stored under its id
//! - [`CreditStatus`]: Closed set of lifecycle states
//! - [`TxId`]: Substrate-assigned transaction identifier
//! - [`CommitTimestamp`]: Substrate-native commit time (seconds + nanos)

pub mod credit;
pub mod error;
pub mod temporal;
pub mod tx;

pub use credit::{Credit, CreditStatus, CREDIT_OBJECT_TYPE};
pub use error::TypeError;
pub use temporal::CommitTimestamp;
pub use tx::TxId;
