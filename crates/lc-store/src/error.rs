/// Errors from ledger substrate operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Keys must be non-empty.
    #[error("ledger key must not be empty")]
    EmptyKey,

    /// A history cursor was advanced after release.
    #[error("history cursor already closed")]
    CursorClosed,

    /// A lock guarding substrate state was poisoned by a panicking writer.
    #[error("ledger {0} lock poisoned")]
    LockPoisoned(&'static str),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by an external substrate.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
