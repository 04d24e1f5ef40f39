use lc_store::StoreError;
use lc_types::CreditStatus;

use crate::transition::Operation;

/// Errors produced by lifecycle and history operations.
#[derive(Debug, thiserror::Error)]
pub enum ChaincodeError {
    #[error("credit already exists: {0}")]
    AlreadyExists(String),

    #[error("credit does not exist: {0}")]
    NotFound(String),

    #[error("failed to access ledger state: {0}")]
    Storage(#[from] StoreError),

    #[error("malformed credit payload: {0}")]
    Decode(String),

    #[error("failed to encode credit: {0}")]
    Encode(String),

    #[error(
        "cannot {operation} credit {credit_id} from status {}",
        .from.map_or("<unset>", |s| s.as_str())
    )]
    InvalidTransition {
        credit_id: String,
        operation: Operation,
        from: Option<CreditStatus>,
    },
}

/// Coarse failure classes callers route on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller asked for something that conflicts with ledger state.
    Conflict,
    /// The credit does not exist.
    NotFound,
    /// Infrastructure failure; may succeed on retry.
    Infrastructure,
    /// Stored or supplied data is malformed.
    MalformedData,
}

impl ChaincodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyExists(_) | Self::InvalidTransition { .. } => ErrorKind::Conflict,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Storage(_) => ErrorKind::Infrastructure,
            Self::Decode(_) | Self::Encode(_) => ErrorKind::MalformedData,
        }
    }
}

pub type ChaincodeResult<T> = Result<T, ChaincodeError>;

/// Errors produced when invoking a named operation.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("{function} expects {expected} arguments, got {actual}")]
    ArgumentCount {
        function: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid argument {name}={value:?}: {reason}")]
    InvalidArgument {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Chaincode(#[from] ChaincodeError),

    #[error("failed to commit transaction: {0}")]
    Commit(#[source] StoreError),

    #[error("failed to serialize result: {0}")]
    Serialization(String),
}

impl ContractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Chaincode(e) => e.kind(),
            Self::Commit(_) => ErrorKind::Infrastructure,
            Self::Serialization(_) => ErrorKind::MalformedData,
            Self::UnknownFunction(_) | Self::ArgumentCount { .. } | Self::InvalidArgument { .. } => {
                ErrorKind::MalformedData
            }
        }
    }
}

pub type ContractResult<T> = Result<T, ContractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_separate_missing_from_infrastructure() {
        assert_eq!(
            ChaincodeError::NotFound("C1".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ChaincodeError::Storage(StoreError::Backend("down".into())).kind(),
            ErrorKind::Infrastructure
        );
        assert_eq!(
            ChaincodeError::Decode("eof".into()).kind(),
            ErrorKind::MalformedData
        );
        assert_eq!(
            ContractError::from(ChaincodeError::AlreadyExists("C1".into())).kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn invalid_transition_message() {
        let err = ChaincodeError::InvalidTransition {
            credit_id: "C1".into(),
            operation: Operation::Execute,
            from: Some(CreditStatus::Registered),
        };
        assert_eq!(err.to_string(), "cannot execute credit C1 from status registered");

        let err = ChaincodeError::InvalidTransition {
            credit_id: "C2".into(),
            operation: Operation::Verify,
            from: None,
        };
        assert_eq!(err.to_string(), "cannot verify credit C2 from status <unset>");
    }
}
