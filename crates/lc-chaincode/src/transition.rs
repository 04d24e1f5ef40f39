use std::fmt;

use lc_types::CreditStatus;
use serde::{Deserialize, Serialize};

use crate::error::{ChaincodeError, ChaincodeResult};

/// Lifecycle operations that write a credit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Register,
    Transfer,
    Verify,
    Execute,
}

impl Operation {
    /// The status every successful application of this operation leaves behind.
    pub fn target(self) -> CreditStatus {
        match self {
            Self::Register => CreditStatus::Registered,
            Self::Transfer => CreditStatus::Transfered,
            Self::Verify => CreditStatus::Verified,
            Self::Execute => CreditStatus::Excuted,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Register => "register",
            Self::Transfer => "transfer",
            Self::Verify => "verify",
            Self::Execute => "execute",
        })
    }
}

/// Whether the transition table gates operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionMode {
    /// Every operation forces its target status regardless of the current one.
    #[default]
    Permissive,
    /// Operations are rejected unless the table allows the move.
    Enforced,
}

/// Allowed `(current status, operation)` moves.
///
/// | from                       | operation | to           |
/// |----------------------------|-----------|--------------|
/// | no record                  | register  | `registered` |
/// | `registered`, `transfered` | transfer  | `transfered` |
/// | `transfered`               | verify    | `verified`   |
/// | `verified`                 | execute   | `excuted`    |
pub struct TransitionTable;

impl TransitionTable {
    /// Look up the next status, or `None` if the move is not allowed.
    ///
    /// `from` is `None` both for a record that does not exist yet and for a
    /// stored record without a status.
    pub fn next(from: Option<CreditStatus>, operation: Operation) -> Option<CreditStatus> {
        use CreditStatus::*;

        let allowed = match operation {
            Operation::Register => from.is_none(),
            Operation::Transfer => matches!(from, Some(Registered | Transfered)),
            Operation::Verify => from == Some(Transfered),
            Operation::Execute => from == Some(Verified),
        };
        allowed.then(|| operation.target())
    }

    /// Resolve the status an operation writes under the given mode.
    pub fn check(
        mode: TransitionMode,
        credit_id: &str,
        from: Option<CreditStatus>,
        operation: Operation,
    ) -> ChaincodeResult<CreditStatus> {
        match mode {
            TransitionMode::Permissive => Ok(operation.target()),
            TransitionMode::Enforced => {
                Self::next(from, operation).ok_or_else(|| ChaincodeError::InvalidTransition {
                    credit_id: credit_id.to_string(),
                    operation,
                    from,
                })
            }
        }
    }
}
