use serde::{Deserialize, Serialize};

use crate::transition::TransitionMode;

/// How mutating operations react to a stored payload that fails to decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Every read path fails with a decode error.
    #[default]
    Strict,
    /// Mutators start from the zero record and carry on, logging a warning.
    /// Reads and history queries stay strict.
    Lenient,
}

/// Business-rule switches for the lifecycle engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecyclePolicy {
    /// Whether the transition table gates transfer / verify / execute.
    pub transitions: TransitionMode,
    /// Decode failure handling in mutating operations.
    pub decode_failures: DecodePolicy,
}

impl LifecyclePolicy {
    /// Behaviour of the ledger's first deployment: unconditional status
    /// overwrite and tolerance of undecodable payloads in mutators.
    pub fn compatible() -> Self {
        Self {
            transitions: TransitionMode::Permissive,
            decode_failures: DecodePolicy::Lenient,
        }
    }

    /// Table-enforced transitions with strict decoding everywhere.
    pub fn strict() -> Self {
        Self {
            transitions: TransitionMode::Enforced,
            decode_failures: DecodePolicy::Strict,
        }
    }
}
