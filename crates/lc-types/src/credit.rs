use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Discriminator stored in every credit payload.
pub const CREDIT_OBJECT_TYPE: &str = "credit";

/// Lifecycle state of a credit.
///
/// The wire spelling (`transfered`, `excuted`) is the ledger's established
/// vocabulary and must not be corrected: stored payloads and clients depend
/// on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditStatus {
    Registered,
    Transfered,
    Verified,
    Excuted,
}

impl CreditStatus {
    /// All lifecycle states in their expected order.
    pub const ALL: [CreditStatus; 4] = [
        Self::Registered,
        Self::Transfered,
        Self::Verified,
        Self::Excuted,
    ];

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Transfered => "transfered",
            Self::Verified => "verified",
            Self::Excuted => "excuted",
        }
    }
}

impl fmt::Display for CreditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreditStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TypeError::UnknownStatus(s.to_string()))
    }
}

/// A tradable luggage allowance tied to a flight.
///
/// The credit id doubles as the ledger key. Field names on the wire follow
/// the payload layout already committed to the ledger; note the capitalised
/// `Status` key, which is what existing records carry. Missing fields decode
/// to their zero values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credit {
    #[serde(rename = "docType")]
    pub object_type: String,
    #[serde(rename = "creditid")]
    pub credit_id: String,
    pub owner: String,
    #[serde(rename = "flight")]
    pub flight_id: String,
    pub weight: i64,
    pub price: i64,
    #[serde(rename = "Status", alias = "status", with = "status_field")]
    pub status: Option<CreditStatus>,
}

impl Credit {
    /// A freshly registered credit.
    pub fn register(
        credit_id: impl Into<String>,
        owner: impl Into<String>,
        flight_id: impl Into<String>,
        weight: i64,
        price: i64,
    ) -> Self {
        Self {
            object_type: CREDIT_OBJECT_TYPE.to_string(),
            credit_id: credit_id.into(),
            owner: owner.into(),
            flight_id: flight_id.into(),
            weight,
            price,
            status: Some(CreditStatus::Registered),
        }
    }

    /// The zero record carrying only an id, used for deleted versions.
    pub fn tombstone(credit_id: impl Into<String>) -> Self {
        Self {
            credit_id: credit_id.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if the credit is in the given state.
    pub fn is(&self, status: CreditStatus) -> bool {
        self.status == Some(status)
    }
}

/// `None` travels as the empty string, matching zero-valued payloads.
mod status_field {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::CreditStatus;

    pub fn serialize<S: Serializer>(
        status: &Option<CreditStatus>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(status.as_ref().map(CreditStatus::as_str).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<CreditStatus>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(de::Error::custom),
        }
    }
}
