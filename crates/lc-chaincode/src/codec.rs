//! Stable byte encoding of [`Credit`] records.
//!
//! Payloads are compact JSON with the field order and names the ledger has
//! always stored (`docType`, `creditid`, `owner`, `flight`, `weight`,
//! `price`, `Status`). Encoding is deterministic: the same credit always
//! produces the same bytes.

use lc_types::Credit;
use serde_json::{Map, Value};

use crate::error::{ChaincodeError, ChaincodeResult};

/// Serialize a credit into its ledger payload.
pub fn encode(credit: &Credit) -> ChaincodeResult<Vec<u8>> {
    serde_json::to_vec(credit).map_err(|e| ChaincodeError::Encode(e.to_string()))
}

/// Parse a ledger payload back into a credit.
///
/// Missing fields take their zero values; malformed JSON, non-integer
/// quantities, and unknown statuses are decode errors.
pub fn decode(bytes: &[u8]) -> ChaincodeResult<Credit> {
    serde_json::from_slice(bytes).map_err(|e| ChaincodeError::Decode(e.to_string()))
}

/// Recover what can be recovered from a payload [`decode`] rejects.
///
/// Keys match case-insensitively and each field is taken only when its value
/// has the right type; anything else keeps its zero value. An unknown status
/// decodes to `None`. A payload that is not a JSON object yields the zero
/// record.
pub fn decode_lenient(bytes: &[u8]) -> Credit {
    let fields = match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(fields)) => fields,
        _ => return Credit::default(),
    };
    Credit {
        object_type: text_field(&fields, "docType"),
        credit_id: text_field(&fields, "creditid"),
        owner: text_field(&fields, "owner"),
        flight_id: text_field(&fields, "flight"),
        weight: int_field(&fields, "weight"),
        price: int_field(&fields, "price"),
        status: field(&fields, "Status")
            .and_then(Value::as_str)
            .and_then(|raw| raw.parse().ok()),
    }
}

fn field<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields
        .get(name)
        .or_else(|| {
            fields
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
}

fn text_field(fields: &Map<String, Value>, name: &str) -> String {
    field(fields, name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn int_field(fields: &Map<String, Value>, name: &str) -> i64 {
    field(fields, name).and_then(Value::as_i64).unwrap_or_default()
}
