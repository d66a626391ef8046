//! Sequence columns (question options, recipe ingredients and steps) are
//! stored as JSON-encoded text and decoded on every read.

use super::StoreError;

pub fn encode_list(field: &'static str, items: &[String]) -> Result<String, StoreError> {
    serde_json::to_string(items).map_err(|source| StoreError::Encode { field, source })
}

/// A stored value that does not decode means the row is corrupt, never that
/// the client sent something wrong.
pub fn decode_list(field: &'static str, raw: &str) -> Result<Vec<String>, StoreError> {
    serde_json::from_str(raw).map_err(|source| StoreError::Corrupt { field, source })
}
