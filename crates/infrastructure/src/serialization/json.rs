//! JSON encoding for the token and settings files.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A file could not be encoded or decoded.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// The value could not be written as JSON.
    #[error("cannot encode JSON: {0}")]
    Encode(serde_json::Error),

    /// The content is not valid JSON for the target type.
    #[error("cannot decode JSON: {0}")]
    Decode(serde_json::Error),
}

/// Pretty-prints `value` with a trailing newline, so rewriting an unchanged
/// file gives the same bytes. Map key order is the source order; persisted
/// maps are `BTreeMap`s.
///
/// # Errors
///
/// Returns [`SerializationError::Encode`] if `value` cannot be serialized.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let mut json = serde_json::to_string_pretty(value).map_err(SerializationError::Encode)?;
    json.push('\n');
    Ok(json)
}

/// Byte form of [`to_json_stable`], ready for `fs::write`.
///
/// # Errors
///
/// Returns [`SerializationError::Encode`] if `value` cannot be serialized.
pub fn to_json_stable_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    to_json_stable(value).map(String::into_bytes)
}

/// # Errors
///
/// Returns [`SerializationError::Decode`] on malformed or mistyped input.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, SerializationError> {
    serde_json::from_str(json).map_err(SerializationError::Decode)
}

/// # Errors
///
/// Returns [`SerializationError::Decode`] on malformed or mistyped input.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::Decode)
}
