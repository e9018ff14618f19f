//! Metadata codec.
//!
//! Converts [`Metadata`] to and from the JSON document stored in the
//! `metadata` column. The repository calls these functions explicitly at the
//! read/write boundary; nothing is encoded implicitly by the driver.
//!
//! Wire format: a JSON array of `{"key": string, "value": string}` records.
//! Record order is preserved. An empty list is `[]`.
//!
//! Round-trip law: `decode(encode(m)?.as_bytes())? == m` for every `m`.

use crate::metadata::{KeyValue, Metadata};

/// Errors from the metadata codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Failed to encode metadata: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Malformed metadata document: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Serialize metadata to its stored document.
pub fn encode(metadata: &Metadata) -> Result<String, CodecError> {
    serde_json::to_string(metadata).map_err(CodecError::Encode)
}

/// Parse a stored document back into metadata.
///
/// Fails if the input is not JSON, is not an array, or contains a record
/// that is not exactly `{key, value}` with string fields.
pub fn decode(document: &[u8]) -> Result<Metadata, CodecError> {
    serde_json::from_slice(document).map_err(CodecError::Decode)
}

/// [`decode`] for documents already held as text.
pub fn decode_str(document: &str) -> Result<Metadata, CodecError> {
    decode(document.as_bytes())
}

/// Serialize a single record, without wrapping it in an array.
///
/// This is the candidate document for containment queries.
pub fn encode_pair(pair: &KeyValue) -> Result<String, CodecError> {
    serde_json::to_string(pair).map_err(CodecError::Encode)
}

/// Parse a single record document.
pub fn decode_pair(document: &[u8]) -> Result<KeyValue, CodecError> {
    serde_json::from_slice(document).map_err(CodecError::Decode)
}
