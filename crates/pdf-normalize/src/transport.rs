//! Data URI encoding for normalized documents

use crate::constants::PDF_MIME_TYPE;
use crate::types::{NormalizeError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encode PDF bytes as `data:application/pdf;base64,...`
pub fn to_data_uri(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", PDF_MIME_TYPE, STANDARD.encode(bytes))
}

/// Decode a PDF data URI back to bytes
pub fn from_data_uri(uri: &str) -> Result<Vec<u8>> {
    let payload = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.strip_prefix(PDF_MIME_TYPE))
        .and_then(|rest| rest.strip_prefix(";base64,"))
        .ok_or_else(|| {
            NormalizeError::Config(format!("Not a base64 {} data URI", PDF_MIME_TYPE))
        })?;

    STANDARD
        .decode(payload.trim())
        .map_err(|e| NormalizeError::Config(format!("Invalid base64 payload: {}", e)))
}
