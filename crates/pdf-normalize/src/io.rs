//! Document I/O operations for normalization

use crate::types::*;
use lopdf::Document;
use std::path::Path;

/// Parse a PDF from memory.
///
/// With `ignore_encryption`, an encrypted document is decrypted with the
/// empty password when possible and otherwise processed as-is.
pub fn load_pdf_bytes(bytes: &[u8], ignore_encryption: bool) -> Result<Document> {
    let mut doc = Document::load_mem(bytes).map_err(NormalizeError::Load)?;

    if doc.is_encrypted() {
        if !ignore_encryption {
            return Err(NormalizeError::Encrypted);
        }
        if let Err(e) = doc.decrypt("") {
            log::warn!("Could not bypass encryption, continuing anyway: {}", e);
        }
    }

    Ok(doc)
}

/// Serialize a document to bytes
pub fn save_pdf_bytes(doc: &mut Document) -> Result<Vec<u8>> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer)
        .map_err(|e| NormalizeError::Serialization(e.to_string()))?;
    Ok(writer)
}

/// Load a single PDF document
pub async fn load_pdf(path: impl AsRef<Path>, ignore_encryption: bool) -> Result<Document> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    let doc =
        tokio::task::spawn_blocking(move || load_pdf_bytes(&bytes, ignore_encryption)).await??;
    Ok(doc)
}

/// Save a document to disk
pub async fn save_pdf(mut doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::task::spawn_blocking(move || save_pdf_bytes(&mut doc)).await??;
    tokio::fs::write(&path, bytes).await?;
    Ok(())
}
