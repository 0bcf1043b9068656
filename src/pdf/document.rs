//! Loading PDF bytes into a lopdf object graph and writing it back out

use std::path::Path;
use lopdf::{Document, Object};
use tracing::debug;
use crate::error::{Error, Result};

/// Parse raw bytes into a [`Document`].
///
/// Fails with [`Error::Parse`] when the bytes are not a well-formed PDF,
/// when the trailer has no catalog, or when the document is encrypted.
/// A well-formed document with no pages loads fine and passes through unchanged.
pub fn load_document(bytes: &[u8]) -> Result<Document> {
    let doc = Document::load_mem(bytes).map_err(|e| Error::Parse(e.to_string()))?;

    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err(Error::Parse("encrypted documents are not supported".to_string()));
    }

    let has_catalog = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .and_then(|id| doc.get_object(id))
        .and_then(Object::as_dict)
        .is_ok();
    if !has_catalog {
        return Err(Error::Parse("trailer has no document catalog".to_string()));
    }

    let page_count = doc.get_pages().len();
    debug!(page_count, objects = doc.objects.len(), "loaded document");
    Ok(doc)
}

/// Read and parse a PDF file
pub fn load_document_file(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::PathNotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path)?;
    load_document(&bytes)
}

/// Serialize a [`Document`] to PDF bytes.
///
/// Streams are compressed first, so the same graph always produces the same bytes.
pub fn save_document(doc: &mut Document) -> Result<Vec<u8>> {
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;

    Ok(buffer)
}

/// Serialize a [`Document`] and write it to `path`, overwriting any existing file.
///
/// Nothing is written unless serialization succeeds.
pub fn save_document_file(doc: &mut Document, path: &Path) -> Result<()> {
    let bytes = save_document(doc)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
