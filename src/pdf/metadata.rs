//! PDF page counting, used to check re-encoded output

use std::path::Path;
use lopdf::{Document, Object};
use crate::error::{Error, Result};

/// Count pages by reading the Count field from the Pages dictionary
/// This is more reliable than get_pages() which doesn't handle nested page trees
fn count_pages_from_catalog(doc: &Document) -> Option<usize> {
    let catalog_id = match doc.trailer.get(b"Root").ok()? {
        Object::Reference(id) => *id,
        _ => return None,
    };

    let pages_id = match doc.get_dictionary(catalog_id).ok()?.get(b"Pages").ok()? {
        Object::Reference(id) => *id,
        _ => return None,
    };

    match doc.get_dictionary(pages_id).ok()?.get(b"Count").ok()? {
        Object::Integer(n) if *n >= 0 => Some(*n as usize),
        _ => None,
    }
}

/// Count the number of pages in a PDF file
///
/// Falls back to walking the page tree when the catalog has no usable Count.
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )));
    }

    let doc = Document::load(path)?;
    let page_count = count_pages_from_catalog(&doc).unwrap_or_else(|| doc.get_pages().len());

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    Ok(page_count)
}
