//! Combining an edition's web PDFs into one file

use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::config::StorageRoot;
use crate::date::combined_pdf_name;
use crate::edition::WebPdf;
use crate::error::{Error, Result};
use super::ghostscript::PdfTool;

/// Where the combined edition for these files goes
///
/// Named from the first file's date: `<root>/Web PDFs/MS_%Y_%m_%d.pdf`.
pub fn combined_pdf_path(root: &StorageRoot, files: &[WebPdf]) -> Option<PathBuf> {
    let first = files.first()?;
    Some(root.combined_pdfs_dir().join(combined_pdf_name(&first.date)))
}

/// Merge all web PDFs of an edition into the combined edition file
///
/// Nothing is written when `files` is empty.
pub fn combine_edition(
    tool: &dyn PdfTool,
    root: &StorageRoot,
    files: &[WebPdf],
) -> Result<PathBuf> {
    let output = combined_pdf_path(root, files).ok_or(Error::NoWebPdfs)?;

    fs::create_dir_all(root.combined_pdfs_dir())?;

    let inputs: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();
    tool.write_pdf(&output, &inputs)?.into_result()?;

    info!(
        "Combined {} web PDFs into {}",
        inputs.len(),
        output.display()
    );
    Ok(output)
}
