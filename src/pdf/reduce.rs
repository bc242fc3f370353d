//! In-place size reduction of a single PDF

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use super::ghostscript::PdfTool;
use super::metadata::count_pages;

/// Suffix appended to the file name while re-encoding
pub const TEMP_SUFFIX: &str = ".tmp";

/// Sibling path the re-encoded file is written to: `page.pdf` -> `page.pdf.tmp`
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}

/// Replace a PDF with a reduced-size version
///
/// The re-encode goes to a sibling temp file which is renamed over the
/// original only after the tool succeeded and the output has pages. On any
/// failure the temp file is removed and the original is left as it was.
pub fn reduce_in_place(tool: &dyn PdfTool, path: &Path) -> Result<()> {
    let tmp = temp_path(path);

    let reencoded = tool
        .write_pdf(&tmp, &[path.to_path_buf()])
        .and_then(|output| output.into_result())
        .and_then(|_| count_pages(&tmp));

    let pages = match reencoded {
        Ok(pages) => pages,
        Err(e) => {
            if tmp.exists() {
                if let Err(rm) = fs::remove_file(&tmp) {
                    debug!("could not remove {}: {}", tmp.display(), rm);
                }
            }
            return Err(e);
        }
    };

    let before = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    fs::rename(&tmp, path)?;
    let after = fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    info!(
        "Reduced PDF file: {:>24} ({} pages, {} -> {} bytes)",
        path.file_name().unwrap_or_default().to_string_lossy(),
        pages,
        before,
        after
    );
    Ok(())
}
