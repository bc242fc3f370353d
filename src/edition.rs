//! Locating an edition's files on the storage root
//!
//! Layout documents live directly in the edition directory for a date and
//! carry their page numbers at the end of the file stem, e.g.
//! `MS_A_12.indd` (page 12) or `MS_A_12-13.indd` (spread of pages 12 and 13).
//! Exported web PDFs live in the edition's `Web PDFs` subdirectory.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use glob::glob;
use tracing::warn;

use crate::config::{PathTemplates, StorageRoot};
use crate::error::{Error, Result};

/// One physical layout document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPage {
    pub path: PathBuf,
    pub date: NaiveDate,
    /// Physical page numbers, one for a single page or two for a spread
    pub pages: Vec<u32>,
}

/// One exported per-page web PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebPdf {
    pub path: PathBuf,
    pub date: NaiveDate,
}

/// Enumerates the files belonging to an edition date
pub trait EditionResolver {
    /// Layout documents for the date, ordered by path
    fn layout_pages(&self, date: &NaiveDate) -> Result<Vec<LayoutPage>>;

    /// Web PDFs already present for the date, ordered by path
    fn web_pdfs(&self, date: &NaiveDate) -> Result<Vec<WebPdf>>;

    /// Directory new web PDFs for the date are exported into
    fn web_pdfs_dir(&self, date: &NaiveDate) -> Result<PathBuf>;
}

/// Resolver driven by [`PathTemplates`] over a storage root
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    root: StorageRoot,
    templates: PathTemplates,
}

impl TemplateResolver {
    pub fn new(root: StorageRoot, templates: PathTemplates) -> Self {
        Self { root, templates }
    }
}

impl EditionResolver for TemplateResolver {
    fn layout_pages(&self, date: &NaiveDate) -> Result<Vec<LayoutPage>> {
        let dir = self.templates.edition_dir(&self.root, date)?;
        let mut records = Vec::new();

        for path in list_files(&dir, &self.templates.layout_extension)? {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            match parse_page_numbers(&stem) {
                Some(pages) => records.push(LayoutPage {
                    path,
                    date: *date,
                    pages,
                }),
                None => warn!(file = %path.display(), "no page number in layout file name, skipping"),
            }
        }

        Ok(records)
    }

    fn web_pdfs(&self, date: &NaiveDate) -> Result<Vec<WebPdf>> {
        let dir = self.web_pdfs_dir(date)?;
        Ok(list_files(&dir, "pdf")?
            .into_iter()
            .map(|path| WebPdf { path, date: *date })
            .collect())
    }

    fn web_pdfs_dir(&self, date: &NaiveDate) -> Result<PathBuf> {
        self.templates.web_pdfs_dir(&self.root, date)
    }
}

/// Files in `dir` with the given extension, sorted. A missing directory is empty.
fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    // Brackets in directory names must not act as wildcards
    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        extension
    );

    let mut paths = Vec::new();
    for entry in glob(&pattern).map_err(|e| Error::InvalidTemplate(e.to_string()))? {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => warn!("glob error in {}: {}", dir.display(), e),
        }
    }

    paths.sort();
    Ok(paths)
}

/// Page numbers from the last numeric token of a file stem
///
/// `"MS_A_12"` gives `[12]`, `"MS_A_12-13"` gives `[12, 13]`.
pub fn parse_page_numbers(stem: &str) -> Option<Vec<u32>> {
    let token = stem
        .rsplit(|c: char| !(c.is_ascii_digit() || c == '-'))
        .find(|t| t.chars().any(|c| c.is_ascii_digit()))?;
    let token = token.trim_matches('-');

    let pages = token
        .split('-')
        .map(|n| n.parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;

    match pages.len() {
        1 | 2 => Some(pages),
        _ => None,
    }
}
