//! Error types for the edition pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the edition pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Edition date could not be parsed
    #[error("Invalid edition date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    /// None of the candidate storage roots exist
    #[error("Can't find server location (tried {})", display_paths(.0))]
    NoStorageRoot(Vec<PathBuf>),

    /// Combine stage found nothing to combine
    #[error("No web PDF files found for ghostscript step")]
    NoWebPdfs,

    /// Layout record with a page count other than 1 or 2
    #[error("Unsupported page count {count} for layout file {}", .path.display())]
    UnsupportedPageCount { path: PathBuf, count: usize },

    /// Spread file name does not contain its joined page token
    #[error("No {first}-{second} page token in layout file name {}", .path.display())]
    SpreadTokenMissing { path: PathBuf, first: u32, second: u32 },

    /// External tool ran but reported failure
    #[error("{tool} failed ({}): {stderr}", display_code(.code))]
    ToolFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    /// External tool could not be started
    #[error("failed to run `{tool}`: {source}")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// Path template produced something unusable
    #[error("Invalid path template: {0}")]
    InvalidTemplate(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}
