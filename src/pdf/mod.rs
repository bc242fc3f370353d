//! PDF processing through Ghostscript

pub mod ghostscript;
pub mod metadata;
pub mod combine;
pub mod reduce;

// Re-export commonly used items
pub use ghostscript::{Ghostscript, PdfTool, ToolOutput};
pub use metadata::count_pages;
pub use combine::{combine_edition, combined_pdf_path};
pub use reduce::{reduce_in_place, temp_path};
