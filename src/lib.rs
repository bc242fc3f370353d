//! PDF Edition Library
//!
//! Automates the daily edition PDF workflow for one publication date:
//! - Locate the edition's layout documents and web PDFs on the server
//! - Export layout pages to web PDFs through InDesign (AppleScript)
//! - Combine the web PDFs into `Web PDFs/MS_YYYY_MM_DD.pdf` (Ghostscript)
//! - Shrink each web PDF in place (Ghostscript)
//!
//! # Example
//!
//! ```no_run
//! use pdf_edition::config::{PipelineConfig, StorageRoot};
//! use pdf_edition::date::parse_edition_date;
//! use pdf_edition::edition::TemplateResolver;
//! use pdf_edition::export::Osascript;
//! use pdf_edition::pdf::Ghostscript;
//! use pdf_edition::pipeline::Pipeline;
//!
//! let root = StorageRoot::select(&StorageRoot::default_candidates())?;
//! let config = PipelineConfig::new(root.clone());
//! let resolver = TemplateResolver::new(root, config.templates.clone());
//! let pipeline = Pipeline {
//!     config: &config,
//!     resolver: &resolver,
//!     pdf_tool: &Ghostscript::default(),
//!     scripts: &Osascript::default(),
//! };
//! pipeline.run(&parse_edition_date("2017-12-31")?)?;
//! # Ok::<(), pdf_edition::Error>(())
//! ```

pub mod error;
pub mod date;
pub mod config;
pub mod edition;
pub mod export;
pub mod pdf;
pub mod pipeline;

// Re-export commonly used items
pub use error::{Error, Result};
