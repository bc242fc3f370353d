//! Ghostscript invocation with fixed screen-quality settings

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::debug;

use crate::error::{Error, Result};

/// Flags passed before the output file, in order
pub const GHOSTSCRIPT_FLAGS: [&str; 6] = [
    "-sDEVICE=pdfwrite",
    "-dPDFSETTINGS=/screen",
    "-dCompatibilityLevel=1.5",
    "-dNOPAUSE",
    "-dQUIET",
    "-dBATCH",
];

/// Outcome of one external tool run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub tool: String,
    pub success: bool,
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
    pub stderr: String,
}

impl ToolOutput {
    pub fn from_output(tool: impl Into<String>, output: &Output) -> Self {
        Self {
            tool: tool.into(),
            success: output.status.success(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        }
    }

    /// Turn a failed run into [`Error::ToolFailed`]
    pub fn into_result(self) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(Error::ToolFailed {
                tool: self.tool,
                code: self.code,
                stderr: self.stderr,
            })
        }
    }
}

/// Something that can rewrite one or more PDFs into a single output file
pub trait PdfTool {
    /// Write `inputs`, in order, to `output`
    fn write_pdf(&self, output: &Path, inputs: &[PathBuf]) -> Result<ToolOutput>;
}

/// The `gs` command line tool
#[derive(Debug, Clone)]
pub struct Ghostscript {
    binary: PathBuf,
}

impl Ghostscript {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Full argument list for one run
    pub fn args(output: &Path, inputs: &[PathBuf]) -> Vec<String> {
        let mut args: Vec<String> = GHOSTSCRIPT_FLAGS.iter().map(|f| f.to_string()).collect();
        args.push(format!("-sOutputFile={}", output.display()));
        args.extend(inputs.iter().map(|p| p.display().to_string()));
        args
    }
}

impl Default for Ghostscript {
    fn default() -> Self {
        Self::new("gs")
    }
}

impl PdfTool for Ghostscript {
    fn write_pdf(&self, output: &Path, inputs: &[PathBuf]) -> Result<ToolOutput> {
        let tool = self.binary.display().to_string();
        let args = Self::args(output, inputs);
        debug!("$ {} {}", tool, args.join(" "));

        let result = Command::new(&self.binary)
            .args(&args)
            .output()
            .map_err(|source| Error::ToolUnavailable {
                tool: tool.clone(),
                source,
            })?;

        Ok(ToolOutput::from_output(tool, &result))
    }
}
