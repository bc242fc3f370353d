//! Exporting InDesign layout pages to web PDFs
//!
//! Each page is exported by one AppleScript run through `osascript`. A single
//! page document exports its page 1. A spread document exports pages 2 and 3
//! (the two content pages after the cover), each to its own PDF named after
//! that page's number.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{error, info};

use crate::edition::LayoutPage;
use crate::error::{Error, Result};

/// One page to export: `page` is the page number inside the InDesign document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub page: u32,
}

/// Work out the export jobs for a layout document
///
/// With one page the PDF is named like the source with a `.pdf` extension.
/// With a spread such as `MS_A_12-13.indd` the joined token `12-13` is
/// replaced, first occurrence only, by `12` and then by `13`. The token is
/// matched by value, so `MS_A_02-03.indd` gives `MS_A_02.pdf` and `MS_A_03.pdf`.
pub fn plan_exports(record: &LayoutPage, web_pdf_dir: &Path) -> Result<Vec<ExportJob>> {
    let pdf_name = record
        .path
        .with_extension("pdf")
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let job = |page: u32, name: String| ExportJob {
        source: record.path.clone(),
        destination: web_pdf_dir.join(name),
        page,
    };

    match record.pages.as_slice() {
        [_] => Ok(vec![job(1, pdf_name)]),
        [first, second] => {
            // Equal page numbers would name both PDFs the same
            let (left, right) = spread_token(&pdf_name, *first, *second)
                .filter(|_| first != second)
                .ok_or_else(|| Error::SpreadTokenMissing {
                    path: record.path.clone(),
                    first: *first,
                    second: *second,
                })?;
            let joined = format!("{}-{}", left, right);
            Ok(vec![
                job(2, pdf_name.replacen(&joined, left, 1)),
                job(3, pdf_name.replacen(&joined, right, 1)),
            ])
        }
        pages => Err(Error::UnsupportedPageCount {
            path: record.path.clone(),
            count: pages.len(),
        }),
    }
}

/// First `N-M` token in `name` whose numbers are `first` and `second`,
/// returned as the literal digit strings
fn spread_token(name: &str, first: u32, second: u32) -> Option<(&str, &str)> {
    name.split(|c: char| !(c.is_ascii_digit() || c == '-'))
        .flat_map(|run| {
            let parts: Vec<&str> = run.split('-').collect();
            (1..parts.len())
                .map(|i| (parts[i - 1], parts[i]))
                .collect::<Vec<_>>()
        })
        .find(|(left, right)| {
            left.parse::<u32>().ok() == Some(first) && right.parse::<u32>().ok() == Some(second)
        })
}

/// Quote a value for use inside an AppleScript string literal
fn applescript_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// AppleScript that exports one page of an InDesign document
///
/// Dialogs are suppressed for the duration of the export. The `on error`
/// branch closes the document and restores the interaction level before
/// re-raising, so a failed export never leaves InDesign silent.
pub fn render_export_script(job: &ExportJob, preset: &str) -> String {
    format!(
        r#"on export_pdf(posix_path, pdf_export_file, page_to_export, preset_name)
	tell application "Adobe InDesign CS4"
		-- Suppress dialogs
		set user interaction level of script preferences to never interact
		try
			set smallestSize to PDF export preset preset_name

			open (POSIX file posix_path as alias)

			tell PDF export preferences to set page range to page_to_export
			export the active document format PDF type to POSIX file pdf_export_file using smallestSize

			close the active document
		on error error_message number error_number
			try
				close the active document saving no
			end try
			set user interaction level of script preferences to interact with all
			error error_message number error_number
		end try

		-- Restore dialogs
		set user interaction level of script preferences to interact with all
	end tell
end export_pdf

on run {{}}
	export_pdf({source}, {destination}, {page}, {preset})
end run
"#,
        source = applescript_string(&job.source.to_string_lossy()),
        destination = applescript_string(&job.destination.to_string_lossy()),
        page = applescript_string(&job.page.to_string()),
        preset = applescript_string(preset),
    )
}

/// Captured output of a script run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs a script through the desktop scripting bridge
pub trait ScriptRunner {
    fn run_script(&self, script: &str) -> Result<ScriptOutput>;
}

/// `osascript -`, with the script fed on stdin
#[derive(Debug, Clone)]
pub struct Osascript {
    program: PathBuf,
}

impl Osascript {
    /// Use another interpreter that reads a script from `-` (stdin)
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for Osascript {
    fn default() -> Self {
        Self::with_program("osascript")
    }
}

impl ScriptRunner for Osascript {
    fn run_script(&self, script: &str) -> Result<ScriptOutput> {
        let unavailable = |source| Error::ToolUnavailable {
            tool: self.program.display().to_string(),
            source,
        };

        let mut child = Command::new(&self.program)
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(unavailable)?;

        // stdin is closed at the end of this block so the child sees EOF
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(script.as_bytes()),
            None => Ok(()),
        };

        // Reap the child even when the script could not be written
        let output = child.wait_with_output()?;
        written?;
        Ok(ScriptOutput {
            stdout: String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        })
    }
}

/// Result of running the export jobs of one layout document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOutcome {
    /// Jobs whose script ran cleanly
    pub exported: Vec<ExportJob>,
    /// Jobs whose script could not run or wrote to stderr, with the reason
    pub failed: Vec<(ExportJob, String)>,
}

/// Exports layout documents page by page
pub struct PageExporter<'a> {
    runner: &'a dyn ScriptRunner,
    preset: String,
}

impl<'a> PageExporter<'a> {
    pub fn new(runner: &'a dyn ScriptRunner, preset: impl Into<String>) -> Self {
        Self {
            runner,
            preset: preset.into(),
        }
    }

    /// Export every page of `record` into `web_pdf_dir`
    ///
    /// The directory is created first if needed. A failed page is logged and
    /// recorded in [`ExportOutcome::failed`]; the remaining pages still run.
    pub fn export_page(&self, record: &LayoutPage, web_pdf_dir: &Path) -> Result<ExportOutcome> {
        fs::create_dir_all(web_pdf_dir)?;

        let mut outcome = ExportOutcome::default();
        for job in plan_exports(record, web_pdf_dir)? {
            let script = render_export_script(&job, &self.preset);
            match self.runner.run_script(&script) {
                Ok(output) if output.stderr.is_empty() => {
                    info!(
                        "Exported PDF file: {:>24}",
                        job.destination
                            .file_name()
                            .unwrap_or_default()
                            .to_string_lossy()
                    );
                    outcome.exported.push(job);
                }
                Ok(output) => {
                    error!("AppleScript stderr: {}", output.stderr);
                    outcome.failed.push((job, output.stderr));
                }
                Err(e) => {
                    error!("AppleScript failed for {}: {}", job.source.display(), e);
                    outcome.failed.push((job, e.to_string()));
                }
            }
        }

        Ok(outcome)
    }
}
