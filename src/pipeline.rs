//! Running the enabled stages for one edition date

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::config::{PipelineConfig, Stage};
use crate::edition::EditionResolver;
use crate::error::{Error, Result};
use crate::export::{PageExporter, ScriptRunner};
use crate::pdf::{combine_edition, reduce_in_place, PdfTool};

/// What a pipeline run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Web PDFs written by the export stage
    pub exported: Vec<PathBuf>,
    /// Web PDFs the export stage tried and failed to write
    pub export_failed: Vec<PathBuf>,
    /// Combined edition file, if the combine stage succeeded
    pub combined: Option<PathBuf>,
    /// Why the combine stage failed, if it did
    pub combine_failed: Option<String>,
    /// Web PDFs successfully reduced in place
    pub reduced: Vec<PathBuf>,
    /// Web PDFs whose reduction failed and were left untouched
    pub failed: Vec<PathBuf>,
}

/// External collaborators a run needs
pub struct Pipeline<'a> {
    pub config: &'a PipelineConfig,
    pub resolver: &'a dyn EditionResolver,
    pub pdf_tool: &'a dyn PdfTool,
    pub scripts: &'a dyn ScriptRunner,
}

impl Pipeline<'_> {
    /// Run the enabled stages in order: export, combine, reduce
    ///
    /// Failures of the external tools are logged, recorded in the report and
    /// skipped: a failed page export, a failed combine and a failed reduce of
    /// one file all let the run continue with the next step. A combine stage
    /// with nothing to combine is returned as [`Error::NoWebPdfs`] and ends
    /// the run, as do resolver and filesystem errors.
    pub fn run(&self, date: &NaiveDate) -> Result<PipelineReport> {
        let mut report = PipelineReport::default();

        for stage in self.config.stages.ordered() {
            info!("Running {:?} stage for {}", stage, date);
            match stage {
                Stage::Export => self.export(date, &mut report)?,
                Stage::Combine => self.combine(date, &mut report)?,
                Stage::Reduce => self.reduce(date, &mut report)?,
            }
        }

        Ok(report)
    }

    fn export(&self, date: &NaiveDate, report: &mut PipelineReport) -> Result<()> {
        let exporter = PageExporter::new(self.scripts, self.config.export_preset.as_str());
        let web_pdf_dir = self.resolver.web_pdfs_dir(date)?;

        let records = self.resolver.layout_pages(date)?;
        if records.is_empty() {
            warn!("No layout files found for {}", date);
        }

        for record in &records {
            match exporter.export_page(record, &web_pdf_dir) {
                Ok(outcome) => {
                    report
                        .exported
                        .extend(outcome.exported.into_iter().map(|j| j.destination));
                    report
                        .export_failed
                        .extend(outcome.failed.into_iter().map(|(j, _)| j.destination));
                }
                Err(e) => error!("Skipping {}: {}", record.path.display(), e),
            }
        }
        Ok(())
    }

    fn combine(&self, date: &NaiveDate, report: &mut PipelineReport) -> Result<()> {
        let files = self.resolver.web_pdfs(date)?;
        match combine_edition(self.pdf_tool, &self.config.root, &files) {
            Ok(output) => report.combined = Some(output),
            Err(e @ (Error::ToolFailed { .. } | Error::ToolUnavailable { .. })) => {
                error!("Could not combine edition {}: {}", date, e);
                report.combine_failed = Some(e.to_string());
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn reduce(&self, date: &NaiveDate, report: &mut PipelineReport) -> Result<()> {
        for file in self.resolver.web_pdfs(date)? {
            match reduce_in_place(self.pdf_tool, &file.path) {
                Ok(()) => report.reduced.push(file.path),
                Err(e) => {
                    error!("Could not reduce {}: {}", file.path.display(), e);
                    report.failed.push(file.path);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StageSet, StorageRoot};
    use crate::edition::{LayoutPage, WebPdf};
    use crate::export::ScriptOutput;
    use crate::pdf::ToolOutput;
    use std::cell::RefCell;
    use std::path::Path;

    struct FixedResolver {
        layouts: Vec<LayoutPage>,
        pdfs: Vec<WebPdf>,
    }

    impl EditionResolver for FixedResolver {
        fn layout_pages(&self, _date: &NaiveDate) -> Result<Vec<LayoutPage>> {
            Ok(self.layouts.clone())
        }

        fn web_pdfs(&self, _date: &NaiveDate) -> Result<Vec<WebPdf>> {
            Ok(self.pdfs.clone())
        }

        fn web_pdfs_dir(&self, _date: &NaiveDate) -> Result<PathBuf> {
            Ok(std::env::temp_dir().join("pdf-edition-pipeline-test"))
        }
    }

    /// Records calls and fails every run whose output name contains "bad"
    #[derive(Default)]
    struct RecordingTool {
        outputs: RefCell<Vec<PathBuf>>,
    }

    impl PdfTool for RecordingTool {
        fn write_pdf(&self, output: &Path, _inputs: &[PathBuf]) -> Result<ToolOutput> {
            self.outputs.borrow_mut().push(output.to_path_buf());
            Ok(ToolOutput {
                tool: "gs".to_string(),
                success: !output.to_string_lossy().contains("bad"),
                code: Some(0),
                stderr: String::new(),
            })
        }
    }

    #[derive(Default)]
    struct CountingRunner {
        runs: RefCell<usize>,
    }

    impl ScriptRunner for CountingRunner {
        fn run_script(&self, _script: &str) -> Result<ScriptOutput> {
            *self.runs.borrow_mut() += 1;
            Ok(ScriptOutput::default())
        }
    }

    /// Bridge that never starts
    struct UnavailableRunner;

    impl ScriptRunner for UnavailableRunner {
        fn run_script(&self, _script: &str) -> Result<ScriptOutput> {
            Err(Error::ToolUnavailable {
                tool: "osascript".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 12, 31).unwrap()
    }

    fn resolver() -> FixedResolver {
        FixedResolver {
            layouts: vec![
                LayoutPage {
                    path: PathBuf::from("/edition/MS_A_1.indd"),
                    date: date(),
                    pages: vec![1],
                },
                LayoutPage {
                    path: PathBuf::from("/edition/MS_A_2-3.indd"),
                    date: date(),
                    pages: vec![2, 3],
                },
            ],
            pdfs: vec![WebPdf {
                path: PathBuf::from("/nonexistent/web/MS_A_1.pdf"),
                date: date(),
            }],
        }
    }

    #[test]
    fn test_default_runs_reduce_only() {
        let config = PipelineConfig::new(StorageRoot::new("/nonexistent/root"));
        let resolver = resolver();
        let tool = RecordingTool::default();
        let runner = CountingRunner::default();
        let pipeline = Pipeline {
            config: &config,
            resolver: &resolver,
            pdf_tool: &tool,
            scripts: &runner,
        };

        let report = pipeline.run(&date()).unwrap();

        assert_eq!(*runner.runs.borrow(), 0);
        assert!(report.exported.is_empty());
        assert_eq!(report.combined, None);
        assert_eq!(
            *tool.outputs.borrow(),
            vec![PathBuf::from("/nonexistent/web/MS_A_1.pdf.tmp")]
        );
        // The recorded tool writes nothing, so validation fails and the file is skipped
        assert_eq!(report.failed, vec![PathBuf::from("/nonexistent/web/MS_A_1.pdf")]);
    }

    #[test]
    fn test_export_stage_runs_one_script_per_page() {
        let config = PipelineConfig::new(StorageRoot::new("/nonexistent/root"))
            .with_stages(StageSet::from_stages(&[Stage::Export]));
        let resolver = resolver();
        let tool = RecordingTool::default();
        let runner = CountingRunner::default();
        let pipeline = Pipeline {
            config: &config,
            resolver: &resolver,
            pdf_tool: &tool,
            scripts: &runner,
        };

        let report = pipeline.run(&date()).unwrap();

        assert_eq!(*runner.runs.borrow(), 3);
        let names: Vec<_> = report
            .exported
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["MS_A_1.pdf", "MS_A_2.pdf", "MS_A_3.pdf"]);
        assert!(tool.outputs.borrow().is_empty());
    }

    #[test]
    fn test_combine_without_pdfs_is_fatal() {
        let config = PipelineConfig::new(StorageRoot::new("/nonexistent/root"))
            .with_stages(StageSet::from_stages(&[Stage::Combine, Stage::Reduce]));
        let resolver = FixedResolver {
            layouts: Vec::new(),
            pdfs: Vec::new(),
        };
        let tool = RecordingTool::default();
        let runner = CountingRunner::default();
        let pipeline = Pipeline {
            config: &config,
            resolver: &resolver,
            pdf_tool: &tool,
            scripts: &runner,
        };

        let result = pipeline.run(&date());

        assert!(matches!(result, Err(Error::NoWebPdfs)));
        assert!(tool.outputs.borrow().is_empty());
    }

    #[test]
    fn test_failed_exports_are_not_reported_as_exported() {
        let config = PipelineConfig::new(StorageRoot::new("/nonexistent/root"))
            .with_stages(StageSet::from_stages(&[Stage::Export]));
        let resolver = resolver();
        let tool = RecordingTool::default();
        let pipeline = Pipeline {
            config: &config,
            resolver: &resolver,
            pdf_tool: &tool,
            scripts: &UnavailableRunner,
        };

        let report = pipeline.run(&date()).unwrap();

        assert!(report.exported.is_empty());
        let names: Vec<_> = report
            .export_failed
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["MS_A_1.pdf", "MS_A_2.pdf", "MS_A_3.pdf"]);
    }

    #[test]
    fn test_failed_combine_still_reduces() {
        let dir = tempfile::TempDir::new().unwrap();
        // RecordingTool fails any output under a path containing "bad"
        let config = PipelineConfig::new(StorageRoot::new(dir.path().join("bad-root")))
            .with_stages(StageSet::from_stages(&[Stage::Combine, Stage::Reduce]));
        let resolver = resolver();
        let tool = RecordingTool::default();
        let runner = CountingRunner::default();
        let pipeline = Pipeline {
            config: &config,
            resolver: &resolver,
            pdf_tool: &tool,
            scripts: &runner,
        };

        let report = pipeline.run(&date()).unwrap();

        assert_eq!(report.combined, None);
        assert!(report.combine_failed.is_some());
        let outputs = tool.outputs.borrow();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[1], PathBuf::from("/nonexistent/web/MS_A_1.pdf.tmp"));
        assert_eq!(report.failed, vec![PathBuf::from("/nonexistent/web/MS_A_1.pdf")]);
    }
}
