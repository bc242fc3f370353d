//! Pipeline configuration: storage root, enabled stages and path templates

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::ValueEnum;
use tracing::debug;

use crate::error::{Error, Result};

/// Remote mount of the production server
pub const REMOTE_SERVER_PATH: &str = "/Volumes/Server/";

/// Local mirror of the server, relative to the home directory
pub const LOCAL_SERVER_DIR: &str = "Server";

/// Folder under the storage root that holds combined editions
pub const COMBINED_PDFS_DIR: &str = "Web PDFs";

/// Default InDesign PDF export preset
pub const DEFAULT_EXPORT_PRESET: &str = "MS E-Edition";

/// The shared location all date-keyed directories live under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoot(PathBuf);

impl StorageRoot {
    /// Wrap a path without checking that it exists
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Pick the first candidate that exists
    ///
    /// Candidates are checked in order, so a remote mount listed before the
    /// local mirror wins whenever both are present.
    pub fn select(candidates: &[PathBuf]) -> Result<Self> {
        for candidate in candidates {
            if candidate.exists() {
                debug!(root = %candidate.display(), "selected storage root");
                return Ok(Self(candidate.clone()));
            }
        }
        Err(Error::NoStorageRoot(candidates.to_vec()))
    }

    /// Remote mount first, then `~/Server/` when a home directory is known
    pub fn default_candidates() -> Vec<PathBuf> {
        let mut candidates = vec![PathBuf::from(REMOTE_SERVER_PATH)];
        if let Some(home) = std::env::var_os("HOME") {
            candidates.push(PathBuf::from(home).join(LOCAL_SERVER_DIR));
        }
        candidates
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Directory that receives combined edition PDFs
    pub fn combined_pdfs_dir(&self) -> PathBuf {
        self.0.join(COMBINED_PDFS_DIR)
    }
}

/// One step of the edition pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum Stage {
    /// Export InDesign layout pages to web PDFs
    Export,
    /// Merge the web PDFs into the combined edition file
    Combine,
    /// Shrink each web PDF in place
    Reduce,
}

/// The set of enabled stages
///
/// Stages always run in the order export, combine, reduce regardless of how
/// they were listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSet {
    export: bool,
    combine: bool,
    reduce: bool,
}

impl StageSet {
    pub fn none() -> Self {
        Self {
            export: false,
            combine: false,
            reduce: false,
        }
    }

    pub fn all() -> Self {
        Self::from_stages(&[Stage::Export, Stage::Combine, Stage::Reduce])
    }

    pub fn from_stages(stages: &[Stage]) -> Self {
        let mut set = Self::none();
        for stage in stages {
            set.enable(*stage);
        }
        set
    }

    pub fn enable(&mut self, stage: Stage) {
        match stage {
            Stage::Export => self.export = true,
            Stage::Combine => self.combine = true,
            Stage::Reduce => self.reduce = true,
        }
    }

    pub fn is_enabled(&self, stage: Stage) -> bool {
        match stage {
            Stage::Export => self.export,
            Stage::Combine => self.combine,
            Stage::Reduce => self.reduce,
        }
    }

    /// Enabled stages in execution order
    pub fn ordered(&self) -> Vec<Stage> {
        [Stage::Export, Stage::Combine, Stage::Reduce]
            .into_iter()
            .filter(|s| self.is_enabled(*s))
            .collect()
    }
}

/// Only size reduction runs by default
impl Default for StageSet {
    fn default() -> Self {
        Self::from_stages(&[Stage::Reduce])
    }
}

/// Date-keyed directory layout under the storage root
#[derive(Debug, Clone)]
pub struct PathTemplates {
    /// chrono format for the edition directory, relative to the root
    pub edition_dir: String,
    /// Subdirectory of the edition directory holding web PDFs
    pub web_pdfs_dir: String,
    /// Extension of layout documents
    pub layout_extension: String,
}

impl Default for PathTemplates {
    fn default() -> Self {
        Self {
            edition_dir: "Editions/%Y-%m-%d".to_string(),
            web_pdfs_dir: "Web PDFs".to_string(),
            layout_extension: "indd".to_string(),
        }
    }
}

impl PathTemplates {
    /// Edition directory for a date
    pub fn edition_dir(&self, root: &StorageRoot, date: &NaiveDate) -> Result<PathBuf> {
        use std::fmt::Write;

        let mut rendered = String::new();
        write!(rendered, "{}", date.format(&self.edition_dir))
            .map_err(|_| Error::InvalidTemplate(self.edition_dir.clone()))?;
        if rendered.is_empty() {
            return Err(Error::InvalidTemplate(self.edition_dir.clone()));
        }
        Ok(root.path().join(rendered))
    }

    /// Directory exported web PDFs for a date are written to
    pub fn web_pdfs_dir(&self, root: &StorageRoot, date: &NaiveDate) -> Result<PathBuf> {
        Ok(self.edition_dir(root, date)?.join(&self.web_pdfs_dir))
    }
}

/// Everything a pipeline run needs besides the date
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub root: StorageRoot,
    pub stages: StageSet,
    pub templates: PathTemplates,
    pub export_preset: String,
}

impl PipelineConfig {
    pub fn new(root: StorageRoot) -> Self {
        Self {
            root,
            stages: StageSet::default(),
            templates: PathTemplates::default(),
            export_preset: DEFAULT_EXPORT_PRESET.to_string(),
        }
    }

    pub fn with_stages(mut self, stages: StageSet) -> Self {
        self.stages = stages;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_select_prefers_first_existing() {
        let remote = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        let candidates = vec![remote.path().to_path_buf(), local.path().to_path_buf()];

        let root = StorageRoot::select(&candidates).unwrap();
        assert_eq!(root.path(), remote.path());
    }

    #[test]
    fn test_select_falls_back_to_local() {
        let local = TempDir::new().unwrap();
        let candidates = vec![
            PathBuf::from("/nonexistent/Volumes/Server"),
            local.path().to_path_buf(),
        ];

        let root = StorageRoot::select(&candidates).unwrap();
        assert_eq!(root.path(), local.path());
    }

    #[test]
    fn test_select_none_exist() {
        let candidates = vec![
            PathBuf::from("/nonexistent/a"),
            PathBuf::from("/nonexistent/b"),
        ];
        let err = StorageRoot::select(&candidates).unwrap_err();
        assert!(matches!(err, Error::NoStorageRoot(ref c) if c.len() == 2));
        assert!(err.to_string().contains("Can't find server location"));
    }

    #[test]
    fn test_default_candidates_remote_first() {
        let candidates = StorageRoot::default_candidates();
        assert_eq!(candidates[0], PathBuf::from(REMOTE_SERVER_PATH));
    }

    #[test]
    fn test_stage_set_default_is_reduce_only() {
        let stages = StageSet::default();
        assert_eq!(stages.ordered(), vec![Stage::Reduce]);
        assert!(!stages.is_enabled(Stage::Export));
        assert!(!stages.is_enabled(Stage::Combine));
    }

    #[test]
    fn test_stage_set_runs_in_fixed_order() {
        let stages = StageSet::from_stages(&[Stage::Reduce, Stage::Export, Stage::Reduce]);
        assert_eq!(stages.ordered(), vec![Stage::Export, Stage::Reduce]);
        assert_eq!(
            StageSet::all().ordered(),
            vec![Stage::Export, Stage::Combine, Stage::Reduce]
        );
        assert!(StageSet::none().ordered().is_empty());
    }

    #[test]
    fn test_edition_paths() {
        let root = StorageRoot::new("/srv");
        let templates = PathTemplates::default();
        let date = NaiveDate::from_ymd_opt(2017, 12, 31).unwrap();

        assert_eq!(
            templates.edition_dir(&root, &date).unwrap(),
            PathBuf::from("/srv/Editions/2017-12-31")
        );
        assert_eq!(
            templates.web_pdfs_dir(&root, &date).unwrap(),
            PathBuf::from("/srv/Editions/2017-12-31/Web PDFs")
        );
        assert_eq!(root.combined_pdfs_dir(), PathBuf::from("/srv/Web PDFs"));
    }

    #[test]
    fn test_invalid_template() {
        let root = StorageRoot::new("/srv");
        let templates = PathTemplates {
            edition_dir: "%Q".to_string(),
            ..PathTemplates::default()
        };
        let date = NaiveDate::from_ymd_opt(2017, 12, 31).unwrap();
        assert!(matches!(
            templates.edition_dir(&root, &date),
            Err(Error::InvalidTemplate(_))
        ));
    }
}
