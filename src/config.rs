//! `.planview.yaml` settings
//!
//! Looked up in order: an explicit `--config` path, `./.planview.yaml`,
//! then `~/.planview.yaml`. Missing files fall back to defaults; a file
//! that exists but does not parse is an error.

use crate::plan::{IngestOptions, ReportOptions};
use crate::traits::FileSystem;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".planview.yaml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ingest: IngestOptions,
    pub report: ReportOptions,
}

impl Settings {
    /// Load settings, honoring an explicit path first
    pub fn load(fs: &dyn FileSystem, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            // An explicit path must exist
            return Self::from_file(fs, path);
        }

        let candidates = [
            Some(PathBuf::from(CONFIG_FILE)),
            dirs::home_dir().map(|home| home.join(CONFIG_FILE)),
        ];

        for path in candidates.into_iter().flatten() {
            if fs.exists(&path) {
                return Self::from_file(fs, &path);
            }
        }

        Ok(Self::default())
    }

    pub fn from_file(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let content = fs.read_to_string(path)?;
        Self::parse(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        // An empty file deserializes as null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{ActionMode, RecordPolicy};
    use crate::traits::MockFileSystem;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.ingest.action_mode, ActionMode::First);
        assert_eq!(settings.ingest.on_malformed_record, RecordPolicy::Skip);
        assert_eq!(settings.report.max_value_width, 60);
        assert!(!settings.report.show_unchanged);
    }

    #[test]
    fn test_parse_full_file() {
        let settings = Settings::parse(
            "ingest:\n  action_mode: compound\n  on_malformed_record: abort\nreport:\n  max_value_width: 30\n  show_unchanged: true\n",
        )
        .unwrap();

        assert_eq!(settings.ingest.action_mode, ActionMode::Compound);
        assert_eq!(settings.ingest.on_malformed_record, RecordPolicy::Abort);
        assert_eq!(settings.report.max_value_width, 30);
        assert!(settings.report.show_unchanged);
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let settings = Settings::parse("report:\n  show_unchanged: true\n").unwrap();

        assert_eq!(settings.ingest, IngestOptions::default());
        assert_eq!(settings.report.max_value_width, 60);
        assert!(settings.report.show_unchanged);
    }

    #[test]
    fn test_parse_empty_file() {
        assert_eq!(Settings::parse("").unwrap(), Settings::default());
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        assert!(Settings::parse("ingest:\n  action_mode: sometimes\n").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let fs = MockFileSystem::new().with_file(
            "/etc/planview.yaml",
            "ingest:\n  on_malformed_record: abort\n",
        );

        let settings = Settings::load(&fs, Some(Path::new("/etc/planview.yaml"))).unwrap();
        assert_eq!(settings.ingest.on_malformed_record, RecordPolicy::Abort);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let fs = MockFileSystem::new();
        assert!(Settings::load(&fs, Some(Path::new("/nope.yaml"))).is_err());
    }

    #[test]
    fn test_load_working_directory_file() {
        let fs = MockFileSystem::new().with_file(CONFIG_FILE, "ingest:\n  action_mode: compound\n");

        let settings = Settings::load(&fs, None).unwrap();
        assert_eq!(settings.ingest.action_mode, ActionMode::Compound);
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        let fs = MockFileSystem::new();
        assert_eq!(Settings::load(&fs, None).unwrap(), Settings::default());
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let fs = MockFileSystem::new().with_file(CONFIG_FILE, "report: [1, 2");

        let err = Settings::load(&fs, None).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
