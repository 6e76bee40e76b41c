//! Run configuration and input path resolution

use crate::error::{SpliceError, SpliceResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_HEADER_KEYWORD: &str = "HEADER_KEYWORD_TEXT";
pub const DEFAULT_DATA_STRUCTURE: &str = "DATA_GROUP_COLLECTION";
pub const DEFAULT_FILENAME_PATTERN: &str =
    "project/xml_data/{data_group}/{category}/report/{category}_*_meas.xlsx";

const PLACEHOLDERS: [&str; 2] = ["data_group", "category"];

/// Settings for one run. Every field has a default, so a config file only
/// lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    /// Column-0 value that marks the start of each logical table
    pub header_keyword: String,
    /// First row of the concatenated table to keep (negative counts from the end)
    pub start_table: i64,
    /// Row after the last one to keep; unset means to the end
    pub end_table: Option<i64>,
    /// Directory the filename pattern is resolved against
    pub base_report_path: Option<PathBuf>,
    /// Glob with `{data_group}` and `{category}` placeholders
    pub filename_pattern: Option<String>,
    /// Root key of the structured document
    pub data_structure: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            header_keyword: DEFAULT_HEADER_KEYWORD.to_string(),
            start_table: 0,
            end_table: None,
            base_report_path: None,
            filename_pattern: Some(DEFAULT_FILENAME_PATTERN.to_string()),
            data_structure: DEFAULT_DATA_STRUCTURE.to_string(),
        }
    }
}

impl ExtractConfig {
    /// Load a YAML config file. Missing fields take their defaults.
    pub fn from_yaml_file(path: &Path) -> SpliceResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            SpliceError::Config(format!("Cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&text)
            .map_err(|e| SpliceError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Reject combinations that can never work
    pub fn validate(&self) -> SpliceResult<()> {
        if self.header_keyword.is_empty() {
            return Err(SpliceError::Config("header_keyword must not be empty".into()));
        }
        if self.data_structure.is_empty() {
            return Err(SpliceError::Config("data_structure must not be empty".into()));
        }
        if let Some(pattern) = &self.filename_pattern {
            check_placeholders(pattern)?;
        }
        if self.base_report_path.is_some() && self.filename_pattern.is_none() {
            return Err(SpliceError::Config(
                "base_report_path is set but filename_pattern is not".into(),
            ));
        }
        Ok(())
    }

    /// Full glob pattern for one data group and category
    pub fn input_pattern(&self, data_group: &str, category: &str) -> SpliceResult<String> {
        let (Some(base), Some(pattern)) = (&self.base_report_path, &self.filename_pattern) else {
            return Err(SpliceError::Config(
                "Base report path or filename pattern is not configured".into(),
            ));
        };

        let filename = pattern
            .replace("{data_group}", &glob::Pattern::escape(data_group))
            .replace("{category}", &glob::Pattern::escape(category));
        Ok(base.join(filename).to_string_lossy().into_owned())
    }

    /// Resolve the input workbook. The pattern must match exactly one file.
    pub fn resolve_input(&self, data_group: &str, category: &str) -> SpliceResult<PathBuf> {
        let pattern = self.input_pattern(data_group, category)?;
        let entries = glob::glob(&pattern)
            .map_err(|e| SpliceError::Config(format!("Invalid pattern {}: {}", pattern, e)))?;

        let mut matches = entries
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SpliceError::Io(e.into_error()))?;
        debug!(%pattern, matches = matches.len(), "resolved input pattern");

        match matches.len() {
            0 => Err(SpliceError::FileNotFound { pattern }),
            1 => Ok(matches.remove(0)),
            _ => Err(SpliceError::AmbiguousMatch { pattern, matches }),
        }
    }
}

fn check_placeholders(pattern: &str) -> SpliceResult<()> {
    // Pattern: {name}
    let placeholder = Regex::new(r"\{([^{}]*)\}")
        .map_err(|e| SpliceError::Config(format!("Regex error: {}", e)))?;

    for caps in placeholder.captures_iter(pattern) {
        let name = &caps[1];
        if !PLACEHOLDERS.contains(&name) {
            return Err(SpliceError::Config(format!(
                "Unknown placeholder {{{}}} in filename_pattern (expected {{data_group}} or {{category}})",
                name
            )));
        }
    }
    Ok(())
}
