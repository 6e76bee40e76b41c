use crate::config::ExtractConfig;
use crate::core::{QueryFilter, TableExtractor};
use crate::error::{SpliceError, SpliceResult};
use crate::excel::SheetImporter;
use crate::types::Table;
use crate::writer::{detect_format, encode_table, MergeOutcome, MergeStore};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Command-line values that override the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub header_keyword: Option<String>,
    pub start_table: Option<i64>,
    pub end_table: Option<i64>,
    pub base_report_path: Option<PathBuf>,
    pub filename_pattern: Option<String>,
    pub data_structure: Option<String>,
}

/// Build the run configuration: defaults, then the optional config file,
/// then command-line overrides. Validated before anything is read.
pub fn build_config(
    config_file: Option<&Path>,
    overrides: ConfigOverrides,
) -> SpliceResult<ExtractConfig> {
    let mut config = match config_file {
        Some(path) => ExtractConfig::from_yaml_file(path)?,
        None => ExtractConfig::default(),
    };

    if let Some(v) = overrides.header_keyword {
        config.header_keyword = v;
    }
    if let Some(v) = overrides.start_table {
        config.start_table = v;
    }
    if overrides.end_table.is_some() {
        config.end_table = overrides.end_table;
    }
    if overrides.base_report_path.is_some() {
        config.base_report_path = overrides.base_report_path;
    }
    if overrides.filename_pattern.is_some() {
        config.filename_pattern = overrides.filename_pattern;
    }
    if let Some(v) = overrides.data_structure {
        config.data_structure = v;
    }

    config.validate()?;
    Ok(config)
}

/// One extraction request
#[derive(Debug, Clone, Default)]
pub struct ExtractRequest {
    /// Workbook path; when absent it is resolved from the config pattern
    pub input: Option<PathBuf>,
    pub data_group: Option<String>,
    pub category: Option<String>,
    pub select: Option<String>,
    pub where_clause: Option<String>,
    pub output: Option<PathBuf>,
}

impl ExtractRequest {
    /// Data group and category, both required to address a document leaf
    fn address(&self) -> SpliceResult<(&str, &str)> {
        match (self.data_group.as_deref(), self.category.as_deref()) {
            (Some(group), Some(category)) => Ok((group, category)),
            _ => Err(SpliceError::Config(
                "--data_group and --category are required".into(),
            )),
        }
    }
}

/// Result of a completed extraction
#[derive(Debug, Clone)]
pub struct ExtractReport {
    pub table: Table,
    pub outcome: MergeOutcome,
    /// The table re-encoded in the document's format
    pub preview: String,
}

/// Locate the input workbook
pub fn resolve_input(config: &ExtractConfig, request: &ExtractRequest) -> SpliceResult<PathBuf> {
    match &request.input {
        Some(path) => Ok(path.clone()),
        None => {
            let (group, category) = request.address()?;
            config.resolve_input(group, category)
        }
    }
}

/// Load the workbook and extract the concatenated table
pub fn load_table(config: &ExtractConfig, input: &Path) -> SpliceResult<Table> {
    let sheet = SheetImporter::new(input).import()?;
    let table = TableExtractor::from_config(config).extract(&sheet)?;
    info!(
        input = %input.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "extracted table"
    );
    Ok(table)
}

/// Column names of the extracted table
pub fn headers(config: &ExtractConfig, request: &ExtractRequest) -> SpliceResult<Vec<String>> {
    let input = resolve_input(config, request)?;
    Ok(load_table(config, &input)?.columns)
}

/// Extract, filter, merge into the output document, and re-encode the
/// filtered table in the document's format.
pub fn extract(config: &ExtractConfig, request: &ExtractRequest) -> SpliceResult<ExtractReport> {
    let output = request.output.as_deref().ok_or_else(|| {
        SpliceError::Config("--output is required unless --show_headers is used".into())
    })?;
    let (group, category) = request.address()?;
    let filter = QueryFilter::new(request.select.as_deref(), request.where_clause.as_deref())?;

    let input = resolve_input(config, request)?;
    let table = filter.apply(&load_table(config, &input)?)?;

    let outcome = MergeStore::new(output, &config.data_structure).merge(&table, group, category)?;

    let format = detect_format(output)?;
    let preview = encode_table(&table, format)?;

    Ok(ExtractReport {
        table,
        outcome,
        preview,
    })
}

/// Execute the show-headers command
pub fn print_headers(config: &ExtractConfig, request: &ExtractRequest) -> SpliceResult<()> {
    let columns = headers(config, request)?;
    println!("{}", "Available Headers:".bold().green());
    for column in columns {
        println!("{}", column);
    }
    Ok(())
}

/// Execute the extract command
pub fn run_extract(config: &ExtractConfig, request: &ExtractRequest) -> SpliceResult<()> {
    let report = extract(config, request)?;
    println!("{}", report.preview.trim_end());
    Ok(())
}
