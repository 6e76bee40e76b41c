//! Table and document encodings (JSON, YAML, CSV) and format detection

use crate::error::{SpliceError, SpliceResult};
use crate::types::Table;
use serde_yaml::Value;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Encoding of an output file or preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Csv,
}

/// Encodings a structured document can be stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    /// `None` for CSV, which can only hold a flat table
    pub fn document_format(self) -> Option<DocumentFormat> {
        match self {
            OutputFormat::Json => Some(DocumentFormat::Json),
            OutputFormat::Yaml => Some(DocumentFormat::Yaml),
            OutputFormat::Csv => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Csv => "csv",
        }
    }
}

impl From<DocumentFormat> for OutputFormat {
    fn from(format: DocumentFormat) -> Self {
        match format {
            DocumentFormat::Json => OutputFormat::Json,
            DocumentFormat::Yaml => OutputFormat::Yaml,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        OutputFormat::from(*self).fmt(f)
    }
}

//==============================================================================
// Detection
//==============================================================================

/// Detect the format of an existing file from its first line only
pub fn detect_format(path: &Path) -> SpliceResult<OutputFormat> {
    let mut first_line = String::new();
    let mut reader = BufReader::new(File::open(path)?);
    match reader.read_line(&mut first_line) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            return Err(SpliceError::EmptyOrCorruptFile(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    }
    detect_content(&first_line, path)
}

/// Detect the format of in-memory content. `origin` only names the source
/// in errors.
pub fn detect_content(content: &str, origin: &Path) -> SpliceResult<OutputFormat> {
    let first_line = content
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches('\u{feff}')
        .trim();

    if first_line.is_empty() {
        return Err(SpliceError::EmptyOrCorruptFile(origin.to_path_buf()));
    }

    if first_line.starts_with('{') {
        Ok(OutputFormat::Json)
    } else if first_line.starts_with("---") {
        Ok(OutputFormat::Yaml)
    } else if first_line.contains(',') || first_line.to_lowercase().starts_with("sep=") {
        Ok(OutputFormat::Csv)
    } else {
        Err(SpliceError::UnknownFormat(origin.to_path_buf()))
    }
}

//==============================================================================
// Tables
//==============================================================================

/// Encode a table as a sequence of row-mappings (JSON/YAML) or as CSV with
/// a header row and no index column.
pub fn encode_table(table: &Table, format: OutputFormat) -> SpliceResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(table)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(table)?),
        OutputFormat::Csv => encode_csv(table),
    }
}

fn encode_csv(table: &Table) -> SpliceResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if !table.columns.is_empty() {
        writer.write_record(&table.columns)?;
        for row in &table.rows {
            writer.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| SpliceError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| SpliceError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Decode a JSON or YAML sequence of row-mappings back into a table
pub fn decode_table(text: &str, format: DocumentFormat) -> SpliceResult<Table> {
    match format {
        DocumentFormat::Json => Ok(serde_json::from_str(text)?),
        DocumentFormat::Yaml => Ok(serde_yaml::from_str(text)?),
    }
}

//==============================================================================
// Documents
//==============================================================================

/// Parse a structured document into an order-preserving generic value
pub fn decode_document(text: &str, format: DocumentFormat, origin: &Path) -> SpliceResult<Value> {
    let parsed = match format {
        DocumentFormat::Json => serde_json::from_str::<Value>(text).map_err(|e| e.to_string()),
        DocumentFormat::Yaml => serde_yaml::from_str::<Value>(text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| SpliceError::DocumentParse {
        path: origin.to_path_buf(),
        message,
    })
}

/// Encode a whole document. JSON is pretty-printed with 2-space indent; YAML
/// is block style and starts with `---` so it is detected as YAML again.
pub fn encode_document(document: &Value, format: DocumentFormat) -> SpliceResult<String> {
    let mut out = match format {
        DocumentFormat::Json => serde_json::to_string_pretty(document)?,
        DocumentFormat::Yaml => format!("---\n{}", serde_yaml::to_string(document)?),
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}
