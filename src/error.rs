use std::path::PathBuf;
use thiserror::Error;

pub type SpliceResult<T> = Result<T, SpliceError>;

#[derive(Error, Debug)]
pub enum SpliceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No files found matching {pattern}")]
    FileNotFound { pattern: String },

    #[error("Multiple files found for {pattern}: {}", join_paths(.matches))]
    AmbiguousMatch {
        pattern: String,
        matches: Vec<PathBuf>,
    },

    #[error("Failed to load sheet from {}: {message}", .path.display())]
    Load { path: PathBuf, message: String },

    #[error("No '{marker}' headers found in {source_name}")]
    NoMarkersFound { marker: String, source_name: String },

    #[error("Column '{column}' not found (available: {})", .available.join(", "))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("Invalid expression '{expression}': {message}")]
    Expression { expression: String, message: String },

    #[error("File {} is empty or corrupted", .0.display())]
    EmptyOrCorruptFile(PathBuf),

    #[error("Unknown file format: {}", .0.display())]
    UnknownFormat(PathBuf),

    #[error("Cannot update CSV files incrementally: {}", .0.display())]
    UnsupportedIncrementalUpdate(PathBuf),

    #[error("Error reading or parsing {}: {message}", .path.display())]
    DocumentParse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML encoding error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV encoding error: {0}")]
    Csv(#[from] csv::Error),
}

impl SpliceError {
    /// Process exit code for this failure category.
    pub fn exit_code(&self) -> u8 {
        match self {
            SpliceError::Config(_) => 2,
            SpliceError::FileNotFound { .. } | SpliceError::AmbiguousMatch { .. } => 3,
            SpliceError::Load { .. } | SpliceError::NoMarkersFound { .. } => 4,
            SpliceError::ColumnNotFound { .. } | SpliceError::Expression { .. } => 5,
            SpliceError::EmptyOrCorruptFile(_)
            | SpliceError::UnknownFormat(_)
            | SpliceError::DocumentParse { .. } => 6,
            SpliceError::UnsupportedIncrementalUpdate(_) => 7,
            SpliceError::Io(_)
            | SpliceError::Json(_)
            | SpliceError::Yaml(_)
            | SpliceError::Csv(_) => 8,
        }
    }

    pub(crate) fn expression(expression: &str, message: impl Into<String>) -> Self {
        SpliceError::Expression {
            expression: expression.to_string(),
            message: message.into(),
        }
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
