//! Tablesplice - marker-delimited spreadsheet report extraction
//!
//! A report sheet holds several logical tables back-to-back, each one
//! introduced by a marker row (column 0 equals a header keyword). This
//! library cuts such a sheet into its tables, concatenates and filters them,
//! and merges the result into a nested JSON/YAML document that accumulates
//! data across runs.
//!
//! # Pipeline
//!
//! - [`excel::SheetImporter`] reads the first worksheet into a [`RawSheet`]
//! - [`core::TableExtractor`] splits it at marker rows and slices the rows
//! - [`core::QueryFilter`] applies `--where` and `--select`
//! - [`writer::MergeStore`] updates `root → data_group → category`
//!
//! # Example
//!
//! ```no_run
//! use tablesplice::core::{QueryFilter, TableExtractor};
//! use tablesplice::excel::SheetImporter;
//! use tablesplice::writer::MergeStore;
//!
//! let sheet = SheetImporter::new("report.xlsx").import()?;
//! let table = TableExtractor::new("HEADER_KEYWORD_TEXT").extract(&sheet)?;
//! let filtered = QueryFilter::new(Some("DOG,SIZE"), Some("SIZE >= 25"))?.apply(&table)?;
//!
//! MergeStore::new("data.json", "DATA_GROUP_COLLECTION").merge(&filtered, "G", "C")?;
//! # Ok::<(), tablesplice::error::SpliceError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use config::ExtractConfig;
pub use error::{SpliceError, SpliceResult};
pub use types::{Cell, RawSheet, Record, Table};
