//! Spreadsheet import
//!
//! Reads the first worksheet of an Excel/OpenDocument workbook into a
//! [`RawSheet`](crate::types::RawSheet).

mod importer;

pub use importer::SheetImporter;
