//! Output encodings and the persisted structured document

pub mod format;
pub mod store;

pub use format::{
    decode_document, decode_table, detect_content, detect_format, encode_document, encode_table,
    DocumentFormat, OutputFormat,
};
pub use store::{MergeOutcome, MergeStore};
