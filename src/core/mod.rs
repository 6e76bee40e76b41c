//! Table extraction and filtering

pub mod extractor;
pub mod query;

pub use extractor::{slice_bounds, Segment, TableExtractor};
pub use query::{filter_table, Predicate, QueryFilter};
