//! CLI command handlers

pub mod commands;

pub use commands::{build_config, print_headers, run_extract, ConfigOverrides, ExtractRequest};
