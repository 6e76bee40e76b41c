//! Read-merge-write of the structured document
//!
//! Layout: `root_key → data_group → category → [row, ...]`. Every update
//! touches exactly one `(data_group, category)` leaf and rewrites the whole
//! file in the format it was found in.
//!
//! The read and the write are separate steps with no lock held in between,
//! so two processes updating the same file can lose one update. The write
//! itself goes through a temporary file and a rename, so an interrupted run
//! never leaves a truncated document behind.

use super::format::{decode_document, detect_format, encode_document, DocumentFormat};
use crate::error::{SpliceError, SpliceResult};
use crate::types::Table;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What a merge did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Encoding the document was written in
    pub format: DocumentFormat,
    /// True when the file did not exist before
    pub created: bool,
}

/// Structured document stored at one path
#[derive(Debug, Clone)]
pub struct MergeStore {
    path: PathBuf,
    root_key: String,
}

impl MergeStore {
    pub fn new(path: impl Into<PathBuf>, root_key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            root_key: root_key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store `table` at `root_key → data_group → category`, keeping every
    /// other entry of an existing document.
    pub fn merge(&self, table: &Table, data_group: &str, category: &str) -> SpliceResult<MergeOutcome> {
        let leaf = serde_yaml::to_value(table)?;

        let (mut document, format, created) = if self.path.exists() {
            let (document, format) = self.load()?;
            (document, format, false)
        } else {
            (Value::Mapping(Mapping::new()), DocumentFormat::Json, true)
        };

        insert_leaf(&mut document, &self.root_key, data_group, category, leaf).map_err(
            |message| SpliceError::DocumentParse {
                path: self.path.clone(),
                message,
            },
        )?;

        let encoded = encode_document(&document, format)?;
        write_atomic(&self.path, &encoded)?;

        info!(
            path = %self.path.display(),
            %format,
            created,
            data_group,
            category,
            rows = table.row_count(),
            "document updated"
        );
        Ok(MergeOutcome { format, created })
    }

    /// Read and parse the existing document
    fn load(&self) -> SpliceResult<(Value, DocumentFormat)> {
        let detected = detect_format(&self.path)?;
        let format = detected
            .document_format()
            .ok_or_else(|| SpliceError::UnsupportedIncrementalUpdate(self.path.clone()))?;
        debug!(path = %self.path.display(), %format, "loading existing document");

        let text = fs::read_to_string(&self.path).map_err(|e| SpliceError::DocumentParse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        let document = decode_document(&text, format, &self.path)?;
        Ok((document, format))
    }
}

/// Set `document[root][group][category] = leaf`, creating missing levels.
/// A null level counts as empty; any other non-mapping value is an error.
fn insert_leaf(
    document: &mut Value,
    root_key: &str,
    data_group: &str,
    category: &str,
    leaf: Value,
) -> Result<(), String> {
    let top = as_mapping(document, "document")?;
    let root = child_mapping(top, root_key)?;
    let group = child_mapping(root, data_group)?;
    group.insert(Value::String(category.to_string()), leaf);
    Ok(())
}

fn child_mapping<'a>(parent: &'a mut Mapping, key: &str) -> Result<&'a mut Mapping, String> {
    let entry = parent
        .entry(Value::String(key.to_string()))
        .or_insert(Value::Null);
    as_mapping(entry, key)
}

fn as_mapping<'a>(value: &'a mut Value, name: &str) -> Result<&'a mut Mapping, String> {
    if value.is_null() {
        *value = Value::Mapping(Mapping::new());
    }
    match value {
        Value::Mapping(map) => Ok(map),
        other => Err(format!(
            "'{}' is {}, expected a mapping",
            name,
            kind(other)
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Replace `path` with `contents` via a temporary file in the same
/// directory. An existing file keeps its permissions; a new one gets the
/// mode a plain create would give it under the current umask.
fn write_atomic(path: &Path, contents: &str) -> SpliceResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let existing = fs::metadata(path).ok().map(|meta| meta.permissions());

    let mut builder = tempfile::Builder::new();
    builder.prefix(".tablesplice");
    if existing.is_none() {
        if let Some(mode) = new_file_permissions() {
            builder.permissions(mode);
        }
    }

    let mut tmp = builder.tempfile_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;

    if let Some(permissions) = existing {
        fs::set_permissions(tmp.path(), permissions)?;
    }

    tmp.persist(path).map_err(|e| SpliceError::Io(e.error))?;
    Ok(())
}

/// `0o666`, narrowed by the umask when the file is opened
#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}
