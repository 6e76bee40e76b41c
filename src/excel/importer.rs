//! Sheet importer implementation - first worksheet (.xlsx/.xls/.ods) → RawSheet

use crate::error::{SpliceError, SpliceResult};
use crate::types::{Cell, RawSheet};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads the first worksheet of a workbook. Row 0 is the header; every
/// other row (marker rows included) is returned as data.
pub struct SheetImporter {
    path: PathBuf,
}

impl SheetImporter {
    /// Create a new sheet importer
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Import the first worksheet
    pub fn import(&self) -> SpliceResult<RawSheet> {
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| self.load_error(e))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| self.load_error("workbook has no worksheets"))?
            .map_err(|e| self.load_error(e))?;

        let sheet = Self::from_range(self.path.display().to_string(), &range);
        debug!(
            path = %self.path.display(),
            columns = sheet.columns().len(),
            rows = sheet.rows().len(),
            "loaded worksheet"
        );
        Ok(sheet)
    }

    /// Convert a cell range into a RawSheet. Cells left of the used range are
    /// filled with nulls so column 0 is always sheet column A.
    pub fn from_range(source: impl Into<String>, range: &Range<Data>) -> RawSheet {
        let left_pad = range.start().map(|(_, col)| col as usize).unwrap_or(0);

        let mut rows = range.rows().map(|row| {
            let mut cells = vec![Cell::Null; left_pad];
            cells.extend(row.iter().map(convert_cell));
            cells
        });

        let header = rows.next().unwrap_or_default();
        let columns = column_names(&header);
        RawSheet::new(source, columns, rows.collect())
    }

    fn load_error(&self, message: impl ToString) -> SpliceError {
        SpliceError::Load {
            path: self.path.clone(),
            message: message.to_string(),
        }
    }
}

/// Convert a calamine cell to a Cell. Whole-number floats become ints since
/// spreadsheets store every number as a float.
fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Null,
        Data::Bool(b) => Cell::Bool(*b),
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Cell::Int(*f as i64),
        Data::Float(f) => Cell::Float(*f),
        Data::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}

/// Header cells to column names: blanks become `Unnamed: N`, repeats get a
/// `.N` suffix.
fn column_names(header: &[Cell]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(header.len());
    for (idx, cell) in header.iter().enumerate() {
        let base = match cell {
            Cell::Null => format!("Unnamed: {}", idx),
            Cell::Text(s) if s.trim().is_empty() => format!("Unnamed: {}", idx),
            other => other.to_string(),
        };

        let mut name = base.clone();
        let mut dup = 1;
        while names.contains(&name) {
            name = format!("{}.{}", base, dup);
            dup += 1;
        }
        names.push(name);
    }
    names
}
