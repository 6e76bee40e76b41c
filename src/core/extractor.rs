//! Marker-based table splitting
//!
//! A report sheet holds several logical tables back-to-back. Each one is
//! introduced by a marker row whose column 0 holds the header keyword. The
//! extractor finds those rows, cuts the sheet into segments, tags every
//! segment row with its marker, concatenates the segments and applies the
//! configured row slice.

use crate::config::ExtractConfig;
use crate::error::{SpliceError, SpliceResult};
use crate::types::{Cell, RawSheet, Table};
use std::ops::Range;
use tracing::{debug, warn};

/// One logical table inside a sheet
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Column-0 value of the marker row
    pub label: Cell,
    /// Sheet row index of the marker row
    pub marker_row: usize,
    /// Sheet rows belonging to this segment (marker row excluded)
    pub rows: Range<usize>,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Splits a RawSheet into logical tables and concatenates them
#[derive(Debug, Clone)]
pub struct TableExtractor {
    marker: String,
    start_table: i64,
    end_table: Option<i64>,
}

impl TableExtractor {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            start_table: 0,
            end_table: None,
        }
    }

    pub fn from_config(config: &ExtractConfig) -> Self {
        Self::new(config.header_keyword.clone()).with_slice(config.start_table, config.end_table)
    }

    /// Half-open row slice applied after concatenation
    pub fn with_slice(mut self, start_table: i64, end_table: Option<i64>) -> Self {
        self.start_table = start_table;
        self.end_table = end_table;
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Row indices whose column 0 equals the marker, ascending
    pub fn find_markers(&self, sheet: &RawSheet) -> Vec<usize> {
        sheet
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| row.first().and_then(Cell::as_str) == Some(self.marker.as_str()))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Cut the sheet at every marker row
    pub fn split_segments(&self, sheet: &RawSheet) -> SpliceResult<Vec<Segment>> {
        let markers = self.find_markers(sheet);
        if markers.is_empty() {
            return Err(SpliceError::NoMarkersFound {
                marker: self.marker.clone(),
                source_name: sheet.source.clone(),
            });
        }

        let total = sheet.rows().len();
        let segments = markers
            .iter()
            .enumerate()
            .map(|(i, &marker_row)| {
                let end = markers.get(i + 1).copied().unwrap_or(total);
                Segment {
                    label: sheet.rows()[marker_row][0].clone(),
                    marker_row,
                    rows: marker_row + 1..end,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            marker = %self.marker,
            segments = segments.len(),
            sizes = ?segments.iter().map(Segment::len).collect::<Vec<_>>(),
            "split sheet into segments"
        );
        Ok(segments)
    }

    /// Extract the concatenated, tagged and sliced table
    pub fn extract(&self, sheet: &RawSheet) -> SpliceResult<Table> {
        let segments = self.split_segments(sheet)?;

        let mut rows: Vec<Vec<Cell>> = Vec::new();
        for segment in &segments {
            for row in &sheet.rows()[segment.rows.clone()] {
                let mut row = row.clone();
                // Column 0 carries the segment tag
                match row.first_mut() {
                    Some(tag) => *tag = segment.label.clone(),
                    None => row.push(segment.label.clone()),
                }
                rows.push(row);
            }
        }

        let window = slice_bounds(rows.len(), self.start_table, self.end_table);
        debug!(
            concatenated = rows.len(),
            start = window.start,
            end = window.end,
            "applied row slice"
        );

        if window.is_empty() && !rows.is_empty() {
            warn!(
                start = self.start_table,
                end = ?self.end_table,
                available = rows.len(),
                "row slice selects no rows"
            );
        }

        let rows = rows.drain(window).collect();
        Ok(Table {
            columns: sheet.columns().to_vec(),
            rows,
        })
    }
}

/// Resolve `[start, end)` against a sequence of `len` items. Negative bounds
/// count from the end; everything is clipped to `0..len`; an inverted window
/// is empty.
pub fn slice_bounds(len: usize, start: i64, end: Option<i64>) -> Range<usize> {
    let len_i = len as i64;
    let clip = |idx: i64| -> usize {
        let idx = if idx < 0 { idx + len_i } else { idx };
        idx.clamp(0, len_i) as usize
    };

    let start = clip(start);
    let end = end.map(clip).unwrap_or(len);
    if start >= end {
        start..start
    } else {
        start..end
    }
}
