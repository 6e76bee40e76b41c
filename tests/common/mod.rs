//! Shared fixtures: report workbooks written with rust_xlsxwriter

#![allow(dead_code)]

use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};

pub const MARKER: &str = "HEADER_KEYWORD_TEXT";

/// A cell written into a fixture sheet
#[derive(Debug, Clone)]
pub enum Fx {
    Blank,
    Str(&'static str),
    Num(f64),
}

/// Write one worksheet, row by row, starting at A1
pub fn write_workbook(path: &Path, rows: &[Vec<Fx>]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            match cell {
                Fx::Blank => {}
                Fx::Str(s) => {
                    worksheet.write_string(r as u32, c as u16, *s).unwrap();
                }
                Fx::Num(n) => {
                    worksheet.write_number(r as u32, c as u16, *n).unwrap();
                }
            }
        }
    }

    workbook.save(path).unwrap();
}

/// Two logical tables of two rows each:
///
/// | kind   | DOG   | SIZE |
/// |--------|-------|------|
/// | MARKER |       |      |
/// |        | DOG_t | 25   |
/// |        | DOG_s | 10   |
/// | MARKER |       |      |
/// |        | DOG_t | 30   |
/// |        | DOG_x | 25.5 |
pub fn report_rows() -> Vec<Vec<Fx>> {
    use Fx::*;
    vec![
        vec![Str("kind"), Str("DOG"), Str("SIZE")],
        vec![Str(MARKER)],
        vec![Blank, Str("DOG_t"), Num(25.0)],
        vec![Blank, Str("DOG_s"), Num(10.0)],
        vec![Str(MARKER)],
        vec![Blank, Str("DOG_t"), Num(30.0)],
        vec![Blank, Str("DOG_x"), Num(25.5)],
    ]
}

/// Write the standard report into `dir` and return its path
pub fn write_report(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    write_workbook(&path, &report_rows());
    path
}
