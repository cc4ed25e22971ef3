//! # pmsdash-reader
//!
//! Reads a roster spreadsheet into a [`RosterTable`].
//!
//! The first worksheet is used. Its first row holds the column headers;
//! every following non-blank row is an associate record. Cells formatted as
//! dates are kept as structured dates so the column resolver can tell a real
//! date header from a label that only looks like one.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pmsdash_reader::read_roster;
//!
//! let table = read_roster("roster.xlsx".as_ref()).unwrap();
//! println!("{} columns, {} rows", table.headers.len(), table.len());
//! ```

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use pmsdash_core::{CellValue, ColumnHeader, RosterTable};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Roster reading error
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported spreadsheet format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Unreadable spreadsheet: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Workbook has no worksheets")]
    NoWorksheet,

    #[error("Worksheet is empty")]
    EmptySheet,
}

/// Supported spreadsheet formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Xlsx,
    Xls,
    Xlsb,
    Ods,
}

/// Detect the spreadsheet format from the file extension
pub fn detect_format(path: &Path) -> Option<FileFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "xlsx" | "xlsm" | "xlam" => Some(FileFormat::Xlsx),
        "xls" | "xla" => Some(FileFormat::Xls),
        "xlsb" => Some(FileFormat::Xlsb),
        "ods" => Some(FileFormat::Ods),
        _ => None,
    }
}

/// Read the first worksheet of the roster at `path`
pub fn read_roster(path: &Path) -> Result<RosterTable, ReadError> {
    if !path.exists() {
        return Err(ReadError::NotFound(path.to_path_buf()));
    }
    let format = detect_format(path).ok_or_else(|| ReadError::UnsupportedFormat(path.to_path_buf()))?;
    debug!(?format, path = %path.display(), "opening roster");

    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(0).ok_or(ReadError::NoWorksheet)??;

    let mut rows = range.rows();
    let headers: Vec<ColumnHeader> = rows
        .next()
        .ok_or(ReadError::EmptySheet)?
        .iter()
        .map(column_header)
        .collect();

    let records: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(cell_value).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(CellValue::is_blank))
        .collect();

    info!(
        path = %path.display(),
        columns = headers.len(),
        rows = records.len(),
        "read roster"
    );
    Ok(RosterTable::new(headers, records))
}

/// Convert a spreadsheet cell to a `CellValue`
pub fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or_else(|| CellValue::Number(dt.as_f64()), CellValue::Date),
        Data::DateTimeIso(s) => parse_iso(s).map_or_else(|| CellValue::Text(s.clone()), CellValue::Date),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

/// Convert a header cell to a `ColumnHeader`
pub fn column_header(data: &Data) -> ColumnHeader {
    match cell_value(data) {
        CellValue::Date(d) => ColumnHeader::Date(d),
        other => ColumnHeader::Text(other.to_string()),
    }
}

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
}
