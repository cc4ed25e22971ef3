//! # pmsdash-core
//!
//! Core domain model for the pmsdash roster availability reporter.
//!
//! This crate provides:
//! - Domain types: `RosterTable`, `ColumnHeader`, `CellValue`, `ReportRow`
//! - Column resolution: locating the availability column for a reporting month
//! - Value normalization: role canonicalization, availability conversion, bucketing
//! - Record projection into the sorted report schema
//! - The `Renderer` trait and error types shared by the output backends
//!
//! ## Example
//!
//! ```rust
//! use pmsdash_core::{
//!     CellValue, ColumnHeader, ColumnResolver, RecordProjector, ReportingPeriod, RosterTable,
//! };
//!
//! let headers = vec![
//!     ColumnHeader::text("Current Role"),
//!     ColumnHeader::text("Region"),
//!     ColumnHeader::text("Associate ID"),
//!     ColumnHeader::text("Associate Name"),
//!     ColumnHeader::text("Working Status"),
//!     ColumnHeader::text("31-05-2025"),
//! ];
//! let rows = vec![vec![
//!     CellValue::text("Project Mgr"),
//!     CellValue::text("EMEA"),
//!     CellValue::Number(1001.0),
//!     CellValue::text("Ada"),
//!     CellValue::text("Working"),
//!     CellValue::text("80%"),
//! ]];
//! let table = RosterTable::new(headers, rows);
//! let period = ReportingPeriod::new(2025, 5).unwrap();
//!
//! let resolution = ColumnResolver::new().resolve(&table.headers, period).unwrap();
//! let report = RecordProjector::new().project(&table, &resolution, period).unwrap();
//! assert_eq!(report.rows[0].role.as_str(), "PM");
//! ```

pub mod normalize;
pub mod project;
pub mod resolve;
pub mod summary;

pub use normalize::{bucket_of, clean_role, convert_availability};
pub use project::{RecordProjector, StatusFilter};
pub use resolve::{ColumnResolver, Resolution, ResolutionRule};
pub use summary::{GroupStat, ReportSummary};

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Cells and Headers
// ============================================================================

/// A single spreadsheet cell as read from the roster
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
    /// Spreadsheet error value such as `#N/A`
    Error(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// True for empty cells and whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Display form of the cell, `None` for blank cells.
    ///
    /// Whole numbers are printed without a fractional part so numeric
    /// identifiers read back as `1001`, not `1001.0`.
    pub fn to_label(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        Some(self.to_string())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            Self::Error(e) => write!(f, "{e}"),
        }
    }
}

/// One column header of the roster sheet.
///
/// Headers stored as real spreadsheet dates are `Date`; everything else,
/// including labels that merely look like dates (`31-05-2025`), is `Text`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ColumnHeader {
    Date(NaiveDateTime),
    Text(String),
}

impl ColumnHeader {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn date(date: NaiveDate) -> Self {
        Self::Date(date.and_time(chrono::NaiveTime::MIN))
    }

    /// Human-readable label, as shown in the manual-selection listing
    pub fn label(&self) -> String {
        match self {
            Self::Date(d) => d.format("%Y-%m-%d %H:%M:%S").to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(d.date()),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Date(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for ColumnHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

// ============================================================================
// Roster
// ============================================================================

/// The raw roster: one header row and the data rows beneath it
#[derive(Clone, Debug, Default)]
pub struct RosterTable {
    pub headers: Vec<ColumnHeader>,
    pub rows: Vec<Vec<CellValue>>,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl RosterTable {
    pub fn new(headers: Vec<ColumnHeader>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { headers, rows }
    }

    /// Cell at `(row, col)`; short rows read as empty
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Index of the first text header whose trimmed label equals `label`
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.as_text().is_some_and(|t| t.trim() == label))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One associate's record, borrowed out of a `RosterTable` row
#[derive(Clone, Debug, PartialEq)]
pub struct RosterRow<'a> {
    pub role: &'a CellValue,
    pub region: &'a CellValue,
    pub associate_id: &'a CellValue,
    pub associate_name: &'a CellValue,
    pub working_status: &'a CellValue,
    pub raw_availability: &'a CellValue,
}

// ============================================================================
// Reporting Period
// ============================================================================

/// The month a report is produced for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ReportingPeriod {
    pub year: i32,
    pub month: u32,
}

impl ReportingPeriod {
    /// Returns `None` unless `month` is in `1..=12`
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The current month on the local clock
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    /// English month name, e.g. `May`
    pub fn month_name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| chrono::Month::try_from(m).ok())
            .map_or("Unknown", |m| m.name())
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

// ============================================================================
// Report Rows
// ============================================================================

/// Associate identifier, kept in the type it had in the roster.
///
/// Numeric cells stay numbers; text such as `00123` is never reinterpreted.
#[derive(Clone, Debug, PartialEq)]
pub enum AssociateId {
    Number(f64),
    Text(String),
}

impl AssociateId {
    /// Identifier of a roster cell; blank and non-numeric cells become text
    pub fn from_cell(cell: &CellValue) -> Self {
        match cell {
            CellValue::Number(n) if n.is_finite() => Self::Number(*n),
            other => Self::Text(other.to_label().unwrap_or_default()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl Default for AssociateId {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for AssociateId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<u32> for AssociateId {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl fmt::Display for AssociateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", CellValue::Number(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for AssociateId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => serializer.serialize_i64(*n as i64),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Canonical role label
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Pm,
    Pgm,
    TpdlRole,
    ScrumMaster,
    Undefined,
    /// Unrecognized role, uppercased and trimmed
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pm => "PM",
            Self::Pgm => "PGM",
            Self::TpdlRole => "TPDL ROLE",
            Self::ScrumMaster => "SCRUM MASTER",
            Self::Undefined => "UNDEFINED",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Coarse availability range
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AvailabilityBucket {
    UpTo25,
    From26To50,
    From51To75,
    From76To100,
}

impl AvailabilityBucket {
    /// All buckets, lowest range first
    pub const ALL: [AvailabilityBucket; 4] = [
        Self::UpTo25,
        Self::From26To50,
        Self::From51To75,
        Self::From76To100,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::UpTo25 => "0–25%",
            Self::From26To50 => "26–50%",
            Self::From51To75 => "51–75%",
            Self::From76To100 => "76–100%",
        }
    }

    /// Parse a bucket back from its label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.label() == label)
    }
}

impl fmt::Display for AvailabilityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for AvailabilityBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One line of the availability report, in output column order
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportRow {
    pub role: Role,
    pub region: String,
    pub availability_bucket: AvailabilityBucket,
    pub associate_id: AssociateId,
    pub associate_name: String,
    pub availability_percent: f64,
}

/// The projected, sorted report for one reporting period
#[derive(Clone, Debug, Serialize)]
pub struct AvailabilityReport {
    pub period: ReportingPeriod,
    /// Column the availability values were taken from
    pub source: Resolution,
    /// Rows sorted by availability, highest first
    pub rows: Vec<ReportRow>,
    /// Data rows in the roster before filtering
    pub rows_read: usize,
    /// Rows dropped by the working-status filter
    pub rows_excluded: usize,
}

impl AvailabilityReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render an availability report to the output format
    fn render(&self, report: &AvailabilityReport) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Problems with the shape of the input roster
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Roster has no header row")]
    NoHeaders,
}

/// Column resolution failure
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No rule matched; the caller must choose a column index explicitly
    #[error("Could not identify the availability column among {} headers", headers.len())]
    Ambiguous { headers: Vec<String> },

    #[error("Column index {index} is out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
