//! Projection of roster rows into the report schema.

use crate::normalize::{bucket_of, clean_role, convert_availability};
use crate::{
    AssociateId, AvailabilityReport, CellValue, InputError, ReportRow, ReportingPeriod, Resolution, RosterRow,
    RosterTable,
};
use tracing::{debug, info};

pub const COL_ROLE: &str = "Current Role";
pub const COL_REGION: &str = "Region";
pub const COL_ASSOCIATE_ID: &str = "Associate ID";
pub const COL_ASSOCIATE_NAME: &str = "Associate Name";
pub const COL_WORKING_STATUS: &str = "Working Status";

/// Columns every roster must carry, besides the availability column
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COL_ROLE,
    COL_REGION,
    COL_ASSOCIATE_ID,
    COL_ASSOCIATE_NAME,
    COL_WORKING_STATUS,
];

/// Working statuses that keep a row in the report.
///
/// Matching is exact and case-sensitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusFilter {
    pub accepted: Vec<String>,
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self {
            accepted: vec!["Working".into()],
        }
    }
}

impl StatusFilter {
    /// Also accept `status`
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        let status = status.into();
        if !self.accepted.contains(&status) {
            self.accepted.push(status);
        }
        self
    }

    pub fn accepts(&self, status: &CellValue) -> bool {
        match status {
            CellValue::Text(s) => self.accepted.iter().any(|a| a == s),
            _ => false,
        }
    }
}

/// Column positions of the required fields
#[derive(Clone, Copy, Debug)]
struct ColumnMap {
    role: usize,
    region: usize,
    associate_id: usize,
    associate_name: usize,
    working_status: usize,
}

impl ColumnMap {
    fn locate(table: &RosterTable) -> Result<Self, InputError> {
        let find = |label: &str| {
            table
                .column_index(label)
                .ok_or_else(|| InputError::MissingColumn(label.to_string()))
        };
        Ok(Self {
            role: find(COL_ROLE)?,
            region: find(COL_REGION)?,
            associate_id: find(COL_ASSOCIATE_ID)?,
            associate_name: find(COL_ASSOCIATE_NAME)?,
            working_status: find(COL_WORKING_STATUS)?,
        })
    }
}

/// Builds the sorted report rows from a roster
#[derive(Clone, Debug, Default)]
pub struct RecordProjector {
    pub status_filter: StatusFilter,
}

impl RecordProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status_filter(mut self, filter: StatusFilter) -> Self {
        self.status_filter = filter;
        self
    }

    /// Borrow row `row` of `table` as a `RosterRow`
    fn roster_row<'a>(
        table: &'a RosterTable,
        columns: ColumnMap,
        availability: usize,
        row: usize,
    ) -> RosterRow<'a> {
        RosterRow {
            role: table.cell(row, columns.role),
            region: table.cell(row, columns.region),
            associate_id: table.cell(row, columns.associate_id),
            associate_name: table.cell(row, columns.associate_name),
            working_status: table.cell(row, columns.working_status),
            raw_availability: table.cell(row, availability),
        }
    }

    fn report_row(row: &RosterRow<'_>) -> ReportRow {
        let availability_percent = convert_availability(row.raw_availability);
        ReportRow {
            role: clean_role(row.role),
            region: row.region.to_label().unwrap_or_default(),
            availability_bucket: bucket_of(availability_percent),
            associate_id: AssociateId::from_cell(row.associate_id),
            associate_name: row.associate_name.to_label().unwrap_or_default(),
            availability_percent,
        }
    }

    /// Filter, normalize and sort the roster into an `AvailabilityReport`.
    ///
    /// Rows come out ordered by availability, highest first; rows with equal
    /// availability keep their roster order.
    pub fn project(
        &self,
        table: &RosterTable,
        resolution: &Resolution,
        period: ReportingPeriod,
    ) -> Result<AvailabilityReport, InputError> {
        if table.headers.is_empty() {
            return Err(InputError::NoHeaders);
        }
        let columns = ColumnMap::locate(table)?;
        debug!(?columns, availability = resolution.index, "located roster columns");

        let mut rows: Vec<ReportRow> = (0..table.len())
            .map(|i| Self::roster_row(table, columns, resolution.index, i))
            .filter(|r| self.status_filter.accepts(r.working_status))
            .map(|r| Self::report_row(&r))
            .collect();

        rows.sort_by(|a, b| b.availability_percent.total_cmp(&a.availability_percent));

        let rows_excluded = table.len() - rows.len();
        info!(
            kept = rows.len(),
            excluded = rows_excluded,
            column = %resolution.header,
            "projected roster for {period}"
        );

        Ok(AvailabilityReport {
            period,
            source: resolution.clone(),
            rows,
            rows_read: table.len(),
            rows_excluded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AvailabilityBucket, ColumnHeader, ColumnResolver, Role};
    use pretty_assertions::assert_eq;

    fn headers() -> Vec<ColumnHeader> {
        [
            "Current Role",
            "Region",
            "Associate ID",
            "Associate Name",
            "Working Status",
            "30-04-2025",
            "31-05-2025",
        ]
        .iter()
        .map(|h| ColumnHeader::text(*h))
        .collect()
    }

    fn row(role: &str, name: &str, status: &str, april: CellValue, may: CellValue) -> Vec<CellValue> {
        vec![
            CellValue::text(role),
            CellValue::text("APAC"),
            CellValue::Number(1000.0 + name.len() as f64),
            CellValue::text(name),
            CellValue::text(status),
            april,
            may,
        ]
    }

    fn period() -> ReportingPeriod {
        ReportingPeriod::new(2025, 5).unwrap()
    }

    fn project(table: &RosterTable) -> AvailabilityReport {
        let resolution = ColumnResolver::new().resolve(&table.headers, period()).unwrap();
        RecordProjector::new().project(table, &resolution, period()).unwrap()
    }

    #[test]
    fn keeps_only_working_rows() {
        let table = RosterTable::new(
            headers(),
            vec![
                row("PGM", "Ana", "Working", CellValue::Empty, CellValue::text("50%")),
                row("PGM", "Bo", "On Leave", CellValue::Empty, CellValue::text("90%")),
                row("PGM", "Cy", "working", CellValue::Empty, CellValue::text("90%")),
                row("PGM", "Di", "Working ", CellValue::Empty, CellValue::text("90%")),
            ],
        );
        let report = project(&table);
        let names: Vec<_> = report.rows.iter().map(|r| r.associate_name.as_str()).collect();
        assert_eq!(names, vec!["Ana"]);
        assert_eq!(report.rows_read, 4);
        assert_eq!(report.rows_excluded, 3);
    }

    #[test]
    fn sorts_descending_by_availability() {
        let table = RosterTable::new(
            headers(),
            vec![
                row("PM", "Low", "Working", CellValue::Empty, CellValue::Number(20.0)),
                row("PM", "High", "Working", CellValue::Empty, CellValue::Number(0.9)),
                row("PM", "Mid", "Working", CellValue::Empty, CellValue::text("55%")),
            ],
        );
        let report = project(&table);
        let pct: Vec<f64> = report.rows.iter().map(|r| r.availability_percent).collect();
        assert_eq!(pct, vec![90.0, 55.0, 20.0]);
    }

    #[test]
    fn ties_keep_input_order() {
        let table = RosterTable::new(
            headers(),
            vec![
                row("PM", "First", "Working", CellValue::Empty, CellValue::Number(40.0)),
                row("PM", "Top", "Working", CellValue::Empty, CellValue::Number(80.0)),
                row("PM", "Second", "Working", CellValue::Empty, CellValue::text("40")),
                row("PM", "Third", "Working", CellValue::Empty, CellValue::Number(0.4)),
            ],
        );
        let report = project(&table);
        let names: Vec<_> = report.rows.iter().map(|r| r.associate_name.as_str()).collect();
        assert_eq!(names, vec!["Top", "First", "Second", "Third"]);
    }

    #[test]
    fn negative_zero_ties_with_zero() {
        let table = RosterTable::new(
            headers(),
            vec![
                row("PM", "First", "Working", CellValue::Empty, CellValue::text("0%")),
                row("PM", "Second", "Working", CellValue::Empty, CellValue::text("-0%")),
                row("PM", "Third", "Working", CellValue::Empty, CellValue::Number(-0.0)),
            ],
        );
        let report = project(&table);
        let names: Vec<_> = report.rows.iter().map(|r| r.associate_name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn text_ids_are_kept_verbatim() {
        let mut roster_row = row("PM", "Ana", "Working", CellValue::Empty, CellValue::Number(50.0));
        roster_row[2] = CellValue::text("00123");
        let table = RosterTable::new(headers(), vec![roster_row]);
        let report = project(&table);
        assert_eq!(report.rows[0].associate_id, AssociateId::from("00123"));
        assert_eq!(report.rows[0].associate_id.to_string(), "00123");
    }

    #[test]
    fn reads_the_resolved_column_and_normalizes_fields() {
        let table = RosterTable::new(
            headers(),
            vec![row(
                "project mgr",
                "Ana",
                "Working",
                CellValue::Number(0.1),
                CellValue::Number(0.8),
            )],
        );
        let report = project(&table);
        assert_eq!(report.source.header.label(), "31-05-2025");
        assert_eq!(
            report.rows[0],
            ReportRow {
                role: Role::Pm,
                region: "APAC".into(),
                availability_bucket: AvailabilityBucket::From76To100,
                associate_id: AssociateId::Number(1003.0),
                associate_name: "Ana".into(),
                availability_percent: 80.0,
            }
        );
    }

    #[test]
    fn bucket_agrees_with_percent() {
        let values = [
            CellValue::text("12%"),
            CellValue::Number(0.26),
            CellValue::Number(51.0),
            CellValue::text("N/A"),
            CellValue::Empty,
            CellValue::Number(0.76),
        ];
        let rows = values
            .iter()
            .map(|v| row("PM", "X", "Working", CellValue::Empty, v.clone()))
            .collect();
        let report = project(&RosterTable::new(headers(), rows));
        for r in &report.rows {
            assert_eq!(r.availability_bucket, bucket_of(r.availability_percent));
        }
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let mut hs = headers();
        hs.remove(1);
        let table = RosterTable::new(hs, vec![]);
        let resolution = ColumnResolver::select_manual(&table.headers, 5).unwrap();
        let err = RecordProjector::new()
            .project(&table, &resolution, period())
            .unwrap_err();
        assert!(matches!(err, InputError::MissingColumn(c) if c == "Region"));
    }

    #[test]
    fn extra_statuses_can_be_accepted() {
        let table = RosterTable::new(
            headers(),
            vec![
                row("PM", "Ana", "Working", CellValue::Empty, CellValue::Number(10.0)),
                row("PM", "Bo", "Bench", CellValue::Empty, CellValue::Number(30.0)),
            ],
        );
        let resolution = ColumnResolver::new().resolve(&table.headers, period()).unwrap();
        let report = RecordProjector::new()
            .status_filter(StatusFilter::default().with_status("Bench"))
            .project(&table, &resolution, period())
            .unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].associate_name, "Bo");
    }

    #[test]
    fn empty_roster_projects_to_empty_report() {
        let table = RosterTable::new(headers(), vec![]);
        let report = project(&table);
        assert!(report.is_empty());
        assert_eq!(report.rows_excluded, 0);
    }
}
