//! Integration tests: render the Excel report and read it back

use pmsdash_core::{
    bucket_of, convert_availability, AvailabilityBucket, CellValue, ColumnHeader, ColumnResolver,
    RecordProjector, Renderer, ReportingPeriod, RosterTable,
};
use pmsdash_reader::read_roster;
use pmsdash_render::{report_file_name, ExcelReportRenderer};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn roster() -> RosterTable {
    let headers = [
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
    .collect();

    let availability = [
        CellValue::text("25%"),
        CellValue::Number(0.26),
        CellValue::Number(50.5),
        CellValue::text("51"),
        CellValue::Number(0.755),
        CellValue::Number(76.0),
        CellValue::text("N/A"),
        CellValue::Empty,
    ];
    let rows = availability
        .iter()
        .enumerate()
        .map(|(i, a)| {
            vec![
                CellValue::text(if i % 2 == 0 { "Scrum Master" } else { "technical pdl" }),
                CellValue::text("EMEA"),
                CellValue::Number(3000.0 + i as f64),
                CellValue::text(format!("Associate {i}")),
                CellValue::text("Working"),
                CellValue::Number(0.1),
                a.clone(),
            ]
        })
        .collect();
    RosterTable::new(headers, rows)
}

#[test]
fn emitted_bucket_matches_emitted_availability() {
    let table = roster();
    let period = ReportingPeriod::new(2025, 5).unwrap();
    let resolution = ColumnResolver::new().resolve(&table.headers, period).unwrap();
    let report = RecordProjector::new().project(&table, &resolution, period).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join(report_file_name(period));
    let bytes = ExcelReportRenderer::new().render(&report).unwrap();
    std::fs::write(&path, bytes).unwrap();

    let written = read_roster(&path).unwrap();
    let labels: Vec<String> = written.headers.iter().map(ColumnHeader::label).collect();
    assert_eq!(
        labels,
        vec![
            "Current Role",
            "Region",
            "Avail Bucket",
            "Associate ID",
            "Associate Name",
            "Current Availability",
        ]
    );
    assert_eq!(written.len(), report.rows.len());

    for i in 0..written.len() {
        let bucket = AvailabilityBucket::from_label(&written.cell(i, 2).to_string())
            .expect("bucket label");
        let pct = match written.cell(i, 5) {
            CellValue::Number(n) => *n,
            other => panic!("availability should be numeric, got {other:?}"),
        };
        assert_eq!(bucket, bucket_of(pct), "row {i}");
        assert_eq!(pct, report.rows[i].availability_percent);
    }
}

#[test]
fn emitted_rows_are_sorted_and_canonical() {
    let table = roster();
    let period = ReportingPeriod::new(2025, 5).unwrap();
    let resolution = ColumnResolver::new().resolve(&table.headers, period).unwrap();
    let report = RecordProjector::new().project(&table, &resolution, period).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("out.xlsx");
    std::fs::write(&path, ExcelReportRenderer::new().render(&report).unwrap()).unwrap();
    let written = read_roster(&path).unwrap();

    let pct: Vec<f64> = (0..written.len())
        .map(|i| convert_availability(written.cell(i, 5)))
        .collect();
    let mut sorted = pct.clone();
    sorted.sort_by(|a, b| b.total_cmp(a));
    assert_eq!(pct, sorted);

    let roles: Vec<String> = (0..written.len()).map(|i| written.cell(i, 0).to_string()).collect();
    assert!(roles.iter().all(|r| r == "SCRUM MASTER" || r == "TPDL ROLE"));
    assert_eq!(written.cell(0, 3), &CellValue::Number(3005.0));
}

#[test]
fn associate_ids_keep_their_cell_type() {
    let mut table = roster();
    table.rows[0][2] = CellValue::text("00123");
    table.rows[1][2] = CellValue::text("1e3");
    let period = ReportingPeriod::new(2025, 5).unwrap();
    let resolution = ColumnResolver::new().resolve(&table.headers, period).unwrap();
    let report = RecordProjector::new().project(&table, &resolution, period).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("ids.xlsx");
    std::fs::write(&path, ExcelReportRenderer::new().render(&report).unwrap()).unwrap();
    let written = read_roster(&path).unwrap();

    let ids: Vec<&CellValue> = (0..written.len()).map(|i| written.cell(i, 3)).collect();
    assert!(ids.contains(&&CellValue::text("00123")));
    assert!(ids.contains(&&CellValue::text("1e3")));
    assert!(ids.contains(&&CellValue::Number(3002.0)));
    assert!(!ids.contains(&&CellValue::Number(123.0)));
    assert!(!ids.contains(&&CellValue::Number(1000.0)));
}

#[test]
fn report_file_is_named_after_month() {
    let period = ReportingPeriod::new(2025, 5).unwrap();
    assert_eq!(report_file_name(period), "PMS_Dash_May.xlsx");
}
