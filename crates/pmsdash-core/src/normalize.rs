//! Per-cell value normalization.
//!
//! These functions never fail: malformed roster cells degrade to neutral
//! defaults (`UNDEFINED`, `0`) so one bad cell cannot block the report.

use crate::{AvailabilityBucket, CellValue, Role};

/// Canonicalize a free-text role label.
pub fn clean_role(raw: &CellValue) -> Role {
    let Some(label) = raw.to_label() else {
        return Role::Undefined;
    };
    let label = label.trim().to_uppercase();
    match label.as_str() {
        "" => Role::Undefined,
        "PROJECT MGR" | "PROJECT MGR/PGM" => Role::Pm,
        "PROGRAM MGR" | "PGM" => Role::Pgm,
        "TPDL" | "TECHNICAL PDL" => Role::TpdlRole,
        "SCRUM MASTER" => Role::ScrumMaster,
        _ => Role::Other(label),
    }
}

/// Convert a raw availability cell to the 0-100 percent scale.
///
/// Text is read as a percentage with an optional `%` sign. Numbers in
/// `(0, 1]` are fractions and get scaled; any other number is taken as
/// already scaled.
pub fn convert_availability(raw: &CellValue) -> f64 {
    let percent = match raw {
        CellValue::Text(s) => s
            .replace('%', "")
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0),
        CellValue::Number(n) if !n.is_finite() => 0.0,
        CellValue::Number(n) if *n > 0.0 && *n <= 1.0 => n * 100.0,
        CellValue::Number(n) => *n,
        CellValue::Empty | CellValue::Bool(_) | CellValue::Date(_) | CellValue::Error(_) => 0.0,
    };
    // -0.0 sorts below 0.0 under total ordering
    if percent == 0.0 { 0.0 } else { percent }
}

/// Thresholds checked top-down, first match wins
const BUCKET_THRESHOLDS: [(f64, AvailabilityBucket); 3] = [
    (76.0, AvailabilityBucket::From76To100),
    (51.0, AvailabilityBucket::From51To75),
    (26.0, AvailabilityBucket::From26To50),
];

/// Assign an availability percentage to its bucket
pub fn bucket_of(percent: f64) -> AvailabilityBucket {
    BUCKET_THRESHOLDS
        .iter()
        .find(|(min, _)| percent >= *min)
        .map_or(AvailabilityBucket::UpTo25, |(_, bucket)| *bucket)
}
