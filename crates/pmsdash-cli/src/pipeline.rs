//! Roster → report pipeline shared by the subcommands.

use crate::prompt;
use anyhow::{Context, Result};
use clap::Args;
use pmsdash_core::{
    AvailabilityReport, ColumnResolver, RecordProjector, ReportingPeriod, Resolution, ResolveError,
    RosterTable, StatusFilter,
};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Arguments common to every command that builds a report
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Roster spreadsheet (.xlsx, .xls, .xlsb, .ods)
    #[arg(value_name = "FILE", env = "PMSDASH_INPUT")]
    pub file: PathBuf,

    /// Reporting month (1-12); defaults to the current month
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Reporting year; defaults to the current year
    #[arg(long)]
    pub year: Option<i32>,

    /// 0-based index of the availability column (skips detection)
    #[arg(short, long, value_name = "INDEX")]
    pub column: Option<usize>,

    /// Fail instead of prompting when the availability column is ambiguous
    #[arg(long)]
    pub no_prompt: bool,

    /// Extra working status to include besides "Working" (repeatable)
    #[arg(long = "status", value_name = "STATUS")]
    pub statuses: Vec<String>,
}

impl RunArgs {
    pub fn period(&self) -> ReportingPeriod {
        let now = ReportingPeriod::current();
        ReportingPeriod {
            year: self.year.unwrap_or(now.year),
            month: self.month.unwrap_or(now.month),
        }
    }

    fn status_filter(&self) -> StatusFilter {
        self.statuses
            .iter()
            .fold(StatusFilter::default(), |f, s| f.with_status(s.clone()))
    }
}

/// Read the roster, resolve the availability column and project the report.
///
/// Progress lines go to `progress`; commands that print machine-readable
/// output on stdout pass stderr here.
pub fn build_report(args: &RunArgs, progress: &mut impl Write) -> Result<AvailabilityReport> {
    let period = args.period();
    writeln!(progress, "Reading file: {}", args.file.display())?;
    let table = pmsdash_reader::read_roster(&args.file)
        .with_context(|| format!("Failed to read roster {}", args.file.display()))?;

    let resolution = resolve_column(&table, period, args, progress)?;
    if resolution.rule.is_fallback() {
        writeln!(
            progress,
            "Couldn't find a column for {period}, using {}: {}",
            resolution.rule, resolution.header
        )?;
    } else {
        writeln!(
            progress,
            "Using availability column: {} ({})",
            resolution.header, resolution.rule
        )?;
    }

    let report = RecordProjector::new()
        .status_filter(args.status_filter())
        .project(&table, &resolution, period)
        .context("Roster is missing required columns")?;
    info!(rows = report.rows.len(), "report built");
    Ok(report)
}

fn resolve_column(
    table: &RosterTable,
    period: ReportingPeriod,
    args: &RunArgs,
    progress: &mut impl Write,
) -> Result<Resolution> {
    if let Some(index) = args.column {
        return ColumnResolver::select_manual(&table.headers, index)
            .context("Invalid --column index");
    }

    match ColumnResolver::new().resolve(&table.headers, period) {
        Ok(resolution) => Ok(resolution),
        Err(ResolveError::Ambiguous { .. }) if !args.no_prompt && std::io::stdin().is_terminal() => {
            warn!("availability column is ambiguous, asking operator");
            let index = prompt::ask_column(&table.headers, &mut std::io::stdin().lock(), progress)?;
            let resolution = ColumnResolver::select_manual(&table.headers, index)?;
            writeln!(progress, "Using user-selected column: {}", resolution.header)?;
            Ok(resolution)
        }
        Err(e) => Err(e).context(
            "Pass --column <INDEX> to choose it explicitly (see `pmsdash columns <FILE>`)",
        ),
    }
}

/// `<dir of input>/<file_name>`
pub fn beside_input(input: &Path, file_name: &str) -> PathBuf {
    input
        .parent()
        .map_or_else(|| PathBuf::from(file_name), |dir| dir.join(file_name))
}

/// Write a rendered artifact.
///
/// Bytes go to a temporary file in the target directory which is then
/// renamed over `path`, so a failed write leaves no partial file behind.
pub fn write_output(path: &Path, bytes: impl AsRef<[u8]>) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create output in {}", dir.display()))?;
    file.write_all(bytes.as_ref())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(month: Option<u32>, year: Option<i32>) -> RunArgs {
        RunArgs {
            file: PathBuf::from("roster.xlsx"),
            month,
            year,
            column: None,
            no_prompt: true,
            statuses: vec!["Bench".into(), "Working".into()],
        }
    }

    #[test]
    fn explicit_period_overrides_clock() {
        let p = args(Some(5), Some(2025)).period();
        assert_eq!((p.year, p.month), (2025, 5));
    }

    #[test]
    fn month_alone_keeps_current_year() {
        let p = args(Some(2), None).period();
        assert_eq!(p.month, 2);
        assert_eq!(p.year, ReportingPeriod::current().year);
    }

    #[test]
    fn statuses_extend_default_filter() {
        let filter = args(None, None).status_filter();
        assert_eq!(filter.accepted, vec!["Working".to_string(), "Bench".to_string()]);
    }

    #[test]
    fn outputs_land_beside_input() {
        assert_eq!(
            beside_input(Path::new("/data/roster.xlsx"), "PMS_Dash_May.xlsx"),
            PathBuf::from("/data/PMS_Dash_May.xlsx")
        );
        assert_eq!(
            beside_input(Path::new("roster.xlsx"), "pms_dashboard.html"),
            PathBuf::from("pms_dashboard.html")
        );
    }

    #[test]
    fn output_is_written_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        std::fs::write(&path, b"stale").unwrap();

        write_output(&path, b"fresh bytes").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"fresh bytes");
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn failed_output_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.xlsx");
        assert!(write_output(&path, b"bytes").is_err());
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn ambiguous_without_prompt_is_an_error() {
        let table = RosterTable::new(
            vec![pmsdash_core::ColumnHeader::text("Region")],
            vec![],
        );
        let period = ReportingPeriod::new(2025, 5).unwrap();
        let err = resolve_column(&table, period, &args(Some(5), Some(2025)), &mut Vec::new())
            .unwrap_err();
        assert!(err.to_string().contains("--column"));
    }

    #[test]
    fn explicit_column_bypasses_detection() {
        let table = RosterTable::new(
            vec![
                pmsdash_core::ColumnHeader::text("Region"),
                pmsdash_core::ColumnHeader::text("Availability"),
            ],
            vec![],
        );
        let period = ReportingPeriod::new(2025, 5).unwrap();
        let mut a = args(None, None);
        a.column = Some(1);
        let r = resolve_column(&table, period, &a, &mut Vec::new()).unwrap();
        assert_eq!(r.header.label(), "Availability");

        a.column = Some(9);
        assert!(resolve_column(&table, period, &a, &mut Vec::new()).is_err());
    }
}
