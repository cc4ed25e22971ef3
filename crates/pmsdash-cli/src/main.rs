//! pmsdash CLI - roster availability reporting
//!
//! Reads a project-management roster, picks the availability column for the
//! reporting month and writes the Excel report or the HTML dashboard.

mod pipeline;
mod prompt;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pipeline::{beside_input, build_report, write_output, RunArgs};
use pmsdash_core::{ColumnResolver, Renderer, ReportSummary, ReportingPeriod};
use pmsdash_render::{
    report_file_name, ExcelReportRenderer, HtmlDashboardRenderer, DEFAULT_DASHBOARD_FILE,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pmsdash")]
#[command(author, version, about = "Roster availability reports and dashboards", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the availability report workbook (PMS_Dash_<Month>.xlsx)
    Report {
        #[command(flatten)]
        run: RunArgs,

        /// Output file (defaults to the input's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worksheet name
        #[arg(long)]
        sheet_name: Option<String>,
    },

    /// Write the HTML availability dashboard
    Dashboard {
        #[command(flatten)]
        run: RunArgs,

        /// Output file (defaults to pms_dashboard.html beside the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Page title
        #[arg(long)]
        title: Option<String>,

        /// Dark color theme
        #[arg(long)]
        dark: bool,

        /// Omit the filter script
        #[arg(long)]
        static_page: bool,
    },

    /// List the roster's columns and the one that would be used
    Columns {
        /// Roster spreadsheet
        #[arg(value_name = "FILE", env = "PMSDASH_INPUT")]
        file: PathBuf,

        /// Reporting month (1-12); defaults to the current month
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Reporting year; defaults to the current year
        #[arg(long)]
        year: Option<i32>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print headcount and availability statistics
    Summary {
        #[command(flatten)]
        run: RunArgs,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Report { run, output, sheet_name }) => cmd_report(&run, output, sheet_name),
        Some(Commands::Dashboard {
            run,
            output,
            title,
            dark,
            static_page,
        }) => cmd_dashboard(&run, output, title, dark, static_page),
        Some(Commands::Columns { file, month, year, format }) => {
            cmd_columns(&file, month, year, format)
        }
        Some(Commands::Summary { run, format }) => cmd_summary(&run, format),
        None => {
            println!("pmsdash - Roster availability reporting");
            println!("Run with --help for usage information");
            Ok(())
        }
    }
}

/// RUST_LOG wins; otherwise the level follows `-v`
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn cmd_report(run: &RunArgs, output: Option<PathBuf>, sheet_name: Option<String>) -> Result<()> {
    let report = build_report(run, &mut std::io::stdout())?;
    let mut renderer = ExcelReportRenderer::new();
    if let Some(name) = sheet_name {
        renderer = renderer.sheet_name(name);
    }
    let bytes = renderer.render(&report).context("Failed to render report")?;

    let path = output.unwrap_or_else(|| beside_input(&run.file, &report_file_name(report.period)));
    write_output(&path, bytes)?;
    println!("Report successfully generated: {}", path.display());
    Ok(())
}

fn cmd_dashboard(
    run: &RunArgs,
    output: Option<PathBuf>,
    title: Option<String>,
    dark: bool,
    static_page: bool,
) -> Result<()> {
    let report = build_report(run, &mut std::io::stdout())?;
    let mut renderer = HtmlDashboardRenderer::new();
    if let Some(title) = title {
        renderer = renderer.title(title);
    }
    if dark {
        renderer = renderer.dark_theme();
    }
    if static_page {
        renderer = renderer.static_page();
    }
    let html = renderer.render(&report).context("Failed to render dashboard")?;

    let path = output.unwrap_or_else(|| beside_input(&run.file, DEFAULT_DASHBOARD_FILE));
    write_output(&path, html)?;
    println!("Dashboard successfully generated: {}", path.display());
    Ok(())
}

#[derive(Serialize)]
struct ColumnListing {
    index: usize,
    label: String,
    date_like: bool,
}

fn cmd_columns(
    file: &std::path::Path,
    month: Option<u32>,
    year: Option<i32>,
    format: OutputFormat,
) -> Result<()> {
    let table = pmsdash_reader::read_roster(file)
        .with_context(|| format!("Failed to read roster {}", file.display()))?;
    let now = ReportingPeriod::current();
    let period = ReportingPeriod {
        year: year.unwrap_or(now.year),
        month: month.unwrap_or(now.month),
    };
    let resolved = ColumnResolver::new().resolve(&table.headers, period).ok();

    match format {
        OutputFormat::Json => {
            let listing: Vec<ColumnListing> = table
                .headers
                .iter()
                .enumerate()
                .map(|(index, h)| ColumnListing {
                    index,
                    label: h.label(),
                    date_like: ColumnResolver::is_date_like(h),
                })
                .collect();
            let json = serde_json::json!({
                "period": period.to_string(),
                "columns": listing,
                "resolved": resolved,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Columns in {}:", file.display());
            prompt::list_headers(&table.headers, &mut std::io::stdout())?;
            match resolved {
                Some(r) => println!("Availability column for {period}: [{}] {} ({})", r.index, r.header, r.rule),
                None => println!("No availability column found for {period}; pass --column <INDEX>"),
            }
        }
    }
    Ok(())
}

fn cmd_summary(run: &RunArgs, format: OutputFormat) -> Result<()> {
    // keep stdout a single JSON document
    let report = match format {
        OutputFormat::Json => build_report(run, &mut std::io::stderr())?,
        OutputFormat::Text => build_report(run, &mut std::io::stdout())?,
    };
    let summary = ReportSummary::from_report(&report);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => {
            println!("Period:       {}", summary.period);
            println!("Column:       {}", summary.source_column);
            println!(
                "Rows:         {} read, {} excluded",
                report.rows_read, report.rows_excluded
            );
            println!("Headcount:    {}", summary.headcount);
            println!("Mean avail.:  {:.1}%", summary.mean_availability);
            println!();
            println!("By bucket:");
            for stat in &summary.by_bucket {
                println!("  {:<10} {:>5}  {:>6.1}%", stat.label, stat.headcount, stat.mean_availability);
            }
            println!("By role:");
            for stat in &summary.by_role {
                println!("  {:<14} {:>5}  {:>6.1}%", stat.label, stat.headcount, stat.mean_availability);
            }
            println!("By region:");
            for stat in &summary.by_region {
                println!("  {:<14} {:>5}  {:>6.1}%", stat.label, stat.headcount, stat.mean_availability);
            }
        }
    }
    Ok(())
}
