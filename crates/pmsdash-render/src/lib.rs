//! # pmsdash-render
//!
//! Rendering backends for availability reports.
//!
//! This crate provides:
//! - Excel report rendering (styled single-sheet workbook)
//! - Interactive HTML dashboard rendering (KPIs, SVG charts, filterable table)
//!
//! ## Example
//!
//! ```rust,ignore
//! use pmsdash_core::Renderer;
//! use pmsdash_render::{report_file_name, ExcelReportRenderer, HtmlDashboardRenderer};
//!
//! let xlsx_bytes = ExcelReportRenderer::new().render(&report)?;
//! std::fs::write(report_file_name(report.period), xlsx_bytes)?;
//!
//! let html = HtmlDashboardRenderer::new().title("PMS Dashboard").render(&report)?;
//! std::fs::write("pms_dashboard.html", html)?;
//! ```

pub mod dashboard;
pub mod excel;

pub use dashboard::{DashboardTheme, HtmlDashboardRenderer, DEFAULT_DASHBOARD_FILE};
pub use excel::{report_file_name, ExcelReportRenderer};
