//! Excel availability report renderer
//!
//! Writes a single worksheet with one row per associate:
//!
//! ```text
//! | Current Role | Region | Avail Bucket | Associate ID | Associate Name | Current Availability |
//! |--------------|--------|--------------|--------------|----------------|----------------------|
//! | PM           | EMEA   | 76–100%      | 1001         | Ada Lovelace   | 80                   |
//! | PGM          | APAC   | 0–25%        | 1002         | Grace Hopper   | 10                   |
//! ```
//!
//! The header row is bold white on blue and centered. Data rows are striped
//! with two light blue shades, and every cell has a thin border.

use pmsdash_core::{AssociateId, AvailabilityReport, RenderError, Renderer, ReportRow, ReportingPeriod};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

/// Output columns with their fixed widths
pub const COLUMNS: [(&str, f64); 6] = [
    ("Current Role", 15.0),
    ("Region", 10.0),
    ("Avail Bucket", 12.0),
    ("Associate ID", 12.0),
    ("Associate Name", 25.0),
    ("Current Availability", 18.0),
];

/// Default worksheet name
pub const DEFAULT_SHEET_NAME: &str = "PMS_PM_Resourse";

/// File name of the report for `period`, e.g. `PMS_Dash_May.xlsx`
pub fn report_file_name(period: ReportingPeriod) -> String {
    format!("PMS_Dash_{}.xlsx", period.month_name())
}

/// Excel report renderer configuration
#[derive(Clone, Debug)]
pub struct ExcelReportRenderer {
    pub sheet_name: String,
    /// Header background
    pub header_color: u32,
    /// Background of odd data rows (1st, 3rd, ...)
    pub odd_row_color: u32,
    /// Background of even data rows
    pub even_row_color: u32,
    /// Keep the header visible while scrolling
    pub freeze_header: bool,
}

impl Default for ExcelReportRenderer {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.into(),
            header_color: 0x4472C4,
            odd_row_color: 0xDCE6F1,
            even_row_color: 0xB8CCE4,
            freeze_header: true,
        }
    }
}

struct ReportFormats {
    header: Format,
    odd_row: Format,
    even_row: Format,
}

impl ExcelReportRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worksheet name
    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Do not freeze the header row
    pub fn no_freeze(mut self) -> Self {
        self.freeze_header = false;
        self
    }

    fn create_formats(&self) -> ReportFormats {
        let header = Format::new()
            .set_bold()
            .set_font_color(0xFFFFFF)
            .set_background_color(self.header_color)
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        let cell = Format::new()
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::VerticalCenter);

        ReportFormats {
            header,
            odd_row: cell.clone().set_background_color(self.odd_row_color),
            even_row: cell.set_background_color(self.even_row_color),
        }
    }

    /// Generate workbook bytes
    pub fn render_to_bytes(&self, report: &AvailabilityReport) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        let formats = self.create_formats();

        let sheet = workbook.add_worksheet();
        self.write_sheet(sheet, report, &formats).map_err(xlsx_error)?;

        workbook.save_to_buffer().map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))
    }

    fn write_sheet(
        &self,
        sheet: &mut Worksheet,
        report: &AvailabilityReport,
        formats: &ReportFormats,
    ) -> Result<(), XlsxError> {
        sheet.set_name(&self.sheet_name)?;

        for (col, (label, width)) in COLUMNS.iter().enumerate() {
            let col = col as u16;
            sheet.write_with_format(0, col, *label, &formats.header)?;
            sheet.set_column_width(col, *width)?;
        }

        for (i, row) in report.rows.iter().enumerate() {
            let row_num = i as u32 + 1;
            let format = if row_num % 2 == 0 {
                &formats.even_row
            } else {
                &formats.odd_row
            };
            Self::write_row(sheet, row_num, row, format)?;
        }

        if self.freeze_header {
            sheet.set_freeze_panes(1, 0)?;
        }
        Ok(())
    }

    fn write_row(
        sheet: &mut Worksheet,
        row_num: u32,
        row: &ReportRow,
        format: &Format,
    ) -> Result<(), XlsxError> {
        sheet.write_with_format(row_num, 0, row.role.as_str(), format)?;
        sheet.write_with_format(row_num, 1, row.region.as_str(), format)?;
        sheet.write_with_format(row_num, 2, row.availability_bucket.label(), format)?;
        match &row.associate_id {
            AssociateId::Number(id) => sheet.write_with_format(row_num, 3, *id, format)?,
            AssociateId::Text(id) => sheet.write_with_format(row_num, 3, id.as_str(), format)?,
        };
        sheet.write_with_format(row_num, 4, row.associate_name.as_str(), format)?;
        sheet.write_with_format(row_num, 5, row.availability_percent, format)?;
        Ok(())
    }
}

fn xlsx_error(e: XlsxError) -> RenderError {
    RenderError::Format(e.to_string())
}

impl Renderer for ExcelReportRenderer {
    type Output = Vec<u8>;

    fn render(&self, report: &AvailabilityReport) -> Result<Vec<u8>, RenderError> {
        if self.sheet_name.trim().is_empty() {
            return Err(RenderError::InvalidData("Sheet name must not be empty".into()));
        }
        self.render_to_bytes(report)
    }
}
