//! XLSX rendering of claim reports
//!
//! Each [`Sheet`] becomes a worksheet with a frozen header row. Labels are
//! bold; Good/Caution/Alert cells get the usual green/amber/red fills.

use std::borrow::Cow;

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet, XlsxError};
use tracing::debug;

use core_kernel::{DomainPort, PortError};
use domain_claims::{CellStyle, Report, ReportRenderer, Sheet};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Most characters a single spreadsheet cell can hold
pub const MAX_CELL_CHARS: usize = 32_767;

const LABEL_COLUMN_WIDTH: f64 = 24.0;
const VALUE_COLUMN_WIDTH: f64 = 100.0;

struct CellFormats {
    plain: Format,
    label: Format,
    good: Format,
    caution: Format,
    alert: Format,
}

impl CellFormats {
    fn new() -> Self {
        let base = Format::new().set_text_wrap().set_align(FormatAlign::Top);
        Self {
            plain: base.clone(),
            label: base
                .clone()
                .set_bold()
                .set_background_color(Color::RGB(0xD9D9D9)),
            good: base
                .clone()
                .set_background_color(Color::RGB(0xC6EFCE))
                .set_font_color(Color::RGB(0x006100)),
            caution: base
                .clone()
                .set_background_color(Color::RGB(0xFFEB9C))
                .set_font_color(Color::RGB(0x9C5700)),
            alert: base
                .set_background_color(Color::RGB(0xFFC7CE))
                .set_font_color(Color::RGB(0x9C0006)),
        }
    }

    fn for_style(&self, style: CellStyle) -> &Format {
        match style {
            CellStyle::Plain => &self.plain,
            CellStyle::Label => &self.label,
            CellStyle::Good => &self.good,
            CellStyle::Caution => &self.caution,
            CellStyle::Alert => &self.alert,
        }
    }
}

/// Renders reports as Excel workbooks
#[derive(Debug, Clone, Default)]
pub struct XlsxReportRenderer;

impl XlsxReportRenderer {
    pub fn new() -> Self {
        Self
    }

    fn write_sheet(
        worksheet: &mut Worksheet,
        sheet: &Sheet,
        formats: &CellFormats,
    ) -> Result<(), XlsxError> {
        worksheet.set_name(&sheet.name)?;
        worksheet.set_column_width(0, LABEL_COLUMN_WIDTH)?;
        worksheet.set_column_width(1, VALUE_COLUMN_WIDTH)?;
        worksheet.set_freeze_panes(1, 0)?;

        for (row_index, row) in sheet.rows.iter().enumerate() {
            let row_number = u32::try_from(row_index).map_err(|_| XlsxError::RowColumnLimitError)?;
            for (col_index, cell) in row.iter().enumerate() {
                let col_number =
                    u16::try_from(col_index).map_err(|_| XlsxError::RowColumnLimitError)?;
                worksheet.write_string_with_format(
                    row_number,
                    col_number,
                    fit_cell(&cell.text),
                    formats.for_style(cell.style),
                )?;
            }
        }
        Ok(())
    }
}

/// Cuts text to what a cell can hold
fn fit_cell(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => Cow::Owned(text[..cut].to_string()),
        None => Cow::Borrowed(text),
    }
}

fn xlsx_error(error: XlsxError) -> PortError {
    PortError::internal(format!("failed to write xlsx workbook: {}", error))
}

impl DomainPort for XlsxReportRenderer {}

impl ReportRenderer for XlsxReportRenderer {
    fn content_type(&self) -> &'static str {
        XLSX_CONTENT_TYPE
    }

    fn file_extension(&self) -> &'static str {
        "xlsx"
    }

    fn render(&self, report: &Report) -> Result<Vec<u8>, PortError> {
        let formats = CellFormats::new();
        let mut workbook = Workbook::new();

        for sheet in &report.sheets {
            let worksheet = workbook.add_worksheet();
            Self::write_sheet(worksheet, sheet, &formats).map_err(xlsx_error)?;
        }

        let bytes = workbook.save_to_buffer().map_err(xlsx_error)?;
        debug!(
            claim_id = %report.claim_id,
            sheets = report.sheet_count(),
            bytes = bytes.len(),
            "Workbook rendered"
        );
        Ok(bytes)
    }
}
