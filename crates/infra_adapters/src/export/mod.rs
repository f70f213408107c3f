//! Report renderers

mod xlsx;

pub use xlsx::{XlsxReportRenderer, MAX_CELL_CHARS, XLSX_CONTENT_TYPE};
