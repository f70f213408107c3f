//! Spreadsheet Assertion Helpers
//!
//! Reads exported XLSX bytes back with calamine so tests can check the
//! workbook a user would actually download.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

/// Opens XLSX bytes, panicking if they are not a readable workbook
pub fn open_xlsx(bytes: &[u8]) -> Xlsx<Cursor<Vec<u8>>> {
    open_workbook_from_rs(Cursor::new(bytes.to_vec())).expect("bytes should be a valid xlsx workbook")
}

/// Sheet names in workbook order
pub fn xlsx_sheet_names(bytes: &[u8]) -> Vec<String> {
    open_xlsx(bytes).sheet_names()
}

/// All cell values of a sheet as text, row by row
pub fn xlsx_sheet_rows(bytes: &[u8], sheet: &str) -> Vec<Vec<String>> {
    let mut workbook = open_xlsx(bytes);
    let range = workbook
        .worksheet_range(sheet)
        .unwrap_or_else(|e| panic!("sheet {} should be readable: {}", sheet, e));

    range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}

/// Value next to a field label on a key/value sheet
pub fn xlsx_field(bytes: &[u8], sheet: &str, field: &str) -> Option<String> {
    xlsx_sheet_rows(bytes, sheet)
        .into_iter()
        .find(|row| row.first().is_some_and(|label| label == field))
        .and_then(|row| row.get(1).cloned())
}

/// Asserts that some cell of the sheet holds exactly `text`
pub fn assert_sheet_contains(bytes: &[u8], sheet: &str, text: &str) {
    let found = xlsx_sheet_rows(bytes, sheet)
        .iter()
        .flatten()
        .any(|cell| cell == text);
    assert!(found, "expected sheet {} to contain {:?}", sheet, text);
}
