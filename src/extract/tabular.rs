// src/extract/tabular.rs

//! CSV and XLSX flattening. The first row of either format is treated as the
//! column header and is not part of the extracted text.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use csv::ReaderBuilder;

use super::ExtractError;

pub fn extract_csv(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let mut cells = Vec::new();
    for record in reader.records() {
        let record = record?;
        cells.extend(record.iter().map(str::to_string));
    }

    Ok(cells.join(" "))
}

/// Flattens the first worksheet, row-major.
pub fn extract_xlsx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| ExtractError::Spreadsheet(format!("failed to open workbook: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ExtractError::Spreadsheet("no sheets found".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ExtractError::Spreadsheet(format!("failed to read sheet: {e}")))?;

    let cells: Vec<String> = range
        .rows()
        .skip(1)
        .flat_map(|row| row.iter().map(cell_text))
        .collect();

    Ok(cells.join(" "))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
