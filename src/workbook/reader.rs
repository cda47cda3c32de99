use crate::utils::{Result, SheetTranslatorError};
use crate::workbook::{CellValue, FileKind, OtherValue, Sheet, Workbook};
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader, Sheets};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// Name given to the single sheet of a CSV file.
pub const CSV_SHEET_NAME: &str = "Sheet1";

pub fn open_path(path: &Path) -> Result<Workbook> {
    if !path.exists() {
        return Err(SheetTranslatorError::FileNotFound(path.display().to_string()));
    }

    let kind = FileKind::from_path(path)?;
    match kind {
        FileKind::Csv => {
            let file = std::fs::File::open(path)?;
            read_csv(file)
        }
        _ => {
            let sheets = open_workbook_auto(path).map_err(|e| {
                SheetTranslatorError::WorkbookError(format!(
                    "failed to open {}: {}",
                    path.display(),
                    e
                ))
            })?;
            read_sheets(sheets, kind)
        }
    }
}

pub fn open_bytes(bytes: Vec<u8>, kind: FileKind) -> Result<Workbook> {
    match kind {
        FileKind::Csv => read_csv(Cursor::new(bytes)),
        _ => {
            let sheets = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| {
                SheetTranslatorError::WorkbookError(format!("failed to open workbook: {}", e))
            })?;
            read_sheets(sheets, kind)
        }
    }
}

fn read_sheets<RS: Read + Seek>(mut sheets: Sheets<RS>, kind: FileKind) -> Result<Workbook> {
    let mut workbook = Workbook::new(kind);

    for name in sheets.sheet_names() {
        let range = sheets.worksheet_range(&name).map_err(|e| {
            SheetTranslatorError::WorkbookError(format!("failed to read sheet '{}': {}", name, e))
        })?;

        let mut sheet = Sheet::new(name.as_str());
        // Ranges start at the first used cell, not at A1.
        let (row0, col0) = range.start().unwrap_or((0, 0));

        for (r, row) in range.rows().enumerate() {
            for (c, data) in row.iter().enumerate() {
                sheet.set_cell(row0 + r as u32, col0 + c as u32, cell_from_data(data));
            }
        }

        tracing::debug!(sheet = %name, cells = sheet.cell_count(), "Loaded sheet");
        workbook.add_sheet(sheet);
    }

    Ok(workbook)
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Other(OtherValue::Number(*i as f64)),
        Data::Float(f) => CellValue::Other(OtherValue::Number(*f)),
        Data::Bool(b) => CellValue::Other(OtherValue::Bool(*b)),
        Data::DateTime(dt) => CellValue::Other(OtherValue::DateTime(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => {
            CellValue::Other(OtherValue::Literal(s.clone()))
        }
        Data::Error(e) => CellValue::Other(OtherValue::Error(e.to_string())),
    }
}

fn read_csv<R: Read>(source: R) -> Result<Workbook> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source);

    let mut sheet = Sheet::new(CSV_SHEET_NAME);
    for (r, record) in reader.records().enumerate() {
        let record = record?;
        for (c, field) in record.iter().enumerate() {
            if !field.is_empty() {
                sheet.set_cell(r as u32, c as u32, CellValue::text(field));
            }
        }
    }

    let mut workbook = Workbook::new(FileKind::Csv);
    workbook.add_sheet(sheet);
    Ok(workbook)
}
