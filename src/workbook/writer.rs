use crate::utils::{Result, SheetTranslatorError};
use crate::workbook::{CellValue, FileKind, OtherValue, Sheet, Workbook};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};
use std::path::Path;

pub fn save_path(workbook: &Workbook, path: &Path) -> Result<u64> {
    let kind = FileKind::from_path(path)?.output_kind();
    let bytes = to_bytes(workbook, kind)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &bytes)?;

    verify_saved(path)
}

/// Confirms the output exists and is non-empty.
pub fn verify_saved(path: &Path) -> Result<u64> {
    let metadata = std::fs::metadata(path).map_err(|_| {
        SheetTranslatorError::FileSaveFailure(format!("{} does not exist", path.display()))
    })?;

    if metadata.len() == 0 {
        return Err(SheetTranslatorError::FileSaveFailure(format!(
            "{} is empty",
            path.display()
        )));
    }

    Ok(metadata.len())
}

pub fn to_bytes(workbook: &Workbook, kind: FileKind) -> Result<Vec<u8>> {
    match kind.output_kind() {
        FileKind::Csv => write_csv(workbook),
        _ => write_xlsx(workbook),
    }
}

fn write_xlsx(workbook: &Workbook) -> Result<Vec<u8>> {
    let mut book = XlsxWorkbook::new();
    // Wrapped so "original\ntranslation" shows on two lines.
    let wrap = Format::new().set_text_wrap();
    let date = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for sheet in workbook.sheets() {
        let worksheet = book.add_worksheet();
        worksheet.set_name(sheet.name())?;
        write_sheet_cells(sheet, worksheet, &wrap, &date)?;
    }

    Ok(book.save_to_buffer()?)
}

fn write_sheet_cells(
    sheet: &Sheet,
    worksheet: &mut Worksheet,
    wrap: &Format,
    date: &Format,
) -> Result<()> {
    for (row, col, value) in sheet.used_cells() {
        let col = u16::try_from(col).map_err(|_| {
            SheetTranslatorError::WorkbookError(format!(
                "column {} out of range in sheet '{}'",
                col,
                sheet.name()
            ))
        })?;

        match value {
            CellValue::Empty => {}
            CellValue::Text(s) if s.contains('\n') => {
                worksheet.write_string_with_format(row, col, s.as_str(), wrap)?;
            }
            CellValue::Text(s) => {
                worksheet.write_string(row, col, s.as_str())?;
            }
            CellValue::Other(OtherValue::Number(n)) => {
                worksheet.write_number(row, col, *n)?;
            }
            CellValue::Other(OtherValue::Bool(b)) => {
                worksheet.write_boolean(row, col, *b)?;
            }
            CellValue::Other(OtherValue::DateTime(serial)) => {
                worksheet.write_number_with_format(row, col, *serial, date)?;
            }
            CellValue::Other(OtherValue::Literal(s)) | CellValue::Other(OtherValue::Error(s)) => {
                worksheet.write_string(row, col, s.as_str())?;
            }
        }
    }

    Ok(())
}

fn write_csv(workbook: &Workbook) -> Result<Vec<u8>> {
    let sheet = match workbook.sheets() {
        [] => return Ok(Vec::new()),
        [sheet] => sheet,
        sheets => {
            return Err(SheetTranslatorError::ValidationError(format!(
                "CSV output holds one sheet, workbook has {}",
                sheets.len()
            )))
        }
    };

    let (rows, cols) = sheet.dimensions();
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    for row in 0..rows {
        let record: Vec<String> = (0..cols)
            .map(|col| sheet.cell(row, col).map(CellValue::display).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| SheetTranslatorError::IoError(e.into_error()))
}
