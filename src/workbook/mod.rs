//! In-memory spreadsheet model shared by every file format.
//!
//! Reading goes through `calamine` (xlsx, xlsm, xls, ods) or `csv`; writing goes
//! through `rust_xlsxwriter` or `csv`. Only cell values survive the round trip,
//! styles and formulas from the source file are not carried over.

pub mod reader;
pub mod writer;

use crate::utils::{Result, SheetTranslatorError};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Xlsx,
    Xlsm,
    Xls,
    Ods,
    Csv,
}

impl FileKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" => Some(FileKind::Xlsx),
            "xlsm" => Some(FileKind::Xlsm),
            "xls" => Some(FileKind::Xls),
            "ods" => Some(FileKind::Ods),
            "csv" => Some(FileKind::Csv),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| SheetTranslatorError::UnsupportedFileType(path.display().to_string()))
    }

    /// Format written back for a file of this kind.
    pub fn output_kind(&self) -> FileKind {
        match self {
            FileKind::Csv => FileKind::Csv,
            _ => FileKind::Xlsx,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Xlsx => "xlsx",
            FileKind::Xlsm => "xlsm",
            FileKind::Xls => "xls",
            FileKind::Ods => "ods",
            FileKind::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OtherValue {
    Number(f64),
    Bool(bool),
    /// Excel serial date.
    DateTime(f64),
    /// ISO date or duration text reported by ODS files.
    Literal(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Other(OtherValue),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Plain rendering used by the CSV writer.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Other(OtherValue::Number(n)) | CellValue::Other(OtherValue::DateTime(n)) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Other(OtherValue::Bool(true)) => "TRUE".to_string(),
            CellValue::Other(OtherValue::Bool(false)) => "FALSE".to_string(),
            CellValue::Other(OtherValue::Literal(s)) | CellValue::Other(OtherValue::Error(s)) => {
                s.clone()
            }
        }
    }
}

/// A worksheet; cells are keyed by zero-based `(row, col)`, so iteration is
/// row-major.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    name: String,
    cells: BTreeMap<(u32, u32), CellValue>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    pub fn set_cell(&mut self, row: u32, col: u32, value: CellValue) {
        if value.is_empty() {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), value);
        }
    }

    pub fn used_cells(&self) -> impl Iterator<Item = (u32, u32, &CellValue)> {
        self.cells.iter().map(|(&(row, col), value)| (row, col, value))
    }

    pub fn used_cells_mut(&mut self) -> impl Iterator<Item = (u32, u32, &mut CellValue)> {
        self.cells
            .iter_mut()
            .map(|(&(row, col), value)| (row, col, value))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// `(rows, cols)` spanned from A1 to the last used cell.
    pub fn dimensions(&self) -> (u32, u32) {
        self.cells.keys().fold((0, 0), |(rows, cols), &(row, col)| {
            (rows.max(row + 1), cols.max(col + 1))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    kind: FileKind,
}

impl Workbook {
    pub fn new(kind: FileKind) -> Self {
        Self {
            sheets: Vec::new(),
            kind,
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        reader::open_path(path.as_ref())
    }

    pub fn from_bytes(bytes: Vec<u8>, kind: FileKind) -> Result<Self> {
        reader::open_bytes(bytes, kind)
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> &mut [Sheet] {
        &mut self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    /// Saves in the format implied by the path's extension and verifies the
    /// result is a non-empty file. Returns the written size in bytes.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<u64> {
        writer::save_path(self, path.as_ref())
    }

    pub fn save_to_bytes(&self, kind: FileKind) -> Result<Vec<u8>> {
        writer::to_bytes(self, kind)
    }
}
