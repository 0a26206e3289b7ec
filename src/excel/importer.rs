//! Spreadsheet importer - workbook (.xlsx, .xls, .ods, ...) → first-sheet grid

use crate::error::{DraftError, DraftResult};
use crate::types::{CellValue, Grid, Sheet};
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::fmt;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads the first worksheet of a workbook into a [`Grid`]
pub struct SpreadsheetImporter {
    path: PathBuf,
}

impl SpreadsheetImporter {
    /// Create a new importer for a workbook on disk
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Import the first sheet of the workbook
    pub fn import(&self) -> DraftResult<Sheet> {
        let mut workbook = open_workbook_auto(&self.path).map_err(|e| {
            DraftError::Spreadsheet(format!(
                "Failed to open {}: {}",
                self.path.display(),
                e
            ))
        })?;
        read_first_sheet(&mut workbook)
    }

    /// File name and size of the workbook
    pub fn meta(&self) -> DraftResult<FileMeta> {
        FileMeta::from_path(&self.path)
    }
}

/// Import the first sheet from an in-memory workbook
pub fn import_bytes(bytes: Vec<u8>) -> DraftResult<Sheet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| DraftError::Spreadsheet(format!("Failed to read workbook: {}", e)))?;
    read_first_sheet(&mut workbook)
}

fn read_first_sheet<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> DraftResult<Sheet> {
    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Ok(Sheet::default());
    };

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
        DraftError::Spreadsheet(format!("Failed to read sheet '{}': {}", sheet_name, e))
    })?;

    let grid = range_to_grid(&range);
    debug!(sheet = %sheet_name, rows = grid.len(), "read first sheet");

    Ok(Sheet::new(sheet_name, grid))
}

/// Convert a calamine range into a ragged grid, trimming trailing empty cells
pub fn range_to_grid(range: &Range<Data>) -> Grid {
    range
        .rows()
        .map(|row| {
            let mut cells: Vec<CellValue> = row.iter().map(convert_cell).collect();
            while matches!(cells.last(), Some(CellValue::Empty)) {
                cells.pop();
            }
            cells
        })
        .collect()
}

/// Map a calamine cell to a [`CellValue`]
pub fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        // Serial day number, as a decoder without date parsing reports it
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// Display metadata of the loaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
}

impl FileMeta {
    pub fn from_path(path: &Path) -> DraftResult<Self> {
        let size = std::fs::metadata(path)?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, size })
    }

    /// Size in KiB, rounded to the nearest whole number
    pub fn size_kb(&self) -> u64 {
        (self.size as f64 / 1024.0).round() as u64
    }
}

impl fmt::Display for FileMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} KB)", self.name, self.size_kb())
    }
}
