//! Tabular projector - cell grid → headers + row records

use crate::error::{DraftError, DraftResult};
use crate::types::{CellValue, RowRecord};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Headers and non-blank data rows of a sheet
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<RowRecord>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Header names that appear more than once, in first-seen order.
    ///
    /// Row records keep the value of the last column with a given name.
    pub fn duplicate_headers(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates: Vec<String> = Vec::new();
        for header in &self.headers {
            if !seen.insert(header.as_str()) && !duplicates.contains(header) {
                duplicates.push(header.clone());
            }
        }
        duplicates
    }

    /// Cell values of a row in header order (for display)
    pub fn row_values(&self, index: usize) -> Vec<String> {
        match self.rows.get(index) {
            Some(row) => self
                .headers
                .iter()
                .map(|h| row.get(h).map(CellValue::to_text).unwrap_or_default())
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Project a raw grid into headers and row records.
///
/// The first grid row is the header row. Blank data rows are dropped, so a
/// header-only grid yields a table with no rows. Fails with
/// [`DraftError::NoData`] only when the grid is empty.
pub fn project(grid: &[Vec<CellValue>]) -> DraftResult<Table> {
    let (header_row, data_rows) = grid.split_first().ok_or(DraftError::NoData)?;

    let headers = derive_headers(header_row);

    let rows: Vec<RowRecord> = data_rows
        .iter()
        .filter(|row| row.iter().any(|cell| !cell.is_blank()))
        .map(|row| build_row(&headers, row))
        .collect();

    debug!(
        headers = headers.len(),
        data_rows = data_rows.len(),
        kept = rows.len(),
        "projected grid"
    );

    let table = Table { headers, rows };
    for duplicate in table.duplicate_headers() {
        warn!(
            header = %duplicate,
            "duplicate header; later column values replace earlier ones"
        );
    }

    Ok(table)
}

/// Header names from the first grid row; falsy cells become `Column N`
pub fn derive_headers(header_row: &[CellValue]) -> Vec<String> {
    header_row
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            if cell.is_falsy() {
                format!("Column {}", index + 1)
            } else {
                cell.to_text()
            }
        })
        .collect()
}

fn build_row(headers: &[String], row: &[CellValue]) -> RowRecord {
    let mut record = RowRecord::with_capacity(headers.len());
    for (index, header) in headers.iter().enumerate() {
        let value = match row.get(index) {
            Some(CellValue::Empty) | None => CellValue::text(""),
            Some(cell) => cell.clone(),
        };
        record.insert(header.clone(), value);
    }
    record
}
