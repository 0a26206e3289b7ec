//! Spreadsheet import module
//!
//! Decoding is delegated to calamine; this module only turns the first
//! worksheet into a cell grid.

mod importer;

pub use importer::{convert_cell, import_bytes, range_to_grid, FileMeta, SpreadsheetImporter};
