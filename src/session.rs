//! Application state for one load → generate → export cycle
//!
//! Every load starts from a clean slate. A failed generation leaves the
//! previous drafts in place. The status line always describes the outcome
//! of the most recent operation.

use crate::core::{project, DraftGenerator, Table};
use crate::error::{find_similar, DraftError, DraftResult};
use crate::excel::SpreadsheetImporter;
use crate::types::{Draft, Role, RoleMapping, RowRecord, Sheet, Templates};
use crate::writer::{self, ExportFormat};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Number of drafts shown in a preview
pub const PREVIEW_LIMIT: usize = 50;

pub const STATUS_NO_ROWS: &str = "No rows found in the spreadsheet.";
pub const STATUS_INCOMPLETE_MAPPING: &str = "Please map all columns before generating drafts.";

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Empty,
    Loaded,
    Generated,
}

/// Which controls are available in the current stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Controls {
    pub mapping: bool,
    pub generate: bool,
    pub export: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    sheet_name: Option<String>,
    table: Option<Table>,
    drafts: Option<Vec<Draft>>,
    status: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all loaded data and clear the status line
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Load a decoded sheet, replacing any previous data
    pub fn load_sheet(&mut self, sheet: Sheet) -> DraftResult<usize> {
        self.reset();

        // An empty grid and a sheet without usable rows both read as no data
        let table = match project(&sheet.grid) {
            Ok(table) if table.row_count() > 0 => table,
            Ok(_) | Err(DraftError::NoData) => {
                self.status = STATUS_NO_ROWS.to_string();
                return Err(DraftError::NoData);
            }
            Err(e) => return Err(e),
        };

        let count = table.row_count();
        self.status = format!("Loaded {} rows from {}.", count, sheet.name);
        info!(sheet = %sheet.name, rows = count, "loaded sheet");

        self.sheet_name = Some(sheet.name);
        self.table = Some(table);
        Ok(count)
    }

    /// Read a workbook from disk and load its first sheet
    pub fn load_file(&mut self, path: &Path) -> DraftResult<usize> {
        self.reset();
        let sheet = SpreadsheetImporter::new(path).import()?;
        self.load_sheet(sheet)
    }

    /// Generate drafts for every loaded row.
    ///
    /// Validation happens before any row is processed; on failure the
    /// previous drafts are kept.
    pub fn generate(&mut self, mapping: &RoleMapping, templates: &Templates) -> DraftResult<usize> {
        let generator = match DraftGenerator::new(mapping.clone(), templates.clone()) {
            Ok(generator) => generator,
            Err(e) => {
                if matches!(e, DraftError::IncompleteMapping(_)) {
                    self.status = STATUS_INCOMPLETE_MAPPING.to_string();
                }
                return Err(e);
            }
        };

        if let Err(e) = self.check_columns(mapping) {
            self.status = e.to_string();
            return Err(e);
        }

        let drafts = generator.generate(self.rows());
        let count = drafts.len();
        self.status = format!("Generated {} drafts.", count);
        info!(drafts = count, "generated drafts");

        self.drafts = Some(drafts);
        Ok(count)
    }

    /// Every mapped column must be one of the loaded headers
    fn check_columns(&self, mapping: &RoleMapping) -> DraftResult<()> {
        let Some(table) = &self.table else {
            return Err(DraftError::Validation("No spreadsheet loaded".to_string()));
        };
        let headers = &table.headers;
        for role in Role::ALL {
            let column = mapping.column(role);
            if !headers.iter().any(|h| h == column) {
                return Err(DraftError::UnknownColumn {
                    role,
                    column: column.to_string(),
                    suggestion: find_similar(column, headers),
                });
            }
        }
        Ok(())
    }

    pub fn stage(&self) -> Stage {
        match (&self.table, &self.drafts) {
            (None, _) => Stage::Empty,
            (Some(_), None) => Stage::Loaded,
            (Some(_), Some(_)) => Stage::Generated,
        }
    }

    pub fn controls(&self) -> Controls {
        let loaded = self.table.is_some();
        Controls {
            mapping: loaded,
            generate: loaded,
            export: !self.drafts().is_empty(),
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn sheet_name(&self) -> Option<&str> {
        self.sheet_name.as_deref()
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn headers(&self) -> &[String] {
        self.table.as_ref().map(|t| t.headers.as_slice()).unwrap_or(&[])
    }

    pub fn rows(&self) -> &[RowRecord] {
        self.table.as_ref().map(|t| t.rows.as_slice()).unwrap_or(&[])
    }

    pub fn drafts(&self) -> &[Draft] {
        self.drafts.as_deref().unwrap_or(&[])
    }

    /// The first `limit` drafts
    pub fn preview(&self, limit: usize) -> &[Draft] {
        let drafts = self.drafts();
        &drafts[..drafts.len().min(limit)]
    }

    /// Serialize the current drafts
    pub fn export(&self, format: ExportFormat) -> DraftResult<String> {
        if !self.controls().export {
            return Err(DraftError::NothingToExport);
        }
        writer::render(self.drafts(), format)
    }

    /// Serialize the current drafts to a file
    pub fn export_to(&self, format: ExportFormat, path: &Path) -> DraftResult<()> {
        if !self.controls().export {
            return Err(DraftError::NothingToExport);
        }
        writer::write_drafts(self.drafts(), format, path)?;
        info!(format = %format, path = %path.display(), "exported drafts");
        Ok(())
    }
}
