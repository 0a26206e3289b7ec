//! Draft generator - row records + role mapping + templates → drafts

use crate::core::template::TemplateResolver;
use crate::error::{DraftError, DraftResult};
use crate::types::{CellValue, Draft, Role, RoleMapping, RowRecord, Templates};
use tracing::debug;

/// Builds one draft per row record
#[derive(Debug, Clone)]
pub struct DraftGenerator {
    mapping: RoleMapping,
    templates: Templates,
    resolver: TemplateResolver,
}

impl DraftGenerator {
    /// Validate the mapping and prepare a generator.
    ///
    /// Fails with [`DraftError::IncompleteMapping`] when any role has no
    /// column selected.
    pub fn new(mapping: RoleMapping, templates: Templates) -> DraftResult<Self> {
        let missing = mapping.missing_roles();
        if !missing.is_empty() {
            return Err(DraftError::IncompleteMapping(missing));
        }

        Ok(Self {
            mapping,
            templates,
            resolver: TemplateResolver::new()?,
        })
    }

    /// Generate drafts for all rows, same length and order as the input
    pub fn generate(&self, rows: &[RowRecord]) -> Vec<Draft> {
        let drafts: Vec<Draft> = rows.iter().map(|row| self.draft_for(row)).collect();
        debug!(rows = rows.len(), drafts = drafts.len(), "generated drafts");
        drafts
    }

    /// Build the draft for a single row
    pub fn draft_for(&self, row: &RowRecord) -> Draft {
        let subject_source = self.source(Role::Subject, row);
        let body_source = self.source(Role::Body, row);

        Draft {
            to: cell_text(row, &self.mapping.to),
            subject: self.resolver.resolve(&subject_source, row),
            body: self.resolver.resolve(&body_source, row),
        }
    }

    /// Trimmed template when one is set, otherwise the mapped column value
    fn source(&self, role: Role, row: &RowRecord) -> String {
        match self.templates.for_role(role) {
            Some(template) => template.to_string(),
            None => cell_text(row, self.mapping.column(role)),
        }
    }
}

fn cell_text(row: &RowRecord, column: &str) -> String {
    row.get(column).map(CellValue::to_text).unwrap_or_default()
}

/// Validate the mapping, then generate one draft per row.
///
/// All-or-nothing: an incomplete mapping fails before any row is processed.
pub fn generate(
    rows: &[RowRecord],
    mapping: &RoleMapping,
    templates: &Templates,
) -> DraftResult<Vec<Draft>> {
    let generator = DraftGenerator::new(mapping.clone(), templates.clone())?;
    Ok(generator.generate(rows))
}
