use crate::types::Role;
use thiserror::Error;

pub type DraftResult<T> = Result<T, DraftError>;

#[derive(Error, Debug)]
pub enum DraftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("No rows found in the spreadsheet")]
    NoData,

    #[error("Incomplete column mapping: no column selected for {}", join_roles(.0))]
    IncompleteMapping(Vec<Role>),

    #[error("Column '{column}' selected for '{role}' was not found in the spreadsheet{}", suggestion_suffix(.suggestion))]
    UnknownColumn {
        role: Role,
        column: String,
        suggestion: Option<String>,
    },

    #[error("Nothing to export: no drafts have been generated")]
    NothingToExport,

    #[error("Template error: {0}")]
    Template(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

/// Find the header closest to `name`: case-insensitive exact match first,
/// then prefix, then substring.
pub fn find_similar(name: &str, headers: &[String]) -> Option<String> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    if let Some(h) = headers.iter().find(|h| h.to_lowercase() == needle) {
        return Some(h.clone());
    }

    if let Some(h) = headers
        .iter()
        .find(|h| h.to_lowercase().starts_with(&needle))
    {
        return Some(h.clone());
    }

    headers
        .iter()
        .find(|h| {
            let lower = h.trim().to_lowercase();
            !lower.is_empty() && (lower.contains(&needle) || needle.contains(&lower))
        })
        .cloned()
}
