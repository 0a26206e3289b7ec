//! Draft serializers - JSON and CSV export
//!
//! Both exporters are stateless and produce the full output in one call.

use crate::error::{DraftError, DraftResult};
use crate::types::{Draft, Role};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// `email-drafts.json` / `email-drafts.csv`
    pub fn default_file_name(&self) -> String {
        format!("email-drafts.{}", self.extension())
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(DraftError::Validation(format!(
                "Unknown export format '{}' (expected json or csv)",
                other
            ))),
        }
    }
}

/// Pretty-printed JSON array with 2-space indentation
pub fn to_json(drafts: &[Draft]) -> DraftResult<String> {
    Ok(serde_json::to_string_pretty(drafts)?)
}

/// CSV with a `to,subject,body` header, lines joined by `\n`
pub fn to_csv(drafts: &[Draft]) -> String {
    let header = Role::ALL
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = Vec::with_capacity(drafts.len() + 1);
    lines.push(header);
    for draft in drafts {
        let fields: Vec<Cow<'_, str>> = Role::ALL
            .iter()
            .map(|role| escape_csv_field(draft.field(*role)))
            .collect();
        lines.push(fields.join(","));
    }
    lines.join("\n")
}

/// Quote a field containing a comma, newline, or double quote; inner quotes are doubled
pub fn escape_csv_field(value: &str) -> Cow<'_, str> {
    if value.contains(',') || value.contains('\n') || value.contains('"') {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Serialize drafts in the given format
pub fn render(drafts: &[Draft], format: ExportFormat) -> DraftResult<String> {
    match format {
        ExportFormat::Json => to_json(drafts),
        ExportFormat::Csv => Ok(to_csv(drafts)),
    }
}

/// Serialize drafts and write the whole file in one call
pub fn write_drafts(drafts: &[Draft], format: ExportFormat, path: &Path) -> DraftResult<()> {
    let content = render(drafts, format)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_escape_plain_field() {
        assert!(matches!(escape_csv_field("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_escape_comma_and_quote() {
        assert_eq!(escape_csv_field("a,b\"c"), "\"a,b\"\"c\"");
    }

    #[test]
    fn test_escape_newline() {
        assert_eq!(escape_csv_field("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn test_carriage_return_alone_not_quoted() {
        assert_eq!(escape_csv_field("a\rb"), "a\rb");
    }

    #[test]
    fn test_to_csv_header_only_when_empty() {
        assert_eq!(to_csv(&[]), "to,subject,body");
    }

    #[test]
    fn test_to_csv_lines() {
        let drafts = vec![
            Draft::new("ann@x.com", "Hi Ann", "Hello, Ann"),
            Draft::new("bob@x.com", "Hi Bob", "plain"),
        ];
        assert_eq!(
            to_csv(&drafts),
            "to,subject,body\nann@x.com,Hi Ann,\"Hello, Ann\"\nbob@x.com,Hi Bob,plain"
        );
    }

    #[test]
    fn test_to_json_pretty() {
        let drafts = vec![Draft::new("a", "b", "c")];
        assert_eq!(
            to_json(&drafts).unwrap(),
            "[\n  {\n    \"to\": \"a\",\n    \"subject\": \"b\",\n    \"body\": \"c\"\n  }\n]"
        );
    }

    #[test]
    fn test_to_json_empty() {
        assert_eq!(to_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!(" CSV ".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_default_file_names() {
        assert_eq!(ExportFormat::Json.default_file_name(), "email-drafts.json");
        assert_eq!(ExportFormat::Csv.default_file_name(), "email-drafts.csv");
    }

    #[test]
    fn test_write_drafts() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("email-drafts.csv");
        write_drafts(&[Draft::new("a", "b", "c")], ExportFormat::Csv, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "to,subject,body\na,b,c");
    }
}
