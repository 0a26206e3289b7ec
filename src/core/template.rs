//! Placeholder substitution for `{{ name }}` templates
//!
//! Each placeholder is replaced by the stringified value of the named
//! column in the current row. Unknown names resolve to an empty string.
//! Substituted values are never re-scanned, and there is no escape for a
//! literal `{{...}}` sequence.

use crate::error::{find_similar, DraftError, DraftResult};
use crate::types::{CellValue, Role, RowRecord, Templates};
use regex::{Captures, Regex};

/// `{{`, optional whitespace, a key of non-`}` characters, optional whitespace, `}}`
const PLACEHOLDER_PATTERN: &str = r"\{\{\s*([^}]+)\s*\}\}";

/// Compiled placeholder scanner
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    pattern: Regex,
}

impl TemplateResolver {
    pub fn new() -> DraftResult<Self> {
        let pattern = Regex::new(PLACEHOLDER_PATTERN)
            .map_err(|e| DraftError::Template(format!("Regex error: {}", e)))?;
        Ok(Self { pattern })
    }

    /// Replace every placeholder with the matching context value
    pub fn resolve(&self, template: &str, context: &RowRecord) -> String {
        self.pattern
            .replace_all(template, |caps: &Captures| {
                context
                    .get(caps[1].trim())
                    .map(CellValue::to_text)
                    .unwrap_or_default()
            })
            .into_owned()
    }

    /// Trimmed placeholder keys in order of appearance (duplicates kept)
    pub fn placeholders<'t>(&self, template: &'t str) -> Vec<&'t str> {
        self.pattern
            .captures_iter(template)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .collect()
    }

    /// Placeholder keys that name none of `headers`, deduplicated
    pub fn unknown_placeholders(&self, template: &str, headers: &[String]) -> Vec<String> {
        let mut unknown: Vec<String> = Vec::new();
        for key in self.placeholders(template) {
            if !headers.iter().any(|h| h == key) && !unknown.iter().any(|u| u == key) {
                unknown.push(key.to_string());
            }
        }
        unknown
    }
}

/// One-shot convenience over [`TemplateResolver::resolve`]
pub fn resolve(template: &str, context: &RowRecord) -> DraftResult<String> {
    Ok(TemplateResolver::new()?.resolve(template, context))
}

/// One message per subject/body template placeholder that names no column.
///
/// Such placeholders still resolve to an empty string; this only reports them.
pub fn template_warnings(templates: &Templates, headers: &[String]) -> DraftResult<Vec<String>> {
    let resolver = TemplateResolver::new()?;
    let mut warnings = Vec::new();

    for role in [Role::Subject, Role::Body] {
        let Some(template) = templates.for_role(role) else {
            continue;
        };
        for key in resolver.unknown_placeholders(template, headers) {
            let mut message = format!(
                "{} template: placeholder '{{{{{}}}}}' matches no column and will be empty",
                role, key
            );
            if let Some(similar) = find_similar(&key, headers) {
                message.push_str(&format!(" (did you mean '{}'?)", similar));
            }
            warnings.push(message);
        }
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(pairs: &[(&str, CellValue)]) -> RowRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn resolver() -> TemplateResolver {
        TemplateResolver::new().unwrap()
    }

    #[test]
    fn test_resolve_simple() {
        let context = ctx(&[("Name", CellValue::text("Ann"))]);
        assert_eq!(resolver().resolve("Hi {{Name}}", &context), "Hi Ann");
    }

    #[test]
    fn test_resolve_unknown_key_is_empty() {
        let context = ctx(&[("Name", CellValue::text("Ann"))]);
        assert_eq!(resolver().resolve("Hi {{Unknown}}", &context), "Hi ");
    }

    #[test]
    fn test_resolve_whitespace_around_key() {
        let context = ctx(&[("First Name", CellValue::text("Ann"))]);
        assert_eq!(
            resolver().resolve("Hi {{   First Name \t}}!", &context),
            "Hi Ann!"
        );
    }

    #[test]
    fn test_resolve_stringifies_numbers_and_bools() {
        let context = ctx(&[
            ("Qty", CellValue::Number(3.0)),
            ("Price", CellValue::Number(9.5)),
            ("Paid", CellValue::Bool(false)),
        ]);
        assert_eq!(
            resolver().resolve("{{Qty}} x {{Price}} paid={{Paid}}", &context),
            "3 x 9.5 paid=false"
        );
    }

    #[test]
    fn test_resolve_empty_cell_is_empty() {
        let context = ctx(&[("Name", CellValue::Empty)]);
        assert_eq!(resolver().resolve("[{{Name}}]", &context), "[]");
    }

    #[test]
    fn test_resolve_passes_through_unmatched_braces() {
        let context = ctx(&[("a", CellValue::text("A"))]);
        assert_eq!(resolver().resolve("{a} {{}} {{a} }}", &context), "{a} {{}} {{a} }}");
        assert_eq!(resolver().resolve("{{a}}}", &context), "A}");
    }

    #[test]
    fn test_resolve_is_not_recursive() {
        let context = ctx(&[
            ("A", CellValue::text("{{B}}")),
            ("B", CellValue::text("boom")),
        ]);
        assert_eq!(resolver().resolve("{{A}}", &context), "{{B}}");
    }

    #[test]
    fn test_resolve_repeated_placeholder() {
        let context = ctx(&[("x", CellValue::text("1"))]);
        assert_eq!(resolver().resolve("{{x}}{{ x }}{{x}}", &context), "111");
    }

    #[test]
    fn test_resolve_multiline_template() {
        let context = ctx(&[("Name", CellValue::text("Ann"))]);
        assert_eq!(
            resolver().resolve("Dear {{Name}},\n\nThanks.\n", &context),
            "Dear Ann,\n\nThanks.\n"
        );
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let context = ctx(&[("Name", CellValue::text("Ann"))]);
        let r = resolver();
        let first = r.resolve("Hello {{Name}} {{Missing}}", &context);
        let second = r.resolve("Hello {{Name}} {{Missing}}", &context);
        assert_eq!(first, second);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            resolver().placeholders("{{ a }} and {{b}} and {{ a}}"),
            vec!["a", "b", "a"]
        );
        assert!(resolver().placeholders("no placeholders").is_empty());
    }

    #[test]
    fn test_unknown_placeholders() {
        let headers = vec!["Name".to_string()];
        assert_eq!(
            resolver().unknown_placeholders("{{Name}} {{Emial}} {{Emial}}", &headers),
            vec!["Emial"]
        );
    }

    #[test]
    fn test_template_warnings_with_suggestion() {
        let headers = vec!["Name".to_string(), "Email".to_string()];
        let templates = Templates::new(
            Some("Hi {{name}}".to_string()),
            Some("{{Name}}".to_string()),
        );
        let warnings = template_warnings(&templates, &headers).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("subject template: placeholder '{{name}}'"));
        assert!(warnings[0].contains("did you mean 'Name'?"));
    }

    #[test]
    fn test_template_warnings_none_without_templates() {
        let headers = vec!["Name".to_string()];
        assert!(template_warnings(&Templates::default(), &headers)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_resolve_free_function() {
        let context = ctx(&[("Name", CellValue::text("Ann"))]);
        assert_eq!(resolve("Hi {{Name}}", &context).unwrap(), "Hi Ann");
    }
}
