//! Schema placeholder expansion for migration SQL.
//!
//! | Token            | Schema `s`        | No schema            |
//! |------------------|-------------------|----------------------|
//! | `{{schema}}`     | `s`               | error                |
//! | `{{schema?}}`    | `s.`              | (removed)            |
//! | `\{{schema}}`    | `{{schema}}`      | `{{schema}}`         |
//! | `\{{schema?}}`   | `{{schema?}}`     | `{{schema?}}`        |
//!
//! Tokens are matched in a single left-to-right pass; expanded text is never
//! rescanned.

use crate::error::{MigrateError, Result};

const REQUIRED: &str = "{{schema}}";
const OPTIONAL: &str = "{{schema?}}";
const ESCAPED_REQUIRED: &str = "\\{{schema}}";
const ESCAPED_OPTIONAL: &str = "\\{{schema?}}";

/// Expand schema placeholders in `sql`.
///
/// An empty `schema` counts as no schema.
pub fn expand(sql: &str, schema: Option<&str>) -> Result<String> {
    if !sql.contains("{{schema") {
        return Ok(sql.to_string());
    }

    let schema = schema.filter(|s| !s.is_empty());
    let mut out = String::with_capacity(sql.len());
    let mut rest = sql;

    while !rest.is_empty() {
        if rest.starts_with(ESCAPED_REQUIRED) {
            out.push_str(REQUIRED);
            rest = &rest[ESCAPED_REQUIRED.len()..];
        } else if rest.starts_with(ESCAPED_OPTIONAL) {
            out.push_str(OPTIONAL);
            rest = &rest[ESCAPED_OPTIONAL.len()..];
        } else if rest.starts_with(OPTIONAL) {
            if let Some(schema) = schema {
                out.push_str(schema);
                out.push('.');
            }
            rest = &rest[OPTIONAL.len()..];
        } else if rest.starts_with(REQUIRED) {
            let schema = schema.ok_or_else(|| {
                MigrateError::Placeholder(format!("{} used but schema not set", REQUIRED))
            })?;
            out.push_str(schema);
            rest = &rest[REQUIRED.len()..];
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_tokens_unchanged() {
        let sql = "CREATE TABLE t (name VARCHAR(10) DEFAULT '{{other}}')";
        assert_eq!(expand(sql, None).unwrap(), sql);
        assert_eq!(expand(sql, Some("app")).unwrap(), sql);
        assert_eq!(expand("", None).unwrap(), "");
    }

    #[test]
    fn test_required_token() {
        assert_eq!(
            expand("CREATE TABLE {{schema}}.users (id INT)", Some("APP")).unwrap(),
            "CREATE TABLE APP.users (id INT)"
        );

        let err = expand("{{schema}}", None).unwrap_err();
        assert!(matches!(err, MigrateError::Placeholder(_)));
        assert_eq!(err.to_string(), "{{schema}} used but schema not set");
    }

    #[test]
    fn test_empty_schema_counts_as_unset() {
        assert!(expand("{{schema}}", Some("")).is_err());
        assert_eq!(expand("{{schema?}}x", Some("")).unwrap(), "x");
    }

    #[test]
    fn test_optional_token() {
        assert_eq!(expand("{{schema?}}x", None).unwrap(), "x");
        assert_eq!(expand("{{schema?}}x", Some("t")).unwrap(), "t.x");
    }

    #[test]
    fn test_escaped_tokens() {
        assert_eq!(expand("\\{{schema}}", Some("t")).unwrap(), "{{schema}}");
        assert_eq!(expand("\\{{schema?}}", None).unwrap(), "{{schema?}}");
        // escape does not need a schema
        assert_eq!(expand("\\{{schema}}", None).unwrap(), "{{schema}}");
    }

    #[test]
    fn test_mixed_tokens() {
        let sql = "INSERT INTO {{schema?}}notes VALUES ('\\{{schema}}', '{{schema}}')";
        assert_eq!(
            expand(sql, Some("s1")).unwrap(),
            "INSERT INTO s1.notes VALUES ('{{schema}}', 's1')"
        );
    }

    #[test]
    fn test_multibyte_text_preserved() {
        assert_eq!(
            expand("-- Übersicht ✓\nSELECT * FROM {{schema}}.Größe", Some("ß")).unwrap(),
            "-- Übersicht ✓\nSELECT * FROM ß.Größe"
        );
    }

    #[test]
    fn test_incomplete_token_copied() {
        assert_eq!(expand("{{schema", Some("t")).unwrap(), "{{schema");
        assert_eq!(expand("{{schema?}", None).unwrap(), "{{schema?}");
    }
}
