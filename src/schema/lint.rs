//! # Schema Linter
//!
//! Checks a loaded [`Schema`] for problems that would make generated code
//! ambiguous or wrong before any template is expanded.
//!
//! ## Checks Performed
//!
//! 1. **Empty names** - every component and attribute needs a name
//! 2. **Duplicate component names** - names are unique, case-sensitive
//! 3. **Duplicate attribute names** - unique within one component
//! 4. **Undeclared flags** - when the schema declares `flags`, components and
//!    attributes may only use declared keys
//! 5. **Flag type mismatch** - a flag value whose kind (bool vs string)
//!    differs from its declared default
//! 6. **Identifier shape** - names that are not plain identifiers (warning)

use super::types::{FlagValue, Schema};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Severity level for schema issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Error - generation refuses to run
    Error,
    /// Warning - generation runs, but the schema is probably not what was meant
    Warning,
}

impl fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintSeverity::Error => write!(f, "error"),
            LintSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// A problem found in a schema
#[derive(Debug, Clone)]
pub struct SchemaIssue {
    /// Where the issue occurred (e.g. "component:Point", "component:Point.x")
    pub location: String,
    pub severity: LintSeverity,
    /// Machine-readable kind (e.g. "duplicate_component")
    pub kind: String,
    pub message: String,
}

impl SchemaIssue {
    pub fn new(
        location: impl Into<String>,
        severity: LintSeverity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        SchemaIssue {
            location: location.into(),
            severity,
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Lint a schema and return every issue found, in declaration order.
pub fn lint_schema(schema: &Schema) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();

    let declared: HashMap<&str, &FlagValue> = schema
        .flags
        .iter()
        .map(|f| (f.name.as_str(), &f.default))
        .collect();

    let mut seen_flags = HashSet::new();
    for flag in &schema.flags {
        if !seen_flags.insert(flag.name.as_str()) {
            issues.push(SchemaIssue::new(
                format!("flag:{}", flag.name),
                LintSeverity::Error,
                "duplicate_flag",
                format!("Flag '{}' is declared more than once", flag.name),
            ));
        }
    }

    let mut seen_components = HashSet::new();
    for (idx, comp) in schema.components.iter().enumerate() {
        let location = if comp.name.is_empty() {
            format!("component[{idx}]")
        } else {
            format!("component:{}", comp.name)
        };

        check_name(&mut issues, &location, &comp.name, "component");
        if !comp.name.is_empty() && !seen_components.insert(comp.name.as_str()) {
            issues.push(SchemaIssue::new(
                &location,
                LintSeverity::Error,
                "duplicate_component",
                format!("Component '{}' is defined more than once", comp.name),
            ));
        }
        check_flags(&mut issues, &location, &comp.flags, &declared);

        let mut seen_attrs = HashSet::new();
        for (attr_idx, attr) in comp.attributes.iter().enumerate() {
            let attr_location = if attr.name.is_empty() {
                format!("{location}.attributes[{attr_idx}]")
            } else {
                format!("{location}.{}", attr.name)
            };
            check_name(&mut issues, &attr_location, &attr.name, "attribute");
            if !attr.name.is_empty() && !seen_attrs.insert(attr.name.as_str()) {
                issues.push(SchemaIssue::new(
                    &attr_location,
                    LintSeverity::Error,
                    "duplicate_attribute",
                    format!(
                        "Attribute '{}' is defined more than once on '{}'",
                        attr.name, comp.name
                    ),
                ));
            }
            check_flags(&mut issues, &attr_location, &attr.flags, &declared);
        }
    }

    issues
}

fn check_name(issues: &mut Vec<SchemaIssue>, location: &str, name: &str, what: &str) {
    if name.is_empty() {
        issues.push(SchemaIssue::new(
            location,
            LintSeverity::Error,
            format!("empty_{what}_name"),
            format!("A {what} has an empty name"),
        ));
    } else if !is_identifier(name) {
        issues.push(SchemaIssue::new(
            location,
            LintSeverity::Warning,
            "identifier_shape",
            format!("{what} name '{name}' is not a plain identifier"),
        ));
    }
}

fn check_flags(
    issues: &mut Vec<SchemaIssue>,
    location: &str,
    flags: &BTreeMap<String, FlagValue>,
    declared: &HashMap<&str, &FlagValue>,
) {
    // Without declarations any key is fine.
    if declared.is_empty() {
        return;
    }
    for (key, value) in flags {
        match declared.get(key.as_str()) {
            None => issues.push(SchemaIssue::new(
                location,
                LintSeverity::Error,
                "undeclared_flag",
                format!("Flag '{key}' is not declared in the schema 'flags' list"),
            )),
            Some(default) if !same_kind(default, value) => issues.push(SchemaIssue::new(
                location,
                LintSeverity::Error,
                "flag_type_mismatch",
                format!("Flag '{key}' is set to '{value}' but its default is '{default}'"),
            )),
            Some(_) => {}
        }
    }
}

fn same_kind(a: &FlagValue, b: &FlagValue) -> bool {
    matches!(
        (a, b),
        (FlagValue::Bool(_), FlagValue::Bool(_)) | (FlagValue::Text(_), FlagValue::Text(_))
    )
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether any issue blocks generation
pub fn has_errors(issues: &[SchemaIssue]) -> bool {
    issues.iter().any(|i| i.severity == LintSeverity::Error)
}

/// Print schema issues grouped by severity
pub fn print_schema_issues(issues: &[SchemaIssue]) {
    if issues.is_empty() {
        println!("✅ Schema is valid");
        return;
    }

    let errors: Vec<_> = issues
        .iter()
        .filter(|i| i.severity == LintSeverity::Error)
        .collect();
    let warnings: Vec<_> = issues
        .iter()
        .filter(|i| i.severity == LintSeverity::Warning)
        .collect();

    println!("\n📋 Schema lint results:");
    println!("   {} error(s), {} warning(s)\n", errors.len(), warnings.len());

    if !errors.is_empty() {
        println!("❌ Errors (must fix):");
        for issue in &errors {
            println!("   [{}] {}", issue.kind, issue.location);
            println!("      {}", issue.message);
        }
        println!();
    }

    if !warnings.is_empty() {
        println!("⚠️  Warnings:");
        for issue in &warnings {
            println!("   [{}] {}", issue.kind, issue.location);
            println!("      {}", issue.message);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::schema::{AttributeDef, ComponentDef, FlagDef};

    fn kinds(issues: &[SchemaIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.kind.as_str()).collect()
    }

    #[test]
    fn test_clean_schema_has_no_issues() {
        let schema = Schema::new(vec![ComponentDef::new("Point")
            .with_attribute(AttributeDef::new("x", "float", "0.0f"))
            .with_attribute(AttributeDef::new("y", "float", "0.0f"))]);
        assert!(lint_schema(&schema).is_empty());
    }

    #[test]
    fn test_duplicate_component_and_attribute() {
        let schema = Schema::new(vec![
            ComponentDef::new("Point")
                .with_attribute(AttributeDef::new("x", "float", "0"))
                .with_attribute(AttributeDef::new("x", "float", "0")),
            ComponentDef::new("Point"),
        ]);
        let issues = lint_schema(&schema);
        assert_eq!(kinds(&issues), vec!["duplicate_attribute", "duplicate_component"]);
        assert!(has_errors(&issues));
    }

    #[test]
    fn test_component_names_are_case_sensitive() {
        let schema = Schema::new(vec![ComponentDef::new("Point"), ComponentDef::new("point")]);
        assert!(lint_schema(&schema).is_empty());
    }

    #[test]
    fn test_undeclared_and_mismatched_flags() {
        let mut schema = Schema::new(vec![ComponentDef::new("Point")
            .with_flag("SAVABLE", FlagValue::Text("yes".into()))
            .with_flag("OTHER", FlagValue::Bool(true))]);
        schema.flags.push(FlagDef {
            name: "SAVABLE".into(),
            default: FlagValue::Bool(true),
        });
        let issues = lint_schema(&schema);
        assert_eq!(kinds(&issues), vec!["undeclared_flag", "flag_type_mismatch"]);
    }

    #[test]
    fn test_identifier_shape_is_a_warning() {
        let schema = Schema::new(vec![ComponentDef::new("My Component")]);
        let issues = lint_schema(&schema);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, LintSeverity::Warning);
        assert!(!has_errors(&issues));
    }

    #[test]
    fn test_empty_names() {
        let schema = Schema::new(vec![
            ComponentDef::new("").with_attribute(AttributeDef::new("", "int", "0"))
        ]);
        assert_eq!(
            kinds(&lint_schema(&schema)),
            vec!["empty_component_name", "empty_attribute_name"]
        );
    }
}
