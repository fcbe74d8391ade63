//! # Schema Module
//!
//! In-memory model of the component schema that drives generation, plus the
//! loader that reads it from YAML, JSON or TOML and a linter that checks it.
//!
//! A schema is an ordered list of [`ComponentDef`]s. Each component carries
//! ordered [`AttributeDef`]s, a map of [`FlagValue`]s used by block
//! conditions, and a tree of nested [`Value`]s reachable from templates by
//! dotted path.

mod lint;
mod load;
mod types;

pub use lint::{has_errors, lint_schema, print_schema_issues, LintSeverity, SchemaIssue};
pub use load::{load_schema, parse_schema, SchemaFormat};
pub use types::{AttributeDef, ComponentDef, FlagDef, FlagValue, Schema, Value};

pub(crate) use types::lookup_path;
