//! # datamatic
//!
//! **datamatic** is a schema-driven source generator. It expands marked
//! regions inside ordinary source files (C++, Lua, anything text) once per
//! component of a declarative schema, so the boilerplate that has to list
//! every component and every field stays in sync with one document.
//!
//! ## Overview
//!
//! A schema lists components. Each component has ordered attributes
//! (`name`, `type`, `default`), a map of flags and any number of extra
//! nested values. A template is a normal file containing blocks:
//!
//! ```text
//! DATAMATIC_BEGIN SAVABLE=true
//! struct {{Comp::name}} {
//!     {{Attr::type}} {{Attr::name}} = {{Attr::default}};
//! };
//! DATAMATIC_END
//! ```
//!
//! Each block is emitted once per component whose flags satisfy the block
//! condition, in schema order. A line with an `Attr::` token is repeated
//! once per attribute. Everything outside blocks is copied byte for byte.
//!
//! ## Architecture
//!
//! - **[`schema`]** - Schema model, YAML/JSON/TOML loading and schema lint
//! - **[`template`]** - Block scanner, condition parser and token parser
//! - **[`generator`]** - Block expansion, separator resolution, output
//!   assembly and directory runs
//! - **[`validator`]** - Located diagnostics and error taxonomy
//! - **[`config`]** - `datamatic.toml` generator configuration
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - The `datamatic` command line
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant CLI as CLI<br/>(datamatic)
//!     participant Schema as schema::load_schema
//!     participant Project as generator::project
//!     participant Scan as template::scan
//!     participant Expand as generator::expand
//!     participant FS as File System
//!
//!     User->>CLI: datamatic generate --schema c.yaml --dir src
//!     CLI->>Schema: load_schema + lint_schema
//!     Schema-->>CLI: Schema
//!     CLI->>Project: generate_templates(dir)
//!     Project->>FS: walk dir for *.dm.* files
//!     par each template (rayon)
//!         Project->>Scan: scan(text)
//!         Scan-->>Project: TemplateFile | diagnostics
//!         Project->>Expand: expand every block
//!         Expand-->>Project: text | diagnostics
//!         Project->>FS: write output if changed
//!     end
//!     Project-->>CLI: GenerationSummary
//!     CLI-->>User: report + exit code
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use datamatic::generator::render;
//! use datamatic::schema::{AttributeDef, ComponentDef, FlagValue, Schema};
//!
//! let schema = Schema::new(vec![
//!     ComponentDef::new("PointComponent")
//!         .with_flag("FLAG_A", FlagValue::Bool(true))
//!         .with_attribute(AttributeDef::new("x", "float", "0.0"))
//!         .with_attribute(AttributeDef::new("y", "float", "0.0")),
//!     ComponentDef::new("TemporaryComponent"),
//! ]);
//!
//! let template = "\
//! DATAMATIC_BEGIN FLAG_A=true
//! struct {{Comp::name}} {
//!     {{Attr::type}} {{Attr::name}};
//! };
//! DATAMATIC_END
//! ";
//!
//! let out = render(template, &schema).unwrap();
//! assert_eq!(out, "struct PointComponent {\n    float x;\n    float y;\n};\n");
//! ```
//!
//! ## Error Handling
//!
//! A template either renders completely or not at all. Every problem found
//! (nested or unterminated blocks, bad conditions, unknown scopes, fields or
//! directives) is collected as a [`validator::Diagnostic`] with its line, and
//! the whole list is returned instead of output.

pub mod cli;
pub mod config;
pub mod generator;
pub mod logging;
pub mod schema;
pub mod template;
pub mod validator;

pub use generator::{assemble, expand_block, render, render_with};
pub use schema::{load_schema, Schema};
pub use template::{scan, scan_with, Markers, TemplateFile};
pub use validator::{Diagnostic, ErrorCategory, TemplateError};
