//! # Generator Module
//!
//! Turns scanned templates into generated text, and runs that over a whole
//! directory of template files.
//!
//! ## Architecture
//!
//! ```text
//! template text → scan → TemplateFile ─┐
//!                                      ├→ expand each block → assemble → output text
//! schema ──────────────────────────────┘
//! ```
//!
//! 1. **Expand** - for each block, filter the schema's components by the
//!    block condition (schema order is kept), then emit the body once per
//!    component. Lines holding an `Attr::` token are repeated once per
//!    attribute of that component.
//! 2. **Separators** - position directives such as `if_not_last(,)` are
//!    answered from the index of the current component or attribute within
//!    the filtered collection, so excluded items never leave a dangling
//!    separator behind.
//! 3. **Assemble** - every block is expanded before any text is produced;
//!    literal spans and block output are then concatenated in template order.
//!    A template with any diagnostic produces no output at all.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use datamatic::generator::render;
//! use datamatic::schema::{ComponentDef, Schema};
//!
//! let schema = Schema::new(vec![ComponentDef::new("Point"), ComponentDef::new("Name")]);
//! let text = "DATAMATIC_BEGIN\n\"{{Comp::name}}\"{{Comp::if_not_last(,)}}\nDATAMATIC_END\n";
//! assert_eq!(render(text, &schema).unwrap(), "\"Point\",\n\"Name\"\n");
//! ```
//!
//! For whole directories see [`generate_templates`], which discovers
//! `*.dm.*` files, renders them in parallel and writes only what changed.

mod assemble;
mod expand;
mod project;
mod separator;

pub use assemble::{assemble, render, render_with};
pub use expand::expand_block;
pub use project::{
    discover_templates, generate_jobs, generate_templates, output_path_for, GenerateOptions,
    GenerationSummary, TemplateJob, TemplateOutcome, TemplateReport,
};
pub use separator::Position;
