//! # Template Module
//!
//! Parses template text into literal spans and marked blocks.
//!
//! A block opens on a line whose first non-whitespace text is the begin
//! marker (`DATAMATIC_BEGIN` by default), optionally followed by
//! `KEY=VALUE` clauses, and closes on a line starting with the end marker.
//! Body lines are split into text and `{{Comp::...}}` / `{{Attr::...}}`
//! tokens when scanned, so expansion never re-parses text.
//!
//! Scanning never looks at a schema. Field references are resolved later,
//! by the generator.

mod condition;
mod scanner;
mod token;
mod types;

pub use condition::{parse_condition, Clause, Condition, FlagState};
pub use scanner::{scan, scan_with, Markers, DEFAULT_BEGIN_MARKER, DEFAULT_END_MARKER};
pub use token::{parse_token, tokenize_line};
pub use types::{Block, BodyLine, Directive, Piece, Scope, Segment, TemplateFile, Token, TokenKind};

pub(crate) use scanner::scan_lenient;
