//! Template diagnostics.
//!
//! Every problem found while scanning or expanding a template becomes a
//! [`Diagnostic`]: a [`TemplateError`] plus the 1-based line it was found on.
//! Diagnostics are collected rather than short-circuited so a single run
//! reports everything wrong with a template at once.

use crate::template::Scope;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Broad class of a template error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The block markup itself is malformed.
    Structural,
    /// A token cannot be resolved against the schema or the current context.
    Reference,
    /// A block condition clause is malformed.
    Condition,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Structural => write!(f, "structural"),
            ErrorCategory::Reference => write!(f, "reference"),
            ErrorCategory::Condition => write!(f, "condition"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum TemplateError {
    #[error("block begins at line {inner} while the block opened at line {outer} is still open; blocks cannot be nested")]
    NestedBlock { outer: usize, inner: usize },

    #[error("block opened at line {begin} is never closed")]
    UnterminatedBlock { begin: usize },

    #[error("end marker without a matching begin marker")]
    UnmatchedEnd,

    #[error("malformed condition clause '{clause}': {reason}")]
    MalformedCondition { clause: String, reason: String },

    #[error("malformed token '{raw}': {reason}")]
    MalformedToken { raw: String, reason: String },

    #[error("unknown scope '{scope}' in '{raw}' (expected 'Comp' or 'Attr')")]
    UnknownScope { scope: String, raw: String },

    #[error("unknown directive '{name}' in {scope} scope")]
    UnknownDirective { scope: Scope, name: String },

    #[error("directive '{name}' expects {expected} argument(s), got {actual}")]
    DirectiveArguments {
        name: String,
        expected: String,
        actual: usize,
    },

    #[error("'{path}' cannot be resolved on {scope} '{owner}'")]
    UnknownField {
        scope: Scope,
        path: String,
        owner: String,
    },
}

impl TemplateError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TemplateError::NestedBlock { .. }
            | TemplateError::UnterminatedBlock { .. }
            | TemplateError::UnmatchedEnd => ErrorCategory::Structural,
            TemplateError::MalformedCondition { .. } => ErrorCategory::Condition,
            TemplateError::MalformedToken { .. }
            | TemplateError::UnknownScope { .. }
            | TemplateError::UnknownDirective { .. }
            | TemplateError::DirectiveArguments { .. }
            | TemplateError::UnknownField { .. } => ErrorCategory::Reference,
        }
    }

    /// Short machine-readable name, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            TemplateError::NestedBlock { .. } => "NestedBlock",
            TemplateError::UnterminatedBlock { .. } => "UnterminatedBlock",
            TemplateError::UnmatchedEnd => "UnmatchedEnd",
            TemplateError::MalformedCondition { .. } => "MalformedCondition",
            TemplateError::MalformedToken { .. } => "MalformedToken",
            TemplateError::UnknownScope { .. } => "UnknownScope",
            TemplateError::UnknownDirective { .. } => "UnknownDirective",
            TemplateError::DirectiveArguments { .. } => "DirectiveArguments",
            TemplateError::UnknownField { .. } => "UnknownField",
        }
    }
}

/// A template error located at a 1-based line of the template source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub line: usize,
    pub error: TemplateError,
}

impl Diagnostic {
    pub fn new(line: usize, error: TemplateError) -> Self {
        Diagnostic { line, error }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: [{}] {}", self.line, self.error.kind(), self.error)
    }
}

impl std::error::Error for Diagnostic {}

/// Order diagnostics by line, keeping discovery order within a line, and
/// drop exact repeats.
pub(crate) fn normalize(diagnostics: &mut Vec<Diagnostic>) {
    diagnostics.sort_by_key(|d| d.line);
    let mut seen = HashSet::with_capacity(diagnostics.len());
    diagnostics.retain(|d| seen.insert(d.clone()));
}

/// Print the diagnostics of one template to stderr.
pub fn print_diagnostics(file: &Path, diagnostics: &[Diagnostic]) {
    eprintln!(
        "\n❌ {}: {} error(s), no output written:",
        file.display(),
        diagnostics.len()
    );
    for d in diagnostics {
        eprintln!(
            "   {}:{}: [{}] {}",
            file.display(),
            d.line,
            d.error.kind(),
            d.error
        );
    }
}
