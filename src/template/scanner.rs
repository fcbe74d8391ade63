//! Splits template text into literal spans and marked blocks.

use super::condition::{parse_condition, Condition};
use super::token::tokenize_line;
use super::types::{Block, BodyLine, Segment, TemplateFile};
use crate::validator::{normalize, Diagnostic, TemplateError};

pub const DEFAULT_BEGIN_MARKER: &str = "DATAMATIC_BEGIN";
pub const DEFAULT_END_MARKER: &str = "DATAMATIC_END";

/// The words that open and close a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub begin: String,
    pub end: String,
}

impl Default for Markers {
    fn default() -> Self {
        Markers {
            begin: DEFAULT_BEGIN_MARKER.to_string(),
            end: DEFAULT_END_MARKER.to_string(),
        }
    }
}

enum LineKind<'a> {
    /// Begin marker; carries the text after it (the condition).
    Begin(&'a str),
    End,
    Text,
}

impl Markers {
    fn classify<'a>(&self, content: &'a str) -> LineKind<'a> {
        let trimmed = content.trim_start();
        if let Some(rest) = strip_marker(trimmed, &self.begin) {
            LineKind::Begin(rest)
        } else if strip_marker(trimmed, &self.end).is_some() {
            LineKind::End
        } else {
            LineKind::Text
        }
    }
}

/// `marker` followed by end of line or whitespace.
fn strip_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(marker)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest),
        Some(_) => None,
    }
}

/// Split a raw line into its content and its terminator.
fn split_ending(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}

struct OpenBlock {
    begin_line: usize,
    condition: Option<Condition>,
    /// False when the condition failed to parse; the block is then dropped.
    usable: bool,
    body: Vec<BodyLine>,
}

/// Scan `source`, collecting every structural, condition and token error
/// instead of stopping at the first.
///
/// The returned file holds every block that could be parsed, so callers can
/// keep validating it; it must not be emitted when diagnostics are present.
pub(crate) fn scan_lenient(source: &str, markers: &Markers) -> (TemplateFile, Vec<Diagnostic>) {
    let mut segments = Vec::new();
    let mut diagnostics = Vec::new();
    let mut literal = String::new();
    let mut open: Option<OpenBlock> = None;

    for (idx, raw) in source.split_inclusive('\n').enumerate() {
        let line_no = idx + 1;
        let (content, ending) = split_ending(raw);

        match markers.classify(content) {
            LineKind::Begin(rest) => {
                if let Some(outer) = &open {
                    diagnostics.push(Diagnostic::new(
                        line_no,
                        TemplateError::NestedBlock {
                            outer: outer.begin_line,
                            inner: line_no,
                        },
                    ));
                    continue;
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                let (condition, usable) = match parse_condition(rest) {
                    Ok(c) => (c, true),
                    Err(e) => {
                        diagnostics.push(Diagnostic::new(line_no, e));
                        (None, false)
                    }
                };
                open = Some(OpenBlock {
                    begin_line: line_no,
                    condition,
                    usable,
                    body: Vec::new(),
                });
            }
            LineKind::End => match open.take() {
                Some(block) if block.usable => segments.push(Segment::Block(Block {
                    begin_line: block.begin_line,
                    end_line: line_no,
                    condition: block.condition,
                    body: block.body,
                })),
                Some(_) => {}
                None => diagnostics.push(Diagnostic::new(line_no, TemplateError::UnmatchedEnd)),
            },
            LineKind::Text => match open.as_mut() {
                Some(block) => {
                    let mut errors = Vec::new();
                    let pieces = tokenize_line(content, &mut errors);
                    diagnostics.extend(errors.into_iter().map(|e| Diagnostic::new(line_no, e)));
                    block.body.push(BodyLine::new(line_no, pieces, ending));
                }
                None => literal.push_str(raw),
            },
        }
    }

    if let Some(block) = open {
        diagnostics.push(Diagnostic::new(
            block.begin_line,
            TemplateError::UnterminatedBlock {
                begin: block.begin_line,
            },
        ));
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    normalize(&mut diagnostics);
    (TemplateFile { segments }, diagnostics)
}

/// Scan template text using the default markers.
pub fn scan(source: &str) -> Result<TemplateFile, Vec<Diagnostic>> {
    scan_with(source, &Markers::default())
}

/// Scan template text, failing with every structural, condition and token
/// error found.
pub fn scan_with(source: &str, markers: &Markers) -> Result<TemplateFile, Vec<Diagnostic>> {
    let (file, diagnostics) = scan_lenient(source, markers);
    if diagnostics.is_empty() {
        Ok(file)
    } else {
        Err(diagnostics)
    }
}
