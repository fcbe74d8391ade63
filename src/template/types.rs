use super::condition::Condition;
use std::fmt;

/// What a token resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// `Comp::` - the component the block is currently expanding.
    Component,
    /// `Attr::` - the attribute the current line is being repeated for.
    Attribute,
}

impl Scope {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Comp" => Some(Scope::Component),
            "Attr" => Some(Scope::Attribute),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Scope::Component => "Comp",
            Scope::Attribute => "Attr",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Component => write!(f, "component"),
            Scope::Attribute => write!(f, "attribute"),
        }
    }
}

/// The closed set of directive calls a token may make.
///
/// The position directives are pure queries on the enclosing iteration: they
/// never change which items are emitted or in what order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `if_first(text)`
    IfFirst(String),
    /// `if_not_first(text)`
    IfNotFirst(String),
    /// `if_last(text)`
    IfLast(String),
    /// `if_not_last(text)`, the list separator.
    IfNotLast(String),
    /// `if_nth_else(n|yes|no)`; negative `n` counts from the end.
    IfNthElse { n: i64, yes: String, no: String },
    /// `attr_count()`, component scope only.
    AttrCount,
    /// `attr_list(field|separator[|format])`, component scope only.
    AttrList {
        field: String,
        separator: String,
        format: Option<String>,
    },
}

impl Directive {
    pub fn name(&self) -> &'static str {
        match self {
            Directive::IfFirst(_) => "if_first",
            Directive::IfNotFirst(_) => "if_not_first",
            Directive::IfLast(_) => "if_last",
            Directive::IfNotLast(_) => "if_not_last",
            Directive::IfNthElse { .. } => "if_nth_else",
            Directive::AttrCount => "attr_count",
            Directive::AttrList { .. } => "attr_list",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Dotted path to a field, e.g. `["test", "foo"]` for `test.foo`.
    Field(Vec<String>),
    Directive(Directive),
}

/// A parsed `{{Scope::...}}` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub scope: Scope,
    pub kind: TokenKind,
}

impl Token {
    pub fn field(scope: Scope, path: &[&str]) -> Self {
        Token {
            scope,
            kind: TokenKind::Field(path.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn directive(scope: Scope, directive: Directive) -> Self {
        Token {
            scope,
            kind: TokenKind::Directive(directive),
        }
    }
}

/// A run of a body line: either copied text or a token to substitute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Text(String),
    Token(Token),
}

/// One line of a block body, pre-split into pieces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyLine {
    /// 1-based line number in the template.
    pub line: usize,
    pub pieces: Vec<Piece>,
    /// The line terminator as written (`"\n"`, `"\r\n"` or empty).
    pub ending: String,
    per_attribute: bool,
}

impl BodyLine {
    pub fn new(line: usize, pieces: Vec<Piece>, ending: impl Into<String>) -> Self {
        let per_attribute = pieces
            .iter()
            .any(|p| matches!(p, Piece::Token(t) if t.scope == Scope::Attribute));
        BodyLine {
            line,
            pieces,
            ending: ending.into(),
            per_attribute,
        }
    }

    /// Whether the line is emitted once per attribute rather than once per
    /// component. Fixed when the line is parsed.
    pub fn repeats_per_attribute(&self) -> bool {
        self.per_attribute
    }

    pub fn has_tokens(&self) -> bool {
        self.pieces.iter().any(|p| matches!(p, Piece::Token(_)))
    }
}

/// A marked region, expanded once per matching component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Line of the begin marker.
    pub begin_line: usize,
    /// Line of the end marker.
    pub end_line: usize,
    pub condition: Option<Condition>,
    pub body: Vec<BodyLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text outside any block, kept byte for byte.
    Literal(String),
    Block(Block),
}

/// A scanned template: literal text and blocks in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFile {
    pub segments: Vec<Segment>,
}

impl TemplateFile {
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Block(b) => Some(b),
            Segment::Literal(_) => None,
        })
    }
}
