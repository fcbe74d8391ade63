//! Token parsing for `{{Scope::path}}` and `{{Scope::directive(args)}}`.

use super::types::{Directive, Piece, Scope, Token, TokenKind};
use crate::validator::TemplateError;
use once_cell::sync::Lazy;
use regex::Regex;

/// `{{Ident::...}}`. Brace pairs whose content does not start with an
/// identifier followed by `::` are left alone as target-language text.
#[allow(clippy::expect_used)]
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*\s*::.*?)\s*\}\}").expect("token regex is valid")
});

fn malformed(raw: &str, reason: impl Into<String>) -> TemplateError {
    TemplateError::MalformedToken {
        raw: raw.to_string(),
        reason: reason.into(),
    }
}

fn is_segment(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split a raw argument list on `|`.
///
/// Arguments are taken literally; an argument wrapped in double quotes has
/// the quotes removed. An empty list yields no arguments.
fn parse_args(raw: &str, list: &str) -> Result<Vec<String>, TemplateError> {
    if list.is_empty() {
        return Ok(Vec::new());
    }
    let parts: Vec<&str> = list.split('|').collect();
    if parts.len() > 1 && parts.iter().any(|p| p.is_empty()) {
        return Err(malformed(raw, "empty argument in argument list"));
    }
    Ok(parts
        .into_iter()
        .map(|p| {
            let t = p.trim();
            if t.len() >= 2 && t.starts_with('"') && t.ends_with('"') {
                t[1..t.len() - 1].to_string()
            } else {
                p.to_string()
            }
        })
        .collect())
}

fn arity(name: &str, expected: &str, actual: usize) -> TemplateError {
    TemplateError::DirectiveArguments {
        name: name.to_string(),
        expected: expected.to_string(),
        actual,
    }
}

/// Whether `name` is one of the directive names for `scope`.
fn is_directive(scope: Scope, name: &str) -> bool {
    match name {
        "if_first" | "if_not_first" | "if_last" | "if_not_last" | "if_nth_else" => true,
        "attr_count" | "attr_list" => scope == Scope::Component,
        _ => false,
    }
}

fn build_directive(
    scope: Scope,
    name: &str,
    mut args: Vec<String>,
) -> Result<Directive, TemplateError> {
    if !is_directive(scope, name) {
        return Err(TemplateError::UnknownDirective {
            scope,
            name: name.to_string(),
        });
    }
    let single = |args: &mut Vec<String>| -> Result<String, TemplateError> {
        if args.len() == 1 {
            Ok(args.remove(0))
        } else {
            Err(arity(name, "1", args.len()))
        }
    };
    match name {
        "if_first" => Ok(Directive::IfFirst(single(&mut args)?)),
        "if_not_first" => Ok(Directive::IfNotFirst(single(&mut args)?)),
        "if_last" => Ok(Directive::IfLast(single(&mut args)?)),
        "if_not_last" => Ok(Directive::IfNotLast(single(&mut args)?)),
        "if_nth_else" => {
            let [n, yes, no]: [String; 3] = args
                .try_into()
                .map_err(|a: Vec<String>| arity(name, "3", a.len()))?;
            let n = n.trim().parse::<i64>().map_err(|_| {
                TemplateError::MalformedToken {
                    raw: format!("{}::{name}", scope.tag()),
                    reason: format!("'{n}' is not an integer index"),
                }
            })?;
            Ok(Directive::IfNthElse { n, yes, no })
        }
        "attr_count" if args.is_empty() => Ok(Directive::AttrCount),
        "attr_count" => Err(arity(name, "0", args.len())),
        _ => {
            // attr_list
            if !(2..=3).contains(&args.len()) {
                return Err(arity(name, "2 or 3", args.len()));
            }
            let format = if args.len() == 3 { args.pop() } else { None };
            let separator = args.pop().unwrap_or_default();
            let field = args.pop().unwrap_or_default();
            Ok(Directive::AttrList {
                field,
                separator,
                format,
            })
        }
    }
}

/// Parse the inside of a `{{...}}` token, e.g. `Comp::if_not_last(,)`.
///
/// Field paths are not checked against the schema here; that only happens
/// during expansion when there is a component or attribute to look at.
pub fn parse_token(raw: &str) -> Result<Token, TemplateError> {
    let Some((tag, rest)) = raw.split_once("::") else {
        return Err(malformed(raw, "expected 'Scope::path'"));
    };
    let tag = tag.trim();
    let scope = Scope::from_tag(tag).ok_or_else(|| TemplateError::UnknownScope {
        scope: tag.to_string(),
        raw: raw.to_string(),
    })?;

    let rest = rest.trim();
    if let Some(open) = rest.find('(') {
        let Some(list) = rest[open + 1..].strip_suffix(')') else {
            return Err(malformed(raw, "unclosed argument list"));
        };
        let name = rest[..open].trim();
        if !is_segment(name) {
            return Err(malformed(raw, format!("'{name}' is not a directive name")));
        }
        let args = parse_args(raw, list)?;
        return Ok(Token::directive(scope, build_directive(scope, name, args)?));
    }

    if rest.contains("::") {
        return Err(malformed(raw, "only one '::' is allowed"));
    }
    let path: Vec<&str> = rest.split('.').collect();
    if let Some(bad) = path.iter().find(|s| !is_segment(s)) {
        return Err(malformed(raw, format!("invalid path segment '{bad}'")));
    }
    if let [name] = path.as_slice() {
        if is_directive(scope, name) {
            return Ok(Token::directive(
                scope,
                build_directive(scope, name, Vec::new())?,
            ));
        }
    }
    Ok(Token {
        scope,
        kind: TokenKind::Field(path.into_iter().map(String::from).collect()),
    })
}

/// Split one body line into text and tokens.
///
/// Tokens that fail to parse are reported through `errors` and kept as text
/// so the rest of the line can still be checked.
pub fn tokenize_line(content: &str, errors: &mut Vec<TemplateError>) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for caps in TOKEN_RE.captures_iter(content) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            pieces.push(Piece::Text(content[last..whole.start()].to_string()));
        }
        match parse_token(inner.as_str()) {
            Ok(token) => pieces.push(Piece::Token(token)),
            Err(e) => {
                errors.push(e);
                pieces.push(Piece::Text(whole.as_str().to_string()));
            }
        }
        last = whole.end();
    }
    if last < content.len() {
        pieces.push(Piece::Text(content[last..].to_string()));
    }
    pieces
}
