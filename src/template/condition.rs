//! Block conditions: the `KEY=VALUE` clauses after a begin marker.

use crate::schema::{AttributeDef, ComponentDef, FlagValue};
use crate::validator::TemplateError;
use std::collections::BTreeMap;

/// State of a flag on a component or attribute. A missing flag is `Absent`,
/// which is different from `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagState<'a> {
    Absent,
    Present(&'a FlagValue),
}

impl<'a> FlagState<'a> {
    pub fn of(flags: &'a BTreeMap<String, FlagValue>, key: &str) -> Self {
        match flags.get(key) {
            Some(v) => FlagState::Present(v),
            None => FlagState::Absent,
        }
    }
}

/// A single `KEY=VALUE` requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub key: String,
    pub expected: FlagValue,
}

impl Clause {
    /// Equality match; a kind mismatch (bool vs string) never matches.
    pub fn matches(&self, state: FlagState<'_>) -> bool {
        match state {
            FlagState::Absent => false,
            FlagState::Present(value) => *value == self.expected,
        }
    }
}

/// Conjunction of clauses; every clause must hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub clauses: Vec<Clause>,
}

impl Condition {
    /// Components without one of the keys are excluded.
    pub fn matches_component(&self, comp: &ComponentDef) -> bool {
        self.clauses
            .iter()
            .all(|c| c.matches(FlagState::of(&comp.flags, &c.key)))
    }

    /// Attributes are only dropped when they carry a key with another value.
    pub fn keeps_attribute(&self, attr: &AttributeDef) -> bool {
        self.clauses.iter().all(|c| match FlagState::of(&attr.flags, &c.key) {
            FlagState::Absent => true,
            state => c.matches(state),
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.clauses.iter().map(|c| c.key.as_str())
    }
}

fn parse_value(raw: &str) -> FlagValue {
    match raw {
        "true" => FlagValue::Bool(true),
        "false" => FlagValue::Bool(false),
        other => FlagValue::Text(other.to_string()),
    }
}

/// Parse the text following a begin marker.
///
/// Returns `Ok(None)` when there is no clause, meaning every component is
/// included.
pub fn parse_condition(text: &str) -> Result<Option<Condition>, TemplateError> {
    let mut clauses = Vec::new();
    for clause in text.split_whitespace() {
        let malformed = |reason: &str| TemplateError::MalformedCondition {
            clause: clause.to_string(),
            reason: reason.to_string(),
        };
        let mut parts = clause.split('=');
        let (key, value) = match (parts.next(), parts.next(), parts.next()) {
            (Some(k), Some(v), None) => (k, v),
            (_, None, _) => return Err(malformed("expected KEY=VALUE")),
            _ => return Err(malformed("more than one '='")),
        };
        if key.is_empty() {
            return Err(malformed("empty flag name"));
        }
        if value.is_empty() {
            return Err(malformed("empty flag value"));
        }
        clauses.push(Clause {
            key: key.to_string(),
            expected: parse_value(value),
        });
    }
    if clauses.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Condition { clauses }))
    }
}
