use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value of a flag attached to a component or an attribute.
///
/// Flags are either booleans (`SAVABLE: true`) or free-form strings
/// (`KIND: physics`). Block conditions compare against them by equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Text(String),
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{b}"),
            FlagValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A node in the nested value tree carried by components and attributes.
///
/// Every key of a component (or attribute) document that the schema does not
/// give a dedicated meaning to lands here, so templates can reach it with a
/// dotted path such as `{{Comp::test.foo}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    Group(BTreeMap<String, Value>),
}

impl Value {
    /// Walk `path` through nested groups, starting at this node.
    pub fn lookup<'a, I>(&self, path: I) -> Option<&Value>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut current = self;
        for segment in path {
            match current {
                Value::Group(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Text form of a scalar; `None` for groups.
    pub fn render(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Group(_) => None,
        }
    }
}

/// Look a dotted path up in a map of top-level values.
pub(crate) fn lookup_path<'a>(
    fields: &'a BTreeMap<String, Value>,
    segments: &[String],
) -> Option<&'a Value> {
    let (first, rest) = segments.split_first()?;
    fields
        .get(first)?
        .lookup(rest.iter().map(String::as_str))
}

/// A declared flag with the value components get when they don't set it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagDef {
    pub name: String,
    pub default: FlagValue,
}

/// A typed, named, defaulted field of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    /// Type name in the target language, copied verbatim.
    #[serde(rename = "type")]
    pub ty: String,
    /// Default-value expression in the target language, copied verbatim.
    ///
    /// Unquoted numbers go through the document parser first and come out in
    /// canonical form (`1.50` becomes `1.5`). Quote a default to keep its
    /// exact spelling.
    #[serde(deserialize_with = "scalar_text")]
    pub default: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub flags: BTreeMap<String, FlagValue>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl AttributeDef {
    pub fn new(name: impl Into<String>, ty: impl Into<String>, default: impl Into<String>) -> Self {
        AttributeDef {
            name: name.into(),
            ty: ty.into(),
            default: default.into(),
            flags: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_flag(mut self, key: impl Into<String>, value: FlagValue) -> Self {
        self.flags.insert(key.into(), value);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }
}

/// A named schema entity: ordered attributes, flags and free-form nested values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDef {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub flags: BTreeMap<String, FlagValue>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl ComponentDef {
    pub fn new(name: impl Into<String>) -> Self {
        ComponentDef {
            name: name.into(),
            attributes: Vec::new(),
            flags: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_flag(mut self, key: impl Into<String>, value: FlagValue) -> Self {
        self.flags.insert(key.into(), value);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Attribute names in declaration order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }
}

/// The full, ordered set of component definitions driving generation.
///
/// Declaration order is significant: every block emits components in the
/// order they appear here, filtered but never re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<FlagDef>,
    #[serde(default)]
    pub components: Vec<ComponentDef>,
}

impl Schema {
    pub fn new(components: Vec<ComponentDef>) -> Self {
        Schema {
            flags: Vec::new(),
            components,
        }
    }

    pub fn component(&self, name: &str) -> Option<&ComponentDef> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Merge declared flag defaults into every component and attribute.
    ///
    /// Values set explicitly win. Keys no declaration covers stay absent.
    pub fn apply_flag_defaults(&mut self) {
        for comp in &mut self.components {
            for flag in &self.flags {
                comp.flags
                    .entry(flag.name.clone())
                    .or_insert_with(|| flag.default.clone());
                for attr in &mut comp.attributes {
                    attr.flags
                        .entry(flag.name.clone())
                        .or_insert_with(|| flag.default.clone());
                }
            }
        }
    }

    /// Whether any declaration, component or attribute mentions `key`.
    pub fn knows_flag(&self, key: &str) -> bool {
        self.flags.iter().any(|f| f.name == key)
            || self.components.iter().any(|c| {
                c.flags.contains_key(key) || c.attributes.iter().any(|a| a.flags.contains_key(key))
            })
    }
}

/// Accept any scalar for attribute defaults and keep its text form.
fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Group(_) => Err(serde::de::Error::custom(
            "attribute default must be a scalar, not a mapping",
        )),
        other => Ok(other.render().unwrap_or_default()),
    }
}
