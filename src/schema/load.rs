use super::types::Schema;
use anyhow::{bail, Context};
use std::path::Path;

/// Document formats a schema file can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Yaml,
    Json,
    Toml,
}

impl SchemaFormat {
    /// Pick a format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(SchemaFormat::Yaml),
            "json" => Some(SchemaFormat::Json),
            "toml" => Some(SchemaFormat::Toml),
            _ => None,
        }
    }
}

/// Parse schema text and merge flag defaults into the components.
pub fn parse_schema(content: &str, format: SchemaFormat) -> anyhow::Result<Schema> {
    let mut schema: Schema = match format {
        SchemaFormat::Yaml => serde_yaml::from_str(content)?,
        SchemaFormat::Json => serde_json::from_str(content)?,
        SchemaFormat::Toml => toml::from_str(content)?,
    };
    schema.apply_flag_defaults();
    Ok(schema)
}

/// Load a schema file from disk.
///
/// The format follows the extension (`.yaml`/`.yml`, `.json`, `.toml`).
/// Flag defaults declared under `flags` are merged into every component.
pub fn load_schema(path: &Path) -> anyhow::Result<Schema> {
    let Some(format) = SchemaFormat::from_path(path) else {
        bail!(
            "Unsupported schema format for {} (expected .yaml, .yml, .json or .toml)",
            path.display()
        );
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema: {}", path.display()))?;
    let schema = parse_schema(&content, format)
        .with_context(|| format!("Failed to parse schema: {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        components = schema.components.len(),
        "Loaded schema"
    );
    Ok(schema)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::schema::{FlagValue, Value};

    const YAML: &str = r#"
flags:
  - name: SAVABLE
    default: true
components:
  - name: NameComponent
    display_name: Name
    attributes:
      - name: name
        type: std::string
        default: '"Entity"'
  - name: TemporaryComponent
    flags:
      SAVABLE: false
    test:
      foo: foobar
    attributes: []
"#;

    #[test]
    fn test_parse_yaml_applies_flag_defaults() {
        let schema = parse_schema(YAML, SchemaFormat::Yaml).unwrap();
        assert_eq!(schema.components.len(), 2);
        let name = &schema.components[0];
        assert_eq!(name.flags.get("SAVABLE"), Some(&FlagValue::Bool(true)));
        assert_eq!(
            name.fields.get("display_name"),
            Some(&Value::Text("Name".to_string()))
        );
        assert_eq!(name.attributes[0].ty, "std::string");
        assert_eq!(name.attributes[0].default, "\"Entity\"");

        let temp = &schema.components[1];
        assert_eq!(temp.flags.get("SAVABLE"), Some(&FlagValue::Bool(false)));
        assert!(temp.fields.contains_key("test"));
    }

    #[test]
    fn test_numeric_default_is_kept_as_text() {
        let json = r#"{"components": [{"name": "P", "attributes": [
            {"name": "x", "type": "float", "default": 0.5}
        ]}]}"#;
        let schema = parse_schema(json, SchemaFormat::Json).unwrap();
        assert_eq!(schema.components[0].attributes[0].default, "0.5");
    }

    #[test]
    fn test_quoted_default_keeps_its_spelling() {
        let yaml = r#"
components:
  - name: P
    attributes:
      - { name: a, type: float, default: 1.50 }
      - { name: b, type: float, default: "1.50" }
"#;
        let schema = parse_schema(yaml, SchemaFormat::Yaml).unwrap();
        let attrs = &schema.components[0].attributes;
        assert_eq!(attrs[0].default, "1.5");
        assert_eq!(attrs[1].default, "1.50");
    }

    #[test]
    fn test_toml_schema() {
        let toml = r#"
[[components]]
name = "PointComponent"

[[components.attributes]]
name = "x"
type = "float"
default = "0.0f"
"#;
        let schema = parse_schema(toml, SchemaFormat::Toml).unwrap();
        assert_eq!(schema.components[0].attributes[0].name, "x");
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            SchemaFormat::from_path(Path::new("a/schema.YML")),
            Some(SchemaFormat::Yaml)
        );
        assert_eq!(SchemaFormat::from_path(Path::new("schema.txt")), None);
    }

    #[test]
    fn test_load_schema_rejects_unknown_extension() {
        let err = load_schema(Path::new("schema.ini")).unwrap_err();
        assert!(err.to_string().contains("Unsupported schema format"));
    }
}
