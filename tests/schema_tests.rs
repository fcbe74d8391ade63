//! Loading and linting the fixture schemas.

mod common;

use common::fixture_path;
use datamatic::schema::{lint_schema, load_schema, FlagValue, LintSeverity, Value};

#[test]
fn test_fixture_schema_loads_in_order_with_defaults() {
    let schema = load_schema(&fixture_path("project/components.yaml")).unwrap();
    let names: Vec<&str> = schema.components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["NameComponent", "Transform2DComponent", "TemporaryComponent"]
    );

    let name = schema.component("NameComponent").unwrap();
    assert_eq!(name.flags.get("SAVABLE"), Some(&FlagValue::Bool(true)));
    assert_eq!(
        name.fields.get("display_name"),
        Some(&Value::Text("Name".into()))
    );

    let temp = schema.component("TemporaryComponent").unwrap();
    assert_eq!(temp.flags.get("SAVABLE"), Some(&FlagValue::Bool(false)));
    assert!(temp.attributes.is_empty());

    let transform = schema.component("Transform2DComponent").unwrap();
    let defaults: Vec<&str> = transform.attributes.iter().map(|a| a.default.as_str()).collect();
    assert_eq!(defaults, vec!["{0.0, 0.0}", "0.0", "0"]);
    // attributes inherit declared defaults unless they set the flag
    assert_eq!(
        transform.attributes[0].flags.get("SAVABLE"),
        Some(&FlagValue::Bool(true))
    );
    assert_eq!(
        transform.attributes[2].flags.get("SAVABLE"),
        Some(&FlagValue::Bool(false))
    );
}

#[test]
fn test_fixture_schemas_lint_clean() {
    for name in ["project/components.yaml", "broken/components.yaml"] {
        let schema = load_schema(&fixture_path(name)).unwrap();
        let issues = lint_schema(&schema);
        assert!(
            issues.iter().all(|i| i.severity != LintSeverity::Error),
            "{name}: {issues:?}"
        );
    }
}
