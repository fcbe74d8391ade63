//! Block expansion: one pass over the body per matching component, with
//! attribute lines repeated once per kept attribute.

use super::separator::Position;
use crate::schema::{lookup_path, AttributeDef, ComponentDef, Schema};
use crate::template::{Block, BodyLine, Condition, Directive, Piece, Scope, Token, TokenKind};
use crate::validator::{normalize, Diagnostic, TemplateError};
use tracing::{debug, trace, warn};

/// Resolution context for one body line.
struct Frame<'a> {
    component: &'a ComponentDef,
    component_pos: Position,
    attributes: &'a [&'a AttributeDef],
    attribute: Option<(&'a AttributeDef, Position)>,
}

fn component_field(comp: &ComponentDef, path: &[String]) -> Option<String> {
    match path {
        [name] if name == "name" => Some(comp.name.clone()),
        [flags, key] if flags == "flags" => comp.flags.get(key).map(|v| v.to_string()),
        _ => lookup_path(&comp.fields, path)?.render(),
    }
}

fn attribute_field(attr: &AttributeDef, path: &[String]) -> Option<String> {
    match path {
        [name] if name == "name" => Some(attr.name.clone()),
        [ty] if ty == "type" => Some(attr.ty.clone()),
        [default] if default == "default" => Some(attr.default.clone()),
        [flags, key] if flags == "flags" => attr.flags.get(key).map(|v| v.to_string()),
        _ => lookup_path(&attr.fields, path)?.render(),
    }
}

fn unknown_field(scope: Scope, path: &[String], owner: String) -> TemplateError {
    TemplateError::UnknownField {
        scope,
        path: path.join("."),
        owner,
    }
}

fn attr_owner(comp: &ComponentDef, attr: &AttributeDef) -> String {
    format!("{}.{}", comp.name, attr.name)
}

fn attr_list(
    frame: &Frame<'_>,
    field: &str,
    separator: &str,
    format: Option<&str>,
) -> Result<String, TemplateError> {
    let path: Vec<String> = field.split('.').map(|s| s.trim().to_string()).collect();
    let mut items = Vec::with_capacity(frame.attributes.len());
    for attr in frame.attributes {
        let value = attribute_field(attr, &path).ok_or_else(|| {
            unknown_field(Scope::Attribute, &path, attr_owner(frame.component, attr))
        })?;
        items.push(match format {
            Some(f) => f.replace("{}", &value),
            None => value,
        });
    }
    Ok(items.join(separator))
}

fn resolve_token(token: &Token, frame: &Frame<'_>) -> Result<String, TemplateError> {
    match token.scope {
        Scope::Component => match &token.kind {
            TokenKind::Field(path) => component_field(frame.component, path)
                .ok_or_else(|| unknown_field(Scope::Component, path, frame.component.name.clone())),
            TokenKind::Directive(Directive::AttrCount) => Ok(frame.attributes.len().to_string()),
            TokenKind::Directive(Directive::AttrList {
                field,
                separator,
                format,
            }) => attr_list(frame, field, separator, format.as_deref()),
            TokenKind::Directive(d) => {
                Ok(frame.component_pos.select(d).unwrap_or_default().to_string())
            }
        },
        Scope::Attribute => {
            // Only lines classified as per-attribute carry attribute tokens.
            debug_assert!(
                frame.attribute.is_some(),
                "attribute token resolved outside an attribute line"
            );
            let Some((attr, pos)) = frame.attribute else {
                return Err(TemplateError::MalformedToken {
                    raw: match &token.kind {
                        TokenKind::Field(path) => format!("{}::{}", token.scope.tag(), path.join(".")),
                        TokenKind::Directive(d) => format!("{}::{d:?}", token.scope.tag()),
                    },
                    reason: "attribute token outside a per-attribute line".to_string(),
                });
            };
            match &token.kind {
                TokenKind::Field(path) => attribute_field(attr, path).ok_or_else(|| {
                    unknown_field(Scope::Attribute, path, attr_owner(frame.component, attr))
                }),
                TokenKind::Directive(d) => Ok(pos.select(d).unwrap_or_default().to_string()),
            }
        }
    }
}

/// Resolve one body line into `out`, recording unresolvable tokens.
///
/// A component-level line that had tokens and resolves to nothing is
/// dropped entirely, terminator included. Per-attribute lines are always
/// emitted, one per attribute.
fn resolve_line(
    line: &BodyLine,
    frame: &Frame<'_>,
    out: &mut String,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut text = String::new();
    for piece in &line.pieces {
        match piece {
            Piece::Text(t) => text.push_str(t),
            Piece::Token(token) => match resolve_token(token, frame) {
                Ok(value) => text.push_str(&value),
                Err(e) => diagnostics.push(Diagnostic::new(line.line, e)),
            },
        }
    }
    if text.is_empty() && line.has_tokens() && !line.repeats_per_attribute() {
        trace!(line = line.line, "dropping empty line");
        return;
    }
    out.push_str(&text);
    out.push_str(&line.ending);
}

fn warn_unknown_keys(condition: &Condition, schema: &Schema, begin_line: usize) {
    for key in condition.keys() {
        if !schema.knows_flag(key) {
            warn!(
                line = begin_line,
                flag = key,
                "block condition uses a flag no component or attribute declares"
            );
        }
    }
}

/// Expand `block` against `schema`, appending to `out` and pushing every
/// problem to `diagnostics`. Output is meaningless once a diagnostic has
/// been pushed.
pub(crate) fn expand_into(
    block: &Block,
    schema: &Schema,
    out: &mut String,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let condition = block.condition.as_ref();
    if let Some(cond) = condition {
        warn_unknown_keys(cond, schema, block.begin_line);
    }

    let matches: Vec<&ComponentDef> = schema
        .components
        .iter()
        .filter(|c| condition.map_or(true, |cond| cond.matches_component(c)))
        .collect();
    debug!(
        begin_line = block.begin_line,
        matched = matches.len(),
        total = schema.components.len(),
        "expanding block"
    );

    for (i, &comp) in matches.iter().enumerate() {
        let attributes: Vec<&AttributeDef> = comp
            .attributes
            .iter()
            .filter(|a| condition.map_or(true, |cond| cond.keeps_attribute(a)))
            .collect();
        let mut frame = Frame {
            component: comp,
            component_pos: Position::new(i, matches.len()),
            attributes: &attributes,
            attribute: None,
        };

        for line in &block.body {
            if line.repeats_per_attribute() {
                for (j, attr) in attributes.iter().enumerate() {
                    frame.attribute = Some((*attr, Position::new(j, attributes.len())));
                    resolve_line(line, &frame, out, diagnostics);
                }
                frame.attribute = None;
            } else {
                resolve_line(line, &frame, out, diagnostics);
            }
        }
    }
}

/// Expand one block against the schema.
///
/// Every unresolvable token is reported, once per component (or attribute)
/// it fails on, ordered by line.
pub fn expand_block(block: &Block, schema: &Schema) -> Result<String, Vec<Diagnostic>> {
    let mut out = String::new();
    let mut diagnostics = Vec::new();
    expand_into(block, schema, &mut out, &mut diagnostics);
    if diagnostics.is_empty() {
        Ok(out)
    } else {
        normalize(&mut diagnostics);
        Err(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::schema::{FlagDef, FlagValue, Value};
    use crate::template::scan;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    fn block(src: &str) -> Block {
        scan(src).unwrap().blocks().next().unwrap().clone()
    }

    fn schema() -> Schema {
        Schema::new(vec![
            ComponentDef::new("NameComponent")
                .with_flag("FLAG_A", FlagValue::Bool(true))
                .with_attribute(AttributeDef::new("name", "std::string", "\"Entity\"")),
            ComponentDef::new("TemporaryComponent"),
            ComponentDef::new("PointComponent")
                .with_flag("FLAG_A", FlagValue::Bool(true))
                .with_attribute(AttributeDef::new("x", "float", "0.0"))
                .with_attribute(AttributeDef::new("y", "float", "0.0")),
        ])
    }

    #[test]
    fn test_filter_keeps_schema_order() {
        let b = block("DATAMATIC_BEGIN FLAG_A=true\n{{Comp::name}}\nDATAMATIC_END\n");
        assert_eq!(
            expand_block(&b, &schema()).unwrap(),
            "NameComponent\nPointComponent\n"
        );
    }

    #[test]
    fn test_no_condition_includes_every_component() {
        let b = block("DATAMATIC_BEGIN\n{{Comp::name}}{{Comp::if_not_last(, )}}\nDATAMATIC_END\n");
        assert_eq!(
            expand_block(&b, &schema()).unwrap(),
            "NameComponent, \nTemporaryComponent, \nPointComponent\n"
        );
    }

    #[test]
    fn test_attribute_lines_repeat_in_order() {
        let b = block(
            "DATAMATIC_BEGIN FLAG_A=true\nstruct {{Comp::name}} {\n    {{Attr::type}} {{Attr::name}} = {{Attr::default}};\n};\nDATAMATIC_END\n",
        );
        assert_eq!(
            expand_block(&b, &schema()).unwrap(),
            "struct NameComponent {\n    std::string name = \"Entity\";\n};\n\
             struct PointComponent {\n    float x = 0.0;\n    float y = 0.0;\n};\n"
        );
    }

    #[test]
    fn test_attribute_separator_uses_attribute_position() {
        let b = block("DATAMATIC_BEGIN\n{{Attr::name}}{{Attr::if_not_last(,)}} {{Comp::name}}\nDATAMATIC_END\n");
        let s = Schema::new(vec![schema().components[2].clone()]);
        assert_eq!(
            expand_block(&b, &s).unwrap(),
            "x, PointComponent\ny PointComponent\n"
        );
    }

    #[test]
    fn test_component_without_attributes_emits_no_attribute_lines() {
        let b = block("DATAMATIC_BEGIN\n// {{Comp::name}}\n{{Attr::name}}\nDATAMATIC_END\n");
        let s = Schema::new(vec![ComponentDef::new("Tag")]);
        assert_eq!(expand_block(&b, &s).unwrap(), "// Tag\n");
    }

    #[test]
    fn test_empty_match_emits_nothing() {
        let b = block("DATAMATIC_BEGIN FLAG_B=true\n{{Comp::name}},\nDATAMATIC_END\n");
        assert_eq!(expand_block(&b, &schema()).unwrap(), "");
    }

    #[test]
    fn test_nested_and_flag_fields() {
        let mut test = BTreeMap::new();
        test.insert("foo".to_string(), Value::Text("bar".into()));
        let s = Schema::new(vec![ComponentDef::new("C")
            .with_flag("KIND", FlagValue::Text("physics".into()))
            .with_field("test", Value::Group(test))
            .with_field("size", Value::Number(serde_json::Number::from(4u32)))]);
        let b = block(
            "DATAMATIC_BEGIN KIND=physics\n{{Comp::test.foo}} {{Comp::flags.KIND}} {{Comp::size}}\nDATAMATIC_END\n",
        );
        assert_eq!(expand_block(&b, &s).unwrap(), "bar physics 4\n");
    }

    #[test]
    fn test_unknown_field_is_reported_per_component() {
        let b = block("DATAMATIC_BEGIN\n{{Comp::display_name}}\nDATAMATIC_END\n");
        let errs = expand_block(&b, &schema()).unwrap_err();
        assert_eq!(errs.len(), 3);
        assert!(errs.iter().all(|d| d.line == 2));
        assert!(matches!(
            &errs[0].error,
            TemplateError::UnknownField { owner, .. } if owner == "NameComponent"
        ));
    }

    #[test]
    fn test_group_value_is_not_a_field() {
        let s = Schema::new(vec![
            ComponentDef::new("C").with_field("test", Value::Group(BTreeMap::new()))
        ]);
        let b = block("DATAMATIC_BEGIN\n{{Comp::test}}\nDATAMATIC_END\n");
        assert!(expand_block(&b, &s).is_err());
    }

    #[test]
    fn test_line_resolving_to_nothing_is_dropped() {
        let b = block("DATAMATIC_BEGIN FLAG_A=true\n{{Comp::name}}\n{{Comp::if_not_last(---)}}\nDATAMATIC_END\n");
        assert_eq!(
            expand_block(&b, &schema()).unwrap(),
            "NameComponent\n---\nPointComponent\n"
        );
    }

    #[test]
    fn test_attr_count_and_list() {
        let b = block(
            "DATAMATIC_BEGIN FLAG_A=true\n{{Comp::name}}: {{Comp::attr_count()}} [{{Comp::attr_list(name|, |\"{}\")}}]\nDATAMATIC_END\n",
        );
        assert_eq!(
            expand_block(&b, &schema()).unwrap(),
            "NameComponent: 1 [\"name\"]\nPointComponent: 2 [\"x\", \"y\"]\n"
        );
    }

    #[test]
    fn test_attribute_filter_drops_opted_out_attributes() {
        let s = Schema::new(vec![ComponentDef::new("Body")
            .with_flag("SAVABLE", FlagValue::Bool(true))
            .with_attribute(AttributeDef::new("mass", "float", "1.0"))
            .with_attribute(
                AttributeDef::new("cache", "int", "0").with_flag("SAVABLE", FlagValue::Bool(false)),
            )
            .with_attribute(AttributeDef::new("speed", "float", "0.0"))]);
        let b = block("DATAMATIC_BEGIN SAVABLE=true\n{{Attr::name}}{{Attr::if_not_last(,)}}\nDATAMATIC_END\n");
        assert_eq!(expand_block(&b, &s).unwrap(), "mass,\nspeed\n");
    }

    #[test]
    fn test_empty_attribute_line_is_still_emitted_per_attribute() {
        let b = block("DATAMATIC_BEGIN\n{{Attr::if_not_last(,)}}\nDATAMATIC_END\n");
        let s = Schema::new(vec![ComponentDef::new("P")
            .with_attribute(AttributeDef::new("x", "float", "0"))
            .with_attribute(AttributeDef::new("y", "float", "0"))]);
        assert_eq!(expand_block(&b, &s).unwrap(), ",\n\n");
    }

    #[test]
    fn test_declared_default_filters_attributes() {
        let mut s = Schema::new(vec![ComponentDef::new("Body")
            .with_flag("SAVABLE", FlagValue::Bool(true))
            .with_attribute(
                AttributeDef::new("mass", "float", "1.0").with_flag("SAVABLE", FlagValue::Bool(true)),
            )
            .with_attribute(AttributeDef::new("cache", "int", "0"))]);
        s.flags.push(FlagDef {
            name: "SAVABLE".into(),
            default: FlagValue::Bool(false),
        });
        s.apply_flag_defaults();
        let b = block("DATAMATIC_BEGIN SAVABLE=true\n{{Attr::name}}\nDATAMATIC_END\n");
        assert_eq!(expand_block(&b, &s).unwrap(), "mass\n");
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn logs_while(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_unknown_condition_key_is_warned() {
        let b = block("DATAMATIC_BEGIN NOT_A_FLAG=true\n{{Comp::name}}\nDATAMATIC_END\n");
        let logs = logs_while(|| {
            assert_eq!(expand_block(&b, &schema()).unwrap(), "");
        });
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("NOT_A_FLAG"), "{logs}");
    }

    #[test]
    fn test_known_condition_key_is_not_warned() {
        let b = block("DATAMATIC_BEGIN FLAG_A=true\n{{Comp::name}}\nDATAMATIC_END\n");
        let logs = logs_while(|| {
            expand_block(&b, &schema()).unwrap();
        });
        assert!(!logs.contains("WARN"), "{logs}");
    }

    fn resolve_attr_name_without_attribute() -> Result<String, TemplateError> {
        let comp = ComponentDef::new("P");
        let frame = Frame {
            component: &comp,
            component_pos: Position::new(0, 1),
            attributes: &[],
            attribute: None,
        };
        resolve_token(&Token::field(Scope::Attribute, &["name"]), &frame)
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "attribute token resolved outside an attribute line")]
    fn test_attribute_token_without_attribute_asserts() {
        resolve_attr_name_without_attribute().ok();
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_attribute_token_without_attribute_is_an_error() {
        assert!(matches!(
            resolve_attr_name_without_attribute(),
            Err(TemplateError::MalformedToken { raw, .. }) if raw == "Attr::name"
        ));
    }

    #[test]
    fn test_crlf_endings_are_kept() {
        let b = block("DATAMATIC_BEGIN\r\n{{Comp::name}}\r\nDATAMATIC_END\r\n");
        let s = Schema::new(vec![ComponentDef::new("A"), ComponentDef::new("B")]);
        assert_eq!(expand_block(&b, &s).unwrap(), "A\r\nB\r\n");
    }
}
