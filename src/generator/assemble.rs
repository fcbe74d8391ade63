use super::expand::expand_into;
use crate::schema::Schema;
use crate::template::{scan_lenient, Markers, Segment, TemplateFile};
use crate::validator::{normalize, Diagnostic};

/// Expand every block of `file` and splice the results between its literal
/// spans, in template order.
///
/// All blocks are expanded before anything is assembled; if any of them
/// reports a problem, no text is returned and the full, line-ordered list of
/// diagnostics is.
pub fn assemble(file: &TemplateFile, schema: &Schema) -> Result<String, Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    let mut expanded = Vec::new();
    for block in file.blocks() {
        let mut out = String::new();
        expand_into(block, schema, &mut out, &mut diagnostics);
        expanded.push(out);
    }
    if !diagnostics.is_empty() {
        normalize(&mut diagnostics);
        return Err(diagnostics);
    }

    let mut expanded = expanded.into_iter();
    let mut output = String::new();
    for segment in &file.segments {
        match segment {
            Segment::Literal(text) => output.push_str(text),
            Segment::Block(_) => {
                if let Some(text) = expanded.next() {
                    output.push_str(&text);
                }
            }
        }
    }
    Ok(output)
}

/// Scan and assemble template text with the default markers.
pub fn render(source: &str, schema: &Schema) -> Result<String, Vec<Diagnostic>> {
    render_with(source, schema, &Markers::default())
}

/// Scan and assemble template text.
///
/// Scanning problems do not stop the blocks that did parse from being
/// expanded, so one call reports structural, condition and reference errors
/// together.
pub fn render_with(
    source: &str,
    schema: &Schema,
    markers: &Markers,
) -> Result<String, Vec<Diagnostic>> {
    let (file, mut diagnostics) = scan_lenient(source, markers);
    match assemble(&file, schema) {
        Ok(text) if diagnostics.is_empty() => Ok(text),
        Ok(_) => Err(diagnostics),
        Err(more) => {
            diagnostics.extend(more);
            normalize(&mut diagnostics);
            Err(diagnostics)
        }
    }
}
