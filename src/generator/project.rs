//! Directory generation: discover templates, render each against the schema
//! and write the results next to them.
//!
//! Templates are independent. They are rendered on the rayon pool and the
//! reports come back in discovery (path) order, so a run's output and its
//! report are the same on every machine.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use rayon::prelude::*;
use tracing::{debug, error, info};
use walkdir::WalkDir;

use super::assemble::render_with;
use crate::config::GeneratorConfig;
use crate::schema::Schema;
use crate::template::Markers;
use crate::validator::Diagnostic;

/// A template file and the file it generates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateJob {
    pub source: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOutcome {
    /// Output written (new or changed).
    Written,
    /// Output already up to date; nothing written.
    Unchanged,
    /// Output would change, but this is a dry run or a check.
    WouldWrite,
    /// The template has errors; no output was produced.
    Failed(Vec<Diagnostic>),
    /// Reading the template or writing its output failed.
    IoError(String),
}

#[derive(Debug, Clone)]
pub struct TemplateReport {
    pub job: TemplateJob,
    pub outcome: TemplateOutcome,
}

impl TemplateReport {
    pub fn is_failure(&self) -> bool {
        matches!(
            self.outcome,
            TemplateOutcome::Failed(_) | TemplateOutcome::IoError(_)
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    /// Render and report, but write nothing.
    pub dry_run: bool,
    /// Like `dry_run`; the caller treats pending changes as failure.
    pub check: bool,
}

/// Results of one run, in template path order.
#[derive(Debug, Clone, Default)]
pub struct GenerationSummary {
    pub reports: Vec<TemplateReport>,
}

impl GenerationSummary {
    pub fn has_failures(&self) -> bool {
        self.reports.iter().any(TemplateReport::is_failure)
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| r.is_failure()).count()
    }

    /// Templates whose output was, or would be, written.
    pub fn changed(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| {
                matches!(
                    r.outcome,
                    TemplateOutcome::Written | TemplateOutcome::WouldWrite
                )
            })
            .count()
    }

    pub fn unchanged(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome == TemplateOutcome::Unchanged)
            .count()
    }
}

/// Output path for a template, or `None` if the file name does not carry
/// the template marker. `shader.dm.h` becomes `shader.h`.
pub fn output_path_for(path: &Path, marker: &str) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    if !name.contains(marker) {
        return None;
    }
    let generated = name.replacen(marker, ".", 1);
    Some(path.with_file_name(generated))
}

/// Find every template under `dir`, sorted by path.
pub fn discover_templates(dir: &Path, config: &GeneratorConfig) -> anyhow::Result<Vec<TemplateJob>> {
    if !dir.is_dir() {
        anyhow::bail!("Template directory not found: {}", dir.display());
    }

    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !config
                    .exclude
                    .iter()
                    .any(|ex| entry.file_name().to_str() == Some(ex.as_str()))
        });

    let mut jobs = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(output) = output_path_for(entry.path(), &config.template_marker) {
            jobs.push(TemplateJob {
                source: entry.path().to_path_buf(),
                output,
            });
        }
    }
    jobs.sort_by(|a, b| a.source.cmp(&b.source));
    debug!(dir = %dir.display(), count = jobs.len(), "discovered templates");
    Ok(jobs)
}

fn with_header(text: String, header: Option<&str>) -> String {
    match header {
        Some(h) if h.ends_with('\n') => format!("{h}{text}"),
        Some(h) => format!("{h}\n{text}"),
        None => text,
    }
}

fn process(
    job: &TemplateJob,
    schema: &Schema,
    config: &GeneratorConfig,
    markers: &Markers,
    options: GenerateOptions,
) -> TemplateOutcome {
    let source = match fs::read_to_string(&job.source) {
        Ok(s) => s,
        Err(e) => return TemplateOutcome::IoError(format!("read {}: {e}", job.source.display())),
    };

    let text = match render_with(&source, schema, markers) {
        Ok(text) => with_header(text, config.header_for(&job.output)),
        Err(diagnostics) => {
            error!(
                template = %job.source.display(),
                errors = diagnostics.len(),
                "template has errors, output not written"
            );
            return TemplateOutcome::Failed(diagnostics);
        }
    };

    if fs::read_to_string(&job.output).ok().as_deref() == Some(text.as_str()) {
        debug!(output = %job.output.display(), "unchanged");
        return TemplateOutcome::Unchanged;
    }
    if options.dry_run || options.check {
        info!(output = %job.output.display(), "would write");
        return TemplateOutcome::WouldWrite;
    }
    match fs::write(&job.output, text) {
        Ok(()) => {
            info!(output = %job.output.display(), "generated");
            TemplateOutcome::Written
        }
        Err(e) => TemplateOutcome::IoError(format!("write {}: {e}", job.output.display())),
    }
}

/// Render the given jobs; one broken template never affects the others.
pub fn generate_jobs(
    jobs: Vec<TemplateJob>,
    schema: &Schema,
    config: &GeneratorConfig,
    options: GenerateOptions,
) -> GenerationSummary {
    let markers = config.markers();
    let outcomes: Vec<TemplateOutcome> = jobs
        .par_iter()
        .map(|job| process(job, schema, config, &markers, options))
        .collect();
    GenerationSummary {
        reports: jobs
            .into_iter()
            .zip(outcomes)
            .map(|(job, outcome)| TemplateReport { job, outcome })
            .collect(),
    }
}

/// Discover and render every template under `dir`.
pub fn generate_templates(
    dir: &Path,
    schema: &Schema,
    config: &GeneratorConfig,
    options: GenerateOptions,
) -> anyhow::Result<GenerationSummary> {
    let jobs = discover_templates(dir, config)?;
    let summary = generate_jobs(jobs, schema, config, options);
    info!(
        templates = summary.reports.len(),
        changed = summary.changed(),
        unchanged = summary.unchanged(),
        failed = summary.failed(),
        "generation finished"
    );
    Ok(summary)
}
