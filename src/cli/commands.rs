use crate::config::resolve_config;
use crate::generator::{generate_templates, render_with, GenerateOptions, TemplateOutcome};
use crate::schema::{has_errors, lint_schema, load_schema, print_schema_issues, Schema};
use crate::validator::print_diagnostics;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Command-line interface for datamatic
///
/// Expands marked blocks in template files from a component schema.
#[derive(Parser)]
#[command(name = "datamatic")]
#[command(about = "Schema-driven template expansion", long_about = None, version)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available datamatic commands
#[derive(Subcommand)]
pub enum Commands {
    /// Render every template under a directory and write the outputs
    Generate {
        /// Path to the schema document (YAML, JSON or TOML)
        #[arg(short, long)]
        schema: PathBuf,

        /// Directory searched recursively for templates
        #[arg(short, long)]
        dir: PathBuf,

        /// Path to datamatic.toml
        /// If not provided, will auto-detect alongside the schema
        #[arg(long)]
        config: Option<PathBuf>,

        /// Perform a dry run: show what would change without writing files
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Exit with an error if any output is out of date; writes nothing
        #[arg(long, default_value_t = false)]
        check: bool,
    },
    /// Render a single template and print the result to stdout
    Render {
        /// Path to the schema document (YAML, JSON or TOML)
        #[arg(short, long)]
        schema: PathBuf,

        /// Template file to render
        #[arg(short, long)]
        template: PathBuf,

        /// Path to datamatic.toml
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Lint a schema document
    ///
    /// Checks for:
    /// - Empty or duplicate component names
    /// - Duplicate attribute names within a component
    /// - Flags used but not declared (when declarations exist)
    /// - Flag values whose type differs from the declared default
    Lint {
        /// Path to the schema document (YAML, JSON or TOML)
        #[arg(short, long)]
        schema: PathBuf,

        /// Exit with error code if any errors are found
        #[arg(long, default_value_t = false)]
        fail_on_error: bool,
    },
}

/// Load a schema and refuse to continue if it has lint errors.
fn load_checked_schema(path: &Path) -> anyhow::Result<Schema> {
    let schema = load_schema(path)?;
    let issues = lint_schema(&schema);
    if has_errors(&issues) {
        print_schema_issues(&issues);
        anyhow::bail!("Schema {} has errors; nothing generated", path.display());
    }
    for issue in &issues {
        tracing::warn!(location = %issue.location, kind = %issue.kind, "{}", issue.message);
    }
    Ok(schema)
}

/// Execute a CLI command
///
/// Returns the process exit code: failure when any template had errors,
/// or, with `--check`, when any output would change.
pub fn run_cli(cli: &Cli) -> anyhow::Result<ExitCode> {
    match &cli.command {
        Commands::Generate {
            schema,
            dir,
            config,
            dry_run,
            check,
        } => {
            let schema_doc = load_checked_schema(schema)?;
            let config = resolve_config(config.as_deref(), schema)?;
            let options = GenerateOptions {
                dry_run: *dry_run,
                check: *check,
            };
            let summary = generate_templates(dir, &schema_doc, &config, options)?;

            for report in &summary.reports {
                match &report.outcome {
                    TemplateOutcome::Written => {
                        println!("✅ {}", report.job.output.display())
                    }
                    TemplateOutcome::WouldWrite => {
                        println!("📝 {} (would change)", report.job.output.display())
                    }
                    TemplateOutcome::Unchanged => {}
                    TemplateOutcome::Failed(diagnostics) => {
                        print_diagnostics(&report.job.source, diagnostics)
                    }
                    TemplateOutcome::IoError(message) => eprintln!("\n❌ {message}"),
                }
            }
            println!(
                "\n{} template(s): {} changed, {} unchanged, {} failed",
                summary.reports.len(),
                summary.changed(),
                summary.unchanged(),
                summary.failed()
            );

            let out_of_date = *check && summary.changed() > 0;
            if summary.has_failures() || out_of_date {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Commands::Render {
            schema,
            template,
            config,
        } => {
            let schema_doc = load_checked_schema(schema)?;
            let config = resolve_config(config.as_deref(), schema)?;
            let source = std::fs::read_to_string(template)
                .with_context(|| format!("Failed to read template: {}", template.display()))?;
            match render_with(&source, &schema_doc, &config.markers()) {
                Ok(text) => {
                    print!("{text}");
                    Ok(ExitCode::SUCCESS)
                }
                Err(diagnostics) => {
                    print_diagnostics(template, &diagnostics);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Lint {
            schema,
            fail_on_error,
        } => {
            let issues = lint_schema(&load_schema(schema)?);
            print_schema_issues(&issues);
            if *fail_on_error && has_errors(&issues) {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
