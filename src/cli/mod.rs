//! # CLI Module
//!
//! Command-line interface for the `datamatic` binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Render every `*.dm.*` template under a directory and write the outputs
//! next to them:
//!
//! ```bash
//! datamatic generate --schema components.yaml --dir src
//! ```
//!
//! Options:
//! - `--schema <FILE>` - Schema document, YAML, JSON or TOML (required)
//! - `--dir <DIR>` - Directory searched recursively for templates (required)
//! - `--config <FILE>` - Generator config (default: `datamatic.toml` next to the schema)
//! - `--dry-run` - Report what would change without writing files
//! - `--check` - Like `--dry-run`, but exit non-zero if anything would change
//!
//! ### `render`
//!
//! Render a single template to stdout:
//!
//! ```bash
//! datamatic render --schema components.yaml --template src/scene.dm.cpp
//! ```
//!
//! ### `lint`
//!
//! Check a schema for duplicate names, undeclared flags and similar problems:
//!
//! ```bash
//! datamatic lint --schema components.yaml --fail-on-error
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use datamatic::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! let code = run_cli(&cli)?;
//! ```

mod commands;


pub use commands::{run_cli, Cli, Commands};
