//! Generator configuration for datamatic runs
//!
//! A project can tune discovery and output through a `datamatic.toml` file
//! that sits alongside the schema, or one passed explicitly with `--config`.
//! Every key is optional.
//!
//! ```toml
//! template_marker = ".dm."
//! begin_marker = "DATAMATIC_BEGIN"
//! end_marker = "DATAMATIC_END"
//! exclude = ["target", ".git", "build"]
//!
//! [headers]
//! h = "// GENERATED FILE - DO NOT EDIT"
//! lua = "-- GENERATED FILE - DO NOT EDIT"
//! ```

use crate::template::{Markers, DEFAULT_BEGIN_MARKER, DEFAULT_END_MARKER};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name looked up next to the schema when no config is given.
pub const CONFIG_FILE_NAME: &str = "datamatic.toml";

/// Configuration loaded from datamatic.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Substring marking a file as a template (`foo.dm.h` generates `foo.h`)
    pub template_marker: String,
    pub begin_marker: String,
    pub end_marker: String,
    /// Output file extension → header line prepended to generated files
    pub headers: BTreeMap<String, String>,
    /// Directory names skipped while discovering templates
    pub exclude: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            template_marker: ".dm.".to_string(),
            begin_marker: DEFAULT_BEGIN_MARKER.to_string(),
            end_marker: DEFAULT_END_MARKER.to_string(),
            headers: BTreeMap::new(),
            exclude: vec!["target".to_string(), ".git".to_string()],
        }
    }
}

impl GeneratorConfig {
    pub fn markers(&self) -> Markers {
        Markers {
            begin: self.begin_marker.clone(),
            end: self.end_marker.clone(),
        }
    }

    /// Header for an output file, chosen by its extension.
    pub fn header_for(&self, output: &Path) -> Option<&str> {
        let ext = output.extension()?.to_str()?;
        self.headers.get(ext).map(String::as_str)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.template_marker.is_empty() {
            anyhow::bail!("template_marker must not be empty");
        }
        if self.begin_marker.trim().is_empty() || self.end_marker.trim().is_empty() {
            anyhow::bail!("begin_marker and end_marker must not be empty");
        }
        if self.begin_marker == self.end_marker {
            anyhow::bail!("begin_marker and end_marker must differ");
        }
        Ok(())
    }
}

/// Load generator configuration from a TOML file
///
/// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but
/// cannot be read, parsed or fails validation.
pub fn load_config(config_path: &Path) -> anyhow::Result<Option<GeneratorConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

    let config: GeneratorConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config: {}", config_path.display()))?;

    Ok(Some(config))
}

/// Look for `datamatic.toml` in the same directory as the schema.
pub fn auto_detect_config_path(schema_path: &Path) -> Option<PathBuf> {
    let config_path = schema_path.parent()?.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Resolve the configuration for a run
///
/// Priority:
/// 1. Explicitly provided path (must exist)
/// 2. Auto-detected alongside the schema
/// 3. Defaults
pub fn resolve_config(
    explicit_path: Option<&Path>,
    schema_path: &Path,
) -> anyhow::Result<GeneratorConfig> {
    let path = match explicit_path {
        Some(path) if !path.exists() => {
            anyhow::bail!("Config file not found: {}", path.display())
        }
        Some(path) => Some(path.to_path_buf()),
        None => auto_detect_config_path(schema_path),
    };

    match path {
        Some(path) => {
            tracing::debug!(config = %path.display(), "loading generator config");
            Ok(load_config(&path)?.unwrap_or_default())
        }
        None => Ok(GeneratorConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_no_config() {
        let dir = tempdir().unwrap();
        let schema = dir.path().join("schema.yaml");
        let config = resolve_config(None, &schema).unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.markers(), Markers::default());
    }

    #[test]
    fn test_auto_detected_next_to_schema() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "template_marker = \".tpl.\"\n[headers]\nlua = \"-- generated\"\n",
        )
        .unwrap();
        let config = resolve_config(None, &dir.path().join("schema.yaml")).unwrap();
        assert_eq!(config.template_marker, ".tpl.");
        assert_eq!(config.header_for(Path::new("out/x.lua")), Some("-- generated"));
        assert_eq!(config.header_for(Path::new("out/x.h")), None);
        // untouched keys keep their defaults
        assert_eq!(config.begin_marker, DEFAULT_BEGIN_MARKER);
        assert_eq!(config.exclude, vec!["target", ".git"]);
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = resolve_config(Some(&missing), &dir.path().join("s.yaml")).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_invalid_markers_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "begin_marker = \"X\"\nend_marker = \"X\"\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_parse_error_has_context() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "exclude = [").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }
}
