#![allow(dead_code)]

use datamatic::schema::{AttributeDef, ComponentDef, FlagValue, Schema};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Copy a fixture directory into a fresh temp dir so runs can write to it.
pub fn copy_fixture(name: &str) -> TempDir {
    let src = fixture_path(name);
    let dir = tempfile::tempdir().unwrap();
    for entry in WalkDir::new(&src) {
        let entry = entry.unwrap();
        let rel = entry.path().strip_prefix(&src).unwrap();
        let dest = dir.path().join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).unwrap();
        } else {
            fs::copy(entry.path(), &dest).unwrap();
        }
    }
    dir
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

/// Two flagged components and one unflagged one.
pub fn scene_schema() -> Schema {
    Schema::new(vec![
        ComponentDef::new("NameComponent")
            .with_flag("FLAG_A", FlagValue::Bool(true))
            .with_attribute(AttributeDef::new("name", "string", "\"Entity\"")),
        ComponentDef::new("PointComponent")
            .with_flag("FLAG_A", FlagValue::Bool(true))
            .with_attribute(AttributeDef::new("x", "float", "0.0"))
            .with_attribute(AttributeDef::new("y", "float", "0.0")),
        ComponentDef::new("TemporaryComponent"),
    ])
}
