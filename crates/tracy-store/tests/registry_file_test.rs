// Integration tests for registry persistence

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracy_core::errors::TracyError;
use tracy_core::{ProjectRegistry, VersionEntry, VersionNumber};
use tracy_store::{RegistryFile, TracyConfig};

fn setup() -> (RegistryFile, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = TracyConfig::new(dir.path());
    (RegistryFile::new(config.registry_path()), dir)
}

#[test]
fn test_missing_file_loads_empty() {
    let (file, _dir) = setup();

    let registry = file.load().unwrap();

    assert!(registry.project_names().is_empty());
    assert!(!file.exists());
}

#[test]
fn test_save_then_load_preserves_entries_and_flags() {
    let (file, _dir) = setup();
    let mut registry = ProjectRegistry::new();
    registry.create_project("demo").unwrap();
    registry
        .append_entry(
            "demo",
            VersionEntry::new(
                "ab".repeat(32),
                PathBuf::from("/work/notes.md"),
                VersionNumber::INITIAL,
                "first".to_string(),
                Some("draft".to_string()),
            ),
        )
        .unwrap();
    registry
        .mark_current("demo", Path::new("/work/notes.md"), &"ab".repeat(32))
        .unwrap();
    registry.set_last_used("demo", Path::new("/work/notes.md"));

    file.save(&registry).unwrap();
    let loaded = file.load().unwrap();

    assert_eq!(loaded, registry);
}

#[test]
fn test_saved_json_uses_persisted_field_names() {
    let (file, _dir) = setup();
    let mut registry = ProjectRegistry::new();
    registry.create_project("demo").unwrap();
    registry
        .append_entry(
            "demo",
            VersionEntry::new(
                "cd".repeat(32),
                PathBuf::from("/a"),
                VersionNumber::new(1, 2, 3),
                String::new(),
                None,
            ),
        )
        .unwrap();

    file.save(&registry).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(file.path()).unwrap()).unwrap();

    let entry = &value["projects"]["demo"]["versions"][0];
    assert_eq!(entry["version"], "1.2.3");
    assert_eq!(entry["latest"], true);
    assert_eq!(entry["current"], false);
    assert!(entry["hash"].is_string());
    assert!(entry["timestamp"].is_string());
}

#[test]
fn test_ensure_is_idempotent() {
    let (file, _dir) = setup();
    file.ensure().unwrap();
    let mut registry = file.load().unwrap();
    registry.create_project("kept").unwrap();
    file.save(&registry).unwrap();

    file.ensure().unwrap();

    assert!(file.load().unwrap().has_project("kept"));
}

#[test]
fn test_corrupt_file_is_serialization_error() {
    let (file, _dir) = setup();
    fs::write(file.path(), b"{ not json").unwrap();

    let err = file.load().unwrap_err();

    assert!(matches!(err, TracyError::Serialization { .. }));
}
