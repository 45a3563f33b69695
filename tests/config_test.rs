//! Tests for layered Settings loading

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use formtree::application::ApplicationError;
use formtree::config::{IdStrategy, Settings};

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("formtree.toml");
    std::fs::write(&path, content).expect("write config");
    path
}

// ============================================================
// Settings::load() with an explicit config file
// ============================================================

#[test]
fn given_config_file_when_loading_then_overrides_defaults() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        r#"
id_prefix = "field"
id_strategy = "sequential"
default_node_name = "Untitled"

[selection]
parent_selection = false
"#,
    );

    let settings = Settings::load(Some(&path)).unwrap();

    assert_eq!(settings.id_prefix, "field");
    assert_eq!(settings.id_strategy, IdStrategy::Sequential);
    assert_eq!(settings.default_node_name, "Untitled");
    assert!(!settings.selection.parent_selection);
    // not specified: defaults survive
    assert!(settings.selection.multiple);
    assert!(settings.pretty_json);
}

#[test]
fn given_missing_config_file_when_loading_then_config_error() {
    let temp = TempDir::new().unwrap();
    let err = Settings::load(Some(&temp.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, ApplicationError::Config { .. }), "{err}");
}

#[test]
fn given_invalid_toml_when_loading_then_config_error_names_file() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "id_strategy = \"uuid\"\n");

    let err = Settings::load(Some(&path)).unwrap_err();

    assert!(err.to_string().contains("formtree.toml"), "{err}");
}

#[test]
fn given_prefix_with_whitespace_in_file_when_loading_then_rejected_up_front() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "id_prefix = \"my node\"\n");

    let err = Settings::load(Some(&path)).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }), "{err}");
    assert!(err.to_string().contains("my node"), "{err}");
}

#[test]
fn given_template_when_written_as_config_then_loads_defaults() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, &Settings::template());

    let settings = Settings::load(Some(&path)).unwrap();

    assert_eq!(settings.selection, Settings::default().selection);
    assert_eq!(settings.default_node_name, "New node");
}
