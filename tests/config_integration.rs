//! Integration tests for settings files

use graphroute::config::{InspectSettings, Settings};
use tempfile::TempDir;

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("settings.toml");

    let mut settings = Settings::default();
    settings.inspect = InspectSettings::hidden().with_limit(25);
    settings.logging.filter = "graphroute=debug".to_string();
    settings.save(&path).unwrap();

    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn test_partial_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "[inspect]\nlimit = 10\n").unwrap();

    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded.inspect.limit, 10);
    assert_eq!(loaded.inspect.columns, 120);
    assert!(!loaded.inspect.hide_elements);
    assert_eq!(loaded.logging.filter, "info");
}

#[test]
fn test_invalid_files_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");

    std::fs::write(&path, "[inspect]\ncolumns = 0\n").unwrap();
    assert!(Settings::load(&path).is_err());

    std::fs::write(&path, "[inspect\n").unwrap();
    assert!(Settings::load(&path).is_err());

    assert!(Settings::load(dir.path().join("missing.toml")).is_err());
}
