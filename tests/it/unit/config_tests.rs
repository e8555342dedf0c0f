//! Unit tests for config persistence and hot apply.

use crate::helpers::stage;
use dragcore::config::{DragConfig, SnapOrient};
use dragcore::ConfigError;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_save_and_load_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("drag.json");

    let mut config = DragConfig::default();
    config.snap.enabled = true;
    config.snap.orient = SnapOrient::X;
    config.shadow.class = Some("ghost".into());
    config.save(&path).unwrap();

    let loaded = DragConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let result = DragConfig::load(dir.path().join("absent.json"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_load_invalid_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("drag.json");
    fs::write(&path, r#"{ "scroll": { "speed": -5 } }"#).unwrap();

    let err = DragConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("scroll.speed"));
}

#[test]
fn test_empty_object_is_default() {
    assert_eq!(DragConfig::from_json("{}").unwrap(), DragConfig::default());
}

#[test]
fn test_apply_loaded_config_to_running_core() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("drag.json");
    fs::write(&path, r#"{ "direction": { "enabled": true } }"#).unwrap();

    let stage = stage();
    stage.core.apply_config(DragConfig::load(&path).unwrap());
    assert!(stage.core.config().direction.enabled);

    stage.drag((50.0, 50.0), &[(80.0, 120.0)]);
    assert_eq!(stage.position(), (40.0, 10.0));
}

#[test]
fn test_zero_interval_is_invalid() {
    let err = DragConfig::from_json(r#"{ "scroll": { "intervalMs": 0 } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("scroll.intervalMs"));
}
