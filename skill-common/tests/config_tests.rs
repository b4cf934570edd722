//! Settings loading and settings-file resolution tests
//!
//! Covers:
//! - Missing settings files degrade to built-in defaults
//! - Malformed settings files are reported
//! - TOML and JSON files are both accepted
//! - Priority order for settings-file resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate SKILL_INVIDIOUS_CONFIG are marked with #[serial].

use serial_test::serial;
use skill_common::config::{resolve_settings_path, SkillSettings, WatchUrlStyle, SETTINGS_ENV_VAR};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    let settings = SkillSettings::load_or_default(Some(&missing)).unwrap();
    assert_eq!(settings, SkillSettings::default());
}

#[test]
fn test_no_file_uses_defaults() {
    let settings = SkillSettings::load_or_default(None).unwrap();
    assert_eq!(settings, SkillSettings::default());
}

#[test]
fn test_malformed_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.toml");
    fs::write(&path, "fallback_mode = [[[").unwrap();

    assert!(SkillSettings::load_or_default(Some(&path)).is_err());
}

#[test]
fn test_load_toml_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.toml");
    fs::write(
        &path,
        r#"
instances = ["https://fallback.example.org"]
watch_url_style = "instance"

[instance_management]
custom_instances = ["https://mine.example.org"]
max_instances = 3
discovery_enabled = false
"#,
    )
    .unwrap();

    let settings = SkillSettings::load(&path).unwrap();
    assert_eq!(settings.instances, vec!["https://fallback.example.org"]);
    assert_eq!(settings.watch_url_style, WatchUrlStyle::Instance);
    assert_eq!(settings.instance_management.max_instances, 3);
    assert!(!settings.instance_management.discovery_enabled);
}

#[test]
fn test_load_json_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "search_settings": { "default_duration": "short", "max_results": 5 },
            "fallback_mode": true
        }"#,
    )
    .unwrap();

    let settings = SkillSettings::load(&path).unwrap();
    assert_eq!(settings.search.default_duration, "short");
    assert_eq!(settings.search.max_results, 5);
    assert!(settings.fallback_mode);
}

#[test]
#[serial]
fn test_cli_argument_wins_over_env() {
    env::set_var(SETTINGS_ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_settings_path(Some(Path::new("/tmp/from-cli.toml")), SETTINGS_ENV_VAR);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-cli.toml")));

    env::remove_var(SETTINGS_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_argument() {
    env::set_var(SETTINGS_ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_settings_path(None, SETTINGS_ENV_VAR);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var(SETTINGS_ENV_VAR);
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    env::set_var(SETTINGS_ENV_VAR, "   ");

    let resolved = resolve_settings_path(None, SETTINGS_ENV_VAR);
    assert_ne!(resolved, Some(PathBuf::from("   ")));

    env::remove_var(SETTINGS_ENV_VAR);
}
