//! Config loading and TOML parsing tests.

use factlayer::Config;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_config_default_program_settings() {
    let config = Config::default();
    assert_eq!(config.program.input_dir, PathBuf::from("."));
    assert_eq!(config.program.output_dir, PathBuf::from("."));
    assert_eq!(config.program.num_threads, 1);
    assert!(config.program.stratum.is_none());
}

#[test]
fn test_config_default_logging() {
    let config = Config::default();
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, "text");
}

#[test]
fn test_config_from_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("factlayer.toml");
    fs::write(
        &path,
        r#"
[program]
input_dir = "/data/facts"
output_dir = "/data/out"
num_threads = 8
stratum = 2

[logging]
level = "debug"
format = "json"
"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.program.input_dir, PathBuf::from("/data/facts"));
    assert_eq!(config.program.output_dir, PathBuf::from("/data/out"));
    assert_eq!(config.program.num_threads, 8);
    assert_eq!(config.program.stratum, Some(2));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
}

#[test]
fn test_config_missing_file_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let config = Config::from_file(temp.path().join("absent.toml")).unwrap();
    assert_eq!(config.program.num_threads, 1);
}

#[test]
fn test_config_empty_sections() {
    let config = Config::from_toml_str("[program]\n[logging]\n").unwrap();
    assert_eq!(config.program.num_threads, 1);
    assert_eq!(config.logging.level, "info");
}
