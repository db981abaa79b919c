//! Configuration System
//!
//! Provides hierarchical configuration loading from:
//! - factlayer.toml (default configuration)
//! - factlayer.local.toml (git-ignored local overrides)
//! - Environment variables (FACTLAYER_* prefix)
//!
//! ## Example
//!
//! ```toml
//! # factlayer.toml
//! [program]
//! input_dir = "./facts"
//! output_dir = "./out"
//! num_threads = 4
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! Environment variable overrides:
//! ```bash
//! FACTLAYER_PROGRAM__NUM_THREADS=8
//! FACTLAYER_LOGGING__FORMAT=json
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::InterfaceResult;

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub program: ProgramConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings handed to a program instance before it runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Directory input relations are loaded from
    #[serde(default = "default_dir")]
    pub input_dir: PathBuf,

    /// Directory output relations are stored to
    #[serde(default = "default_dir")]
    pub output_dir: PathBuf,

    /// Thread count hint passed to the program (`set_num_threads`)
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,

    /// Run a single stratum instead of the whole program
    #[serde(default)]
    pub stratum: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_num_threads() -> usize {
    1
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Merges in order:
    /// 1. factlayer.toml (base configuration)
    /// 2. factlayer.local.toml (local overrides, git-ignored)
    /// 3. Environment variables (FACTLAYER_* prefix)
    pub fn load() -> InterfaceResult<Self> {
        Ok(Figment::new()
            .merge(Toml::file("factlayer.toml"))
            .merge(Toml::file("factlayer.local.toml"))
            .merge(Env::prefixed("FACTLAYER_").split("__"))
            .extract()?)
    }

    /// Load configuration from a specific file, then environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> InterfaceResult<Self> {
        Ok(Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("FACTLAYER_").split("__"))
            .extract()?)
    }

    /// Parse configuration from a TOML string, without environment overrides
    pub fn from_toml_str(toml: &str) -> InterfaceResult<Self> {
        Ok(Figment::new().merge(Toml::string(toml)).extract()?)
    }
}

impl Default for ProgramConfig {
    fn default() -> Self {
        ProgramConfig {
            input_dir: default_dir(),
            output_dir: default_dir(),
            num_threads: default_num_threads(),
            stratum: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.program.input_dir, PathBuf::from("."));
        assert_eq!(config.program.num_threads, 1);
        assert_eq!(config.program.stratum, None);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = Config::from_toml_str("[program]\nnum_threads = 4\n").unwrap();
        assert_eq!(config.program.num_threads, 4);
        assert_eq!(config.program.output_dir, PathBuf::from("."));
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml_str("[program]\nnum_threads = \"many\"\n").unwrap_err();
        assert!(matches!(err, crate::InterfaceError::Config(_)));
    }
}
