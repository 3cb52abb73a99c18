//! Conversion configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::target::TARGET_VERSION;

/// Conversion configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Version marker written to the output's `openapi` field
    #[serde(default = "default_target_version")]
    pub target_version: String,

    /// How repeated security requirements on one operation are combined
    #[serde(default)]
    pub security: SecurityMode,

    /// What to do when two entries sanitize to the same key
    #[serde(default)]
    pub key_collisions: CollisionPolicy,

    /// Pretty-print the output document
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_target_version() -> String {
    TARGET_VERSION.to_string()
}

const fn default_pretty() -> bool {
    true
}

/// Combination rule for operation security requirements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityMode {
    /// Each requirement replaces the previous one; only the last is kept
    #[default]
    Last,
    /// Every requirement is kept, in declaration order, as an array
    All,
}

/// Handling of duplicate request/response keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Log a warning; the later entry replaces the earlier one
    #[default]
    Warn,
    /// Abort the conversion
    Error,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_version: default_target_version(),
            security: SecurityMode::default(),
            key_collisions: CollisionPolicy::default(),
            pretty: default_pretty(),
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.apiflat.toml)
    ///
    /// # Errors
    ///
    /// Returns error if a config file exists but cannot be read or parsed
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_from_dir(Path::new("."))
    }

    /// Look for a config file in `dir`; fall back to defaults when none exists.
    ///
    /// # Errors
    ///
    /// Returns error if a config file exists but cannot be read or parsed
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let candidates = [".apiflat.toml", ".apiflat.json", "apiflat.toml"];

        for name in candidates {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }

        Ok(Self::default())
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# apiflat configuration

# Version marker written to the output document
target_version = "4.0.0"

# Repeated security requirements on one operation:
#   "last" keeps only the last one, "all" keeps every one as an array
security = "last"

# Two media types that sanitize to the same request/response key:
#   "warn" logs and keeps the later entry, "error" aborts the conversion
key_collisions = "warn"

# Pretty-print the output (default: true)
pretty = true
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.target_version, "4.0.0");
        assert_eq!(config.security, SecurityMode::Last);
        assert_eq!(config.key_collisions, CollisionPolicy::Warn);
        assert!(config.pretty);
    }

    #[test]
    fn parse_toml() {
        let toml = r#"
target_version = "4.0.0-draft"
security = "all"
key_collisions = "error"
pretty = false
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.target_version, "4.0.0-draft");
        assert_eq!(config.security, SecurityMode::All);
        assert_eq!(config.key_collisions, CollisionPolicy::Error);
        assert!(!config.pretty);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: Config = toml::from_str("security = \"all\"\n").unwrap();
        assert_eq!(config.security, SecurityMode::All);
        assert_eq!(config.target_version, "4.0.0");
        assert!(config.pretty);
    }

    #[test]
    fn example_parses_to_default() {
        let config: Config = toml::from_str(Config::example()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apiflat.json");
        std::fs::write(&path, r#"{"key_collisions": "error"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.key_collisions, CollisionPolicy::Error);
    }

    #[test]
    fn load_from_dir_finds_dotfile() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".apiflat.toml"), "pretty = false\n").unwrap();

        let config = Config::load_from_dir(dir.path()).unwrap();
        assert!(!config.pretty);
    }

    #[test]
    fn load_from_empty_dir_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::load(Path::new("/nonexistent/apiflat.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_, _)));
    }

    #[test]
    fn unknown_mode_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apiflat.toml");
        std::fs::write(&path, "security = \"first\"\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
