//! Application configuration bootstrap.
//!
//! Loads `config.toml` from the termpal base directory and best-effort
//! creates the sibling files and directories the application expects
//! (`memory.txt`, `workflows/`, `plugins/`). Bootstrap failures are
//! reported and never fatal: the application runs with defaults instead.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Model queried when the configuration does not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";

/// Root application configuration, stored as `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API key for the Gemini responder. When absent the application
    /// falls back to the offline rule-based responder.
    pub gemini_key: Option<String>,
    /// Model name passed to the responder backend.
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_key: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Config {
    /// Loads the configuration from `<base_dir>/config.toml`, creating a
    /// default template when the file is missing, and best-effort creating
    /// the sibling directories and files the application expects.
    ///
    /// Any failure along the way is reported and answered with defaults;
    /// bootstrap never fails the process.
    pub fn load_or_create(base_dir: &Path) -> Self {
        for dir in [base_dir.join("workflows"), base_dir.join("plugins")] {
            if let Err(e) = fs::create_dir_all(&dir) {
                tracing::warn!("Failed to create directory {:?}: {}", dir, e);
            }
        }

        let memory_file = base_dir.join("memory.txt");
        if !memory_file.exists() {
            if let Err(e) = fs::write(&memory_file, "") {
                tracing::warn!("Failed to create memory file {:?}: {}", memory_file, e);
            }
        }

        let config_file = base_dir.join("config.toml");
        match fs::read_to_string(&config_file) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse {:?}, using defaults: {}", config_file, e);
                    Self::default()
                }
            },
            Err(_) => {
                let config = Self::default();
                match toml::to_string_pretty(&config) {
                    Ok(template) => {
                        if let Err(e) = fs::write(&config_file, template) {
                            tracing::warn!(
                                "Failed to write config template {:?}: {}",
                                config_file,
                                e
                            );
                        }
                    }
                    Err(e) => tracing::warn!("Failed to serialize default config: {}", e),
                }
                config
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_writes_template_and_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();

        let config = Config::load_or_create(temp_dir.path());

        assert_eq!(config, Config::default());
        assert!(temp_dir.path().join("config.toml").exists());
        assert!(temp_dir.path().join("memory.txt").exists());
        assert!(temp_dir.path().join("workflows").is_dir());
        assert!(temp_dir.path().join("plugins").is_dir());
    }

    #[test]
    fn existing_config_is_loaded() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("config.toml"),
            "gemini_key = \"secret\"\nmodel = \"gemini-1.5-pro\"\n",
        )
        .unwrap();

        let config = Config::load_or_create(temp_dir.path());

        assert_eq!(config.gemini_key.as_deref(), Some("secret"));
        assert_eq!(config.model, "gemini-1.5-pro");
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("config.toml"), "gemini_key = \"k\"\n").unwrap();

        let config = Config::load_or_create(temp_dir.path());

        assert_eq!(config.gemini_key.as_deref(), Some("k"));
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn unparsable_config_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("config.toml"), "model = [broken").unwrap();

        let config = Config::load_or_create(temp_dir.path());

        assert_eq!(config, Config::default());
    }
}
