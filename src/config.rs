//! Configuration loaded from `offboard.toml`.
//!
//! Every field has a default, so a missing file or a partial file is fine.
//! `GEMINI_API_KEY` in the environment takes precedence over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::OffboardError;

pub const CONFIG_FILE: &str = "offboard.toml";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OffboardConfig {
    /// Credential for the generation service. Empty disables drafting.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Upper bound for a single draft request.
    #[serde(default = "default_draft_timeout_secs")]
    pub draft_timeout_secs: u64,

    /// Directory holding one JSON document per ticket.
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Step template to use instead of the built-in offboarding sequence.
    #[serde(default)]
    pub template_path: Option<PathBuf>,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_draft_timeout_secs() -> u64 {
    30
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(".offboard/tickets")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for OffboardConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            api_base_url: default_api_base_url(),
            draft_timeout_secs: default_draft_timeout_secs(),
            store_dir: default_store_dir(),
            log_level: default_log_level(),
            template_path: None,
        }
    }
}

impl OffboardConfig {
    /// Loads `offboard.toml` from the working directory.
    pub fn load() -> Result<Self, OffboardError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Loads `path` if it exists, otherwise defaults; then applies the
    /// environment override for the API key.
    pub fn load_from(path: &Path) -> Result<Self, OffboardError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<OffboardConfig>(&contents)?
        } else {
            Self::default()
        };

        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            config.api_key = key;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), OffboardError> {
        if self.draft_timeout_secs == 0 {
            return Err(OffboardError::Config(
                "draft_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(OffboardError::Config("model must not be empty".into()));
        }
        Ok(())
    }

    pub fn draft_timeout(&self) -> Duration {
        Duration::from_secs(self.draft_timeout_secs)
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = OffboardConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.draft_timeout(), Duration::from_secs(30));
        assert_eq!(config.store_dir, PathBuf::from(".offboard/tickets"));
        assert_eq!(config.log_level, "info");
        assert!(!config.has_api_key());
        assert!(config.template_path.is_none());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            api_key = "test-key"
            draft_timeout_secs = 5
            template_path = "templates/offboarding.toml"
        "#;
        let config: OffboardConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.draft_timeout_secs, 5);
        assert_eq!(
            config.template_path,
            Some(PathBuf::from("templates/offboarding.toml"))
        );
        assert_eq!(config.model, "gemini-2.5-flash");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = OffboardConfig {
            draft_timeout_secs: 0,
            ..OffboardConfig::default()
        };
        assert!(matches!(config.validate(), Err(OffboardError::Config(_))));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "model = \"gemini-2.5-pro\"\nlog_level = \"debug\"\n").unwrap();

        let config = OffboardConfig::load_from(&path).unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn load_falls_back_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = OffboardConfig::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.draft_timeout_secs, 30);
    }
}
