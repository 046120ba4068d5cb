//! Configuration file support
//!
//! Loads optional settings from ~/.watson-nlc/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Settings read from the TOML config file; every field is optional
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Classifier service base URL
    pub nlc_url: Option<String>,

    /// Classifier used by dialog queries
    pub classifier_id: Option<String>,

    /// Minimum score a result needs to be displayed
    pub score_filter: Option<f64>,

    /// Display line template
    pub display_template: Option<String>,

    /// Stub text used when no classifier is configured
    pub fake_result: Option<String>,

    /// Conversation service base URL
    pub conversation_url: Option<String>,

    /// Conversation API version date
    pub conversation_version: Option<String>,

    /// Conversation workspace
    pub workspace_id: Option<String>,

    pub username: Option<String>,
    pub password: Option<String>,

    pub timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl ConfigFile {
    /// Load from `path`; a missing or malformed file yields the empty config
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".watson-nlc")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_path() {
        let path = config_path();
        assert!(path.to_string_lossy().contains(".watson-nlc"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigFile::load(&dir.path().join("absent.toml"));
        assert!(config.nlc_url.is_none());
        assert!(config.workspace_id.is_none());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
workspace_id = "ws-42"
score_filter = 0.35
timeout_secs = 15
display_template = "{{index}}. {{name}}"
"#
        )
        .unwrap();

        let config = ConfigFile::load(file.path());
        assert_eq!(config.workspace_id.as_deref(), Some("ws-42"));
        assert_eq!(config.score_filter, Some(0.35));
        assert_eq!(config.timeout_secs, Some(15));
        assert_eq!(config.display_template.as_deref(), Some("{index}. {name}"));
    }

    #[test]
    fn test_malformed_file_is_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "workspace_id = [unterminated").unwrap();
        let config = ConfigFile::load(file.path());
        assert!(config.workspace_id.is_none());
    }
}
