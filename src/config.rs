//! On-disk configuration.
//!
//! Stored as pretty JSON under `~/.courseport/config.json`. Every field has a
//! default matching the original deployment, so a missing file yields a
//! working portal pointed at the remote course repository.

use crate::auth::Credentials;
use crate::source::{ContentSource, GithubSource, LocalSource};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Which backing store serves the course files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    /// A directory on the local filesystem.
    Local { dir: PathBuf },
    /// A GitHub repository subdirectory.
    Github {
        owner: String,
        repo: String,
        branch: String,
        path: String,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Github {
            owner: "azaz6216".to_string(),
            repo: "cousrecontent".to_string(),
            branch: "main".to_string(),
            path: "my-course/content".to_string(),
        }
    }
}

impl SourceConfig {
    /// Build the runtime adapter for this configuration.
    pub fn build(&self) -> ContentSource {
        match self {
            SourceConfig::Local { dir } => ContentSource::Local(LocalSource::new(dir.clone())),
            SourceConfig::Github {
                owner,
                repo,
                branch,
                path,
            } => ContentSource::Github(GithubSource::new(owner, repo, branch, path)),
        }
    }

    /// Human-readable location for status output.
    pub fn describe(&self) -> String {
        match self {
            SourceConfig::Local { dir } => format!("local directory {}", dir.display()),
            SourceConfig::Github {
                owner,
                repo,
                branch,
                path,
            } => format!("github {}/{}@{}:{}", owner, repo, branch, path),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Login username. Replace in any real deployment.
    #[serde(default = "default_username")]
    pub username: String,
    /// Login password. Replace in any real deployment.
    #[serde(default = "default_password")]
    pub password: String,
    /// Server port.
    pub port: Option<u16>,
    /// Where the course files come from.
    #[serde(default)]
    pub source: SourceConfig,
    /// DOCX preview capability. None means: follow the source default
    /// (on for local, off for remote).
    #[serde(default)]
    pub docx_preview: Option<bool>,
}

fn default_username() -> String {
    "Compiler Design".to_string()
}

fn default_password() -> String {
    "cse331".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
            port: None,
            source: SourceConfig::default(),
            docx_preview: None,
        }
    }
}

impl Config {
    /// Credential pair the login form is checked against.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }

    /// Effective DOCX preview capability for the configured source.
    pub fn docx_preview_enabled(&self) -> bool {
        self.docx_preview
            .unwrap_or_else(|| self.source.build().default_docx_preview())
    }

    /// Load from an explicit path; missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Config> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Cannot read config at {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid config at {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Save as pretty JSON to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Cannot write config at {}", path.display()))?;
        Ok(())
    }
}

/// `~/.courseport`, created on first use.
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    let config_dir = home.join(".courseport");
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }
    Ok(config_dir)
}

/// Load the config from the default location.
pub fn load_config() -> Result<Config> {
    Config::load_from(&get_config_dir()?.join("config.json"))
}

/// Save the config to the default location.
pub fn save_config(config: &Config) -> Result<()> {
    config.save_to(&get_config_dir()?.join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_deployment() {
        let config = Config::default();
        assert_eq!(config.username, "Compiler Design");
        assert_eq!(config.password, "cse331");
        assert!(config.port.is_none());
        match &config.source {
            SourceConfig::Github {
                owner,
                repo,
                branch,
                path,
            } => {
                assert_eq!(owner, "azaz6216");
                assert_eq!(repo, "cousrecontent");
                assert_eq!(branch, "main");
                assert_eq!(path, "my-course/content");
            }
            other => panic!("unexpected default source: {:?}", other),
        }
    }

    #[test]
    fn test_docx_capability_follows_source() {
        let mut config = Config::default();
        // Remote default: off.
        assert!(!config.docx_preview_enabled());

        config.source = SourceConfig::Local {
            dir: PathBuf::from("/tmp/content"),
        };
        // Local default: on.
        assert!(config.docx_preview_enabled());

        // Explicit value wins either way.
        config.docx_preview = Some(false);
        assert!(!config.docx_preview_enabled());
        config.source = SourceConfig::default();
        config.docx_preview = Some(true);
        assert!(config.docx_preview_enabled());
    }

    #[test]
    fn test_load_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.port = Some(9090);
        config.source = SourceConfig::Local {
            dir: PathBuf::from("/srv/course"),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.port, Some(9090));
        assert!(matches!(loaded.source, SourceConfig::Local { .. }));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config.username, "Compiler Design");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"port": 1234}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.port, Some(1234));
        assert_eq!(config.password, "cse331");
        assert!(matches!(config.source, SourceConfig::Github { .. }));
    }
}
