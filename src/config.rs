//! Runtime configuration.
//!
//! Values come from three layers, later layers winning:
//! 1. Built-in defaults
//! 2. An optional YAML file (`--config`)
//! 3. Command-line flags and their environment variables

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://news-backend-node.onrender.com";
pub const DEFAULT_SESSION_FILE: &str = ".news_views/session.json";

/// Keys accepted in the YAML config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub session_file: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub auth_scheme: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Backend root, always ending in `/`.
    pub base_url: Url,
    pub session_file: PathBuf,
    /// `None` leaves requests unbounded.
    pub request_timeout: Option<Duration>,
    pub auth_scheme: Option<String>,
}

impl AppConfig {
    /// Merge the config file (if any) with CLI overrides.
    #[instrument(level = "info", skip_all)]
    pub fn resolve(
        config_path: Option<&Path>,
        base_url: Option<&str>,
        session_file: Option<&Path>,
    ) -> Result<Self> {
        let file = match config_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                info!(path = %path.display(), "Loaded configuration file");
                serde_yaml::from_str::<FileConfig>(&raw)?
            }
            None => FileConfig::default(),
        };
        Self::from_layers(file, base_url, session_file)
    }

    fn from_layers(
        file: FileConfig,
        base_url: Option<&str>,
        session_file: Option<&Path>,
    ) -> Result<Self> {
        let raw_url = base_url
            .map(str::to_string)
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let config = AppConfig {
            base_url: normalize_base_url(&raw_url)?,
            session_file: session_file
                .map(Path::to_path_buf)
                .or(file.session_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE)),
            request_timeout: file.request_timeout_secs.map(Duration::from_secs),
            auth_scheme: file.auth_scheme.filter(|s| !s.trim().is_empty()),
        };
        debug!(?config, "Resolved configuration");
        Ok(config)
    }
}

/// Parse `raw` and make sure its path ends in `/`.
fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(Error::Config(format!("{} cannot be used as a base URL", raw)));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::resolve(None, None, None).unwrap();
        assert_eq!(config.base_url.as_str(), "https://news-backend-node.onrender.com/");
        assert_eq!(config.session_file, PathBuf::from(DEFAULT_SESSION_FILE));
        assert!(config.request_timeout.is_none());
        assert!(config.auth_scheme.is_none());
    }

    #[test]
    fn test_file_then_cli_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "base_url: http://localhost:5000/api\nsession_file: /tmp/s.json\nrequest_timeout_secs: 10\nauth_scheme: Bearer\n",
        )
        .unwrap();

        let from_file = AppConfig::resolve(Some(path.as_path()), None, None).unwrap();
        assert_eq!(from_file.base_url.as_str(), "http://localhost:5000/api/");
        assert_eq!(from_file.session_file, PathBuf::from("/tmp/s.json"));
        assert_eq!(from_file.request_timeout, Some(Duration::from_secs(10)));
        assert_eq!(from_file.auth_scheme.as_deref(), Some("Bearer"));

        let overridden = AppConfig::resolve(
            Some(path.as_path()),
            Some("https://other.example"),
            Some(Path::new("mine.json")),
        )
        .unwrap();
        assert_eq!(overridden.base_url.as_str(), "https://other.example/");
        assert_eq!(overridden.session_file, PathBuf::from("mine.json"));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(AppConfig::resolve(None, Some("not a url"), None).is_err());
        assert!(AppConfig::resolve(None, Some("mailto:a@b.c"), None).is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "unknown_key: 1\n").unwrap();
        assert!(matches!(
            AppConfig::resolve(Some(path.as_path()), None, None),
            Err(Error::ConfigYaml(_))
        ));
        assert!(AppConfig::resolve(Some(dir.path().join("missing.yaml").as_path()), None, None).is_err());
    }
}
