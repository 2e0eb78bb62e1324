//! Configuration management for the CMS admin client

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name of the session store inside the platform data directory
pub const SESSION_FILE_NAME: &str = "session.json";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote CMS API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Session persistence configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote CMS API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Scheme, host and port of the CMS backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix of the CMS collection endpoints
    #[serde(default = "default_cms_path")]
    pub cms_path: String,

    /// Path of the token obtain endpoint
    #[serde(default = "default_token_path")]
    pub token_path: String,

    /// Path of the token refresh endpoint
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,

    /// Total request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

/// Where the session tokens are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// JSON file on disk
    #[default]
    File,
    /// Process memory only; the session ends with the process
    Memory,
}

/// Session persistence configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Storage backend
    #[serde(default)]
    pub store: StoreBackend,

    /// Explicit session file path (file backend only)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_cms_path() -> String {
    "cms".to_string()
}

fn default_token_path() -> String {
    "api/token".to_string()
}

fn default_refresh_path() -> String {
    "api/token/refresh".to_string()
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_connect_timeout() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cms_path: default_cms_path(),
            token_path: default_token_path(),
            refresh_path: default_refresh_path(),
            request_timeout_seconds: default_request_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Join a base URL and a path, always ending in the trailing slash Django expects
fn join_url(base: &str, path: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        format!("{}/", base.trim_end_matches('/'))
    } else {
        format!("{}/{}/", base.trim_end_matches('/'), path)
    }
}

impl ApiConfig {
    /// Build an API config pointing at `base_url` with default paths
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// URL of the token obtain endpoint
    #[must_use]
    pub fn token_url(&self) -> String {
        join_url(&self.base_url, &self.token_path)
    }

    /// URL of the token refresh endpoint
    #[must_use]
    pub fn refresh_url(&self) -> String {
        join_url(&self.base_url, &self.refresh_path)
    }

    /// URL of a CMS collection, e.g. `…/cms/hero/`
    #[must_use]
    pub fn collection_url(&self, collection: &str) -> String {
        join_url(&join_url(&self.base_url, &self.cms_path), collection)
    }

    /// URL of a single CMS record, e.g. `…/cms/hero/4/`
    #[must_use]
    pub fn item_url(&self, collection: &str, id: i64) -> String {
        format!("{}{id}/", self.collection_url(collection))
    }

    /// Get request timeout as Duration
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Get connect timeout as Duration
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl SessionConfig {
    /// Resolve the session file path, falling back to the platform data directory
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }

        directories::ProjectDirs::from("gov", "NexusCouncil", "nccms").map_or_else(
            || PathBuf::from(".nccms").join(SESSION_FILE_NAME),
            |dirs| dirs.data_dir().join(SESSION_FILE_NAME),
        )
    }
}

impl Config {
    /// Load configuration from `nccms.toml`/`config.toml` and `NCCMS_*` variables
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed.
    pub fn load() -> crate::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("nccms").required(false))
            .add_source(config::File::with_name("config").required(false));

        Self::finish(builder)
    }

    /// Load configuration from an explicit file, still honouring `NCCMS_*` variables
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or the configuration cannot be parsed.
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let builder = config::Config::builder().add_source(config::File::from(path));
        Self::finish(builder)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> crate::Result<Self> {
        let config: Self = builder
            .add_source(
                config::Environment::with_prefix("NCCMS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that serde defaults cannot guard
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unusable base URL or zero timeouts.
    pub fn validate(&self) -> crate::Result<()> {
        let base = self.api.base_url.trim();
        if base.is_empty() {
            return Err(crate::Error::configuration("api.base_url must not be empty"));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(crate::Error::configuration(format!(
                "api.base_url must start with http:// or https://, got '{base}'"
            )));
        }
        if self.api.request_timeout_seconds == 0 || self.api.connect_timeout_seconds == 0 {
            return Err(crate::Error::configuration(
                "api timeouts must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api.cms_path, "cms");
        assert_eq!(config.api.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.api.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.session.store, StoreBackend::File);
        assert!(config.session.path.is_none());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_endpoint_urls() {
        let api = ApiConfig::with_base_url("http://cms.example.org/");

        assert_eq!(api.token_url(), "http://cms.example.org/api/token/");
        assert_eq!(api.refresh_url(), "http://cms.example.org/api/token/refresh/");
        assert_eq!(api.collection_url("hero"), "http://cms.example.org/cms/hero/");
        assert_eq!(
            api.item_url("faq-items", 12),
            "http://cms.example.org/cms/faq-items/12/"
        );
    }

    #[test]
    fn test_partial_config_deserialization() {
        let json_str = r#"{
            "api": {"base_url": "https://cms.nexus.gov"},
            "session": {"store": "memory"}
        }"#;

        let config: Config = serde_json::from_str(json_str).unwrap();

        assert_eq!(config.api.base_url, "https://cms.nexus.gov");
        assert_eq!(config.api.refresh_path, "api/token/refresh");
        assert_eq!(config.session.store, StoreBackend::Memory);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.api.base_url = "  ".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "ftp://cms".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = default_base_url();
        config.api.request_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_session_path_wins() {
        let session = SessionConfig {
            store: StoreBackend::File,
            path: Some(PathBuf::from("/tmp/nccms/session.json")),
        };
        assert_eq!(session.resolved_path(), PathBuf::from("/tmp/nccms/session.json"));

        let fallback = SessionConfig::default().resolved_path();
        assert!(fallback.ends_with(SESSION_FILE_NAME));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nccms.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"http://10.0.0.5:9000\"\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.api.base_url, "http://10.0.0.5:9000");
        assert_eq!(config.api.token_url(), "http://10.0.0.5:9000/api/token/");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_load_from_rejects_invalid_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[api]\nbase_url = \"cms.local\"\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
