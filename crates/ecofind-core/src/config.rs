//! Configuration management for the `EcoFind` admin console

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Console server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Marketplace backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Session persistence configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// List rendering configuration
    #[serde(default)]
    pub console: ConsoleConfig,

    /// Chat lead configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Marketplace backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend origin, without a trailing slash
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Value sent in the `x-frontend-type` header on login
    #[serde(default = "default_frontend_type")]
    pub frontend_type: String,
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// JSON document holding persisted entries
    #[serde(default = "default_session_path")]
    pub storage_path: PathBuf,

    /// Key under which the `{token, user}` pair is stored
    #[serde(default = "default_session_key")]
    pub storage_key: String,
}

/// List rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Rows per page on the KYC and product review screens
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Number of products shown in the dashboard "recent" list
    #[serde(default = "default_recent_products")]
    pub recent_products: usize,
}

/// Chat widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Where the dialog posts collected leads. Defaults to this server's own
    /// `/api/chatlead` endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_url: Option<String>,

    /// Seconds a conversation may sit untouched before it is discarded
    #[serde(default = "default_chat_idle_timeout")]
    pub idle_timeout: u64,

    /// Live conversations kept at once; new ones are refused beyond this
    #[serde(default = "default_max_conversations")]
    pub max_conversations: usize,

    /// Most recent leads kept from the chat-lead endpoint
    #[serde(default = "default_lead_buffer")]
    pub lead_buffer: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or text)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    3000
}

fn default_backend_url() -> String {
    "http://localhost:5000/api".to_string()
}

const fn default_request_timeout() -> u64 {
    30
}

fn default_frontend_type() -> String {
    "admin".to_string()
}

fn default_session_path() -> PathBuf {
    PathBuf::from("./data/session.json")
}

fn default_session_key() -> String {
    "auth".to_string()
}

const fn default_page_size() -> usize {
    10
}

const fn default_recent_products() -> usize {
    5
}

const fn default_chat_idle_timeout() -> u64 {
    1800
}

const fn default_max_conversations() -> usize {
    1000
}

const fn default_lead_buffer() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            request_timeout: default_request_timeout(),
            frontend_type: default_frontend_type(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: default_session_path(),
            storage_key: default_session_key(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            recent_products: default_recent_products(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            lead_url: None,
            idle_timeout: default_chat_idle_timeout(),
            max_conversations: default_max_conversations(),
            lead_buffer: default_lead_buffer(),
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

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            backend: BackendConfig {
                base_url: std::env::var("ECOFIND_BACKEND_URL")
                    .unwrap_or_else(|_| default_backend_url()),
                ..BackendConfig::default()
            },
            session: SessionConfig::default(),
            console: ConsoleConfig::default(),
            chat: ChatConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default `config` file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed.
    pub fn load() -> crate::Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, optionally from an explicit file
    ///
    /// Environment variables prefixed with `ECOFIND_` override file values,
    /// using `__` between section and key (`ECOFIND_BACKEND__BASE_URL`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or values fail to parse.
    pub fn load_from(path: Option<&Path>) -> crate::Result<Self> {
        let file_source = path.map_or_else(
            || config::File::with_name("config").required(false),
            |path| config::File::from(path).required(true),
        );

        let config = config::Config::builder()
            .add_source(file_source)
            .add_source(config::Environment::with_prefix("ECOFIND").separator("__"))
            .build()
            .map_err(|e| crate::Error::Configuration {
                message: e.to_string(),
            })?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| crate::Error::Configuration {
                message: e.to_string(),
            })?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject values that would make the console unusable
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] naming the offending value.
    pub fn validate(&self) -> crate::Result<()> {
        if self.console.page_size == 0 {
            return Err(crate::Error::Configuration {
                message: "console.page_size must be at least 1".to_string(),
            });
        }
        if self.backend.base_url.trim().is_empty() {
            return Err(crate::Error::Configuration {
                message: "backend.base_url must not be empty".to_string(),
            });
        }
        if self.session.storage_key.is_empty() {
            return Err(crate::Error::Configuration {
                message: "session.storage_key must not be empty".to_string(),
            });
        }
        if self.chat.idle_timeout == 0 || self.chat.max_conversations == 0 {
            return Err(crate::Error::Configuration {
                message: "chat.idle_timeout and chat.max_conversations must be at least 1"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// Backend origin with any trailing slash removed
    #[must_use]
    pub fn backend_url(&self) -> &str {
        self.backend.base_url.trim_end_matches('/')
    }

    /// URL the chat dialog submits leads to
    #[must_use]
    pub fn lead_url(&self) -> String {
        self.chat.lead_url.clone().unwrap_or_else(|| {
            format!(
                "http://{}:{}/api/chatlead",
                self.server.host, self.server.port
            )
        })
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.backend.request_timeout, 30);
        assert_eq!(config.backend.frontend_type, "admin");
        assert_eq!(config.session.storage_key, "auth");
        assert_eq!(config.console.page_size, 10);
        assert_eq!(config.console.recent_products, 5);
        assert!(config.chat.lead_url.is_none());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_deserialization() {
        let json_str = r#"{
            "server": {"port": 8088},
            "backend": {"base_url": "https://api.example.com/"},
            "console": {}
        }"#;

        let config: Config = serde_json::from_str(json_str).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.backend_url(), "https://api.example.com");
        assert_eq!(config.console.page_size, 10);
        assert_eq!(config.session.storage_key, "auth");
    }

    #[test]
    fn test_lead_url_defaults_to_own_endpoint() {
        let mut config = Config::default();
        config.server.port = 4100;
        assert_eq!(config.lead_url(), "http://127.0.0.1:4100/api/chatlead");

        config.chat.lead_url = Some("https://crm.example.com/leads".to_string());
        assert_eq!(config.lead_url(), "https://crm.example.com/leads");
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let mut config = Config::default();
        config.console.page_size = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_validate_rejects_blank_backend() {
        let mut config = Config::default();
        config.backend.base_url = "   ".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_chat_limits_default_and_validate() {
        let config: Config = serde_json::from_str(r#"{"chat": {"lead_buffer": 5}}"#).unwrap();
        assert_eq!(config.chat.lead_buffer, 5);
        assert_eq!(config.chat.idle_timeout, 1800);
        assert_eq!(config.chat.max_conversations, 1000);

        let mut config = Config::default();
        config.chat.max_conversations = 0;
        assert!(config.validate().unwrap_err().to_string().contains("chat"));
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9191\n\n[console]\npage_size = 25\n\n[session]\nstorage_key = \"admin-auth\""
        )
        .unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();

        assert_eq!(config.server.port, 9191);
        assert_eq!(config.console.page_size, 25);
        assert_eq!(config.session.storage_key, "admin-auth");
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let result = Config::load_from(Some(Path::new("/nonexistent/ecofind.toml")));
        assert!(result.is_err());
    }
}
