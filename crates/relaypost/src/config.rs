use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tokio::fs;
use url::Url;

use crate::store::StoreError;

pub const DESTINATION_TOKEN_ENV: &str = "RELAYPOST_DESTINATION_TOKEN";
pub const SLACK_SIGNING_SECRET_ENV: &str = "SLACK_SIGNING_SECRET";
pub const SLACK_BOT_TOKEN_ENV: &str = "SLACK_BOT_TOKEN";

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub destination: DestinationConfig,
    /// Source channel id → destination group id.
    #[serde(default)]
    pub channels: HashMap<String, String>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub users: UsersConfig,
    #[serde(default)]
    pub slack: SlackConfig,
}

impl Config {
    /// Load from a YAML file; a missing file yields defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_saphyr::from_str(contents)?)
    }

    /// Override secrets from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Override secrets using `lookup`; empty values are ignored.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|value: &String| !value.trim().is_empty());
        if let Some(token) = lookup(DESTINATION_TOKEN_ENV) {
            self.destination.token = Some(token);
        }
        if let Some(secret) = lookup(SLACK_SIGNING_SECRET_ENV) {
            self.slack.signing_secret = Some(secret);
        }
        if let Some(token) = lookup(SLACK_BOT_TOKEN_ENV) {
            self.slack.bot_token = Some(token);
        }
    }

    /// Check that the configuration can run a mirror.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self
            .destination
            .endpoint
            .as_deref()
            .ok_or(ConfigError::Invalid("destination.endpoint is required"))?;
        let url = Url::parse(endpoint)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(
                "destination.endpoint must be an http(s) url",
            ));
        }
        if self.destination.token.is_none() {
            return Err(ConfigError::Invalid("destination.token is required"));
        }
        if self.store.kind == StoreKind::File && self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store.path is required for kind: file"));
        }
        if self.users.slack_lookup && self.slack.bot_token.is_none() {
            return Err(ConfigError::Invalid(
                "users.slack_lookup requires slack.bot_token",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// ServerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    10
}

// ============================================================================
// DestinationConfig
// ============================================================================

#[derive(Default, Deserialize)]
pub struct DestinationConfig {
    /// GraphQL endpoint URL.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Bearer token. Prefer the environment variable.
    #[serde(default)]
    pub token: Option<String>,
}

impl fmt::Debug for DestinationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestinationConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &redacted(&self.token))
            .finish()
    }
}

// ============================================================================
// StoreConfig
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// No mapping store: roots are posted, replies are skipped.
    None,
    #[default]
    Memory,
    File,
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".relaypost/mappings.jsonl")
}

// ============================================================================
// UsersConfig
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct UsersConfig {
    /// Static user id → display name table, consulted first.
    #[serde(default)]
    pub names: HashMap<String, String>,
    /// Fall back to Slack `users.info` lookups (needs `slack.bot_token`).
    #[serde(default)]
    pub slack_lookup: bool,
}

// ============================================================================
// SlackConfig
// ============================================================================

#[derive(Deserialize)]
pub struct SlackConfig {
    /// Enables request signature verification when set.
    #[serde(default)]
    pub signing_secret: Option<String>,
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default = "default_skip_bot_messages")]
    pub skip_bot_messages: bool,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            signing_secret: None,
            bot_token: None,
            skip_bot_messages: default_skip_bot_messages(),
        }
    }
}

impl fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackConfig")
            .field("signing_secret", &redacted(&self.signing_secret))
            .field("bot_token", &redacted(&self.bot_token))
            .field("skip_bot_messages", &self.skip_bot_messages)
            .finish()
    }
}

fn default_skip_bot_messages() -> bool {
    true
}

fn redacted(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "<redacted>")
}

// ============================================================================
// ConfigError
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),

    #[error("invalid destination endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("invalid config: {0}")]
    Invalid(&'static str),

    #[error("failed to open mapping store: {0}")]
    Store(#[from] StoreError),
}

// ============================================================================
// Tests
// ============================================================================
