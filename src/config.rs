//! TOML configuration for the `dqa` client.
//!
//! The file is optional: when it does not exist, [`Config::minimal`] supplies
//! defaults that point at a server on `http://127.0.0.1:5000`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_upload_path")]
    pub upload_path: String,
    #[serde(default = "default_ask_path")]
    pub ask_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            upload_path: default_upload_path(),
            ask_path: default_ask_path(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}
fn default_upload_path() -> String {
    "/upload".to_string()
}
fn default_ask_path() -> String {
    "/ask".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct HttpConfig {
    /// Request timeout in seconds. `0` disables the timeout.
    #[serde(default)]
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Multipart field that carries the file contents.
    #[serde(default = "default_field_name")]
    pub field_name: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            field_name: default_field_name(),
        }
    }
}

fn default_field_name() -> String {
    "file".to_string()
}

impl Config {
    /// Built-in defaults, used when no config file is present.
    pub fn minimal() -> Self {
        Self {
            server: ServerConfig::default(),
            http: HttpConfig::default(),
            upload: UploadConfig::default(),
        }
    }

    /// Absolute URL of the ingestion endpoint.
    pub fn upload_url(&self) -> String {
        join_url(&self.server.base_url, &self.server.upload_path)
    }

    /// Absolute URL of the query endpoint.
    pub fn ask_url(&self) -> String {
        join_url(&self.server.base_url, &self.server.ask_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Loads `path` if it exists, otherwise returns [`Config::minimal`].
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    let url = reqwest::Url::parse(&config.server.base_url)
        .with_context(|| format!("server.base_url is not a valid URL: {}", config.server.base_url))?;
    match url.scheme() {
        "http" | "https" => {}
        other => anyhow::bail!(
            "server.base_url must use http or https, got '{}'",
            other
        ),
    }

    if !config.server.upload_path.starts_with('/') {
        anyhow::bail!("server.upload_path must start with '/'");
    }
    if !config.server.ask_path.starts_with('/') {
        anyhow::bail!("server.ask_path must start with '/'");
    }

    if config.upload.field_name.trim().is_empty() {
        anyhow::bail!("upload.field_name must not be empty");
    }

    Ok(())
}
