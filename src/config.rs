//! Configuration management for the PR labeler
//!
//! Loads configuration from YAML files and environment variables.
//! Environment variables override YAML values.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// GitHub REST API configuration
    pub github: GithubConfig,
    /// Security settings
    pub security: SecurityConfig,
    /// Label inference settings
    #[serde(default)]
    pub labeler: LabelerConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request timeout in milliseconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    /// Largest webhook body accepted, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30000
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_ms: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// GitHub REST API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    /// Base URL of the REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Access token (from environment: LABELER_GITHUB__TOKEN)
    #[serde(default)]
    pub token: Option<String>,
    /// User-Agent sent with every request (GitHub rejects requests without one)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_github_timeout")]
    pub timeout_ms: u64,
    /// Files requested per page when listing pull request files
    #[serde(default = "default_files_per_page")]
    pub files_per_page: u32,
    /// Upper bound on pages fetched for a single pull request
    #[serde(default = "default_max_file_pages")]
    pub max_file_pages: u32,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    format!("pr-labeler/{}", env!("CARGO_PKG_VERSION"))
}

fn default_github_timeout() -> u64 {
    10000
}

fn default_files_per_page() -> u32 {
    100
}

fn default_max_file_pages() -> u32 {
    // GitHub stops listing after 3000 files
    30
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            user_agent: default_user_agent(),
            timeout_ms: default_github_timeout(),
            files_per_page: default_files_per_page(),
            max_file_pages: default_max_file_pages(),
        }
    }
}

/// Security configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    /// Webhook secret shared with GitHub (loaded from env)
    #[serde(default)]
    pub webhook_secret: String,
    /// Previous webhook secret (for rotation grace period)
    #[serde(default)]
    pub webhook_secret_previous: Option<String>,
}

impl SecurityConfig {
    /// Get all valid secrets for signature verification (current + previous)
    pub fn get_all_secrets(&self) -> Vec<String> {
        let mut secrets = vec![self.webhook_secret.clone()];
        if let Some(ref prev) = self.webhook_secret_previous {
            if !prev.is_empty() {
                secrets.push(prev.clone());
            }
        }
        secrets
    }
}

/// Label inference configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LabelerConfig {
    /// Repositories (`owner/repo`) to label; empty means every repository
    #[serde(default)]
    pub repositories: Vec<String>,
    /// Number of JS subsystem labels above which they collapse into `lib / src`
    #[serde(default = "default_js_subsystem_limit")]
    pub js_subsystem_limit: usize,
    /// Add a `vX.x` label for pull requests against release branches
    #[serde(default = "default_true")]
    pub version_labels: bool,
    /// Number of delivery ids remembered for de-duplication
    #[serde(default = "default_delivery_cache_capacity")]
    pub delivery_cache_capacity: usize,
    /// How long a delivery id is remembered, in seconds
    #[serde(default = "default_delivery_cache_ttl")]
    pub delivery_cache_ttl_seconds: i64,
}

fn default_true() -> bool {
    true
}

fn default_js_subsystem_limit() -> usize {
    4
}

fn default_delivery_cache_capacity() -> usize {
    1000
}

fn default_delivery_cache_ttl() -> i64 {
    3600 // 1 hour
}

/// Longest accepted delivery cache TTL (7 days)
pub const MAX_DELIVERY_CACHE_TTL_SECONDS: i64 = 7 * 24 * 3600;

impl Default for LabelerConfig {
    fn default() -> Self {
        Self {
            repositories: Vec::new(),
            js_subsystem_limit: default_js_subsystem_limit(),
            version_labels: true,
            delivery_cache_capacity: default_delivery_cache_capacity(),
            delivery_cache_ttl_seconds: default_delivery_cache_ttl(),
        }
    }
}

impl LabelerConfig {
    /// Whether pull requests in `owner/repo` should be labeled
    pub fn is_repository_enabled(&self, owner: &str, repo: &str) -> bool {
        if self.repositories.is_empty() {
            return true;
        }

        self.repositories.iter().any(|entry| {
            entry
                .split_once('/')
                .map(|(o, r)| o.eq_ignore_ascii_case(owner) && r.eq_ignore_ascii_case(repo))
                .unwrap_or(false)
        })
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (LABELER_*)
    /// 2. config/config.yaml (if exists)
    /// 3. config.yaml (if exists)
    /// 4. Default values
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, optionally from an explicit file instead of the
    /// default search locations
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.request_timeout_ms", 30000)?
            .set_default("server.max_body_bytes", 1024 * 1024)?
            .set_default("github.api_url", "https://api.github.com")?
            .set_default("github.timeout_ms", 10000)?
            .set_default("github.files_per_page", 100)?
            .set_default("github.max_file_pages", 30)?
            .set_default("security.webhook_secret", "")?;

        // Load from config files (lower priority)
        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder
                .add_source(File::with_name("config").required(false))
                .add_source(File::with_name("config/config").required(false)),
        };

        let config = builder
            // Override with environment variables (highest priority - loaded last)
            // LABELER_SERVER__PORT=8081 -> server.port = 8081
            // LABELER_LABELER__REPOSITORIES=nodejs/node,nodejs/help -> labeler.repositories
            .add_source(
                Environment::with_prefix("LABELER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("labeler.repositories"),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Check webhook secret is set
        if self.security.webhook_secret.is_empty() {
            return Err(ConfigError::Message(
                "Webhook secret must be set via LABELER_SECURITY__WEBHOOK_SECRET".to_string(),
            ));
        }

        if self.github.api_url.is_empty() {
            return Err(ConfigError::Message(
                "GitHub API URL must be set".to_string(),
            ));
        }

        if !(1..=100).contains(&self.github.files_per_page) {
            return Err(ConfigError::Message(
                "github.files_per_page must be between 1 and 100".to_string(),
            ));
        }

        if self.github.max_file_pages == 0 {
            return Err(ConfigError::Message(
                "github.max_file_pages must be at least 1".to_string(),
            ));
        }

        if !(1..=MAX_DELIVERY_CACHE_TTL_SECONDS).contains(&self.labeler.delivery_cache_ttl_seconds) {
            return Err(ConfigError::Message(format!(
                "labeler.delivery_cache_ttl_seconds must be between 1 and {}",
                MAX_DELIVERY_CACHE_TTL_SECONDS
            )));
        }

        for entry in &self.labeler.repositories {
            let valid = entry
                .split_once('/')
                .map(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
                .unwrap_or(false);
            if !valid {
                return Err(ConfigError::Message(format!(
                    "Invalid repository '{}' in labeler.repositories (expected owner/repo)",
                    entry
                )));
            }
        }

        Ok(())
    }
}
