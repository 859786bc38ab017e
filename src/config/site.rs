//! Site configuration (_config.yml)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the content store project id
pub const ENV_PROJECT_ID: &str = "SANITY_PROJECT_ID";
/// Environment variable holding the content store dataset name
pub const ENV_DATASET: &str = "SANITY_DATASET";
/// Environment variable holding the write token used for comment creation
pub const ENV_API_TOKEN: &str = "SANITY_API_TOKEN";

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting `{0}` (set it in _config.yml or the environment)")]
    Missing(&'static str),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub url: String,
    pub public_dir: String,

    /// Date format for the "Published at" line (Moment.js style tokens)
    pub date_format: String,

    /// Seconds a generated page is served before it is regenerated
    pub revalidate_secs: u64,

    #[serde(default)]
    pub sanity: SanityConfig,

    #[serde(default)]
    pub comments: CommentsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Medium Blog".to_string(),
            description: "A place to write, read, and connect".to_string(),
            url: "http://localhost:4000".to_string(),
            public_dir: "public".to_string(),
            date_format: "MM/DD/YYYY".to_string(),
            revalidate_secs: 3600,
            sanity: SanityConfig::default(),
            comments: CommentsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(project_id) = get(ENV_PROJECT_ID) {
            self.sanity.project_id = project_id;
        }
        if let Some(dataset) = get(ENV_DATASET) {
            self.sanity.dataset = dataset;
        }
        if let Some(token) = get(ENV_API_TOKEN) {
            self.sanity.token = Some(token);
        }
    }

    /// Check that the content store can be addressed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sanity.project_id.trim().is_empty() {
            return Err(ConfigError::Missing("sanity.project_id"));
        }
        if self.sanity.dataset.trim().is_empty() {
            return Err(ConfigError::Missing("sanity.dataset"));
        }
        Ok(())
    }

    /// Revalidation interval as a duration
    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }
}

/// Content store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanityConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    /// Write token, only needed to create comments directly in the store
    pub token: Option<String>,
    /// Overrides `https://<project_id>.api.sanity.io` (self-hosted stores, tests)
    pub api_base_url: Option<String>,
    pub cdn_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: String::new(),
            api_version: "v2021-10-21".to_string(),
            use_cdn: false,
            token: None,
            api_base_url: None,
            cdn_base_url: "https://cdn.sanity.io".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl SanityConfig {
    /// Base URL for API calls that must hit the live API (mutations)
    pub fn api_base(&self) -> String {
        match &self.api_base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}.api.sanity.io", self.project_id),
        }
    }

    /// Base URL for read queries, honoring `use_cdn`
    pub fn query_base(&self) -> String {
        match &self.api_base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None if self.use_cdn => format!("https://{}.apicdn.sanity.io", self.project_id),
            None => self.api_base(),
        }
    }
}

/// Comment intake settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    /// External moderation endpoint. When unset, comments are written to the store.
    pub intake_url: Option<String>,
}
