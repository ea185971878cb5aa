//! Runtime configuration.
//!
//! Every field has a default so a partial (or absent) config file works.
//! Secrets come from the environment rather than the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable holding the text generation API key.
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// Environment variable overriding the data directory.
pub const ENV_DATA_DIR: &str = "CLIMACODE_DATA_DIR";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Malformed file
    #[error("invalid config {path}: {source}")]
    Json {
        /// Config file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

/// ClimaCode configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimaConfig {
    /// Where the JSON store keeps its records
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Scan settings
    #[serde(default)]
    pub scan: ScanConfig,

    /// Recommendation generator settings
    #[serde(default)]
    pub recommender: RecommenderConfig,
}

/// Settings for measuring pages and estimating emissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Page views per year assumed when extrapolating
    #[serde(default = "default_annual_visits")]
    pub annual_visits: u64,

    /// Page size used when the page cannot be fetched
    #[serde(default = "default_fallback_page_bytes")]
    pub fallback_page_bytes: u64,

    /// Page fetch timeout
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// User-Agent sent with page fetches
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Grid carbon intensity in g CO₂e per kWh
    #[serde(default = "default_grid_intensity")]
    pub grid_intensity: f64,
}

/// Settings for the recommendation text generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommenderConfig {
    /// API base URL
    #[serde(default = "default_gemini_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API key; without one the static list is used
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Request timeout
    #[serde(default = "default_recommender_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".climacode")
}

fn default_annual_visits() -> u64 {
    10_000
}

fn default_fallback_page_bytes() -> u64 {
    2_000_000
}

fn default_fetch_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    "ClimaCode Carbon Scanner/1.0".to_string()
}

fn default_grid_intensity() -> f64 {
    494.0
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_recommender_timeout_secs() -> u64 {
    30
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            annual_visits: default_annual_visits(),
            fallback_page_bytes: default_fallback_page_bytes(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            user_agent: default_user_agent(),
            grid_intensity: default_grid_intensity(),
        }
    }
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_url(),
            model: default_gemini_model(),
            api_key: None,
            timeout_secs: default_recommender_timeout_secs(),
        }
    }
}

impl Default for ClimaConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            scan: ScanConfig::default(),
            recommender: RecommenderConfig::default(),
        }
    }
}

impl ClimaConfig {
    /// Load from an optional JSON file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields from environment-style lookups. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ENV_GEMINI_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.recommender.api_key = Some(key);
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
    }
}
