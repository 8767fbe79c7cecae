//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::error::Error;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// IsThereAnyDeal API key
    #[serde(default)]
    pub api_key: Option<String>,

    /// Two-letter country code used for prices and shops
    #[serde(default = "default_country")]
    pub country: String,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Concurrent game info requests
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Maximum number of search candidates (1-100)
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Card ordering
    #[serde(default)]
    pub sort: SortOrder,

    /// Filter: shop names whose deals are kept
    #[serde(default)]
    pub shops: Vec<String>,

    /// Filter: minimum deal price
    #[serde(default)]
    pub min_price: Option<f64>,

    /// Filter: maximum deal price
    #[serde(default)]
    pub max_price: Option<f64>,

    /// Filter: minimum discount percent
    #[serde(default)]
    pub min_cut: Option<u32>,

    /// Lookups tried before giving up on a random example title
    #[serde(default = "default_seed_attempts")]
    pub seed_attempts: u32,

    /// IsThereAnyDeal API base URL
    #[serde(default = "default_itad_base_url")]
    pub itad_base_url: String,

    /// Steam Web API base URL
    #[serde(default = "default_steam_base_url")]
    pub steam_base_url: String,
}

pub const MAX_RESULTS_LIMIT: usize = 100;

fn default_country() -> String {
    "DE".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_workers() -> usize {
    5
}

fn default_max_results() -> usize {
    50
}

fn default_seed_attempts() -> u32 {
    5
}

fn default_itad_base_url() -> String {
    "https://api.isthereanydeal.com".to_string()
}

fn default_steam_base_url() -> String {
    "https://api.steampowered.com".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            country: default_country(),
            proxy: None,
            timeout_secs: default_timeout_secs(),
            workers: default_workers(),
            max_results: default_max_results(),
            format: OutputFormat::Table,
            sort: SortOrder::Relevance,
            shops: Vec::new(),
            min_price: None,
            max_price: None,
            min_cut: None,
            seed_attempts: default_seed_attempts(),
            itad_base_url: default_itad_base_url(),
            steam_base_url: default_steam_base_url(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        match parse_country(&config.country) {
            Ok(country) => config.country = country,
            Err(e) => {
                warn!("{} in {}, using {}", e, path.display(), default_country());
                config.country = default_country();
            }
        }

        Ok(config)
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("itad-compare").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(key) = std::env::var("ITAD_API_KEY") {
            if !key.trim().is_empty() {
                self.api_key = Some(key);
            }
        }

        if let Ok(country) = std::env::var("ITAD_COUNTRY") {
            match parse_country(&country) {
                Ok(country) => self.country = country,
                Err(e) => warn!("Ignoring ITAD_COUNTRY: {}", e),
            }
        }

        if let Ok(proxy) = std::env::var("ITAD_PROXY") {
            self.proxy = Some(proxy);
        }

        self
    }

    /// Returns the API key, or the fatal missing-key error.
    pub fn require_api_key(&self) -> Result<&str, Error> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(Error::MissingApiKey)
    }

    /// Search result count clamped to what the search endpoint accepts.
    pub fn search_limit(&self) -> usize {
        self.max_results.clamp(1, MAX_RESULTS_LIMIT)
    }

    /// Worker pool size, never zero.
    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }
}

/// Normalizes a two-letter country code to upper case.
///
/// Used as the clap value parser for `--country`, so flag, environment and
/// config file values all pass the same check.
pub fn parse_country(s: &str) -> Result<String, String> {
    let code = s.trim();
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(format!("Invalid country code: {}. Use a two-letter code like DE or US", s))
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Html,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "html" => Ok(OutputFormat::Html),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, html", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Html => write!(f, "html"),
        }
    }
}

/// Ordering of rendered game cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Search result order
    #[default]
    Relevance,
    /// Cheapest shown deal first
    Price,
    /// Alphabetical by title
    Title,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relevance" => Ok(SortOrder::Relevance),
            "price" => Ok(SortOrder::Price),
            "title" => Ok(SortOrder::Title),
            _ => Err(format!("Unknown sort order: {}. Use: relevance, price, title", s)),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Relevance => write!(f, "relevance"),
            SortOrder::Price => write!(f, "price"),
            SortOrder::Title => write!(f, "title"),
        }
    }
}
