use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{DashboardError, Result};
use crate::pipeline::processing::filter::FilterSet;
use crate::pipeline::processing::tiering::TierThresholds;

pub const DEFAULT_CONFIG_PATH: &str = "dashboard.toml";
pub const CONFIG_PATH_ENV: &str = "TAM_DASHBOARD_CONFIG";
pub const SOURCE_PATH_ENV: &str = "TAM_SOURCE_PATH";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub tiers: TierThresholds,
    pub filters: FilterSet,
    pub display: DisplayConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub path: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/ip_profiles.csv"),
        }
    }
}

/// Presentation knobs: list lengths and the density display cutoff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub density_outlier_cutoff: f64,
    pub top_companies: usize,
    pub top_job_titles: usize,
    pub top_industries: usize,
    pub top_regions: usize,
    pub top_patent_companies: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            density_outlier_cutoff: 5.0,
            top_companies: 15,
            top_job_titles: 10,
            top_industries: 10,
            top_regions: 5,
            top_patent_companies: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl Config {
    /// Load `.env`, then the file named by `TAM_DASHBOARD_CONFIG` or `dashboard.toml`
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        let explicit = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        Self::load_from(explicit.as_deref())
    }

    /// An explicitly named file must exist; the default file may be absent
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    DashboardError::Config(format!(
                        "Failed to read config file '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                info!(path = %path.display(), "Loaded configuration");
                Self::from_toml_str(&content)?
            }
            None => match fs::read_to_string(DEFAULT_CONFIG_PATH) {
                Ok(content) => {
                    info!(path = DEFAULT_CONFIG_PATH, "Loaded configuration");
                    Self::from_toml_str(&content)?
                }
                Err(_) => {
                    debug!(path = DEFAULT_CONFIG_PATH, "No configuration file; using defaults");
                    Config::default()
                }
            },
        };

        if let Ok(source) = std::env::var(SOURCE_PATH_ENV) {
            if !source.trim().is_empty() {
                config.source.path = PathBuf::from(source);
            }
        }
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.filters = config.filters.canonicalized();
        config.tiers.warn_on_inverted_ranges();
        Ok(config)
    }
}
