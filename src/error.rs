use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load dataset '{path}': {message}")]
    Load { path: String, message: String },

    #[error("Unknown facet: {0}")]
    UnknownFacet(String),

    #[error("Invalid filter expression: {0}")]
    InvalidFilter(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
