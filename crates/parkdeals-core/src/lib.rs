use thiserror::Error;

mod app_config;
mod config;
mod deal;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use deal::{DealCandidate, DealType, MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
