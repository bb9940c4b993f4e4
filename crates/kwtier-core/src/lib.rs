use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod keywords;
pub mod metrics;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use keywords::{
    ensure_unique_ids, split_suggestions, Context, Keyword, Project, Tier, MAX_TIER, MIN_TIER,
};
pub use metrics::ProjectedMetrics;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid tier {0}: expected a value between 1 and 5")]
    InvalidTier(u8),

    #[error("duplicate keyword id within tier: {0}")]
    DuplicateKeywordId(String),
}
