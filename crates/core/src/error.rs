use thiserror::Error;
use uuid::Uuid;

pub type CampaignResult<T> = Result<T, CampaignError>;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(Uuid),

    #[error("Strategy not found: {0}")]
    StrategyNotFound(Uuid),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CampaignError {
    /// Short machine-readable code used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            CampaignError::Config(_) => "config_error",
            CampaignError::ProjectNotFound(_) => "project_not_found",
            CampaignError::StrategyNotFound(_) => "strategy_not_found",
            CampaignError::Validation(_) => "validation_failed",
            CampaignError::Serialization(_) => "serialization_error",
            CampaignError::Io(_) => "io_error",
            CampaignError::Internal(_) => "internal_error",
        }
    }
}

impl From<config::ConfigError> for CampaignError {
    fn from(err: config::ConfigError) -> Self {
        CampaignError::Config(err.to_string())
    }
}
