use thiserror::Error;

/// Cooling environment errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvironmentError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    #[error("Episode has ended; call reset before stepping again")]
    EpisodeEnded,
}

pub type EnvResult<T> = std::result::Result<T, EnvironmentError>;
