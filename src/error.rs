//! Error types for springsim.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("engine initialization failed: {0}")]
    Initialization(String),

    #[error("engine is not ready")]
    NotReady,

    #[error("command queue is full")]
    QueueFull,

    #[error("simulation context disconnected")]
    Disconnected,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
