use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("discount factor {gamma} must lie in [0, 1)")]
    InvalidDiscount { gamma: f64 },

    #[error("tolerance {tolerance} must be positive and finite")]
    InvalidTolerance { tolerance: f64 },

    #[error("state {state} is out of range (num_states = {num_states})")]
    StateOutOfRange { state: usize, num_states: usize },

    #[error("action {action} is out of range (num_actions = {num_actions})")]
    ActionOutOfRange { action: usize, num_actions: usize },

    #[error("episode {episode} has terminated; reset before acting again")]
    EpisodeTerminated { episode: usize },

    #[error("model shape mismatch in '{field}': expected {expected}, got {got}")]
    ShapeMismatch {
        field: String,
        expected: String,
        got: String,
    },

    #[error("failed to {operation} '{}': {source}", path.display())]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Game(#[from] flappy::ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
