use thiserror::Error;

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, DqnError>;

/// Main error type for the DQN agent
#[derive(Debug, Error)]
pub enum DqnError {
    /// Fewer stored transitions than a sample asked for
    #[error("Insufficient data: requested {requested} transitions, {available} available")]
    InsufficientData {
        requested: usize,
        available: usize,
    },

    /// Invalid dimensions for operations
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Invalid action
    #[error("Invalid action {action}: must be less than {max_actions}")]
    InvalidAction {
        action: usize,
        max_actions: usize,
    },

    /// Training error
    #[error("Training error: {0}")]
    Training(String),

    /// Model store failures other than IO
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors (model store, config files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Model (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Configuration file errors
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

// Helper functions for common error patterns
impl DqnError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        DqnError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        DqnError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
