use thiserror::Error;

/// Custom error type for Sentra operations.
#[derive(Debug, Clone, Error)]
pub enum SentraError {
    /// A required artifact is missing or unusable at construction time.
    /// A predictor whose construction fails this way never becomes ready.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Tokenization or inference failed during a predict call. No partial
    /// output is returned for the call.
    #[error("Classification error: {0}")]
    Classification(String),
}

impl From<std::io::Error> for SentraError {
    fn from(err: std::io::Error) -> Self {
        SentraError::Configuration(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for SentraError {
    fn from(err: serde_json::Error) -> Self {
        SentraError::Configuration(format!("JSON deserialization error: {}", err))
    }
}
