use std::io;
use thiserror::Error;

/// Unified error type for the assistant plugin
#[derive(Error, Debug)]
pub enum LeetobError {
    /// Errors reported by the language-model API
    #[error("API error: {0}")]
    Api(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input errors
    #[error("Input error: {0}")]
    Input(String),

    /// The model client could not be constructed. Carries an instruction for the user.
    #[error("Provider unavailable: {0}")]
    Provider(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(String),

    /// Failures of the messaging client (send, edit, download)
    #[error("Chat client error: {0}")]
    Chat(String),
}

impl From<reqwest::Error> for LeetobError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LeetobError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            LeetobError::Network(format!("Connection failed: {}", err))
        } else if err.is_status() {
            LeetobError::Api(format!("API returned error status: {}", err))
        } else {
            LeetobError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for LeetobError {
    fn from(err: serde_json::Error) -> Self {
        LeetobError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yml::Error> for LeetobError {
    fn from(err: serde_yml::Error) -> Self {
        LeetobError::Serialization(format!("YAML error: {}", err))
    }
}

impl From<base64::DecodeError> for LeetobError {
    fn from(err: base64::DecodeError) -> Self {
        LeetobError::Serialization(format!("base64 error: {}", err))
    }
}
