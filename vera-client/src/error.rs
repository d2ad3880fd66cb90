//! Error types for the Vera client

use thiserror::Error;

/// Errors that can occur while talking to the Vera controller
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection, DNS, timeout or socket error
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// The controller answered with a non-success HTTP status
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// The controller answered with an empty body
    #[error("Empty response from Vera")]
    EmptyResponse,

    /// The response body was not the expected JSON document
    #[error("JSON parsing error: {0}")]
    Parse(String),
}

impl ClientError {
    /// Whether the failure happened below HTTP, i.e. the hub was unreachable
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(err.to_string())
    }
}

/// Result type for Vera client operations
pub type Result<T> = std::result::Result<T, ClientError>;
