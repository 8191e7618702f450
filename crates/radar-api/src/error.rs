use thiserror::Error;

/// Errors from API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid API configuration: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode {endpoint} response: {message}")]
    Decode { endpoint: String, message: String },
}

impl ApiError {
    /// True for non-success HTTP statuses (as opposed to transport or
    /// decode failures).
    pub fn is_status(&self) -> bool {
        matches!(self, ApiError::Status { .. })
    }
}
