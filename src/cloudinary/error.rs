//! Image host error types

use std::fmt;

/// Errors from the upload and admin APIs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageHostError {
    /// The request never produced a response (DNS, TLS, timeout, ...)
    Request { message: String },
    /// The API answered with a non-success status
    Status { status: u16, body: String },
    /// The response body was not what the API documents
    InvalidResponse { message: String },
    /// The client could not be constructed
    Config { message: String },
}

impl fmt::Display for ImageHostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageHostError::Request { message } => {
                write!(f, "Image host request failed: {}", message)
            }
            ImageHostError::Status { status, body } => {
                write!(f, "Image host returned HTTP {}: {}", status, body)
            }
            ImageHostError::InvalidResponse { message } => {
                write!(f, "Invalid image host response: {}", message)
            }
            ImageHostError::Config { message } => {
                write!(f, "Image host configuration error: {}", message)
            }
        }
    }
}

impl std::error::Error for ImageHostError {}

impl ImageHostError {
    pub fn request(message: impl Into<String>) -> Self {
        ImageHostError::Request {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        ImageHostError::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        ImageHostError::Config {
            message: message.into(),
        }
    }

    /// Whether retrying the same call later could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ImageHostError::Request { .. } => true,
            ImageHostError::Status { status, .. } => *status == 429 || *status >= 500,
            ImageHostError::InvalidResponse { .. } | ImageHostError::Config { .. } => false,
        }
    }
}

impl From<reqwest::Error> for ImageHostError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ImageHostError::invalid_response(err.to_string())
        } else {
            ImageHostError::request(err.to_string())
        }
    }
}
