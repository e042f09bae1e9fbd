// Error types module

use std::fmt;

use crate::cloudinary::ImageHostError;
use crate::messenger::{SendError, SignatureError};
use crate::session::SessionError;

/// Centralized error type for the bot
///
/// Wraps the per-module errors so the server and the CLI can report them
/// uniformly and map them to an HTTP status.
#[derive(Debug)]
pub enum BotError {
    /// Configuration errors (invalid YAML, missing env vars, etc.)
    Config(String),

    /// Webhook body failed signature verification
    Signature(SignatureError),

    /// Request was well-formed HTTP but not something we accept
    BadRequest(String),

    /// Session store failures
    Session(SessionError),

    /// Outbound message delivery failures
    Send(SendError),

    /// Image upload/admin API failures
    ImageHost(ImageHostError),

    /// Anything else (server setup, I/O, unexpected states)
    Internal(String),
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotError::Config(msg) => write!(f, "Configuration error: {}", msg),
            BotError::Signature(err) => write!(f, "Signature error: {}", err),
            BotError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            BotError::Session(err) => write!(f, "{}", err),
            BotError::Send(err) => write!(f, "{}", err),
            BotError::ImageHost(err) => write!(f, "{}", err),
            BotError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for BotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BotError::Signature(err) => Some(err),
            BotError::Session(err) => Some(err),
            BotError::Send(err) => Some(err),
            BotError::ImageHost(err) => Some(err),
            BotError::Config(_) | BotError::BadRequest(_) | BotError::Internal(_) => None,
        }
    }
}

impl BotError {
    /// HTTP status used when this error reaches the webhook surface
    pub fn to_http_status(&self) -> u16 {
        match self {
            BotError::Signature(_) => 403,
            BotError::BadRequest(_) => 400,
            BotError::ImageHost(_) | BotError::Send(_) => 502,
            BotError::Session(SessionError::Timeout(_)) => 504,
            BotError::Config(_) | BotError::Session(_) | BotError::Internal(_) => 500,
        }
    }
}

impl From<SignatureError> for BotError {
    fn from(err: SignatureError) -> Self {
        BotError::Signature(err)
    }
}

impl From<SessionError> for BotError {
    fn from(err: SessionError) -> Self {
        BotError::Session(err)
    }
}

impl From<SendError> for BotError {
    fn from(err: SendError) -> Self {
        BotError::Send(err)
    }
}

impl From<ImageHostError> for BotError {
    fn from(err: ImageHostError) -> Self {
        BotError::ImageHost(err)
    }
}

impl From<std::io::Error> for BotError {
    fn from(err: std::io::Error) -> Self {
        BotError::Internal(err.to_string())
    }
}
