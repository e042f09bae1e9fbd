//! Per-user conversation state
//!
//! Each user has at most one session: the image they are captioning and the
//! captions applied so far. Sessions are stored as JSON so that entries
//! written by older deployments stay readable:
//!
//! ```json
//! {"cloudinary_public_id": "abc123", "strings": {"top": "hello"}}
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::meme::CaptionPosition;

pub mod memory;
pub mod redis;

pub use self::memory::MemorySessionStore;
pub use self::redis::RedisSessionStore;

/// Errors from a session backend
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session store connection failed: {0}")]
    Connection(String),

    #[error("Session store error: {0}")]
    Backend(String),

    #[error("Session store operation timed out after {0}ms")]
    Timeout(u64),

    #[error("Session serialization error: {0}")]
    Serialization(String),
}

/// Caption text keyed by position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Captions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudinary_public_id: Option<String>,
    #[serde(default)]
    pub strings: Captions,
}

impl Session {
    /// A fresh session for a newly selected image, with no captions
    pub fn for_image(public_id: impl Into<String>) -> Self {
        Self {
            cloudinary_public_id: Some(public_id.into()),
            strings: Captions::default(),
        }
    }

    /// The selected image, if any
    pub fn image_id(&self) -> Option<&str> {
        self.cloudinary_public_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }

    pub fn caption(&self, position: CaptionPosition) -> Option<&str> {
        let text = match position {
            CaptionPosition::Top => &self.strings.top,
            CaptionPosition::Bottom => &self.strings.bottom,
        };
        text.as_deref()
    }

    /// Set or clear the caption at `position`; empty text clears it
    pub fn set_caption(&mut self, position: CaptionPosition, text: Option<&str>) {
        let value = text.filter(|t| !t.is_empty()).map(str::to_string);
        match position {
            CaptionPosition::Top => self.strings.top = value,
            CaptionPosition::Bottom => self.strings.bottom = value,
        }
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        serde_json::to_string(self).map_err(|e| SessionError::Serialization(e.to_string()))
    }

    /// Decode a stored entry.
    ///
    /// A corrupt entry is logged and read as an empty session so the user
    /// can start over instead of being stuck.
    pub fn from_stored(user_id: &str, raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Discarding unreadable session entry"
                );
                Session::default()
            }
        }
    }
}

/// Storage for sessions, keyed by the platform's user id
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, user_id: &str) -> Result<Option<Session>, SessionError>;

    async fn save(&self, user_id: &str, session: &Session) -> Result<(), SessionError>;
}

/// `{prefix}:{user_id}`
pub fn session_key(prefix: &str, user_id: &str) -> String {
    format!("{}:{}", prefix, user_id)
}
