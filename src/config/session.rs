//! Session store configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_REDIS_OPERATION_TIMEOUT_MS, DEFAULT_SESSION_KEY_PREFIX};

fn default_key_prefix() -> String {
    DEFAULT_SESSION_KEY_PREFIX.to_string()
}

fn default_operation_timeout_ms() -> u64 {
    DEFAULT_REDIS_OPERATION_TIMEOUT_MS
}

/// Backend used to keep per-user state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    Redis,
    /// In-process map, lost on restart
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Storage backend (default: redis)
    #[serde(default)]
    pub backend: SessionBackend,

    /// Redis connection URL (e.g., "redis://localhost:6379"), required for redis
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Key prefix for session entries (default: "memebot")
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Expire idle sessions after this many seconds (default: never)
    #[serde(default)]
    pub ttl_seconds: Option<u64>,

    /// Per-command timeout in milliseconds (default: 2000)
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::default(),
            redis_url: None,
            key_prefix: default_key_prefix(),
            ttl_seconds: None,
            operation_timeout_ms: default_operation_timeout_ms(),
        }
    }
}
