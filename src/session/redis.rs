// Redis session store
//
// One string key per user holding the session JSON. The connection manager
// multiplexes commands and reconnects on its own; every command is bounded
// by the configured operation timeout.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::future::Future;
use std::time::Duration;

use super::{session_key, Session, SessionError, SessionStore};
use crate::config::SessionConfig;

pub struct RedisSessionStore {
    connection: ConnectionManager,
    key_prefix: String,
    ttl_seconds: Option<u64>,
    timeout_ms: u64,
}

impl RedisSessionStore {
    /// Connect using the session configuration
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Connection` if the URL is missing or invalid, or
    /// the server cannot be reached.
    pub async fn connect(config: &SessionConfig) -> Result<Self, SessionError> {
        let redis_url = config
            .redis_url
            .as_ref()
            .ok_or_else(|| SessionError::Connection("redis_url is required".to_string()))?;

        let client = Client::open(redis_url.as_str())
            .map_err(|e| SessionError::Connection(format!("Invalid Redis URL: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| SessionError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        tracing::info!(key_prefix = %config.key_prefix, "Connected to Redis session store");

        Ok(Self {
            connection,
            key_prefix: config.key_prefix.clone(),
            ttl_seconds: config.ttl_seconds,
            timeout_ms: config.operation_timeout_ms,
        })
    }

    fn key(&self, user_id: &str) -> String {
        session_key(&self.key_prefix, user_id)
    }

    async fn bounded<T, F>(&self, op: F) -> Result<T, SessionError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(Duration::from_millis(self.timeout_ms), op).await {
            Ok(result) => result.map_err(|e| SessionError::Backend(e.to_string())),
            Err(_) => Err(SessionError::Timeout(self.timeout_ms)),
        }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, user_id: &str) -> Result<Option<Session>, SessionError> {
        let key = self.key(user_id);
        let mut conn = self.connection.clone();
        let raw: Option<String> = self.bounded(conn.get(&key)).await?;
        Ok(raw.map(|raw| Session::from_stored(user_id, &raw)))
    }

    async fn save(&self, user_id: &str, session: &Session) -> Result<(), SessionError> {
        let key = self.key(user_id);
        let value = session.to_json()?;
        let mut conn = self.connection.clone();
        match self.ttl_seconds {
            Some(ttl) => {
                let _: () = self.bounded(conn.set_ex(&key, value, ttl)).await?;
            }
            None => {
                let _: () = self.bounded(conn.set(&key, value)).await?;
            }
        }
        Ok(())
    }
}

// Shared across handler tasks behind an Arc
fn _assert_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    assert_send::<RedisSessionStore>();
    assert_sync::<RedisSessionStore>();
}
