// In-process session store
//
// Entries are kept in their JSON form so reads go through the same decoding
// path as the Redis backend.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{Session, SessionError, SessionStore};

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw entry as-is, bypassing serialization
    pub fn insert_raw(&self, user_id: &str, raw: impl Into<String>) {
        self.entries.write().insert(user_id.to_string(), raw.into());
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, user_id: &str) -> Result<Option<Session>, SessionError> {
        let entries = self.entries.read();
        Ok(entries
            .get(user_id)
            .map(|raw| Session::from_stored(user_id, raw)))
    }

    async fn save(&self, user_id: &str, session: &Session) -> Result<(), SessionError> {
        let raw = session.to_json()?;
        self.entries.write().insert(user_id.to_string(), raw);
        Ok(())
    }
}
