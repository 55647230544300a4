//! The durable-store seam.
//!
//! Shutbox doesn't ship a database. It defines [`SessionStore`], which
//! the session actor calls after every accepted transition and before it
//! replies. If the store fails, the transition is dropped and the caller
//! gets an error, so what the store holds never runs ahead of or behind
//! what callers were told.
//!
//! [`MemoryStore`] keeps records in a map, encoded with the protocol
//! codec so that everything a real backend would have to serialize is
//! exercised.

use std::collections::HashMap;

use shutbox_game::Session;
use shutbox_protocol::{Codec, JsonCodec, ProtocolError, SessionId};
use tokio::sync::Mutex;

/// Errors raised by a [`SessionStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record could not be encoded or decoded.
    #[error("store codec failure: {0}")]
    Codec(#[from] ProtocolError),

    /// The backend itself failed (connection lost, disk full, ...).
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Persists session records, one record per session id.
///
/// Only one actor ever writes a given session, so implementations need
/// per-call atomicity but no cross-call transactions.
pub trait SessionStore: Send + Sync + 'static {
    /// Inserts or replaces the record for `session.id`.
    fn save(
        &self,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Reads a record back, or `None` if it was never saved or was deleted.
    fn load(
        &self,
        id: SessionId,
    ) -> impl std::future::Future<Output = Result<Option<Session>, StoreError>> + Send;

    /// Removes a session and all of its players.
    fn delete(
        &self,
        id: SessionId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

/// In-process store holding JSON-encoded records.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<SessionId, Vec<u8>>>,
    codec: JsonCodec,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

impl SessionStore for MemoryStore {
    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        let bytes = self.codec.encode(session)?;
        self.records.lock().await.insert(session.id, bytes);
        Ok(())
    }

    async fn load(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        let records = self.records.lock().await;
        match records.get(&id) {
            Some(bytes) => Ok(Some(self.codec.decode(bytes)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: SessionId) -> Result<(), StoreError> {
        self.records.lock().await.remove(&id);
        Ok(())
    }
}
