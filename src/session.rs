// src/session.rs

use crate::constants::{SESSION_ID_KEY, VISITOR_ID_KEY};
use crate::storage::LocalStore;
use log::info;
use std::fmt;
use uuid::Uuid;

/// Durable per-installation identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VisitorId(String);

/// Identifier for one conversation, replaced on reset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl VisitorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        SessionId(id)
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The identifiers active for the current conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub visitor_id: VisitorId,
    pub session_id: SessionId,
}

/// Hands out and persists visitor and session identifiers.
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    store: LocalStore,
}

impl IdentityProvider {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn init(&self) -> SessionContext {
        SessionContext {
            visitor_id: self.get_or_create_visitor_id(),
            session_id: self.get_or_create_session_id(),
        }
    }

    pub fn get_or_create_visitor_id(&self) -> VisitorId {
        VisitorId(self.get_or_create(VISITOR_ID_KEY, "visitor"))
    }

    pub fn get_or_create_session_id(&self) -> SessionId {
        SessionId(self.get_or_create(SESSION_ID_KEY, "session"))
    }

    /// Replaces the stored session id. The visitor id is left alone.
    pub fn reset_session(&self) -> SessionId {
        let id = Uuid::new_v4().to_string();
        self.store.set_string(SESSION_ID_KEY, &id);
        info!("Session reset, new session: {}", id);
        SessionId(id)
    }

    fn get_or_create(&self, key: &str, label: &str) -> String {
        if let Some(existing) = self.store.get_string(key).filter(|v| !v.is_empty()) {
            info!("Existing {} resumed: {}", label, existing);
            return existing;
        }
        let id = Uuid::new_v4().to_string();
        self.store.set_string(key, &id);
        info!("New {} created & stored: {}", label, id);
        id
    }
}

#[cfg(test)]
impl SessionContext {
    pub(crate) fn for_tests(visitor: &str, session: &str) -> Self {
        Self {
            visitor_id: VisitorId(visitor.to_string()),
            session_id: SessionId(session.to_string()),
        }
    }
}
