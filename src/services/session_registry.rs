//! Server-side sessions mapping an opaque cookie value to an account.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};
use uuid::Uuid;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "session";

/// Live sessions. Not persisted; a restart logs everyone out.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, String>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `owner` and return its id.
    pub fn open(&self, owner: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, owner.to_string());
        id
    }

    pub fn resolve(&self, id: &Uuid) -> Option<String> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// End a session. Unknown ids are ignored.
    pub fn close(&self, id: &Uuid) -> Option<String> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }
}

/// Extract the session id from a `Cookie` header value.
pub fn session_id_from_cookie_header(header: &str) -> Option<Uuid> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_resolve_close() {
        let registry = SessionRegistry::new();
        let id = registry.open("a@x.com");
        assert_eq!(registry.resolve(&id).as_deref(), Some("a@x.com"));
        assert_eq!(registry.close(&id).as_deref(), Some("a@x.com"));
        assert!(registry.resolve(&id).is_none());
        assert!(registry.close(&id).is_none());
    }

    #[test]
    fn parses_session_cookie() {
        let id = Uuid::new_v4();
        let header = format!("theme=dark; {SESSION_COOKIE}={id}; other=1");
        assert_eq!(session_id_from_cookie_header(&header), Some(id));
        assert_eq!(session_id_from_cookie_header("theme=dark"), None);
        assert_eq!(
            session_id_from_cookie_header(&format!("{SESSION_COOKIE}=not-a-uuid")),
            None
        );
    }
}
