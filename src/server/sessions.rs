//! In-memory session storage for cookie authentication.
//!
//! A session maps an opaque token to a user id and expires after a
//! configurable number of days (7 by default). Resolving a token does not
//! consume it; a session disappears only on logout or expiry.

use rand::Rng;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Data associated with a session token.
#[derive(Debug, Clone)]
pub struct SessionData {
    /// Hex id of the authenticated user.
    pub user_id: String,
    /// When the session was created.
    pub created_at: Instant,
    /// When the session expires.
    pub expires_at: Instant,
}

/// In-memory session store with expiry.
///
/// Thread-safe via internal RwLock.
#[derive(Debug)]
pub struct SessionStore {
    /// Sessions indexed by token string.
    sessions: RwLock<HashMap<String, SessionData>>,
    /// Default session lifetime.
    default_expiry: Duration,
}

impl SessionStore {
    /// Creates a new session store with the given lifetime in days.
    pub fn new(expiry_days: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            default_expiry: Duration::from_secs(expiry_days * 24 * 60 * 60),
        }
    }

    pub fn default_expiry(&self) -> Duration {
        self.default_expiry
    }

    /// Opens a session for the given user.
    ///
    /// Returns the token string (32 bytes, base64url encoded).
    pub fn create(&self, user_id: &str) -> String {
        self.create_with_expiry(user_id, self.default_expiry)
    }

    /// Opens a session with a custom lifetime.
    pub fn create_with_expiry(&self, user_id: &str, expiry: Duration) -> String {
        let token = generate_token();
        let now = Instant::now();

        let data = SessionData {
            user_id: user_id.to_string(),
            created_at: now,
            expires_at: now + expiry,
        };

        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(token.clone(), data);

        token
    }

    /// Resolves a token to its user id.
    ///
    /// Returns `None` if the token is unknown or expired; expired entries
    /// are removed on the way out.
    pub fn resolve(&self, token: &str) -> Option<String> {
        let mut sessions = self.sessions.write().unwrap();

        match sessions.get(token) {
            Some(data) if Instant::now() <= data.expires_at => Some(data.user_id.clone()),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    /// Ends a session. Returns whether the token existed.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.write().unwrap().remove(token).is_some()
    }

    /// Removes all expired sessions.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write().unwrap();
        let now = Instant::now();

        let before = sessions.len();
        sessions.retain(|_, data| data.expires_at > now);
        let after = sessions.len();

        before - after
    }

    /// Returns the number of sessions currently stored.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(7)
    }
}

/// Generates a secure random token.
///
/// Returns 32 random bytes encoded as base64url (no padding).
fn generate_token() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_create_returns_unique_tokens() {
        let store = SessionStore::new(7);

        let token1 = store.create("user1");
        let token2 = store.create("user2");

        assert_ne!(token1, token2);
        assert_eq!(token1.len(), 43); // 32 bytes base64url = 43 chars
    }

    #[test]
    fn test_resolve_valid_session() {
        let store = SessionStore::new(7);

        let token = store.create("64f1c0ffee");
        assert_eq!(store.resolve(&token).as_deref(), Some("64f1c0ffee"));
    }

    #[test]
    fn test_session_survives_resolution() {
        let store = SessionStore::new(7);

        let token = store.create("user1");
        assert!(store.resolve(&token).is_some());
        // Not single-use: the same cookie keeps working
        assert!(store.resolve(&token).is_some());
    }

    #[test]
    fn test_resolve_unknown_token() {
        let store = SessionStore::new(7);

        assert!(store.resolve("nonexistent-token").is_none());
    }

    #[test]
    fn test_resolve_expired_session() {
        let store = SessionStore::new(7);

        let token = store.create_with_expiry("user1", Duration::from_secs(0));
        thread::sleep(Duration::from_millis(10));

        assert!(store.resolve(&token).is_none());
        // Expired entry is swept on access
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_revoke_ends_session() {
        let store = SessionStore::new(7);

        let token = store.create("user1");
        assert!(store.revoke(&token));
        assert!(store.resolve(&token).is_none());

        // Revoking again reports the token as gone
        assert!(!store.revoke(&token));
    }

    #[test]
    fn test_cleanup_expired() {
        let store = SessionStore::new(7);

        store.create_with_expiry("a", Duration::from_secs(0));
        store.create_with_expiry("b", Duration::from_secs(0));
        store.create("c"); // not expired

        thread::sleep(Duration::from_millis(10));

        assert_eq!(store.len(), 3);

        let removed = store.cleanup_expired();

        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_generate_token_format() {
        let token = generate_token();

        // Should be base64url, 43 characters (32 bytes)
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
