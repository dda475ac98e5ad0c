//! Admin credential and session utilities
//!
//! Provides:
//! - Credential verification against the configured admin password
//! - Opaque session tokens with server-side hash + TTL tracking
//! - Cookie header helpers for the HTML flow
//!
//! The dashboard is a two-state machine: Locked until a login mints a
//! session, Unlocked while the session cookie validates. A wrong or missing
//! credential renders the Locked view again; it is not an error.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Hash a secret for comparison or storage
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare a supplied password against the configured admin credential.
///
/// Digest comparison; accept/reject semantics are identical to verbatim
/// equality on the plain strings.
pub fn verify_credential(supplied: &str, configured: &str) -> bool {
    hash_secret(supplied) == hash_secret(configured)
}

/// Generate a new opaque session token
pub fn generate_session_token() -> String {
    let random_bytes: [u8; 32] = rand::random();
    format!("sess_{}", hex::encode(random_bytes))
}

/// Extract a named cookie's value from a `Cookie` request header
pub fn extract_cookie<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key == name {
            Some(value)
        } else {
            None
        }
    })
}

/// In-process registry of unlocked admin sessions.
///
/// Tokens are never stored; only their SHA-256 hashes are, each with an
/// expiry. Expired entries are purged lazily on validation.
pub struct SessionManager {
    ttl: Duration,
    active: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl SessionManager {
    /// Create a manager issuing sessions with the given time-to-live
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs as i64),
            active: RwLock::new(HashMap::new()),
        }
    }

    /// Mint a new session and return the bearer token
    pub async fn issue(&self) -> String {
        let token = generate_session_token();
        let expires_at = Utc::now() + self.ttl;
        self.active
            .write()
            .await
            .insert(hash_secret(&token), expires_at);
        token
    }

    /// Check whether a token names a live session
    pub async fn validate(&self, token: &str) -> bool {
        let key = hash_secret(token);
        let now = Utc::now();

        {
            let active = self.active.read().await;
            match active.get(&key) {
                Some(expires_at) if *expires_at > now => return true,
                None => return false,
                Some(_) => {}
            }
        }

        // Expired entry: drop it.
        self.active.write().await.remove(&key);
        false
    }

    /// Revoke a session (the explicit Unlocked -> Locked transition)
    pub async fn revoke(&self, token: &str) {
        self.active.write().await.remove(&hash_secret(token));
    }

    /// Number of live sessions (expired entries may linger until validated)
    pub async fn active_count(&self) -> usize {
        self.active.read().await.len()
    }
}

/// `Set-Cookie` value establishing an admin session
pub fn session_cookie(name: &str, token: &str, ttl_secs: u64) -> String {
    format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_secs}")
}

/// `Set-Cookie` value clearing the admin session cookie
pub fn clear_session_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_credential() {
        assert!(verify_credential("hunter2", "hunter2"));
        assert!(!verify_credential("hunter", "hunter2"));
        assert!(!verify_credential("", "hunter2"));
    }

    #[test]
    fn test_generate_session_token() {
        let token = generate_session_token();
        assert!(token.starts_with("sess_"));
        assert!(token.len() > 10);
        assert_ne!(token, generate_session_token());
    }

    #[test]
    fn test_extract_cookie() {
        let header = "theme=dark; rawmat_session=sess_abc; other=1";
        assert_eq!(extract_cookie(header, "rawmat_session"), Some("sess_abc"));
        assert_eq!(extract_cookie(header, "theme"), Some("dark"));
        assert_eq!(extract_cookie(header, "missing"), None);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let sessions = SessionManager::new(3600);

        let token = sessions.issue().await;
        assert!(sessions.validate(&token).await);
        assert_eq!(sessions.active_count().await, 1);

        sessions.revoke(&token).await;
        assert!(!sessions.validate(&token).await);
        assert_eq!(sessions.active_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_token_is_locked() {
        let sessions = SessionManager::new(3600);
        assert!(!sessions.validate("sess_forged").await);
    }

    #[tokio::test]
    async fn test_expired_session_is_locked_and_purged() {
        let sessions = SessionManager::new(0);
        let token = sessions.issue().await;
        assert!(!sessions.validate(&token).await);
        assert_eq!(sessions.active_count().await, 0);
    }

    #[test]
    fn test_cookie_headers() {
        let set = session_cookie("rawmat_session", "sess_abc", 3600);
        assert!(set.starts_with("rawmat_session=sess_abc;"));
        assert!(set.contains("HttpOnly"));
        assert!(set.contains("Max-Age=3600"));

        let clear = clear_session_cookie("rawmat_session");
        assert!(clear.contains("Max-Age=0"));
    }
}
