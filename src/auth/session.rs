//! Session Registry
//! Mission: Track issued tokens per user so they can be revoked before expiry

use crate::auth::{
    jwt::TokenCodec,
    models::{SessionInfo, UserAgentInfo},
};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("unknown user: {0}")]
    UnknownUser(String),
}

/// One user's sessions, keyed by token.
type SessionBucket = Arc<RwLock<HashMap<String, SessionInfo>>>;

/// In-memory registry of live sessions.
///
/// Entries are never expired by a background task; callers run
/// [`SessionRegistry::sweep_expired`] before trusting [`SessionRegistry::list_sessions`].
#[derive(Default)]
pub struct SessionRegistry {
    buckets: RwLock<HashMap<String, SessionBucket>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bucket for `username` if it has none yet.
    pub fn open_bucket(&self, username: &str) {
        self.bucket_or_create(username);
    }

    /// Record a session for a freshly issued token.
    pub fn record(&self, username: &str, token: &str, agent: UserAgentInfo) {
        let bucket = self.bucket_or_create(username);
        bucket
            .write()
            .insert(token.to_string(), SessionInfo::new(agent, Utc::now()));
        debug!(username, "Session recorded");
    }

    /// True iff a session exists for this pair and has not been revoked.
    pub fn is_live(&self, username: &str, token: &str) -> Result<bool, SessionError> {
        let bucket = self.bucket(username)?;
        let live = bucket.read().contains_key(token);
        Ok(live)
    }

    /// Remove a session. Returns whether an entry was actually removed.
    pub fn revoke(&self, username: &str, token: &str) -> Result<bool, SessionError> {
        let bucket = self.bucket(username)?;
        let removed = bucket.write().remove(token).is_some();
        if removed {
            info!(username, "🔒 Session revoked");
        }
        Ok(removed)
    }

    /// All sessions currently held for `username`.
    pub fn list_sessions(
        &self,
        username: &str,
    ) -> Result<BTreeMap<String, SessionInfo>, SessionError> {
        let bucket = self.bucket(username)?;
        let sessions = bucket
            .read()
            .iter()
            .map(|(token, info)| (token.clone(), info.clone()))
            .collect();
        Ok(sessions)
    }

    /// Drop every session whose token no longer verifies with expiry enforced.
    pub fn sweep_expired(&self, username: &str, codec: &TokenCodec) -> Result<usize, SessionError> {
        let bucket = self.bucket(username)?;
        let mut sessions = bucket.write();
        let before = sessions.len();
        sessions.retain(|token, _| codec.verify(token, false).is_ok());
        let removed = before - sessions.len();

        if removed > 0 {
            info!(username, removed, "🧹 Swept expired sessions");
        }
        Ok(removed)
    }

    fn bucket(&self, username: &str) -> Result<SessionBucket, SessionError> {
        self.buckets
            .read()
            .get(username)
            .cloned()
            .ok_or_else(|| SessionError::UnknownUser(username.to_string()))
    }

    fn bucket_or_create(&self, username: &str) -> SessionBucket {
        if let Some(bucket) = self.buckets.read().get(username) {
            return bucket.clone();
        }
        self.buckets
            .write()
            .entry(username.to_string())
            .or_default()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TOKEN_TTL_SECS;
    use chrono::Duration;

    fn codec() -> TokenCodec {
        TokenCodec::new("registry-test-secret")
    }

    #[test]
    fn test_record_then_revoke() {
        let codec = codec();
        let registry = SessionRegistry::new();
        let token = codec.issue("bob", "t1").unwrap();

        registry.record("bob", &token, UserAgentInfo::default());
        assert!(registry.is_live("bob", &token).unwrap());

        assert!(registry.revoke("bob", &token).unwrap());
        assert!(!registry.is_live("bob", &token).unwrap());

        // Revoking again is a no-op
        assert!(!registry.revoke("bob", &token).unwrap());
    }

    #[test]
    fn test_unknown_user() {
        let registry = SessionRegistry::new();
        assert_eq!(
            registry.is_live("ghost", "tok"),
            Err(SessionError::UnknownUser("ghost".to_string()))
        );
        assert!(registry.revoke("ghost", "tok").is_err());
        assert!(registry.list_sessions("ghost").is_err());
        assert!(registry.sweep_expired("ghost", &codec()).is_err());
    }

    #[test]
    fn test_open_bucket_is_empty_and_idempotent() {
        let registry = SessionRegistry::new();
        registry.open_bucket("bob");
        registry.record("bob", "tok", UserAgentInfo::default());
        registry.open_bucket("bob");

        let sessions = registry.list_sessions("bob").unwrap();
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let codec = codec();
        let registry = SessionRegistry::new();
        let stale = Utc::now() - Duration::seconds(TOKEN_TTL_SECS + 60);

        let live = codec.issue("bob", "t1").unwrap();
        let expired = codec.issue_at("bob", "t1", stale).unwrap();
        registry.record("bob", &live, UserAgentInfo::default());
        registry.record("bob", &expired, UserAgentInfo::default());
        registry.record("bob", "garbage", UserAgentInfo::default());

        let removed = registry.sweep_expired("bob", &codec).unwrap();
        assert_eq!(removed, 2);

        let sessions = registry.list_sessions("bob").unwrap();
        assert_eq!(sessions.len(), 1);
        assert!(sessions.contains_key(&live));
    }

    #[test]
    fn test_session_metadata_kept() {
        let registry = SessionRegistry::new();
        let agent = UserAgentInfo {
            browser: Some("Chrome".to_string()),
            os: Some("Linux".to_string()),
            device: None,
        };
        registry.record("bob", "tok", agent);

        let sessions = registry.list_sessions("bob").unwrap();
        let info = &sessions["tok"];
        assert_eq!(info.browser.as_deref(), Some("Chrome"));
        assert_eq!(info.os.as_deref(), Some("Linux"));
        assert_eq!(info.device, None);
    }
}
