//! User Storage
//! Mission: Keep user accounts and their tenant in memory

use crate::auth::models::User;
use crate::store::StoreError;
use anyhow::{Context, Result};
use bcrypt::{hash, verify};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// In-memory user storage keyed by username
pub struct UserStore {
    users: RwLock<BTreeMap<String, User>>,
    password_cost: u32,
}

impl UserStore {
    /// Create an empty store hashing passwords at `password_cost`
    pub fn new(password_cost: u32) -> Self {
        Self {
            users: RwLock::new(BTreeMap::new()),
            password_cost,
        }
    }

    /// Create a new user. Fails with `Conflict` if the username is taken.
    pub fn register(&self, username: &str, password: &str, customer: &str) -> Result<User> {
        if self.users.read().contains_key(username) {
            return Err(StoreError::Conflict(username.to_string()).into());
        }

        // Hash outside the write lock; the insert below re-checks for a racing register.
        let password_digest =
            hash(password, self.password_cost).context("Failed to hash password")?;

        let user = User {
            username: username.to_string(),
            password_digest,
            customer: customer.to_string(),
        };

        let mut users = self.users.write();
        if users.contains_key(username) {
            return Err(StoreError::Conflict(username.to_string()).into());
        }
        users.insert(user.username.clone(), user.clone());

        info!("✅ Created user: {} ({})", user.username, user.customer);

        Ok(user)
    }

    /// Verify username and password, returning the user on a match
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.get(username) else {
            return Ok(None);
        };

        let valid =
            verify(password, &user.password_digest).context("Failed to verify password")?;
        if !valid {
            warn!("❌ Password mismatch for {}", username);
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Get user by username
    pub fn get(&self, username: &str) -> Option<User> {
        self.users.read().get(username).cloned()
    }

    /// Tenant the user registered under
    pub fn customer_of(&self, username: &str) -> Option<String> {
        self.users
            .read()
            .get(username)
            .map(|user| user.customer.clone())
    }

    /// List all users, ordered by username
    pub fn list(&self) -> Vec<User> {
        self.users.read().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_PASSWORD_COST;

    fn create_test_store() -> UserStore {
        UserStore::new(MIN_PASSWORD_COST)
    }

    #[test]
    fn test_register_and_authenticate() {
        let store = create_test_store();
        let user = store.register("bob", "pw1", "t1").unwrap();
        assert_eq!(user.username, "bob");
        assert_eq!(user.customer, "t1");
        assert_ne!(user.password_digest, "pw1");

        let found = store.authenticate("bob", "pw1").unwrap().unwrap();
        assert_eq!(found.customer, "t1");

        assert!(store.authenticate("bob", "wrong").unwrap().is_none());
        assert!(store.authenticate("nobody", "pw1").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username_conflicts() {
        let store = create_test_store();
        store.register("bob", "pw1", "t1").unwrap();

        let err = store.register("bob", "other", "t2").unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::Conflict("bob".to_string()))
        );

        // The original record is untouched
        assert_eq!(store.customer_of("bob").as_deref(), Some("t1"));
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_list_users() {
        let store = create_test_store();
        store.register("zed", "pw", "t1").unwrap();
        store.register("amy", "pw", "t2").unwrap();

        let names: Vec<_> = store.list().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["amy", "zed"]);
        assert!(store.get("amy").is_some());
        assert!(store.get("bob").is_none());
    }
}
