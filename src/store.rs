//! Application Store
//! Mission: Single owner of all in-memory state, built once at startup

use crate::auth::{models::User, session::SessionRegistry, user_store::UserStore};
use crate::books::BookStore;
use anyhow::Result;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("username already taken: {0}")]
    Conflict(String),
    #[error("not found")]
    NotFound,
}

/// Users, books and sessions for the whole service.
///
/// Nothing here is global: construct one per process (or per test) and share
/// it behind an `Arc`.
pub struct Store {
    pub users: UserStore,
    pub books: BookStore,
    pub sessions: SessionRegistry,
}

impl Store {
    pub fn new(password_cost: u32) -> Self {
        Self {
            users: UserStore::new(password_cost),
            books: BookStore::new(),
            sessions: SessionRegistry::new(),
        }
    }

    /// Register a user, opening the tenant's book collection and the
    /// user's session bucket.
    pub fn register(&self, username: &str, password: &str, customer: &str) -> Result<User> {
        let user = self.users.register(username, password, customer)?;
        self.books.open_tenant(&user.customer);
        self.sessions.open_bucket(&user.username);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_PASSWORD_COST;

    fn store() -> Store {
        Store::new(MIN_PASSWORD_COST)
    }

    #[test]
    fn test_register_opens_tenant_and_bucket() {
        let store = store();
        assert!(!store.books.has_tenant("t1"));

        store.register("bob", "pw1", "t1").unwrap();
        assert!(store.books.has_tenant("t1"));
        assert!(store.books.list("t1").is_empty());
        assert!(store.sessions.list_sessions("bob").unwrap().is_empty());
    }

    #[test]
    fn test_second_user_keeps_tenant_books() {
        let store = store();
        store.register("bob", "pw1", "t1").unwrap();
        store.books.add(
            "t1",
            crate::books::NewBook {
                name: "Dune".to_string(),
                author: "Herbert".to_string(),
            },
        );

        store.register("amy", "pw2", "t1").unwrap();
        assert_eq!(store.books.list("t1").len(), 1);
    }

    #[test]
    fn test_duplicate_register_conflicts() {
        let store = store();
        store.register("bob", "pw1", "t1").unwrap();

        let err = store.register("bob", "pw1", "t2").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Conflict(_))
        ));
        assert!(!store.books.has_tenant("t2"));
    }
}
