//! Bookshelf Backend Library
//!
//! Multi-tenant book catalog with token sessions. Exposes every module so the
//! binary and integration tests share one router.

pub mod api;
pub mod auth;
pub mod books;
pub mod config;
pub mod middleware;
pub mod store;

pub use api::{create_router, AppState};
pub use config::Config;
pub use store::Store;
