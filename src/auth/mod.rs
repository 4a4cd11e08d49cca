//! Authentication Module
//! Mission: Token issuance, session tracking and the request gate

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod session;
pub mod user_agent;
pub mod user_store;

pub use jwt::{TokenCodec, TokenError};
pub use middleware::auth_gate;
pub use session::SessionRegistry;
pub use user_store::UserStore;
