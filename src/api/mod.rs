pub mod books;
pub mod error;

use crate::auth::{
    api as auth_api, auth_gate, jwt::TokenCodec, user_agent::UserAgentParser,
};
use crate::middleware::request_logging;
use crate::store::Store;
use axum::{
    middleware,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub codec: Arc<TokenCodec>,
    pub user_agents: Arc<dyn UserAgentParser>,
}

impl AppState {
    pub fn new(
        store: Arc<Store>,
        codec: Arc<TokenCodec>,
        user_agents: Arc<dyn UserAgentParser>,
    ) -> Self {
        Self {
            store,
            codec,
            user_agents,
        }
    }
}

/// Create the API router. Every route passes through the auth gate, which
/// lets the public ones through untouched.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/user", get(auth_api::list_users).post(auth_api::register))
        .route("/user/login", post(auth_api::login))
        .route("/user/renew", post(auth_api::renew))
        .route("/user/session", get(auth_api::list_sessions))
        .route("/user/session/:session_id", delete(auth_api::revoke_session))
        .route("/book", get(books::list_books).post(books::create_book))
        .route(
            "/book/:book_id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_gate))
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
