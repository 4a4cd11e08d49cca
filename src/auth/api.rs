//! Authentication API Endpoints
//! Mission: Registration, login, token renewal and session management

use crate::api::{
    error::{require, ApiError},
    AppState,
};
use crate::auth::models::{
    Identity, LoginRequest, RegisterRequest, SessionInfo, TokenResponse, UserResponse,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    Extension, Json,
};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// List all users - GET /user
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<UserResponse>> {
    let users = state.store.users.list();
    Json(users.iter().map(UserResponse::from_user).collect())
}

/// Register - POST /user
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(payload) = payload?;
    let fields = require(&[
        ("username", &payload.username),
        ("password", &payload.password),
        ("customer", &payload.customer),
    ])?;
    let (username, password, customer) = (fields[0], fields[1], fields[2]);

    state
        .store
        .register(username, password, customer)
        .map_err(|e| {
            warn!("Failed to register {}: {}", username, e);
            ApiError::from(e)
        })?;

    Ok(StatusCode::OK)
}

/// Login - POST /user/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(payload) = payload?;
    let fields = require(&[
        ("username", &payload.username),
        ("password", &payload.password),
    ])?;
    let (username, password) = (fields[0], fields[1]);

    info!("🔐 Login attempt: {}", username);

    let user = state
        .store
        .users
        .authenticate(username, password)?
        .ok_or_else(|| {
            warn!("❌ Failed login attempt: {}", username);
            ApiError::Unauthenticated
        })?;

    let token = state.codec.issue(&user.username, &user.customer)?;
    record_session(&state, &user.username, &token, &headers);

    info!("✅ Login successful: {} ({})", user.username, user.customer);

    Ok(Json(TokenResponse {
        username: user.username,
        customer: user.customer,
        token,
    }))
}

/// Renew - POST /user/renew
///
/// Issues a fresh token for the identity the gate already established. The
/// presented token stays live until it expires or is revoked.
pub async fn renew(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.codec.issue(&identity.username, &identity.customer)?;
    record_session(&state, &identity.username, &token, &headers);

    info!("🔄 Token renewed: {}", identity.username);

    Ok(Json(TokenResponse {
        username: identity.username,
        customer: identity.customer,
        token,
    }))
}

/// List live sessions - GET /user/session
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<BTreeMap<String, SessionInfo>>, ApiError> {
    let sessions = &state.store.sessions;
    sessions
        .sweep_expired(&identity.username, &state.codec)
        .map_err(|_| ApiError::Unauthorized)?;
    let live = sessions
        .list_sessions(&identity.username)
        .map_err(|_| ApiError::Unauthorized)?;

    Ok(Json(live))
}

/// Revoke a session - DELETE /user/session/:session_id
///
/// Always succeeds; revoking an unknown session is a no-op.
pub async fn revoke_session(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(session_id): Path<String>,
) -> StatusCode {
    if let Err(e) = state.store.sessions.revoke(&identity.username, &session_id) {
        warn!("Session revoke skipped: {}", e);
    }
    StatusCode::OK
}

fn record_session(state: &AppState, username: &str, token: &str, headers: &HeaderMap) {
    let user_agent = headers.get(USER_AGENT).and_then(|h| h.to_str().ok());
    let agent = state.user_agents.parse(user_agent);
    state.store.sessions.record(username, token, agent);
}
