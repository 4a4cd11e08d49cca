//! Authentication Middleware
//! Mission: Single enforcement point for every protected route

use crate::api::AppState;
use crate::auth::{jwt::TokenError, models::Identity};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, warn};

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "auth-token";

/// Whether a route needs an established identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
}

/// Classify a request. Only registration, login and the health check are public.
pub fn classify(method: &Method, path: &str) -> Access {
    match (method, path) {
        (&Method::POST, "/user") | (&Method::POST, "/user/login") | (&Method::GET, "/health") => {
            Access::Public
        }
        _ => Access::Protected,
    }
}

/// Read the raw token header, if present.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
}

/// Auth gate: resolves identity for protected routes and rejects everything else.
pub async fn auth_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if classify(req.method(), req.uri().path()) == Access::Public {
        return Ok(next.run(req).await);
    }

    let token = token_from_headers(req.headers()).ok_or(AuthError::MissingToken)?;
    let identity = authorize(&state, &token)?;

    // Add identity to request extensions so handlers can access it
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Verify a token and check that its session is still live.
///
/// An expired token has its session entry dropped before the request is rejected.
pub fn authorize(state: &AppState, token: &str) -> Result<Identity, AuthError> {
    match state.codec.verify(token, false) {
        Ok(claims) => {
            let live = state
                .store
                .sessions
                .is_live(&claims.username, token)
                .unwrap_or(false);
            if !live {
                debug!(username = %claims.username, "Rejected revoked session");
                return Err(AuthError::Revoked);
            }
            Ok(Identity {
                username: claims.username,
                customer: claims.customer,
            })
        }
        Err(TokenError::Expired) => {
            if let Ok(claims) = state.codec.verify(token, true) {
                if let Err(e) = state.store.sessions.revoke(&claims.username, token) {
                    debug!("Skipped expired session cleanup: {}", e);
                }
            }
            Err(AuthError::Expired)
        }
        Err(e) => {
            warn!("Rejected token: {}", e);
            Err(AuthError::InvalidToken)
        }
    }
}

/// Auth error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    Expired,
    Revoked,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "Missing auth-token header",
            AuthError::InvalidToken => "Invalid token",
            AuthError::Expired => "Token expired",
            AuthError::Revoked => "Session revoked",
        };

        (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
    }
}
