//! API Errors
//! Mission: Map every handler failure onto a status code and JSON body

use crate::store::StoreError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors surfaced by the HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or empty required field (named)
    Validation(&'static str),
    /// Body absent, not JSON, or not the expected shape
    InvalidBody(String),
    Conflict,
    /// Bad credentials
    Unauthenticated,
    /// Missing, invalid, expired or revoked token
    Unauthorized,
    NotFound,
    Internal(anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => ApiError::Conflict,
            StoreError::NotFound => ApiError::NotFound,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<StoreError>() {
            Some(store_err) => store_err.clone().into(),
            None => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(field) => (
                StatusCode::BAD_REQUEST,
                format!("Missing or empty field: {}", field),
            ),
            ApiError::InvalidBody(reason) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid request body: {}", reason),
            ),
            ApiError::Conflict => (StatusCode::CONFLICT, "Username already exists".to_string()),
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".to_string(),
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Require every field to be present and non-empty.
pub fn require<'a>(
    fields: &[(&'static str, &'a Option<String>)],
) -> Result<Vec<&'a str>, ApiError> {
    fields
        .iter()
        .map(|&(name, value)| match value.as_deref() {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(ApiError::Validation(name)),
        })
        .collect()
}
