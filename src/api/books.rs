//! Book endpoints, scoped to the caller's tenant.

use super::{
    error::{require, ApiError},
    AppState,
};
use crate::auth::{
    middleware::token_from_headers,
    models::{Identity, TokenClaims},
};
use crate::books::{Book, BookPatch, NewBook};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    pub name: Option<String>,
    pub author: Option<String>,
}

/// GET /book
pub async fn list_books(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Json<Vec<Book>> {
    Json(state.store.books.list(&identity.customer))
}

/// POST /book
pub async fn create_book(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<CreateBookRequest>, JsonRejection>,
) -> Result<Json<Book>, ApiError> {
    let Json(payload) = payload?;
    let fields = require(&[("name", &payload.name), ("author", &payload.author)])?;

    let book = state.store.books.add(
        &identity.customer,
        NewBook {
            name: fields[0].to_string(),
            author: fields[1].to_string(),
        },
    );

    info!(customer = %identity.customer, id = %book.id, "📖 Book created");
    Ok(Json(book))
}

/// GET /book/:book_id
pub async fn get_book(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(book_id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    state
        .store
        .books
        .get(&identity.customer, &book_id)
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// PUT /book/:book_id
///
/// The tenant comes from re-verifying the raw token rather than the gate identity.
pub async fn update_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    headers: HeaderMap,
    patch: Result<Json<BookPatch>, JsonRejection>,
) -> Result<Json<Book>, ApiError> {
    let claims = reverify(&state, &headers)?;
    let Json(patch) = patch?;
    let book = state.store.books.update(&claims.customer, &book_id, patch)?;

    info!(customer = %claims.customer, id = %book.id, "✏️  Book updated");
    Ok(Json(book))
}

/// DELETE /book/:book_id
///
/// The tenant is looked up from the user named in the re-verified token.
pub async fn delete_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let claims = reverify(&state, &headers)?;
    let customer = state
        .store
        .users
        .customer_of(&claims.username)
        .ok_or(ApiError::Unauthorized)?;

    state.store.books.delete(&customer, &book_id)?;

    info!(customer = %customer, id = %book_id, "🗑️  Book deleted");
    Ok(StatusCode::OK)
}

fn reverify(state: &AppState, headers: &HeaderMap) -> Result<TokenClaims, ApiError> {
    let token = token_from_headers(headers).ok_or(ApiError::Unauthorized)?;
    state.codec.verify(&token, false).map_err(|e| {
        debug!("Token re-verification failed: {}", e);
        ApiError::Unauthorized
    })
}
