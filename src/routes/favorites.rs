use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use super::AppState;
use crate::{
    error::AppResult,
    middleware::CurrentUser,
    models::{FavoriteBook, NewFavorite},
};

pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<FavoriteBook>>> {
    let favorites = state.store.list_favorites(user.id()).await?;
    Ok(Json(favorites))
}

pub async fn add(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<NewFavorite>,
) -> AppResult<(StatusCode, Json<FavoriteBook>)> {
    let favorite = request.into_favorite(Utc::now())?;
    state.store.add_favorite(user.id(), favorite.clone()).await?;

    tracing::info!(user_id = %user.id(), isbn = %favorite.isbn, "Favorite added");
    Ok((StatusCode::CREATED, Json(favorite)))
}

/// Removing a book that is not a favorite still succeeds
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(isbn): Path<String>,
) -> AppResult<StatusCode> {
    let removed = state.store.remove_favorite(user.id(), isbn.trim()).await?;
    tracing::info!(user_id = %user.id(), isbn = %isbn, removed, "Favorite removal");
    Ok(StatusCode::NO_CONTENT)
}
