use axum::{
    extract::{Path, State},
    Json,
};

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    models::BookDetails,
};

/// Book page details for an ISBN
pub async fn show(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<BookDetails>> {
    state
        .catalog()
        .lookup_isbn(&isbn)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", isbn.trim())))
}
