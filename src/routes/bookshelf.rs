use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::{
    error::AppResult,
    middleware::CurrentUser,
    models::FavoriteBook,
    services::bookshelf::{group_by_category, shelf_names, split_into_rows, DEFAULT_BOOKS_PER_ROW},
};

#[derive(Debug, Deserialize)]
pub struct BookshelfQuery {
    per_row: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ShelfRows {
    pub genre: String,
    pub rows: Vec<Vec<FavoriteBook>>,
}

#[derive(Debug, Serialize)]
pub struct BookshelfResponse {
    /// Shelf names sorted alphabetically
    pub genres: Vec<String>,
    /// Shelves in the order their first book was favorited
    pub shelves: Vec<ShelfRows>,
}

pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<BookshelfQuery>,
) -> AppResult<Json<BookshelfResponse>> {
    let favorites = state.store.list_favorites(user.id()).await?;
    let shelves = group_by_category(&favorites, &state.aliases);
    let per_row = params.per_row.unwrap_or(DEFAULT_BOOKS_PER_ROW);

    let response = BookshelfResponse {
        genres: shelf_names(&shelves),
        shelves: shelves
            .into_iter()
            .map(|shelf| ShelfRows {
                rows: split_into_rows(&shelf.books, per_row),
                genre: shelf.genre,
            })
            .collect(),
    };

    Ok(Json(response))
}
