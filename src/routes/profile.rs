use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::{
    error::AppResult,
    middleware::CurrentUser,
    models::{Genre, NewUser, UserProfile, KNOWN_GENRES},
};

#[derive(Debug, Serialize)]
pub struct GenreOption {
    pub label: String,
    pub display_name: String,
}

/// Genres offered on the interests page
pub async fn list_genres() -> Json<Vec<GenreOption>> {
    let genres = KNOWN_GENRES
        .iter()
        .filter_map(|label| Genre::new(*label).ok())
        .map(|genre| GenreOption {
            display_name: genre.display_name().to_string(),
            label: genre.into(),
        })
        .collect();
    Json(genres)
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<NewUser>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    let profile = state.store.create_user(request.into_profile()?).await?;
    tracing::info!(user_id = %profile.id, store = state.store.name(), "User created");
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<UserProfile>> {
    let profile = state.store.get_profile(user.id()).await?;
    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct InterestsRequest {
    pub genres: Vec<Genre>,
}

pub async fn update_interests(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<InterestsRequest>,
) -> AppResult<Json<UserProfile>> {
    let profile = state
        .store
        .update_interests(user.id(), request.genres)
        .await?;

    tracing::info!(
        user_id = %user.id(),
        genres = profile.fav_genres.len(),
        "Interests updated"
    );

    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct GenreCountRequest {
    pub genre: Genre,
}

#[derive(Debug, Serialize)]
pub struct GenreCountResponse {
    pub genre: Genre,
    pub count: u32,
}

pub async fn increment_genre_count(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<GenreCountRequest>,
) -> AppResult<Json<GenreCountResponse>> {
    let count = state
        .store
        .increment_genre_count(user.id(), &request.genre)
        .await?;

    Ok(Json(GenreCountResponse {
        genre: request.genre,
        count,
    }))
}
