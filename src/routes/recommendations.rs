use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    middleware::CurrentUser,
    models::{CandidateBook, Genre},
    services::{window::RecommendationWindows, BrowsingSession},
};

/// One genre carousel as the client renders it
#[derive(Debug, Serialize)]
pub struct SliceResponse {
    pub genre: Genre,
    pub display_name: String,
    pub cursor: usize,
    pub items: Vec<CandidateBook>,
    pub has_more: bool,
    pub has_prev: bool,
}

impl SliceResponse {
    fn from_windows(windows: &RecommendationWindows, genre: &Genre) -> Self {
        // Report the label the session was built with, not the request's spelling
        let genre = windows.label(genre).unwrap_or(genre);
        let slice = windows.visible_slice(genre);
        Self {
            genre: genre.clone(),
            display_name: genre.display_name().to_string(),
            cursor: windows.state(genre).map(|s| s.cursor()).unwrap_or_default(),
            items: slice.items.into_iter().cloned().collect(),
            has_more: slice.has_more,
            has_prev: slice.has_prev,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub genres: Vec<SliceResponse>,
}

impl SessionResponse {
    fn from_session(session: &BrowsingSession, genres: &[Genre]) -> Self {
        Self {
            id: session.id,
            created_at: session.created_at,
            genres: genres
                .iter()
                .filter(|genre| session.windows.contains(genre))
                .map(|genre| SliceResponse::from_windows(&session.windows, genre))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HideRequest {
    pub id: String,
}

fn ensure_genre(windows: &RecommendationWindows, genre: &Genre) -> AppResult<()> {
    if windows.contains(genre) {
        Ok(())
    } else {
        Err(AppError::NotFound(format!(
            "Genre {} is not part of this session",
            genre
        )))
    }
}

/// Fetches every selected genre and rebuilds the session's windows
async fn load_all(state: &AppState, session: &mut BrowsingSession) -> AppResult<Vec<Genre>> {
    let profile = state.store.get_profile(session.user_id).await?;
    let favorites = state.store.list_favorites(session.user_id).await?;

    let lists = state
        .recommender
        .recommend_all(&profile.fav_genres, &favorites)
        .await?;

    session.windows.clear();
    for (genre, books) in lists {
        session.windows.refresh(genre, books);
    }

    Ok(profile.fav_genres)
}

/// Starts a browsing session with recommendations for every selected genre
pub async fn create_session(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    let mut session = BrowsingSession::new(user.id());
    let genres = load_all(&state, &mut session).await?;
    let response = SessionResponse::from_session(&session, &genres);

    let session_id = session.id;
    state.sessions.insert(session).await;
    let live_sessions = state.sessions.len().await;

    tracing::info!(
        session_id = %session_id,
        user_id = %user.id(),
        genres = genres.len(),
        live_sessions,
        "Browsing session started"
    );

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_session(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let shared = state.sessions.get(session_id, user.id()).await?;
    let profile = state.store.get_profile(user.id()).await?;
    let session = shared.lock().await;
    Ok(Json(SessionResponse::from_session(&session, &profile.fav_genres)))
}

pub async fn delete_session(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(session_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.sessions.remove(session_id, user.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Refetches every genre, picking up changed interests and favorites
pub async fn refresh_session(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let shared = state.sessions.get(session_id, user.id()).await?;
    let mut session = shared.lock().await;
    let genres = load_all(&state, &mut session).await?;
    Ok(Json(SessionResponse::from_session(&session, &genres)))
}

pub async fn get_genre(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((session_id, genre)): Path<(Uuid, String)>,
) -> AppResult<Json<SliceResponse>> {
    let genre = Genre::new(genre)?;
    let shared = state.sessions.get(session_id, user.id()).await?;
    let session = shared.lock().await;
    ensure_genre(&session.windows, &genre)?;
    Ok(Json(SliceResponse::from_windows(&session.windows, &genre)))
}

pub async fn next(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((session_id, genre)): Path<(Uuid, String)>,
) -> AppResult<Json<SliceResponse>> {
    let genre = Genre::new(genre)?;
    let shared = state.sessions.get(session_id, user.id()).await?;
    let mut session = shared.lock().await;
    ensure_genre(&session.windows, &genre)?;
    session.windows.next(&genre);
    Ok(Json(SliceResponse::from_windows(&session.windows, &genre)))
}

pub async fn prev(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((session_id, genre)): Path<(Uuid, String)>,
) -> AppResult<Json<SliceResponse>> {
    let genre = Genre::new(genre)?;
    let shared = state.sessions.get(session_id, user.id()).await?;
    let mut session = shared.lock().await;
    ensure_genre(&session.windows, &genre)?;
    session.windows.prev(&genre);
    Ok(Json(SliceResponse::from_windows(&session.windows, &genre)))
}

pub async fn hide(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((session_id, genre)): Path<(Uuid, String)>,
    Json(request): Json<HideRequest>,
) -> AppResult<Json<SliceResponse>> {
    let genre = Genre::new(genre)?;
    let id = request.id.trim().to_string();
    if id.is_empty() {
        return Err(AppError::InvalidInput("Book id cannot be empty".to_string()));
    }

    let shared = state.sessions.get(session_id, user.id()).await?;
    let mut session = shared.lock().await;
    ensure_genre(&session.windows, &genre)?;
    session.windows.hide(&genre, id);
    Ok(Json(SliceResponse::from_windows(&session.windows, &genre)))
}

/// Refetches one of the session's genres; its hidden books and position are reset
pub async fn refresh_genre(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((session_id, genre)): Path<(Uuid, String)>,
) -> AppResult<Json<SliceResponse>> {
    let genre = Genre::new(genre)?;
    let shared = state.sessions.get(session_id, user.id()).await?;
    let mut session = shared.lock().await;
    ensure_genre(&session.windows, &genre)?;

    let favorites = state.store.list_favorites(user.id()).await?;
    let books = state.recommender.recommend_genre(&genre, &favorites).await?;

    tracing::info!(
        session_id = %session_id,
        genre = %genre,
        books = books.len(),
        "Genre refreshed"
    );

    session.windows.refresh(genre.clone(), books);
    Ok(Json(SliceResponse::from_windows(&session.windows, &genre)))
}
