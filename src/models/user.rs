use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::genre::{Genre, DEMO_GENRES, KNOWN_GENRES};
use crate::error::{AppError, AppResult};

/// Fixed id of the shared demo profile used when no user is supplied
pub const DEMO_USER_ID: Uuid = Uuid::from_u128(0x6750_0000_0000_0000_0000_0000_0000_0001);

pub const DEMO_USER_EMAIL: &str = "demo@bookit.app";

/// A user's profile and genre preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Selected genres, in the order chosen, without duplicates
    pub fav_genres: Vec<Genre>,
    /// Clicks per genre, keyed by [`Genre::count_key`]
    pub genre_counts: BTreeMap<String, u32>,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a profile
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl NewUser {
    pub fn into_profile(self) -> AppResult<UserProfile> {
        let email = self.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::InvalidInput(format!(
                "Invalid email address: {}",
                self.email
            )));
        }
        Ok(UserProfile::new(email, self.first_name, self.last_name))
    }
}

impl UserProfile {
    /// Creates a profile with no genres and every known counter at zero
    pub fn new(email: String, first_name: String, last_name: String) -> Self {
        let genre_counts = KNOWN_GENRES
            .iter()
            .filter_map(|label| Genre::new(*label).ok())
            .map(|genre| (genre.count_key(), 0))
            .collect();

        Self {
            id: Uuid::new_v4(),
            email,
            first_name,
            last_name,
            fav_genres: Vec::new(),
            genre_counts,
            created_at: Utc::now(),
        }
    }

    /// The demo profile as it exists before anyone edits it
    pub fn demo() -> Self {
        let mut profile = Self::new(
            DEMO_USER_EMAIL.to_string(),
            "Demo".to_string(),
            "User".to_string(),
        );
        profile.id = DEMO_USER_ID;
        profile.set_interests(
            DEMO_GENRES
                .iter()
                .filter_map(|label| Genre::new(*label).ok())
                .collect(),
        );
        profile
    }

    /// Replaces the selected genres, keeping the first occurrence of each
    pub fn set_interests(&mut self, genres: Vec<Genre>) {
        let mut unique: Vec<Genre> = Vec::with_capacity(genres.len());
        for genre in genres {
            if !unique.contains(&genre) {
                unique.push(genre);
            }
        }
        self.fav_genres = unique;
    }

    /// Bumps the click counter for a genre and returns the new count
    pub fn increment_genre(&mut self, genre: &Genre) -> u32 {
        let count = self.genre_counts.entry(genre.count_key()).or_insert(0);
        *count += 1;
        *count
    }
}
