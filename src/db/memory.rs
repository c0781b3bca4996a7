use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::UserStore;
use crate::{
    error::{AppError, AppResult},
    models::{FavoriteBook, Genre, UserProfile},
};

struct UserRecord {
    profile: UserProfile,
    favorites: Vec<FavoriteBook>,
}

impl UserRecord {
    fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            favorites: Vec::new(),
        }
    }
}

/// In-process user store, used when no database is configured and in tests
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, UserRecord>>,
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryUserStore {
    /// Creates a store holding only the demo profile
    pub fn new() -> Self {
        let demo = UserProfile::demo();
        let mut users = HashMap::new();
        users.insert(demo.id, UserRecord::new(demo));
        Self {
            users: RwLock::new(users),
        }
    }
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, profile: UserProfile) -> AppResult<UserProfile> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.profile.email == profile.email) {
            return Err(AppError::Conflict(
                "That email is already taken.".to_string(),
            ));
        }
        users.insert(profile.id, UserRecord::new(profile.clone()));
        Ok(profile)
    }

    async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        let users = self.users.read().await;
        users
            .get(&user_id)
            .map(|u| u.profile.clone())
            .ok_or_else(user_not_found)
    }

    async fn update_interests(&self, user_id: Uuid, genres: Vec<Genre>) -> AppResult<UserProfile> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&user_id).ok_or_else(user_not_found)?;
        user.profile.set_interests(genres);
        Ok(user.profile.clone())
    }

    async fn increment_genre_count(&self, user_id: Uuid, genre: &Genre) -> AppResult<u32> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&user_id).ok_or_else(user_not_found)?;
        Ok(user.profile.increment_genre(genre))
    }

    async fn list_favorites(&self, user_id: Uuid) -> AppResult<Vec<FavoriteBook>> {
        let users = self.users.read().await;
        users
            .get(&user_id)
            .map(|u| u.favorites.clone())
            .ok_or_else(user_not_found)
    }

    async fn add_favorite(&self, user_id: Uuid, book: FavoriteBook) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&user_id).ok_or_else(user_not_found)?;
        if user.favorites.iter().any(|fav| fav.isbn == book.isbn) {
            return Err(AppError::Conflict("Book already in favorites".to_string()));
        }
        user.favorites.push(book);
        Ok(())
    }

    async fn remove_favorite(&self, user_id: Uuid, isbn: &str) -> AppResult<bool> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&user_id).ok_or_else(user_not_found)?;
        let before = user.favorites.len();
        user.favorites.retain(|fav| fav.isbn != isbn);
        Ok(user.favorites.len() != before)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEMO_USER_ID;
    use chrono::Utc;

    fn favorite(isbn: &str) -> FavoriteBook {
        FavoriteBook {
            isbn: isbn.to_string(),
            title: format!("Book {}", isbn),
            authors: vec!["Author".to_string()],
            image_link: None,
            categories: vec!["Fiction / Romance".to_string()],
            added_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_demo_profile_is_seeded() {
        let store = MemoryUserStore::new();
        let profile = store.get_profile(DEMO_USER_ID).await.unwrap();
        assert_eq!(profile.fav_genres.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let store = MemoryUserStore::new();
        let result = store.get_profile(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryUserStore::new();
        let first = UserProfile::new("a@b.c".to_string(), String::new(), String::new());
        let second = UserProfile::new("a@b.c".to_string(), String::new(), String::new());

        store.create_user(first).await.unwrap();
        assert!(matches!(
            store.create_user(second).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_favorites_are_unique_by_isbn() {
        let store = MemoryUserStore::new();
        store.add_favorite(DEMO_USER_ID, favorite("111")).await.unwrap();
        store.add_favorite(DEMO_USER_ID, favorite("222")).await.unwrap();

        let result = store.add_favorite(DEMO_USER_ID, favorite("111")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let isbns: Vec<String> = store
            .list_favorites(DEMO_USER_ID)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.isbn)
            .collect();
        assert_eq!(isbns, vec!["111".to_string(), "222".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_favorite() {
        let store = MemoryUserStore::new();
        store.add_favorite(DEMO_USER_ID, favorite("111")).await.unwrap();

        assert!(store.remove_favorite(DEMO_USER_ID, "111").await.unwrap());
        assert!(!store.remove_favorite(DEMO_USER_ID, "111").await.unwrap());
        assert!(store.list_favorites(DEMO_USER_ID).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_interests_and_counts() {
        let store = MemoryUserStore::new();
        let thriller = Genre::new("Thriller").unwrap();

        let profile = store
            .update_interests(DEMO_USER_ID, vec![thriller.clone(), thriller.clone()])
            .await
            .unwrap();
        assert_eq!(profile.fav_genres, vec![thriller.clone()]);

        assert_eq!(store.increment_genre_count(DEMO_USER_ID, &thriller).await.unwrap(), 1);
        assert_eq!(store.increment_genre_count(DEMO_USER_ID, &thriller).await.unwrap(), 2);
    }
}
