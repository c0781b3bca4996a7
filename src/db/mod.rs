pub mod memory;
pub mod postgres;
pub mod redis;

pub use self::memory::MemoryUserStore;
pub use self::postgres::{create_pool, PgUserStore};
pub use self::redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{FavoriteBook, Genre, UserProfile},
};

/// Persistence for user profiles, genre preferences and favorites
///
/// Implementations seed the demo profile ([`crate::models::DEMO_USER_ID`])
/// when they are created.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Stores a new profile; fails with `Conflict` if the email is taken
    async fn create_user(&self, profile: UserProfile) -> AppResult<UserProfile>;

    async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile>;

    /// Replaces the selected genres (duplicates dropped, order kept)
    async fn update_interests(&self, user_id: Uuid, genres: Vec<Genre>) -> AppResult<UserProfile>;

    /// Bumps a genre's click counter and returns the new value
    async fn increment_genre_count(&self, user_id: Uuid, genre: &Genre) -> AppResult<u32>;

    /// Favorites in the order they were added
    async fn list_favorites(&self, user_id: Uuid) -> AppResult<Vec<FavoriteBook>>;

    /// Fails with `Conflict` if the ISBN is already a favorite
    async fn add_favorite(&self, user_id: Uuid, book: FavoriteBook) -> AppResult<()>;

    /// Returns whether a favorite was actually removed
    async fn remove_favorite(&self, user_id: Uuid, isbn: &str) -> AppResult<bool>;

    /// Store name for logging
    fn name(&self) -> &'static str;
}
