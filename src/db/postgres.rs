use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgPool};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::UserStore;
use crate::{
    error::{AppError, AppResult},
    models::{FavoriteBook, Genre, UserProfile},
};

/// Creates a PostgreSQL connection pool
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    fav_genres: Vec<String>,
    genre_counts: Json<BTreeMap<String, u32>>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        UserProfile {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            fav_genres: row
                .fav_genres
                .into_iter()
                .filter_map(|label| Genre::new(label).ok())
                .collect(),
            genre_counts: row.genre_counts.0,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct FavoriteRow {
    isbn: String,
    title: String,
    authors: Vec<String>,
    image_link: Option<String>,
    categories: Vec<String>,
    added_at: DateTime<Utc>,
}

impl From<FavoriteRow> for FavoriteBook {
    fn from(row: FavoriteRow) -> Self {
        FavoriteBook {
            isbn: row.isbn,
            title: row.title,
            authors: row.authors,
            image_link: row.image_link,
            categories: row.categories,
            added_at: row.added_at,
        }
    }
}

fn genre_labels(genres: &[Genre]) -> Vec<String> {
    genres.iter().map(|g| g.as_str().to_string()).collect()
}

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Runs pending migrations and makes sure the demo profile exists
    pub async fn new(pool: PgPool) -> AppResult<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;

        let store = Self { pool };
        store.seed_demo_user().await?;
        Ok(store)
    }

    async fn seed_demo_user(&self) -> AppResult<()> {
        let demo = UserProfile::demo();
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, first_name, last_name, fav_genres, genre_counts)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(demo.id)
        .bind(&demo.email)
        .bind(&demo.first_name)
        .bind(&demo.last_name)
        .bind(genre_labels(&demo.fav_genres))
        .bind(Json(&demo.genre_counts))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            tracing::info!(user_id = %demo.id, "Seeded demo user");
        }
        Ok(())
    }

    async fn ensure_user(&self, user_id: Uuid) -> AppResult<()> {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        exists
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, profile: UserProfile) -> AppResult<UserProfile> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, first_name, last_name, fav_genres, genre_counts, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(genre_labels(&profile.fav_genres))
        .bind(Json(&profile.genre_counts))
        .bind(profile.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(profile),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
                "That email is already taken.".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, email, first_name, last_name, fav_genres, genre_counts, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserProfile::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn update_interests(&self, user_id: Uuid, genres: Vec<Genre>) -> AppResult<UserProfile> {
        let mut profile = self.get_profile(user_id).await?;
        profile.set_interests(genres);

        sqlx::query("UPDATE users SET fav_genres = $2 WHERE id = $1")
            .bind(user_id)
            .bind(genre_labels(&profile.fav_genres))
            .execute(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn increment_genre_count(&self, user_id: Uuid, genre: &Genre) -> AppResult<u32> {
        let row: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE users
            SET genre_counts = jsonb_set(
                genre_counts,
                ARRAY[$2::text],
                to_jsonb(COALESCE((genre_counts ->> $2::text)::int, 0) + 1)
            )
            WHERE id = $1
            RETURNING (genre_counts ->> $2::text)::int
            "#,
        )
        .bind(user_id)
        .bind(genre.count_key())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(count,)| count.max(0) as u32)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn list_favorites(&self, user_id: Uuid) -> AppResult<Vec<FavoriteBook>> {
        self.ensure_user(user_id).await?;

        let rows: Vec<FavoriteRow> = sqlx::query_as(
            r#"
            SELECT isbn, title, authors, image_link, categories, added_at
            FROM favorite_books
            WHERE user_id = $1
            ORDER BY added_at, isbn
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FavoriteBook::from).collect())
    }

    async fn add_favorite(&self, user_id: Uuid, book: FavoriteBook) -> AppResult<()> {
        self.ensure_user(user_id).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO favorite_books (user_id, isbn, title, authors, image_link, categories, added_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, isbn) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.authors)
        .bind(&book.image_link)
        .bind(&book.categories)
        .bind(book.added_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Book already in favorites".to_string()));
        }
        Ok(())
    }

    async fn remove_favorite(&self, user_id: Uuid, isbn: &str) -> AppResult<bool> {
        self.ensure_user(user_id).await?;

        let result = sqlx::query("DELETE FROM favorite_books WHERE user_id = $1 AND isbn = $2")
            .bind(user_id)
            .bind(isbn)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
