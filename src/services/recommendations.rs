use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{CandidateBook, FavoriteBook, Genre},
    services::{
        catalog::BookCatalog,
        dedupe::{dedupe, favorite_isbns, shuffle_and_cap},
        matcher::search_phrases,
    },
};

/// Builds per-genre recommendation lists from the catalog
///
/// For each genre the phrases come from the user's favorite categories that
/// match it (or the genre label itself). Each phrase is searched
/// concurrently, results are concatenated in phrase order, deduplicated
/// against the favorites, then shuffled and capped.
#[derive(Clone)]
pub struct Recommender {
    catalog: Arc<dyn BookCatalog>,
    cap: usize,
}

impl Recommender {
    pub fn new(catalog: Arc<dyn BookCatalog>, cap: usize) -> Self {
        Self { catalog, cap }
    }

    pub fn catalog(&self) -> &Arc<dyn BookCatalog> {
        &self.catalog
    }

    /// Deduplicated candidates for a genre, in catalog order
    ///
    /// A phrase whose lookup fails contributes no candidates.
    pub async fn gather_candidates(
        &self,
        genre: &Genre,
        favorites: &[FavoriteBook],
    ) -> AppResult<Vec<CandidateBook>> {
        let phrases = search_phrases(genre, favorites)?;

        let mut tasks = Vec::with_capacity(phrases.len());
        for phrase in phrases {
            let catalog = Arc::clone(&self.catalog);
            let task = tokio::spawn(async move {
                let result = catalog.search_subject(&phrase).await;
                (phrase, result)
            });
            tasks.push(task);
        }

        let mut raw = Vec::new();
        let mut errors: Vec<AppError> = Vec::new();

        for task in tasks {
            match task.await {
                Ok((_, Ok(books))) => raw.extend(books),
                Ok((phrase, Err(e))) => {
                    tracing::error!(
                        error = %e,
                        genre = %genre,
                        phrase = %phrase,
                        catalog = self.catalog.name(),
                        "Subject search failed"
                    );
                    errors.push(e);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Task join error");
                    errors.push(AppError::Internal(e.to_string()));
                }
            }
        }

        if !errors.is_empty() {
            tracing::warn!(
                genre = %genre,
                error_count = errors.len(),
                candidates = raw.len(),
                "Partial recommendation fetch failure"
            );
        }

        Ok(dedupe(raw, &favorite_isbns(favorites)))
    }

    /// Shuffled, capped recommendations for one genre
    pub async fn recommend_genre(
        &self,
        genre: &Genre,
        favorites: &[FavoriteBook],
    ) -> AppResult<Vec<CandidateBook>> {
        let candidates = self.gather_candidates(genre, favorites).await?;
        let total = candidates.len();
        let books = shuffle_and_cap(candidates, &mut rand::thread_rng(), self.cap);

        tracing::debug!(genre = %genre, total, kept = books.len(), "Recommendations built");

        Ok(books)
    }

    /// Recommendations for each genre, in the order given
    pub async fn recommend_all(
        &self,
        genres: &[Genre],
        favorites: &[FavoriteBook],
    ) -> AppResult<Vec<(Genre, Vec<CandidateBook>)>> {
        let mut lists = Vec::with_capacity(genres.len());
        for genre in genres {
            let books = self.recommend_genre(genre, favorites).await?;
            lists.push((genre.clone(), books));
        }
        Ok(lists)
    }
}
