use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::{
    error::{AppError, AppResult},
    models::{FavoriteBook, Genre},
};

static SCIENCE_FICTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)science[\s-]*fiction").expect("valid science fiction pattern"));

static NON_FICTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)non[\s-]*fiction").expect("valid non-fiction pattern"));

/// True when "science" and "fiction" appear together, separated by nothing
/// but whitespace or hyphens.
pub fn matches_science_fiction(category: &str) -> bool {
    SCIENCE_FICTION.is_match(category)
}

/// True for "non fiction" in any spacing, or a category that is exactly
/// "nonfiction".
pub fn matches_non_fiction(category: &str) -> bool {
    NON_FICTION.is_match(category) || category.to_lowercase() == "nonfiction"
}

/// True when the category contains the genre as a whole word. Whitespace and
/// hyphens inside the genre match any run of whitespace or hyphens.
pub fn matches_genre_word(genre: &str, category: &str) -> bool {
    match genre_word_regex(genre) {
        Ok(pattern) => pattern.is_match(category),
        Err(e) => {
            tracing::warn!(genre = %genre, error = %e, "Could not build genre pattern");
            false
        }
    }
}

fn genre_word_regex(genre: &str) -> Result<Regex, regex::Error> {
    let pieces: Vec<String> = genre
        .split(|c: char| c.is_whitespace() || c == '-')
        .map(regex::escape)
        .collect();
    Regex::new(&format!(r"(?i)\b{}\b", pieces.join(r"[\s-]*")))
}

/// Which predicate a genre is matched with
enum MatchPolicy {
    ScienceFiction,
    NonFiction,
    Word(Regex),
}

impl MatchPolicy {
    fn for_genre(genre: &Genre) -> AppResult<Self> {
        let policy = match genre.normalized().as_str() {
            "science fiction" => MatchPolicy::ScienceFiction,
            "nonfiction" | "non fiction" => MatchPolicy::NonFiction,
            _ => MatchPolicy::Word(genre_word_regex(genre.as_str()).map_err(|e| {
                AppError::Internal(format!("Invalid pattern for genre {}: {}", genre, e))
            })?),
        };
        Ok(policy)
    }

    fn matches(&self, category: &str) -> bool {
        match self {
            MatchPolicy::ScienceFiction => matches_science_fiction(category),
            MatchPolicy::NonFiction => matches_non_fiction(category),
            MatchPolicy::Word(pattern) => pattern.is_match(category),
        }
    }
}

/// Returns every favorite category (trimmed, in full) that matches `genre`.
///
/// An empty result means nothing in the user's history is more specific than
/// the genre itself; see [`search_phrases`] for the fallback.
pub fn match_categories<'a, I>(genre: &str, favorite_categories: I) -> AppResult<BTreeSet<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let genre = Genre::new(genre)?;
    matching_categories(&genre, favorite_categories)
}

fn matching_categories<'a, I>(genre: &Genre, favorite_categories: I) -> AppResult<BTreeSet<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let policy = MatchPolicy::for_genre(genre)?;
    Ok(favorite_categories
        .into_iter()
        .map(str::trim)
        .filter(|category| policy.matches(category))
        .map(str::to_string)
        .collect())
}

/// Catalog search phrases for a genre: the matching categories from the
/// user's favorites, or the bare genre label when none match.
pub fn search_phrases(genre: &Genre, favorites: &[FavoriteBook]) -> AppResult<Vec<String>> {
    let categories = favorites
        .iter()
        .flat_map(|book| book.categories.iter().map(String::as_str));
    let matched = matching_categories(genre, categories)?;

    if matched.is_empty() {
        return Ok(vec![genre.as_str().to_string()]);
    }

    tracing::debug!(
        genre = %genre,
        phrases = matched.len(),
        "Using favorite categories as search phrases"
    );

    Ok(matched.into_iter().collect())
}
