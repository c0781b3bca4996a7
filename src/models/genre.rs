use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt::Display,
    hash::{Hash, Hasher},
};

use crate::error::{AppError, AppResult};

/// Genres offered on the interests page
pub const KNOWN_GENRES: [&str; 9] = [
    "Romance",
    "Mystery",
    "Fantasy",
    "Science-Fiction",
    "Thriller",
    "Juvenile",
    "NonFiction",
    "Fiction",
    "Self-Help",
];

/// Genres a fresh demo profile starts with
pub const DEMO_GENRES: [&str; 3] = ["Romance", "Mystery", "Fantasy"];

/// A user-chosen genre label
///
/// Always non-empty and trimmed. The label is kept as entered for display
/// and search phrases; equality, hashing and ordering go through
/// [`Genre::normalized`], so "Science-Fiction" and "science fiction" are the
/// same genre.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Genre(String);

impl Genre {
    /// Creates a genre, rejecting empty labels
    pub fn new(label: impl Into<String>) -> AppResult<Self> {
        let label = label.into();
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(AppError::InvalidInput(
                "Genre cannot be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased label with whitespace/hyphen runs collapsed to one space
    pub fn normalized(&self) -> String {
        normalize_label(&self.0)
    }

    /// Heading shown above the genre's carousel
    pub fn display_name(&self) -> &str {
        match self.0.as_str() {
            "Science-Fiction" => "Science Fiction",
            "NonFiction" => "Non-Fiction",
            "Juvenile" => "Young Adult",
            other => other,
        }
    }

    /// Key under which clicks on this genre are counted
    pub fn count_key(&self) -> String {
        self.0
            .to_lowercase()
            .chars()
            .filter(|c| *c != '-' && !c.is_whitespace())
            .collect()
    }
}

impl PartialEq for Genre {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Genre {}

impl Hash for Genre {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl PartialOrd for Genre {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Genre {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized().cmp(&other.normalized())
    }
}

/// Normalizes a label for comparison: lowercase, whitespace and hyphen runs
/// become a single space.
pub fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Genre {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Genre::new(value)
    }
}

impl From<Genre> for String {
    fn from(genre: Genre) -> Self {
        genre.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_genre_rejected() {
        assert!(matches!(Genre::new(""), Err(AppError::InvalidInput(_))));
        assert!(matches!(Genre::new("   "), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_genre_is_trimmed() {
        assert_eq!(Genre::new("  Romance ").unwrap().as_str(), "Romance");
    }

    #[test]
    fn test_normalized_treats_hyphen_and_space_alike() {
        assert_eq!(normalize_label("Science-Fiction"), "science fiction");
        assert_eq!(normalize_label("science  fiction"), "science fiction");
        assert_eq!(normalize_label("Non-Fiction"), "non fiction");
        assert_eq!(normalize_label("NonFiction"), "nonfiction");
    }

    #[test]
    fn test_spelling_variants_are_the_same_genre() {
        let dashed = Genre::new("Science-Fiction").unwrap();
        let spaced = Genre::new("science  fiction").unwrap();
        assert_eq!(dashed, spaced);
        assert_eq!(dashed.cmp(&spaced), Ordering::Equal);
        assert_eq!(spaced.as_str(), "science  fiction");

        let set: std::collections::HashSet<Genre> = [dashed, spaced].into_iter().collect();
        assert_eq!(set.len(), 1);

        assert_ne!(Genre::new("Romance").unwrap(), Genre::new("Mystery").unwrap());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(
            Genre::new("Science-Fiction").unwrap().display_name(),
            "Science Fiction"
        );
        assert_eq!(Genre::new("NonFiction").unwrap().display_name(), "Non-Fiction");
        assert_eq!(Genre::new("Juvenile").unwrap().display_name(), "Young Adult");
        assert_eq!(Genre::new("Horror").unwrap().display_name(), "Horror");
    }

    #[test]
    fn test_count_key() {
        assert_eq!(
            Genre::new("Science-Fiction").unwrap().count_key(),
            "sciencefiction"
        );
        assert_eq!(Genre::new("Self Help").unwrap().count_key(), "selfhelp");
    }

    #[test]
    fn test_genre_deserialization_rejects_empty() {
        let ok: Genre = serde_json::from_str("\"Fantasy\"").unwrap();
        assert_eq!(ok.as_str(), "Fantasy");
        assert!(serde_json::from_str::<Genre>("\"\"").is_err());
    }
}
