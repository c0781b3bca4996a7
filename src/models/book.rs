use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{AppError, AppResult};

/// A book the user has favorited
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavoriteBook {
    /// Unique within one user's favorites
    pub isbn: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub image_link: Option<String>,
    /// Raw, possibly hierarchical categories, e.g. "Fiction / Romance"
    #[serde(default)]
    pub categories: Vec<String>,
    pub added_at: DateTime<Utc>,
}

/// Request body for adding a favorite
#[derive(Debug, Clone, Deserialize)]
pub struct NewFavorite {
    pub isbn: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub image_link: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl NewFavorite {
    /// Validates the request and stamps it with the time it was added
    pub fn into_favorite(self, added_at: DateTime<Utc>) -> AppResult<FavoriteBook> {
        let isbn = self.isbn.trim().to_string();
        if isbn.is_empty() {
            return Err(AppError::InvalidInput("ISBN cannot be empty".to_string()));
        }

        Ok(FavoriteBook {
            isbn,
            title: self.title,
            authors: self.authors,
            image_link: self.image_link.filter(|link| !link.is_empty()),
            categories: self.categories,
            added_at,
        })
    }
}

/// A recommendation candidate from the catalog; never persisted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateBook {
    /// First industry identifier of the catalog record, if any
    pub id: Option<String>,
    pub title: String,
    pub authors: Vec<String>,
    pub image_link: Option<String>,
    pub categories: Vec<String>,
}

impl CandidateBook {
    /// Usable identifier, treating an empty string as missing
    pub fn identifier(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Catalog record shown on the book page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookDetails {
    pub isbn: String,
    pub title: String,
    pub authors: Vec<String>,
    pub image_link: Option<String>,
    pub categories: Vec<String>,
    pub description: Option<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub page_count: Option<u32>,
    /// Excerpts from Open Library, when it has any
    #[serde(default)]
    pub excerpts: Vec<String>,
}

// ============================================================================
// Google Books API Types
// ============================================================================

/// Raw `volumes` response from the Google Books API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiVolumesResponse {
    #[serde(default)]
    pub items: Option<Vec<ApiVolume>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVolume {
    pub volume_info: ApiVolumeInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVolumeInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Option<Vec<String>>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub image_links: Option<ApiImageLinks>,
    #[serde(default)]
    pub industry_identifiers: Option<Vec<ApiIndustryIdentifier>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub page_count: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiImageLinks {
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub small_thumbnail: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiIndustryIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
}

impl ApiVolumeInfo {
    /// The first listed identifier, whatever its type
    pub fn first_identifier(&self) -> Option<String> {
        self.industry_identifiers
            .as_ref()
            .and_then(|ids| ids.first())
            .map(|id| id.identifier.trim().to_string())
            .filter(|id| !id.is_empty())
    }

    /// Thumbnail, falling back to the small thumbnail
    pub fn image_link(&self) -> Option<String> {
        self.image_links.as_ref().and_then(|links| {
            links
                .thumbnail
                .clone()
                .or_else(|| links.small_thumbnail.clone())
        })
    }
}

impl From<ApiVolume> for CandidateBook {
    fn from(volume: ApiVolume) -> Self {
        let info = volume.volume_info;
        CandidateBook {
            id: info.first_identifier(),
            image_link: info.image_link(),
            title: info.title.unwrap_or_default(),
            authors: info.authors.unwrap_or_default(),
            categories: info.categories.unwrap_or_default(),
        }
    }
}

impl ApiVolumeInfo {
    /// Converts into book-page details for the ISBN that was looked up
    pub fn into_details(self, isbn: &str) -> BookDetails {
        BookDetails {
            isbn: isbn.to_string(),
            image_link: self.image_link(),
            title: self.title.unwrap_or_default(),
            authors: self.authors.unwrap_or_default(),
            categories: self.categories.unwrap_or_default(),
            description: self.description,
            publisher: self.publisher,
            published_date: self.published_date,
            page_count: self.page_count,
            excerpts: Vec::new(),
        }
    }
}

// ============================================================================
// Open Library API Types
// ============================================================================

/// `api/books?jscmd=data` response, keyed by bibkey (e.g. "ISBN:978...")
#[derive(Debug, Clone, Deserialize)]
pub struct ApiOpenLibraryResponse(pub HashMap<String, ApiOpenLibraryBook>);

#[derive(Debug, Clone, Deserialize)]
pub struct ApiOpenLibraryBook {
    #[serde(default)]
    pub excerpts: Vec<ApiOpenLibraryExcerpt>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiOpenLibraryExcerpt {
    pub text: String,
}
