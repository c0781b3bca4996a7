/// Google Books catalog
///
/// Subject search backs the recommendation carousels; ISBN lookup backs the
/// book page, which is enriched with Open Library excerpts.
///
/// API Flow:
/// 1. Subject search: /volumes?q=subject:{term}&orderBy=relevance&maxResults={n}
/// 2. Book page: /volumes?q=isbn:{isbn} → first item, then Open Library excerpts
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client as HttpClient;

use super::{BookCatalog, OpenLibraryClient};
use crate::{
    cached,
    config::Config,
    db::redis::{Cache, CacheKey, ISBN_LOOKUP_TTL, SUBJECT_SEARCH_TTL},
    error::{AppError, AppResult},
    models::{book::ApiVolumesResponse, BookDetails, CandidateBook},
};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Formats a phrase the way the catalog expects a subject term:
/// lowercased, whitespace runs turned into `+`, slashes dropped.
///
/// "Fiction / Romance" becomes "fiction++romance".
pub fn subject_search_term(phrase: &str) -> String {
    let lowered = phrase.trim().to_lowercase();
    WHITESPACE.replace_all(&lowered, "+").replace('/', "")
}

/// Percent-encodes each `+`-separated piece of a subject term, keeping the
/// `+` separators literal
fn encode_term(term: &str) -> String {
    term.split('+')
        .map(|piece| urlencoding::encode(piece).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}

#[derive(Clone)]
pub struct GoogleBooksCatalog {
    http_client: HttpClient,
    api_url: String,
    api_key: Option<String>,
    max_results: u32,
    open_library: OpenLibraryClient,
    cache: Option<Cache>,
}

impl GoogleBooksCatalog {
    /// Creates the catalog client; lookups are cached when `cache` is set
    pub fn new(http_client: HttpClient, config: &Config, cache: Option<Cache>) -> Self {
        let open_library =
            OpenLibraryClient::new(http_client.clone(), config.open_library_url.clone());

        Self {
            http_client,
            api_url: config.catalog_api_url.trim_end_matches('/').to_string(),
            api_key: config
                .catalog_api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
            max_results: config.catalog_max_results,
            open_library,
            cache,
        }
    }

    async fn fetch_volumes(&self, query: &str, extra: &[(&str, String)]) -> AppResult<ApiVolumesResponse> {
        let url = format!("{}/volumes?q={}", self.api_url, query);

        let mut request = self.http_client.get(&url).query(extra);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Google Books returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(error = %e, "Failed to deserialize Google Books response");
            AppError::ExternalApi(format!("Failed to parse Google Books response: {}", e))
        })
    }

    async fn fetch_subject(&self, phrase: &str) -> AppResult<Vec<CandidateBook>> {
        let term = encode_term(&subject_search_term(phrase));
        let query = format!("subject:{}", term);

        let volumes = self
            .fetch_volumes(
                &query,
                &[
                    ("orderBy", "relevance".to_string()),
                    ("maxResults", self.max_results.to_string()),
                ],
            )
            .await?;

        let books: Vec<CandidateBook> = volumes
            .items
            .unwrap_or_default()
            .into_iter()
            .map(CandidateBook::from)
            .collect();

        tracing::info!(
            phrase = %phrase,
            results = books.len(),
            catalog = "google_books",
            "Subject search completed"
        );

        Ok(books)
    }

    async fn fetch_details(&self, isbn: &str) -> AppResult<Option<BookDetails>> {
        let query = format!("isbn:{}", urlencoding::encode(isbn));
        let volumes = self.fetch_volumes(&query, &[]).await?;

        let Some(volume) = volumes.items.and_then(|items| items.into_iter().next()) else {
            tracing::info!(isbn = %isbn, "No catalog record for ISBN");
            return Ok(None);
        };

        let mut details = volume.volume_info.into_details(isbn);
        details.excerpts = self.open_library.excerpts_or_empty(isbn).await;

        tracing::info!(
            isbn = %isbn,
            excerpts = details.excerpts.len(),
            catalog = "google_books",
            "Book details fetched"
        );

        Ok(Some(details))
    }
}

#[async_trait::async_trait]
impl BookCatalog for GoogleBooksCatalog {
    async fn search_subject(&self, phrase: &str) -> AppResult<Vec<CandidateBook>> {
        if phrase.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search phrase cannot be empty".to_string(),
            ));
        }

        match &self.cache {
            Some(cache) => cached!(
                cache,
                CacheKey::SubjectSearch(phrase.to_string()),
                SUBJECT_SEARCH_TTL,
                self.fetch_subject(phrase)
            ),
            None => self.fetch_subject(phrase).await,
        }
    }

    async fn lookup_isbn(&self, isbn: &str) -> AppResult<Option<BookDetails>> {
        let isbn = isbn.trim();
        if isbn.is_empty() {
            return Err(AppError::InvalidInput("ISBN cannot be empty".to_string()));
        }

        match &self.cache {
            Some(cache) => cached!(
                cache,
                CacheKey::IsbnLookup(isbn.to_string()),
                ISBN_LOOKUP_TTL,
                self.fetch_details(isbn)
            ),
            None => self.fetch_details(isbn).await,
        }
    }

    fn name(&self) -> &'static str {
        "google_books"
    }
}
