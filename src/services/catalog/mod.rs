/// Book catalog abstraction
///
/// Recommendations and the book page read from a public catalog. The
/// Google Books implementation is used in production; tests substitute a
/// mock or a fixed in-memory catalog.
use crate::{
    error::AppResult,
    models::{BookDetails, CandidateBook},
};

pub mod google_books;
pub mod open_library;

pub use google_books::GoogleBooksCatalog;
pub use open_library::OpenLibraryClient;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait BookCatalog: Send + Sync {
    /// Books whose subject matches a search phrase, in catalog relevance order
    async fn search_subject(&self, phrase: &str) -> AppResult<Vec<CandidateBook>>;

    /// Full record for one ISBN; `None` when the catalog has no match
    async fn lookup_isbn(&self, isbn: &str) -> AppResult<Option<BookDetails>>;

    /// Catalog name for logging
    fn name(&self) -> &'static str;
}
