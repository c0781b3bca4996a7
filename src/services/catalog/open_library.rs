use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::book::ApiOpenLibraryResponse,
};

/// Open Library client; only used to enrich the book page with excerpts
#[derive(Clone)]
pub struct OpenLibraryClient {
    http_client: HttpClient,
    api_url: String,
}

impl OpenLibraryClient {
    pub fn new(http_client: HttpClient, api_url: String) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Excerpts for an ISBN, in the order Open Library lists them
    pub async fn fetch_excerpts(&self, isbn: &str) -> AppResult<Vec<String>> {
        let url = format!("{}/api/books", self.api_url);
        let bibkey = format!("ISBN:{}", isbn);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("bibkeys", bibkey.as_str()),
                ("format", "json"),
                ("jscmd", "data"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "Open Library returned status {}",
                status
            )));
        }

        let body: ApiOpenLibraryResponse = response.json().await?;
        Ok(excerpts_for(body, &bibkey))
    }

    /// Like [`fetch_excerpts`](Self::fetch_excerpts) but logs failures and
    /// returns nothing instead
    pub async fn excerpts_or_empty(&self, isbn: &str) -> Vec<String> {
        match self.fetch_excerpts(isbn).await {
            Ok(excerpts) => excerpts,
            Err(e) => {
                tracing::warn!(error = %e, isbn = %isbn, "Open Library excerpt lookup failed");
                Vec::new()
            }
        }
    }
}

fn excerpts_for(mut body: ApiOpenLibraryResponse, bibkey: &str) -> Vec<String> {
    body.0
        .remove(bibkey)
        .map(|book| {
            book.excerpts
                .into_iter()
                .map(|excerpt| excerpt.text.trim().to_string())
                .filter(|text| !text.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
