use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; the in-memory store is used when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL; catalog lookups are not cached when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Google Books API base URL
    #[serde(default = "default_catalog_api_url")]
    pub catalog_api_url: String,

    /// Optional Google Books API key
    #[serde(default)]
    pub catalog_api_key: Option<String>,

    /// Page size requested per subject search
    #[serde(default = "default_catalog_max_results")]
    pub catalog_max_results: u32,

    /// Open Library base URL, used for excerpts on the book page
    #[serde(default = "default_open_library_url")]
    pub open_library_url: String,

    /// Maximum recommendations kept per genre
    #[serde(default = "default_recommendation_cap")]
    pub recommendation_cap: usize,

    /// Origin allowed by CORS (the web client)
    #[serde(default = "default_client_url")]
    pub client_url: String,

    /// Outbound HTTP request timeout in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Idle seconds after which a browsing session is dropped
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Browsing sessions kept per user before the oldest is dropped
    #[serde(default = "default_max_sessions_per_user")]
    pub max_sessions_per_user: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_catalog_api_url() -> String {
    "https://www.googleapis.com/books/v1".to_string()
}

fn default_catalog_max_results() -> u32 {
    40
}

fn default_open_library_url() -> String {
    "https://openlibrary.org".to_string()
}

fn default_recommendation_cap() -> usize {
    crate::services::dedupe::RECOMMENDATION_CAP
}

fn default_client_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_session_ttl_secs() -> u64 {
    crate::services::session::DEFAULT_SESSION_TTL_SECS
}

fn default_max_sessions_per_user() -> usize {
    crate::services::session::DEFAULT_MAX_SESSIONS_PER_USER
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7070
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Database URL, ignoring an empty value
    pub fn database_url(&self) -> Option<&str> {
        non_empty(self.database_url.as_deref())
    }

    /// Redis URL, ignoring an empty value
    pub fn redis_url(&self) -> Option<&str> {
        non_empty(self.redis_url.as_deref())
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
