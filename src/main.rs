use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookit_api::{
    config::Config,
    db::{create_pool, create_redis_client, Cache, MemoryUserStore, PgUserStore, UserStore},
    middleware::{REQUEST_ID_HEADER, USER_ID_HEADER},
    routes::{create_router, AppState},
    services::{BookCatalog, GoogleBooksCatalog, SessionRegistry},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookit_api=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn UserStore> = match config.database_url() {
        Some(url) => {
            let pool = create_pool(url).await.context("Failed to connect to database")?;
            Arc::new(PgUserStore::new(pool).await?)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory user store");
            Arc::new(MemoryUserStore::new())
        }
    };

    let (cache, cache_writer) = match config.redis_url() {
        Some(url) => {
            let client = create_redis_client(url)?;
            let (cache, writer) = Cache::new(client).await;
            (Some(cache), Some(writer))
        }
        None => {
            tracing::info!("REDIS_URL not set, catalog lookups are not cached");
            (None, None)
        }
    };

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;
    let catalog: Arc<dyn BookCatalog> =
        Arc::new(GoogleBooksCatalog::new(http_client, &config, cache));

    tracing::info!(
        store = store.name(),
        catalog = catalog.name(),
        cap = config.recommendation_cap,
        "Services initialized"
    );

    let sessions = SessionRegistry::new(
        Duration::from_secs(config.session_ttl_secs),
        config.max_sessions_per_user,
    );
    let state =
        AppState::new(store, catalog, config.recommendation_cap).with_sessions(sessions);

    let cors = CorsLayer::new()
        .allow_origin(config.client_url.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)]);

    let app = create_router(state).layer(cors);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(writer) = cache_writer {
        writer.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
