use std::sync::Arc;

use crate::{
    db::UserStore,
    services::{bookshelf::CategoryAliases, BookCatalog, Recommender, SessionRegistry},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub recommender: Recommender,
    pub sessions: SessionRegistry,
    pub aliases: Arc<CategoryAliases>,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, catalog: Arc<dyn BookCatalog>, cap: usize) -> Self {
        Self {
            store,
            recommender: Recommender::new(catalog, cap),
            sessions: SessionRegistry::default(),
            aliases: Arc::new(CategoryAliases::default()),
        }
    }

    /// Replaces the session registry, e.g. with configured eviction limits
    pub fn with_sessions(mut self, sessions: SessionRegistry) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn catalog(&self) -> &Arc<dyn BookCatalog> {
        self.recommender.catalog()
    }
}
