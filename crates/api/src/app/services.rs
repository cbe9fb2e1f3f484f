use std::sync::Arc;

use bitacora_infra::{
    AppConfig, AuthorStore, PostStore, StoreBackend, StoreResult,
    store::{InMemoryStore, PostgresStore},
};

/// Record stores shared by every handler.
///
/// Built once at startup; handlers receive it through an `Extension`.
#[derive(Clone)]
pub struct AppServices {
    pub authors: Arc<dyn AuthorStore>,
    pub posts: Arc<dyn PostStore>,
}

impl AppServices {
    /// Use one backing store for both record types.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: AuthorStore + PostStore + 'static,
    {
        Self {
            authors: store.clone(),
            posts: store,
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }
}

/// Select and initialize the record store described by `config`.
pub async fn build_services(config: &AppConfig) -> StoreResult<AppServices> {
    match &config.store {
        StoreBackend::InMemory => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
            Ok(AppServices::in_memory())
        }
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let store = PostgresStore::connect(database_url, *max_connections).await?;
            store.ensure_schema().await?;
            tracing::info!(max_connections, "using postgres store");
            Ok(AppServices::from_store(Arc::new(store)))
        }
    }
}
