//! Application state - shared across all handlers.

use std::sync::Arc;

use posts_core::PostService;
use posts_core::domain::post;
use posts_core::ports::Store;
use posts_infra::InMemoryStore;

use crate::config::StoreConfig;

#[cfg(feature = "dynamodb")]
use posts_infra::DynamoStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
}

impl AppState {
    /// Build the application state with the configured store.
    pub async fn new(config: &StoreConfig) -> Self {
        let store: Arc<dyn Store> = match config {
            StoreConfig::Memory { table_name } => {
                tracing::warn!(
                    table = %table_name,
                    "DynamoDB not configured. Running with the in-memory store."
                );
                Arc::new(InMemoryStore::new(table_name.clone(), post::ID))
            }
            #[cfg(feature = "dynamodb")]
            StoreConfig::DynamoDb(dynamo) => Arc::new(DynamoStore::connect(dynamo.clone()).await),
        };

        tracing::info!(table = %store.table_name(), "Application state initialized");

        Self::with_service(PostService::new(store))
    }

    pub fn with_service(posts: PostService) -> Self {
        Self { posts }
    }
}
