//! Application configuration loaded from environment variables.

use std::env;

#[cfg(feature = "dynamodb")]
use posts_infra::DynamoConfig;

/// Table name used when none is configured.
pub const DEFAULT_TABLE: &str = "posts";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
}

/// Which store backs the posts table.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// Process-local store; data is lost on restart.
    Memory { table_name: String },
    #[cfg(feature = "dynamodb")]
    DynamoDb(DynamoConfig),
}

impl StoreConfig {
    pub fn table_name(&self) -> &str {
        match self {
            StoreConfig::Memory { table_name } => table_name,
            #[cfg(feature = "dynamodb")]
            StoreConfig::DynamoDb(config) => &config.table_name,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            store: Self::store_from_env(),
        }
    }

    /// `STORE_BACKEND=memory` forces the in-memory store; otherwise DynamoDB is used
    /// whenever `DYNAMODB_TABLE` is set.
    fn store_from_env() -> StoreConfig {
        let memory_forced = env::var("STORE_BACKEND")
            .map(|v| v.eq_ignore_ascii_case("memory"))
            .unwrap_or(false);

        if !memory_forced {
            if let Some(store) = dynamo_from_env() {
                return store;
            }
        }

        StoreConfig::Memory {
            table_name: env::var("DYNAMODB_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.to_string()),
        }
    }
}

#[cfg(feature = "dynamodb")]
fn dynamo_from_env() -> Option<StoreConfig> {
    DynamoConfig::from_env().map(StoreConfig::DynamoDb)
}

#[cfg(not(feature = "dynamodb"))]
fn dynamo_from_env() -> Option<StoreConfig> {
    None
}
