//! Store implementations - DynamoDB and in-memory fallback.

mod memory;

#[cfg(feature = "dynamodb")]
mod dynamodb;

pub use memory::InMemoryStore;

#[cfg(feature = "dynamodb")]
pub use dynamodb::{DynamoConfig, DynamoStore};
