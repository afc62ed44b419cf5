//! # Posts Infrastructure
//!
//! Concrete implementations of the ports defined in `posts-core`.
//!
//! ## Feature Flags
//!
//! - `dynamodb` (default) - DynamoDB store via the AWS SDK

pub mod store;

pub use store::InMemoryStore;

#[cfg(feature = "dynamodb")]
pub use store::{DynamoConfig, DynamoStore};
