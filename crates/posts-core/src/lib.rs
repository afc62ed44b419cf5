//! # Posts Core
//!
//! The domain layer of the posts API.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod marshal;
pub mod ports;
pub mod service;

pub use error::{DomainError, StoreError};
pub use service::PostService;
