//! Application services built on top of the ports.

mod post_service;

pub use post_service::PostService;
