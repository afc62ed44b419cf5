//! # Posts Shared
//!
//! Wire types shared by the handlers and their callers: request bodies,
//! invocation events and the response envelope.

pub mod dto;
pub mod event;
pub mod response;

pub use event::{ApiEvent, BodyError, RequestContext};
pub use response::{Envelope, ErrorResponse};
