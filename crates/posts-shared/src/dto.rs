//! Data Transfer Objects - request types for the API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request to create a post. `content` may be any JSON value; any other
/// submitted field is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub content: Value,
    pub author: String,
}

/// Request to update a post. Both fields are required; `id` and timestamps
/// cannot be changed through it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub content: Value,
    pub author: String,
}
