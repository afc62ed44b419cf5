use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::marshal::{self, AttributeValue, Item, Key, MarshalError};

/// Primary key attribute of the posts table.
pub const ID: &str = "id";
pub const CONTENT: &str = "content";
pub const AUTHOR: &str = "author";
pub const UPDATED_AT: &str = "updatedAt";

/// Post entity - a piece of content attributed to an author.
///
/// `content` is whatever JSON the client sent, a plain string or a nested
/// structure. Timestamps are kept as the ISO-8601 text found in the store, so
/// records written with or without a UTC offset both read back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub content: Value,
    pub author: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Post {
    /// Create a new post with a freshly generated id.
    pub fn new(content: Value, author: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content,
            author,
            created_at: to_timestamp(created_at),
            updated_at: None,
        }
    }

    /// Primary key for the post with this id.
    pub fn key(id: &str) -> Key {
        Key::from([(ID.to_string(), AttributeValue::S(id.to_string()))])
    }

    /// The attributes written by an update; nothing else is ever touched.
    pub fn update_deltas(content: &Value, author: String, updated_at: DateTime<Utc>) -> Item {
        Item::from([
            (CONTENT.to_string(), marshal::to_attribute(content)),
            (AUTHOR.to_string(), AttributeValue::S(author)),
            (UPDATED_AT.to_string(), AttributeValue::S(to_timestamp(updated_at))),
        ])
    }

    pub fn to_item(&self) -> Result<Item, MarshalError> {
        let value =
            serde_json::to_value(self).map_err(|e| MarshalError::Schema(e.to_string()))?;
        marshal::value_to_item(&value)
    }

    pub fn from_item(item: &Item) -> Result<Self, MarshalError> {
        let dict = marshal::to_dict(item)?;
        serde_json::from_value(Value::Object(dict))
            .map_err(|e| MarshalError::Schema(e.to_string()))
    }
}

/// RFC 3339 in UTC with a `Z` suffix, the form every new record is written in.
pub fn to_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
}
