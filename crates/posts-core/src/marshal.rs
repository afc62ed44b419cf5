//! Record marshaling between plain JSON objects and typed store attributes.
//!
//! The store keeps every attribute tagged with its type (`S`, `N`, `BOOL`, ...), while the
//! API speaks plain JSON. These functions are the only place the two meet.

use std::collections::HashMap;

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// A record as the store sees it: attribute name to typed value.
pub type Item = HashMap<String, AttributeValue>;

/// A primary-key-only [`Item`].
pub type Key = Item;

/// Store-neutral typed attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// String.
    S(String),
    /// Number, kept in its decimal text form.
    N(String),
    Bool(bool),
    Null,
    /// Ordered list of values.
    L(Vec<AttributeValue>),
    /// Nested map.
    M(Item),
}

impl AttributeValue {
    /// Borrow the string payload of an `S` value.
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            _ => None,
        }
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::S(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::S(value.to_string())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum MarshalError {
    #[error("attribute `{name}` holds an invalid number: {value}")]
    InvalidNumber { name: String, value: String },

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("record does not match its schema: {0}")]
    Schema(String),
}

/// Convert a JSON value into its typed attribute form.
pub fn to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(to_item(map)),
    }
}

/// Convert a typed attribute back into plain JSON.
pub fn from_attribute(value: &AttributeValue) -> Result<Value, MarshalError> {
    from_named_attribute("<value>", value)
}

fn from_named_attribute(name: &str, value: &AttributeValue) -> Result<Value, MarshalError> {
    Ok(match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => n
            .parse::<Number>()
            .map(Value::Number)
            .map_err(|_| MarshalError::InvalidNumber {
                name: name.to_string(),
                value: n.clone(),
            })?,
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null => Value::Null,
        AttributeValue::L(items) => Value::Array(
            items
                .iter()
                .map(|item| from_named_attribute(name, item))
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::M(item) => Value::Object(to_dict(item)?),
    })
}

/// Marshal a plain JSON object into a store item.
pub fn to_item(map: &Map<String, Value>) -> Item {
    map.iter()
        .map(|(name, value)| (name.clone(), to_attribute(value)))
        .collect()
}

/// Marshal any JSON value that must be an object into a store item.
pub fn value_to_item(value: &Value) -> Result<Item, MarshalError> {
    match value {
        Value::Object(map) => Ok(to_item(map)),
        Value::Null => Err(MarshalError::NotAnObject("null")),
        Value::Bool(_) => Err(MarshalError::NotAnObject("a boolean")),
        Value::Number(_) => Err(MarshalError::NotAnObject("a number")),
        Value::String(_) => Err(MarshalError::NotAnObject("a string")),
        Value::Array(_) => Err(MarshalError::NotAnObject("an array")),
    }
}

/// Unmarshal a store item into a plain JSON object.
pub fn to_dict(item: &Item) -> Result<Map<String, Value>, MarshalError> {
    item.iter()
        .map(|(name, value)| Ok((name.clone(), from_named_attribute(name, value)?)))
        .collect()
}
