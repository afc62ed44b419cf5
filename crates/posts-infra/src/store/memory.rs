//! In-memory store implementation - used when DynamoDB is not configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use posts_core::StoreError;
use posts_core::marshal::{Item, Key};
use posts_core::ports::Store;

/// In-memory store using a HashMap keyed by the partition key value.
///
/// Note: Data is lost on process restart.
pub struct InMemoryStore {
    table_name: String,
    key_attribute: String,
    items: RwLock<HashMap<String, Item>>,
}

impl InMemoryStore {
    pub fn new(table_name: impl Into<String>, key_attribute: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            key_attribute: key_attribute.into(),
            items: RwLock::new(HashMap::new()),
        }
    }

    /// Extract the partition key value, rejecting keys the backend would reject.
    fn key_value(&self, key: &Key) -> Result<String, StoreError> {
        key.get(&self.key_attribute)
            .and_then(|value| value.as_s())
            .map(str::to_string)
            .ok_or_else(|| {
                StoreError::Marshal(format!(
                    "item is missing string key attribute `{}`",
                    self.key_attribute
                ))
            })
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl Store for InMemoryStore {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn put(&self, item: Item) -> Result<(), StoreError> {
        let key = self.key_value(&item)?;
        self.items.write().await.insert(key, item);
        Ok(())
    }

    async fn get_by_key(&self, key: Key) -> Result<Option<Item>, StoreError> {
        let key = self.key_value(&key)?;
        Ok(self.items.read().await.get(&key).cloned())
    }

    async fn scan_all(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn update(&self, key: Key, deltas: Item) -> Result<Option<Item>, StoreError> {
        let key = self.key_value(&key)?;

        // Single write lock: the existence check and the write are one step.
        let mut items = self.items.write().await;
        let Some(item) = items.get_mut(&key) else {
            return Ok(None);
        };
        item.extend(deltas.clone());

        Ok(Some(deltas))
    }

    async fn delete(&self, key: Key) -> Result<(), StoreError> {
        let key = self.key_value(&key)?;
        self.items.write().await.remove(&key);
        Ok(())
    }
}
