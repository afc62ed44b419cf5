use async_trait::async_trait;

use crate::error::StoreError;
use crate::marshal::{Item, Key};

/// Key-value store holding one collection of items.
///
/// Every call touches at most one key, except [`Store::scan_all`]. Implementations
/// are addressed by a table name fixed at construction.
#[async_trait]
pub trait Store: Send + Sync {
    /// Name of the backing table or collection.
    fn table_name(&self) -> &str;

    /// Write a full item, replacing any item with the same key.
    async fn put(&self, item: Item) -> Result<(), StoreError>;

    /// Fetch an item by primary key.
    async fn get_by_key(&self, key: Key) -> Result<Option<Item>, StoreError>;

    /// Read every item in the collection.
    async fn scan_all(&self) -> Result<Vec<Item>, StoreError>;

    /// Overwrite the given attributes on an existing item.
    ///
    /// Returns the attributes as written, or `None` when no item has this key.
    /// A missing key is never created.
    async fn update(&self, key: Key, deltas: Item) -> Result<Option<Item>, StoreError>;

    /// Remove an item by primary key. Succeeds whether or not the key existed.
    async fn delete(&self, key: Key) -> Result<(), StoreError>;
}
