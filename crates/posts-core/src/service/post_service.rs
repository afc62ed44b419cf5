use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use crate::domain::Post;
use crate::error::DomainError;
use crate::ports::{Clock, Store, SystemClock};

/// CRUD operations over the posts collection.
///
/// Holds no state of its own beyond the injected store and clock handles, so it is
/// cheap to clone and safe to share between concurrent requests.
#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl PostService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn table_name(&self) -> &str {
        self.store.table_name()
    }

    #[instrument(skip(self, content))]
    pub async fn create(&self, content: Value, author: String) -> Result<Post, DomainError> {
        let post = Post::new(content, author, self.clock.now());
        self.store.put(post.to_item()?).await?;

        tracing::info!(post_id = %post.id, "Post created");
        Ok(post)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, post_id: &str) -> Result<Post, DomainError> {
        ensure_id(post_id)?;

        let item = self
            .store
            .get_by_key(Post::key(post_id))
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))?;

        Ok(Post::from_item(&item)?)
    }

    /// Every post in the collection. Unbounded; meant for small tables.
    #[instrument(skip(self))]
    pub async fn all(&self) -> Result<Vec<Post>, DomainError> {
        let items = self.store.scan_all().await?;
        tracing::debug!(count = items.len(), "Scanned posts");

        items
            .iter()
            .map(|item| Post::from_item(item).map_err(DomainError::from))
            .collect()
    }

    /// Overwrite `content` and `author` and stamp `updatedAt`. The write is
    /// conditional on the record existing, so a missing id is `NotFound` and
    /// never leaves a partial record behind.
    #[instrument(skip(self, content))]
    pub async fn update(
        &self,
        post_id: &str,
        content: Value,
        author: String,
    ) -> Result<(), DomainError> {
        ensure_id(post_id)?;

        let deltas = Post::update_deltas(&content, author, self.clock.now());
        self.store
            .update(Post::key(post_id), deltas)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))?;

        tracing::info!(post_id = %post_id, "Post updated");
        Ok(())
    }

    /// Delete a post. Deleting an id that does not exist is not an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, post_id: &str) -> Result<(), DomainError> {
        ensure_id(post_id)?;

        self.store.delete(Post::key(post_id)).await?;

        tracing::info!(post_id = %post_id, "Post deleted");
        Ok(())
    }
}

fn ensure_id(post_id: &str) -> Result<(), DomainError> {
    if post_id.trim().is_empty() {
        return Err(DomainError::Validation("postId must not be empty".to_string()));
    }
    Ok(())
}
