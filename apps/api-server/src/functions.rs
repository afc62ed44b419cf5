//! Post handlers - one function per operation, each taking an event and returning an envelope.
//!
//! Every failure is converted to an envelope here; nothing escapes a handler.

use posts_core::PostService;
use posts_shared::dto::{CreatePostRequest, UpdatePostRequest};
use posts_shared::{ApiEvent, Envelope};

use crate::middleware::error::{AppError, AppResult};

/// Path parameter naming the post.
pub const POST_ID: &str = "postId";

/// Create a post. 201 with a `Location` header and no body.
pub async fn create(posts: &PostService, event: ApiEvent) -> Envelope {
    respond(&event, create_post(posts, &event).await)
}

/// Fetch one post. 200 with the post as JSON.
pub async fn get(posts: &PostService, event: ApiEvent) -> Envelope {
    respond(&event, get_post(posts, &event).await)
}

/// Fetch every post. 200 with a JSON array.
pub async fn all(posts: &PostService, event: ApiEvent) -> Envelope {
    respond(&event, all_posts(posts).await)
}

/// Replace content and author of a post. 200 with no body.
pub async fn update(posts: &PostService, event: ApiEvent) -> Envelope {
    respond(&event, update_post(posts, &event).await)
}

/// Delete a post. 204 whether or not it existed.
pub async fn delete(posts: &PostService, event: ApiEvent) -> Envelope {
    respond(&event, delete_post(posts, &event).await)
}

async fn create_post(posts: &PostService, event: &ApiEvent) -> AppResult<Envelope> {
    let req: CreatePostRequest = event.json_body()?;
    let post = posts.create(req.content, req.author).await?;

    Ok(Envelope::new(201).with_header("Location", format!("/posts/{}", post.id)))
}

async fn get_post(posts: &PostService, event: &ApiEvent) -> AppResult<Envelope> {
    let post = posts.get(post_id(event)?).await?;
    Ok(Envelope::json(200, &post)?)
}

async fn all_posts(posts: &PostService) -> AppResult<Envelope> {
    let all = posts.all().await?;
    Ok(Envelope::json(200, &all)?)
}

async fn update_post(posts: &PostService, event: &ApiEvent) -> AppResult<Envelope> {
    let id = post_id(event)?;
    let req: UpdatePostRequest = event.json_body()?;
    posts.update(id, req.content, req.author).await?;

    Ok(Envelope::new(200))
}

async fn delete_post(posts: &PostService, event: &ApiEvent) -> AppResult<Envelope> {
    posts.delete(post_id(event)?).await?;
    Ok(Envelope::new(204))
}

fn post_id(event: &ApiEvent) -> AppResult<&str> {
    event
        .path_parameter(POST_ID)
        .ok_or_else(|| AppError::BadRequest(format!("missing path parameter `{}`", POST_ID)))
}

fn respond(event: &ApiEvent, result: AppResult<Envelope>) -> Envelope {
    match result {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::debug!(request_id = event.request_id(), error = %err, "Request failed");
            err.to_envelope(event.request_id())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use posts_core::StoreError;
    use posts_core::marshal::{AttributeValue, Item, Key};
    use posts_core::ports::Store;
    use posts_infra::InMemoryStore;
    use serde_json::{Value, json};

    use super::*;

    fn service() -> PostService {
        PostService::new(Arc::new(InMemoryStore::new("posts", "id")))
    }

    fn with_id(id: &str) -> ApiEvent {
        ApiEvent::new().with_path_parameter(POST_ID, id)
    }

    fn json_body(envelope: &Envelope) -> Value {
        serde_json::from_str(envelope.body.as_deref().unwrap()).unwrap()
    }

    fn created_id(envelope: &Envelope) -> String {
        envelope
            .header("Location")
            .and_then(|l| l.strip_prefix("/posts/"))
            .unwrap()
            .to_string()
    }

    /// Store whose backend is unreachable.
    struct DownStore;

    #[async_trait]
    impl Store for DownStore {
        fn table_name(&self) -> &str {
            "posts"
        }
        async fn put(&self, _item: Item) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn get_by_key(&self, _key: Key) -> Result<Option<Item>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn scan_all(&self) -> Result<Vec<Item>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn update(&self, _key: Key, _deltas: Item) -> Result<Option<Item>, StoreError> {
            Err(StoreError::Write("update rejected".into()))
        }
        async fn delete(&self, _key: Key) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[actix_web::test]
    async fn test_full_lifecycle() {
        let posts = service();

        let created = create(
            &posts,
            ApiEvent::new().with_body(r#"{"content":"hello","author":"alice"}"#),
        )
        .await;
        assert_eq!(created.status_code, 201);
        assert!(created.body.is_none());
        let id = created_id(&created);

        let fetched = get(&posts, with_id(&id)).await;
        assert_eq!(fetched.status_code, 200);
        assert_eq!(fetched.header("Content-Type"), Some("application/json"));
        assert!(fetched.body.as_deref().unwrap().contains(r#""author":"alice""#));

        let updated = update(
            &posts,
            with_id(&id).with_body(r#"{"content":"world","author":"alice"}"#),
        )
        .await;
        assert_eq!(updated, Envelope::new(200));

        let fetched = json_body(&get(&posts, with_id(&id)).await);
        assert_eq!(fetched["content"], "world");
        assert!(fetched["updatedAt"].is_string());

        assert_eq!(delete(&posts, with_id(&id)).await.status_code, 204);
        assert_eq!(delete(&posts, with_id(&id)).await.status_code, 204);
        assert_eq!(get(&posts, with_id(&id)).await.status_code, 404);
    }

    #[actix_web::test]
    async fn test_get_renders_plain_record() {
        let posts = service();
        let id = created_id(
            &create(&posts, ApiEvent::new().with_body(r#"{"content":"c","author":"a"}"#)).await,
        );

        let body = json_body(&get(&posts, with_id(&id)).await);
        let fields: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();

        assert_eq!(body["id"], json!(id));
        for field in ["id", "content", "author", "createdAt"] {
            assert!(fields.contains(&field), "missing {field}");
        }
    }

    #[actix_web::test]
    async fn test_all_returns_array() {
        let posts = service();
        for author in ["alice", "bob"] {
            let body = json!({ "content": "hi", "author": author }).to_string();
            create(&posts, ApiEvent::new().with_body(body)).await;
        }

        let envelope = all(&posts, ApiEvent::new()).await;
        assert_eq!(envelope.status_code, 200);
        assert_eq!(json_body(&envelope).as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_client_supplied_id_is_ignored() {
        let posts = service();
        let envelope = create(
            &posts,
            ApiEvent::new().with_body(r#"{"id":"mine","content":"c","author":"a"}"#),
        )
        .await;

        assert_ne!(created_id(&envelope), "mine");
        assert_eq!(get(&posts, with_id("mine")).await.status_code, 404);
    }

    #[actix_web::test]
    async fn test_malformed_bodies_are_bad_requests() {
        let posts = service();

        for body in ["not json", r#"{"content":"only"}"#, r#"{"content":"c","author":7}"#] {
            let envelope = create(&posts, ApiEvent::new().with_body(body)).await;
            assert_eq!(envelope.status_code, 400, "body: {body}");
        }
        assert_eq!(create(&posts, ApiEvent::new()).await.status_code, 400);
        assert_eq!(
            update(&posts, with_id("x").with_body(r#"{"author":"a"}"#))
                .await
                .status_code,
            400
        );
    }

    #[actix_web::test]
    async fn test_structured_content_is_stored_and_returned() {
        let posts = service();
        let id = created_id(
            &create(
                &posts,
                ApiEvent::new()
                    .with_body(r#"{"content":{"title":"t","body":"b"},"author":"alice"}"#),
            )
            .await,
        );

        let fetched = json_body(&get(&posts, with_id(&id)).await);
        assert_eq!(fetched["content"], json!({ "title": "t", "body": "b" }));

        let numeric = update(&posts, with_id(&id).with_body(r#"{"content":42,"author":"alice"}"#));
        assert_eq!(numeric.await.status_code, 200);
        assert_eq!(json_body(&get(&posts, with_id(&id)).await)["content"], json!(42));
    }

    #[actix_web::test]
    async fn test_update_of_record_with_naive_timestamp_is_ok() {
        let store = Arc::new(InMemoryStore::new("posts", "id"));
        store
            .put(Item::from([
                ("id".to_string(), AttributeValue::S("legacy".into())),
                ("content".to_string(), AttributeValue::S("hello".into())),
                ("author".to_string(), AttributeValue::S("alice".into())),
                (
                    "createdAt".to_string(),
                    AttributeValue::S("2024-01-01T12:00:00.123456".into()),
                ),
            ]))
            .await
            .unwrap();
        let posts = PostService::new(store);

        let envelope = update(
            &posts,
            with_id("legacy").with_body(r#"{"content":"world","author":"bob"}"#),
        )
        .await;
        assert_eq!(envelope, Envelope::new(200));

        let listed = json_body(&all(&posts, ApiEvent::new()).await);
        assert_eq!(listed[0]["content"], "world");
        assert_eq!(listed[0]["createdAt"], "2024-01-01T12:00:00.123456");
    }

    #[actix_web::test]
    async fn test_update_missing_post_is_not_found() {
        let posts = service();
        let envelope = update(
            &posts,
            with_id("nope").with_body(r#"{"content":"c","author":"a"}"#),
        )
        .await;

        assert_eq!(envelope.status_code, 404);
        assert_eq!(json_body(&all(&posts, ApiEvent::new()).await), json!([]));
    }

    #[actix_web::test]
    async fn test_missing_path_parameter_is_bad_request() {
        let envelope = get(&service(), ApiEvent::new()).await;
        assert_eq!(envelope.status_code, 400);
    }

    #[actix_web::test]
    async fn test_store_failures_map_to_gateway_and_server_errors() {
        let posts = PostService::new(Arc::new(DownStore));

        let envelope = create(
            &posts,
            ApiEvent::new()
                .with_body(r#"{"content":"c","author":"a"}"#)
                .with_request_id("req-1"),
        )
        .await;
        assert_eq!(envelope.status_code, 502);
        assert_eq!(json_body(&envelope)["request_id"], "req-1");

        assert_eq!(all(&posts, ApiEvent::new()).await.status_code, 502);
        assert_eq!(
            update(&posts, with_id("1").with_body(r#"{"content":"c","author":"a"}"#))
                .await
                .status_code,
            500
        );
    }
}
