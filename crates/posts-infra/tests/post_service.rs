//! PostService behavior over the in-memory store.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use posts_core::ports::{Clock, Store};
use posts_core::{DomainError, PostService};
use posts_core::marshal::{AttributeValue, Item};
use posts_infra::InMemoryStore;
use serde_json::json;

/// Clock that advances one second per reading.
struct SteppingClock(AtomicI64);

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let secs = self.0.fetch_add(1, Ordering::SeqCst);
        Utc.timestamp_opt(secs, 0).unwrap()
    }
}

fn parse(timestamp: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(timestamp).unwrap().with_timezone(&Utc)
}

fn service() -> (PostService, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new("posts", "id"));
    let clock = Arc::new(SteppingClock(AtomicI64::new(1_700_000_000)));
    (PostService::with_clock(store.clone(), clock), store)
}

#[tokio::test]
async fn test_create_then_get_returns_same_post() {
    let (posts, _) = service();

    let created = posts
        .create(json!("hello"), "alice".into())
        .await
        .unwrap();
    let fetched = posts.get(&created.id).await.unwrap();

    assert_eq!(fetched, created);
    assert!(uuid::Uuid::parse_str(&created.id).is_ok());
}

#[tokio::test]
async fn test_created_at_falls_within_call_window() {
    let store = Arc::new(InMemoryStore::new("posts", "id"));
    let posts = PostService::new(store);

    let before = Utc::now();
    let created = posts.create(json!("x"), "y".into()).await.unwrap();
    let after = Utc::now();

    let created_at = parse(&created.created_at);
    assert!(created_at >= before && created_at <= after);
}

#[tokio::test]
async fn test_all_contains_each_post_once() {
    let (posts, _) = service();

    let mut ids = Vec::new();
    for i in 0..5 {
        let post = posts
            .create(json!(format!("post {i}")), "alice".into())
            .await
            .unwrap();
        ids.push(post.id);
    }

    let all = posts.all().await.unwrap();
    assert_eq!(all.len(), 5);
    for id in &ids {
        assert_eq!(all.iter().filter(|p| &p.id == id).count(), 1);
    }
}

#[tokio::test]
async fn test_update_refreshes_fields_and_timestamp() {
    let (posts, _) = service();
    let created = posts.create(json!("hello"), "alice".into()).await.unwrap();

    posts
        .update(&created.id, json!("x"), "y".into())
        .await
        .unwrap();
    let fetched = posts.get(&created.id).await.unwrap();

    assert_eq!(fetched.content, json!("x"));
    assert_eq!(fetched.author, "y");
    assert_eq!(fetched.created_at, created.created_at);
    assert!(parse(fetched.updated_at.as_deref().unwrap()) > parse(&fetched.created_at));
}

#[tokio::test]
async fn test_structured_content_round_trips() {
    let (posts, _) = service();
    let content = json!({ "title": "t", "body": "b", "views": 3 });

    let created = posts.create(content.clone(), "alice".into()).await.unwrap();
    assert_eq!(posts.get(&created.id).await.unwrap().content, content);

    let revised = json!({ "title": "t2", "tags": ["a", "b"] });
    posts
        .update(&created.id, revised.clone(), "alice".into())
        .await
        .unwrap();
    assert_eq!(posts.get(&created.id).await.unwrap().content, revised);
}

#[tokio::test]
async fn test_update_missing_post_is_not_found_and_creates_nothing() {
    let (posts, store) = service();

    let err = posts
        .update("no-such-post", json!("x"), "y".into())
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::NotFound { .. }));
    assert!(store.scan_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_is_idempotent_and_get_then_misses() {
    let (posts, _) = service();
    let created = posts.create(json!("hello"), "alice".into()).await.unwrap();

    posts.delete(&created.id).await.unwrap();
    posts.delete(&created.id).await.unwrap();

    assert!(matches!(
        posts.get(&created.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_empty_id_is_a_validation_error() {
    let (posts, _) = service();

    assert!(matches!(posts.get("").await, Err(DomainError::Validation(_))));
    assert!(matches!(
        posts.delete("  ").await,
        Err(DomainError::Validation(_))
    ));
}

#[tokio::test]
async fn test_corrupt_record_surfaces_as_store_error() {
    let (posts, store) = service();
    store
        .put(Item::from([
            ("id".to_string(), AttributeValue::S("broken".into())),
            ("content".to_string(), AttributeValue::S("no author".into())),
        ]))
        .await
        .unwrap();

    assert!(matches!(
        posts.get("broken").await,
        Err(DomainError::Store(posts_core::StoreError::Marshal(_)))
    ));
}

/// A record written with a naive local timestamp, as older writers of the
/// table produced.
async fn put_naive_record(store: &InMemoryStore) {
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
}

#[tokio::test]
async fn test_naive_timestamp_record_is_readable() {
    let (posts, store) = service();
    put_naive_record(&store).await;
    posts.create(json!("fresh"), "bob".into()).await.unwrap();

    let legacy = posts.get("legacy").await.unwrap();
    assert_eq!(legacy.created_at, "2024-01-01T12:00:00.123456");

    let all = posts.all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|p| p.id == "legacy"));
}

#[tokio::test]
async fn test_update_of_naive_timestamp_record_succeeds() {
    let (posts, store) = service();
    put_naive_record(&store).await;

    posts
        .update("legacy", json!("world"), "bob".into())
        .await
        .unwrap();

    let stored = store
        .get_by_key(Item::from([(
            "id".to_string(),
            AttributeValue::S("legacy".into()),
        )]))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored["content"], AttributeValue::S("world".into()));
    assert_eq!(
        stored["createdAt"],
        AttributeValue::S("2024-01-01T12:00:00.123456".into())
    );
}

#[tokio::test]
async fn test_update_reports_success_even_if_record_no_longer_decodes() {
    let (posts, store) = service();
    store
        .put(Item::from([
            ("id".to_string(), AttributeValue::S("odd".into())),
            ("createdAt".to_string(), AttributeValue::N("17".into())),
        ]))
        .await
        .unwrap();

    posts
        .update("odd", json!("world"), "bob".into())
        .await
        .unwrap();

    assert!(posts.get("odd").await.is_err());
}
