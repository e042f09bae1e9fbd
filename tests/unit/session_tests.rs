// Session model and in-memory store tests

use memebot::meme::CaptionPosition;
use memebot::session::*;
use std::sync::Arc;

#[tokio::test]
async fn test_store_behind_trait_object() {
    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let mut session = Session::for_image("stock/doge");
    session.set_caption(CaptionPosition::Top, Some("such wow"));
    session.set_caption(CaptionPosition::Bottom, Some("very meme"));

    store.save("user-1", &session).await.unwrap();
    let loaded = store.load("user-1").await.unwrap().unwrap();

    assert_eq!(loaded.image_id(), Some("stock/doge"));
    assert_eq!(loaded.caption(CaptionPosition::Top), Some("such wow"));
    assert_eq!(loaded.caption(CaptionPosition::Bottom), Some("very meme"));
}

#[tokio::test]
async fn test_save_overwrites() {
    let store = MemorySessionStore::new();
    store.save("u", &Session::for_image("a")).await.unwrap();
    store.save("u", &Session::for_image("b")).await.unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(
        store.load("u").await.unwrap().unwrap().image_id(),
        Some("b")
    );
}

#[tokio::test]
async fn test_entries_written_by_older_deployments() {
    let store = MemorySessionStore::new();
    store.insert_raw(
        "u",
        r#"{"cloudinary_public_id":"abc","strings":{"bottom":"legacy"}}"#,
    );
    let session = store.load("u").await.unwrap().unwrap();
    assert_eq!(session.caption(CaptionPosition::Bottom), Some("legacy"));
}

#[test]
fn test_session_json_round_trip_shape() {
    let mut session = Session::for_image("abc");
    session.set_caption(CaptionPosition::Top, Some("hi"));
    let value: serde_json::Value = serde_json::from_str(&session.to_json().unwrap()).unwrap();
    assert_eq!(
        value,
        serde_json::json!({"cloudinary_public_id": "abc", "strings": {"top": "hi"}})
    );
}

#[test]
fn test_session_error_messages() {
    assert_eq!(
        SessionError::Timeout(2000).to_string(),
        "Session store operation timed out after 2000ms"
    );
    assert_eq!(
        SessionError::Connection("refused".into()).to_string(),
        "Session store connection failed: refused"
    );
}
