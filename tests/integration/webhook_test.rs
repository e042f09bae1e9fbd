// Webhook end-to-end tests: handshake, signature checks and the chat flow

use memebot::meme::CaptionPosition;
use memebot::messenger::SIGNATURE_HEADER;
use memebot::session::{Session, SessionStore};
use std::time::{Duration, Instant};

use super::test_harness::*;

#[tokio::test]
async fn test_subscription_handshake_echoes_challenge() {
    let server = TestServer::start().await;
    let response = server
        .client
        .get(server.url(&format!(
            "/webhook?hub.mode=subscribe&hub.verify_token={}&hub.challenge=1158201444",
            VALIDATION_TOKEN
        )))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "1158201444");
}

#[tokio::test]
async fn test_subscription_with_wrong_token_is_forbidden() {
    let server = TestServer::start().await;
    let response = server
        .client
        .get(server.url("/webhook?hub.mode=subscribe&hub.verify_token=nope&hub.challenge=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_unsigned_post_is_rejected() {
    let server = TestServer::start().await;
    let response = server
        .client
        .post(server.url("/webhook"))
        .body(text_message("u1", "help"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 403);
    assert!(server.replies().is_empty());
}

#[tokio::test]
async fn test_bad_signature_is_rejected() {
    let server = TestServer::start().await;
    let response = server
        .client
        .post(server.url("/webhook"))
        .header(SIGNATURE_HEADER, "sha256=deadbeef")
        .body(text_message("u1", "help"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 403);
    assert!(server.replies().is_empty());
}

#[tokio::test]
async fn test_unsigned_post_accepted_when_signature_optional() {
    let server = TestServer::start_with(FakeImageHost::new(&[]), false).await;
    let response = server
        .client
        .post(server.url("/webhook"))
        .body(text_message("u1", "hi"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(server.wait_for_replies(1).await.len(), 1);
}

#[tokio::test]
async fn test_unparsable_body_is_bad_request() {
    let server = TestServer::start().await;
    let response = server.post_signed("this is not json").await;
    assert_eq!(response.status(), 400);
    assert_eq!(response.text().await.unwrap(), "Unable to parse request body");
}

#[tokio::test]
async fn test_non_page_object_is_bad_request() {
    let server = TestServer::start().await;
    let response = server.post_signed(r#"{"object":"user","entry":[]}"#).await;

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "message": "Unexpected data object found",
            "expected": "page",
            "received": "user"
        })
    );
}

#[tokio::test]
async fn test_help_command_replies_with_instructions() {
    let server = TestServer::start().await;
    let response = server.post_signed(&text_message("u1", "help")).await;

    assert_eq!(response.status(), 200);
    let replies = server.wait_for_replies(1).await;
    assert_eq!(replies.len(), 1);
    match &replies[0] {
        Reply::Text { to, text } => {
            assert_eq!(to, "u1");
            assert!(text.starts_with("Send me an image to get started."));
        }
        other => panic!("unexpected reply {:?}", other),
    }
}

#[tokio::test]
async fn test_full_meme_flow() {
    let server = TestServer::start().await;

    // Upload an image
    server
        .post_signed(&image_message("u1", "https://cdn.example.com/cat.jpg"))
        .await;
    server.wait_for_replies(1).await;
    let session = server.sessions.load("u1").await.unwrap().unwrap();
    assert_eq!(session, Session::for_image("upload1"));

    // Caption it top and bottom
    server.post_signed(&text_message("u1", "top such wow")).await;
    server.wait_for_replies(2).await;
    server
        .post_signed(&text_message("u1", "bottom very meme"))
        .await;

    let replies = server.wait_for_replies(3).await;
    assert_eq!(replies.len(), 3);
    assert_eq!(
        replies[0],
        Reply::Text {
            to: "u1".to_string(),
            text: "Image received! Now use 'top <text>' or 'bottom <text>' to add text."
                .to_string()
        }
    );
    match &replies[2] {
        Reply::Image { url, .. } => {
            assert!(url.starts_with("https://res.cloudinary.com/demo/image/upload/w_500/"));
            assert!(url.contains("l_text:Impact_40_center_stroke:SUCH%20WOW"));
            assert!(url.contains("l_text:Impact_40_center_stroke:VERY%20MEME"));
            assert!(url.contains("g_south_east"));
            assert!(url.ends_with("/upload1"));
        }
        other => panic!("unexpected reply {:?}", other),
    }

    let session = server.sessions.load("u1").await.unwrap().unwrap();
    assert_eq!(session.caption(CaptionPosition::Top), Some("such wow"));
    assert_eq!(session.caption(CaptionPosition::Bottom), Some("very meme"));
}

#[tokio::test]
async fn test_caption_before_upload_asks_for_image() {
    let server = TestServer::start().await;
    server.post_signed(&text_message("u2", "top hello")).await;

    match &server.wait_for_replies(1).await[0] {
        Reply::Text { text, .. } => {
            assert!(text.starts_with("You need to upload an image first.\n\n"))
        }
        other => panic!("unexpected reply {:?}", other),
    }
    assert!(server.sessions.load("u2").await.unwrap().is_none());
}

#[tokio::test]
async fn test_stock_listing_and_selection() {
    let server = TestServer::start().await;
    server.post_signed(&text_message("u1", "stock")).await;
    server.wait_for_replies(1).await;
    server.post_signed(&text_message("u1", "stock doge")).await;

    let replies = server.wait_for_replies(2).await;
    assert_eq!(
        replies[0],
        Reply::Text {
            to: "u1".to_string(),
            text: "Choose from:\n\ndoge\ngrumpy-cat".to_string()
        }
    );
    assert_eq!(
        replies[1],
        Reply::Image {
            to: "u1".to_string(),
            url: "https://res.cloudinary.com/demo/image/upload/w_500/stock/doge".to_string()
        }
    );
}

#[tokio::test]
async fn test_failed_upload_reports_error() {
    let mut images = FakeImageHost::new(&[]);
    images.fail_uploads = true;
    let server = TestServer::start_with(images, true).await;

    let response = server
        .post_signed(&image_message("u1", "https://cdn.example.com/broken.jpg"))
        .await;
    assert_eq!(response.status(), 200);

    match &server.wait_for_replies(1).await[0] {
        Reply::Text { text, .. } => {
            assert!(text.starts_with("Error uploading image: "));
            assert!(text.contains("Invalid image file"));
        }
        other => panic!("unexpected reply {:?}", other),
    }
}

#[tokio::test]
async fn test_optin_postback_and_delivery() {
    let server = TestServer::start().await;
    let body = serde_json::json!({
        "object": "page",
        "entry": [{
            "id": "page-1",
            "time": 1,
            "messaging": [
                {"sender": {"id": "u1"}, "recipient": {"id": "page-1"}, "optin": {"ref": "PASS"}},
                {"sender": {"id": "u1"}, "recipient": {"id": "page-1"}, "delivery": {"mids": ["m1"], "watermark": 10}},
                {"sender": {"id": "u1"}, "recipient": {"id": "page-1"}, "postback": {"payload": "GO"}}
            ]
        }]
    })
    .to_string();

    let response = server.post_signed(&body).await;
    assert_eq!(response.status(), 200);

    let texts: Vec<String> = server
        .wait_for_replies(2)
        .await
        .into_iter()
        .filter_map(|r| match r {
            Reply::Text { text, .. } => Some(text),
            Reply::Image { .. } => None,
        })
        .collect();
    assert_eq!(texts, vec!["Authentication successful", "Postback called"]);
}

#[tokio::test]
async fn test_webhook_acknowledges_before_slow_upload_finishes() {
    let mut images = FakeImageHost::new(&[]);
    images.upload_delay = Duration::from_secs(2);
    let server = TestServer::start_with(images, true).await;

    let started = Instant::now();
    let response = server
        .post_signed(&image_message("u1", "https://cdn.example.com/slow.jpg"))
        .await;
    assert_eq!(response.status(), 200);
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(server.replies().is_empty());

    let replies = server.wait_for_replies(1).await;
    assert_eq!(
        replies,
        vec![Reply::Text {
            to: "u1".to_string(),
            text: "Image received! Now use 'top <text>' or 'bottom <text>' to add text."
                .to_string()
        }]
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = TestServer::start().await;
    let response = server.client.get(server.url("/nope")).send().await.unwrap();
    assert_eq!(response.status(), 404);
}
