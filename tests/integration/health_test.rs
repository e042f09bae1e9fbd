// Health and metrics endpoint tests

use super::test_harness::*;

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::start().await;
    let response = server.client.get(server.url("/health")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].is_u64());
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_metrics_count_events() {
    let server = TestServer::start().await;
    server.post_signed(&text_message("u1", "hello")).await;
    server.wait_for_replies(1).await;

    let response = server.client.get(server.url("/metrics")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("memebot_webhook_events_total{kind=\"message\"}"));
    assert!(body.contains("memebot_messages_sent_total"));
}

#[tokio::test]
async fn test_signature_failures_are_counted() {
    let server = TestServer::start().await;
    server
        .client
        .post(server.url("/webhook"))
        .body(text_message("u1", "hello"))
        .send()
        .await
        .unwrap();

    let body = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("memebot_signature_failures_total"));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let server = TestServer::start().await;
    let response = server
        .client
        .post(server.url("/webhook"))
        .body(vec![b'x'; 80 * 1024])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 413);
}
