// Preview endpoint tests

use super::test_harness::*;

#[tokio::test]
async fn test_preview_returns_image_url() {
    let server = TestServer::start().await;
    let response = server
        .client
        .get(server.url("/meme?image_id=abc123&top-text=hello&bottom-text="))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["image_url"],
        "https://res.cloudinary.com/demo/image/upload/w_500/\
         bo_5px_solid_black,c_fit,co_rgb:ffffff,g_north,l_text:Impact_40_center_stroke:HELLO,w_480,y_20/\
         bo_1px_solid_black,co_rgb:ffffff,g_south_east,l_text:Arial_20_bold:MEMEBOT,x_5,y_5/\
         abc123"
    );
}

#[tokio::test]
async fn test_preview_decodes_query_text() {
    let server = TestServer::start().await;
    let response = server
        .client
        .get(server.url("/meme?image_id=abc&bottom-text=one%20does%20not"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    let url = body["image_url"].as_str().unwrap();
    assert!(url.contains(":ONE%20DOES%20NOT,"));
    assert!(url.contains("g_south,"));
}

#[tokio::test]
async fn test_preview_without_captions_has_no_watermark() {
    let server = TestServer::start().await;
    let response = server
        .client
        .get(server.url("/meme?image_id=abc"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["image_url"],
        "https://res.cloudinary.com/demo/image/upload/w_500/abc"
    );
}

#[tokio::test]
async fn test_preview_requires_image_id() {
    let server = TestServer::start().await;
    let response = server
        .client
        .get(server.url("/meme?top-text=hello"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"error": "Missing image-id parameter"}));
}
