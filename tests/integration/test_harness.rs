// Test harness for integration tests
// Starts the webhook server in process on an ephemeral port, wired to fake
// collaborators that record what the bot did.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use memebot::bot::MemeBot;
use memebot::cloudinary::{CloudinaryUrlBuilder, ImageHost, ImageHostError, UploadedImage};
use memebot::config::MessengerConfig;
use memebot::meme::{MemeGenerator, MemeStyle, UrlBuilder};
use memebot::messenger::{sign, MessageSender, SendError, SIGNATURE_HEADER};
use memebot::server::{serve, AppState};
use memebot::session::MemorySessionStore;

pub const APP_SECRET: &str = "integration-secret";
pub const VALIDATION_TOKEN: &str = "integration-token";

/// A reply the bot tried to deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text { to: String, text: String },
    Image { to: String, url: String },
}

#[derive(Default)]
pub struct RecordingSender {
    pub replies: Mutex<Vec<Reply>>,
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_text(&self, recipient_id: &str, text: &str) -> Result<(), SendError> {
        self.replies.lock().push(Reply::Text {
            to: recipient_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_image(&self, recipient_id: &str, image_url: &str) -> Result<(), SendError> {
        self.replies.lock().push(Reply::Image {
            to: recipient_id.to_string(),
            url: image_url.to_string(),
        });
        Ok(())
    }
}

/// Image host that "uploads" by deriving a public id from the source URL
pub struct FakeImageHost {
    pub uploads: Mutex<Vec<String>>,
    pub stock: Vec<String>,
    pub fail_uploads: bool,
    pub upload_delay: Duration,
}

impl FakeImageHost {
    pub fn new(stock: &[&str]) -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            stock: stock.iter().map(|s| s.to_string()).collect(),
            fail_uploads: false,
            upload_delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl ImageHost for FakeImageHost {
    async fn upload_image(&self, source_url: &str) -> Result<UploadedImage, ImageHostError> {
        tokio::time::sleep(self.upload_delay).await;
        if self.fail_uploads {
            return Err(ImageHostError::Status {
                status: 400,
                body: "Invalid image file".to_string(),
            });
        }
        let mut uploads = self.uploads.lock();
        uploads.push(source_url.to_string());
        Ok(UploadedImage {
            public_id: format!("upload{}", uploads.len()),
            url: None,
            secure_url: None,
        })
    }

    async fn stock_images(&self) -> Result<Vec<String>, ImageHostError> {
        let mut ids = self.stock.clone();
        ids.sort();
        Ok(ids)
    }
}

pub fn messenger_config(require_signature: bool) -> MessengerConfig {
    serde_yaml::from_str(&format!(
        "app_secret: {}\nvalidation_token: {}\npage_access_token: page\nrequire_signature: {}\n",
        APP_SECRET, VALIDATION_TOKEN, require_signature
    ))
    .expect("Failed to build messenger config")
}

/// Running server plus handles on its collaborators
pub struct TestServer {
    pub base_url: String,
    pub sender: Arc<RecordingSender>,
    pub sessions: Arc<MemorySessionStore>,
    pub images: Arc<FakeImageHost>,
    pub client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(FakeImageHost::new(&["doge", "grumpy-cat"]), true).await
    }

    pub async fn start_with(images: FakeImageHost, require_signature: bool) -> Self {
        let sender = Arc::new(RecordingSender::default());
        let sessions = Arc::new(MemorySessionStore::new());
        let images = Arc::new(images);
        let builder: Arc<dyn UrlBuilder> = Arc::new(CloudinaryUrlBuilder::new("demo"));

        let bot = MemeBot::new(
            sessions.clone(),
            sender.clone(),
            images.clone(),
            MemeGenerator::new(builder, MemeStyle::default()),
            "stock/",
        );
        let state = AppState::new(bot, &messenger_config(require_signature), 64 * 1024);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let shutdown = async {
                let _ = rx.await;
            };
            let _ = serve(listener, Arc::new(state), shutdown).await;
        });

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to create HTTP client");

        TestServer {
            base_url: format!("http://{}", addr),
            sender,
            sessions,
            images,
            client,
            shutdown: Some(tx),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a signed webhook body
    pub async fn post_signed(&self, body: &str) -> reqwest::Response {
        self.client
            .post(self.url("/webhook"))
            .header("content-type", "application/json")
            .header(SIGNATURE_HEADER, sign(APP_SECRET, body.as_bytes()))
            .body(body.to_string())
            .send()
            .await
            .expect("Webhook request failed")
    }

    pub fn replies(&self) -> Vec<Reply> {
        self.sender.replies.lock().clone()
    }

    /// Events are handled after the webhook responds, so poll for replies
    pub async fn wait_for_replies(&self, count: usize) -> Vec<Reply> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let replies = self.replies();
            if replies.len() >= count || tokio::time::Instant::now() >= deadline {
                return replies;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// A page payload carrying a single text message from `sender`
pub fn text_message(sender: &str, text: &str) -> String {
    serde_json::json!({
        "object": "page",
        "entry": [{
            "id": "page-1",
            "time": 1458692752478i64,
            "messaging": [{
                "sender": {"id": sender},
                "recipient": {"id": "page-1"},
                "timestamp": 1458692752478i64,
                "message": {"mid": "mid.1", "text": text}
            }]
        }]
    })
    .to_string()
}

/// A page payload carrying a single image attachment from `sender`
pub fn image_message(sender: &str, url: &str) -> String {
    serde_json::json!({
        "object": "page",
        "entry": [{
            "id": "page-1",
            "time": 1458692752478i64,
            "messaging": [{
                "sender": {"id": sender},
                "recipient": {"id": "page-1"},
                "message": {
                    "mid": "mid.2",
                    "attachments": [{"type": "image", "payload": {"url": url}}]
                }
            }]
        }]
    })
    .to_string()
}
