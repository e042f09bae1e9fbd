//! Chat handler
//!
//! [`MemeBot`] turns webhook events into replies. It owns no I/O of its own:
//! sessions, outbound messages and image storage all go through traits so the
//! handler can be driven by in-process fakes in tests.
//!
//! Failures of the collaborators never reach the webhook response. A failed
//! send or session write is logged and counted; the platform still gets its
//! 200 so it does not redeliver the event.

use std::sync::Arc;

use crate::cloudinary::{format_stock_choices, ImageHost};
use crate::meme::{CaptionPosition, MemeGenerator, UrlBuilder};
use crate::messenger::{
    help_text, parse_command, Command, EventKind, Message, MessageSender, MessagingEvent,
    WebhookPayload,
};
use crate::metrics::BotMetrics;
use crate::session::{Session, SessionStore};

pub const AUTHENTICATION_REPLY: &str = "Authentication successful";
pub const POSTBACK_REPLY: &str = "Postback called";
pub const HELLO_PREFIX: &str = "Hello yourself!";
pub const HI_PREFIX: &str = "Oh, hi!";
pub const UNKNOWN_COMMAND_PREFIX: &str = "Hmm, I don't know what that means.";
pub const NO_IMAGE_PREFIX: &str = "You need to upload an image first.";
pub const IMAGE_RECEIVED_REPLY: &str =
    "Image received! Now use 'top <text>' or 'bottom <text>' to add text.";

pub struct MemeBot {
    sessions: Arc<dyn SessionStore>,
    sender: Arc<dyn MessageSender>,
    images: Arc<dyn ImageHost>,
    generator: MemeGenerator<Arc<dyn UrlBuilder>>,
    stock_prefix: String,
}

impl MemeBot {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        sender: Arc<dyn MessageSender>,
        images: Arc<dyn ImageHost>,
        generator: MemeGenerator<Arc<dyn UrlBuilder>>,
        stock_prefix: impl Into<String>,
    ) -> Self {
        Self {
            sessions,
            sender,
            images,
            generator,
            stock_prefix: stock_prefix.into(),
        }
    }

    pub fn generator(&self) -> &MemeGenerator<Arc<dyn UrlBuilder>> {
        &self.generator
    }

    /// Handle every event of a page payload, in order
    pub async fn handle_payload(&self, payload: &WebhookPayload) {
        for event in payload.events() {
            self.handle_event(event).await;
        }
    }

    pub async fn handle_event(&self, event: &MessagingEvent) {
        let kind = event.kind();
        BotMetrics::global().record_event(kind);
        let sender_id = event.sender_id();

        match kind {
            EventKind::Optin => {
                tracing::info!(
                    sender_id = %sender_id,
                    recipient_id = %event.recipient.id,
                    pass_through = event.optin.as_ref().and_then(|o| o.reference.as_deref()).unwrap_or(""),
                    timestamp = event.timestamp.unwrap_or_default(),
                    "Received authentication"
                );
                self.send_text(sender_id, AUTHENTICATION_REPLY).await;
            }
            EventKind::Message => {
                if let Some(message) = &event.message {
                    self.handle_message(sender_id, message).await;
                }
            }
            EventKind::Delivery => {
                if let Some(delivery) = &event.delivery {
                    for mid in &delivery.mids {
                        tracing::debug!(message_id = %mid, "Received delivery confirmation");
                    }
                    tracing::info!(
                        watermark = delivery.watermark.unwrap_or_default(),
                        "All messages before watermark were delivered"
                    );
                }
            }
            EventKind::Postback => {
                tracing::info!(
                    sender_id = %sender_id,
                    payload = event.postback.as_ref().and_then(|p| p.payload.as_deref()).unwrap_or(""),
                    "Received postback"
                );
                self.send_text(sender_id, POSTBACK_REPLY).await;
            }
            EventKind::Unknown => {
                tracing::warn!(sender_id = %sender_id, "Webhook received unknown messaging event");
            }
        }
    }

    /// Text wins over attachments; only a leading image attachment is used
    async fn handle_message(&self, sender_id: &str, message: &Message) {
        tracing::debug!(
            sender_id = %sender_id,
            message_id = message.mid.as_deref().unwrap_or(""),
            "Received message"
        );

        if let Some(text) = message.text() {
            self.handle_command(sender_id, parse_command(text)).await;
        } else if let Some(url) = message.first_image_url() {
            self.receive_image(sender_id, url).await;
        }
    }

    pub async fn handle_command(&self, sender_id: &str, command: Command) {
        match command {
            Command::Caption { position, text } => {
                self.send_memed_image(sender_id, position, text.as_deref())
                    .await
            }
            Command::Stock(image_id) => self.set_stock_image(sender_id, image_id.as_deref()).await,
            Command::Help => self.send_help(sender_id, None).await,
            Command::Hello => self.send_help(sender_id, Some(HELLO_PREFIX)).await,
            Command::Hi => self.send_help(sender_id, Some(HI_PREFIX)).await,
            Command::Unknown(command) => {
                tracing::debug!(sender_id = %sender_id, command = %command, "Unknown command");
                self.send_help(sender_id, Some(UNKNOWN_COMMAND_PREFIX)).await
            }
        }
    }

    async fn send_memed_image(
        &self,
        sender_id: &str,
        position: CaptionPosition,
        text: Option<&str>,
    ) {
        let mut session = self.load_session(sender_id).await.unwrap_or_default();

        let Some(image_id) = session.image_id().map(str::to_string) else {
            tracing::debug!(sender_id = %sender_id, "Caption requested without an image");
            self.send_help(sender_id, Some(NO_IMAGE_PREFIX)).await;
            return;
        };

        match text {
            Some(text) => tracing::debug!(position = %position, text = %text, "Setting caption"),
            None => tracing::debug!(position = %position, "Clearing caption"),
        }
        session.set_caption(position, text);

        let url = self.generator.meme_url(
            &image_id,
            session.caption(CaptionPosition::Top),
            session.caption(CaptionPosition::Bottom),
        );
        BotMetrics::global().memes_generated.inc();

        self.save_session(sender_id, &session).await;
        self.send_image(sender_id, &url).await;
    }

    async fn set_stock_image(&self, sender_id: &str, image_id: Option<&str>) {
        match image_id.filter(|id| !id.is_empty()) {
            Some(image_id) => {
                let session = Session::for_image(format!("{}{}", self.stock_prefix, image_id));
                self.save_session(sender_id, &session).await;

                // Show the plain image they picked
                if let Some(public_id) = session.image_id() {
                    let url = self.generator.meme_url(public_id, None, None);
                    self.send_image(sender_id, &url).await;
                }
            }
            None => match self.images.stock_images().await {
                Ok(ids) => self.send_text(sender_id, &format_stock_choices(&ids)).await,
                Err(e) => tracing::error!(error = %e, "Failed to list stock images"),
            },
        }
    }

    async fn receive_image(&self, sender_id: &str, source_url: &str) {
        match self.images.upload_image(source_url).await {
            Ok(uploaded) => {
                BotMetrics::global().record_upload(true);
                tracing::info!(
                    sender_id = %sender_id,
                    public_id = %uploaded.public_id,
                    url = uploaded.url.as_deref().unwrap_or(""),
                    "Uploaded image"
                );
                // A new image starts over with no captions
                self.save_session(sender_id, &Session::for_image(uploaded.public_id))
                    .await;
                self.send_text(sender_id, IMAGE_RECEIVED_REPLY).await;
            }
            Err(e) => {
                BotMetrics::global().record_upload(false);
                tracing::warn!(sender_id = %sender_id, error = %e, "Image upload failed");
                self.send_text(sender_id, &format!("Error uploading image: {}", e))
                    .await;
            }
        }
    }

    async fn send_help(&self, sender_id: &str, prefix: Option<&str>) {
        self.send_text(sender_id, &help_text(prefix)).await;
    }

    async fn load_session(&self, sender_id: &str) -> Option<Session> {
        match self.sessions.load(sender_id).await {
            Ok(session) => session,
            Err(e) => {
                BotMetrics::global().session_errors.inc();
                tracing::error!(sender_id = %sender_id, error = %e, "Failed to load session");
                None
            }
        }
    }

    async fn save_session(&self, sender_id: &str, session: &Session) {
        if let Err(e) = self.sessions.save(sender_id, session).await {
            BotMetrics::global().session_errors.inc();
            tracing::error!(sender_id = %sender_id, error = %e, "Failed to save session");
        }
    }

    async fn send_text(&self, recipient_id: &str, text: &str) {
        let result = self.sender.send_text(recipient_id, text).await;
        self.record_send(recipient_id, result);
    }

    async fn send_image(&self, recipient_id: &str, image_url: &str) {
        let result = self.sender.send_image(recipient_id, image_url).await;
        self.record_send(recipient_id, result);
    }

    fn record_send(&self, recipient_id: &str, result: Result<(), crate::messenger::SendError>) {
        BotMetrics::global().record_send(result.is_ok());
        if let Err(e) = result {
            tracing::error!(recipient_id = %recipient_id, error = %e, "Unable to send message");
        }
    }
}
