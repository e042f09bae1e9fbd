// Outbound messages through the Graph Send API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::MessengerConfig;

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Send API request failed: {0}")]
    Request(String),

    #[error("Send API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to create Send API client: {0}")]
    Client(String),
}

/// Delivers replies to a user
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_text(&self, recipient_id: &str, text: &str) -> Result<(), SendError>;

    async fn send_image(&self, recipient_id: &str, image_url: &str) -> Result<(), SendError>;
}

/// Request body for `POST /me/messages`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMessage {
    pub recipient: Recipient,
    pub message: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text { text: String },
    Attachment { attachment: OutgoingAttachment },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingAttachment {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub payload: UrlPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlPayload {
    pub url: String,
}

impl OutgoingMessage {
    pub fn text(recipient_id: &str, text: &str) -> Self {
        Self {
            recipient: Recipient {
                id: recipient_id.to_string(),
            },
            message: MessageContent::Text {
                text: text.to_string(),
            },
        }
    }

    pub fn image(recipient_id: &str, image_url: &str) -> Self {
        Self {
            recipient: Recipient {
                id: recipient_id.to_string(),
            },
            message: MessageContent::Attachment {
                attachment: OutgoingAttachment {
                    kind: "image",
                    payload: UrlPayload {
                        url: image_url.to_string(),
                    },
                },
            },
        }
    }
}

/// Send API acknowledgement
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub recipient_id: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
}

/// `MessageSender` backed by the Graph API
pub struct GraphSendApi {
    http: reqwest::Client,
    endpoint: String,
    page_access_token: String,
}

impl GraphSendApi {
    pub fn new(config: &MessengerConfig) -> Result<Self, SendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.send_timeout_secs))
            .build()
            .map_err(|e| SendError::Client(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/me/messages", config.graph_api_url.trim_end_matches('/')),
            page_access_token: config.page_access_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call_send_api(&self, message: &OutgoingMessage) -> Result<(), SendError> {
        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("access_token", self.page_access_token.as_str())])
            .json(message)
            .send()
            .await
            .map_err(|e| SendError::Request(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let ack: SendResponse = response.json().await.unwrap_or_default();
        tracing::debug!(
            recipient_id = ack.recipient_id.as_deref().unwrap_or(""),
            message_id = ack.message_id.as_deref().unwrap_or(""),
            "Message sent"
        );
        Ok(())
    }
}

#[async_trait]
impl MessageSender for GraphSendApi {
    async fn send_text(&self, recipient_id: &str, text: &str) -> Result<(), SendError> {
        self.call_send_api(&OutgoingMessage::text(recipient_id, text))
            .await
    }

    async fn send_image(&self, recipient_id: &str, image_url: &str) -> Result<(), SendError> {
        self.call_send_api(&OutgoingMessage::image(recipient_id, image_url))
            .await
    }
}
