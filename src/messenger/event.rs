//! Webhook payload model
//!
//! Only the fields the bot reads are modelled; unknown fields are ignored so
//! new platform additions never break parsing.

use serde::{Deserialize, Serialize};

/// Top-level webhook body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Subscription kind; the bot only handles `"page"`
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub entry: Vec<PageEntry>,
}

impl WebhookPayload {
    pub fn is_page(&self) -> bool {
        self.object.as_deref() == Some("page")
    }

    /// All messaging events across entries, in delivery order
    pub fn events(&self) -> impl Iterator<Item = &MessagingEvent> {
        self.entry.iter().flat_map(|entry| entry.messaging.iter())
    }
}

/// One batch of events for a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagingEvent {
    pub sender: Participant,
    pub recipient: Participant,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optin: Option<Optin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery: Option<Delivery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postback: Option<Postback>,
}

/// Which handler an event goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Optin,
    Message,
    Delivery,
    Postback,
    Unknown,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Optin => "optin",
            EventKind::Message => "message",
            EventKind::Delivery => "delivery",
            EventKind::Postback => "postback",
            EventKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MessagingEvent {
    /// Classify the event. When several parts are present the first of
    /// optin, message, delivery, postback wins.
    pub fn kind(&self) -> EventKind {
        if self.optin.is_some() {
            EventKind::Optin
        } else if self.message.is_some() {
            EventKind::Message
        } else if self.delivery.is_some() {
            EventKind::Delivery
        } else if self.postback.is_some() {
            EventKind::Postback
        } else {
            EventKind::Unknown
        }
    }

    pub fn sender_id(&self) -> &str {
        &self.sender.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Optin {
    /// Pass-through value from the "Send to Messenger" plugin
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub mid: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Non-empty text, if any
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// URL of the first attachment when it is an image
    pub fn first_image_url(&self) -> Option<&str> {
        let first = self.attachments.first()?;
        if first.kind != "image" {
            return None;
        }
        first.payload.as_ref()?.url.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Option<AttachmentPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentPayload {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    #[serde(default)]
    pub mids: Vec<String>,
    #[serde(default)]
    pub watermark: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Postback {
    #[serde(default)]
    pub payload: Option<String>,
}
