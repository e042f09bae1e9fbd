//! Messaging platform plumbing
//!
//! Inbound: the subscription handshake, payload signatures, the event model
//! and text command parsing. Outbound: the Send API client.

pub mod command;
pub mod event;
pub mod send;
pub mod signature;

pub use command::{parse_command, split_command, Command};
pub use event::{EventKind, Message, MessagingEvent, WebhookPayload};
pub use send::{GraphSendApi, MessageSender, OutgoingMessage, SendError};
pub use signature::{sign, verify_signature, SignatureError, SIGNATURE_HEADER};

const HELP_TEXT: &str = "Send me an image to get started. Animated GIFs work too!\n\n\
                         Then send me 'top <text>' or 'bottom <text>' to add text.";

/// Help reply, optionally preceded by `prefix` and a blank line
pub fn help_text(prefix: Option<&str>) -> String {
    match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{}\n\n{}", prefix, HELP_TEXT),
        None => HELP_TEXT.to_string(),
    }
}

/// Answer the webhook subscription handshake.
///
/// Returns the challenge to echo back when `mode` is `subscribe` and the
/// token matches, `None` when the request must be refused.
pub fn verify_subscription<'a>(
    mode: Option<&str>,
    token: Option<&str>,
    challenge: Option<&'a str>,
    expected_token: &str,
) -> Option<&'a str> {
    if mode == Some("subscribe") && token == Some(expected_token) {
        Some(challenge.unwrap_or(""))
    } else {
        None
    }
}
