//! Messaging platform configuration.
//!
//! Holds the three secrets the webhook needs: the app secret used to check
//! payload signatures, the token used in the subscription handshake, and the
//! page access token used for the Send API.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GRAPH_API_URL, DEFAULT_SEND_TIMEOUT_SECS};

fn default_graph_api_url() -> String {
    DEFAULT_GRAPH_API_URL.to_string()
}

fn default_send_timeout_secs() -> u64 {
    DEFAULT_SEND_TIMEOUT_SECS
}

fn default_require_signature() -> bool {
    true
}

#[derive(Clone, Serialize, Deserialize)]
pub struct MessengerConfig {
    /// App secret for `X-Hub-Signature-256` verification
    pub app_secret: String,

    /// Token echoed back during webhook subscription
    pub validation_token: String,

    /// Page access token for the Send API
    pub page_access_token: String,

    /// Graph API base URL (default: https://graph.facebook.com/v2.6)
    #[serde(default = "default_graph_api_url")]
    pub graph_api_url: String,

    /// Reject webhook posts without a signature header (default: true)
    #[serde(default = "default_require_signature")]
    pub require_signature: bool,

    /// Send API request timeout in seconds (default: 10)
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

// Secrets stay out of logs
impl std::fmt::Debug for MessengerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessengerConfig")
            .field("app_secret", &"<redacted>")
            .field("validation_token", &"<redacted>")
            .field("page_access_token", &"<redacted>")
            .field("graph_api_url", &self.graph_api_url)
            .field("require_signature", &self.require_signature)
            .field("send_timeout_secs", &self.send_timeout_secs)
            .finish()
    }
}
