// Bot Prometheus metrics
//
// Counters live in the default registry so `/metrics` can render everything
// with a single gather.

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;

use crate::messenger::EventKind;

/// Global metrics registry for the bot
pub struct BotMetrics {
    /// Webhook events by kind (optin, message, delivery, postback, unknown)
    pub webhook_events: IntCounterVec,

    /// Meme URLs generated
    pub memes_generated: IntCounter,

    /// Outbound Send API calls by outcome (success, failure)
    pub messages_sent: IntCounterVec,

    /// Image uploads by outcome (success, failure)
    pub uploads: IntCounterVec,

    /// Webhook posts rejected for a bad or missing signature
    pub signature_failures: IntCounter,

    /// Session store operations that failed
    pub session_errors: IntCounter,

    /// Webhook request handling time in seconds
    pub request_duration: Histogram,
}

/// Global singleton instance of metrics
static METRICS: OnceLock<BotMetrics> = OnceLock::new();

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

impl BotMetrics {
    /// Initialize and return the global metrics instance
    pub fn global() -> &'static Self {
        METRICS.get_or_init(|| {
            let webhook_events = register_int_counter_vec!(
                "memebot_webhook_events_total",
                "Webhook messaging events received by kind",
                &["kind"]
            )
            .expect("Failed to register webhook_events_total metric");

            let memes_generated = register_int_counter!(
                "memebot_memes_generated_total",
                "Meme URLs generated"
            )
            .expect("Failed to register memes_generated_total metric");

            let messages_sent = register_int_counter_vec!(
                "memebot_messages_sent_total",
                "Send API calls by outcome",
                &["outcome"]
            )
            .expect("Failed to register messages_sent_total metric");

            let uploads = register_int_counter_vec!(
                "memebot_uploads_total",
                "Image uploads by outcome",
                &["outcome"]
            )
            .expect("Failed to register uploads_total metric");

            let signature_failures = register_int_counter!(
                "memebot_signature_failures_total",
                "Webhook posts rejected by signature verification"
            )
            .expect("Failed to register signature_failures_total metric");

            let session_errors = register_int_counter!(
                "memebot_session_errors_total",
                "Failed session store operations"
            )
            .expect("Failed to register session_errors_total metric");

            let request_duration = register_histogram!(
                "memebot_webhook_request_duration_seconds",
                "Webhook request handling time in seconds",
                vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
            )
            .expect("Failed to register webhook_request_duration_seconds metric");

            BotMetrics {
                webhook_events,
                memes_generated,
                messages_sent,
                uploads,
                signature_failures,
                session_errors,
                request_duration,
            }
        })
    }

    pub fn record_event(&self, kind: EventKind) {
        self.webhook_events
            .with_label_values(&[kind.as_str()])
            .inc();
    }

    pub fn record_send(&self, success: bool) {
        self.messages_sent.with_label_values(&[outcome(success)]).inc();
    }

    pub fn record_upload(&self, success: bool) {
        self.uploads.with_label_values(&[outcome(success)]).inc();
    }

    pub fn event_count(&self, kind: EventKind) -> u64 {
        self.webhook_events.with_label_values(&[kind.as_str()]).get()
    }
}

/// Render the default registry in the Prometheus text format
pub fn gather_text() -> String {
    // Make sure the bot metrics are registered even before the first event
    let _ = BotMetrics::global();

    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
