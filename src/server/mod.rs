// Server module - webhook HTTP listener
//
// Routes:
//   GET  /webhook   subscription handshake
//   POST /webhook   signed event delivery
//   GET  /meme      caption preview, returns the rendered image URL
//   GET  /health    liveness with uptime and version
//   GET  /metrics   Prometheus text format

use bytes::Bytes;
use http::{HeaderMap, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::Instrument;

use crate::bot::MemeBot;
use crate::cloudinary::{CloudinaryClient, CloudinaryUrlBuilder};
use crate::config::{Config, MessengerConfig, SessionBackend};
use crate::error::BotError;
use crate::meme::{MemeGenerator, UrlBuilder};
use crate::messenger::{
    verify_signature, verify_subscription, GraphSendApi, WebhookPayload, SIGNATURE_HEADER,
};
use crate::metrics::{gather_text, BotMetrics};
use crate::session::{MemorySessionStore, RedisSessionStore, SessionStore};

/// Shared state for request handlers
pub struct AppState {
    pub bot: Arc<MemeBot>,
    app_secret: String,
    validation_token: String,
    require_signature: bool,
    max_body_size: usize,
    start_time: Instant,
}

impl AppState {
    pub fn new(bot: MemeBot, messenger: &MessengerConfig, max_body_size: usize) -> Self {
        Self {
            bot: Arc::new(bot),
            app_secret: messenger.app_secret.clone(),
            validation_token: messenger.validation_token.clone(),
            require_signature: messenger.require_signature,
            max_body_size,
            start_time: Instant::now(),
        }
    }
}

/// Wire the production collaborators described by `config`.
///
/// `force_memory_sessions` keeps sessions in process regardless of the
/// configured backend.
pub async fn build_state(config: &Config, force_memory_sessions: bool) -> Result<AppState, BotError> {
    let sessions: Arc<dyn SessionStore> =
        if force_memory_sessions || config.session.backend == SessionBackend::Memory {
            tracing::warn!("Using in-memory sessions, state is lost on restart");
            Arc::new(MemorySessionStore::new())
        } else {
            Arc::new(RedisSessionStore::connect(&config.session).await?)
        };

    let sender = Arc::new(GraphSendApi::new(&config.messenger)?);
    let images = Arc::new(CloudinaryClient::new(config.cloudinary.clone())?);
    let builder: Arc<dyn UrlBuilder> = Arc::new(CloudinaryUrlBuilder::from_config(&config.cloudinary));
    let generator = MemeGenerator::new(builder, config.meme.clone());

    let bot = MemeBot::new(
        sessions,
        sender,
        images,
        generator,
        config.cloudinary.stock_prefix.clone(),
    );
    Ok(AppState::new(
        bot,
        &config.messenger,
        config.server.max_body_size,
    ))
}

/// Response for an endpoint before it is turned into a hyper response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResponse {
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value
    pub content_type: &'static str,
    /// Response body
    pub body: String,
}

impl EndpointResponse {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.into(),
        }
    }

    /// Plain text in the Prometheus exposition format
    pub fn prometheus(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/plain; version=0.0.4",
            body,
        }
    }

    fn from_error(err: &BotError) -> Self {
        Self::text(err.to_http_status(), err.to_string())
    }

    fn into_response(self) -> Response<Full<Bytes>> {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = Response::new(Full::new(Bytes::from(self.body)));
        *response.status_mut() = status;
        if let Ok(value) = http::HeaderValue::from_str(self.content_type) {
            response
                .headers_mut()
                .insert(http::header::CONTENT_TYPE, value);
        }
        response
    }
}

/// Decode an `application/x-www-form-urlencoded` query string.
///
/// The first occurrence of a repeated key wins.
pub fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.unwrap_or("").split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key);
        let value = decode_component(value);
        params.entry(key).or_insert(value);
    }
    params
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

/// Generate response for /health endpoint.
pub fn handle_health(start_time: Instant) -> EndpointResponse {
    let body = serde_json::json!({
        "status": "healthy",
        "uptime_seconds": start_time.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION")
    });
    EndpointResponse::json(200, body)
}

fn handle_verify(state: &AppState, query: Option<&str>) -> EndpointResponse {
    let params = parse_query(query);
    match verify_subscription(
        params.get("hub.mode").map(String::as_str),
        params.get("hub.verify_token").map(String::as_str),
        params.get("hub.challenge").map(String::as_str),
        &state.validation_token,
    ) {
        Some(challenge) => {
            tracing::info!("Validating webhook");
            EndpointResponse::text(200, challenge)
        }
        None => {
            tracing::warn!("Failed validation. Make sure the validation tokens match.");
            EndpointResponse::text(403, "Forbidden")
        }
    }
}

/// String form of the `object` field for the rejection message
fn describe_object(value: Option<&serde_json::Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

async fn handle_webhook(state: &AppState, headers: &HeaderMap, body: &[u8]) -> EndpointResponse {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    if let Err(e) = verify_signature(
        signature,
        body,
        &state.app_secret,
        state.require_signature,
    ) {
        BotMetrics::global().signature_failures.inc();
        tracing::warn!(error = %e, "Rejected webhook request");
        return EndpointResponse::from_error(&BotError::from(e));
    }

    let data: serde_json::Value = match serde_json::from_slice(body) {
        Ok(serde_json::Value::Object(map)) => serde_json::Value::Object(map),
        _ => return EndpointResponse::text(400, "Unable to parse request body"),
    };

    if data.get("object").and_then(|o| o.as_str()) != Some("page") {
        return EndpointResponse::json(
            400,
            serde_json::json!({
                "message": "Unexpected data object found",
                "expected": "page",
                "received": describe_object(data.get("object")),
            }),
        );
    }

    let payload: WebhookPayload = match serde_json::from_value(data) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Webhook payload does not match the event model");
            return EndpointResponse::text(400, "Unable to parse request body");
        }
    };

    // Events are handled after the 200 is sent. Anything not acknowledged
    // within 20 seconds is redelivered.
    let bot = Arc::clone(&state.bot);
    tokio::spawn(
        async move { bot.handle_payload(&payload).await }.instrument(tracing::Span::current()),
    );
    EndpointResponse::text(200, "OK")
}

fn handle_preview(state: &AppState, query: Option<&str>) -> EndpointResponse {
    let params = parse_query(query);
    let image_id = match params.get("image_id").filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => {
            return EndpointResponse::json(
                400,
                serde_json::json!({"error": "Missing image-id parameter"}),
            )
        }
    };

    let image_url = state.bot.generator().meme_url(
        image_id,
        params.get("top-text").map(String::as_str),
        params.get("bottom-text").map(String::as_str),
    );
    BotMetrics::global().memes_generated.inc();
    EndpointResponse::json(200, serde_json::json!({ "image_url": image_url }))
}

/// Dispatch one request with an already-collected body
pub async fn route(
    state: &AppState,
    method: &Method,
    path: &str,
    query: Option<&str>,
    headers: &HeaderMap,
    body: &[u8],
) -> EndpointResponse {
    match (method, path) {
        (&Method::GET, "/webhook") => handle_verify(state, query),
        (&Method::POST, "/webhook") => handle_webhook(state, headers, body).await,
        (&Method::GET, "/meme") => handle_preview(state, query),
        (&Method::GET, "/health") => handle_health(state.start_time),
        (&Method::GET, "/metrics") => EndpointResponse::prometheus(gather_text()),
        _ => EndpointResponse::text(404, "Not Found"),
    }
}

async fn handle(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let request_id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path()
    );

    async move {
        let timer = BotMetrics::global().request_duration.start_timer();
        let (parts, body) = req.into_parts();

        let body = match Limited::new(body, state.max_body_size).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read request body");
                return Ok(EndpointResponse::text(413, "Payload Too Large").into_response());
            }
        };

        let response = route(
            &state,
            &parts.method,
            parts.uri.path(),
            parts.uri.query(),
            &parts.headers,
            &body,
        )
        .await;

        tracing::info!(status = response.status, "Request completed");
        timer.observe_duration();
        Ok(response.into_response())
    }
    .instrument(span)
    .await
}

/// Accept connections until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<(), BotError>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    if let Ok(addr) = listener.local_addr() {
        tracing::info!(address = %addr, "Webhook server listening");
    }

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept connection");
                        continue;
                    }
                };

                let state = state.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req| handle(req, state.clone()));
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        tracing::debug!(peer = %peer, error = %e, "Connection closed with error");
                    }
                });
            }
            _ = &mut shutdown => {
                tracing::info!("Shutting down webhook server");
                break;
            }
        }
    }

    Ok(())
}
