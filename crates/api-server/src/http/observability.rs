use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn};
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_LEN: usize = 128;

/// Attached to chat responses so the request line names the session and the
/// size of the turn without ever logging its text.
#[derive(Clone, Debug)]
pub(super) struct ChatTurnTrace {
    pub(super) session_id: String,
    pub(super) message_chars: usize,
    pub(super) response_chars: usize,
}

/// Tags every response with a request id and logs one line per request.
pub(super) async fn request_observability_middleware(req: Request, next: Next) -> Response {
    let request_id = resolve_request_id(&req);
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let started_at = Instant::now();

    let mut response = next.run(req).await;
    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(
            header::HeaderName::from_static(REQUEST_ID_HEADER),
            header_value,
        );
    }

    let status = response.status();
    let latency_ms = started_at.elapsed().as_millis() as u64;
    match response.extensions().get::<ChatTurnTrace>() {
        Some(turn) => info!(
            request_id = %request_id,
            session_id = %turn.session_id,
            message_chars = turn.message_chars,
            response_chars = turn.response_chars,
            latency_ms,
            "chat turn answered"
        ),
        None if status.is_server_error() => warn!(
            request_id = %request_id,
            route = %route,
            status = status.as_u16(),
            latency_ms,
            "request failed"
        ),
        None if status.is_client_error() => info!(
            request_id = %request_id,
            route = %route,
            status = status.as_u16(),
            "request rejected"
        ),
        None => info!(
            request_id = %request_id,
            route = %route,
            status = status.as_u16(),
            latency_ms,
            "request served"
        ),
    }

    response
}

fn resolve_request_id(req: &Request) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(normalize_request_id)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Caller ids follow the same charset as session ids.
fn normalize_request_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_REQUEST_ID_LEN {
        return None;
    }

    trimmed
        .bytes()
        .all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.'))
        .then(|| trimmed.to_string())
}
