use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::{ChatRequest, ChatResponse, MAX_MESSAGE_CHARS};
use uuid::Uuid;

use super::AppState;
use super::errors::bad_request_response;
use super::observability::ChatTurnTrace;

const MAX_SESSION_ID_LEN: usize = 128;

pub(super) async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(_) => {
            return bad_request_response(
                "invalid_json",
                "Body must be a JSON object with a string `message`",
            );
        }
    };

    if req.message.trim().is_empty() {
        return bad_request_response("empty_message", "Message must not be blank");
    }

    let message_chars = req.message.chars().count();
    if message_chars > MAX_MESSAGE_CHARS {
        return bad_request_response(
            "message_too_long",
            "Message exceeds 500 characters",
        );
    }

    let session_id = match req.session_id.as_deref() {
        Some(raw) => match normalize_session_id(raw) {
            Some(session_id) => session_id,
            None => {
                return bad_request_response(
                    "invalid_session_id",
                    "Session id must be 1-128 characters of [A-Za-z0-9._-]",
                );
            }
        },
        None => Uuid::new_v4().to_string(),
    };

    let response = state.sessions.handle_turn(&session_id, &req.message).await;
    let trace = ChatTurnTrace {
        session_id: session_id.clone(),
        message_chars,
        response_chars: response.chars().count(),
    };

    let mut http_response = (
        StatusCode::OK,
        Json(ChatResponse {
            response,
            session_id,
        }),
    )
        .into_response();
    http_response.extensions_mut().insert(trace);
    http_response
}

fn normalize_session_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_SESSION_ID_LEN {
        return None;
    }

    let valid = trimmed
        .bytes()
        .all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.'));
    valid.then(|| trimmed.to_string())
}
