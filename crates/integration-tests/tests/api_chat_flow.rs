mod support;

use axum::body::Body;
use axum::http::{Method, Request, header};
use serde_json::json;
use shared::intent::Intent;
use uuid::Uuid;

use support::{build_test_app, chat, error_code, request, send_json};

#[tokio::test]
async fn weather_clarification_continues_in_the_same_session() {
    let app = build_test_app();

    let first = chat(&app.router, "Jaka jest pogoda?", None).await;
    assert_eq!(first.status, 200);
    assert_eq!(first.body["response"], "Podaj miasto.");
    let session_id = first.body["session_id"]
        .as_str()
        .expect("session id should be returned")
        .to_string();
    assert!(Uuid::parse_str(&session_id).is_ok());

    let second = chat(&app.router, "Wrocław", Some(&session_id)).await;
    assert_eq!(second.status, 200);
    assert_eq!(second.body["response"], "weather:12424");
    assert_eq!(second.body["session_id"], session_id.as_str());

    assert_eq!(app.sessions.len(), 1);
    let requests = app.fetcher.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].intent, Intent::Weather);
}

#[tokio::test]
async fn warnings_resolve_district_in_one_turn() {
    let app = build_test_app();

    let response = chat(
        &app.router,
        "Ostrzeżenia dla powiatu poznańskiego",
        Some("warnings-1"),
    )
    .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body["response"], "warnings:3021");
    assert_eq!(response.body["session_id"], "warnings-1");
    assert_eq!(
        app.fetcher.requests()[0].location_label.as_deref(),
        Some("Powiat Poznanski")
    );
}

#[tokio::test]
async fn hydro_question_prefers_the_station_in_the_named_city() {
    let app = build_test_app();

    let response = chat(&app.router, "Stan wody w Krakowie nad Wisłą", Some("hydro-1")).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body["response"], "hydro:150190340");
}

#[tokio::test]
async fn weather_city_carries_over_to_hydro_follow_up() {
    let app = build_test_app();

    let weather = chat(&app.router, "Pogoda Warszawa", Some("context-1")).await;
    assert_eq!(weather.body["response"], "weather:12375");

    let hydro = chat(&app.router, "stan wody", Some("context-1")).await;
    assert_eq!(hydro.body["response"], "hydro:152210170");
}

#[tokio::test]
async fn village_without_station_is_answered_from_nearest_station() {
    let app = build_test_app();

    let response = chat(&app.router, "Pogoda Skrzynice", Some("nearest-1")).await;
    let text = response.body["response"]
        .as_str()
        .expect("response should be text");

    assert!(
        text.starts_with("Brak stacji w: Skrzynice. Najbliższa: WARSZAWA (15.3 km)."),
        "response was {text}"
    );
    assert!(text.ends_with("weather:12375"), "response was {text}");
}

#[tokio::test]
async fn sessions_do_not_share_dialogue_state() {
    let app = build_test_app();

    let asked = chat(&app.router, "pogoda", Some("session-a")).await;
    assert_eq!(asked.body["response"], "Podaj miasto.");

    let other = chat(&app.router, "Wrocław", Some("session-b")).await;
    assert_eq!(
        other.body["response"],
        "W czym pomóc? (Pogoda, Hydro, Ostrzeżenia)"
    );

    let answered = chat(&app.router, "Wrocław", Some("session-a")).await;
    assert_eq!(answered.body["response"], "weather:12424");
    assert_eq!(app.sessions.len(), 2);
}

#[tokio::test]
async fn rejects_blank_and_oversized_messages() {
    let app = build_test_app();

    let blank = chat(&app.router, "   ", None).await;
    assert_eq!(blank.status, 400);
    assert_eq!(error_code(&blank.body), Some("empty_message"));

    let oversized = chat(&app.router, &"a".repeat(501), None).await;
    assert_eq!(oversized.status, 400);
    assert_eq!(error_code(&oversized.body), Some("message_too_long"));

    let bad_session = chat(&app.router, "pogoda", Some("not a session id")).await;
    assert_eq!(bad_session.status, 400);
    assert_eq!(error_code(&bad_session.body), Some("invalid_session_id"));

    assert!(app.sessions.is_empty());
    assert!(app.fetcher.requests().is_empty());
}

#[tokio::test]
async fn message_at_the_length_limit_is_accepted() {
    let app = build_test_app();

    let response = chat(&app.router, &"ą".repeat(500), Some("limit-1")).await;

    assert_eq!(response.status, 200);
    assert_eq!(
        response.body["response"],
        "W czym pomóc? (Pogoda, Hydro, Ostrzeżenia)"
    );
}

#[tokio::test]
async fn malformed_bodies_get_the_error_envelope() {
    let app = build_test_app();

    let missing_message = send_json(
        &app.router,
        request(Method::POST, "/v1/chat", Some(json!({ "session_id": "s-1" }))),
    )
    .await;
    assert_eq!(missing_message.status, 400);
    assert_eq!(error_code(&missing_message.body), Some("invalid_json"));

    let not_json = Request::builder()
        .method(Method::POST)
        .uri("/v1/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request should build");
    let not_json = send_json(&app.router, not_json).await;
    assert_eq!(not_json.status, 400);
    assert_eq!(error_code(&not_json.body), Some("invalid_json"));

    assert!(app.sessions.is_empty());
}

#[tokio::test]
async fn chat_turns_carry_a_request_id() {
    let app = build_test_app();

    let response = chat(&app.router, "pogoda", Some("traced-1")).await;

    assert_eq!(response.status, 200);
    assert!(
        response
            .headers
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| !value.is_empty())
    );
}
