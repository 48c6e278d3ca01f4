mod support;

use axum::http::Method;
use serde_json::Value;

use support::{
    build_test_app, build_test_app_without_dictionaries, error_code, request, send_json,
};

#[tokio::test]
async fn healthz_is_always_ok() {
    let app = build_test_app_without_dictionaries();

    let response = send_json(&app.router, request(Method::GET, "/healthz", None)).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body["ok"], true);
}

#[tokio::test]
async fn readyz_reports_loaded_dictionaries() {
    let app = build_test_app();

    let response = send_json(&app.router, request(Method::GET, "/readyz", None)).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body["ok"], true);
    assert_eq!(response.body["active_sessions"], 0);
    assert!(response.body["total_entries"].as_u64().is_some_and(|total| total > 0));

    let dictionaries = response.body["dictionaries"]
        .as_array()
        .expect("dictionaries should be listed");
    assert_eq!(dictionaries.len(), 5);
    assert!(
        dictionaries
            .iter()
            .all(|status| status["status"] == Value::from("loaded"))
    );
    assert!(
        dictionaries
            .iter()
            .any(|status| status["name"] == Value::from("station_coords.json"))
    );
}

#[tokio::test]
async fn readyz_fails_when_no_dictionary_is_loaded() {
    let app = build_test_app_without_dictionaries();

    let response = send_json(&app.router, request(Method::GET, "/readyz", None)).await;

    assert_eq!(response.status, 503);
    assert_eq!(error_code(&response.body), Some("dictionaries_unavailable"));
}

#[tokio::test]
async fn request_ids_are_echoed_or_generated() {
    let app = build_test_app();

    let mut tagged = request(Method::GET, "/healthz", None);
    tagged.headers_mut().insert(
        "x-request-id",
        "it-req-1".parse().expect("header value should parse"),
    );
    let response = send_json(&app.router, tagged).await;
    assert_eq!(
        response
            .headers
            .get("x-request-id")
            .and_then(|value| value.to_str().ok()),
        Some("it-req-1")
    );

    let response = send_json(&app.router, request(Method::GET, "/healthz", None)).await;
    assert!(
        response
            .headers
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| !value.is_empty())
    );
}
