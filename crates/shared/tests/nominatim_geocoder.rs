use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header::USER_AGENT};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use shared::providers::{Geocoder, GeocoderError, NominatimConfig, NominatimGeocoder};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};

#[derive(Debug, Clone)]
struct TestServerState {
    status: StatusCode,
    body: Value,
    seen_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    seen_user_agents: Arc<Mutex<Vec<String>>>,
}

impl TestServerState {
    fn replying(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            seen_queries: Arc::new(Mutex::new(Vec::new())),
            seen_user_agents: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[tokio::test]
async fn geocodes_first_result_with_feature_classification() {
    let state = TestServerState::replying(
        StatusCode::OK,
        json!([{
            "lat": "52.3990",
            "lon": "17.2256",
            "class": "place",
            "type": "town",
            "display_name": "Kostrzyn, powiat poznański"
        }]),
    );
    let (url, shutdown_tx, server_task) = spawn_test_server(state.clone()).await;

    let geocoder = NominatimGeocoder::new(config_for(url)).expect("geocoder should build");
    let place = geocoder
        .geocode("Kostrzyn", "pl")
        .await
        .expect("geocoding should succeed")
        .expect("a place should be found");

    shutdown_tx.send(()).expect("shutdown signal should send");
    server_task.await.expect("server task should join");

    assert!((place.latitude - 52.399).abs() < 1e-9);
    assert!((place.longitude - 17.2256).abs() < 1e-9);
    assert!(place.is_settlement_like());

    let seen_queries = state.seen_queries.lock().await.clone();
    assert_eq!(seen_queries.len(), 1);
    let query = &seen_queries[0];
    assert_eq!(query.get("q").map(String::as_str), Some("Kostrzyn"));
    assert_eq!(query.get("countrycodes").map(String::as_str), Some("pl"));
    assert_eq!(query.get("format").map(String::as_str), Some("json"));
    assert_eq!(query.get("limit").map(String::as_str), Some("1"));
    assert_eq!(query.get("accept-language").map(String::as_str), Some("pl"));

    assert_eq!(
        state.seen_user_agents.lock().await.clone(),
        vec!["stroz-tests/1.0".to_string()]
    );
}

#[tokio::test]
async fn empty_result_list_is_no_place() {
    let state = TestServerState::replying(StatusCode::OK, json!([]));
    let (url, shutdown_tx, server_task) = spawn_test_server(state).await;

    let geocoder = NominatimGeocoder::new(config_for(url)).expect("geocoder should build");
    let place = geocoder
        .geocode("Atlantyda", "pl")
        .await
        .expect("empty result is not an error");

    shutdown_tx.send(()).expect("shutdown signal should send");
    server_task.await.expect("server task should join");

    assert!(place.is_none());
}

#[tokio::test]
async fn error_status_is_unavailable() {
    let state = TestServerState::replying(StatusCode::TOO_MANY_REQUESTS, json!({}));
    let (url, shutdown_tx, server_task) = spawn_test_server(state).await;

    let geocoder = NominatimGeocoder::new(config_for(url)).expect("geocoder should build");
    let err = geocoder
        .geocode("Gniezno", "pl")
        .await
        .expect_err("rate limit should surface as an error");

    shutdown_tx.send(()).expect("shutdown signal should send");
    server_task.await.expect("server task should join");

    assert!(matches!(err, GeocoderError::Unavailable(ref reason) if reason == "status=429"));
}

#[tokio::test]
async fn malformed_coordinates_are_invalid_payload() {
    let state = TestServerState::replying(
        StatusCode::OK,
        json!([{ "lat": "north", "lon": "17.0", "class": "place", "type": "village" }]),
    );
    let (url, shutdown_tx, server_task) = spawn_test_server(state).await;

    let geocoder = NominatimGeocoder::new(config_for(url)).expect("geocoder should build");
    let err = geocoder
        .geocode("Pcim", "pl")
        .await
        .expect_err("bad latitude should be rejected");

    shutdown_tx.send(()).expect("shutdown signal should send");
    server_task.await.expect("server task should join");

    assert!(matches!(err, GeocoderError::InvalidPayload(_)));
}

fn config_for(search_url: String) -> NominatimConfig {
    NominatimConfig {
        search_url,
        user_agent: "stroz-tests/1.0".to_string(),
        timeout_ms: 2_000,
    }
}

async fn spawn_test_server(
    state: TestServerState,
) -> (String, oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route("/search", get(test_search_handler))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let local_addr = listener
        .local_addr()
        .expect("listener address should resolve");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server_task = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });

        server.await.expect("test server should run");
    });

    (format!("http://{local_addr}/search"), shutdown_tx, server_task)
}

async fn test_search_handler(
    State(state): State<TestServerState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    state.seen_queries.lock().await.push(query);
    if let Some(value) = headers.get(USER_AGENT).and_then(|value| value.to_str().ok()) {
        state.seen_user_agents.lock().await.push(value.to_string());
    }

    (state.status, Json(state.body.clone()))
}
