#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_server::http::{AppState, build_router};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::{Value, json};
use shared::dictionaries::{
    DISTRICTS_FILE, HYDRO_STATIONS_FILE, ReferenceDictionaries, SETTLEMENT_STATIONS_FILE,
    SETTLEMENTS_FILE, STATION_COORDS_FILE,
};
use shared::providers::{
    DataFetcher, FetchFuture, FetchRequest, GeocodedPlace, Geocoder, GeocoderFuture,
    KeywordAnalyzer, ProviderPayload,
};
use shared::service::{AssistantService, DialogueSettings};
use shared::session_store::SessionStore;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub sessions: SessionStore,
    pub fetcher: Arc<RecordingFetcher>,
    _data_dir: TempDir,
}

pub struct JsonResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Geocoder that knows a single village north of Warsaw.
pub struct VillageGeocoder;

impl Geocoder for VillageGeocoder {
    fn geocode<'a>(&'a self, query: &'a str, _country_code: &'a str) -> GeocoderFuture<'a> {
        Box::pin(async move {
            if query.eq_ignore_ascii_case("skrzynice") {
                return Ok(Some(GeocodedPlace {
                    latitude: 52.30,
                    longitude: 20.96,
                    feature_class: "place".to_string(),
                    feature_type: "village".to_string(),
                }));
            }
            Ok(None)
        })
    }
}

#[derive(Default)]
pub struct RecordingFetcher {
    requests: Mutex<Vec<FetchRequest>>,
}

impl RecordingFetcher {
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests
            .lock()
            .expect("fetcher mutex should not be poisoned")
            .clone()
    }
}

impl DataFetcher for RecordingFetcher {
    fn fetch<'a>(&'a self, request: &'a FetchRequest) -> FetchFuture<'a> {
        Box::pin(async move {
            self.requests
                .lock()
                .expect("fetcher mutex should not be poisoned")
                .push(request.clone());
            Ok(ProviderPayload {
                summary: format!("{}:{}", request.intent.as_str(), request.location_id),
                raw: Value::Null,
            })
        })
    }
}

pub fn build_test_app() -> TestApp {
    let data_dir = TempDir::new().expect("temp data dir should be created");
    write_reference_dictionaries(data_dir.path());
    build_test_app_from(data_dir)
}

pub fn build_test_app_without_dictionaries() -> TestApp {
    let data_dir = TempDir::new().expect("temp data dir should be created");
    build_test_app_from(data_dir)
}

fn build_test_app_from(data_dir: TempDir) -> TestApp {
    let (dictionaries, report) = ReferenceDictionaries::load_from_dir(data_dir.path());
    let fetcher = Arc::new(RecordingFetcher::default());
    let service = AssistantService::new(
        Arc::new(dictionaries),
        Arc::new(KeywordAnalyzer::new()),
        Arc::new(VillageGeocoder),
        fetcher.clone(),
        DialogueSettings::default(),
    );
    let sessions = SessionStore::new(Arc::new(service), Duration::from_secs(1_800));

    let router = build_router(AppState {
        sessions: sessions.clone(),
        dictionary_report: Arc::new(report),
    });

    TestApp {
        router,
        sessions,
        fetcher,
        _data_dir: data_dir,
    }
}

fn write_reference_dictionaries(dir: &Path) {
    write_json(
        &dir.join(DISTRICTS_FILE),
        json!({ "poznański": "3021", "powiat poznański": "3021", "warszawa": "1465" }),
    );
    write_json(
        &dir.join(SETTLEMENTS_FILE),
        json!({ "Wrocław": "0986283", "Gniezno": "0927060" }),
    );
    write_json(
        &dir.join(SETTLEMENT_STATIONS_FILE),
        json!({ "0986283": "12424" }),
    );
    write_json(
        &dir.join(HYDRO_STATIONS_FILE),
        json!({
            "wisła": "150210080",
            "wisła kraków": "150190340",
            "wisła warszawa-bulwary": "152210170"
        }),
    );
    write_json(
        &dir.join(STATION_COORDS_FILE),
        json!({
            "12375": { "name": "WARSZAWA", "lat": 52.1628, "lon": 20.9611 },
            "12424": { "name": "WROCŁAW", "lat": 51.1028, "lon": 16.8808 },
            "12566": { "name": "KRAKÓW", "lat": 50.0777, "lon": 19.7881 }
        }),
    );
}

fn write_json(path: &Path, value: Value) {
    let encoded = serde_json::to_vec_pretty(&value).expect("fixture json should encode");
    fs::write(path, encoded).expect("fixture file should be written");
}

pub async fn send_json(app: &Router, request: Request<Body>) -> JsonResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should succeed");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should read");
    let body = serde_json::from_slice::<Value>(&body).unwrap_or_else(|_| json!({}));

    JsonResponse {
        status,
        headers,
        body,
    }
}

pub fn request(method: Method, path: &str, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::ACCEPT, "application/json");

    let request_body = body
        .map(|value| {
            serde_json::to_vec(&value).expect("json body should serialize for integration request")
        })
        .unwrap_or_default();
    if !request_body.is_empty() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }

    builder
        .body(Body::from(request_body))
        .expect("integration request should build")
}

pub async fn chat(app: &Router, message: &str, session_id: Option<&str>) -> JsonResponse {
    let body = match session_id {
        Some(session_id) => json!({ "message": message, "session_id": session_id }),
        None => json!({ "message": message }),
    };
    send_json(app, request(Method::POST, "/v1/chat", Some(body))).await
}

pub fn error_code(body: &Value) -> Option<&str> {
    body.get("error")?.get("code")?.as_str()
}
