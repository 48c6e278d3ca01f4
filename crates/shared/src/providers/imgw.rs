use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tokio::time::sleep;

use super::ProviderConfigError;
use crate::intent::Intent;

pub const DEFAULT_IMGW_BASE_URL: &str = "https://danepubliczne.imgw.pl/api/data";
pub const DEFAULT_IMGW_TIMEOUT_MS: u64 = 20_000;
pub const DEFAULT_IMGW_MAX_RETRIES: u32 = 2;
pub const DEFAULT_IMGW_RETRY_BASE_BACKOFF_MS: u64 = 250;

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<ProviderPayload, FetchError>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub intent: Intent,
    pub location_id: String,
    /// Human readable name used in the summary header when the payload lacks one.
    pub location_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderPayload {
    pub summary: String,
    pub raw: Value,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no data for the requested location")]
    NotFound,
    #[error("data provider unavailable: {0}")]
    Unavailable(String),
    #[error("data provider failure: {0}")]
    Other(String),
}

impl FetchError {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Unavailable(_) => "unavailable",
            Self::Other(_) => "other",
        }
    }
}

pub trait DataFetcher: Send + Sync {
    fn fetch<'a>(&'a self, request: &'a FetchRequest) -> FetchFuture<'a>;
}

#[derive(Debug, Clone)]
pub struct ImgwConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_base_backoff_ms: u64,
}

impl Default for ImgwConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_IMGW_BASE_URL.to_string(),
            timeout_ms: DEFAULT_IMGW_TIMEOUT_MS,
            max_retries: DEFAULT_IMGW_MAX_RETRIES,
            retry_base_backoff_ms: DEFAULT_IMGW_RETRY_BASE_BACKOFF_MS,
        }
    }
}

/// Client for the IMGW public data API.
#[derive(Clone)]
pub struct ImgwClient {
    client: reqwest::Client,
    config: ImgwConfig,
}

impl ImgwClient {
    pub fn new(config: ImgwConfig) -> Result<Self, ProviderConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| ProviderConfigError::HttpClient(err.to_string()))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, request: &FetchRequest) -> String {
        let base_url = self.config.base_url.trim_end_matches('/');
        match request.intent {
            Intent::Weather => format!("{base_url}/synop/id/{}", request.location_id),
            Intent::Hydro => format!("{base_url}/hydro/id/{}", request.location_id),
            Intent::Warnings => format!("{base_url}/meteo/worn"),
        }
    }

    async fn fetch_payload(&self, request: &FetchRequest) -> Result<ProviderPayload, FetchError> {
        let url = self.endpoint(request);
        let raw = self.get_with_retries(&url).await?;
        let label = request
            .location_label
            .as_deref()
            .unwrap_or(request.location_id.as_str());

        let summary = match request.intent {
            Intent::Weather => summarize_synop(&raw)?,
            Intent::Hydro => summarize_hydro(&raw)?,
            Intent::Warnings => summarize_warnings(&raw, &request.location_id, label)?,
        };

        Ok(ProviderPayload { summary, raw })
    }

    async fn get_with_retries(&self, url: &str) -> Result<Value, FetchError> {
        let mut attempt = 0_u32;

        loop {
            match self.get_once(url).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if err.retryable && attempt < self.config.max_retries {
                        let backoff_multiplier = 2_u64.saturating_pow(attempt);
                        let backoff_ms = self
                            .config
                            .retry_base_backoff_ms
                            .saturating_mul(backoff_multiplier);
                        sleep(Duration::from_millis(backoff_ms)).await;
                        attempt = attempt.saturating_add(1);
                        continue;
                    }

                    return Err(err.error);
                }
            }
        }
    }

    async fn get_once(&self, url: &str) -> Result<Value, AttemptError> {
        let response = self.client.get(url).send().await.map_err(|err| {
            let reason = if err.is_timeout() {
                "timeout"
            } else {
                "request_unavailable"
            };
            AttemptError::retryable(FetchError::Unavailable(reason.to_string()))
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AttemptError::non_retryable(FetchError::NotFound));
        }
        if !status.is_success() {
            let error = FetchError::Unavailable(format!("status={}", status.as_u16()));
            return Err(if is_retryable_status(status) {
                AttemptError::retryable(error)
            } else {
                AttemptError::non_retryable(error)
            });
        }

        response.json::<Value>().await.map_err(|_| {
            AttemptError::non_retryable(FetchError::Other("response_json_parse_failed".to_string()))
        })
    }
}

impl DataFetcher for ImgwClient {
    fn fetch<'a>(&'a self, request: &'a FetchRequest) -> FetchFuture<'a> {
        Box::pin(self.fetch_payload(request))
    }
}

#[derive(Debug)]
struct AttemptError {
    error: FetchError,
    retryable: bool,
}

impl AttemptError {
    fn retryable(error: FetchError) -> Self {
        Self {
            error,
            retryable: true,
        }
    }

    fn non_retryable(error: FetchError) -> Self {
        Self {
            error,
            retryable: false,
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Single record out of a payload that may be an object or a list of them.
fn first_record(raw: &Value) -> Option<&Value> {
    match raw {
        Value::Array(items) => items.first(),
        Value::Object(_) => Some(raw),
        _ => None,
    }
}

/// Display text for a scalar field; absent and placeholder values yield `None`.
fn field_text(record: &Value, field: &str) -> Option<String> {
    let text = match record.get(field)? {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return None,
    };

    match text.as_str() {
        "" | "None" | "brak danych" => None,
        _ => Some(text),
    }
}

fn push_line(lines: &mut Vec<String>, label: &str, value: Option<String>, unit: &str) {
    if let Some(value) = value {
        lines.push(format!("- {label}: {value} {unit}").trim_end().to_string());
    }
}

fn summarize_synop(raw: &Value) -> Result<String, FetchError> {
    let record = first_record(raw).ok_or(FetchError::NotFound)?;
    let station = field_text(record, "stacja").unwrap_or_else(|| "?".to_string());

    let mut lines = vec![format!("Pogoda: {station}")];
    push_line(&mut lines, "Temperatura", field_text(record, "temperatura"), "°C");
    push_line(&mut lines, "Wiatr", field_text(record, "predkosc_wiatru"), "m/s");
    push_line(&mut lines, "Opad", field_text(record, "suma_opadu"), "mm");
    push_line(&mut lines, "Ciśnienie", field_text(record, "cisnienie"), "hPa");

    Ok(lines.join("\n"))
}

fn hydro_status(code: &str) -> Option<&'static str> {
    match code {
        "0" => Some("Stan w normie"),
        "1" => Some("Ostrzegawczy"),
        "2" => Some("ALARMOWY"),
        "3" => Some("Susza"),
        _ => None,
    }
}

fn summarize_hydro(raw: &Value) -> Result<String, FetchError> {
    let record = first_record(raw).ok_or(FetchError::NotFound)?;
    let river = field_text(record, "rzeka").unwrap_or_else(|| "?".to_string());
    let station = field_text(record, "stacja").unwrap_or_else(|| "?".to_string());

    let mut lines = vec![format!("{river} ({station})")];
    push_line(&mut lines, "Poziom", field_text(record, "stan_wody"), "cm");
    let status = field_text(record, "przekroczenia")
        .and_then(|code| hydro_status(&code))
        .map(ToString::to_string);
    push_line(&mut lines, "Status", status, "");
    push_line(&mut lines, "Trend", field_text(record, "tendencja"), "");

    Ok(lines.join("\n"))
}

fn summarize_warnings(raw: &Value, district_code: &str, label: &str) -> Result<String, FetchError> {
    let warnings = raw
        .as_array()
        .ok_or_else(|| FetchError::Other("warnings_payload_not_a_list".to_string()))?;

    let found = warnings
        .iter()
        .filter(|warning| covers_district(warning, district_code))
        .map(|warning| {
            let phenomenon = field_text(warning, "zjawisko")
                .or_else(|| field_text(warning, "nazwa_zdarzenia"))
                .unwrap_or_else(|| "?".to_string());
            let level = field_text(warning, "stopien").unwrap_or_else(|| "?".to_string());
            format!("- {phenomenon} (st. {level})")
        })
        .collect::<Vec<_>>();

    if found.is_empty() {
        return Ok(format!("Brak ostrzeżeń dla: {label}."));
    }

    Ok(format!("Ostrzeżenia: {label}\n{}", found.join("\n")))
}

fn covers_district(warning: &Value, district_code: &str) -> bool {
    ["powiaty_kod", "teryt"].iter().any(|field| {
        warning
            .get(field)
            .and_then(Value::as_array)
            .is_some_and(|codes| {
                codes
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|code| code == district_code)
            })
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{FetchError, summarize_hydro, summarize_synop, summarize_warnings};

    #[test]
    fn synop_summary_skips_missing_fields() {
        let raw = json!({
            "stacja": "Kraków",
            "temperatura": "12.4",
            "predkosc_wiatru": "3",
            "suma_opadu": null,
            "cisnienie": "brak danych"
        });

        let summary = summarize_synop(&raw).expect("summary");

        assert_eq!(
            summary,
            "Pogoda: Kraków\n- Temperatura: 12.4 °C\n- Wiatr: 3 m/s"
        );
    }

    #[test]
    fn hydro_summary_uses_first_station_and_status_names() {
        let raw = json!([
            { "rzeka": "Wisła", "stacja": "Kraków-Bielany", "stan_wody": "245", "przekroczenia": "1" },
            { "rzeka": "Wisła", "stacja": "Sandomierz", "stan_wody": "300" }
        ]);

        let summary = summarize_hydro(&raw).expect("summary");

        assert_eq!(
            summary,
            "Wisła (Kraków-Bielany)\n- Poziom: 245 cm\n- Status: Ostrzegawczy"
        );
    }

    #[test]
    fn empty_hydro_list_is_not_found() {
        assert!(matches!(summarize_hydro(&json!([])), Err(FetchError::NotFound)));
    }

    #[test]
    fn warnings_are_filtered_by_district_code() {
        let raw = json!([
            { "zjawisko": "Burze z gradem", "stopien": "2", "powiaty_kod": ["3021", "3064"] },
            { "zjawisko": "Upał", "stopien": "1", "powiaty_kod": ["1465"] }
        ]);

        let summary = summarize_warnings(&raw, "3021", "Poznanski").expect("summary");
        assert_eq!(summary, "Ostrzeżenia: Poznanski\n- Burze z gradem (st. 2)");

        let summary = summarize_warnings(&raw, "0201", "Boleslawiecki").expect("summary");
        assert_eq!(summary, "Brak ostrzeżeń dla: Boleslawiecki.");
    }
}
