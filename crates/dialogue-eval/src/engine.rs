use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use shared::config::{AssistantConfig, ConfigError, load_dotenv};
use shared::dialogue::DialogueSession;
use shared::dictionaries::ReferenceDictionaries;
use shared::providers::{
    DataFetcher, FetchError, FetchFuture, FetchRequest, GeocodedPlace, Geocoder, GeocoderFuture,
    ImgwClient, KeywordAnalyzer, NominatimGeocoder, ProviderConfigError, ProviderPayload,
};
use shared::service::{AssistantService, DialogueSettings};
use thiserror::Error;

use crate::case::{ConversationCaseFixture, GeocodedPlaceFixture, PayloadFixture, TurnFixture};
use crate::cli::{CliOptions, EvalMode};
use crate::fixture_io::{FixtureIoError, load_cases};

#[derive(Debug)]
pub struct EvalSummary {
    mode: EvalMode,
    results: Vec<CaseResult>,
}

impl EvalSummary {
    pub fn has_failures(&self) -> bool {
        self.results
            .iter()
            .any(|result| !result.failures.is_empty())
    }

    pub fn print(&self) {
        println!("Dialogue Eval Harness ({})", self.mode.as_str());

        let mut passed = 0usize;
        for result in &self.results {
            if result.failures.is_empty() {
                passed += 1;
                println!("[PASS] {}: {}", result.case_id, result.description);
            } else {
                println!("[FAIL] {}: {}", result.case_id, result.description);
                for failure in &result.failures {
                    println!("  - {failure}");
                }
            }
        }

        let total = self.results.len();
        let failed = total.saturating_sub(passed);
        println!(
            "Summary: {} total, {} passed, {} failed",
            total, passed, failed
        );
    }
}

#[derive(Debug)]
struct CaseResult {
    case_id: String,
    description: String,
    failures: Vec<String>,
}

#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Fixtures(#[from] FixtureIoError),
    #[error("failed to read live configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to initialize live providers: {0}")]
    Providers(#[from] ProviderConfigError),
    #[error("no fixture matches --case {0}")]
    UnknownCase(String),
    #[error("live mode requires at least one fixture with include_in_live_smoke=true")]
    NoLiveCases,
}

pub async fn run_eval(options: &CliOptions) -> Result<EvalSummary, EvalError> {
    let mut cases = load_cases()?;
    cases.sort_by(|left, right| left.case_id.cmp(&right.case_id));

    if let Some(case_id) = options.case_id.as_deref() {
        cases.retain(|case| case.case_id == case_id);
        if cases.is_empty() {
            return Err(EvalError::UnknownCase(case_id.to_string()));
        }
    }

    let results = match options.mode {
        EvalMode::Mocked => {
            let mut results = Vec::with_capacity(cases.len());
            for case in &cases {
                results.push(run_mocked_case(case).await);
            }
            results
        }
        EvalMode::Live => {
            cases.retain(|case| case.include_in_live_smoke);
            if cases.is_empty() {
                return Err(EvalError::NoLiveCases);
            }

            let service = live_service()?;
            let mut results = Vec::with_capacity(cases.len());
            for case in &cases {
                results.push(run_live_case(case, Arc::clone(&service)).await);
            }
            results
        }
    };

    Ok(EvalSummary {
        mode: options.mode,
        results,
    })
}

async fn run_mocked_case(case: &ConversationCaseFixture) -> CaseResult {
    let service = AssistantService::new(
        Arc::new(ReferenceDictionaries::from_sources(case.dictionaries.to_sources())),
        Arc::new(KeywordAnalyzer::new()),
        Arc::new(FixtureGeocoder::from_case(case)),
        Arc::new(FixtureFetcher::from_case(case)),
        DialogueSettings::default(),
    );
    let mut session = DialogueSession::new(case.case_id.clone(), Arc::new(service));

    let mut failures = Vec::new();
    for (index, turn) in case.turns.iter().enumerate() {
        let response = session.process_message(&turn.message).await;
        check_turn(index + 1, turn, &response, &session, &mut failures);
    }

    CaseResult {
        case_id: case.case_id.clone(),
        description: case.description.clone(),
        failures,
    }
}

async fn run_live_case(case: &ConversationCaseFixture, service: Arc<AssistantService>) -> CaseResult {
    let mut session = DialogueSession::new(case.case_id.clone(), service);

    let mut failures = Vec::new();
    for (index, turn) in case.turns.iter().enumerate() {
        let response = session.process_message(&turn.message).await;
        if response.trim().is_empty() {
            failures.push(format!("turn {}: empty response", index + 1));
        }
    }

    CaseResult {
        case_id: case.case_id.clone(),
        description: case.description.clone(),
        failures,
    }
}

fn live_service() -> Result<Arc<AssistantService>, EvalError> {
    load_dotenv()?;
    let config = AssistantConfig::from_env()?;
    let (dictionaries, _report) = ReferenceDictionaries::load_from_dir(&config.data_dir);

    Ok(Arc::new(AssistantService::new(
        Arc::new(dictionaries),
        Arc::new(KeywordAnalyzer::new()),
        Arc::new(NominatimGeocoder::new(config.geocoder.clone())?),
        Arc::new(ImgwClient::new(config.imgw.clone())?),
        config.dialogue_settings(),
    )))
}

fn check_turn(
    number: usize,
    turn: &TurnFixture,
    response: &str,
    session: &DialogueSession,
    failures: &mut Vec<String>,
) {
    let expect = &turn.expect;

    if let Some(expected) = expect.response.as_deref()
        && expected != response
    {
        failures.push(format!(
            "turn {number} response: expected={expected:?}, actual={response:?}"
        ));
    }

    for fragment in &expect.response_contains {
        if !response.contains(fragment.as_str()) {
            failures.push(format!(
                "turn {number} response_contains: missing {fragment:?} in {response:?}"
            ));
        }
    }

    if let Some(expected) = expect.state
        && expected != session.state()
    {
        failures.push(format!(
            "turn {number} state: expected={}, actual={}",
            expected.as_str(),
            session.state().as_str()
        ));
    }

    if let Some(expected) = expect.intent
        && expected != session.intent()
    {
        failures.push(format!(
            "turn {number} intent: expected={}, actual={}",
            intent_label(expected),
            intent_label(session.intent())
        ));
    }
}

fn intent_label(intent: Option<shared::intent::Intent>) -> &'static str {
    intent.map_or("none", |intent| intent.as_str())
}

struct FixtureGeocoder {
    places: HashMap<String, GeocodedPlace>,
}

impl FixtureGeocoder {
    fn from_case(case: &ConversationCaseFixture) -> Self {
        Self {
            places: case
                .geocoder
                .iter()
                .map(|(query, place)| (query.to_lowercase(), to_geocoded_place(place)))
                .collect(),
        }
    }
}

fn to_geocoded_place(place: &GeocodedPlaceFixture) -> GeocodedPlace {
    GeocodedPlace {
        latitude: place.lat,
        longitude: place.lon,
        feature_class: place.class.clone(),
        feature_type: place.kind.clone(),
    }
}

impl Geocoder for FixtureGeocoder {
    fn geocode<'a>(&'a self, query: &'a str, _country_code: &'a str) -> GeocoderFuture<'a> {
        Box::pin(async move { Ok(self.places.get(&query.to_lowercase()).cloned()) })
    }
}

struct FixtureFetcher {
    payloads: HashMap<String, PayloadFixture>,
}

impl FixtureFetcher {
    fn from_case(case: &ConversationCaseFixture) -> Self {
        Self {
            payloads: case.payloads.clone(),
        }
    }
}

impl DataFetcher for FixtureFetcher {
    fn fetch<'a>(&'a self, request: &'a FetchRequest) -> FetchFuture<'a> {
        Box::pin(async move {
            let key = format!("{}:{}", request.intent.as_str(), request.location_id);
            match self.payloads.get(&key) {
                Some(PayloadFixture::Ok { summary }) => Ok(ProviderPayload {
                    summary: summary.clone(),
                    raw: Value::Null,
                }),
                Some(PayloadFixture::Unavailable) => {
                    Err(FetchError::Unavailable("fixture_unavailable".to_string()))
                }
                Some(PayloadFixture::NotFound) | None => Err(FetchError::NotFound),
            }
        })
    }
}
