use std::sync::Arc;

use tracing::{debug, info, warn};

use super::machine::{self, DialogueState, Effect, MachineView, Trigger};
use super::responses;
use crate::candidates::{STOPWORDS, extract_candidates};
use crate::intent::{Intent, route_intent};
use crate::normalize::{normalize, sanitize};
use crate::providers::FetchRequest;
use crate::resolver::{ResolutionInput, ResolvedLocation};
use crate::service::AssistantService;

/// Conversation state for one session id.
pub struct DialogueSession {
    session_id: String,
    service: Arc<AssistantService>,
    state: DialogueState,
    intent: Option<Intent>,
    location_id: Option<String>,
    resolved_location: Option<ResolvedLocation>,
    city_context: Option<String>,
    retry_count: u32,
    pending_response: String,
    processing_result: Option<String>,
}

impl DialogueSession {
    pub fn new(session_id: impl Into<String>, service: Arc<AssistantService>) -> Self {
        Self {
            session_id: session_id.into(),
            service,
            state: DialogueState::Initial,
            intent: None,
            location_id: None,
            resolved_location: None,
            city_context: None,
            retry_count: 0,
            pending_response: String::new(),
            processing_result: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    pub fn intent(&self) -> Option<Intent> {
        self.intent
    }

    pub fn location_id(&self) -> Option<&str> {
        self.location_id.as_deref()
    }

    pub fn resolved_location(&self) -> Option<&ResolvedLocation> {
        self.resolved_location.as_ref()
    }

    pub fn city_context(&self) -> Option<&str> {
        self.city_context.as_deref()
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn pending_response(&self) -> &str {
        &self.pending_response
    }

    /// Runs one user turn and returns the reply text.
    pub async fn process_message(&mut self, message: &str) -> String {
        let service = Arc::clone(&self.service);
        let text = sanitize(message);
        let normalized = normalize(&text);

        let entities = service.analyzer().extract_entities(&text);
        let nlp_guess = service.analyzer().guess_intent(&normalized);
        let detected = route_intent(
            &normalized,
            nlp_guess,
            service.dictionaries().known_rivers(),
        );
        if detected.is_some() {
            self.intent = detected;
        }

        let Some(intent) = self.intent else {
            if self.state == DialogueState::Initial {
                debug!(session_id = %self.session_id, "no intent, sending help prompt");
                return responses::HELP_PROMPT.to_string();
            }
            return self.pending_response.clone();
        };

        let candidates = extract_candidates(&text, &entities, STOPWORDS);
        let input = ResolutionInput {
            text: &text,
            normalized_text: &normalized,
            entities: &entities,
            candidates: &candidates,
            city_context: self.city_context.as_deref(),
        };
        let resolution = service.resolver().resolve(intent, &input).await;
        self.intent = Some(resolution.intent);

        info!(
            session_id = %self.session_id,
            state = self.state.as_str(),
            intent = resolution.intent.as_str(),
            message_chars = message.chars().count(),
            candidates = candidates.len(),
            resolved = resolution.is_resolved(),
            "turn routed"
        );

        match resolution.matched {
            Some(found) => {
                self.retry_count = 0;
                self.location_id = Some(found.location_id);
                let keeps_context = matches!(resolution.intent, Intent::Weather | Intent::Warnings)
                    && !found.location.is_nearest_neighbor();
                if keeps_context {
                    self.city_context = Some(found.location.display_name().to_string());
                }
                self.resolved_location = Some(found.location);

                let trigger = if self.state == DialogueState::Initial {
                    Trigger::IntentDetected
                } else {
                    Trigger::LocationProvided
                };
                self.fire(trigger).await;
            }
            None => match self.state {
                DialogueState::Initial if detected.is_some() => {
                    self.fire(Trigger::IntentDetected).await;
                }
                DialogueState::AwaitingLocation => {
                    self.fire(Trigger::LocationProvided).await;
                }
                _ => {}
            },
        }

        self.pending_response.clone()
    }

    fn view(&self) -> MachineView {
        MachineView {
            state: self.state,
            location_resolved: self.location_id.is_some(),
        }
    }

    async fn fire(&mut self, trigger: Trigger) {
        let mut next = Some(trigger);

        while let Some(trigger) = next.take() {
            match machine::apply(self.view(), trigger) {
                Ok((state, effect)) => {
                    debug!(
                        session_id = %self.session_id,
                        from = self.state.as_str(),
                        to = state.as_str(),
                        ?trigger,
                        "dialogue transition"
                    );
                    self.state = state;
                    next = self.run_effect(effect).await;
                }
                Err(rejected) => {
                    warn!(session_id = %self.session_id, error = %rejected, "dialogue trigger rejected");
                }
            }
        }
    }

    async fn run_effect(&mut self, effect: Effect) -> Option<Trigger> {
        match effect {
            Effect::FetchData => {
                self.retry_count = 0;
                Some(self.fetch().await)
            }
            Effect::AskForLocation => {
                self.retry_count = 0;
                if let Some(intent) = self.intent {
                    self.pending_response = responses::ask_for_location(intent).to_string();
                }
                None
            }
            Effect::RegisterMiss => {
                self.retry_count += 1;
                if self.retry_count > self.service.max_retries() {
                    info!(session_id = %self.session_id, "retries exhausted, resetting dialogue");
                    self.pending_response = responses::RETRIES_EXHAUSTED.to_string();
                    self.state = DialogueState::Initial;
                    self.intent = None;
                    self.resolved_location = None;
                    self.retry_count = 0;
                } else {
                    self.pending_response = responses::LOCATION_NOT_FOUND.to_string();
                }
                None
            }
            Effect::DeliverResult => {
                let summary = self.processing_result.take().unwrap_or_default();
                self.pending_response =
                    responses::success(self.resolved_location.as_ref(), &summary);
                self.location_id = None;
                None
            }
            Effect::DeliverError => {
                self.pending_response = responses::SYSTEM_ERROR.to_string();
                self.location_id = None;
                None
            }
        }
    }

    async fn fetch(&mut self) -> Trigger {
        let (Some(intent), Some(location_id)) = (self.intent, self.location_id.clone()) else {
            return Trigger::ErrorOccurred;
        };

        let request = FetchRequest {
            intent,
            location_label: self.location_label(intent, &location_id),
            location_id,
        };

        match self.service.fetcher().fetch(&request).await {
            Ok(payload) => {
                self.processing_result = Some(payload.summary);
                Trigger::DataProcessed
            }
            Err(err) => {
                warn!(
                    session_id = %self.session_id,
                    intent = intent.as_str(),
                    location_id = %request.location_id,
                    kind = err.kind(),
                    error = %err,
                    "data fetch failed"
                );
                Trigger::ErrorOccurred
            }
        }
    }

    fn location_label(&self, intent: Intent, location_id: &str) -> Option<String> {
        if intent == Intent::Warnings
            && let Some(name) = self.service.dictionaries().district_display_name(location_id)
        {
            return Some(name.to_string());
        }

        self.resolved_location
            .as_ref()
            .map(|location| location.display_name().to_string())
    }
}
