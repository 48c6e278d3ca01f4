use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    #[default]
    Initial,
    AwaitingLocation,
    Processing,
}

impl DialogueState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::AwaitingLocation => "awaiting_location",
            Self::Processing => "processing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    IntentDetected,
    LocationProvided,
    DataProcessed,
    ErrorOccurred,
}

/// Side effect the session driver runs after entering the next state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    FetchData,
    AskForLocation,
    RegisterMiss,
    DeliverResult,
    DeliverError,
}

/// The part of a session the guards look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineView {
    pub state: DialogueState,
    pub location_resolved: bool,
}

type Guard = fn(&MachineView) -> bool;

#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub from: DialogueState,
    pub trigger: Trigger,
    pub guard: Option<Guard>,
    pub to: DialogueState,
    pub effect: Effect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("trigger {trigger:?} rejected in state {}", .state.as_str())]
pub struct TransitionRejected {
    pub state: DialogueState,
    pub trigger: Trigger,
}

fn location_resolved(view: &MachineView) -> bool {
    view.location_resolved
}

fn location_missing(view: &MachineView) -> bool {
    !view.location_resolved
}

pub const TRANSITIONS: &[Transition] = &[
    Transition {
        from: DialogueState::Initial,
        trigger: Trigger::IntentDetected,
        guard: Some(location_resolved),
        to: DialogueState::Processing,
        effect: Effect::FetchData,
    },
    Transition {
        from: DialogueState::Initial,
        trigger: Trigger::IntentDetected,
        guard: Some(location_missing),
        to: DialogueState::AwaitingLocation,
        effect: Effect::AskForLocation,
    },
    Transition {
        from: DialogueState::AwaitingLocation,
        trigger: Trigger::LocationProvided,
        guard: Some(location_resolved),
        to: DialogueState::Processing,
        effect: Effect::FetchData,
    },
    Transition {
        from: DialogueState::AwaitingLocation,
        trigger: Trigger::LocationProvided,
        guard: Some(location_missing),
        to: DialogueState::AwaitingLocation,
        effect: Effect::RegisterMiss,
    },
    Transition {
        from: DialogueState::Processing,
        trigger: Trigger::DataProcessed,
        guard: None,
        to: DialogueState::Initial,
        effect: Effect::DeliverResult,
    },
    Transition {
        from: DialogueState::Processing,
        trigger: Trigger::ErrorOccurred,
        guard: None,
        to: DialogueState::Initial,
        effect: Effect::DeliverError,
    },
];

/// First row whose source state, trigger and guard all match.
pub fn apply(view: MachineView, trigger: Trigger) -> Result<(DialogueState, Effect), TransitionRejected> {
    TRANSITIONS
        .iter()
        .find(|row| {
            row.from == view.state
                && row.trigger == trigger
                && row.guard.is_none_or(|guard| guard(&view))
        })
        .map(|row| (row.to, row.effect))
        .ok_or(TransitionRejected {
            state: view.state,
            trigger,
        })
}
