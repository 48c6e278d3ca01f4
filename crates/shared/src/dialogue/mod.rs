pub mod machine;
pub mod responses;
mod session;

pub use machine::{DialogueState, Effect, Trigger, TransitionRejected};
pub use session::DialogueSession;
