//! Turn orchestration for the Taleweaver adventure client.
//!
//! This crate owns the moving parts around the pure prompt/stream layers:
//! the tale session (the only mutator of world state), the turn
//! orchestrator state machine, engine settings, and the traits hosts
//! implement to supply transport and persistence.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod orchestrator;
mod session;
mod settings;
mod traits;

pub use orchestrator::{
    CancelHandle, Orchestrator, SilentObserver, TurnObserver, TurnPhase, FALLBACK_NARRATIVE,
};
pub use session::{TaleSession, MAX_UNDO_DEPTH};
pub use settings::Settings;
pub use traits::{ChatBackend, ChatReply, TaleRepository};
