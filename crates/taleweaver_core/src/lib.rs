//! Core data types for the Taleweaver adventure client.
//!
//! This crate provides the foundation data types shared across the
//! Taleweaver workspace: chat wire shapes, the conversation log, and the
//! world-state records owned by a tale.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod action;
mod log;
mod message;
mod mode;
mod model;
mod request;
mod role;
mod stat;
mod story_card;
mod tale;
mod telemetry;

pub use action::Action;
pub use log::{LogEntry, LogEntryMode, LogEntryRole};
pub use message::ChatMessage;
pub use mode::GameMode;
pub use model::LlmModel;
pub use request::{ChatRequest, ResponseMode, SamplingOptions};
pub use role::Role;
pub use stat::Stat;
pub use story_card::{StoryCard, StorybookCategory};
pub use tale::{Item, Scenario, Tale};
pub use telemetry::init_logging;
