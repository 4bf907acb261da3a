//! Taleweaver - an LLM-driven text-adventure engine.
//!
//! Taleweaver turns a persisted playthrough (a *tale*) plus the player's
//! input into model requests, and streams the model's answer back as
//! narrative and structured world-state changes.
//!
//! # Architecture
//!
//! The workspace is organized as focused crates:
//!
//! - `taleweaver_core` - data types: chat shapes, log entries, world state
//! - `taleweaver_error` - error types with source-location tracking
//! - `taleweaver_prompt` - token-budgeted prompt assembly
//! - `taleweaver_stream` - incremental decoders for streamed output
//! - `taleweaver_engine` - turn orchestration, sessions, host traits
//!
//! This crate (`taleweaver`) re-exports everything for convenience.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use taleweaver::{
//!     LogEntryMode, Orchestrator, Settings, SilentObserver, Tale, TaleSession,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = MyBackend::new()?;       // implements ChatBackend
//!     let repository = MyRepository::new()?; // implements TaleRepository
//!     let session = TaleSession::new(Tale::new("The Sunken Keep"));
//!
//!     let model = backend.models().await?.remove(0);
//!     let mut orch = Orchestrator::new(backend, repository, Settings::load()?, session);
//!     orch.set_model(model);
//!     orch.submit("open the gate", LogEntryMode::Do, &mut SilentObserver).await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use taleweaver_core::*;
pub use taleweaver_engine::*;
pub use taleweaver_error::*;
pub use taleweaver_prompt::*;
pub use taleweaver_stream::*;
