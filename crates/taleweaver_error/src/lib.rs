//! Error types for the Taleweaver adventure client.
//!
//! This crate provides the foundation error types used throughout the
//! Taleweaver workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use taleweaver_error::{TaleweaverResult, TransportError, TransportErrorKind};
//!
//! fn fetch_reply() -> TaleweaverResult<String> {
//!     Err(TransportError::new(TransportErrorKind::Http("Connection refused".into())))?
//! }
//!
//! match fetch_reply() {
//!     Ok(reply) => println!("Got: {}", reply),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod prompt;
mod tale;
mod transport;

pub use config::ConfigError;
pub use error::{TaleweaverError, TaleweaverErrorKind, TaleweaverResult};
pub use prompt::{PromptError, PromptErrorKind};
pub use tale::{TaleError, TaleErrorKind};
pub use transport::{TransportError, TransportErrorKind};
