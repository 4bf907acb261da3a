//! Transport error types.

/// Specific error conditions for model transport operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum TransportErrorKind {
    /// HTTP-level failure (connection, TLS, non-2xx status)
    #[display("HTTP failure: {}", _0)]
    Http(String),
    /// The in-flight request was aborted by the caller
    #[display("Request aborted")]
    Aborted,
    /// The streaming body ended unexpectedly
    #[display("Stream failure: {}", _0)]
    Stream(String),
    /// The provider returned a body the adapter could not understand
    #[display("Malformed provider response: {}", _0)]
    MalformedResponse(String),
}

/// Error type for model transport operations.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{TransportError, TransportErrorKind};
///
/// let err = TransportError::new(TransportErrorKind::Aborted);
/// assert!(format!("{}", err).contains("aborted"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Transport Error: {} at line {} in {}", kind, line, file)]
pub struct TransportError {
    /// The specific error condition
    pub kind: TransportErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl TransportError {
    /// Create a new TransportError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TransportErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether this error represents a caller-initiated abort.
    pub fn is_aborted(&self) -> bool {
        self.kind == TransportErrorKind::Aborted
    }
}
