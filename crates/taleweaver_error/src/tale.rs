//! Tale aggregate error types.

/// Specific error conditions for tale operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum TaleErrorKind {
    /// Log entry lookup by id failed
    #[display("Log entry '{}' not found", _0)]
    EntryNotFound(String),
    /// Persisting the tale aggregate failed
    #[display("Failed to save tale: {}", _0)]
    Save(String),
    /// Loading the tale aggregate failed
    #[display("Failed to load tale '{}': {}", id, message)]
    Load {
        /// Tale identifier
        id: String,
        /// Error message
        message: String,
    },
}

/// Error type for tale operations.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{TaleError, TaleErrorKind};
///
/// let err = TaleError::new(TaleErrorKind::EntryNotFound("e1".into()));
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Tale Error: {} at line {} in {}", kind, line, file)]
pub struct TaleError {
    /// The specific error condition
    pub kind: TaleErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl TaleError {
    /// Create a new TaleError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TaleErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
