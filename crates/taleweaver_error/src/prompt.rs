//! Prompt assembly error types.

/// Specific error conditions for prompt assembly.
///
/// Budget overflow is deliberately absent: the builder resolves overflow by
/// progressive exclusion and reports it through a warning side-channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PromptErrorKind {
    /// No model selected; a turn cannot be started without one
    #[display("No model selected")]
    MissingModel,
    /// Paging older history out of the repository failed
    #[display("Failed to page in older history: {}", _0)]
    HistoryLoad(String),
}

/// Error type for prompt assembly.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{PromptError, PromptErrorKind};
///
/// let err = PromptError::new(PromptErrorKind::MissingModel);
/// assert!(format!("{}", err).contains("No model"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Prompt Error: {} at line {} in {}", kind, line, file)]
pub struct PromptError {
    /// The specific error condition
    pub kind: PromptErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PromptError {
    /// Create a new PromptError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PromptErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
