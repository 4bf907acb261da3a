//! Top-level error wrapper types.

use crate::{ConfigError, PromptError, TaleError, TransportError};

/// The foundation error enum for the Taleweaver workspace.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{TaleweaverError, TransportError, TransportErrorKind};
///
/// let transport_err = TransportError::new(TransportErrorKind::Http("404".into()));
/// let err: TaleweaverError = transport_err.into();
/// assert!(format!("{}", err).contains("Transport Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TaleweaverErrorKind {
    /// Prompt assembly error
    #[from(PromptError)]
    Prompt(PromptError),
    /// Model transport error
    #[from(TransportError)]
    Transport(TransportError),
    /// Tale aggregate or persistence error
    #[from(TaleError)]
    Tale(TaleError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Taleweaver error with kind discrimination.
///
/// # Examples
///
/// ```
/// use taleweaver_error::{TaleweaverResult, PromptError, PromptErrorKind};
///
/// fn might_fail() -> TaleweaverResult<()> {
///     Err(PromptError::new(PromptErrorKind::MissingModel))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Taleweaver Error: {}", _0)]
pub struct TaleweaverError(Box<TaleweaverErrorKind>);

impl TaleweaverError {
    /// Create a new error from a kind.
    pub fn new(kind: TaleweaverErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TaleweaverErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to TaleweaverErrorKind
impl<T> From<T> for TaleweaverError
where
    T: Into<TaleweaverErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Taleweaver operations.
pub type TaleweaverResult<T> = std::result::Result<T, TaleweaverError>;
