//! Request types for chat generation.

use crate::ChatMessage;
use serde::{Deserialize, Serialize};

/// Sampling options forwarded to the model provider.
///
/// All fields are optional; `None` means provider default. The settings
/// layer clamps these into valid ranges before they reach a request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SamplingOptions {
    /// Sampling temperature (0.0 to 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Nucleus sampling cutoff (0.0 to 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Frequency penalty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    /// Presence penalty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    /// Sampling seed; re-rolled on retry so a rerun can diverge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// How the model is asked to shape its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// Request schema-constrained JSON output (GM mode only)
    ResponseFormat,
    /// Free-form text output
    #[default]
    FreeForm,
}

/// A transport-agnostic chat completion request.
///
/// This is the bit-exact contract between the prompt builder and any
/// transport adapter implementation.
///
/// # Examples
///
/// ```
/// use taleweaver_core::{ChatMessage, ChatRequest, ResponseMode, Role, SamplingOptions};
///
/// let request = ChatRequest {
///     model: "mistral-small".to_string(),
///     messages: vec![ChatMessage::new(Role::User, "Hello!")],
///     stream: true,
///     max_tokens: Some(2048),
///     options: SamplingOptions::default(),
///     response_mode: ResponseMode::FreeForm,
/// };
///
/// assert_eq!(request.messages.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier to use
    pub model: String,
    /// The ordered conversation messages to send
    pub messages: Vec<ChatMessage>,
    /// Whether to request a streaming response
    pub stream: bool,
    /// Maximum number of completion tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling options
    #[serde(default)]
    pub options: SamplingOptions,
    /// Structured-schema versus free-form output
    #[serde(default)]
    pub response_mode: ResponseMode,
}
