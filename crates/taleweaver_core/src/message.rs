//! Message types for conversation history.

use crate::Role;
use serde::{Deserialize, Serialize};

/// A single message in a chat conversation.
///
/// Ordering within a request is significant: the prompt builder emits
/// system context first, then history, then the player's turn.
///
/// # Examples
///
/// ```
/// use taleweaver_core::{ChatMessage, Role};
///
/// let message = ChatMessage::new(Role::User, "Action: open the door");
/// assert_eq!(message.role, Role::User);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender
    pub role: Role,
    /// The text content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}
