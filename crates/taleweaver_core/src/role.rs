//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// The sender of a chat message.
///
/// # Examples
///
/// ```
/// use taleweaver_core::Role;
///
/// let user_role = Role::User;
/// let assistant_role = Role::Assistant;
/// assert_ne!(user_role, assistant_role);
///
/// // Wire name, as serialized for transport adapters
/// assert_eq!(Role::System.wire_name(), "system");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System messages provide context and instructions
    System,
    /// User messages are from the player
    User,
    /// Assistant messages are from the model
    Assistant,
}

impl Role {
    /// The lowercase name this role serializes to on the wire.
    ///
    /// Token budgeting counts the role by this name, matching what the
    /// transport adapter actually sends.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}
