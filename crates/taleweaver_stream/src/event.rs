//! Decoder output events.

use taleweaver_core::Action;

/// A partial result produced while decoding a model response stream.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeEvent {
    /// A newly-decoded piece of narrative, in arrival order.
    Story(String),
    /// The structured actions block, emitted once after the stream ends.
    Actions(Vec<Action>),
    /// The stream ended but the actions block could not be recovered.
    ///
    /// The narrative already streamed stays valid; the turn is marked as
    /// having lost its structured output.
    ActionParseError,
}

impl DecodeEvent {
    /// The narrative fragment carried by this event, if any.
    pub fn as_story(&self) -> Option<&str> {
        match self {
            DecodeEvent::Story(text) => Some(text),
            _ => None,
        }
    }
}
