//! Completion event payload carried over the event channel.

use super::TodoId;
use serde::{Deserialize, Serialize};

/// Discriminator of the only event the completion worker handles.
pub const TODO_COMPLETED_EVENT: &str = "todo_completed";

/// Broker message body announcing a requested completion.
///
/// Serialises as `{"event": "todo_completed", "todo_id": 7}`. The identifier
/// is optional on the wire so that malformed producers can be detected and
/// rejected by the consumer rather than failing deserialisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    /// Event discriminator.
    pub event: String,
    /// Target todo, required for [`TODO_COMPLETED_EVENT`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todo_id: Option<TodoId>,
}

impl CompletionEvent {
    /// Builds a `todo_completed` event for the given todo.
    #[must_use]
    pub fn todo_completed(todo_id: TodoId) -> Self {
        Self {
            event: TODO_COMPLETED_EVENT.to_owned(),
            todo_id: Some(todo_id),
        }
    }

    /// Returns `true` when the discriminator is [`TODO_COMPLETED_EVENT`].
    #[must_use]
    pub fn is_todo_completed(&self) -> bool {
        self.event == TODO_COMPLETED_EVENT
    }

    /// Encodes the event as a JSON message body.
    ///
    /// # Errors
    ///
    /// Returns the serialiser error if encoding fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decodes an event from a JSON message body.
    ///
    /// # Errors
    ///
    /// Returns the deserialiser error when the body is not a JSON object with
    /// a string `event` field and an optional integer `todo_id`.
    pub fn from_json_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}
