//! Identifier type for todo records.

use super::TodoDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage-assigned identifier for a todo record.
///
/// Identifiers are allocated by the storage port on creation and never change
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct TodoId(i64);

impl TodoId {
    /// Creates a validated todo identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TodoDomainError::InvalidTodoId`] when the value is zero or
    /// negative.
    pub const fn new(value: i64) -> Result<Self, TodoDomainError> {
        if value <= 0 {
            return Err(TodoDomainError::InvalidTodoId(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for TodoId {
    type Error = TodoDomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TodoId> for i64 {
    fn from(id: TodoId) -> Self {
        id.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
