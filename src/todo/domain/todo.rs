//! Todo record and its completion state machine.

use super::{TodoCategory, TodoDescription, TodoId, TodoTitle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Observable lifecycle state of a todo.
///
/// A requested-but-unapplied completion is not represented: until the
/// completion worker applies it, the todo stays [`TodoStatus::Pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    /// Work on the todo has not been completed.
    Pending,
    /// The todo has been completed. Terminal.
    Completed,
}

impl TodoStatus {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

/// Result of applying a completion to a todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The todo moved from pending to completed.
    Applied,
    /// The todo was already completed and was left untouched.
    AlreadyCompleted,
}

/// Validated draft for a todo that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    title: TodoTitle,
    description: TodoDescription,
    category: TodoCategory,
}

impl NewTodo {
    /// Creates a draft from validated fields.
    #[must_use]
    pub const fn new(
        title: TodoTitle,
        description: TodoDescription,
        category: TodoCategory,
    ) -> Self {
        Self {
            title,
            description,
            category,
        }
    }

    /// Returns the draft title.
    #[must_use]
    pub const fn title(&self) -> &TodoTitle {
        &self.title
    }

    /// Returns the draft description.
    #[must_use]
    pub const fn description(&self) -> &TodoDescription {
        &self.description
    }

    /// Returns the draft category.
    #[must_use]
    pub const fn category(&self) -> &TodoCategory {
        &self.category
    }
}

/// Stored todo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    id: TodoId,
    title: String,
    description: String,
    category: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    done_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTodoData {
    /// Persisted identifier.
    pub id: TodoId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: String,
    /// Persisted category.
    pub category: String,
    /// Insert timestamp set by storage.
    pub created_at: DateTime<Utc>,
    /// Latest update timestamp set by storage.
    pub updated_at: DateTime<Utc>,
    /// Completion timestamp, `None` while pending.
    pub done_at: Option<DateTime<Utc>>,
}

impl Todo {
    /// Reconstructs a todo from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTodoData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            category: data.category,
            created_at: data.created_at,
            updated_at: data.updated_at,
            done_at: data.done_at,
        }
    }

    /// Returns the todo identifier.
    #[must_use]
    pub const fn id(&self) -> TodoId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the completion timestamp, if completed.
    #[must_use]
    pub const fn done_at(&self) -> Option<DateTime<Utc>> {
        self.done_at
    }

    /// Returns the observable lifecycle state.
    #[must_use]
    pub const fn status(&self) -> TodoStatus {
        if self.done_at.is_some() {
            TodoStatus::Completed
        } else {
            TodoStatus::Pending
        }
    }

    /// Returns `true` once the todo has been completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.done_at.is_some()
    }

    /// Marks the todo completed at `at`.
    ///
    /// Completion is terminal: an already completed todo keeps its original
    /// `done_at` and [`CompletionOutcome::AlreadyCompleted`] is returned.
    pub fn complete(&mut self, at: DateTime<Utc>) -> CompletionOutcome {
        if self.done_at.is_some() {
            return CompletionOutcome::AlreadyCompleted;
        }
        self.done_at = Some(at);
        CompletionOutcome::Applied
    }
}

