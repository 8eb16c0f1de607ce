//! Storage port for durable todo records.

use crate::todo::domain::{NewTodo, Todo, TodoId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for todo repository operations.
pub type TodoRepositoryResult<T> = Result<T, TodoRepositoryError>;

/// Todo persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Returns every stored todo ordered by identifier.
    async fn list_all(&self) -> TodoRepositoryResult<Vec<Todo>>;

    /// Inserts a new todo, assigning its identifier and timestamps.
    async fn create(&self, todo: &NewTodo) -> TodoRepositoryResult<Todo>;

    /// Finds a todo by identifier.
    ///
    /// Returns `None` when no record matches; absence is not an error.
    async fn find_by_id(&self, id: TodoId) -> TodoRepositoryResult<Option<Todo>>;

    /// Saves all fields of an existing todo and refreshes `updated_at`.
    ///
    /// The write is all-or-nothing. An already stored `done_at` is never
    /// cleared or replaced.
    ///
    /// # Errors
    ///
    /// Returns [`TodoRepositoryError::NotFound`] when the todo does not
    /// exist.
    async fn update(&self, todo: &Todo) -> TodoRepositoryResult<Todo>;
}

/// Errors returned by todo repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TodoRepositoryError {
    /// The todo to update was not found.
    #[error("todo not found: {0}")]
    NotFound(TodoId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TodoRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
