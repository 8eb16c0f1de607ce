//! In-memory repository for todo records.

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::todo::{
    domain::{NewTodo, PersistedTodoData, Todo, TodoId},
    ports::{TodoRepository, TodoRepositoryError, TodoRepositoryResult},
};

/// Thread-safe in-memory todo repository.
///
/// Identifiers are allocated sequentially from 1 and timestamps come from the
/// configured clock, mirroring what a database would assign.
#[derive(Clone)]
pub struct InMemoryTodoRepository {
    state: Arc<RwLock<InMemoryTodoState>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

#[derive(Debug, Default)]
struct InMemoryTodoState {
    todos: BTreeMap<TodoId, Todo>,
    last_id: i64,
}

impl InMemoryTodoRepository {
    /// Creates an empty repository stamping records with the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Creates an empty repository stamping records with `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryTodoState::default())),
            clock,
        }
    }
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error(err: impl std::fmt::Display) -> TodoRepositoryError {
    TodoRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn list_all(&self) -> TodoRepositoryResult<Vec<Todo>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.todos.values().cloned().collect())
    }

    async fn create(&self, todo: &NewTodo) -> TodoRepositoryResult<Todo> {
        let mut state = self.state.write().map_err(lock_error)?;
        let id = TodoId::new(state.last_id + 1).map_err(TodoRepositoryError::persistence)?;
        let timestamp = self.clock.utc();

        let created = Todo::from_persisted(PersistedTodoData {
            id,
            title: todo.title().as_str().to_owned(),
            description: todo.description().as_str().to_owned(),
            category: todo.category().as_str().to_owned(),
            created_at: timestamp,
            updated_at: timestamp,
            done_at: None,
        });
        state.last_id = id.value();
        state.todos.insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: TodoId) -> TodoRepositoryResult<Option<Todo>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.todos.get(&id).cloned())
    }

    async fn update(&self, todo: &Todo) -> TodoRepositoryResult<Todo> {
        let mut state = self.state.write().map_err(lock_error)?;
        let existing = state
            .todos
            .get(&todo.id())
            .ok_or(TodoRepositoryError::NotFound(todo.id()))?;

        let updated = Todo::from_persisted(PersistedTodoData {
            id: todo.id(),
            title: todo.title().to_owned(),
            description: todo.description().to_owned(),
            category: todo.category().to_owned(),
            created_at: existing.created_at(),
            updated_at: self.clock.utc(),
            done_at: existing.done_at().or(todo.done_at()),
        });
        state.todos.insert(todo.id(), updated.clone());
        Ok(updated)
    }
}
