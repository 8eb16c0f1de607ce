//! `PostgreSQL` repository implementation for todo storage.

use super::{
    models::{NewTodoRow, TodoRow},
    schema::todos,
};
use crate::todo::{
    domain::{NewTodo, PersistedTodoData, Todo, TodoId},
    ports::{TodoRepository, TodoRepositoryError, TodoRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::{BigInt, Nullable, Text, Timestamptz};

/// `PostgreSQL` connection pool type used by todo adapters.
pub type TodoPgPool = Pool<ConnectionManager<PgConnection>>;

/// Saves every mutable column in one statement. `done_at` is only written
/// while still null so a completion can never be reset or moved.
const UPDATE_TODO_SQL: &str = concat!(
    "UPDATE todos SET title = $1, description = $2, category = $3, ",
    "done_at = COALESCE(done_at, $4), updated_at = now() ",
    "WHERE id = $5 ",
    "RETURNING id, title, description, category, created_at, updated_at, done_at",
);

/// `PostgreSQL`-backed todo repository.
#[derive(Debug, Clone)]
pub struct PostgresTodoRepository {
    pool: TodoPgPool,
}

impl PostgresTodoRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TodoPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TodoRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TodoRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TodoRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TodoRepositoryError::persistence)?
    }
}

#[async_trait]
impl TodoRepository for PostgresTodoRepository {
    async fn list_all(&self) -> TodoRepositoryResult<Vec<Todo>> {
        self.run_blocking(|connection| {
            let rows = todos::table
                .order(todos::id.asc())
                .select(TodoRow::as_select())
                .load::<TodoRow>(connection)
                .map_err(TodoRepositoryError::persistence)?;
            rows.into_iter().map(row_to_todo).collect()
        })
        .await
    }

    async fn create(&self, todo: &NewTodo) -> TodoRepositoryResult<Todo> {
        let new_row = NewTodoRow {
            title: todo.title().as_str().to_owned(),
            description: todo.description().as_str().to_owned(),
            category: todo.category().as_str().to_owned(),
        };

        self.run_blocking(move |connection| {
            let row = diesel::insert_into(todos::table)
                .values(&new_row)
                .returning(TodoRow::as_returning())
                .get_result::<TodoRow>(connection)
                .map_err(TodoRepositoryError::persistence)?;
            row_to_todo(row)
        })
        .await
    }

    async fn find_by_id(&self, id: TodoId) -> TodoRepositoryResult<Option<Todo>> {
        self.run_blocking(move |connection| {
            let row = todos::table
                .filter(todos::id.eq(id.value()))
                .select(TodoRow::as_select())
                .first::<TodoRow>(connection)
                .optional()
                .map_err(TodoRepositoryError::persistence)?;
            row.map(row_to_todo).transpose()
        })
        .await
    }

    async fn update(&self, todo: &Todo) -> TodoRepositoryResult<Todo> {
        let id = todo.id();
        let title = todo.title().to_owned();
        let description = todo.description().to_owned();
        let category = todo.category().to_owned();
        let done_at: Option<DateTime<Utc>> = todo.done_at();

        self.run_blocking(move |connection| {
            let row = diesel::sql_query(UPDATE_TODO_SQL)
                .bind::<Text, _>(title)
                .bind::<Text, _>(description)
                .bind::<Text, _>(category)
                .bind::<Nullable<Timestamptz>, _>(done_at)
                .bind::<BigInt, _>(id.value())
                .get_result::<TodoRow>(connection)
                .optional()
                .map_err(TodoRepositoryError::persistence)?
                .ok_or(TodoRepositoryError::NotFound(id))?;
            row_to_todo(row)
        })
        .await
    }
}

fn row_to_todo(row: TodoRow) -> TodoRepositoryResult<Todo> {
    let TodoRow {
        id,
        title,
        description,
        category,
        created_at,
        updated_at,
        done_at,
    } = row;

    let todo_id = TodoId::new(id).map_err(TodoRepositoryError::persistence)?;
    Ok(Todo::from_persisted(PersistedTodoData {
        id: todo_id,
        title,
        description,
        category,
        created_at,
        updated_at,
        done_at,
    }))
}
