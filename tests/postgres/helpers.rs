//! Shared helpers for `PostgreSQL` repository tests.

use chrono::{DateTime, TimeZone, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use pg_embedded_setup_unpriv::TestCluster;
use todo_lifecycle::todo::{
    adapters::postgres::PostgresTodoRepository,
    domain::{NewTodo, TodoCategory, TodoDescription, TodoTitle},
};
use tokio::runtime::Runtime;

/// Boxed error type for fallible helpers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// SQL creating the `todos` table.
const CREATE_TODOS_SQL: &str =
    include_str!("../../migrations/2026-10-19-000000_create_todos/up.sql");

/// Template database name for the pre-migrated schema.
const TEMPLATE_DB: &str = "todo_lifecycle_test_template";

/// Creates a runtime for driving the async repository from sync tests.
pub fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

/// Ensures the template database exists with the schema applied.
///
/// # Errors
///
/// Returns an error if template creation or migration fails.
pub fn ensure_template(cluster: &TestCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            execute_sql_statements(&mut conn, CREATE_TODOS_SQL)?;
            Ok(())
        })
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(())
}

/// Runs each `;`-separated statement, since `sql_query` takes one at a time.
fn execute_sql_statements(conn: &mut PgConnection, sql: &str) -> eyre::Result<()> {
    for statement in sql.split(';') {
        let trimmed = statement.trim();
        if trimmed.is_empty() || trimmed.lines().all(|line| line.trim().starts_with("--")) {
            continue;
        }
        diesel::sql_query(trimmed)
            .execute(conn)
            .map_err(|e| eyre::eyre!("SQL error: {e}\nStatement: {trimmed}"))?;
    }
    Ok(())
}

/// Creates a database from the template and a repository over it.
///
/// # Errors
///
/// Returns an error if database creation or pool construction fails.
pub fn setup_repository(
    cluster: &TestCluster,
    db_name: &str,
) -> Result<PostgresTodoRepository, BoxError> {
    cluster
        .create_database_from_template(db_name, TEMPLATE_DB)
        .map_err(|e| Box::new(e) as BoxError)?;
    let url = cluster.connection().database_url(db_name);
    let pool = Pool::builder()
        .max_size(1)
        .build(ConnectionManager::<PgConnection>::new(url))
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(PostgresTodoRepository::new(pool))
}

/// Drops the per-test database even when the test panics.
pub struct CleanupGuard<'a> {
    cluster: &'a TestCluster,
    db_name: String,
}

impl<'a> CleanupGuard<'a> {
    pub const fn new(cluster: &'a TestCluster, db_name: String) -> Self {
        Self { cluster, db_name }
    }
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.db_name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {e}", self.db_name);
        }
    }
}

/// Builds a validated draft.
pub fn new_todo(title: &str, category: Option<&str>) -> NewTodo {
    NewTodo::new(
        TodoTitle::new(title).expect("valid title"),
        TodoDescription::new("from the integration suite").expect("valid description"),
        TodoCategory::or_default(category).expect("valid category"),
    )
}

/// Timestamp with whole seconds so it survives `timestamptz` precision.
pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}
