//! Diesel row models for todo persistence.

use super::schema::todos;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for todo records.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = todos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TodoRow {
    /// Storage-assigned identifier.
    #[diesel(sql_type = diesel::sql_types::Int8)]
    pub id: i64,
    /// Todo title.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub title: String,
    /// Todo description.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub description: String,
    /// Todo category.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub category: String,
    /// Insert timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub updated_at: DateTime<Utc>,
    /// Completion timestamp.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Timestamptz>)]
    pub done_at: Option<DateTime<Utc>>,
}

/// Insert model for todo records.
///
/// Identifier and timestamps are assigned by column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = todos)]
pub struct NewTodoRow {
    /// Todo title.
    pub title: String,
    /// Todo description.
    pub description: String,
    /// Todo category.
    pub category: String,
}
