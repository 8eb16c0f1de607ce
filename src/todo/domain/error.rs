//! Error types for todo domain validation.

use thiserror::Error;

/// Errors returned while constructing domain todo values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TodoDomainError {
    /// The todo title is empty after trimming.
    #[error("todo title must not be empty")]
    EmptyTitle,

    /// The todo description is empty after trimming.
    #[error("todo description must not be empty")]
    EmptyDescription,

    /// The title exceeds the persisted column width.
    #[error("todo title is {actual} characters long, maximum is {max}")]
    TitleTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Length of the rejected value.
        actual: usize,
    },

    /// The description exceeds the persisted column width.
    #[error("todo description is {actual} characters long, maximum is {max}")]
    DescriptionTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Length of the rejected value.
        actual: usize,
    },

    /// The category exceeds the persisted column width.
    #[error("todo category is {actual} characters long, maximum is {max}")]
    CategoryTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Length of the rejected value.
        actual: usize,
    },

    /// The identifier is not a positive integer.
    #[error("invalid todo identifier {0}, expected a positive integer")]
    InvalidTodoId(i64),
}
