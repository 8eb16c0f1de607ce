//! Validated text fields of a todo draft.

use super::TodoDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-empty todo title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoTitle(String);

impl TodoTitle {
    /// Largest title accepted by the `todos.title` column.
    pub const MAX_LEN: usize = 150;

    /// Creates a validated title, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TodoDomainError::EmptyTitle`] when the trimmed value is
    /// empty and [`TodoDomainError::TitleTooLong`] when it is longer than
    /// [`Self::MAX_LEN`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TodoDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TodoDomainError::EmptyTitle);
        }
        let actual = trimmed.chars().count();
        if actual > Self::MAX_LEN {
            return Err(TodoDomainError::TitleTooLong {
                max: Self::MAX_LEN,
                actual,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-empty todo description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoDescription(String);

impl TodoDescription {
    /// Largest description accepted by the `todos.description` column.
    pub const MAX_LEN: usize = 500;

    /// Creates a validated description, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TodoDomainError::EmptyDescription`] when the trimmed value
    /// is empty and [`TodoDomainError::DescriptionTooLong`] when it is longer
    /// than [`Self::MAX_LEN`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TodoDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TodoDomainError::EmptyDescription);
        }
        let actual = trimmed.chars().count();
        if actual > Self::MAX_LEN {
            return Err(TodoDomainError::DescriptionTooLong {
                max: Self::MAX_LEN,
                actual,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the description as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Todo category label.
///
/// A blank category normalises to [`TodoCategory::DEFAULT`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoCategory(String);

impl TodoCategory {
    /// Category assigned when the caller leaves it blank.
    pub const DEFAULT: &'static str = "default";

    /// Largest category accepted by the `todos.category` column.
    pub const MAX_LEN: usize = 50;

    /// Creates a category, substituting [`Self::DEFAULT`] for blank input.
    ///
    /// # Errors
    ///
    /// Returns [`TodoDomainError::CategoryTooLong`] when the trimmed value is
    /// longer than [`Self::MAX_LEN`] characters.
    pub fn or_default(value: Option<&str>) -> Result<Self, TodoDomainError> {
        let trimmed = value.map(str::trim).unwrap_or_default();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        let actual = trimmed.chars().count();
        if actual > Self::MAX_LEN {
            return Err(TodoDomainError::CategoryTooLong {
                max: Self::MAX_LEN,
                actual,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the category as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when this is the default category.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }
}

impl Default for TodoCategory {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for TodoCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
