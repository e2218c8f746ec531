//! Identifiers: public ids, secondary keys, and id generation.

use std::borrow::Borrow;
use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DataModelError;

/// Maximum length for a public identifier
const MAX_PUBLIC_ID_LENGTH: usize = 255;

/// Maximum length for an id pattern (leaves room for the expanded placeholders)
const MAX_PATTERN_LENGTH: usize = 160;

// ============================================================================
// PublicId
// ============================================================================

/// A validated public identifier (non-empty, <=255 chars, trimmed).
///
/// Unique among the live registered objects of a [`Scope`](crate::Scope).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicId(String);

impl PublicId {
    /// Create a new validated public identifier.
    ///
    /// # Errors
    ///
    /// Returns `DataModelError::Validation` if:
    /// - The identifier is empty after trimming
    /// - The identifier exceeds 255 characters after trimming
    pub fn new(id: impl Into<String>) -> Result<Self, DataModelError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(DataModelError::validation(
                "Public identifier cannot be empty",
            ));
        }
        if trimmed.len() > MAX_PUBLIC_ID_LENGTH {
            return Err(DataModelError::validation(format!(
                "Public identifier cannot exceed {} characters",
                MAX_PUBLIC_ID_LENGTH
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for PublicId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PublicId {
    type Error = DataModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for PublicId {
    type Error = DataModelError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<PublicId> for String {
    fn from(id: PublicId) -> String {
        id.0
    }
}

// ============================================================================
// CommentIndex
// ============================================================================

/// Secondary key of a comment: unique among the comments of one parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CommentIndex {
    pub id: String,
}

impl CommentIndex {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl fmt::Display for CommentIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

// ============================================================================
// ObjectKey
// ============================================================================

/// How a child is addressed inside its parent's container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum ObjectKey {
    Public(PublicId),
    Comment(CommentIndex),
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public(id) => write!(f, "{}", id),
            Self::Comment(index) => write!(f, "{}", index),
        }
    }
}

impl From<PublicId> for ObjectKey {
    fn from(id: PublicId) -> Self {
        Self::Public(id)
    }
}

impl From<CommentIndex> for ObjectKey {
    fn from(index: CommentIndex) -> Self {
        Self::Comment(index)
    }
}

// ============================================================================
// IdGenerator
// ============================================================================

/// Expands an id pattern into fresh public identifiers.
///
/// Supported placeholders:
/// - `@classname@` - the class name of the created object
/// - `@time@` - current UTC time as `%Y%m%d%H%M%S%.6f`
/// - `@id@` - a random UUID v4 in simple (hyphen-less) form
///
/// The pattern must contain `@id@` so that generated identifiers are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    pattern: String,
}

impl IdGenerator {
    pub const DEFAULT_PATTERN: &'static str = "@classname@/@time@.@id@";

    /// Create a generator for the given pattern.
    ///
    /// # Errors
    ///
    /// Returns `DataModelError::Validation` if the pattern is blank, too long,
    /// or lacks the `@id@` placeholder.
    pub fn new(pattern: impl Into<String>) -> Result<Self, DataModelError> {
        let pattern = pattern.into();
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(DataModelError::validation("Id pattern cannot be empty"));
        }
        if trimmed.len() > MAX_PATTERN_LENGTH {
            return Err(DataModelError::validation(format!(
                "Id pattern cannot exceed {} characters",
                MAX_PATTERN_LENGTH
            )));
        }
        if !trimmed.contains("@id@") {
            return Err(DataModelError::validation(
                "Id pattern must contain the @id@ placeholder",
            ));
        }
        Ok(Self {
            pattern: trimmed.to_string(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Generate a fresh identifier for an object of `class_name`.
    pub fn generate(&self, class_name: &str) -> PublicId {
        let time = Utc::now().format("%Y%m%d%H%M%S%.6f").to_string();
        let id = Uuid::new_v4().simple().to_string();
        let expanded = self
            .pattern
            .replace("@classname@", class_name)
            .replace("@time@", &time)
            .replace("@id@", &id);
        // Non-empty: the pattern was validated on construction.
        PublicId(expanded)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self {
            pattern: Self::DEFAULT_PATTERN.to_string(),
        }
    }
}
