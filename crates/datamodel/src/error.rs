//! Unified error types for the data model
//!
//! Every structural operation (registration, attach/detach, container
//! mutation, positional access) reports failure through [`DataModelError`].
//! All variants are recoverable: the operation that produced them left the
//! object graph exactly as it was.

use thiserror::Error;

use crate::ids::{ObjectKey, PublicId};

/// Unified error type for data model operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataModelError {
    /// Another live object is already registered under this identifier
    #[error("Duplicate public identifier: {id}")]
    DuplicateIdentifier { id: PublicId },

    /// The object already has a parent (possibly the would-be target)
    #[error("{class_name} {key} already has a parent")]
    AlreadyAttached {
        class_name: &'static str,
        key: ObjectKey,
    },

    /// A sibling with the same key already lives in the container
    #[error("{class_name} {key} already exists in this container")]
    DuplicateKey {
        class_name: &'static str,
        key: ObjectKey,
    },

    /// Detach requested on an object that is not attached to the given parent
    #[error("{class_name} {key} is not attached to the given parent")]
    NotAttached {
        class_name: &'static str,
        key: ObjectKey,
    },

    /// The object is not a child of the container holder
    #[error("{class_name} {key} is not a child of this object")]
    NotMember {
        class_name: &'static str,
        key: ObjectKey,
    },

    /// The child is bound to a different scope than its would-be parent
    #[error("{class_name} {key} belongs to another scope")]
    ForeignScope {
        class_name: &'static str,
        key: ObjectKey,
    },

    /// Runtime types are incompatible (assign, attach)
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Positional container access outside of `0..len`
    #[error("Index {index} out of range for {len} elements")]
    IndexOutOfRange { index: usize, len: usize },

    /// Validation failed (e.g., malformed identifiers or id patterns)
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl DataModelError {
    pub fn duplicate_identifier(id: PublicId) -> Self {
        Self::DuplicateIdentifier { id }
    }

    pub fn already_attached(class_name: &'static str, key: ObjectKey) -> Self {
        Self::AlreadyAttached { class_name, key }
    }

    pub fn duplicate_key(class_name: &'static str, key: ObjectKey) -> Self {
        Self::DuplicateKey { class_name, key }
    }

    pub fn not_attached(class_name: &'static str, key: ObjectKey) -> Self {
        Self::NotAttached { class_name, key }
    }

    pub fn not_member(class_name: &'static str, key: ObjectKey) -> Self {
        Self::NotMember { class_name, key }
    }

    pub fn foreign_scope(class_name: &'static str, key: ObjectKey) -> Self {
        Self::ForeignScope { class_name, key }
    }

    pub fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { expected, found }
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Creates a validation error for malformed input.
    ///
    /// # Example
    /// ```ignore
    /// if trimmed.is_empty() {
    ///     return Err(DataModelError::validation("Public identifier cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CommentIndex;

    #[test]
    fn test_duplicate_identifier_error() {
        let id = PublicId::new("ParameterSet/1").unwrap();
        let err = DataModelError::duplicate_identifier(id);
        assert_eq!(
            err.to_string(),
            "Duplicate public identifier: ParameterSet/1"
        );
    }

    #[test]
    fn test_already_attached_error_names_the_child() {
        let key = ObjectKey::Comment(CommentIndex::new("remark"));
        let err = DataModelError::already_attached("Comment", key);
        assert!(matches!(err, DataModelError::AlreadyAttached { .. }));
        assert_eq!(err.to_string(), "Comment remark already has a parent");
    }

    #[test]
    fn test_index_out_of_range_error() {
        let err = DataModelError::index_out_of_range(3, 2);
        assert_eq!(err.to_string(), "Index 3 out of range for 2 elements");
    }

    #[test]
    fn test_foreign_scope_error() {
        let key = ObjectKey::Public(PublicId::new("Par/1").unwrap());
        let err = DataModelError::foreign_scope("Parameter", key);
        assert_eq!(err.to_string(), "Parameter Par/1 belongs to another scope");
    }

    #[test]
    fn test_type_mismatch_error() {
        let err = DataModelError::type_mismatch("ParameterSet", "Comment");
        assert_eq!(
            err.to_string(),
            "Type mismatch: expected ParameterSet, found Comment"
        );
    }
}
