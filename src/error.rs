//! Error types for lexmerge.
//!
//! All errors in lexmerge are strongly typed using thiserror.
//! Every failure raised by the registry or the operation engine is local
//! and recoverable: the workspace that was passed in is left untouched.

use thiserror::Error;

use crate::backend::BackendError;
use crate::tree::MergeSenseId;
use crate::word::{SenseGuid, WordId};

/// Malformed or inconsistent input entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Sense guid {guid} appears more than once (in word '{word_id}')")]
    DuplicateSenseGuid {
        guid: SenseGuid,
        word_id: WordId,
    },

    #[error("Word id '{word_id}' appears more than once")]
    DuplicateWordId {
        word_id: WordId,
    },

    #[error("Word id cannot be empty")]
    EmptyWordId,

    #[error("Malformed input: {reason}")]
    Malformed {
        reason: String,
    },
}

/// An operation referenced something that is not in the current workspace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("Word not found: {word_id}")]
    Word {
        word_id: WordId,
    },

    #[error("Merge sense {merge_sense_id} not found in word {word_id}")]
    MergeSense {
        word_id: WordId,
        merge_sense_id: MergeSenseId,
    },

    #[error("Duplicate #{index} not found in merge sense {merge_sense_id}")]
    Duplicate {
        merge_sense_id: MergeSenseId,
        index: usize,
    },

    #[error("Sidebar entry #{index} not found")]
    SidebarSense {
        index: usize,
    },
}

/// Validation errors that occur during input validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Vernacular form cannot be empty")]
    EmptyVernacular,

    #[error("Edit cost '{name}' must be greater than zero")]
    InvalidEditCost {
        name: &'static str,
    },

    #[error("Sense {guid} is protected and cannot be deleted")]
    ProtectedSense {
        guid: SenseGuid,
    },

    #[error("Required field '{field}' is missing")]
    MissingField {
        field: String,
    },
}

/// A workspace state that breaks one of the accounting invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("Sense {guid} is not part of the session registry")]
    UnknownSense {
        guid: SenseGuid,
    },

    #[error("Sense {guid} is placed more than once")]
    DuplicatePlacement {
        guid: SenseGuid,
    },

    #[error("Sense {guid} is missing from the workspace")]
    MissingSense {
        guid: SenseGuid,
    },

    #[error("Merge sense {merge_sense_id} in word {word_id} holds no senses")]
    EmptyMergeSense {
        word_id: WordId,
        merge_sense_id: MergeSenseId,
    },

    #[error("Merge sense id {merge_sense_id} is used more than once")]
    DuplicateMergeSenseId {
        merge_sense_id: MergeSenseId,
    },

    #[error("Merge sense id {merge_sense_id} collides with a sense guid")]
    MergeSenseIdCollision {
        merge_sense_id: MergeSenseId,
    },

    #[error("Merge sense {merge_sense_id} holds a protected sense but is not marked protected")]
    ProtectionMismatch {
        merge_sense_id: MergeSenseId,
    },

    #[error("Protected sense {guid} is in the deleted set")]
    ProtectedSenseDeleted {
        guid: SenseGuid,
    },

    #[error("Sidebar origin word {word_id} is not in the workspace")]
    UnknownSidebarOrigin {
        word_id: WordId,
    },

    #[error("Sidebar still holds {count} sense(s) that were never re-homed")]
    OrphanedSidebarSenses {
        count: usize,
    },
}

/// Top-level error type for lexmerge.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("Reference not found: {0}")]
    ReferenceNotFound(#[from] ReferenceError),

    #[error("Order {value} for '{field}' is out of range (max {max})")]
    Range {
        field: &'static str,
        value: usize,
        max: usize,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl MergeError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates a range error.
    #[must_use]
    pub const fn range(field: &'static str, value: usize, max: usize) -> Self {
        Self::Range { field, value, max }
    }

    /// Returns true if this is an input error.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Returns true if this is a reference error.
    #[must_use]
    pub const fn is_reference_not_found(&self) -> bool {
        matches!(self, Self::ReferenceNotFound(_))
    }

    /// Returns true if this is a range error.
    #[must_use]
    pub const fn is_range(&self) -> bool {
        matches!(self, Self::Range { .. })
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an invariant violation.
    #[must_use]
    pub const fn is_invariant(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }

    /// Returns true if this error came from the backend client.
    #[must_use]
    pub const fn is_backend(&self) -> bool {
        matches!(self, Self::Backend(_))
    }

    /// Returns true if this error is retryable.
    ///
    /// Only backend failures can succeed on a second attempt; everything
    /// else is a caller error that needs a corrected call.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Backend(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Result type alias for lexmerge operations.
pub type MergeResult<T> = Result<T, MergeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_duplicate_guid() {
        let err = InputError::DuplicateSenseGuid {
            guid: SenseGuid::from_u128(7),
            word_id: WordId::new("w1"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("more than once"));
        assert!(msg.contains("w1"));
    }

    #[test]
    fn test_reference_error_word() {
        let err = ReferenceError::Word {
            word_id: WordId::new("missing"),
        };
        assert!(format!("{err}").contains("missing"));
    }

    #[test]
    fn test_range_error_message() {
        let err = MergeError::range("dest_order", 5, 2);
        let msg = format!("{err}");
        assert!(msg.contains("dest_order"));
        assert!(msg.contains('5'));
        assert!(err.is_range());
    }

    #[test]
    fn test_merge_error_from_validation() {
        let err: MergeError = ValidationError::EmptyVernacular.into();
        assert!(err.is_validation());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_merge_error_from_invariant() {
        let err: MergeError = InvariantViolation::OrphanedSidebarSenses { count: 2 }.into();
        assert!(err.is_invariant());
        assert!(format!("{err}").contains("2 sense(s)"));
    }

    #[test]
    fn test_backend_error_is_transparent_and_retryable() {
        let err: MergeError = BackendError::ConnectionFailed {
            message: "refused".to_string(),
        }
        .into();
        assert!(err.is_backend());
        assert!(err.is_retryable());
        assert_eq!(format!("{err}"), "Connection failed: refused");
    }

    #[test]
    fn test_internal_error() {
        let err = MergeError::internal("unexpected state");
        assert!(!err.is_retryable());
        assert!(format!("{err}").contains("unexpected state"));
    }
}
