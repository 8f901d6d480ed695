//! Backend seam.
//!
//! A [`MergeBackend`] receives finished commit requests. The session calls
//! it once per commit and never retries on its own; callers can consult
//! [`BackendError::is_retryable`].

mod memory;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::commit::CommitRequest;

pub use memory::InMemoryBackend;

/// Errors reported by a backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Connection failed: {message}")]
    ConnectionFailed {
        message: String,
    },

    #[error("Commit rejected (code {code}): {message}")]
    Rejected {
        code: u32,
        message: String,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
    },
}

impl BackendError {
    /// Returns true if the same request may succeed when resent.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. } => true,
            Self::Rejected { code, .. } => *code >= 500,
            Self::Storage { .. } => false,
        }
    }
}

/// Acknowledgement of an applied commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    /// Request that was acknowledged.
    pub request_id: Uuid,
    /// Digest of the applied plan.
    pub digest: String,
    /// Number of operations applied.
    pub applied: usize,
    /// Set when this request id had already been applied.
    pub duplicate: bool,
}

/// Destination for commit requests.
pub trait MergeBackend: Send + Sync {
    /// Apply a commit request atomically.
    fn submit(&self, request: &CommitRequest) -> Result<CommitReceipt, BackendError>;
}
