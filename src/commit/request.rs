//! Transport envelope for commit plans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{InputError, MergeError, MergeResult};

use super::CommitPlan;

/// A commit plan wrapped for submission.
///
/// `digest` is the BLAKE3 hash of the plan's JSON encoding and lets a backend
/// detect a damaged plan. Retries resend the same `request_id`, which is the
/// idempotency key; the same plan under a new id is a new commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRequest {
    /// Protocol version.
    pub version: String,

    /// Unique identifier for this submission.
    pub request_id: Uuid,

    /// When the request was built.
    pub timestamp: DateTime<Utc>,

    /// Hex BLAKE3 digest of `plan`.
    pub digest: String,

    /// The changes to apply.
    pub plan: CommitPlan,
}

impl CommitRequest {
    /// Current protocol version.
    pub const CURRENT_VERSION: &'static str = "1.0";

    /// Wrap a plan.
    ///
    /// # Errors
    /// - `Internal` if the plan cannot be encoded.
    pub fn new(plan: CommitPlan) -> MergeResult<Self> {
        let digest = digest(&plan)?;
        Ok(Self {
            version: Self::CURRENT_VERSION.to_string(),
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            digest,
            plan,
        })
    }

    /// Sets a custom request ID (useful for correlation).
    #[must_use]
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns true if `digest` matches the carried plan.
    #[must_use]
    pub fn verify_digest(&self) -> bool {
        digest(&self.plan).is_ok_and(|d| d == self.digest)
    }
}

fn digest(plan: &CommitPlan) -> MergeResult<String> {
    let bytes = serde_json::to_vec(plan).map_err(|e| MergeError::internal(format!("encode plan: {e}")))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

/// Serialize a request to pretty JSON.
pub fn to_json_pretty(request: &CommitRequest) -> MergeResult<String> {
    serde_json::to_string_pretty(request).map_err(|e| MergeError::internal(format!("serialize request: {e}")))
}

/// Deserialize a request from JSON.
///
/// Callers should check [`CommitRequest::verify_digest`] before applying it.
pub fn from_json(s: &str) -> MergeResult<CommitRequest> {
    serde_json::from_str::<CommitRequest>(s).map_err(|e| {
        InputError::Malformed {
            reason: format!("commit request: {e}"),
        }
        .into()
    })
}
