//! Similarity engine.
//!
//! Ranks entries by a weighted edit distance over their vernacular forms and
//! groups near-identical entries into duplicate clusters. The costs and the
//! cluster threshold always come from the caller; nothing here has a
//! built-in default.

mod clusters;
mod distance;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{InputError, MergeResult, ValidationError};

pub use clusters::{find_clusters, Cluster};
pub use distance::distance;

/// Per-operation weights for [`distance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditCosts {
    /// Cost of inserting one character.
    pub insert: u32,
    /// Cost of deleting one character.
    pub delete: u32,
    /// Cost of substituting one character for another.
    pub substitute: u32,
}

impl EditCosts {
    /// Creates a cost table.
    #[must_use]
    pub const fn new(insert: u32, delete: u32, substitute: u32) -> Self {
        Self {
            insert,
            delete,
            substitute,
        }
    }

    /// All three operations cost `cost`.
    #[must_use]
    pub const fn uniform(cost: u32) -> Self {
        Self::new(cost, cost, cost)
    }

    /// Returns true when the resulting distance is symmetric.
    #[must_use]
    pub const fn is_symmetric(&self) -> bool {
        self.insert == self.delete
    }

    /// Validate costs; every weight must be positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.insert == 0 {
            return Err(ValidationError::InvalidEditCost { name: "insert" });
        }
        if self.delete == 0 {
            return Err(ValidationError::InvalidEditCost { name: "delete" });
        }
        if self.substitute == 0 {
            return Err(ValidationError::InvalidEditCost { name: "substitute" });
        }
        Ok(())
    }
}

/// Caller-supplied tuning for duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// Edit costs.
    pub costs: EditCosts,
    /// Two entries link when their distance is at most this value.
    pub threshold: u32,
}

impl SimilarityConfig {
    /// Creates a config.
    #[must_use]
    pub const fn new(costs: EditCosts, threshold: u32) -> Self {
        Self { costs, threshold }
    }

    /// Validate the config.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.costs.validate()
    }

    /// Parse and validate a config from JSON text.
    pub fn from_json(s: &str) -> MergeResult<Self> {
        let config: Self = serde_json::from_str(s).map_err(|e| InputError::Malformed {
            reason: format!("similarity config: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> MergeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| InputError::Malformed {
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_json(&text)
    }
}
