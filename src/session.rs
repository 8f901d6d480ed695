//! Curation session.
//!
//! A [`MergeSession`] owns one registry and the workspace built from it.
//! Actions replace the workspace only when they succeed. A successful
//! commit tears the session down; a failed one leaves it as it was.

use crate::backend::{CommitReceipt, MergeBackend};
use crate::commit::{compute_commit, CommitPlan, CommitRequest};
use crate::error::{MergeError, MergeResult};
use crate::operations::{self, MergeAction};
use crate::registry::Registry;
use crate::similarity::SimilarityConfig;
use crate::tree::Workspace;
use crate::word::Word;

/// One curator's merge session.
#[derive(Debug, Clone, Default)]
pub struct MergeSession {
    registry: Registry,
    workspace: Workspace,
}

impl MergeSession {
    /// Start a session over `entries`.
    ///
    /// # Errors
    /// See [`operations::set_data`].
    pub fn load(entries: Vec<Word>, config: &SimilarityConfig) -> MergeResult<Self> {
        let (registry, workspace) = operations::set_data(entries, config)?;
        Ok(Self { registry, workspace })
    }

    /// Replace the session's data, discarding the current workspace.
    ///
    /// # Errors
    /// See [`operations::set_data`]. On error the session is unchanged.
    pub fn set_data(&mut self, entries: Vec<Word>, config: &SimilarityConfig) -> MergeResult<()> {
        *self = Self::load(entries, config)?;
        Ok(())
    }

    /// The original entries.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The current workspace.
    #[must_use]
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Returns true once the session has been cleared or committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty() && self.workspace.is_empty()
    }

    /// Apply one action.
    ///
    /// # Errors
    /// Whatever the operation reports; the workspace is left unchanged.
    pub fn apply(&mut self, action: &MergeAction) -> MergeResult<()> {
        self.workspace = operations::apply(&self.registry, &self.workspace, action)?;
        Ok(())
    }

    /// Apply actions in order, stopping at the first failure.
    ///
    /// Actions before the failing one stay applied.
    ///
    /// # Errors
    /// The first failing action's error, with its index.
    pub fn apply_all<'a, I>(&mut self, actions: I) -> Result<usize, (usize, MergeError)>
    where
        I: IntoIterator<Item = &'a MergeAction>,
    {
        let mut applied = 0;
        for action in actions {
            self.apply(action).map_err(|e| (applied, e))?;
            applied += 1;
        }
        Ok(applied)
    }

    /// Abandon the session.
    pub fn clear_tree(&mut self) {
        self.registry = Registry::default();
        self.workspace = operations::clear_tree();
    }

    /// Compute the commit plan for the current workspace.
    ///
    /// # Errors
    /// See [`compute_commit`].
    pub fn plan(&self) -> MergeResult<CommitPlan> {
        compute_commit(&self.registry, &self.workspace)
    }

    /// Compute, wrap, and submit the commit plan.
    ///
    /// On success the session is torn down. On failure the error is returned
    /// unchanged and the workspace is kept for another attempt.
    ///
    /// # Errors
    /// - Anything [`compute_commit`] reports.
    /// - `Backend` if the backend refuses or cannot be reached.
    pub fn commit(&mut self, backend: &dyn MergeBackend) -> MergeResult<CommitReceipt> {
        let plan = self.plan()?;
        let request = CommitRequest::new(plan)?;

        match backend.submit(&request) {
            Ok(receipt) => {
                tracing::info!(
                    request_id = %receipt.request_id,
                    applied = receipt.applied,
                    duplicate = receipt.duplicate,
                    "merge committed"
                );
                self.clear_tree();
                Ok(receipt)
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %request.request_id,
                    retryable = e.is_retryable(),
                    error = %e,
                    "merge commit failed; workspace kept"
                );
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, InMemoryBackend};
    use crate::similarity::EditCosts;
    use crate::tree::{MergeSenseId, MergeTreeReference};
    use crate::word::{Sense, SenseGuid, WordId};

    struct Unreachable;

    impl MergeBackend for Unreachable {
        fn submit(&self, _request: &CommitRequest) -> Result<CommitReceipt, BackendError> {
            Err(BackendError::ConnectionFailed {
                message: "refused".to_string(),
            })
        }
    }

    fn guid(n: u128) -> SenseGuid {
        SenseGuid::from_u128(n)
    }

    fn entries() -> Vec<Word> {
        vec![
            Word::new("w1", "mti").with_sense(Sense::new(guid(1), "en", "tree")),
            Word::new("w2", "miti").with_sense(Sense::new(guid(2), "en", "trees")),
        ]
    }

    fn config() -> SimilarityConfig {
        SimilarityConfig::new(EditCosts::uniform(1), 1)
    }

    fn combine() -> MergeAction {
        MergeAction::CombineSense {
            src: MergeTreeReference::sense("w1", MergeSenseId::seeded(guid(1))),
            dest: MergeTreeReference::sense("w2", MergeSenseId::seeded(guid(2))),
        }
    }

    #[test]
    fn test_failed_action_keeps_workspace() {
        let mut session = MergeSession::load(entries(), &config()).unwrap();
        let before = session.workspace().clone();
        let bad = MergeAction::SetVernacular {
            word_id: WordId::new("w1"),
            vernacular: " ".to_string(),
        };
        assert!(session.apply(&bad).unwrap_err().is_validation());
        assert_eq!(session.workspace(), &before);
    }

    #[test]
    fn test_apply_all_reports_failing_index() {
        let mut session = MergeSession::load(entries(), &config()).unwrap();
        let actions = [combine(), combine()];
        let (index, err) = session.apply_all(&actions).unwrap_err();
        assert_eq!(index, 1);
        assert!(err.is_reference_not_found());
        assert_eq!(session.workspace().word(&WordId::new("w1")).unwrap().senses.len(), 0);
    }

    #[test]
    fn test_commit_tears_down_session() {
        let backend = InMemoryBackend::with_words(entries());
        let mut session = MergeSession::load(entries(), &config()).unwrap();
        session.apply(&combine()).unwrap();

        let receipt = session.commit(&backend).unwrap();
        assert_eq!(receipt.applied, 2);
        assert!(session.is_empty());
    }

    #[test]
    fn test_commit_failure_keeps_workspace() {
        let mut session = MergeSession::load(entries(), &config()).unwrap();
        session.apply(&combine()).unwrap();
        let before = session.workspace().clone();

        let err = session.commit(&Unreachable).unwrap_err();
        assert!(err.is_backend());
        assert!(err.is_retryable());
        assert_eq!(format!("{err}"), "Connection failed: refused");
        assert_eq!(session.workspace(), &before);
        assert!(!session.is_empty());
    }

    #[test]
    fn test_clear_tree() {
        let mut session = MergeSession::load(entries(), &config()).unwrap();
        session.clear_tree();
        assert!(session.is_empty());
        assert!(session.plan().unwrap().is_empty());
    }
}
