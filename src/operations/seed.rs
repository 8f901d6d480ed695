//! Session (re)initialization.

use crate::error::MergeResult;
use crate::registry::Registry;
use crate::similarity::{find_clusters, SimilarityConfig};
use crate::tree::Workspace;
use crate::word::Word;

use super::finish;

/// Build a fresh registry and workspace from backend entries.
///
/// Entries are clustered with the caller's similarity config; each entry
/// becomes one target word seeded with one group per sense, and words are
/// laid out cluster by cluster. This is the only operation that replaces
/// the registry.
///
/// # Errors
/// - `Validation` if the config has a zero cost.
/// - `InvalidInput` if the entries repeat a word id or sense guid.
pub fn set_data(entries: Vec<Word>, config: &SimilarityConfig) -> MergeResult<(Registry, Workspace)> {
    config.validate()?;

    let clusters = find_clusters(&entries, config.costs, config.threshold);
    let registry = Registry::load(entries)?;
    let workspace = finish(&registry, Workspace::seed(&registry, clusters))?;

    tracing::info!(
        words = registry.len(),
        senses = registry.sense_count(),
        clusters = workspace.clusters().len(),
        "merge data loaded"
    );
    Ok((registry, workspace))
}

/// An empty workspace, used when a session is abandoned.
#[must_use]
pub fn clear_tree() -> Workspace {
    Workspace::default()
}
