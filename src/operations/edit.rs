//! Word-level edits and sense deletion.

use crate::error::{MergeResult, ValidationError};
use crate::registry::Registry;
use crate::tree::{MergeTreeReference, Workspace};
use crate::word::{Flag, WordId};

use super::finish;

/// Replace a target word's vernacular form.
///
/// The stored value is trimmed.
///
/// # Errors
/// - `Validation` if `vernacular` is empty after trimming.
/// - `ReferenceNotFound` if the word is unknown.
pub fn set_vernacular(
    registry: &Registry,
    workspace: &Workspace,
    word_id: &WordId,
    vernacular: &str,
) -> MergeResult<Workspace> {
    let vernacular = vernacular.trim();
    if vernacular.is_empty() {
        return Err(ValidationError::EmptyVernacular.into());
    }

    let mut next = workspace.clone();
    next.word_mut(word_id)?.vernacular = vernacular.to_string();
    finish(registry, next)
}

/// Replace a target word's flag.
///
/// # Errors
/// - `ReferenceNotFound` if the word is unknown.
pub fn flag_word(registry: &Registry, workspace: &Workspace, word_id: &WordId, flag: Flag) -> MergeResult<Workspace> {
    let mut next = workspace.clone();
    next.word_mut(word_id)?.flag = flag;
    finish(registry, next)
}

/// Move a group, or one duplicate, into the deleted set.
///
/// # Errors
/// - `ReferenceNotFound` if `src` does not resolve.
/// - `Validation` if any affected sense is protected.
pub fn delete_sense(registry: &Registry, workspace: &Workspace, src: &MergeTreeReference) -> MergeResult<Workspace> {
    let (_, index) = workspace.resolve(src)?;
    let affected: Vec<_> = match (workspace.group(src), index) {
        (Some(group), Some(i)) => vec![group.guids[i]],
        (Some(group), None) => group.guids.clone(),
        (None, _) => Vec::new(),
    };
    if let Some(&guid) = affected.iter().find(|g| registry.is_protected_sense(**g)) {
        return Err(ValidationError::ProtectedSense { guid }.into());
    }

    let mut next = workspace.clone();
    let detached = next.detach(registry, src)?;
    next.deleted.extend(detached.guids);
    finish(registry, next)
}
