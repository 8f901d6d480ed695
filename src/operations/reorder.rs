//! MOVE / ORDER: relocate groups and duplicates.
//!
//! Groups are stored in order, so inserting or removing one shifts the
//! positions of everything after it and orders stay contiguous.

use crate::error::{MergeError, MergeResult, ReferenceError, ValidationError};
use crate::registry::Registry;
use crate::tree::{MergeSense, MergeTreeReference, Workspace};
use crate::word::WordId;

use super::finish;

/// Relocate a group to `dest_word` at position `dest_order`.
///
/// When `src.order` addresses a single duplicate, that guid is split out
/// into a new group with a fresh id instead. `dest_order` is checked
/// against the destination after the source has been detached, so moving
/// within one word accepts `0..len`.
///
/// # Errors
/// - `ReferenceNotFound` if `src` or `dest_word` does not resolve.
/// - `Range` if `dest_order` exceeds the destination's group count.
pub fn move_sense(
    registry: &Registry,
    workspace: &Workspace,
    src: &MergeTreeReference,
    dest_word: &WordId,
    dest_order: usize,
) -> MergeResult<Workspace> {
    workspace.resolve(src)?;
    if workspace.word(dest_word).is_none() {
        return Err(ReferenceError::Word {
            word_id: dest_word.clone(),
        }
        .into());
    }

    let mut next = workspace.clone();
    let detached = next.detach(registry, src)?;
    let id = match detached.id {
        Some(id) => id,
        None => next.fresh_merge_sense_id(detached.guids[0]),
    };
    next.insert_group(
        dest_word,
        dest_order,
        MergeSense {
            id,
            guids: detached.guids,
            protected: detached.protected,
        },
    )?;

    finish(registry, next)
}

/// Reposition a group inside its word.
///
/// # Errors
/// - `ReferenceNotFound` if `src` does not resolve.
/// - `Range` if `order` is not a valid position in the word.
pub fn order_sense(
    registry: &Registry,
    workspace: &Workspace,
    src: &MergeTreeReference,
    order: usize,
) -> MergeResult<Workspace> {
    let (position, _) = workspace.resolve(&src.as_group())?;
    let len = workspace.word(&src.word_id).map_or(0, |w| w.senses.len());
    if order >= len {
        return Err(MergeError::range("order", order, len.saturating_sub(1)));
    }
    if order == position {
        return Ok(workspace.clone());
    }

    let mut next = workspace.clone();
    let word = next.word_mut(&src.word_id)?;
    let group = word.senses.remove(position);
    word.senses.insert(order, group);

    finish(registry, next)
}

/// Reposition one duplicate inside its group.
///
/// # Errors
/// - `Validation` if `src.order` is not set.
/// - `ReferenceNotFound` if `src` does not resolve.
/// - `Range` if `order` is not a valid position in the group.
pub fn order_duplicate(
    registry: &Registry,
    workspace: &Workspace,
    src: &MergeTreeReference,
    order: usize,
) -> MergeResult<Workspace> {
    let Some(index) = src.order else {
        return Err(ValidationError::MissingField {
            field: "order".to_string(),
        }
        .into());
    };
    workspace.resolve(src)?;
    let len = workspace.group(src).map_or(0, |g| g.guids.len());
    if order >= len {
        return Err(MergeError::range("order", order, len.saturating_sub(1)));
    }
    if order == index {
        return Ok(workspace.clone());
    }

    let mut next = workspace.clone();
    let group = next.group_mut(src)?;
    let guid = group.guids.remove(index);
    group.guids.insert(order, guid);

    finish(registry, next)
}
