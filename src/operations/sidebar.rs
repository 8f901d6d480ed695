//! The staging sidebar.
//!
//! At most one sidebar exists. It remembers the group its senses came from
//! and refuses to be replaced while it still holds senses, so nothing
//! staged can fall out of the tree.

use serde::{Deserialize, Serialize};

use crate::error::{InvariantViolation, MergeResult, ReferenceError};
use crate::registry::Registry;
use crate::tree::{MergeSense, MergeTreeReference, Sidebar, Workspace};
use crate::word::WordId;

use super::finish;

/// Where [`unstage_sense`] places a staged guid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Destination {
    /// Append to an existing group; any duplicate index is ignored.
    Group(MergeTreeReference),
    /// Insert as a new single-guid group.
    NewGroup {
        /// Receiving word.
        word_id: WordId,
        /// Position of the new group.
        order: usize,
    },
}

fn orphaned(current: Option<&Sidebar>, replacement: Option<&Sidebar>) -> usize {
    let Some(current) = current else {
        return 0;
    };
    current
        .senses
        .iter()
        .filter(|g| !replacement.is_some_and(|r| r.senses.contains(g)))
        .count()
}

/// Replace or clear the sidebar.
///
/// # Errors
/// - `Invariant(OrphanedSidebarSenses)` if the current sidebar holds senses
///   the replacement does not.
/// - `Invariant` if the replacement holds guids placed elsewhere or names
///   an origin word that is not in the workspace.
pub fn set_sidebar(registry: &Registry, workspace: &Workspace, sidebar: Option<Sidebar>) -> MergeResult<Workspace> {
    let count = orphaned(workspace.sidebar(), sidebar.as_ref());
    if count > 0 {
        return Err(InvariantViolation::OrphanedSidebarSenses { count }.into());
    }

    let mut next = workspace.clone();
    next.sidebar = sidebar;
    finish(registry, next)
}

/// Pull a group or duplicate out of the tree into the sidebar.
///
/// Appends when the sidebar already stages senses from the same group.
///
/// # Errors
/// - `ReferenceNotFound` if `src` does not resolve.
/// - `Invariant(OrphanedSidebarSenses)` if the sidebar holds senses from a
///   different group.
pub fn stage_sense(registry: &Registry, workspace: &Workspace, src: &MergeTreeReference) -> MergeResult<Workspace> {
    workspace.resolve(src)?;
    if let Some(current) = workspace.sidebar() {
        if !current.is_empty() && !current.same_origin(src) {
            return Err(InvariantViolation::OrphanedSidebarSenses {
                count: current.senses.len(),
            }
            .into());
        }
    }

    let mut next = workspace.clone();
    let detached = next.detach(registry, src)?;
    let mut sidebar = match next.sidebar.take() {
        Some(existing) if !existing.is_empty() => existing,
        _ => Sidebar::new(src.word_id.clone(), src.merge_sense_id),
    };
    sidebar.senses.extend(detached.guids);
    next.sidebar = Some(sidebar);

    finish(registry, next)
}

/// Place the `index`-th staged guid back into the tree.
///
/// The sidebar stays in place, possibly empty, until it is replaced or
/// restored.
///
/// # Errors
/// - `ReferenceNotFound` if there is no such staged guid, or the
///   destination does not resolve.
/// - `Range` if a new group's order exceeds the word's group count.
pub fn unstage_sense(
    registry: &Registry,
    workspace: &Workspace,
    index: usize,
    destination: &Destination,
) -> MergeResult<Workspace> {
    let mut next = workspace.clone();
    let guid = match next.sidebar.as_mut() {
        Some(sidebar) if index < sidebar.senses.len() => sidebar.senses.remove(index),
        _ => return Err(ReferenceError::SidebarSense { index }.into()),
    };
    let protected = registry.is_protected_sense(guid);

    match destination {
        Destination::Group(dest) => {
            let group = next.group_mut(&dest.as_group())?;
            group.guids.push(guid);
            group.protected |= protected;
        }
        Destination::NewGroup { word_id, order } => {
            let id = next.fresh_merge_sense_id(guid);
            next.insert_group(
                word_id,
                *order,
                MergeSense {
                    id,
                    guids: vec![guid],
                    protected,
                },
            )?;
        }
    }

    finish(registry, next)
}

/// Return every staged guid to its origin and clear the sidebar.
///
/// Staged guids rejoin their origin group when it still exists; otherwise
/// they form one new group at the end of the origin word, reusing the
/// origin id when it is free.
///
/// # Errors
/// - `ReferenceNotFound` if the origin word is unknown.
pub fn restore_sidebar(registry: &Registry, workspace: &Workspace) -> MergeResult<Workspace> {
    let mut next = workspace.clone();
    let Some(sidebar) = next.sidebar.take() else {
        return Ok(next);
    };
    if sidebar.is_empty() {
        return finish(registry, next);
    }

    let protected = sidebar.senses.iter().any(|g| registry.is_protected_sense(*g));
    let origin = MergeTreeReference::sense(sidebar.word_id.clone(), sidebar.merge_sense_id);
    if next.group(&origin).is_some() {
        let group = next.group_mut(&origin)?;
        group.guids.extend(sidebar.senses);
        group.protected |= protected;
    } else {
        let id = if next.uses_merge_sense_id(sidebar.merge_sense_id) {
            next.fresh_merge_sense_id(sidebar.senses[0])
        } else {
            sidebar.merge_sense_id
        };
        next.word_mut(&sidebar.word_id)?.senses.push(MergeSense {
            id,
            guids: sidebar.senses,
            protected,
        });
    }

    tracing::debug!(word_id = %sidebar.word_id, "sidebar restored");
    finish(registry, next)
}
