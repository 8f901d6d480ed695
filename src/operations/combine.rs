//! COMBINE: fold one group (or duplicate) into another group.

use crate::error::MergeResult;
use crate::registry::Registry;
use crate::tree::{MergeTreeReference, Workspace};

use super::finish;

/// Move the guids addressed by `src` to the end of `dest`'s group.
///
/// `src` may address a whole group or a single duplicate (`src.order`);
/// `dest` always addresses a group and its `order` is ignored. An emptied
/// source group is removed. The destination becomes protected if either
/// side was. Addressing the same group twice is a no-op.
///
/// # Errors
/// - `ReferenceNotFound` if either reference does not resolve.
pub fn combine_sense(
    registry: &Registry,
    workspace: &Workspace,
    src: &MergeTreeReference,
    dest: &MergeTreeReference,
) -> MergeResult<Workspace> {
    workspace.resolve(src)?;
    workspace.resolve(&dest.as_group())?;

    if src.same_group(dest) {
        return Ok(workspace.clone());
    }

    let mut next = workspace.clone();
    let moved = next.detach(registry, src)?;
    let target = next.group_mut(&dest.as_group())?;
    target.guids.extend(moved.guids);
    target.protected |= moved.protected;

    finish(registry, next)
}
