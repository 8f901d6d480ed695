//! Workspace consistency checks.
//!
//! One pass recomputes the placement of every guid and compares it with the
//! registry. Operations run it as a post-condition, so no reachable
//! workspace can violate it.

use std::collections::HashSet;

use crate::error::InvariantViolation;
use crate::registry::Registry;
use crate::word::SenseGuid;

use super::{MergeSenseId, Workspace};

struct Placement<'a> {
    registry: &'a Registry,
    seen: HashSet<SenseGuid>,
}

impl Placement<'_> {
    fn place(&mut self, guid: SenseGuid) -> Result<(), InvariantViolation> {
        if self.registry.get(guid).is_none() {
            return Err(InvariantViolation::UnknownSense { guid });
        }
        if !self.seen.insert(guid) {
            return Err(InvariantViolation::DuplicatePlacement { guid });
        }
        Ok(())
    }
}

/// Verify every workspace invariant against the registry.
///
/// Checks, in order: group shape and ids, placement of grouped guids, the
/// sidebar's origin word and guids, deleted guids, and finally completeness.
pub fn check_invariants(registry: &Registry, workspace: &Workspace) -> Result<(), InvariantViolation> {
    let mut placement = Placement {
        registry,
        seen: HashSet::with_capacity(registry.sense_count()),
    };
    let mut ids: HashSet<MergeSenseId> = HashSet::new();

    for (word_id, word) in &workspace.words {
        for group in &word.senses {
            if group.guids.is_empty() {
                return Err(InvariantViolation::EmptyMergeSense {
                    word_id: word_id.clone(),
                    merge_sense_id: group.id,
                });
            }
            if !ids.insert(group.id) {
                return Err(InvariantViolation::DuplicateMergeSenseId {
                    merge_sense_id: group.id,
                });
            }
            if registry.get(SenseGuid::from_uuid(*group.id.as_uuid())).is_some() {
                return Err(InvariantViolation::MergeSenseIdCollision {
                    merge_sense_id: group.id,
                });
            }
            for &guid in &group.guids {
                placement.place(guid)?;
                if !group.protected && registry.is_protected_sense(guid) {
                    return Err(InvariantViolation::ProtectionMismatch {
                        merge_sense_id: group.id,
                    });
                }
            }
        }
    }

    if let Some(sidebar) = &workspace.sidebar {
        if !workspace.words.contains_key(&sidebar.word_id) {
            return Err(InvariantViolation::UnknownSidebarOrigin {
                word_id: sidebar.word_id.clone(),
            });
        }
        for &guid in &sidebar.senses {
            placement.place(guid)?;
        }
    }

    for &guid in &workspace.deleted {
        placement.place(guid)?;
        if registry.is_protected_sense(guid) {
            return Err(InvariantViolation::ProtectedSenseDeleted { guid });
        }
    }

    if let Some(guid) = registry
        .guids()
        .into_iter()
        .find(|g| !placement.seen.contains(g))
    {
        return Err(InvariantViolation::MissingSense { guid });
    }

    Ok(())
}
