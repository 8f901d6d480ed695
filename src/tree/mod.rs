//! Merge workspace.
//!
//! The workspace is the tree a curator edits: target word → ordered
//! merge-sense groups → ordered original sense guids. Ids stand in for
//! references, so the whole tree is plain owned data that can be cloned,
//! compared, and serialized.
//!
//! Key invariants (see [`check_invariants`]):
//! - Every registry guid is placed exactly once: in a group, in the sidebar,
//!   or in the deleted set.
//! - Groups are never empty; their position in the word is their order.
//! - Protected senses never sit in the deleted set.

mod audio;
mod invariants;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MergeError, MergeResult, ReferenceError};
use crate::registry::Registry;
use crate::similarity::Cluster;
use crate::word::{Flag, SenseGuid, WordId};

pub use audio::audio_home;
pub(crate) use audio::refresh_audio_counts;
pub use invariants::check_invariants;

/// Namespace for deriving merge-sense ids from sense guids.
const MERGE_SENSE_NAMESPACE: Uuid = Uuid::from_u128(0x6c65_786d_6572_6765_9d1e_47a5_b0c3_5e21);

/// Synthetic identifier of a merge-sense group.
///
/// Ids are UUID v5 values derived from a sense guid and a counter, so seeding
/// the same data twice yields the same tree and an id never equals a guid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergeSenseId(Uuid);

impl MergeSenseId {
    /// The id a sense's own group gets when the workspace is seeded.
    #[must_use]
    pub fn seeded(guid: SenseGuid) -> Self {
        Self::derived(guid, 0)
    }

    fn derived(guid: SenseGuid, counter: u32) -> Self {
        let mut name = Vec::with_capacity(20);
        name.extend_from_slice(guid.as_uuid().as_bytes());
        name.extend_from_slice(&counter.to_be_bytes());
        Self(Uuid::new_v5(&MERGE_SENSE_NAMESPACE, &name))
    }

    /// Creates a merge-sense id from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MergeSenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One resulting sense: original senses the curator combined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSense {
    /// Group id.
    pub id: MergeSenseId,
    /// Contributing guids in insertion order; the first one is kept.
    pub guids: Vec<SenseGuid>,
    /// Set when any contributor is, or was combined from, a protected sense.
    pub protected: bool,
}

/// A node the curator intends to become one resulting backend word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetWord {
    /// Vernacular form.
    pub vernacular: String,
    /// Curator flag.
    pub flag: Flag,
    /// Copied from the original word's accessibility.
    pub protected: bool,
    /// Audio attachments this word will own after commit.
    pub audio_count: usize,
    /// Merge-sense groups in order.
    pub senses: Vec<MergeSense>,
}

impl TargetWord {
    /// Returns true if the word holds no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.senses.is_empty()
    }

    /// Position of a group in this word.
    #[must_use]
    pub fn position(&self, id: MergeSenseId) -> Option<usize> {
        self.senses.iter().position(|s| s.id == id)
    }

    /// All guids in group order.
    pub fn guids(&self) -> impl Iterator<Item = SenseGuid> + '_ {
        self.senses.iter().flat_map(|s| s.guids.iter().copied())
    }
}

/// The single staging buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sidebar {
    /// Word the staged senses were pulled from.
    pub word_id: WordId,
    /// Group the staged senses were pulled from.
    pub merge_sense_id: MergeSenseId,
    /// Staged guids in the order they were pulled.
    #[serde(default)]
    pub senses: Vec<SenseGuid>,
}

impl Sidebar {
    /// An empty sidebar pointing at a group.
    #[must_use]
    pub fn new(word_id: WordId, merge_sense_id: MergeSenseId) -> Self {
        Self {
            word_id,
            merge_sense_id,
            senses: Vec::new(),
        }
    }

    /// Returns true if nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.senses.is_empty()
    }

    pub(crate) fn same_origin(&self, r: &MergeTreeReference) -> bool {
        self.word_id == r.word_id && self.merge_sense_id == r.merge_sense_id
    }
}

/// Address of a group, or of one duplicate inside a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeTreeReference {
    /// Target word.
    pub word_id: WordId,
    /// Group inside the word.
    pub merge_sense_id: MergeSenseId,
    /// Index of one guid inside the group; `None` addresses the whole group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,
}

impl MergeTreeReference {
    /// Reference to a whole group.
    #[must_use]
    pub fn sense(word_id: impl Into<WordId>, merge_sense_id: MergeSenseId) -> Self {
        Self {
            word_id: word_id.into(),
            merge_sense_id,
            order: None,
        }
    }

    /// Reference to the `index`-th guid of a group.
    #[must_use]
    pub fn duplicate(word_id: impl Into<WordId>, merge_sense_id: MergeSenseId, index: usize) -> Self {
        Self {
            word_id: word_id.into(),
            merge_sense_id,
            order: Some(index),
        }
    }

    /// The same reference widened to its whole group.
    #[must_use]
    pub fn as_group(&self) -> Self {
        Self {
            word_id: self.word_id.clone(),
            merge_sense_id: self.merge_sense_id,
            order: None,
        }
    }

    /// Returns true if both references address the same group.
    #[must_use]
    pub fn same_group(&self, other: &Self) -> bool {
        self.word_id == other.word_id && self.merge_sense_id == other.merge_sense_id
    }
}

/// Guids taken out of the tree by [`Workspace::detach`].
#[derive(Debug)]
pub(crate) struct Detached {
    /// Id of the removed group, when the whole group was taken.
    pub(crate) id: Option<MergeSenseId>,
    pub(crate) guids: Vec<SenseGuid>,
    pub(crate) protected: bool,
}

/// The editable merge tree of one curation session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub(crate) words: BTreeMap<WordId, TargetWord>,
    pub(crate) clusters: Vec<Cluster>,
    pub(crate) sidebar: Option<Sidebar>,
    pub(crate) deleted: BTreeSet<SenseGuid>,
}

impl Workspace {
    /// Seed a workspace: one target word per entry with one group per sense,
    /// words ordered cluster by cluster.
    pub(crate) fn seed(registry: &Registry, clusters: Vec<Cluster>) -> Self {
        let mut words = BTreeMap::new();
        for word in registry.entries() {
            let senses = word
                .senses
                .iter()
                .map(|sense| MergeSense {
                    id: MergeSenseId::seeded(sense.guid),
                    guids: vec![sense.guid],
                    protected: sense.is_protected(),
                })
                .collect();
            words.insert(
                word.id.clone(),
                TargetWord {
                    vernacular: word.vernacular.clone(),
                    flag: word.flag.clone(),
                    protected: word.is_protected(),
                    audio_count: word.audio.len(),
                    senses,
                },
            );
        }

        Self {
            words,
            clusters,
            sidebar: None,
            deleted: BTreeSet::new(),
        }
    }

    /// Returns true if the workspace holds no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Look up a target word.
    #[must_use]
    pub fn word(&self, id: &WordId) -> Option<&TargetWord> {
        self.words.get(id)
    }

    /// All target words, sorted by id.
    pub fn words(&self) -> impl Iterator<Item = (&WordId, &TargetWord)> + '_ {
        self.words.iter()
    }

    /// Duplicate clusters the workspace was seeded from.
    #[must_use]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Target word ids in display order (cluster by cluster).
    pub fn word_order(&self) -> impl Iterator<Item = &WordId> + '_ {
        self.clusters.iter().flat_map(|c| c.members.iter())
    }

    /// The active sidebar, if any.
    #[must_use]
    pub fn sidebar(&self) -> Option<&Sidebar> {
        self.sidebar.as_ref()
    }

    /// Senses the curator deleted.
    #[must_use]
    pub fn deleted(&self) -> &BTreeSet<SenseGuid> {
        &self.deleted
    }

    /// Look up a group.
    #[must_use]
    pub fn group(&self, r: &MergeTreeReference) -> Option<&MergeSense> {
        self.words
            .get(&r.word_id)?
            .senses
            .iter()
            .find(|s| s.id == r.merge_sense_id)
    }

    /// Id of the group currently holding `guid`.
    #[must_use]
    pub fn find(&self, guid: SenseGuid) -> Option<MergeTreeReference> {
        self.words.iter().find_map(|(word_id, word)| {
            word.senses.iter().find_map(|s| {
                s.guids
                    .iter()
                    .position(|g| *g == guid)
                    .map(|i| MergeTreeReference::duplicate(word_id.clone(), s.id, i))
            })
        })
    }

    /// Every guid placed anywhere: groups, sidebar, and deleted set.
    ///
    /// For a consistent workspace this equals the registry's guid set.
    #[must_use]
    pub fn placed_guids(&self) -> BTreeSet<SenseGuid> {
        let mut out: BTreeSet<SenseGuid> = self.words.values().flat_map(|w| w.guids()).collect();
        if let Some(sidebar) = &self.sidebar {
            out.extend(sidebar.senses.iter().copied());
        }
        out.extend(self.deleted.iter().copied());
        out
    }

    /// Map from guid to the target word holding it (groups only).
    pub(crate) fn owners(&self) -> HashMap<SenseGuid, &WordId> {
        self.words
            .iter()
            .flat_map(|(id, word)| word.guids().map(move |g| (g, id)))
            .collect()
    }

    pub(crate) fn word_mut(&mut self, id: &WordId) -> MergeResult<&mut TargetWord> {
        self.words
            .get_mut(id)
            .ok_or_else(|| ReferenceError::Word { word_id: id.clone() }.into())
    }

    /// Resolve a reference to `(group position, guid index)`.
    pub(crate) fn resolve(&self, r: &MergeTreeReference) -> MergeResult<(usize, Option<usize>)> {
        let word = self.words.get(&r.word_id).ok_or_else(|| ReferenceError::Word {
            word_id: r.word_id.clone(),
        })?;
        let position = word.position(r.merge_sense_id).ok_or_else(|| ReferenceError::MergeSense {
            word_id: r.word_id.clone(),
            merge_sense_id: r.merge_sense_id,
        })?;
        if let Some(index) = r.order {
            if index >= word.senses[position].guids.len() {
                return Err(ReferenceError::Duplicate {
                    merge_sense_id: r.merge_sense_id,
                    index,
                }
                .into());
            }
        }
        Ok((position, r.order))
    }

    pub(crate) fn group_mut(&mut self, r: &MergeTreeReference) -> MergeResult<&mut MergeSense> {
        let (position, _) = self.resolve(r)?;
        let word = self.word_mut(&r.word_id)?;
        Ok(&mut word.senses[position])
    }

    /// Take a group, or one duplicate, out of the tree.
    ///
    /// A group left without guids is removed; later groups shift down.
    pub(crate) fn detach(&mut self, registry: &Registry, r: &MergeTreeReference) -> MergeResult<Detached> {
        let (position, index) = self.resolve(r)?;
        let word = self.word_mut(&r.word_id)?;

        match index {
            None => {
                let group = word.senses.remove(position);
                Ok(Detached {
                    id: Some(group.id),
                    guids: group.guids,
                    protected: group.protected,
                })
            }
            Some(index) => {
                let group = &mut word.senses[position];
                let guid = group.guids.remove(index);
                if group.guids.is_empty() {
                    word.senses.remove(position);
                } else {
                    group.protected = group.guids.iter().any(|g| registry.is_protected_sense(*g));
                }
                Ok(Detached {
                    id: None,
                    guids: vec![guid],
                    protected: registry.is_protected_sense(guid),
                })
            }
        }
    }

    /// Insert a group into a word at `order`.
    pub(crate) fn insert_group(
        &mut self,
        word_id: &WordId,
        order: usize,
        group: MergeSense,
    ) -> MergeResult<()> {
        let word = self.word_mut(word_id)?;
        if order > word.senses.len() {
            return Err(MergeError::range("dest_order", order, word.senses.len()));
        }
        word.senses.insert(order, group);
        Ok(())
    }

    /// Returns true if some group anywhere uses `id`.
    pub(crate) fn uses_merge_sense_id(&self, id: MergeSenseId) -> bool {
        self.words
            .values()
            .any(|w| w.senses.iter().any(|s| s.id == id))
            || self.sidebar.as_ref().is_some_and(|s| s.merge_sense_id == id && !s.is_empty())
    }

    /// First unused id derived from `guid`.
    pub(crate) fn fresh_merge_sense_id(&self, guid: SenseGuid) -> MergeSenseId {
        let mut counter = 0u32;
        loop {
            let id = MergeSenseId::derived(guid, counter);
            if !self.uses_merge_sense_id(id) {
                return id;
            }
            counter = counter.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word::{Sense, Word};

    fn guid(n: u128) -> SenseGuid {
        SenseGuid::from_u128(n)
    }

    fn seeded() -> (Registry, Workspace) {
        let registry = Registry::load(vec![
            Word::new("w1", "mti")
                .with_sense(Sense::new(guid(1), "en", "tree"))
                .with_sense(Sense::new(guid(2), "en", "wood").protected()),
            Word::new("w2", "miti").with_sense(Sense::new(guid(3), "en", "trees")),
        ])
        .unwrap();
        let clusters = vec![Cluster {
            members: vec![WordId::new("w1"), WordId::new("w2")],
        }];
        let ws = Workspace::seed(&registry, clusters);
        (registry, ws)
    }

    #[test]
    fn test_seed_builds_one_group_per_sense() {
        let (registry, ws) = seeded();

        let w1 = ws.word(&WordId::new("w1")).unwrap();
        assert_eq!(w1.senses.len(), 2);
        assert_eq!(w1.senses[0].guids, vec![guid(1)]);
        assert_eq!(w1.senses[1].id, MergeSenseId::seeded(guid(2)));
        assert!(w1.senses[1].protected);
        assert!(!w1.senses[0].protected);
        assert_eq!(ws.placed_guids(), registry.guids());
    }

    #[test]
    fn test_seeded_ids_are_deterministic_and_distinct_from_guids() {
        let a = MergeSenseId::seeded(guid(1));
        assert_eq!(a, MergeSenseId::seeded(guid(1)));
        assert_ne!(a, MergeSenseId::seeded(guid(2)));
        assert_ne!(*a.as_uuid(), *guid(1).as_uuid());
    }

    #[test]
    fn test_resolve_reports_missing_pieces() {
        let (_, ws) = seeded();
        let id = MergeSenseId::seeded(guid(1));

        assert!(ws.resolve(&MergeTreeReference::sense("w1", id)).is_ok());
        assert!(ws.resolve(&MergeTreeReference::sense("w9", id)).unwrap_err().is_reference_not_found());
        assert!(ws.resolve(&MergeTreeReference::sense("w2", id)).unwrap_err().is_reference_not_found());
        assert!(ws
            .resolve(&MergeTreeReference::duplicate("w1", id, 1))
            .unwrap_err()
            .is_reference_not_found());
    }

    #[test]
    fn test_detach_duplicate_removes_emptied_group() {
        let (registry, mut ws) = seeded();
        let r = MergeTreeReference::duplicate("w1", MergeSenseId::seeded(guid(2)), 0);

        let detached = ws.detach(&registry, &r).unwrap();
        assert_eq!(detached.guids, vec![guid(2)]);
        assert!(detached.protected);
        assert!(detached.id.is_none());
        assert_eq!(ws.word(&WordId::new("w1")).unwrap().senses.len(), 1);
    }

    #[test]
    fn test_fresh_id_skips_ids_in_use() {
        let (_, ws) = seeded();
        let fresh = ws.fresh_merge_sense_id(guid(1));
        assert_ne!(fresh, MergeSenseId::seeded(guid(1)));
        assert!(!ws.uses_merge_sense_id(fresh));
    }

    #[test]
    fn test_find_locates_guid() {
        let (_, ws) = seeded();
        let found = ws.find(guid(3)).unwrap();
        assert_eq!(found.word_id, WordId::new("w2"));
        assert_eq!(found.order, Some(0));
        assert!(ws.find(guid(42)).is_none());
    }

    #[test]
    fn test_word_order_follows_clusters() {
        let (_, ws) = seeded();
        let order: Vec<&str> = ws.word_order().map(WordId::as_str).collect();
        assert_eq!(order, vec!["w1", "w2"]);
    }
}
