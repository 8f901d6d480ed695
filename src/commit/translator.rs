//! Workspace → commit plan.

use std::collections::{BTreeSet, HashSet};

use crate::error::{InvariantViolation, MergeResult, ReferenceError};
use crate::registry::Registry;
use crate::tree::{audio_home, check_invariants, TargetWord, Workspace};
use crate::word::{Word, WordId};

use super::{AudioRehomePayload, CommitOp, CommitPlan, DeleteTarget, MergePayload, MergedSense};

/// A target word that still looks exactly like its original entry.
fn is_untouched(word: &Word, target: &TargetWord) -> bool {
    target.senses.len() == word.senses.len()
        && target
            .senses
            .iter()
            .zip(&word.senses)
            .all(|(group, sense)| group.guids == [sense.guid])
        && target.vernacular == word.vernacular
        && target.flag == word.flag
}

fn target_of<'a>(workspace: &'a Workspace, id: &WordId) -> MergeResult<&'a TargetWord> {
    workspace
        .word(id)
        .ok_or_else(|| ReferenceError::Word { word_id: id.clone() }.into())
}

/// Compute the backend changes for a finished workspace.
///
/// # Errors
/// - `Invariant` if the workspace is inconsistent or the sidebar still
///   holds senses.
/// - `ReferenceNotFound` if an original word has no target word.
pub fn compute_commit(registry: &Registry, workspace: &Workspace) -> MergeResult<CommitPlan> {
    check_invariants(registry, workspace)?;
    if let Some(sidebar) = workspace.sidebar().filter(|s| !s.is_empty()) {
        return Err(InvariantViolation::OrphanedSidebarSenses {
            count: sidebar.senses.len(),
        }
        .into());
    }

    let mut merges = Vec::new();
    let mut parents_seen: HashSet<WordId> = HashSet::new();

    for word in registry.entries() {
        let target = target_of(workspace, &word.id)?;
        if target.is_empty() || is_untouched(word, target) {
            continue;
        }

        let mut contributors: HashSet<&WordId> = HashSet::new();
        for guid in target.guids() {
            if let Some(registered) = registry.get(guid) {
                contributors.insert(&registered.origin);
            }
        }
        let parents: Vec<WordId> = registry
            .entries()
            .filter(|w| w.id == word.id || contributors.contains(&w.id))
            .map(|w| w.id.clone())
            .collect();
        parents_seen.extend(parents.iter().cloned());

        let senses = target
            .senses
            .iter()
            .map(|group| MergedSense::flatten(registry, &group.guids))
            .collect::<MergeResult<Vec<_>>>()?;

        merges.push(MergePayload {
            word_id: word.id.clone(),
            parents,
            senses,
            vernacular: target.vernacular.clone(),
            flag: target.flag.clone(),
            audio_count: target.audio_count,
        });
    }

    let mut deleted_words: BTreeSet<&WordId> = BTreeSet::new();
    let mut deletes = Vec::new();
    for word in registry.entries() {
        let target = target_of(workspace, &word.id)?;
        if !target.is_empty() {
            continue;
        }
        if !word.is_protected() {
            deleted_words.insert(&word.id);
            deletes.push(DeleteTarget::Word(word.id.clone()));
        } else if !parents_seen.contains(&word.id) {
            merges.push(MergePayload {
                word_id: word.id.clone(),
                parents: vec![word.id.clone()],
                senses: Vec::new(),
                vernacular: target.vernacular.clone(),
                flag: target.flag.clone(),
                audio_count: target.audio_count,
            });
        }
    }

    for &guid in workspace.deleted() {
        let Some(registered) = registry.get(guid) else {
            return Err(InvariantViolation::UnknownSense { guid }.into());
        };
        if !deleted_words.contains(&registered.origin) {
            deletes.push(DeleteTarget::Sense {
                word_id: registered.origin.clone(),
                guid,
            });
        }
    }

    let rehomes: Vec<AudioRehomePayload> = registry
        .entries()
        .filter(|word| !word.audio.is_empty())
        .filter_map(|word| {
            let home = audio_home(workspace, word);
            (home != word.id).then(|| AudioRehomePayload {
                from: word.id.clone(),
                to: home,
                audio: word.audio.clone(),
            })
        })
        .collect();

    tracing::info!(
        merges = merges.len(),
        deletes = deletes.len(),
        rehomes = rehomes.len(),
        "commit plan computed"
    );

    let mut ops = Vec::with_capacity(merges.len() + deletes.len() + rehomes.len());
    ops.extend(merges.into_iter().map(CommitOp::Merge));
    ops.extend(deletes.into_iter().map(CommitOp::Delete));
    ops.extend(rehomes.into_iter().map(CommitOp::AudioRehome));
    Ok(CommitPlan { ops })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{
        combine_sense, delete_sense, flag_word, move_sense, set_data, set_vernacular, stage_sense,
    };
    use crate::similarity::{EditCosts, SimilarityConfig};
    use crate::tree::{MergeSenseId, MergeTreeReference};
    use crate::word::{Flag, Sense, SenseGuid};

    fn guid(n: u128) -> SenseGuid {
        SenseGuid::from_u128(n)
    }

    fn group(word: &str, g: u128) -> MergeTreeReference {
        MergeTreeReference::sense(word, MergeSenseId::seeded(guid(g)))
    }

    fn w(id: &str) -> WordId {
        WordId::new(id)
    }

    fn load(entries: Vec<Word>) -> (Registry, Workspace) {
        set_data(entries, &SimilarityConfig::new(EditCosts::uniform(1), 1)).unwrap()
    }

    fn two_words() -> (Registry, Workspace) {
        load(vec![
            Word::new("w1", "mti")
                .with_sense(Sense::new(guid(1), "en", "tree"))
                .with_audio("mti.mp3"),
            Word::new("w2", "miti").with_sense(Sense::new(guid(2), "en", "trees")),
        ])
    }

    #[test]
    fn test_untouched_workspace_commits_nothing() {
        let (registry, ws) = two_words();
        assert!(compute_commit(&registry, &ws).unwrap().is_empty());
    }

    #[test]
    fn test_combine_emits_merge_delete_and_rehome_in_order() {
        let (registry, ws) = two_words();
        let ws = combine_sense(&registry, &ws, &group("w1", 1), &group("w2", 2)).unwrap();
        let plan = compute_commit(&registry, &ws).unwrap();

        assert_eq!(plan.len(), 3);
        let CommitOp::Merge(merge) = &plan.ops[0] else {
            panic!("expected merge first, got {:?}", plan.ops[0]);
        };
        assert_eq!(merge.word_id, w("w2"));
        assert_eq!(merge.parents, vec![w("w1"), w("w2")]);
        assert_eq!(merge.senses.len(), 1);
        assert_eq!(merge.senses[0].guids, vec![guid(2), guid(1)]);
        assert_eq!(merge.audio_count, 1);

        assert_eq!(plan.ops[1], CommitOp::Delete(DeleteTarget::Word(w("w1"))));
        assert_eq!(
            plan.ops[2],
            CommitOp::AudioRehome(AudioRehomePayload {
                from: w("w1"),
                to: w("w2"),
                audio: vec!["mti.mp3".to_string()],
            })
        );
    }

    #[test]
    fn test_relabel_emits_self_merge() {
        let (registry, ws) = two_words();
        let ws = set_vernacular(&registry, &ws, &w("w2"), "mitì").unwrap();
        let plan = compute_commit(&registry, &ws).unwrap();

        let merges: Vec<_> = plan.merges().collect();
        assert_eq!(merges.len(), 1);
        assert_eq!(merges[0].parents, vec![w("w2")]);
        assert_eq!(merges[0].vernacular, "mitì");
        assert_eq!(plan.deletes().count(), 0);
    }

    #[test]
    fn test_flag_emits_self_merge() {
        let (registry, ws) = two_words();
        let ws = flag_word(&registry, &ws, &w("w1"), Flag::raised("tone?")).unwrap();
        let plan = compute_commit(&registry, &ws).unwrap();
        assert_eq!(plan.merges().next().map(|m| m.flag.active), Some(true));
    }

    #[test]
    fn test_deleted_sense_of_surviving_word() {
        let (registry, ws) = load(vec![Word::new("w1", "mti")
            .with_sense(Sense::new(guid(1), "en", "tree"))
            .with_sense(Sense::new(guid(2), "en", "wood"))]);
        let ws = delete_sense(&registry, &ws, &group("w1", 2)).unwrap();
        let plan = compute_commit(&registry, &ws).unwrap();

        assert_eq!(plan.merges().count(), 1);
        let deletes: Vec<_> = plan.deletes().collect();
        assert_eq!(
            deletes,
            vec![&DeleteTarget::Sense {
                word_id: w("w1"),
                guid: guid(2),
            }]
        );
    }

    #[test]
    fn test_deleted_sense_of_deleted_word_is_not_repeated() {
        let (registry, ws) = two_words();
        let ws = delete_sense(&registry, &ws, &group("w1", 1)).unwrap();
        let plan = compute_commit(&registry, &ws).unwrap();

        assert_eq!(plan.ops, vec![CommitOp::Delete(DeleteTarget::Word(w("w1")))]);
    }

    #[test]
    fn test_protected_word_is_never_deleted() {
        let (registry, ws) = load(vec![
            Word::new("w1", "mti").with_sense(Sense::new(guid(1), "en", "tree")),
            Word::new("w3", "mtii")
                .with_sense(Sense::new(guid(3), "en", "log").protected())
                .protected(),
        ]);
        let ws = move_sense(&registry, &ws, &group("w3", 3), &w("w1"), 0).unwrap();
        let plan = compute_commit(&registry, &ws).unwrap();

        assert_eq!(plan.deletes().count(), 0);
        let merge = plan.merges().next().unwrap();
        assert_eq!(merge.parents, vec![w("w1"), w("w3")]);
        assert!(merge.senses[0].accessibility.is_protected());
    }

    #[test]
    fn test_protected_sense_combined_as_later_member_survives() {
        let (registry, ws) = load(vec![
            Word::new("w1", "mti").with_sense(Sense::new(guid(1), "en", "tree")),
            Word::new("w3", "mtii")
                .with_sense(Sense::new(guid(3), "en", "log").protected())
                .protected(),
        ]);
        let ws = combine_sense(&registry, &ws, &group("w3", 3), &group("w1", 1)).unwrap();
        let plan = compute_commit(&registry, &ws).unwrap();

        let merge = plan.merges().find(|m| m.word_id == w("w1")).unwrap();
        assert_eq!(merge.senses.len(), 1);
        assert_eq!(merge.senses[0].guids, vec![guid(3), guid(1)]);
        assert_eq!(merge.senses[0].glosses[0].def, "tree; log");
        assert!(merge.senses[0].accessibility.is_protected());
    }

    #[test]
    fn test_protected_empty_word_without_merge_is_retained() {
        let (registry, ws) = load(vec![Word::new("w1", "mti")
            .with_sense(Sense::new(guid(1), "en", "tree"))
            .with_sense(Sense::new(guid(2), "en", "wood"))
            .protected()]);
        let ws = delete_sense(&registry, &ws, &group("w1", 1)).unwrap();
        let ws = delete_sense(&registry, &ws, &group("w1", 2)).unwrap();
        let plan = compute_commit(&registry, &ws).unwrap();

        let merge = plan.merges().next().unwrap();
        assert!(merge.is_retaining());
        assert_eq!(merge.parents, vec![w("w1")]);
        assert_eq!(plan.deletes().count(), 2);
        assert!(plan
            .deletes()
            .all(|d| matches!(d, DeleteTarget::Sense { word_id, .. } if *word_id == w("w1"))));
    }

    #[test]
    fn test_reorder_is_a_change() {
        let (registry, ws) = load(vec![Word::new("w1", "mti")
            .with_sense(Sense::new(guid(1), "en", "tree"))
            .with_sense(Sense::new(guid(2), "en", "wood"))]);
        let ws = crate::operations::order_sense(&registry, &ws, &group("w1", 2), 0).unwrap();
        let plan = compute_commit(&registry, &ws).unwrap();

        let merge = plan.merges().next().unwrap();
        assert_eq!(merge.senses[0].guids, vec![guid(2)]);
        assert_eq!(merge.senses[1].guids, vec![guid(1)]);
    }

    #[test]
    fn test_pending_sidebar_blocks_commit() {
        let (registry, ws) = two_words();
        let ws = stage_sense(&registry, &ws, &group("w1", 1)).unwrap();
        let err = compute_commit(&registry, &ws).unwrap_err();
        assert!(matches!(
            err,
            crate::error::MergeError::Invariant(InvariantViolation::OrphanedSidebarSenses { count: 1 })
        ));
    }
}
