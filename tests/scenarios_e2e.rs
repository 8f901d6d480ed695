use std::collections::BTreeSet;

use lexmerge::{
    distance, CommitOp, DeleteTarget, EditCosts, MergeAction, MergeSenseId, MergeSession, MergeTreeReference,
    Sense, SenseGuid, SimilarityConfig, Word, WordId,
};

fn guid(n: u128) -> SenseGuid {
    SenseGuid::from_u128(n)
}

fn group(word: &str, g: u128) -> MergeTreeReference {
    MergeTreeReference::sense(word, MergeSenseId::seeded(guid(g)))
}

fn config() -> SimilarityConfig {
    SimilarityConfig::new(EditCosts::uniform(1), 1)
}

#[test]
fn identical_strings_have_zero_distance() {
    assert_eq!(distance("testing", "testing", EditCosts::new(4, 3, 5)), 0);
}

#[test]
fn weighted_distance_testing_toasting() {
    // substitute e→o (5) + insert a (4)
    assert_eq!(distance("testing", "toasting", EditCosts::new(4, 3, 5)), 9);
}

#[test]
fn combining_two_words_merges_into_destination() {
    let entries = vec![
        Word::new("w1", "mti").with_sense(Sense::new(guid(1), "en", "tree")),
        Word::new("w2", "miti").with_sense(Sense::new(guid(2), "en", "trees")),
    ];
    let mut session = MergeSession::load(entries, &config()).unwrap();
    session
        .apply(&MergeAction::CombineSense {
            src: group("w1", 1),
            dest: group("w2", 2),
        })
        .unwrap();

    let plan = session.plan().unwrap();
    assert_eq!(plan.len(), 2);

    let CommitOp::Merge(merge) = &plan.ops[0] else {
        panic!("expected merge, got {:?}", plan.ops[0]);
    };
    assert_eq!(merge.word_id, WordId::new("w2"));
    assert_eq!(merge.parents, vec![WordId::new("w1"), WordId::new("w2")]);
    assert_eq!(merge.senses.len(), 1);
    let guids: BTreeSet<SenseGuid> = merge.senses[0].guids.iter().copied().collect();
    assert_eq!(guids, BTreeSet::from([guid(1), guid(2)]));

    assert_eq!(plan.ops[1], CommitOp::Delete(DeleteTarget::Word(WordId::new("w1"))));
}

#[test]
fn moving_out_of_protected_word_never_deletes_it() {
    let entries = vec![
        Word::new("w1", "mti").with_sense(Sense::new(guid(1), "en", "tree")),
        Word::new("w3", "mtii")
            .with_sense(Sense::new(guid(3), "en", "log"))
            .protected(),
    ];
    let mut session = MergeSession::load(entries, &config()).unwrap();
    session
        .apply(&MergeAction::MoveSense {
            src: group("w3", 3),
            dest_word: WordId::new("w1"),
            dest_order: 0,
        })
        .unwrap();

    let plan = session.plan().unwrap();
    assert!(plan
        .deletes()
        .all(|d| !matches!(d, DeleteTarget::Word(id) if *id == WordId::new("w3"))));
    let merge = plan.merges().find(|m| m.word_id == WordId::new("w1")).unwrap();
    assert!(merge.parents.contains(&WordId::new("w3")));
}

#[test]
fn deleting_and_moving_every_sense_of_protected_word_keeps_it() {
    let entries = vec![
        Word::new("w1", "mti").with_sense(Sense::new(guid(1), "en", "tree")),
        Word::new("w3", "mtii")
            .with_sense(Sense::new(guid(3), "en", "log"))
            .with_sense(Sense::new(guid(4), "en", "stump"))
            .protected(),
    ];
    let mut session = MergeSession::load(entries, &config()).unwrap();
    session
        .apply_all(&[
            MergeAction::DeleteSense { src: group("w3", 4) },
            MergeAction::MoveSense {
                src: group("w3", 3),
                dest_word: WordId::new("w1"),
                dest_order: 1,
            },
        ])
        .unwrap();

    let plan = session.plan().unwrap();
    assert!(plan.deletes().all(|d| !matches!(d, DeleteTarget::Word(_))));
    assert!(plan.deletes().any(|d| matches!(d, DeleteTarget::Sense { guid: g, .. } if *g == guid(4))));
}
