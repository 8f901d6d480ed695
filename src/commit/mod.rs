//! Commit plans.
//!
//! A [`CommitPlan`] is the minimal list of backend changes that turns the
//! original entries into the curator's final grouping. It is computed by
//! [`compute_commit`] and shipped inside a [`CommitRequest`].

mod request;
mod translator;

use serde::{Deserialize, Serialize};

use crate::error::{InvariantViolation, MergeResult};
use crate::registry::Registry;
use crate::word::{Accessibility, Definition, Flag, Gloss, SemanticDomain, SenseGuid, WordId};

pub use request::{from_json, to_json_pretty, CommitRequest};
pub use translator::compute_commit;

/// One resulting sense, flattened from a merge-sense group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedSense {
    /// Contributing guids; the first one survives in the backend. A protected
    /// guid is always first when the group holds one.
    pub guids: Vec<SenseGuid>,
    /// One gloss per language.
    pub glosses: Vec<Gloss>,
    /// One definition per language.
    pub definitions: Vec<Definition>,
    /// Union of the contributors' domains.
    pub semantic_domains: Vec<SemanticDomain>,
    /// Protected if any contributor is.
    pub accessibility: Accessibility,
}

impl MergedSense {
    /// Flatten the senses of a group.
    ///
    /// Texts are merged per language in first-seen language order; distinct
    /// non-empty texts are joined with `"; "` in group order. The first
    /// protected guid is moved to the front of `guids` so it is the one kept.
    ///
    /// # Errors
    /// - `Invariant` if a guid is not in the registry.
    pub fn flatten(registry: &Registry, guids: &[SenseGuid]) -> MergeResult<Self> {
        let mut glosses: Vec<(String, Vec<String>)> = Vec::new();
        let mut definitions: Vec<(String, Vec<String>)> = Vec::new();
        let mut semantic_domains: Vec<SemanticDomain> = Vec::new();
        let mut accessibility = Accessibility::Active;

        for &guid in guids {
            let sense = &registry
                .get(guid)
                .ok_or(InvariantViolation::UnknownSense { guid })?
                .sense;
            for gloss in &sense.glosses {
                push_text(&mut glosses, &gloss.language, &gloss.def);
            }
            for definition in &sense.definitions {
                push_text(&mut definitions, &definition.language, &definition.text);
            }
            for domain in &sense.semantic_domains {
                if !semantic_domains.iter().any(|d| d.id == domain.id) {
                    semantic_domains.push(domain.clone());
                }
            }
            if sense.is_protected() {
                accessibility = Accessibility::Protected;
            }
        }

        let mut kept = guids.to_vec();
        if let Some(i) = kept
            .iter()
            .position(|g| registry.get(*g).is_some_and(|r| r.sense.is_protected()))
        {
            kept[..=i].rotate_right(1);
        }

        Ok(Self {
            guids: kept,
            glosses: glosses
                .into_iter()
                .map(|(language, texts)| Gloss::new(language, texts.join("; ")))
                .collect(),
            definitions: definitions
                .into_iter()
                .map(|(language, texts)| Definition {
                    language,
                    text: texts.join("; "),
                })
                .collect(),
            semantic_domains,
            accessibility,
        })
    }
}

fn push_text(merged: &mut Vec<(String, Vec<String>)>, language: &str, text: &str) {
    let text = text.trim();
    let slot = match merged.iter().position(|(l, _)| l == language) {
        Some(i) => &mut merged[i].1,
        None => {
            merged.push((language.to_string(), Vec::new()));
            let last = merged.len() - 1;
            &mut merged[last].1
        }
    };
    if !text.is_empty() && !slot.iter().any(|t| t == text) {
        slot.push(text.to_string());
    }
}

/// Payload of a [`CommitOp::Merge`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergePayload {
    /// Word written by the merge.
    pub word_id: WordId,
    /// Original words contributing senses, plus `word_id`, in load order.
    pub parents: Vec<WordId>,
    /// Resulting senses in order.
    pub senses: Vec<MergedSense>,
    /// Resulting vernacular form.
    pub vernacular: String,
    /// Resulting flag.
    pub flag: Flag,
    /// Audio attachments the word owns afterwards.
    pub audio_count: usize,
}

impl MergePayload {
    /// Returns true if the merge only keeps an emptied protected word alive.
    #[must_use]
    pub fn is_retaining(&self) -> bool {
        self.senses.is_empty()
    }
}

/// What a [`CommitOp::Delete`] removes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum DeleteTarget {
    /// A whole word.
    Word(WordId),
    /// One sense of a surviving word.
    Sense {
        /// Word the sense belongs to.
        word_id: WordId,
        /// The sense.
        guid: SenseGuid,
    },
}

/// Payload of a [`CommitOp::AudioRehome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRehomePayload {
    /// Original owner.
    pub from: WordId,
    /// New owner.
    pub to: WordId,
    /// File names moved.
    pub audio: Vec<String>,
}

/// One backend change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "payload", rename_all = "snake_case")]
pub enum CommitOp {
    /// Write a merged word.
    Merge(MergePayload),
    /// Remove a word or a sense.
    Delete(DeleteTarget),
    /// Move audio between words.
    AudioRehome(AudioRehomePayload),
}

/// Ordered backend changes: merges, then deletes, then audio moves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitPlan {
    /// Operations in execution order.
    pub ops: Vec<CommitOp>,
}

impl CommitPlan {
    /// Returns true if there is nothing to commit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Merge payloads in order.
    pub fn merges(&self) -> impl Iterator<Item = &MergePayload> + '_ {
        self.ops.iter().filter_map(|op| match op {
            CommitOp::Merge(m) => Some(m),
            _ => None,
        })
    }

    /// Delete targets in order.
    pub fn deletes(&self) -> impl Iterator<Item = &DeleteTarget> + '_ {
        self.ops.iter().filter_map(|op| match op {
            CommitOp::Delete(d) => Some(d),
            _ => None,
        })
    }

    /// Audio moves in order.
    pub fn rehomes(&self) -> impl Iterator<Item = &AudioRehomePayload> + '_ {
        self.ops.iter().filter_map(|op| match op {
            CommitOp::AudioRehome(a) => Some(a),
            _ => None,
        })
    }
}
