//! In-memory backend.
//!
//! Thread-safe reference implementation of [`MergeBackend`], used by tests
//! and the CLI. A commit is applied to a copy of the stored words and only
//! swapped in when every operation succeeded. Resending a request id that was
//! already applied is acknowledged without applying it again.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;

use uuid::Uuid;

use crate::commit::{AudioRehomePayload, CommitOp, CommitRequest, DeleteTarget, MergePayload, MergedSense};
use crate::word::{Sense, SenseGuid, Word, WordId};

use super::{BackendError, CommitReceipt, MergeBackend};

fn lock_err(context: &'static str) -> BackendError {
    BackendError::Storage {
        message: format!("poisoned lock: {context}"),
    }
}

fn unknown_word(id: &WordId) -> BackendError {
    BackendError::Rejected {
        code: 404,
        message: format!("unknown word {id}"),
    }
}

#[derive(Debug, Clone, Default)]
struct Stored {
    words: BTreeMap<WordId, Word>,
    retired: BTreeMap<WordId, Word>,
    parents: HashMap<WordId, Vec<WordId>>,
}

impl Stored {
    fn apply(&mut self, op: &CommitOp) -> Result<(), BackendError> {
        match op {
            CommitOp::Merge(payload) => self.merge(payload),
            CommitOp::Delete(DeleteTarget::Word(id)) => {
                let word = self.words.remove(id).ok_or_else(|| unknown_word(id))?;
                self.retired.insert(id.clone(), word);
                Ok(())
            }
            CommitOp::Delete(DeleteTarget::Sense { word_id, guid }) => {
                let word = self.words.get_mut(word_id).ok_or_else(|| unknown_word(word_id))?;
                word.senses.retain(|s| s.guid != *guid);
                Ok(())
            }
            CommitOp::AudioRehome(payload) => self.rehome(payload),
        }
    }

    fn merge(&mut self, payload: &MergePayload) -> Result<(), BackendError> {
        let existing = self
            .words
            .get(&payload.word_id)
            .ok_or_else(|| unknown_word(&payload.word_id))?;

        let moved: HashSet<SenseGuid> = payload.senses.iter().flat_map(|s| s.guids.iter().copied()).collect();
        let merged = Word {
            id: payload.word_id.clone(),
            vernacular: payload.vernacular.clone(),
            senses: payload.senses.iter().filter_map(to_sense).collect(),
            audio: existing.audio.clone(),
            flag: payload.flag.clone(),
            accessibility: existing.accessibility,
        };

        for parent in payload.parents.iter().filter(|p| **p != payload.word_id) {
            let word = self.words.get_mut(parent).ok_or_else(|| unknown_word(parent))?;
            word.senses.retain(|s| !moved.contains(&s.guid));
        }
        self.words.insert(payload.word_id.clone(), merged);
        self.parents
            .insert(payload.word_id.clone(), payload.parents.clone());
        Ok(())
    }

    fn rehome(&mut self, payload: &AudioRehomePayload) -> Result<(), BackendError> {
        if let Some(source) = self
            .words
            .get_mut(&payload.from)
            .or_else(|| self.retired.get_mut(&payload.from))
        {
            source.audio.retain(|a| !payload.audio.contains(a));
        }
        let target = self
            .words
            .get_mut(&payload.to)
            .ok_or_else(|| unknown_word(&payload.to))?;
        target.audio.extend(payload.audio.iter().cloned());
        Ok(())
    }
}

fn to_sense(merged: &MergedSense) -> Option<Sense> {
    let guid = *merged.guids.first()?;
    Some(Sense {
        guid,
        glosses: merged.glosses.clone(),
        definitions: merged.definitions.clone(),
        semantic_domains: merged.semantic_domains.clone(),
        accessibility: merged.accessibility,
    })
}

#[derive(Debug, Default)]
struct BackendState {
    stored: Stored,
    receipts: HashMap<Uuid, CommitReceipt>,
}

/// Thread-safe in-memory word store.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: RwLock<BackendState>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend holding `words`.
    #[must_use]
    pub fn with_words(words: Vec<Word>) -> Self {
        let stored = Stored {
            words: words.into_iter().map(|w| (w.id.clone(), w)).collect(),
            ..Stored::default()
        };
        Self {
            state: RwLock::new(BackendState {
                stored,
                receipts: HashMap::new(),
            }),
        }
    }

    /// All live words, sorted by id.
    pub fn words(&self) -> Result<Vec<Word>, BackendError> {
        let state = self.state.read().map_err(|_| lock_err("backend.words"))?;
        Ok(state.stored.words.values().cloned().collect())
    }

    /// Look up a live word.
    pub fn word(&self, id: &WordId) -> Result<Option<Word>, BackendError> {
        let state = self.state.read().map_err(|_| lock_err("backend.word"))?;
        Ok(state.stored.words.get(id).cloned())
    }

    /// Parents recorded by the last merge that wrote `id`.
    pub fn parents(&self, id: &WordId) -> Result<Vec<WordId>, BackendError> {
        let state = self.state.read().map_err(|_| lock_err("backend.parents"))?;
        Ok(state.stored.parents.get(id).cloned().unwrap_or_default())
    }

    /// Number of distinct requests applied.
    pub fn commit_count(&self) -> Result<usize, BackendError> {
        let state = self.state.read().map_err(|_| lock_err("backend.commit_count"))?;
        Ok(state.receipts.len())
    }
}

impl MergeBackend for InMemoryBackend {
    fn submit(&self, request: &CommitRequest) -> Result<CommitReceipt, BackendError> {
        if !request.verify_digest() {
            return Err(BackendError::Rejected {
                code: 400,
                message: "digest does not match plan".to_string(),
            });
        }

        let mut state = self.state.write().map_err(|_| lock_err("backend.submit"))?;
        if let Some(previous) = state.receipts.get(&request.request_id) {
            if previous.digest != request.digest {
                return Err(BackendError::Rejected {
                    code: 409,
                    message: format!("request {} was already applied with a different plan", request.request_id),
                });
            }
            tracing::debug!(request_id = %request.request_id, "duplicate commit ignored");
            return Ok(CommitReceipt {
                duplicate: true,
                ..previous.clone()
            });
        }

        let mut next = state.stored.clone();
        for op in &request.plan.ops {
            next.apply(op)?;
        }
        state.stored = next;

        let receipt = CommitReceipt {
            request_id: request.request_id,
            digest: request.digest.clone(),
            applied: request.plan.len(),
            duplicate: false,
        };
        state.receipts.insert(request.request_id, receipt.clone());
        Ok(receipt)
    }
}
