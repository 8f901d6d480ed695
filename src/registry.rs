//! Snapshot registry.
//!
//! The registry is the read-only index of the original entries a curation
//! session started from. It is built once by [`Registry::load`] and never
//! mutated; every sense guid the workspace mentions must resolve here.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{InputError, MergeResult};
use crate::word::{Sense, SenseGuid, Word, WordId};

/// A sense together with where it sat in its original entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredSense {
    /// The original sense.
    pub sense: Sense,
    /// Id of the word the sense came from.
    pub origin: WordId,
    /// Index of the sense inside its original word.
    pub order: usize,
}

impl RegisteredSense {
    /// Returns true if the sense is protected.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        self.sense.is_protected()
    }
}

/// Immutable index of original words and senses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: HashMap<WordId, Word>,
    senses: HashMap<SenseGuid, RegisteredSense>,
    order: Vec<WordId>,
}

impl Registry {
    /// Build the registry from backend entries.
    ///
    /// # Errors
    /// - `InvalidInput` if a word id is empty or repeated, or a sense guid
    ///   appears more than once anywhere in the input.
    pub fn load(entries: Vec<Word>) -> MergeResult<Self> {
        let mut registry = Self::default();

        for word in entries {
            if word.id.is_blank() {
                return Err(InputError::EmptyWordId.into());
            }
            if registry.entries.contains_key(&word.id) {
                return Err(InputError::DuplicateWordId { word_id: word.id }.into());
            }

            for (order, sense) in word.senses.iter().enumerate() {
                if registry.senses.contains_key(&sense.guid) {
                    return Err(InputError::DuplicateSenseGuid {
                        guid: sense.guid,
                        word_id: word.id.clone(),
                    }
                    .into());
                }
                registry.senses.insert(
                    sense.guid,
                    RegisteredSense {
                        sense: sense.clone(),
                        origin: word.id.clone(),
                        order,
                    },
                );
            }

            registry.order.push(word.id.clone());
            registry.entries.insert(word.id.clone(), word);
        }

        Ok(registry)
    }

    /// Look up a sense by guid.
    #[must_use]
    pub fn get(&self, guid: SenseGuid) -> Option<&RegisteredSense> {
        self.senses.get(&guid)
    }

    /// Look up an original word by id.
    #[must_use]
    pub fn entry(&self, id: &WordId) -> Option<&Word> {
        self.entries.get(id)
    }

    /// Original words in load order.
    pub fn entries(&self) -> impl Iterator<Item = &Word> + '_ {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Position of a word in load order.
    #[must_use]
    pub fn position(&self, id: &WordId) -> Option<usize> {
        self.order.iter().position(|w| w == id)
    }

    /// The full set of sense guids.
    #[must_use]
    pub fn guids(&self) -> BTreeSet<SenseGuid> {
        self.senses.keys().copied().collect()
    }

    /// Returns true if `guid` is known and protected.
    #[must_use]
    pub fn is_protected_sense(&self, guid: SenseGuid) -> bool {
        self.senses.get(&guid).is_some_and(RegisteredSense::is_protected)
    }

    /// Number of original words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the registry holds no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of senses across all words.
    #[must_use]
    pub fn sense_count(&self) -> usize {
        self.senses.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MergeError;

    fn guid(n: u128) -> SenseGuid {
        SenseGuid::from_u128(n)
    }

    fn sample() -> Vec<Word> {
        vec![
            Word::new("w1", "mti")
                .with_sense(Sense::new(guid(1), "en", "tree"))
                .with_sense(Sense::new(guid(2), "en", "wood")),
            Word::new("w2", "miti").with_sense(Sense::new(guid(3), "en", "trees").protected()),
        ]
    }

    #[test]
    fn test_load_indexes_senses_with_origin() {
        let registry = Registry::load(sample()).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.sense_count(), 3);

        let s2 = registry.get(guid(2)).unwrap();
        assert_eq!(s2.origin, WordId::new("w1"));
        assert_eq!(s2.order, 1);
        assert!(registry.is_protected_sense(guid(3)));
        assert!(!registry.is_protected_sense(guid(1)));
        assert!(registry.get(guid(99)).is_none());
    }

    #[test]
    fn test_entries_keep_load_order() {
        let registry = Registry::load(sample()).unwrap();
        let ids: Vec<&str> = registry.entries().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["w1", "w2"]);
        assert_eq!(registry.position(&WordId::new("w2")), Some(1));
    }

    #[test]
    fn test_duplicate_sense_guid_rejected() {
        let mut entries = sample();
        entries.push(Word::new("w3", "mtii").with_sense(Sense::new(guid(1), "en", "tree")));

        let err = Registry::load(entries).unwrap_err();
        assert!(matches!(
            err,
            MergeError::InvalidInput(InputError::DuplicateSenseGuid { word_id, .. }) if word_id.as_str() == "w3"
        ));
    }

    #[test]
    fn test_duplicate_sense_guid_within_one_word_rejected() {
        let entries = vec![Word::new("w1", "x")
            .with_sense(Sense::new(guid(1), "en", "a"))
            .with_sense(Sense::new(guid(1), "en", "b"))];
        assert!(Registry::load(entries).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_duplicate_word_id_rejected() {
        let entries = vec![Word::new("w1", "a"), Word::new("w1", "b")];
        assert!(Registry::load(entries).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_empty_word_id_rejected() {
        let entries = vec![Word::new(" ", "a")];
        assert!(matches!(
            Registry::load(entries).unwrap_err(),
            MergeError::InvalidInput(InputError::EmptyWordId)
        ));
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::load(Vec::new()).unwrap();
        assert!(registry.is_empty());
        assert!(registry.guids().is_empty());
    }
}
