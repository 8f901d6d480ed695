//! Audio ownership.
//!
//! Audio attachments are tracked per word, not per sense. An original word's
//! audio stays home while its own target word still holds one of its senses;
//! otherwise it follows the word's first surviving sense.

use std::collections::HashMap;

use crate::registry::Registry;
use crate::word::{SenseGuid, Word, WordId};

use super::Workspace;

/// Target word that owns `word`'s audio in the given workspace.
///
/// Falls back to the word itself when every one of its senses was deleted.
#[must_use]
pub fn audio_home(workspace: &Workspace, word: &Word) -> WordId {
    home_with(&workspace.owners(), workspace, word)
}

fn home_with(owners: &HashMap<SenseGuid, &WordId>, workspace: &Workspace, word: &Word) -> WordId {
    let keeps_own = workspace
        .word(&word.id)
        .is_some_and(|target| target.guids().any(|g| word.senses.iter().any(|s| s.guid == g)));
    if keeps_own {
        return word.id.clone();
    }

    word.senses
        .iter()
        .find_map(|s| owners.get(&s.guid).map(|id| (*id).clone()))
        .unwrap_or_else(|| word.id.clone())
}

/// Recompute every target word's `audio_count` from the ownership rule.
pub(crate) fn refresh_audio_counts(registry: &Registry, workspace: &mut Workspace) {
    let mut counts: HashMap<WordId, usize> = HashMap::new();
    {
        let owners = workspace.owners();
        for word in registry.entries() {
            if word.audio.is_empty() {
                continue;
            }
            let home = home_with(&owners, workspace, word);
            *counts.entry(home).or_default() += word.audio.len();
        }
    }

    for (id, target) in &mut workspace.words {
        target.audio_count = counts.get(id).copied().unwrap_or(0);
    }
}
