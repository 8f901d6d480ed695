//! Dictionary entry types.
//!
//! A [`Word`] is an original entry as stored by the backend. These types are
//! read-only inputs to a merge session: the registry indexes them once and
//! nothing in the crate mutates them afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Backend identifier of an original word.
///
/// The backend hands out opaque string ids, so this wraps a `String` rather
/// than a UUID.
///
/// # Examples
///
/// ```
/// use lexmerge::WordId;
///
/// let id = WordId::new("w1");
/// assert_eq!(id.as_str(), "w1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordId(String);

impl WordId {
    /// Creates a word id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the id is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for WordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Globally unique, stable sense identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SenseGuid(Uuid);

impl SenseGuid {
    /// Creates a new random sense guid.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a sense guid from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Creates a sense guid from a raw 128-bit value (handy for fixtures).
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SenseGuid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SenseGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SenseGuid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Accessibility level of a word or sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    /// Ordinary data; may be deleted by a merge.
    #[default]
    Active,
    /// Must survive every merge.
    Protected,
}

impl Accessibility {
    /// Returns `true` if this is `Protected`.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        matches!(self, Self::Protected)
    }
}

/// Curator flag attached to a word.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flag {
    /// Whether the flag is raised.
    pub active: bool,
    /// Free-form note.
    #[serde(default)]
    pub text: String,
}

impl Flag {
    /// A raised flag with the given note.
    #[must_use]
    pub fn raised(text: impl Into<String>) -> Self {
        Self {
            active: true,
            text: text.into(),
        }
    }
}

/// A gloss in one analysis language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gloss {
    /// Language tag (e.g. "en").
    pub language: String,
    /// Gloss text.
    pub def: String,
}

impl Gloss {
    /// Creates a gloss.
    #[must_use]
    pub fn new(language: impl Into<String>, def: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            def: def.into(),
        }
    }
}

/// A definition in one analysis language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// Language tag.
    pub language: String,
    /// Definition text.
    pub text: String,
}

/// A semantic domain tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticDomain {
    /// Domain number (e.g. "1.2.3").
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// One meaning of a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sense {
    /// Stable identifier.
    pub guid: SenseGuid,
    /// Glosses, at most one per language is typical but not required.
    #[serde(default)]
    pub glosses: Vec<Gloss>,
    /// Definitions.
    #[serde(default)]
    pub definitions: Vec<Definition>,
    /// Semantic domain tags.
    #[serde(default)]
    pub semantic_domains: Vec<SemanticDomain>,
    /// Accessibility level.
    #[serde(default)]
    pub accessibility: Accessibility,
}

impl Sense {
    /// Creates an active sense with a single gloss.
    #[must_use]
    pub fn new(guid: SenseGuid, language: impl Into<String>, gloss: impl Into<String>) -> Self {
        Self {
            guid,
            glosses: vec![Gloss::new(language, gloss)],
            definitions: Vec::new(),
            semantic_domains: Vec::new(),
            accessibility: Accessibility::Active,
        }
    }

    /// Marks this sense protected.
    #[must_use]
    pub fn protected(mut self) -> Self {
        self.accessibility = Accessibility::Protected;
        self
    }

    /// Returns true if the sense is protected.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        self.accessibility.is_protected()
    }
}

/// An original dictionary word as stored by the backend.
///
/// # Examples
///
/// ```
/// use lexmerge::{Sense, SenseGuid, Word};
///
/// let word = Word::new("w1", "kitab").with_sense(Sense::new(SenseGuid::new(), "en", "book"));
/// assert_eq!(word.senses.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Backend id.
    pub id: WordId,
    /// Vernacular form.
    pub vernacular: String,
    /// Senses in display order.
    #[serde(default)]
    pub senses: Vec<Sense>,
    /// Audio attachment file names.
    #[serde(default)]
    pub audio: Vec<String>,
    /// Curator flag.
    #[serde(default)]
    pub flag: Flag,
    /// Accessibility level.
    #[serde(default)]
    pub accessibility: Accessibility,
}

impl Word {
    /// Creates an active word with no senses.
    #[must_use]
    pub fn new(id: impl Into<WordId>, vernacular: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            vernacular: vernacular.into(),
            senses: Vec::new(),
            audio: Vec::new(),
            flag: Flag::default(),
            accessibility: Accessibility::Active,
        }
    }

    /// Appends a sense.
    #[must_use]
    pub fn with_sense(mut self, sense: Sense) -> Self {
        self.senses.push(sense);
        self
    }

    /// Appends an audio attachment.
    #[must_use]
    pub fn with_audio(mut self, file: impl Into<String>) -> Self {
        self.audio.push(file.into());
        self
    }

    /// Marks this word protected.
    #[must_use]
    pub fn protected(mut self) -> Self {
        self.accessibility = Accessibility::Protected;
        self
    }

    /// Returns true if the word is protected.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        self.accessibility.is_protected()
    }
}
