//! # lexmerge - Duplicate detection and sense merging for lexicon curation
//!
//! lexmerge finds likely duplicate dictionary entries and gives a curator an
//! editable workspace for folding their senses together. When the curator is
//! done, the workspace is diffed against the original entries and turned into
//! a minimal, ordered commit plan for the dictionary backend.
//!
//! ## Core Concepts
//!
//! - **Registry**: the read-only snapshot of the original words and senses
//! - **Workspace**: target words holding ordered merge-sense groups of sense guids
//! - **Sidebar**: a single staging buffer for senses pulled out of the tree
//! - **CommitPlan**: merges, then deletes, then audio moves
//!
//! ## Usage
//!
//! ```rust
//! use lexmerge::{
//!     EditCosts, InMemoryBackend, MergeAction, MergeSenseId, MergeSession, MergeTreeReference,
//!     Sense, SenseGuid, SimilarityConfig, Word,
//! };
//!
//! let (a, b) = (SenseGuid::new(), SenseGuid::new());
//! let entries = vec![
//!     Word::new("w1", "kitabu").with_sense(Sense::new(a, "en", "book")),
//!     Word::new("w2", "kitab").with_sense(Sense::new(b, "en", "book")),
//! ];
//! let config = SimilarityConfig::new(EditCosts::uniform(1), 1);
//! let backend = InMemoryBackend::with_words(entries.clone());
//!
//! let mut session = MergeSession::load(entries, &config)?;
//! assert_eq!(session.workspace().clusters().len(), 1);
//!
//! session.apply(&MergeAction::CombineSense {
//!     src: MergeTreeReference::sense("w1", MergeSenseId::seeded(a)),
//!     dest: MergeTreeReference::sense("w2", MergeSenseId::seeded(b)),
//! })?;
//! let receipt = session.commit(&backend)?;
//! assert_eq!(receipt.applied, 2);
//! # Ok::<(), lexmerge::MergeError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod error;
pub mod registry;
pub mod word;

// Engines
pub mod commit;
pub mod operations;
pub mod similarity;
pub mod tree;

// Session and backend seam
pub mod backend;
pub mod session;

// Re-export primary types at crate root for convenience
pub use backend::{BackendError, CommitReceipt, InMemoryBackend, MergeBackend};
pub use commit::{
    compute_commit, AudioRehomePayload, CommitOp, CommitPlan, CommitRequest, DeleteTarget, MergePayload,
    MergedSense,
};
pub use error::{
    InputError, InvariantViolation, MergeError, MergeResult, ReferenceError, ValidationError,
};
pub use operations::{apply, Destination, MergeAction};
pub use registry::{RegisteredSense, Registry};
pub use session::MergeSession;
pub use similarity::{distance, find_clusters, Cluster, EditCosts, SimilarityConfig};
pub use tree::{
    audio_home, check_invariants, MergeSense, MergeSenseId, MergeTreeReference, Sidebar, TargetWord,
    Workspace,
};
pub use word::{
    Accessibility, Definition, Flag, Gloss, SemanticDomain, Sense, SenseGuid, Word, WordId,
};
