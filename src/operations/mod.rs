//! Operation engine.
//!
//! A closed set of pure state transitions over a [`Workspace`]. Each one
//! borrows the registry and the current workspace and returns a new
//! workspace, leaving its input untouched, so a failed call changes nothing.
//! Every successful result has passed [`check_invariants`].

mod combine;
mod edit;
mod reorder;
mod seed;
mod sidebar;

use serde::{Deserialize, Serialize};

use crate::error::MergeResult;
use crate::registry::Registry;
use crate::tree::{check_invariants, refresh_audio_counts, MergeTreeReference, Sidebar, Workspace};
use crate::word::{Flag, WordId};

pub use combine::combine_sense;
pub use edit::{delete_sense, flag_word, set_vernacular};
pub use reorder::{move_sense, order_duplicate, order_sense};
pub use seed::{clear_tree, set_data};
pub use sidebar::{restore_sidebar, set_sidebar, stage_sense, unstage_sense, Destination};

/// Every workspace operation as data.
///
/// Actions can be logged, sent over the wire, and replayed with [`apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "payload", rename_all = "snake_case")]
pub enum MergeAction {
    /// See [`combine_sense`].
    CombineSense {
        /// Group or duplicate to move.
        src: MergeTreeReference,
        /// Group receiving the guids.
        dest: MergeTreeReference,
    },

    /// See [`move_sense`].
    MoveSense {
        /// Group or duplicate to move.
        src: MergeTreeReference,
        /// Receiving word.
        dest_word: WordId,
        /// Position in the receiving word.
        dest_order: usize,
    },

    /// See [`order_sense`].
    OrderSense {
        /// Group to reposition.
        src: MergeTreeReference,
        /// New position.
        order: usize,
    },

    /// See [`order_duplicate`].
    OrderDuplicate {
        /// Duplicate to reposition.
        src: MergeTreeReference,
        /// New position inside its group.
        order: usize,
    },

    /// See [`set_vernacular`].
    SetVernacular {
        /// Target word.
        word_id: WordId,
        /// New vernacular form.
        vernacular: String,
    },

    /// See [`flag_word`].
    FlagWord {
        /// Target word.
        word_id: WordId,
        /// New flag.
        flag: Flag,
    },

    /// See [`delete_sense`].
    DeleteSense {
        /// Group or duplicate to delete.
        src: MergeTreeReference,
    },

    /// See [`set_sidebar`].
    SetSidebar {
        /// Replacement sidebar; `None` clears it.
        #[serde(default)]
        sidebar: Option<Sidebar>,
    },

    /// See [`stage_sense`].
    StageSense {
        /// Group or duplicate to stage.
        src: MergeTreeReference,
    },

    /// See [`unstage_sense`].
    UnstageSense {
        /// Index into the sidebar.
        index: usize,
        /// Where the staged sense goes.
        destination: Destination,
    },

    /// See [`restore_sidebar`].
    RestoreSidebar,
}

impl MergeAction {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CombineSense { .. } => "combine_sense",
            Self::MoveSense { .. } => "move_sense",
            Self::OrderSense { .. } => "order_sense",
            Self::OrderDuplicate { .. } => "order_duplicate",
            Self::SetVernacular { .. } => "set_vernacular",
            Self::FlagWord { .. } => "flag_word",
            Self::DeleteSense { .. } => "delete_sense",
            Self::SetSidebar { .. } => "set_sidebar",
            Self::StageSense { .. } => "stage_sense",
            Self::UnstageSense { .. } => "unstage_sense",
            Self::RestoreSidebar => "restore_sidebar",
        }
    }
}

/// Apply one action.
pub fn apply(registry: &Registry, workspace: &Workspace, action: &MergeAction) -> MergeResult<Workspace> {
    let result = match action {
        MergeAction::CombineSense { src, dest } => combine_sense(registry, workspace, src, dest),
        MergeAction::MoveSense {
            src,
            dest_word,
            dest_order,
        } => move_sense(registry, workspace, src, dest_word, *dest_order),
        MergeAction::OrderSense { src, order } => order_sense(registry, workspace, src, *order),
        MergeAction::OrderDuplicate { src, order } => order_duplicate(registry, workspace, src, *order),
        MergeAction::SetVernacular { word_id, vernacular } => {
            set_vernacular(registry, workspace, word_id, vernacular)
        }
        MergeAction::FlagWord { word_id, flag } => flag_word(registry, workspace, word_id, flag.clone()),
        MergeAction::DeleteSense { src } => delete_sense(registry, workspace, src),
        MergeAction::SetSidebar { sidebar } => set_sidebar(registry, workspace, sidebar.clone()),
        MergeAction::StageSense { src } => stage_sense(registry, workspace, src),
        MergeAction::UnstageSense { index, destination } => {
            unstage_sense(registry, workspace, *index, destination)
        }
        MergeAction::RestoreSidebar => restore_sidebar(registry, workspace),
    };

    match &result {
        Ok(_) => tracing::debug!(op = action.name(), "applied merge action"),
        Err(e) => tracing::debug!(op = action.name(), error = %e, "rejected merge action"),
    }
    result
}

/// Post-condition shared by every operation.
fn finish(registry: &Registry, mut workspace: Workspace) -> MergeResult<Workspace> {
    refresh_audio_counts(registry, &mut workspace);
    check_invariants(registry, &workspace)?;
    Ok(workspace)
}
