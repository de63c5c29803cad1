//! Problem domain model.
//!
//! # Responsibility
//! - Define the canonical record managed by the problem store.
//! - Provide lifecycle helpers for trash (soft delete) semantics.
//!
//! # Invariants
//! - `pid` is stable and never reused for another problem.
//! - `trashed` is the source of truth for trash-can membership.
//! - A trashed problem keeps its last `ordinal`, so restoring it puts it
//!   back at the original relative position.

use serde::{Deserialize, Serialize};

/// Stable identifier for every stored problem.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
/// Storage assigns these as positive, monotonically increasing integers.
pub type ProblemId = i64;

/// Direction for single-step reordering of active problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    /// Towards the front of the list (smaller ordinal).
    Up,
    /// Towards the back of the list (larger ordinal).
    Down,
}

/// Canonical domain record for one math problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Stable row id assigned by storage.
    pub pid: ProblemId,
    /// Source markup. May embed math notation; stored verbatim.
    pub content: String,
    /// Position within the active ordering. Unique among active problems.
    pub ordinal: i64,
    /// Trash-can membership flag.
    pub trashed: bool,
    /// Epoch milliseconds of the most recent trash action, when trashed.
    pub trashed_at: Option<i64>,
}

impl Problem {
    /// Marks this problem as trashed at the given timestamp.
    pub fn move_to_trash(&mut self, at_epoch_ms: i64) {
        self.trashed = true;
        self.trashed_at = Some(at_epoch_ms);
    }

    /// Clears the trash flag and timestamp.
    pub fn restore(&mut self) {
        self.trashed = false;
        self.trashed_at = None;
    }

    /// Returns whether this problem is visible in normal views.
    pub fn is_active(&self) -> bool {
        !self.trashed
    }
}
