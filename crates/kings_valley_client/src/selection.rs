//! Move-selection state machine.
//!
//! Tracks the local player's tentative move origin. A move is only ever
//! submitted from `Selected(from)` on a click at a different cell, and no new
//! selection is possible while a submission is in flight.

use kings_valley::{Cell, GameSnapshot, PlayerNumber};
use tracing::{debug, instrument};

/// Local selection intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// Nothing selected.
    #[default]
    Idle,
    /// A move origin has been chosen.
    Selected(Cell),
    /// A move from `from` to `to` is awaiting the service.
    Submitting {
        /// Origin cell.
        from: Cell,
        /// Destination cell.
        to: Cell,
    },
}

/// What a click did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickEffect {
    /// Click had no effect.
    Ignored,
    /// `cell` became the move origin.
    Selected(Cell),
    /// The origin was clicked again and released.
    Deselected,
    /// A move should be submitted.
    Submit {
        /// Origin cell.
        from: Cell,
        /// Destination cell.
        to: Cell,
    },
}

impl Selection {
    /// Applies a click on `cell`.
    ///
    /// Clicks are no-ops unless the game is in progress and it is `me`'s
    /// turn, and while a move is being submitted.
    #[instrument(skip(self, snapshot), fields(state = ?self))]
    pub fn click(&mut self, cell: Cell, snapshot: &GameSnapshot, me: PlayerNumber) -> ClickEffect {
        if !snapshot.is_interactive_for(me) {
            debug!(status = %snapshot.status(), current = %snapshot.current_player(), "Click ignored: not our turn");
            return ClickEffect::Ignored;
        }

        match *self {
            Selection::Idle if snapshot.board().is_owned_by(cell, me) => {
                *self = Selection::Selected(cell);
                ClickEffect::Selected(cell)
            }
            Selection::Idle => ClickEffect::Ignored,
            Selection::Selected(from) if from == cell => {
                *self = Selection::Idle;
                ClickEffect::Deselected
            }
            Selection::Selected(from) => {
                *self = Selection::Submitting { from, to: cell };
                ClickEffect::Submit { from, to: cell }
            }
            Selection::Submitting { .. } => ClickEffect::Ignored,
        }
    }

    /// Ends a submission, whatever its outcome.
    pub fn settle(&mut self) {
        if self.is_submitting() {
            *self = Selection::Idle;
        }
    }

    /// Drops any selection.
    pub fn reset(&mut self) {
        *self = Selection::Idle;
    }

    /// The highlighted cell, if any.
    pub fn selected(&self) -> Option<Cell> {
        match *self {
            Selection::Selected(cell) => Some(cell),
            Selection::Submitting { from, .. } => Some(from),
            Selection::Idle => None,
        }
    }

    /// Whether a move is in flight.
    pub fn is_submitting(&self) -> bool {
        matches!(self, Selection::Submitting { .. })
    }
}
