//! Folds fetched snapshots into the session.
//!
//! Fetches are numbered when issued. A response is applied only if it was
//! issued after the one last applied, so a slow poll can never overwrite the
//! state fetched right after a move.

use crate::selection::Selection;
use crate::surface::Surface;
use kings_valley::{GameSnapshot, GameStatus, PlayerNumber};
use tracing::{debug, info, instrument};

/// Issue order of a fetch within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchSeq(u64);

/// Result of offering a snapshot to the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// A newer response was already applied; the snapshot was dropped.
    Stale,
    /// The snapshot belongs to another game and was dropped.
    ForeignGame,
    /// The snapshot replaced the previous one.
    Applied {
        /// Winner surfaced by this snapshot, reported only the first time.
        winner_surfaced: Option<PlayerNumber>,
        /// Whether the game has reached its terminal status.
        terminal: bool,
    },
}

/// Sequence bookkeeping for one session.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    next: u64,
    applied: Option<FetchSeq>,
}

impl Reconciler {
    /// Creates a reconciler for a fresh session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Numbers a fetch that is about to be issued.
    pub fn issue(&mut self) -> FetchSeq {
        let seq = FetchSeq(self.next);
        self.next += 1;
        seq
    }

    /// Swaps `incoming` in for `current` unless it is stale.
    ///
    /// Leaving `in_progress` drops any selection, and a winner seen for the
    /// first time is recorded on the surface.
    #[instrument(skip_all, fields(seq = seq.0, status = %incoming.status()))]
    pub fn reconcile(
        &mut self,
        seq: FetchSeq,
        incoming: GameSnapshot,
        current: &mut GameSnapshot,
        selection: &mut Selection,
        surface: &mut Surface,
    ) -> Reconciliation {
        if incoming.id() != current.id() {
            debug!(incoming = %incoming.id(), current = %current.id(), "Snapshot for another game dropped");
            return Reconciliation::ForeignGame;
        }
        if self.applied.is_some_and(|applied| seq <= applied) {
            debug!(applied = ?self.applied, "Stale snapshot dropped");
            return Reconciliation::Stale;
        }
        self.applied = Some(seq);

        if *incoming.status() != GameStatus::InProgress && *selection != Selection::Idle {
            debug!("Game not in progress, dropping selection");
            selection.reset();
        }

        let winner_surfaced = (*incoming.winner()).filter(|winner| surface.record_winner(*winner));
        let terminal = incoming.status().is_terminal();

        if incoming.status() != current.status() {
            info!(from = %current.status(), to = %incoming.status(), "Game status changed");
        }
        *current = incoming;

        Reconciliation::Applied {
            winner_surfaced,
            terminal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kings_valley::{Board, Cell, GameId, PlayerId, PlayerSummary};
    use std::time::Duration;

    fn game(id: &str, status: GameStatus, current: PlayerNumber, winner: Option<PlayerNumber>) -> GameSnapshot {
        GameSnapshot::new(
            GameId::from(id),
            "ROOM01".to_string(),
            status,
            vec![
                PlayerSummary::new(PlayerId::from("a"), "A", PlayerNumber::One),
                PlayerSummary::new(PlayerId::from("b"), "B", PlayerNumber::Two),
            ],
            Board::opening(),
            current,
            winner,
            Vec::new(),
        )
        .unwrap()
    }

    struct Fixture {
        reconciler: Reconciler,
        current: GameSnapshot,
        selection: Selection,
        surface: Surface,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                reconciler: Reconciler::new(),
                current: game("g", GameStatus::InProgress, PlayerNumber::One, None),
                selection: Selection::Idle,
                surface: Surface::new(Duration::from_secs(3)),
            }
        }

        fn offer(&mut self, seq: FetchSeq, incoming: GameSnapshot) -> Reconciliation {
            self.reconciler.reconcile(
                seq,
                incoming,
                &mut self.current,
                &mut self.selection,
                &mut self.surface,
            )
        }
    }

    #[test]
    fn older_response_loses_to_newer() {
        let mut fx = Fixture::new();
        let poll = fx.reconciler.issue();
        let after_move = fx.reconciler.issue();

        let fresh = game("g", GameStatus::InProgress, PlayerNumber::Two, None);
        assert!(matches!(fx.offer(after_move, fresh.clone()), Reconciliation::Applied { .. }));

        let stale = game("g", GameStatus::InProgress, PlayerNumber::One, None);
        assert_eq!(fx.offer(poll, stale), Reconciliation::Stale);
        assert_eq!(fx.current, fresh);
    }

    #[test]
    fn winner_surfaces_once() {
        let mut fx = Fixture::new();
        let finished = game("g", GameStatus::Finished, PlayerNumber::Two, Some(PlayerNumber::Two));

        let first = fx.reconciler.issue();
        assert_eq!(
            fx.offer(first, finished.clone()),
            Reconciliation::Applied {
                winner_surfaced: Some(PlayerNumber::Two),
                terminal: true
            }
        );
        let second = fx.reconciler.issue();
        assert_eq!(
            fx.offer(second, finished),
            Reconciliation::Applied {
                winner_surfaced: None,
                terminal: true
            }
        );
        assert_eq!(fx.surface.winner(), Some(PlayerNumber::Two));
    }

    #[test]
    fn leaving_in_progress_drops_selection() {
        let mut fx = Fixture::new();
        fx.selection = Selection::Selected(Cell::new(4, 0).unwrap());
        let seq = fx.reconciler.issue();
        fx.offer(seq, game("g", GameStatus::Finished, PlayerNumber::One, Some(PlayerNumber::One)));
        assert_eq!(fx.selection, Selection::Idle);
    }

    #[test]
    fn in_progress_keeps_selection() {
        let mut fx = Fixture::new();
        fx.selection = Selection::Selected(Cell::new(4, 0).unwrap());
        let seq = fx.reconciler.issue();
        fx.offer(seq, game("g", GameStatus::InProgress, PlayerNumber::One, None));
        assert_eq!(fx.selection, Selection::Selected(Cell::new(4, 0).unwrap()));
    }

    #[test]
    fn other_game_is_ignored() {
        let mut fx = Fixture::new();
        let seq = fx.reconciler.issue();
        let other = game("h", GameStatus::InProgress, PlayerNumber::Two, None);
        assert_eq!(fx.offer(seq, other), Reconciliation::ForeignGame);

        // The dropped response does not consume its sequence number.
        let own = game("g", GameStatus::InProgress, PlayerNumber::Two, None);
        assert!(matches!(fx.offer(seq, own), Reconciliation::Applied { .. }));
    }
}
