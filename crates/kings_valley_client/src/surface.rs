//! User-visible error banner and terminal outcome.

use crate::error::{ApiError, ApiErrorKind};
use derive_more::Display;
use kings_valley::PlayerNumber;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

/// Banner shown when the service rejects a move.
pub const INVALID_MOVE_MESSAGE: &str = "Invalid move. Please try a different move.";
/// Banner shown when a move could not be submitted.
pub const MOVE_FAILED_MESSAGE: &str = "Failed to make move. Please try again.";
/// Lobby message when creating a room fails.
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create game. Please try again.";
/// Lobby message when the room is missing or already started.
pub const ROOM_NOT_FOUND_MESSAGE: &str = "Game room not found or already started.";
/// Lobby message when the room already has two players.
pub const ROOM_FULL_MESSAGE: &str = "Game room is full.";
/// Lobby message for any other join failure.
pub const JOIN_FAILED_MESSAGE: &str = "Failed to join game. Please try again.";

/// Banner text for a failed move.
pub fn move_failure_message(err: &ApiError) -> &'static str {
    match err.kind {
        ApiErrorKind::InvalidMove => INVALID_MOVE_MESSAGE,
        _ => MOVE_FAILED_MESSAGE,
    }
}

/// Lobby text for a failed join.
pub fn join_failure_message(err: &ApiError) -> &'static str {
    match err.kind {
        ApiErrorKind::NotFound => ROOM_NOT_FOUND_MESSAGE,
        ApiErrorKind::RoomFull => ROOM_FULL_MESSAGE,
        _ => JOIN_FAILED_MESSAGE,
    }
}

/// How the game ended for the local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Outcome {
    /// The local player's king reached the valley.
    #[display("Congratulations! You won!")]
    Victory,
    /// The opponent won.
    #[display("Better luck next time!")]
    Defeat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Banner {
    message: String,
    expires_at: Instant,
}

/// Latest error banner and the sticky winner of a session.
#[derive(Debug, Clone)]
pub struct Surface {
    ttl: Duration,
    banner: Option<Banner>,
    winner: Option<PlayerNumber>,
}

impl Surface {
    /// Creates an empty surface whose banners live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            banner: None,
            winner: None,
        }
    }

    /// Shows `message`, replacing any banner and restarting the countdown.
    #[instrument(skip(self))]
    pub fn set_error(&mut self, message: &str, now: Instant) {
        info!("Showing error banner");
        self.banner = Some(Banner {
            message: message.to_string(),
            expires_at: now + self.ttl,
        });
    }

    /// Hides the banner.
    pub fn clear_error(&mut self) {
        if self.banner.take().is_some() {
            debug!("Error banner cleared");
        }
    }

    /// Hides the banner if its countdown has run out. Returns whether it did.
    pub fn expire(&mut self, now: Instant) -> bool {
        match &self.banner {
            Some(banner) if banner.expires_at <= now => {
                debug!(message = %banner.message, "Error banner expired");
                self.banner = None;
                true
            }
            _ => false,
        }
    }

    /// When the current banner expires.
    pub fn deadline(&self) -> Option<Instant> {
        self.banner.as_ref().map(|b| b.expires_at)
    }

    /// The banner text, if one is showing.
    pub fn error(&self) -> Option<&str> {
        self.banner.as_ref().map(|b| b.message.as_str())
    }

    /// Records the winner. Only the first report counts; returns whether
    /// this call surfaced it.
    #[instrument(skip(self))]
    pub fn record_winner(&mut self, winner: PlayerNumber) -> bool {
        if self.winner.is_some() {
            return false;
        }
        info!("Winner surfaced");
        self.winner = Some(winner);
        true
    }

    /// The winner, once known.
    pub fn winner(&self) -> Option<PlayerNumber> {
        self.winner
    }

    /// The result from `me`'s point of view.
    pub fn outcome_for(&self, me: PlayerNumber) -> Option<Outcome> {
        self.winner.map(|winner| {
            if winner == me {
                Outcome::Victory
            } else {
                Outcome::Defeat
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_expires_after_ttl() {
        let start = Instant::now();
        let mut surface = Surface::new(Duration::from_secs(3));
        surface.set_error(INVALID_MOVE_MESSAGE, start);

        assert!(!surface.expire(start + Duration::from_millis(2_999)));
        assert_eq!(surface.error(), Some(INVALID_MOVE_MESSAGE));
        assert!(surface.expire(start + Duration::from_secs(3)));
        assert_eq!(surface.error(), None);
    }

    #[test]
    fn new_error_restarts_countdown() {
        let start = Instant::now();
        let mut surface = Surface::new(Duration::from_secs(3));
        surface.set_error(INVALID_MOVE_MESSAGE, start);
        surface.set_error(MOVE_FAILED_MESSAGE, start + Duration::from_secs(2));

        assert_eq!(surface.deadline(), Some(start + Duration::from_secs(5)));
        assert!(!surface.expire(start + Duration::from_secs(4)));
        assert_eq!(surface.error(), Some(MOVE_FAILED_MESSAGE));
    }

    #[test]
    fn winner_is_sticky() {
        let mut surface = Surface::new(Duration::from_secs(3));
        assert!(surface.record_winner(PlayerNumber::Two));
        assert!(!surface.record_winner(PlayerNumber::Two));
        assert!(!surface.record_winner(PlayerNumber::One));
        assert_eq!(surface.winner(), Some(PlayerNumber::Two));
        assert_eq!(surface.outcome_for(PlayerNumber::Two), Some(Outcome::Victory));
        assert_eq!(surface.outcome_for(PlayerNumber::One), Some(Outcome::Defeat));
    }

    #[test]
    fn messages_follow_error_kind() {
        let invalid = ApiError::new(ApiErrorKind::InvalidMove, "HTTP 400");
        let offline = ApiError::network("connection refused");
        assert_eq!(move_failure_message(&invalid), INVALID_MOVE_MESSAGE);
        assert_eq!(move_failure_message(&offline), MOVE_FAILED_MESSAGE);

        let full = ApiError::new(ApiErrorKind::RoomFull, "HTTP 400");
        let missing = ApiError::new(ApiErrorKind::NotFound, "HTTP 404");
        assert_eq!(join_failure_message(&full), ROOM_FULL_MESSAGE);
        assert_eq!(join_failure_message(&missing), ROOM_NOT_FOUND_MESSAGE);
        assert_eq!(join_failure_message(&offline), JOIN_FAILED_MESSAGE);
    }
}
