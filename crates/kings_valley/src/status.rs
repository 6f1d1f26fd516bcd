//! Game lifecycle status.

use serde::{Deserialize, Serialize};

/// Lifecycle of a game room.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameStatus {
    /// Created, waiting for a second player.
    Waiting,
    /// Both players seated; moves are accepted.
    InProgress,
    /// A king reached the center.
    Finished,
}

impl GameStatus {
    /// Whether the game can no longer change.
    pub fn is_terminal(self) -> bool {
        self == GameStatus::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn snake_case_everywhere() {
        assert_eq!(GameStatus::InProgress.to_string(), "in_progress");
        assert_eq!(GameStatus::from_str("waiting").unwrap(), GameStatus::Waiting);
        assert_eq!(
            serde_json::to_string(&GameStatus::Finished).unwrap(),
            "\"finished\""
        );
        assert!(GameStatus::Finished.is_terminal());
        assert!(!GameStatus::InProgress.is_terminal());
    }
}
