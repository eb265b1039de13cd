//! Match actor message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::game::{Command, GameEvent, GameResult, MatchId, MatchView, Outcome, Phase, PlayerId};

/// Messages that can be sent to a MatchActor
#[derive(Debug)]
pub enum MatchMessage {
    /// Player command
    Command {
        player: PlayerId,
        command: Command,
        response: oneshot::Sender<GameResult<Vec<GameEvent>>>,
    },

    /// Projection for one viewer, or a spectator when `None`
    GetView {
        viewer: Option<PlayerId>,
        response: oneshot::Sender<MatchView>,
    },

    /// Get current match status
    GetStatus {
        response: oneshot::Sender<MatchStatus>,
    },

    /// Player walks away. Answers whether every seat has now left.
    Leave {
        player: PlayerId,
        response: oneshot::Sender<GameResult<bool>>,
    },

    /// Subscribe to match notifications
    Subscribe {
        key: PlayerId,
        sender: mpsc::Sender<MatchNotification>,
    },

    /// Unsubscribe from match notifications
    Unsubscribe { key: PlayerId },

    /// Close match
    Close { response: oneshot::Sender<()> },
}

/// Notification sent for every accepted command
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchNotification {
    pub match_id: MatchId,
    pub events: Vec<GameEvent>,
    /// Phase after the command resolved
    pub phase: Phase,
    pub at: DateTime<Utc>,
}

/// Match status response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MatchStatus {
    pub match_id: MatchId,
    pub phase: Phase,
    pub player_count: usize,
    pub alive_count: usize,
    pub current_player: Option<PlayerId>,
    /// Commands accepted since the match started
    pub commands_accepted: usize,
    pub outcome: Option<Outcome>,
}

impl MatchStatus {
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }
}
