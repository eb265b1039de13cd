//! Match actor implementation with async message handling.

use super::{
    config::MatchConfig,
    messages::{MatchMessage, MatchNotification, MatchStatus},
};
use crate::game::{
    Command, GameEvent, GameResult, Match, MatchId, MatchView, PlayerId, Seat, SetupError,
};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Match actor handle for sending messages
#[derive(Clone, Debug)]
pub struct MatchHandle {
    sender: mpsc::Sender<MatchMessage>,
    match_id: MatchId,
    notification_capacity: usize,
}

impl MatchHandle {
    /// Create a new match handle
    pub fn new(
        sender: mpsc::Sender<MatchMessage>,
        match_id: MatchId,
        notification_capacity: usize,
    ) -> Self {
        Self {
            sender,
            match_id,
            notification_capacity,
        }
    }

    /// Get match ID
    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    /// Capacity subscribers should give their notification channel
    pub fn notification_capacity(&self) -> usize {
        self.notification_capacity
    }

    /// Whether the actor has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the match
    pub async fn send(&self, message: MatchMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .await
            .map_err(|_| "Match is closed".to_string())
    }
}

/// Match actor owning a single match
pub struct MatchActor {
    /// Match ID
    id: MatchId,

    /// Match state
    state: Match,

    /// Message inbox
    inbox: mpsc::Receiver<MatchMessage>,

    /// Notification subscribers
    subscribers: HashMap<PlayerId, mpsc::Sender<MatchNotification>>,

    /// Commands accepted so far
    commands_accepted: usize,

    /// Is match closed
    is_closed: bool,
}

impl MatchActor {
    /// Seat a roster and create the actor with its handle.
    ///
    /// # Arguments
    ///
    /// * `id` - Match ID
    /// * `roster` - Seats in table order
    /// * `config` - Match configuration
    pub fn new(
        id: MatchId,
        roster: Vec<Seat>,
        config: &MatchConfig,
    ) -> Result<(Self, MatchHandle), SetupError> {
        let state = Match::with_seed(id, roster, config.seed)?;
        let (sender, inbox) = mpsc::channel(config.inbox_capacity);

        let actor = Self {
            id,
            state,
            inbox,
            subscribers: HashMap::new(),
            commands_accepted: 0,
            is_closed: false,
        };
        let handle = MatchHandle::new(sender, id, config.notification_capacity);

        Ok((actor, handle))
    }

    /// Deal and hand the first turn to the sheriff. Call before [`Self::run`].
    pub fn start(&mut self) -> GameResult<Vec<GameEvent>> {
        let events = self.state.start()?;
        self.notify(&events);
        Ok(events)
    }

    /// Run the match actor event loop
    pub async fn run(mut self) {
        log::info!("Match {} running", self.id);

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);
            if self.is_closed {
                break;
            }
        }

        log::info!(
            "Match {} closed after {} commands",
            self.id,
            self.commands_accepted
        );
    }

    /// Handle a match message
    fn handle_message(&mut self, message: MatchMessage) {
        match message {
            MatchMessage::Command {
                player,
                command,
                response,
            } => {
                let result = self.handle_command(&player, command);
                let _ = response.send(result);
            }

            MatchMessage::GetView { viewer, response } => {
                let _ = response.send(self.get_view(viewer.as_ref()));
            }

            MatchMessage::GetStatus { response } => {
                let _ = response.send(self.get_status());
            }

            MatchMessage::Leave { player, response } => {
                let result = self.state.leave(&player);
                if let Ok(true) = result {
                    log::info!("Match {}: every player left", self.id);
                    self.is_closed = true;
                }
                let _ = response.send(result);
            }

            MatchMessage::Subscribe { key, sender } => {
                log::debug!("{} subscribed to match {}", key, self.id);
                self.subscribers.insert(key, sender);
            }

            MatchMessage::Unsubscribe { key } => {
                self.subscribers.remove(&key);
                log::debug!("{} unsubscribed from match {}", key, self.id);
            }

            MatchMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    fn handle_command(&mut self, player: &PlayerId, command: Command) -> GameResult<Vec<GameEvent>> {
        let events = self.state.apply(player, command)?;
        self.commands_accepted += 1;
        self.notify(&events);
        Ok(events)
    }

    fn get_view(&self, viewer: Option<&PlayerId>) -> MatchView {
        self.state.view_for(viewer)
    }

    fn get_status(&self) -> MatchStatus {
        MatchStatus {
            match_id: self.id,
            phase: self.state.phase,
            player_count: self.state.players.len(),
            alive_count: self.state.alive_count(),
            current_player: self.state.current_player().map(|p| p.id.clone()),
            commands_accepted: self.commands_accepted,
            outcome: self.state.outcome.clone(),
        }
    }

    /// Broadcast accepted events to all subscribers
    fn notify(&mut self, events: &[GameEvent]) {
        if self.subscribers.is_empty() {
            return;
        }
        let notification = MatchNotification {
            match_id: self.id,
            events: events.to_vec(),
            phase: self.state.phase,
            at: Utc::now(),
        };
        let match_id = self.id;
        self.subscribers.retain(|key, sender| {
            match sender.try_send(notification.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "Match {match_id}: subscriber {key} channel full, dropping notification"
                    );
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Match {match_id}: subscriber {key} disconnected, removing");
                    false
                }
            }
        });
    }
}
