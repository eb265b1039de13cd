//! Match registry for spawning and managing match actors.

use super::{
    actor::{MatchActor, MatchHandle},
    config::MatchConfig,
    errors::{TableError, TableResult},
    messages::{MatchMessage, MatchNotification, MatchStatus},
};
use crate::game::{Command, GameEvent, MatchId, MatchView, PlayerId, Seat};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{RwLock, mpsc, oneshot};

/// Registry of running matches. Never touches match state directly; every
/// request goes through the owning actor's inbox.
#[derive(Clone, Debug)]
pub struct MatchManager {
    /// Active match handles
    matches: Arc<RwLock<HashMap<MatchId, MatchHandle>>>,

    /// Next match ID
    next_match_id: Arc<RwLock<MatchId>>,
}

impl Default for MatchManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchManager {
    pub fn new() -> Self {
        Self {
            matches: Arc::new(RwLock::new(HashMap::new())),
            next_match_id: Arc::new(RwLock::new(1)),
        }
    }

    /// Create, start and spawn a new match
    ///
    /// # Arguments
    ///
    /// * `roster` - Seats in table order
    /// * `config` - Match configuration
    ///
    /// # Returns
    ///
    /// * `TableResult<(MatchId, Vec<GameEvent>)>` - Match ID and its opening events
    pub async fn create_match(
        &self,
        roster: Vec<Seat>,
        config: MatchConfig,
    ) -> TableResult<(MatchId, Vec<GameEvent>)> {
        config.validate().map_err(TableError::InvalidConfig)?;

        let mut next_id = self.next_match_id.write().await;
        let match_id = *next_id;
        *next_id += 1;
        drop(next_id);

        let (mut actor, handle) = MatchActor::new(match_id, roster, &config)?;
        let events = actor.start()?;

        let mut matches = self.matches.write().await;
        matches.insert(match_id, handle);
        drop(matches);

        tokio::spawn(async move {
            actor.run().await;
        });

        log::info!("Created and spawned match {match_id}");

        Ok((match_id, events))
    }

    /// Get a match handle
    pub async fn get_match(&self, match_id: MatchId) -> Option<MatchHandle> {
        let matches = self.matches.read().await;
        matches.get(&match_id).cloned()
    }

    async fn handle(&self, match_id: MatchId) -> TableResult<MatchHandle> {
        self.get_match(match_id)
            .await
            .ok_or(TableError::MatchNotFound(match_id))
    }

    async fn request<T>(
        &self,
        match_id: MatchId,
        message: impl FnOnce(oneshot::Sender<T>) -> MatchMessage,
    ) -> TableResult<T> {
        let handle = self.handle(match_id).await?;
        let (tx, rx) = oneshot::channel();
        handle
            .send(message(tx))
            .await
            .map_err(|_| TableError::MatchClosed(match_id))?;
        rx.await.map_err(|_| TableError::MatchClosed(match_id))
    }

    /// Submit a player command
    ///
    /// # Returns
    ///
    /// * `TableResult<Vec<GameEvent>>` - Events the command produced, or the refusal
    pub async fn send_command(
        &self,
        match_id: MatchId,
        player: PlayerId,
        command: Command,
    ) -> TableResult<Vec<GameEvent>> {
        let result = self
            .request(match_id, |response| MatchMessage::Command {
                player,
                command,
                response,
            })
            .await?;
        Ok(result?)
    }

    /// Projection of a match for one viewer, or a spectator when `None`
    pub async fn get_view(
        &self,
        match_id: MatchId,
        viewer: Option<PlayerId>,
    ) -> TableResult<MatchView> {
        self.request(match_id, |response| MatchMessage::GetView { viewer, response })
            .await
    }

    pub async fn get_status(&self, match_id: MatchId) -> TableResult<MatchStatus> {
        self.request(match_id, |response| MatchMessage::GetStatus { response })
            .await
    }

    /// Subscribe to a match's notifications. The channel is sized from the
    /// match configuration.
    pub async fn subscribe(
        &self,
        match_id: MatchId,
        key: PlayerId,
    ) -> TableResult<mpsc::Receiver<MatchNotification>> {
        let handle = self.handle(match_id).await?;
        let (sender, receiver) = mpsc::channel(handle.notification_capacity());
        handle
            .send(MatchMessage::Subscribe { key, sender })
            .await
            .map_err(|_| TableError::MatchClosed(match_id))?;
        Ok(receiver)
    }

    pub async fn unsubscribe(&self, match_id: MatchId, key: PlayerId) -> TableResult<()> {
        let handle = self.handle(match_id).await?;
        handle
            .send(MatchMessage::Unsubscribe { key })
            .await
            .map_err(|_| TableError::MatchClosed(match_id))
    }

    /// Mark a player as gone. Once every seat has left the match is
    /// removed from the registry.
    ///
    /// # Returns
    ///
    /// * `TableResult<bool>` - Whether the match was closed
    pub async fn leave(&self, match_id: MatchId, player: PlayerId) -> TableResult<bool> {
        let result = self
            .request(match_id, |response| MatchMessage::Leave { player, response })
            .await?;
        let closed = result?;
        if closed {
            let mut matches = self.matches.write().await;
            matches.remove(&match_id);
            drop(matches);
            log::info!("Match {match_id} abandoned");
        }
        Ok(closed)
    }

    /// Close a match and drop it from the registry
    pub async fn close_match(&self, match_id: MatchId) -> TableResult<()> {
        if let Some(handle) = self.get_match(match_id).await {
            let (tx, rx) = oneshot::channel();
            // An actor that already stopped needs no close message.
            if handle.send(MatchMessage::Close { response: tx }).await.is_ok() {
                let _ = rx.await;
            }
        } else {
            return Err(TableError::MatchNotFound(match_id));
        }

        let mut matches = self.matches.write().await;
        matches.remove(&match_id);
        drop(matches);

        log::info!("Closed match {match_id}");

        Ok(())
    }

    /// Close every match that has reached game over.
    ///
    /// # Returns
    ///
    /// * `usize` - Number of matches removed
    pub async fn remove_finished(&self) -> usize {
        let mut removed = 0;
        for match_id in self.list_matches().await {
            let finished = match self.get_status(match_id).await {
                Ok(status) => status.is_over(),
                Err(TableError::MatchClosed(_)) => true,
                Err(_) => false,
            };
            if finished && self.close_match(match_id).await.is_ok() {
                removed += 1;
            }
        }
        removed
    }

    pub async fn active_match_count(&self) -> usize {
        self.matches.read().await.len()
    }

    /// IDs of every registered match, ascending
    pub async fn list_matches(&self) -> Vec<MatchId> {
        let matches = self.matches.read().await;
        let mut ids: Vec<MatchId> = matches.keys().copied().collect();
        drop(matches);
        ids.sort_unstable();
        ids
    }
}
