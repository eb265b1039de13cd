//! Drives one match through the registry until it ends or hits the cap.

use crate::bot::Bot;
use anyhow::{Context, bail};
use chrono::Utc;
use outlaw::{
    GameEvent, MatchId, PlayerId,
    game::Team,
    table::{MatchManager, TableError},
};
use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Key the narrator subscribes under; never a seated player.
const NARRATOR: &str = "narrator";

/// Summary printed for every simulated match.
#[derive(Debug, Serialize)]
pub struct MatchReport {
    pub match_id: MatchId,
    pub finished: bool,
    pub team: Option<Team>,
    /// Lone winner when the renegade takes the match.
    pub winner: Option<PlayerId>,
    pub survivors: Vec<PlayerId>,
    pub commands: usize,
    pub rejected: usize,
    pub turns: usize,
    pub notifications: usize,
    pub elapsed_ms: i64,
}

/// Everything a driver needs besides the registry.
pub struct Drive {
    pub match_id: MatchId,
    pub players: Vec<PlayerId>,
    pub seed: Option<u64>,
    pub max_commands: usize,
    pub shutdown: Arc<AtomicBool>,
}

/// Play a match to completion with one bot per seat.
///
/// # Arguments
///
/// * `manager` - Registry owning the match
/// * `drive` - Match to drive and its limits
///
/// # Returns
///
/// * `anyhow::Result<MatchReport>` - Outcome, or the registry failure that stopped it
pub async fn drive(manager: MatchManager, drive: Drive) -> anyhow::Result<MatchReport> {
    let Drive {
        match_id,
        players,
        seed,
        max_commands,
        shutdown,
    } = drive;
    let started = Utc::now();
    let mut bot = Bot::new(seed);

    let mut feed = manager
        .subscribe(match_id, PlayerId::new(NARRATOR))
        .await
        .context("subscribing narrator")?;
    let narrator = tokio::spawn(async move {
        let mut seen = 0usize;
        while let Some(notification) = feed.recv().await {
            seen += 1;
            for event in &notification.events {
                log::debug!("Match {}: {event}", notification.match_id);
            }
        }
        seen
    });

    let mut commands = 0;
    let mut rejected = 0;
    let mut turns = 1;

    while commands < max_commands && !shutdown.load(Ordering::Relaxed) {
        let public = manager.get_view(match_id, None).await?;
        if public.outcome.is_some() {
            break;
        }
        let Some(seat) = public.awaiting().cloned() else {
            bail!("match {match_id} waits on nobody in {}", public.phase);
        };

        let view = manager.get_view(match_id, Some(seat.clone())).await?;
        let mut accepted = false;
        for command in bot.candidates(&view, &seat) {
            match manager.send_command(match_id, seat.clone(), command).await {
                Ok(events) => {
                    turns += events
                        .iter()
                        .filter(|e| matches!(e, GameEvent::TurnStarted { .. }))
                        .count();
                    accepted = true;
                    break;
                }
                Err(TableError::Action(err)) => {
                    log::trace!("Match {match_id}: {seat} refused: {err}");
                    rejected += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
        if !accepted {
            bail!("match {match_id}: no legal command for {seat} in {}", view.phase);
        }
        commands += 1;
    }

    let last = manager.get_view(match_id, None).await?;
    let finished = last.outcome.is_some();
    if !finished {
        log::warn!("Match {match_id} stopped unfinished after {commands} commands");
    }

    for player in &players {
        manager.leave(match_id, player.clone()).await?;
    }
    // The actor is gone once every seat has left, which ends the feed.
    let notifications = narrator.await.unwrap_or_default();

    Ok(MatchReport {
        match_id,
        finished,
        team: last.outcome.as_ref().map(|o| o.team),
        winner: last.outcome.and_then(|o| o.winner),
        survivors: last
            .players
            .iter()
            .filter(|p| p.alive)
            .map(|p| p.id.clone())
            .collect(),
        commands,
        rejected,
        turns,
        notifications,
        elapsed_ms: (Utc::now() - started).num_milliseconds(),
    })
}
