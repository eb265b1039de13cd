//! Shared helpers for driving whole matches in integration tests.

#![allow(dead_code)]

use outlaw::game::{
    Command, DrawOptions, GameResult, Match, Phase, PlayerId, Response, Seat,
};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

pub fn roster(n: usize) -> Vec<Seat> {
    (0..n).map(|i| Seat::new(&format!("p{i}"), "player")).collect()
}

pub fn started(n: usize, seed: u64) -> Match {
    let mut m = Match::with_seed(1, roster(n), Some(seed)).unwrap();
    m.start().unwrap();
    m
}

/// Plays whoever the match is waiting on with shuffled but sensible
/// commands. Reads full state, so it is only fit for tests.
pub struct Autoplayer {
    rng: StdRng,
}

impl Autoplayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The seat being waited on and what it could try, best first.
    pub fn candidates(&mut self, m: &Match) -> Option<(PlayerId, Vec<Command>)> {
        let view = m.view_for(None);
        let id = view.awaiting()?.clone();
        let player = m.player(&id)?;
        let mut hand: Vec<_> = player.hand.iter().map(|c| c.id).collect();
        hand.shuffle(&mut self.rng);

        let commands = match m.phase {
            Phase::Draw => vec![Command::Draw(DrawOptions::default())],
            Phase::ChooseDraw => {
                let keep = m.draw_choice.iter().take(2).map(|c| c.id).collect();
                vec![Command::Draw(DrawOptions::keep(keep))]
            }
            Phase::Reaction => {
                let mut commands = vec![Command::UseAbility];
                commands.extend(hand.iter().map(|&c| Command::Respond(Response::Accept(c))));
                commands.push(Command::Respond(Response::Decline));
                commands
            }
            Phase::Market => m
                .market
                .as_ref()
                .and_then(|market| market.cards.first())
                .map(|card| vec![Command::PickMarketCard(card.id)])
                .unwrap_or_default(),
            Phase::Play => {
                let mut others: Vec<PlayerId> = m
                    .alive_players()
                    .filter(|p| p.id != id)
                    .map(|p| p.id.clone())
                    .collect();
                others.shuffle(&mut self.rng);
                let mut commands = Vec::new();
                for &card in &hand {
                    commands.push(Command::play(card));
                    commands.extend(others.iter().map(|t| Command::play_on(card, t.clone())));
                }
                commands.push(Command::Pass);
                commands
            }
            Phase::Discard => hand.iter().map(|&c| Command::Discard(c)).collect(),
            Phase::WaitingForPlayers | Phase::Starting | Phase::GameOver => Vec::new(),
        };
        Some((id, commands))
    }

    /// Applies the first accepted candidate. `None` when nothing is awaited
    /// or every candidate was refused.
    pub fn step(&mut self, m: &mut Match) -> Option<GameResult<Vec<outlaw::GameEvent>>> {
        let (id, commands) = self.candidates(m)?;
        for command in commands {
            let result = m.apply(&id, command);
            if result.is_ok() {
                return Some(result);
            }
        }
        None
    }

    /// Steps until the match ends or `limit` commands were accepted.
    /// Returns the number of accepted commands.
    pub fn play_out(&mut self, m: &mut Match, limit: usize) -> usize {
        let mut accepted = 0;
        while accepted < limit && !m.is_over() {
            match self.step(m) {
                Some(Ok(_)) => accepted += 1,
                _ => break,
            }
        }
        accepted
    }
}
