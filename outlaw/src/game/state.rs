//! Match state: the mutable aggregate for one match plus the small queries
//! that keep its invariants (distance, targeting, turn order, draw pile).
//!
//! Rules live in [`super::engine`]; nothing in here decides whether a
//! command is legal.

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashSet, VecDeque},
    fmt,
};

use super::{
    catalog::CardKind,
    constants::{MAX_PLAYERS, MIN_PLAYERS},
    deck::{assign_characters, assign_roles, build_deck},
    entities::{Card, Player, PlayerId, Role, Seat, SeatIndex, Team},
    errors::SetupError,
    events::GameEvent,
};

/// Type alias for match identifiers handed out by the registry.
pub type MatchId = u64;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Phase {
    WaitingForPlayers,
    Starting,
    Draw,
    /// Kit Carlson is choosing which drawn cards to keep.
    ChooseDraw,
    Play,
    Discard,
    Reaction,
    Market,
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::WaitingForPlayers => "waiting for players",
            Self::Starting => "starting",
            Self::Draw => "draw phase",
            Self::ChooseDraw => "draw choice",
            Self::Play => "play phase",
            Self::Discard => "discard phase",
            Self::Reaction => "reaction phase",
            Self::Market => "general store",
            Self::GameOver => "game over",
        };
        write!(f, "{repr}")
    }
}

/// What the players in a reaction queue are answering.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ReactionKind {
    Bang,
    Gatling,
    Indians,
    Duel,
}

impl ReactionKind {
    /// The card each responder has to produce.
    #[must_use]
    pub const fn required_card(self) -> CardKind {
        match self {
            Self::Bang | Self::Gatling => CardKind::Missed,
            Self::Indians | Self::Duel => CardKind::Bang,
        }
    }

    /// Whether a Barrel may answer it.
    #[must_use]
    pub const fn is_shot(self) -> bool {
        matches!(self, Self::Bang | Self::Gatling)
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Bang => CardKind::Bang,
            Self::Gatling => CardKind::Gatling,
            Self::Indians => CardKind::Indians,
            Self::Duel => CardKind::Duel,
        };
        write!(f, "{repr}")
    }
}

/// An in-flight effect waiting on answers.
///
/// The head of `queue` is the only player who may respond. `required` counts
/// the answers the head still owes.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Reaction {
    pub kind: ReactionKind,
    /// Whoever damage is attributed to. In a duel this is the head's opponent.
    pub source: PlayerId,
    pub queue: VecDeque<PlayerId>,
    pub required: u8,
    /// Players whose reactive ability was already tried in this window.
    pub used_abilities: HashSet<PlayerId>,
}

impl Reaction {
    #[must_use]
    pub fn new(
        kind: ReactionKind,
        source: PlayerId,
        queue: VecDeque<PlayerId>,
        required: u8,
    ) -> Self {
        Self {
            kind,
            source,
            queue,
            required,
            used_abilities: HashSet::new(),
        }
    }

    #[must_use]
    pub fn responder(&self) -> Option<&PlayerId> {
        self.queue.front()
    }
}

/// Cards laid out by a General Store and the order players pick them in.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Market {
    pub cards: Vec<Card>,
    pub queue: VecDeque<PlayerId>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Outcome {
    pub team: Team,
    /// Set only when a lone renegade takes the match.
    pub winner: Option<PlayerId>,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.winner {
            Some(winner) => write!(f, "{winner} wins alone as {}", self.team),
            None => write!(f, "{} win", self.team),
        }
    }
}

/// One in-progress game.
#[derive(Debug)]
pub struct Match {
    pub id: MatchId,
    /// Fixed seating order, dead players included.
    pub players: Vec<Player>,
    /// Top of the pile is the end of the vector.
    pub draw_pile: Vec<Card>,
    /// Top of the pile is the end of the vector.
    pub discard_pile: Vec<Card>,
    pub turn: SeatIndex,
    pub phase: Phase,
    pub reaction: Option<Reaction>,
    pub market: Option<Market>,
    /// Cards Kit Carlson is choosing from.
    pub draw_choice: Vec<Card>,
    pub outcome: Option<Outcome>,
    /// Every event the match has emitted, oldest first.
    pub log: Vec<GameEvent>,
    pub(crate) rng: StdRng,
}

impl Match {
    /// Seats a roster, deals roles and characters, and builds the deck.
    /// The match waits in [`Phase::WaitingForPlayers`] until started.
    pub fn new(id: MatchId, roster: Vec<Seat>, mut rng: StdRng) -> Result<Self, SetupError> {
        let num_players = roster.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players) {
            return Err(SetupError::InvalidPlayerCount(num_players));
        }
        let mut seen = HashSet::with_capacity(num_players);
        for seat in &roster {
            if !seen.insert(seat.id.clone()) {
                return Err(SetupError::DuplicatePlayer(seat.id.clone()));
            }
        }

        let roles = assign_roles(num_players, &mut rng)?;
        let characters = assign_characters(num_players, &mut rng)?;
        let draw_pile = build_deck(&mut rng);
        let players = roster
            .into_iter()
            .zip(roles.into_iter().zip(characters))
            .enumerate()
            .map(|(idx, (seat, (role, character)))| Player::new(seat, idx, role, character))
            .collect();

        Ok(Self {
            id,
            players,
            draw_pile,
            discard_pile: Vec::new(),
            turn: 0,
            phase: Phase::WaitingForPlayers,
            reaction: None,
            market: None,
            draw_choice: Vec::new(),
            outcome: None,
            log: Vec::new(),
            rng,
        })
    }

    /// Same as [`Match::new`] with a seeded or OS-seeded RNG.
    pub fn with_seed(id: MatchId, roster: Vec<Seat>, seed: Option<u64>) -> Result<Self, SetupError> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(id, roster, rng)
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    #[must_use]
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.turn)
    }

    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn index_of(&self, id: &PlayerId) -> Option<SeatIndex> {
        self.players.iter().position(|p| &p.id == id)
    }

    /// Living players in seating order.
    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.alive)
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.alive_players().count()
    }

    #[must_use]
    pub fn sheriff(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.role == Role::Sheriff)
    }

    /// Next living seat after `from`, wrapping. `None` when nobody else lives.
    #[must_use]
    pub fn next_alive_after(&self, from: SeatIndex) -> Option<SeatIndex> {
        let n = self.players.len();
        (1..n)
            .map(|offset| (from + offset) % n)
            .find(|&idx| self.players[idx].alive)
    }

    /// Moves the turn pointer to the next living player.
    pub fn advance_turn(&mut self) {
        if let Some(next) = self.next_alive_after(self.turn) {
            self.turn = next;
        }
    }

    /// Living players other than `from`, in seating order starting after it.
    #[must_use]
    pub fn others_in_order(&self, from: SeatIndex) -> VecDeque<PlayerId> {
        let n = self.players.len();
        (1..n)
            .map(|offset| &self.players[(from + offset) % n])
            .filter(|p| p.alive)
            .map(|p| p.id.clone())
            .collect()
    }

    /// Effective distance between two distinct living players, measured
    /// around the living seats only and never below 1.
    #[must_use]
    pub fn distance(&self, from: SeatIndex, to: SeatIndex) -> Option<usize> {
        let alive: Vec<SeatIndex> = self.alive_players().map(|p| p.seat).collect();
        let a = alive.iter().position(|&s| s == from)?;
        let b = alive.iter().position(|&s| s == to)?;
        if a == b {
            return None;
        }
        let clockwise = a.abs_diff(b);
        let base = clockwise.min(alive.len() - clockwise) as i32;
        let adjusted = base
            + self.players[to].incoming_modifier()
            + self.players[from].outgoing_modifier();
        Some(adjusted.max(1) as usize)
    }

    /// Whether `attacker` can reach `target` with their weapon.
    #[must_use]
    pub fn can_target(&self, attacker: SeatIndex, target: SeatIndex) -> bool {
        let Some(player) = self.players.get(attacker) else {
            return false;
        };
        self.distance(attacker, target)
            .is_some_and(|d| d <= usize::from(player.weapon_range()))
    }

    /// Pops the top of the draw pile, reshuffling the discard pile under its
    /// top card when the draw pile runs dry. `None` when both are empty.
    pub fn draw_top_card(&mut self) -> Option<Card> {
        if self.draw_pile.is_empty() {
            self.reshuffle();
        }
        self.draw_pile.pop()
    }

    fn reshuffle(&mut self) {
        let Some(top) = self.discard_pile.pop() else {
            return;
        };
        let mut rest = std::mem::take(&mut self.discard_pile);
        rest.shuffle(&mut self.rng);
        log::debug!("Match {}: reshuffled {} cards", self.id, rest.len());
        self.draw_pile.append(&mut rest);
        self.discard_pile.push(top);
    }

    pub fn discard(&mut self, card: Card) {
        self.discard_pile.push(card);
    }

    /// Every card the match holds, wherever it is.
    #[must_use]
    pub fn card_total(&self) -> usize {
        let held: usize = self.players.iter().map(Player::card_count).sum();
        let market = self.market.as_ref().map_or(0, |m| m.cards.len());
        self.draw_pile.len() + self.discard_pile.len() + held + market + self.draw_choice.len()
    }
}
