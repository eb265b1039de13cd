//! Per-viewer projections of a match.
//!
//! A view is what one seat is allowed to see: its own hand and role, every
//! public zone, and nothing of other players' hands.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{
    catalog::CardKind,
    characters::{Ability, Character},
    entities::{Card, Player, PlayerId, Role, SeatIndex},
    state::{Match, MatchId, Outcome, Phase, Reaction, ReactionKind},
};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub seat: SeatIndex,
    pub character: Character,
    /// Rules text of the character's ability.
    pub ability: String,
    pub health: u8,
    pub max_health: u8,
    pub alive: bool,
    pub connected: bool,
    pub hand_size: usize,
    /// Only present in the owner's own view.
    pub hand: Option<Vec<Card>>,
    /// Hidden unless sheriff, dead, the viewer, or the match is over.
    pub role: Option<Role>,
    /// Win condition, revealed together with the role.
    pub objective: Option<String>,
    pub in_play: Vec<Card>,
    pub weapon: Option<Card>,
}

impl PlayerView {
    fn project(player: &Player, viewer: Option<&PlayerId>, over: bool) -> Self {
        let own = viewer == Some(&player.id);
        let role_public = own || over || !player.alive || player.is_sheriff();
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            seat: player.seat,
            character: player.character,
            ability: player.character.description().to_string(),
            health: player.health,
            max_health: player.max_health,
            alive: player.alive,
            connected: player.connected,
            hand_size: player.hand.len(),
            hand: own.then(|| player.hand.clone()),
            role: role_public.then_some(player.role),
            objective: role_public.then(|| player.role.objective().to_string()),
            in_play: player.in_play.clone(),
            weapon: player.weapon,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ReactionView {
    pub kind: ReactionKind,
    pub source: PlayerId,
    pub queue: Vec<PlayerId>,
    pub required: u8,
    /// The card each responder has to produce.
    pub answer: CardKind,
}

impl From<&Reaction> for ReactionView {
    fn from(value: &Reaction) -> Self {
        Self {
            kind: value.kind,
            source: value.source.clone(),
            queue: value.queue.iter().cloned().collect(),
            required: value.required,
            answer: value.kind.required_card(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MarketView {
    pub cards: Vec<Card>,
    pub queue: Vec<PlayerId>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MatchView {
    pub match_id: MatchId,
    pub phase: Phase,
    pub current_player: Option<PlayerId>,
    pub players: Vec<PlayerView>,
    pub draw_pile_size: usize,
    pub discard_pile_size: usize,
    pub top_discard: Option<Card>,
    pub reaction: Option<ReactionView>,
    pub market: Option<MarketView>,
    /// Kit Carlson's pending choice, shown to him alone.
    pub draw_choice: Option<Vec<Card>>,
    pub outcome: Option<Outcome>,
}

impl MatchView {
    /// Projects `m` for `viewer`. `None` is a spectator who sees only
    /// public information.
    #[must_use]
    pub fn for_viewer(m: &Match, viewer: Option<&PlayerId>) -> Self {
        let over = m.is_over();
        let current = m.current_player().map(|p| p.id.clone());
        let owns_choice = viewer.is_some() && viewer == current.as_ref();
        let draw_choice = (owns_choice && !m.draw_choice.is_empty()).then(|| m.draw_choice.clone());
        Self {
            match_id: m.id,
            phase: m.phase,
            current_player: current,
            players: m
                .players
                .iter()
                .map(|p| PlayerView::project(p, viewer, over))
                .collect(),
            draw_pile_size: m.draw_pile.len(),
            discard_pile_size: m.discard_pile.len(),
            top_discard: m.discard_pile.last().copied(),
            reaction: m.reaction.as_ref().map(ReactionView::from),
            market: m.market.as_ref().map(|market| MarketView {
                cards: market.cards.clone(),
                queue: market.queue.iter().cloned().collect(),
            }),
            draw_choice,
            outcome: m.outcome.clone(),
        }
    }

    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// Who the match is waiting on: the reaction head, the next store
    /// picker, or the player whose turn it is.
    #[must_use]
    pub fn awaiting(&self) -> Option<&PlayerId> {
        match self.phase {
            Phase::Reaction => self.reaction.as_ref().and_then(|r| r.queue.first()),
            Phase::Market => self.market.as_ref().and_then(|m| m.queue.first()),
            Phase::Draw | Phase::ChooseDraw | Phase::Play | Phase::Discard => {
                self.current_player.as_ref()
            }
            Phase::WaitingForPlayers | Phase::Starting | Phase::GameOver => None,
        }
    }
}

pub type MatchViews = HashMap<PlayerId, MatchView>;

impl Match {
    #[must_use]
    pub fn view_for(&self, viewer: Option<&PlayerId>) -> MatchView {
        MatchView::for_viewer(self, viewer)
    }

    /// One view per seated player.
    #[must_use]
    pub fn views(&self) -> MatchViews {
        self.players
            .iter()
            .map(|p| (p.id.clone(), MatchView::for_viewer(self, Some(&p.id))))
            .collect()
    }
}
