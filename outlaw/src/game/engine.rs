//! Turn and reaction engine.
//!
//! Every command is validated against the current phase, turn and card
//! ownership before anything moves. Once a command passes validation it
//! cannot fail, so a refused command leaves the match untouched.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use super::{
    catalog::{CardColor, CardKind},
    characters::{Ability, DamageReaction, DrawPlan},
    constants::{DRAW_PHASE_CARDS, DYNAMITE_DAMAGE, KIT_CARLSON_PREVIEW, OUTLAW_BOUNTY},
    entities::{Card, CardId, Player, PlayerId, Role, SeatIndex, Suit, Team},
    errors::{ActionError, GameResult},
    events::{CheckReason, GameEvent},
    state::{Market, Match, Outcome, Phase, Reaction, ReactionKind},
};

/// Where the first card of a draw phase comes from.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum DrawSource {
    #[default]
    Deck,
    /// Jesse Jones drawing from another player's hand.
    Player(PlayerId),
    /// Pedro Ramirez taking the top discard.
    DiscardPile,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DrawOptions {
    pub source: DrawSource,
    /// Cards Kit Carlson keeps out of his preview.
    pub keep: Vec<CardId>,
}

impl DrawOptions {
    #[must_use]
    pub fn from_player(id: PlayerId) -> Self {
        Self {
            source: DrawSource::Player(id),
            keep: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_discard() -> Self {
        Self {
            source: DrawSource::DiscardPile,
            keep: Vec::new(),
        }
    }

    #[must_use]
    pub fn keep(cards: Vec<CardId>) -> Self {
        Self {
            source: DrawSource::Deck,
            keep: cards,
        }
    }
}

/// Answer to a pending reaction.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Response {
    Accept(CardId),
    Decline,
}

/// Everything a seated player can ask the engine to do.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Command {
    Draw(DrawOptions),
    PlayCard {
        card: CardId,
        target: Option<PlayerId>,
        target_card: Option<CardId>,
    },
    Discard(CardId),
    Pass,
    Respond(Response),
    /// Flip for a Barrel, real or innate.
    UseAbility,
    PickMarketCard(CardId),
    /// Sid Ketchum trading two hand cards for a life point.
    DiscardToHeal([CardId; 2]),
}

impl Command {
    #[must_use]
    pub fn play(card: CardId) -> Self {
        Self::PlayCard {
            card,
            target: None,
            target_card: None,
        }
    }

    #[must_use]
    pub fn play_on(card: CardId, target: PlayerId) -> Self {
        Self::PlayCard {
            card,
            target: Some(target),
            target_card: None,
        }
    }
}

/// Where the first card of a draw phase was validated to come from.
enum FirstCard {
    Deck,
    Player(SeatIndex),
    Discard,
}

fn is_heart(card: &Card) -> bool {
    card.suit == Suit::Hearts
}

fn dynamite_spares(card: &Card) -> bool {
    !(card.suit == Suit::Spades && (2..=9).contains(&card.value))
}

impl Match {
    /// Deals opening hands and hands the first turn to the sheriff.
    pub fn start(&mut self) -> GameResult<Vec<GameEvent>> {
        if self.phase != Phase::WaitingForPlayers {
            return Err(ActionError::WrongPhase { phase: self.phase });
        }
        let mark = self.log.len();
        self.phase = Phase::Starting;

        for idx in 0..self.players.len() {
            let hand_size = usize::from(self.players[idx].max_health);
            self.draw_into_hand(idx, hand_size);
        }
        self.turn = self
            .players
            .iter()
            .position(Player::is_sheriff)
            .unwrap_or_default();
        let sheriff = self.players[self.turn].id.clone();
        log::info!(
            "Match {} started with {} players, sheriff {}",
            self.id,
            self.players.len(),
            sheriff
        );
        self.emit(GameEvent::MatchStarted {
            players: self.players.len(),
            sheriff,
        });
        self.begin_turn();
        self.settle();
        Ok(self.events_since(mark))
    }

    /// Validates and resolves one command from `player`.
    pub fn apply(&mut self, player: &PlayerId, command: Command) -> GameResult<Vec<GameEvent>> {
        match self.phase {
            Phase::GameOver => return Err(ActionError::MatchOver),
            Phase::WaitingForPlayers | Phase::Starting => {
                return Err(ActionError::WrongPhase { phase: self.phase });
            }
            _ => {}
        }
        let actor = self
            .index_of(player)
            .ok_or_else(|| ActionError::UnknownPlayer(player.clone()))?;
        if !self.players[actor].alive {
            return Err(ActionError::DeadPlayer(player.clone()));
        }

        let mark = self.log.len();
        log::debug!("Match {}: {player} -> {command:?}", self.id);
        match command {
            Command::Draw(options) => self.draw(actor, &options)?,
            Command::PlayCard {
                card,
                target,
                target_card,
            } => self.play_card(actor, card, target.as_ref(), target_card)?,
            Command::Discard(card) => self.discard_card(actor, card)?,
            Command::Pass => self.pass(actor)?,
            Command::Respond(response) => self.respond(actor, response)?,
            Command::UseAbility => self.use_ability(actor)?,
            Command::PickMarketCard(card) => self.pick_market_card(actor, card)?,
            Command::DiscardToHeal(cards) => self.discard_to_heal(actor, cards)?,
        }
        self.settle();
        Ok(self.events_since(mark))
    }

    /// Marks a seat as gone. Returns whether every seat has now left.
    pub fn leave(&mut self, player: &PlayerId) -> GameResult<bool> {
        let idx = self
            .index_of(player)
            .ok_or_else(|| ActionError::UnknownPlayer(player.clone()))?;
        self.players[idx].connected = false;
        Ok(self.players.iter().all(|p| !p.connected))
    }

    fn emit(&mut self, event: GameEvent) {
        self.log.push(event);
    }

    fn events_since(&self, mark: usize) -> Vec<GameEvent> {
        self.log[mark..].to_vec()
    }

    fn require_turn(&self, actor: SeatIndex, phase: Phase) -> GameResult<()> {
        if self.phase != phase {
            return Err(ActionError::WrongPhase { phase: self.phase });
        }
        if actor != self.turn {
            return Err(ActionError::NotYourTurn);
        }
        Ok(())
    }

    /// Resolves `target` to a living seat other than `actor`.
    fn target_of(&self, actor: SeatIndex, target: Option<&PlayerId>) -> GameResult<SeatIndex> {
        let id = target.ok_or(ActionError::InvalidTarget)?;
        let idx = self
            .index_of(id)
            .ok_or_else(|| ActionError::UnknownPlayer(id.clone()))?;
        if idx == actor {
            return Err(ActionError::InvalidTarget);
        }
        if !self.players[idx].alive {
            return Err(ActionError::DeadPlayer(id.clone()));
        }
        Ok(idx)
    }

    fn reaction_head(&self, actor: SeatIndex) -> GameResult<&Reaction> {
        let reaction = match (&self.reaction, self.phase) {
            (Some(reaction), Phase::Reaction) => reaction,
            _ => return Err(ActionError::WrongPhase { phase: self.phase }),
        };
        if reaction.responder() != Some(&self.players[actor].id) {
            return Err(ActionError::NotResponder);
        }
        Ok(reaction)
    }

    // Draw phase

    fn draw(&mut self, actor: SeatIndex, options: &DrawOptions) -> GameResult<()> {
        match self.phase {
            Phase::Draw | Phase::ChooseDraw => {}
            phase => return Err(ActionError::WrongPhase { phase }),
        }
        if actor != self.turn {
            return Err(ActionError::NotYourTurn);
        }
        if self.phase == Phase::ChooseDraw {
            return self.choose_draw(actor, &options.keep);
        }
        if !options.keep.is_empty() {
            return Err(ActionError::InvalidDrawChoice);
        }

        let plan = self.players[actor].character.draw_plan();
        let first = match (&options.source, plan) {
            (DrawSource::Deck, _) => FirstCard::Deck,
            (DrawSource::Player(id), DrawPlan::FirstFromPlayer) => {
                let from = self.target_of(actor, Some(id))?;
                if self.players[from].hand.is_empty() {
                    return Err(ActionError::InvalidDrawChoice);
                }
                FirstCard::Player(from)
            }
            (DrawSource::DiscardPile, DrawPlan::FirstFromDiscard) => {
                if self.discard_pile.is_empty() {
                    return Err(ActionError::InvalidDrawChoice);
                }
                FirstCard::Discard
            }
            _ => return Err(ActionError::InvalidDrawChoice),
        };

        let id = self.players[actor].id.clone();
        let mut drawn = 0;
        match first {
            FirstCard::Deck => {}
            FirstCard::Player(from) => {
                if let Some(card) = self.take_random_hand_card(from) {
                    self.players[actor].hand.push(card);
                    let from = self.players[from].id.clone();
                    self.emit(GameEvent::CardStolen {
                        player: id.clone(),
                        from,
                    });
                }
            }
            FirstCard::Discard => {
                if let Some(card) = self.discard_pile.pop() {
                    self.players[actor].hand.push(card);
                    drawn += 1;
                }
            }
        }

        match plan {
            DrawPlan::KeepTwoOfThree => {
                for _ in 0..KIT_CARLSON_PREVIEW {
                    if let Some(card) = self.draw_top_card() {
                        self.draw_choice.push(card);
                    }
                }
                if self.draw_choice.len() > DRAW_PHASE_CARDS {
                    self.phase = Phase::ChooseDraw;
                    return Ok(());
                }
                let choice = std::mem::take(&mut self.draw_choice);
                drawn += choice.len();
                self.players[actor].hand.extend(choice);
            }
            DrawPlan::RevealSecond => {
                drawn += self.draw_into_hand(actor, 1);
                if let Some(second) = self.draw_top_card() {
                    self.players[actor].hand.push(second);
                    drawn += 1;
                    let bonus = second.suit.is_red();
                    self.emit(GameEvent::CheckRevealed {
                        player: id.clone(),
                        reason: CheckReason::DrawReveal,
                        cards: vec![second],
                        success: bonus,
                    });
                    if bonus {
                        drawn += self.draw_into_hand(actor, 1);
                    }
                }
            }
            _ => {
                let taken = usize::from(!matches!(first, FirstCard::Deck));
                drawn += self.draw_into_hand(actor, DRAW_PHASE_CARDS - taken);
            }
        }

        self.emit(GameEvent::CardsDrawn {
            player: id,
            count: drawn,
        });
        self.phase = Phase::Play;
        Ok(())
    }

    fn choose_draw(&mut self, actor: SeatIndex, keep: &[CardId]) -> GameResult<()> {
        let unique: HashSet<&CardId> = keep.iter().collect();
        if keep.len() != DRAW_PHASE_CARDS || unique.len() != keep.len() {
            return Err(ActionError::InvalidDrawChoice);
        }
        if !keep
            .iter()
            .all(|id| self.draw_choice.iter().any(|card| card.id == *id))
        {
            return Err(ActionError::InvalidDrawChoice);
        }

        for card in std::mem::take(&mut self.draw_choice) {
            if keep.contains(&card.id) {
                self.players[actor].hand.push(card);
            } else {
                self.draw_pile.push(card);
            }
        }
        let player = self.players[actor].id.clone();
        self.emit(GameEvent::CardsDrawn {
            player,
            count: DRAW_PHASE_CARDS,
        });
        self.phase = Phase::Play;
        Ok(())
    }

    // Play phase

    fn play_card(
        &mut self,
        actor: SeatIndex,
        card_id: CardId,
        target: Option<&PlayerId>,
        target_card: Option<CardId>,
    ) -> GameResult<()> {
        if self.phase == Phase::Reaction {
            return self.respond(actor, Response::Accept(card_id));
        }
        self.require_turn(actor, Phase::Play)?;
        let card = *self.players[actor]
            .hand_card(card_id)
            .ok_or(ActionError::CardNotInHand(card_id))?;

        let character = self.players[actor].character;
        let kind = if card.kind == CardKind::Missed
            && character.substitutes(CardKind::Missed, CardKind::Bang)
        {
            CardKind::Bang
        } else {
            card.kind
        };

        match kind {
            CardKind::Missed => Err(ActionError::WrongPhase { phase: self.phase }),
            CardKind::Bang => {
                let t = self.target_of(actor, target)?;
                if !self.players[actor].can_attack() {
                    return Err(ActionError::AttackLimitReached);
                }
                if !self.can_target(actor, t) {
                    return Err(ActionError::OutOfRange);
                }
                self.play_brown(actor, card, Some(t))?;
                self.players[actor].attacks_this_turn += 1;
                let required = character.defenses_demanded();
                let queue = VecDeque::from([self.players[t].id.clone()]);
                self.open_reaction(ReactionKind::Bang, actor, queue, required);
                Ok(())
            }
            CardKind::Beer => {
                if self.alive_count() <= 2 || !self.players[actor].is_injured() {
                    return Err(ActionError::NoEffect(kind));
                }
                self.play_brown(actor, card, None)?;
                self.heal(actor);
                Ok(())
            }
            CardKind::Saloon => {
                self.play_brown(actor, card, None)?;
                for idx in 0..self.players.len() {
                    if self.players[idx].alive && self.players[idx].is_injured() {
                        self.heal(idx);
                    }
                }
                Ok(())
            }
            CardKind::Stagecoach | CardKind::WellsFargo => {
                self.play_brown(actor, card, None)?;
                let count = self.draw_into_hand(actor, kind.draw_count());
                let player = self.players[actor].id.clone();
                self.emit(GameEvent::CardsDrawn { player, count });
                Ok(())
            }
            CardKind::Panic => {
                let t = self.target_of(actor, target)?;
                if self.distance(actor, t).is_none_or(|d| d > 1) {
                    return Err(ActionError::OutOfRange);
                }
                if self.players[t].card_count() == 0 {
                    return Err(ActionError::NoEffect(kind));
                }
                self.play_brown(actor, card, Some(t))?;
                if let Some(stolen) = self.take_target_card(t, target_card) {
                    self.players[actor].hand.push(stolen);
                    let player = self.players[actor].id.clone();
                    let from = self.players[t].id.clone();
                    self.emit(GameEvent::CardStolen { player, from });
                }
                Ok(())
            }
            CardKind::CatBalou => {
                let t = self.target_of(actor, target)?;
                if self.players[t].card_count() == 0 {
                    return Err(ActionError::NoEffect(kind));
                }
                self.play_brown(actor, card, Some(t))?;
                if let Some(lost) = self.take_target_card(t, target_card) {
                    self.discard(lost);
                    let player = self.players[t].id.clone();
                    self.emit(GameEvent::CardDiscarded { player, card: lost });
                }
                Ok(())
            }
            CardKind::Duel => {
                let t = self.target_of(actor, target)?;
                self.play_brown(actor, card, Some(t))?;
                let queue = VecDeque::from([self.players[t].id.clone()]);
                self.open_reaction(ReactionKind::Duel, actor, queue, 1);
                Ok(())
            }
            CardKind::Gatling | CardKind::Indians => {
                let queue = self.others_in_order(actor);
                if queue.is_empty() {
                    return Err(ActionError::NoEffect(kind));
                }
                let reaction = if kind == CardKind::Gatling {
                    ReactionKind::Gatling
                } else {
                    ReactionKind::Indians
                };
                self.play_brown(actor, card, None)?;
                self.open_reaction(reaction, actor, queue, 1);
                Ok(())
            }
            CardKind::GeneralStore => {
                self.play_brown(actor, card, None)?;
                self.open_market(actor);
                Ok(())
            }
            CardKind::Jail => {
                let t = self.target_of(actor, target)?;
                if self.players[t].is_sheriff() {
                    return Err(ActionError::InvalidTarget);
                }
                if self.players[t].has_in_play(CardKind::Jail) {
                    return Err(ActionError::DuplicateEquipment(kind));
                }
                let card = self.play_blue(actor, card, Some(t))?;
                self.players[t].in_play.push(card);
                Ok(())
            }
            CardKind::Barrel | CardKind::Mustang | CardKind::Scope | CardKind::Dynamite => {
                if self.players[actor].has_in_play(kind) {
                    return Err(ActionError::DuplicateEquipment(kind));
                }
                let card = self.play_blue(actor, card, None)?;
                self.players[actor].in_play.push(card);
                Ok(())
            }
            CardKind::Volcanic
            | CardKind::Schofield
            | CardKind::Remington
            | CardKind::RevCarabine
            | CardKind::Winchester => {
                let card = self.play_blue(actor, card, None)?;
                if let Some(old) = self.players[actor].weapon.replace(card) {
                    self.discard(old);
                    let player = self.players[actor].id.clone();
                    self.emit(GameEvent::CardDiscarded { player, card: old });
                }
                Ok(())
            }
        }
    }

    /// Moves a validated card out of the hand and announces it. This is
    /// the first mutation of every play, so a failure leaves the match
    /// untouched.
    fn play_blue(
        &mut self,
        actor: SeatIndex,
        card: Card,
        target: Option<SeatIndex>,
    ) -> GameResult<Card> {
        let played = self.players[actor]
            .take_from_hand(card.id)
            .ok_or(ActionError::CardNotInHand(card.id))?;
        let player = self.players[actor].id.clone();
        let target = target.map(|t| self.players[t].id.clone());
        self.emit(GameEvent::CardPlayed {
            player,
            card: played,
            target,
        });
        Ok(played)
    }

    fn play_brown(
        &mut self,
        actor: SeatIndex,
        card: Card,
        target: Option<SeatIndex>,
    ) -> GameResult<()> {
        debug_assert_eq!(card.color(), CardColor::Brown);
        let played = self.play_blue(actor, card, target)?;
        self.discard(played);
        Ok(())
    }

    fn discard_card(&mut self, actor: SeatIndex, card_id: CardId) -> GameResult<()> {
        self.require_turn(actor, Phase::Discard)?;
        let card = self.players[actor]
            .take_from_hand(card_id)
            .ok_or(ActionError::CardNotInHand(card_id))?;
        self.discard(card);
        let player = self.players[actor].id.clone();
        self.emit(GameEvent::CardDiscarded { player, card });
        if self.players[actor].hand.len() <= self.players[actor].hand_limit() {
            self.end_turn();
        }
        Ok(())
    }

    fn pass(&mut self, actor: SeatIndex) -> GameResult<()> {
        self.require_turn(actor, Phase::Play)?;
        if self.players[actor].hand.len() > self.players[actor].hand_limit() {
            self.phase = Phase::Discard;
        } else {
            self.end_turn();
        }
        Ok(())
    }

    fn discard_to_heal(&mut self, actor: SeatIndex, cards: [CardId; 2]) -> GameResult<()> {
        let player = &self.players[actor];
        if !player.character.heals_by_discarding() || !player.is_injured() {
            return Err(ActionError::AbilityUnavailable);
        }
        for id in cards {
            if player.hand_card(id).is_none() {
                return Err(ActionError::CardNotInHand(id));
            }
        }
        if cards[0] == cards[1] {
            return Err(ActionError::CardNotInHand(cards[1]));
        }

        for id in cards {
            if let Some(card) = self.players[actor].take_from_hand(id) {
                self.discard(card);
                let player = self.players[actor].id.clone();
                self.emit(GameEvent::CardDiscarded { player, card });
            }
        }
        self.heal(actor);
        if self.phase == Phase::Discard
            && actor == self.turn
            && self.players[actor].hand.len() <= self.players[actor].hand_limit()
        {
            self.end_turn();
        }
        Ok(())
    }

    // Reactions

    fn open_reaction(
        &mut self,
        kind: ReactionKind,
        source: SeatIndex,
        queue: VecDeque<PlayerId>,
        required: u8,
    ) {
        let source = self.players[source].id.clone();
        self.reaction = Some(Reaction::new(kind, source, queue, required));
        self.phase = Phase::Reaction;
    }

    fn close_reaction(&mut self) {
        self.reaction = None;
        if !self.is_over() {
            self.phase = Phase::Play;
        }
    }

    fn respond(&mut self, actor: SeatIndex, response: Response) -> GameResult<()> {
        let reaction = self.reaction_head(actor)?;
        let kind = reaction.kind;
        let source = reaction.source.clone();

        match response {
            Response::Accept(card_id) => {
                let card = *self.players[actor]
                    .hand_card(card_id)
                    .ok_or(ActionError::CardNotInHand(card_id))?;
                if !self.players[actor]
                    .character
                    .substitutes(card.kind, kind.required_card())
                {
                    return Err(ActionError::InvalidResponse(card.kind));
                }
                let played = self.play_blue(actor, card, None)?;
                self.discard(played);
                self.answered();
            }
            Response::Decline => {
                let source = self.index_of(&source);
                self.damage(actor, 1, source);
                if self.is_over() {
                    return Ok(());
                }
                if kind == ReactionKind::Duel {
                    self.close_reaction();
                } else {
                    self.next_responder();
                }
            }
        }
        Ok(())
    }

    fn use_ability(&mut self, actor: SeatIndex) -> GameResult<()> {
        let reaction = self.reaction_head(actor)?;
        let player = &self.players[actor];
        if !reaction.kind.is_shot()
            || !player.has_barrel()
            || reaction.used_abilities.contains(&player.id)
        {
            return Err(ActionError::AbilityUnavailable);
        }

        let id = player.id.clone();
        if let Some(reaction) = self.reaction.as_mut() {
            reaction.used_abilities.insert(id);
        }
        if self.check(actor, CheckReason::Barrel, is_heart) == Some(true) {
            self.answered();
        }
        Ok(())
    }

    /// Counts one answer from the head of the queue.
    fn answered(&mut self) {
        let Some(reaction) = self.reaction.as_mut() else {
            return;
        };
        reaction.required = reaction.required.saturating_sub(1);
        if reaction.required > 0 {
            return;
        }
        if reaction.kind == ReactionKind::Duel {
            // The duel turns around: the old source now owes a Bang.
            if let Some(responder) = reaction.queue.pop_front() {
                let source = std::mem::replace(&mut reaction.source, responder);
                reaction.queue.push_back(source);
                reaction.required = 1;
            }
            return;
        }
        self.next_responder();
    }

    fn next_responder(&mut self) {
        let Some(reaction) = self.reaction.as_mut() else {
            return;
        };
        reaction.queue.pop_front();
        reaction.required = 1;
        while let Some(head) = reaction.queue.front() {
            if self.players.iter().any(|p| &p.id == head && p.alive) {
                break;
            }
            reaction.queue.pop_front();
        }
        if reaction.queue.is_empty() {
            self.close_reaction();
        }
    }

    // General store

    fn open_market(&mut self, actor: SeatIndex) {
        let mut cards = Vec::with_capacity(self.alive_count());
        for _ in 0..self.alive_count() {
            if let Some(card) = self.draw_top_card() {
                cards.push(card);
            }
        }
        if cards.is_empty() {
            return;
        }
        let mut queue = VecDeque::from([self.players[actor].id.clone()]);
        queue.extend(self.others_in_order(actor));
        self.emit(GameEvent::MarketOpened {
            cards: cards.clone(),
        });
        self.market = Some(Market { cards, queue });
        self.phase = Phase::Market;
    }

    fn pick_market_card(&mut self, actor: SeatIndex, card_id: CardId) -> GameResult<()> {
        let market = match (&self.market, self.phase) {
            (Some(market), Phase::Market) => market,
            _ => return Err(ActionError::WrongPhase { phase: self.phase }),
        };
        let id = self.players[actor].id.clone();
        if market.queue.front() != Some(&id) {
            return Err(ActionError::NotYourTurn);
        }
        let pos = market
            .cards
            .iter()
            .position(|card| card.id == card_id)
            .ok_or(ActionError::MarketCardUnavailable(card_id))?;

        let Some(market) = self.market.as_mut() else {
            return Ok(());
        };
        let card = market.cards.remove(pos);
        market.queue.pop_front();
        while let Some(head) = market.queue.front() {
            if self.players.iter().any(|p| &p.id == head && p.alive) {
                break;
            }
            market.queue.pop_front();
        }
        let finished = market.queue.is_empty() || market.cards.is_empty();

        self.players[actor].hand.push(card);
        self.emit(GameEvent::MarketCardPicked { player: id, card });
        if finished {
            self.close_market();
        }
        Ok(())
    }

    fn close_market(&mut self) {
        if let Some(market) = self.market.take() {
            self.discard_pile.extend(market.cards);
        }
        if !self.is_over() {
            self.phase = Phase::Play;
        }
    }

    // Turn flow

    fn end_turn(&mut self) {
        let current = self.turn;
        self.players[current].reset_turn();
        self.advance_turn();
        self.begin_turn();
    }

    /// Runs turn-start checks for the player at the turn pointer, moving on
    /// for as long as players are jailed or blown up.
    fn begin_turn(&mut self) {
        loop {
            if self.is_over() {
                return;
            }
            let idx = self.turn;
            let id = self.players[idx].id.clone();
            self.phase = Phase::Draw;
            log::debug!("Match {}: turn passes to {id}", self.id);
            self.emit(GameEvent::TurnStarted { player: id.clone() });

            if self.players[idx].has_in_play(CardKind::Dynamite) {
                if let Some(safe) = self.check(idx, CheckReason::Dynamite, dynamite_spares) {
                    if let Some(dynamite) = self.players[idx].take_in_play(CardKind::Dynamite) {
                        if safe {
                            self.pass_dynamite(idx, dynamite);
                        } else {
                            self.discard(dynamite);
                            self.emit(GameEvent::CardDiscarded {
                                player: id.clone(),
                                card: dynamite,
                            });
                            self.damage(idx, DYNAMITE_DAMAGE, None);
                            if self.is_over() {
                                return;
                            }
                            if !self.players[idx].alive {
                                self.advance_turn();
                                continue;
                            }
                        }
                    }
                }
            }

            if let Some(jail) = self.players[idx].take_in_play(CardKind::Jail) {
                self.discard(jail);
                self.emit(GameEvent::CardDiscarded {
                    player: id.clone(),
                    card: jail,
                });
                let freed = self.check(idx, CheckReason::Jail, is_heart).unwrap_or(true);
                if !freed {
                    self.emit(GameEvent::TurnSkipped { player: id });
                    self.players[idx].reset_turn();
                    self.advance_turn();
                    continue;
                }
            }
            return;
        }
    }

    fn pass_dynamite(&mut self, from: SeatIndex, dynamite: Card) {
        match self.next_alive_after(from) {
            Some(to) => {
                self.players[to].in_play.push(dynamite);
                let from = self.players[from].id.clone();
                let to = self.players[to].id.clone();
                self.emit(GameEvent::CardPassed {
                    card: dynamite,
                    from,
                    to,
                });
            }
            None => self.players[from].in_play.push(dynamite),
        }
    }

    /// Runs after every accepted command.
    fn settle(&mut self) {
        if self.is_over() {
            return;
        }
        for idx in 0..self.players.len() {
            let player = &self.players[idx];
            if player.alive && player.hand.is_empty() && player.character.refills_empty_hand() {
                let count = self.draw_into_hand(idx, 1);
                if count > 0 {
                    let player = self.players[idx].id.clone();
                    self.emit(GameEvent::CardsDrawn { player, count });
                }
            }
        }
        if !self.players[self.turn].alive {
            self.advance_turn();
            self.begin_turn();
        }
    }

    // Damage, healing and elimination

    fn heal(&mut self, idx: SeatIndex) {
        let player = &mut self.players[idx];
        if !player.is_injured() {
            return;
        }
        player.health += 1;
        let health = player.health;
        let player = player.id.clone();
        self.emit(GameEvent::PlayerHealed { player, health });
    }

    /// Takes `amount` life from `victim`. Dead players are left alone, so
    /// repeated damage never re-triggers an elimination.
    pub(crate) fn damage(&mut self, victim: SeatIndex, amount: u8, source: Option<SeatIndex>) {
        let player = &mut self.players[victim];
        if !player.alive || amount == 0 {
            return;
        }
        let lost = amount.min(player.health);
        player.health -= lost;
        let health = player.health;
        let reaction = player.character.on_damaged();
        let id = player.id.clone();
        let source_id = source.map(|s| self.players[s].id.clone());
        self.emit(GameEvent::PlayerDamaged {
            player: id.clone(),
            source: source_id,
            amount: lost,
            health,
        });

        if health == 0 {
            self.eliminate(victim, source);
            return;
        }
        match reaction {
            DamageReaction::None => {}
            DamageReaction::DrawFromDeck => {
                let count = self.draw_into_hand(victim, usize::from(lost));
                if count > 0 {
                    self.emit(GameEvent::CardsDrawn { player: id, count });
                }
            }
            DamageReaction::StealFromSource => {
                let Some(src) = source.filter(|&s| s != victim) else {
                    return;
                };
                for _ in 0..lost {
                    if let Some(card) = self.take_random_hand_card(src) {
                        self.players[victim].hand.push(card);
                        let from = self.players[src].id.clone();
                        self.emit(GameEvent::CardStolen {
                            player: id.clone(),
                            from,
                        });
                    }
                }
            }
        }
    }

    fn eliminate(&mut self, victim: SeatIndex, killer: Option<SeatIndex>) {
        let player = &mut self.players[victim];
        player.alive = false;
        player.health = 0;
        let role = player.role;
        let id = player.id.clone();
        let killer_id = killer.map(|k| self.players[k].id.clone());
        log::info!("Match {}: {id} ({role}) eliminated", self.id);
        self.emit(GameEvent::PlayerEliminated {
            player: id.clone(),
            role,
            killer: killer_id,
        });

        let cards = self.players[victim].strip();
        let scavenger = self
            .players
            .iter()
            .position(|p| p.alive && p.character.scavenges());
        match scavenger {
            Some(s) if !cards.is_empty() => {
                let count = cards.len();
                self.players[s].hand.extend(cards);
                let player = self.players[s].id.clone();
                self.emit(GameEvent::CardsScavenged {
                    player,
                    from: id,
                    count,
                });
            }
            _ => {
                for card in cards {
                    self.discard(card);
                    self.emit(GameEvent::CardDiscarded {
                        player: id.clone(),
                        card,
                    });
                }
            }
        }

        if let Some(k) = killer.filter(|&k| k != victim && self.players[k].alive) {
            match role {
                Role::Outlaw => {
                    let count = self.draw_into_hand(k, OUTLAW_BOUNTY);
                    let player = self.players[k].id.clone();
                    self.emit(GameEvent::CardsDrawn { player, count });
                }
                Role::Deputy if self.players[k].is_sheriff() => {
                    let player = self.players[k].id.clone();
                    for card in self.players[k].strip() {
                        self.discard(card);
                        self.emit(GameEvent::CardDiscarded {
                            player: player.clone(),
                            card,
                        });
                    }
                }
                _ => {}
            }
        }

        self.check_match_end();
    }

    fn check_match_end(&mut self) {
        if self.is_over() {
            return;
        }
        let sheriff_alive = self.players.iter().any(|p| p.is_sheriff() && p.alive);
        let outcome = if sheriff_alive {
            let threats = self
                .alive_players()
                .any(|p| matches!(p.role, Role::Outlaw | Role::Renegade));
            if threats {
                return;
            }
            Outcome {
                team: Team::Law,
                winner: None,
            }
        } else {
            let alive: Vec<&Player> = self.alive_players().collect();
            match alive.as_slice() {
                [last] if last.role == Role::Renegade => Outcome {
                    team: Team::Renegade,
                    winner: Some(last.id.clone()),
                },
                _ => Outcome {
                    team: Team::Outlaws,
                    winner: None,
                },
            }
        };
        self.finish(outcome);
    }

    fn finish(&mut self, outcome: Outcome) {
        log::info!("Match {} over: {outcome}", self.id);
        self.reaction = None;
        if let Some(market) = self.market.take() {
            self.discard_pile.extend(market.cards);
        }
        let choice = std::mem::take(&mut self.draw_choice);
        self.draw_pile.extend(choice);
        self.phase = Phase::GameOver;
        self.emit(GameEvent::MatchEnded {
            team: outcome.team,
            winner: outcome.winner.clone(),
        });
        self.outcome = Some(outcome);
    }

    // Card movement helpers

    /// Draws up to `n` cards into a hand, returning how many arrived.
    fn draw_into_hand(&mut self, idx: SeatIndex, n: usize) -> usize {
        let mut drawn = 0;
        for _ in 0..n {
            match self.draw_top_card() {
                Some(card) => {
                    self.players[idx].hand.push(card);
                    drawn += 1;
                }
                None => break,
            }
        }
        drawn
    }

    fn take_random_hand_card(&mut self, idx: SeatIndex) -> Option<Card> {
        let len = self.players[idx].hand.len();
        if len == 0 {
            return None;
        }
        let pick = self.rng.random_range(0..len);
        Some(self.players[idx].hand.remove(pick))
    }

    /// Named equipment if present, else a random hand card, else the first
    /// equipment card.
    fn take_target_card(&mut self, target: SeatIndex, named: Option<CardId>) -> Option<Card> {
        if let Some(card) = named.and_then(|id| self.players[target].take_equipment(id)) {
            return Some(card);
        }
        if let Some(card) = self.take_random_hand_card(target) {
            return Some(card);
        }
        self.players[target].take_first_equipment()
    }

    /// Flips check cards for `idx` and discards them. `Some(true)` when any
    /// flip satisfies `good`, `None` when there was nothing to flip.
    fn check(
        &mut self,
        idx: SeatIndex,
        reason: CheckReason,
        good: impl Fn(&Card) -> bool,
    ) -> Option<bool> {
        let flips = self.players[idx].character.check_flips();
        let mut cards = Vec::with_capacity(flips);
        for _ in 0..flips {
            if let Some(card) = self.draw_top_card() {
                cards.push(card);
            }
        }
        if cards.is_empty() {
            return None;
        }
        let success = cards.iter().any(good);
        let player = self.players[idx].id.clone();
        self.emit(GameEvent::CheckRevealed {
            player,
            reason,
            cards: cards.clone(),
            success,
        });
        self.discard_pile.extend(cards);
        Some(success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{
        characters::{
            BartCassidy, CalamityJanet, Character, ElGringo, Jourdonnais, KitCarlson, LuckyDuke,
            SidKetchum, SlabTheKiller, SuzyLafayette, VultureSam, WillyTheKid,
        },
        constants::DECK_SIZE,
        entities::Seat,
    };

    fn card(id: u16, kind: CardKind, suit: Suit, value: u8) -> Card {
        Card::new(CardId(1000 + id), kind, suit, value)
    }

    fn pid(s: &str) -> PlayerId {
        PlayerId::from(s)
    }

    /// A started 4 player match with empty hands and a known turn order.
    /// Everyone is Willy the Kid, whose only hook is the attack limit.
    fn table() -> Match {
        let roster = (0..4)
            .map(|i| Seat::new(&format!("p{i}"), &format!("P{i}")))
            .collect();
        let mut m = Match::with_seed(9, roster, Some(11)).unwrap();
        m.start().unwrap();
        let roles = [Role::Sheriff, Role::Outlaw, Role::Outlaw, Role::Renegade];
        for (p, role) in m.players.iter_mut().zip(roles) {
            let cards = p.strip();
            m.discard_pile.extend(cards);
            p.role = role;
            p.character = Character::from(WillyTheKid);
            p.max_health = 4;
            p.health = 4;
            p.attacks_this_turn = 0;
        }
        m.turn = 0;
        m.phase = Phase::Play;
        m.reaction = None;
        m
    }

    fn give(m: &mut Match, seat: SeatIndex, c: Card) -> CardId {
        m.players[seat].hand.push(c);
        c.id
    }

    fn cards_owned(m: &Match) -> usize {
        m.card_total()
    }

    #[test]
    fn test_start_deals_health_and_starts_sheriff() {
        let roster = (0..5).map(|i| Seat::new(&format!("p{i}"), "x")).collect();
        let mut m = Match::with_seed(1, roster, Some(3)).unwrap();
        let events = m.start().unwrap();
        assert_eq!(m.phase, Phase::Draw);
        assert!(m.players[m.turn].is_sheriff());
        for p in &m.players {
            if !p.character.refills_empty_hand() {
                assert_eq!(p.hand.len(), usize::from(p.max_health));
            }
        }
        assert!(matches!(events[0], GameEvent::MatchStarted { players: 5, .. }));
        assert!(matches!(events[1], GameEvent::TurnStarted { .. }));
        assert_eq!(m.card_total(), DECK_SIZE);
        assert_eq!(m.start(), Err(ActionError::WrongPhase { phase: Phase::Draw }));
    }

    #[test]
    fn test_commands_rejected_out_of_turn_and_phase() {
        let mut m = table();
        let bang = give(&mut m, 1, card(1, CardKind::Bang, Suit::Diamonds, 5));
        assert_eq!(
            m.apply(&pid("p1"), Command::play_on(bang, pid("p0"))),
            Err(ActionError::NotYourTurn)
        );
        assert_eq!(
            m.apply(&pid("p0"), Command::Draw(DrawOptions::default())),
            Err(ActionError::WrongPhase { phase: Phase::Play })
        );
        assert_eq!(
            m.apply(&pid("nobody"), Command::Pass),
            Err(ActionError::UnknownPlayer(pid("nobody")))
        );
    }

    #[test]
    fn test_standard_draw() {
        let mut m = table();
        m.phase = Phase::Draw;
        let before = m.draw_pile.len();
        let events = m.apply(&pid("p0"), Command::Draw(DrawOptions::default())).unwrap();
        assert_eq!(m.players[0].hand.len(), 2);
        assert_eq!(m.draw_pile.len(), before - 2);
        assert_eq!(m.phase, Phase::Play);
        assert_eq!(
            events,
            vec![GameEvent::CardsDrawn {
                player: pid("p0"),
                count: 2
            }]
        );
    }

    #[test]
    fn test_draw_source_requires_matching_character() {
        let mut m = table();
        m.phase = Phase::Draw;
        assert_eq!(
            m.apply(&pid("p0"), Command::Draw(DrawOptions::from_discard())),
            Err(ActionError::InvalidDrawChoice)
        );
    }

    #[test]
    fn test_kit_carlson_keeps_two_of_three() {
        let mut m = table();
        m.players[0].character = Character::from(KitCarlson);
        m.phase = Phase::Draw;
        m.apply(&pid("p0"), Command::Draw(DrawOptions::default())).unwrap();
        assert_eq!(m.phase, Phase::ChooseDraw);
        assert_eq!(m.draw_choice.len(), 3);
        let total = cards_owned(&m);

        let ids: Vec<CardId> = m.draw_choice.iter().map(|c| c.id).collect();
        let returned = ids[2];
        assert_eq!(
            m.apply(&pid("p0"), Command::Draw(DrawOptions::keep(vec![ids[0], ids[0]]))),
            Err(ActionError::InvalidDrawChoice)
        );
        m.apply(&pid("p0"), Command::Draw(DrawOptions::keep(vec![ids[0], ids[1]])))
            .unwrap();
        assert_eq!(m.phase, Phase::Play);
        assert_eq!(m.players[0].hand.len(), 2);
        assert_eq!(m.draw_pile.last().map(|c| c.id), Some(returned));
        assert_eq!(cards_owned(&m), total);
    }

    #[test]
    fn test_bang_out_of_range_changes_nothing() {
        let mut m = table();
        let bang = give(&mut m, 0, card(1, CardKind::Bang, Suit::Diamonds, 5));
        let before_hand = m.players[0].hand.clone();
        let before_log = m.log.len();
        assert_eq!(
            m.apply(&pid("p0"), Command::play_on(bang, pid("p2"))),
            Err(ActionError::OutOfRange)
        );
        assert_eq!(m.players[0].hand, before_hand);
        assert_eq!(m.phase, Phase::Play);
        assert_eq!(m.log.len(), before_log);
        assert_eq!(m.players[0].attacks_this_turn, 0);
    }

    #[test]
    fn test_bang_then_missed() {
        let mut m = table();
        let bang = give(&mut m, 0, card(1, CardKind::Bang, Suit::Diamonds, 5));
        let missed = give(&mut m, 1, card(2, CardKind::Missed, Suit::Spades, 4));
        m.apply(&pid("p0"), Command::play_on(bang, pid("p1"))).unwrap();
        assert_eq!(m.phase, Phase::Reaction);
        assert_eq!(m.reaction.as_ref().and_then(Reaction::responder), Some(&pid("p1")));

        assert_eq!(
            m.apply(&pid("p2"), Command::Respond(Response::Decline)),
            Err(ActionError::NotResponder)
        );
        m.apply(&pid("p1"), Command::Respond(Response::Accept(missed)))
            .unwrap();
        assert_eq!(m.phase, Phase::Play);
        assert!(m.reaction.is_none());
        assert_eq!(m.players[1].health, 4);
    }

    #[test]
    fn test_bang_declined_deals_damage() {
        let mut m = table();
        let bang = give(&mut m, 0, card(1, CardKind::Bang, Suit::Diamonds, 5));
        m.apply(&pid("p0"), Command::play_on(bang, pid("p1"))).unwrap();
        let events = m
            .apply(&pid("p1"), Command::Respond(Response::Decline))
            .unwrap();
        assert_eq!(m.players[1].health, 3);
        assert_eq!(m.phase, Phase::Play);
        assert!(events.contains(&GameEvent::PlayerDamaged {
            player: pid("p1"),
            source: Some(pid("p0")),
            amount: 1,
            health: 3,
        }));
    }

    #[test]
    fn test_wrong_response_card_rejected() {
        let mut m = table();
        let bang = give(&mut m, 0, card(1, CardKind::Bang, Suit::Diamonds, 5));
        let beer = give(&mut m, 1, card(2, CardKind::Beer, Suit::Hearts, 6));
        m.apply(&pid("p0"), Command::play_on(bang, pid("p1"))).unwrap();
        assert_eq!(
            m.apply(&pid("p1"), Command::Respond(Response::Accept(beer))),
            Err(ActionError::InvalidResponse(CardKind::Beer))
        );
        assert_eq!(m.phase, Phase::Reaction);
    }

    #[test]
    fn test_attack_limit() {
        let mut m = table();
        m.players[0].character = Character::from(VultureSam);
        let first = give(&mut m, 0, card(1, CardKind::Bang, Suit::Diamonds, 5));
        let second = give(&mut m, 0, card(2, CardKind::Bang, Suit::Diamonds, 6));
        m.apply(&pid("p0"), Command::play_on(first, pid("p1"))).unwrap();
        m.apply(&pid("p1"), Command::Respond(Response::Decline))
            .unwrap();
        assert_eq!(
            m.apply(&pid("p0"), Command::play_on(second, pid("p1"))),
            Err(ActionError::AttackLimitReached)
        );
    }

    #[test]
    fn test_slab_needs_two_missed() {
        let mut m = table();
        m.players[0].character = Character::from(SlabTheKiller);
        let bang = give(&mut m, 0, card(1, CardKind::Bang, Suit::Diamonds, 5));
        let m1 = give(&mut m, 1, card(2, CardKind::Missed, Suit::Spades, 4));
        let m2 = give(&mut m, 1, card(3, CardKind::Missed, Suit::Spades, 5));
        m.apply(&pid("p0"), Command::play_on(bang, pid("p1"))).unwrap();
        m.apply(&pid("p1"), Command::Respond(Response::Accept(m1)))
            .unwrap();
        assert_eq!(m.phase, Phase::Reaction);
        m.apply(&pid("p1"), Command::Respond(Response::Accept(m2)))
            .unwrap();
        assert_eq!(m.phase, Phase::Play);
        assert_eq!(m.players[1].health, 4);
    }

    #[test]
    fn test_calamity_janet_plays_missed_as_bang() {
        let mut m = table();
        m.players[0].character = Character::from(CalamityJanet);
        let missed = give(&mut m, 0, card(1, CardKind::Missed, Suit::Spades, 4));
        let bang = give(&mut m, 1, card(2, CardKind::Bang, Suit::Clubs, 4));
        m.apply(&pid("p0"), Command::play_on(missed, pid("p1"))).unwrap();
        assert_eq!(m.phase, Phase::Reaction);
        assert_eq!(
            m.apply(&pid("p1"), Command::Respond(Response::Accept(bang))),
            Err(ActionError::InvalidResponse(CardKind::Bang))
        );
    }

    #[test]
    fn test_missed_outside_reaction_rejected() {
        let mut m = table();
        let missed = give(&mut m, 0, card(1, CardKind::Missed, Suit::Spades, 4));
        assert!(m.apply(&pid("p0"), Command::play(missed)).is_err());
        assert_eq!(m.players[0].hand.len(), 1);
    }

    #[test]
    fn test_barrel_success_and_single_use() {
        let mut m = table();
        m.players[1].character = Character::from(Jourdonnais);
        let bang = give(&mut m, 0, card(1, CardKind::Bang, Suit::Diamonds, 5));
        m.apply(&pid("p0"), Command::play_on(bang, pid("p1"))).unwrap();

        m.draw_pile.push(card(2, CardKind::Beer, Suit::Hearts, 7));
        m.apply(&pid("p1"), Command::UseAbility).unwrap();
        assert_eq!(m.phase, Phase::Play);
        assert_eq!(m.players[1].health, 4);

        m.players[0].character = Character::from(WillyTheKid);
        let bang = give(&mut m, 0, card(3, CardKind::Bang, Suit::Diamonds, 6));
        m.apply(&pid("p0"), Command::play_on(bang, pid("p1"))).unwrap();
        m.draw_pile.push(card(4, CardKind::Bang, Suit::Clubs, 2));
        m.apply(&pid("p1"), Command::UseAbility).unwrap();
        assert_eq!(m.phase, Phase::Reaction);
        assert_eq!(
            m.apply(&pid("p1"), Command::UseAbility),
            Err(ActionError::AbilityUnavailable)
        );
    }

    #[test]
    fn test_lucky_duke_takes_best_flip() {
        let mut m = table();
        m.players[1].character = Character::from(LuckyDuke);
        m.players[1].in_play.push(card(1, CardKind::Barrel, Suit::Spades, 12));
        let bang = give(&mut m, 0, card(2, CardKind::Bang, Suit::Diamonds, 5));
        m.apply(&pid("p0"), Command::play_on(bang, pid("p1"))).unwrap();
        m.draw_pile.push(card(3, CardKind::Beer, Suit::Hearts, 7));
        m.draw_pile.push(card(4, CardKind::Bang, Suit::Clubs, 3));
        let events = m.apply(&pid("p1"), Command::UseAbility).unwrap();
        assert_eq!(m.phase, Phase::Play);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::CheckRevealed { cards, success: true, .. } if cards.len() == 2
        )));
    }

    #[test]
    fn test_duel_initiator_who_gives_up_is_hit_by_the_target() {
        let mut m = table();
        m.players[0].character = Character::from(ElGringo);
        let duel = give(&mut m, 0, card(1, CardKind::Duel, Suit::Diamonds, 12));
        let p2_bang = give(&mut m, 2, card(2, CardKind::Bang, Suit::Clubs, 3));
        give(&mut m, 2, card(3, CardKind::Beer, Suit::Hearts, 6));
        let total = cards_owned(&m);

        m.apply(&pid("p0"), Command::play_on(duel, pid("p2"))).unwrap();
        m.apply(&pid("p2"), Command::Respond(Response::Accept(p2_bang)))
            .unwrap();
        let events = m.apply(&pid("p0"), Command::Respond(Response::Decline)).unwrap();

        assert_eq!(m.players[0].health, 3);
        assert_eq!(m.players[2].health, 4);
        let hit = events
            .iter()
            .find(|e| matches!(e, GameEvent::PlayerDamaged { .. }));
        assert_eq!(
            hit,
            Some(&GameEvent::PlayerDamaged {
                player: pid("p0"),
                source: Some(pid("p2")),
                amount: 1,
                health: 3,
            })
        );
        // El Gringo takes his due from whoever actually hurt him.
        assert!(events.contains(&GameEvent::CardStolen {
            player: pid("p0"),
            from: pid("p2"),
        }));
        assert!(m.players[0].hand_card(CardId(1003)).is_some());
        assert!(m.players[2].hand.is_empty());
        assert!(m.reaction.is_none());
        assert_eq!(m.phase, Phase::Play);
        assert_eq!(cards_owned(&m), total);
    }

    #[test]
    fn test_duel_initiator_killed_on_own_turn_passes_the_turn() {
        let mut m = table();
        m.turn = 1;
        m.players[1].health = 1;
        let duel = give(&mut m, 1, card(1, CardKind::Duel, Suit::Diamonds, 12));
        let p2_bang = give(&mut m, 2, card(2, CardKind::Bang, Suit::Clubs, 3));

        m.apply(&pid("p1"), Command::play_on(duel, pid("p2"))).unwrap();
        m.apply(&pid("p2"), Command::Respond(Response::Accept(p2_bang)))
            .unwrap();
        let events = m.apply(&pid("p1"), Command::Respond(Response::Decline)).unwrap();

        assert!(events.contains(&GameEvent::PlayerEliminated {
            player: pid("p1"),
            role: Role::Outlaw,
            killer: Some(pid("p2")),
        }));
        assert!(!m.players[1].alive);
        // Killing an outlaw pays the bounty to the duel's winner.
        assert_eq!(m.players[2].hand.len(), OUTLAW_BOUNTY);
        assert!(!m.is_over());
        assert!(events.contains(&GameEvent::TurnStarted { player: pid("p2") }));
        assert_eq!(m.turn, 2);
        assert_eq!(m.phase, Phase::Draw);
        assert!(m.reaction.is_none());
    }

    #[test]
    fn test_playing_a_card_not_held_changes_nothing() {
        let mut m = table();
        let held = card(1, CardKind::Stagecoach, Suit::Spades, 9);
        let ghost = card(2, CardKind::Stagecoach, Suit::Spades, 9);
        give(&mut m, 0, held);
        let logged = m.log.len();
        let total = cards_owned(&m);

        assert_eq!(
            m.play_brown(0, ghost, None),
            Err(ActionError::CardNotInHand(ghost.id))
        );
        assert_eq!(m.log.len(), logged);
        assert_eq!(m.players[0].hand, vec![held]);
        assert_eq!(cards_owned(&m), total);

        m.play_brown(0, held, None).unwrap();
        assert!(m.players[0].hand.is_empty());
        assert_eq!(m.discard_pile.last(), Some(&held));
        assert_eq!(cards_owned(&m), total);
    }

    #[test]
    fn test_duel_swaps_until_someone_fails() {
        let mut m = table();
        let duel = give(&mut m, 0, card(1, CardKind::Duel, Suit::Diamonds, 12));
        let p2_bang = give(&mut m, 2, card(2, CardKind::Bang, Suit::Clubs, 3));
        let p0_bang = give(&mut m, 0, card(3, CardKind::Bang, Suit::Clubs, 4));
        // p2 sits at distance 2; duels ignore range.
        m.apply(&pid("p0"), Command::play_on(duel, pid("p2"))).unwrap();
        assert_eq!(m.reaction.as_ref().and_then(Reaction::responder), Some(&pid("p2")));
        m.apply(&pid("p2"), Command::Respond(Response::Accept(p2_bang)))
            .unwrap();
        assert_eq!(m.reaction.as_ref().and_then(Reaction::responder), Some(&pid("p0")));
        m.apply(&pid("p0"), Command::Respond(Response::Accept(p0_bang)))
            .unwrap();
        assert_eq!(m.reaction.as_ref().and_then(Reaction::responder), Some(&pid("p2")));
        m.apply(&pid("p2"), Command::Respond(Response::Decline))
            .unwrap();
        assert_eq!(m.players[2].health, 3);
        assert_eq!(m.players[0].health, 4);
        assert_eq!(m.phase, Phase::Play);
        assert!(m.reaction.is_none());
    }

    #[test]
    fn test_gatling_queues_everyone_in_order() {
        let mut m = table();
        m.turn = 1;
        let gatling = give(&mut m, 1, card(1, CardKind::Gatling, Suit::Hearts, 10));
        let missed = give(&mut m, 3, card(2, CardKind::Missed, Suit::Spades, 5));
        m.apply(&pid("p1"), Command::play(gatling)).unwrap();
        let queue: Vec<PlayerId> = m
            .reaction
            .as_ref()
            .map(|r| r.queue.iter().cloned().collect())
            .unwrap_or_default();
        assert_eq!(queue, vec![pid("p2"), pid("p3"), pid("p0")]);

        m.apply(&pid("p2"), Command::Respond(Response::Decline))
            .unwrap();
        m.apply(&pid("p3"), Command::Respond(Response::Accept(missed)))
            .unwrap();
        m.apply(&pid("p0"), Command::Respond(Response::Decline))
            .unwrap();
        assert_eq!(m.phase, Phase::Play);
        assert_eq!(m.players[2].health, 3);
        assert_eq!(m.players[3].health, 4);
        assert_eq!(m.players[0].health, 3);
    }

    #[test]
    fn test_indians_demand_bang() {
        let mut m = table();
        let indians = give(&mut m, 0, card(1, CardKind::Indians, Suit::Diamonds, 13));
        let missed = give(&mut m, 1, card(2, CardKind::Missed, Suit::Spades, 5));
        let bang = give(&mut m, 1, card(3, CardKind::Bang, Suit::Clubs, 5));
        m.apply(&pid("p0"), Command::play(indians)).unwrap();
        assert_eq!(
            m.apply(&pid("p1"), Command::Respond(Response::Accept(missed))),
            Err(ActionError::InvalidResponse(CardKind::Missed))
        );
        m.apply(&pid("p1"), Command::Respond(Response::Accept(bang)))
            .unwrap();
        assert_eq!(m.reaction.as_ref().and_then(Reaction::responder), Some(&pid("p2")));
        assert_eq!(
            m.apply(&pid("p2"), Command::UseAbility),
            Err(ActionError::AbilityUnavailable)
        );
    }

    #[test]
    fn test_beer_rules() {
        let mut m = table();
        let beer = give(&mut m, 0, card(1, CardKind::Beer, Suit::Hearts, 6));
        assert_eq!(
            m.apply(&pid("p0"), Command::play(beer)),
            Err(ActionError::NoEffect(CardKind::Beer))
        );
        m.players[0].health = 2;
        m.apply(&pid("p0"), Command::play(beer)).unwrap();
        assert_eq!(m.players[0].health, 3);

        let beer = give(&mut m, 0, card(2, CardKind::Beer, Suit::Hearts, 7));
        m.players[2].alive = false;
        m.players[3].alive = false;
        assert_eq!(
            m.apply(&pid("p0"), Command::play(beer)),
            Err(ActionError::NoEffect(CardKind::Beer))
        );
    }

    #[test]
    fn test_saloon_heals_everyone_capped() {
        let mut m = table();
        m.players[1].health = 2;
        m.players[2].health = 3;
        let saloon = give(&mut m, 0, card(1, CardKind::Saloon, Suit::Hearts, 5));
        m.apply(&pid("p0"), Command::play(saloon)).unwrap();
        let health: Vec<u8> = m.players.iter().map(|p| p.health).collect();
        assert_eq!(health, vec![4, 3, 4, 4]);
    }

    #[test]
    fn test_panic_steals_named_equipment() {
        let mut m = table();
        let barrel = card(1, CardKind::Barrel, Suit::Spades, 12);
        m.players[1].in_play.push(barrel);
        give(&mut m, 1, card(2, CardKind::Beer, Suit::Hearts, 6));
        let panic = give(&mut m, 0, card(3, CardKind::Panic, Suit::Hearts, 11));
        m.apply(
            &pid("p0"),
            Command::PlayCard {
                card: panic,
                target: Some(pid("p1")),
                target_card: Some(barrel.id),
            },
        )
        .unwrap();
        assert!(m.players[0].hand.iter().any(|c| c.id == barrel.id));
        assert!(m.players[1].in_play.is_empty());
        assert_eq!(m.players[1].hand.len(), 1);
    }

    #[test]
    fn test_panic_range_and_empty_target() {
        let mut m = table();
        let panic = give(&mut m, 0, card(1, CardKind::Panic, Suit::Hearts, 11));
        assert_eq!(
            m.apply(&pid("p0"), Command::play_on(panic, pid("p1"))),
            Err(ActionError::NoEffect(CardKind::Panic))
        );
        give(&mut m, 2, card(2, CardKind::Beer, Suit::Hearts, 6));
        assert_eq!(
            m.apply(&pid("p0"), Command::play_on(panic, pid("p2"))),
            Err(ActionError::OutOfRange)
        );
    }

    #[test]
    fn test_cat_balou_discards_at_any_range() {
        let mut m = table();
        let beer = give(&mut m, 2, card(1, CardKind::Beer, Suit::Hearts, 6));
        let cat = give(&mut m, 0, card(2, CardKind::CatBalou, Suit::Diamonds, 9));
        m.apply(&pid("p0"), Command::play_on(cat, pid("p2"))).unwrap();
        assert!(m.players[2].hand.is_empty());
        assert_eq!(m.discard_pile.last().map(|c| c.id), Some(beer));
    }

    #[test]
    fn test_draw_cards() {
        let mut m = table();
        let wells = give(&mut m, 0, card(1, CardKind::WellsFargo, Suit::Hearts, 3));
        m.apply(&pid("p0"), Command::play(wells)).unwrap();
        assert_eq!(m.players[0].hand.len(), 3);
    }

    #[test]
    fn test_equipment_rules() {
        let mut m = table();
        let b1 = give(&mut m, 0, card(1, CardKind::Barrel, Suit::Spades, 12));
        let b2 = give(&mut m, 0, card(2, CardKind::Barrel, Suit::Spades, 13));
        m.apply(&pid("p0"), Command::play(b1)).unwrap();
        assert_eq!(
            m.apply(&pid("p0"), Command::play(b2)),
            Err(ActionError::DuplicateEquipment(CardKind::Barrel))
        );

        let scho = give(&mut m, 0, card(3, CardKind::Schofield, Suit::Clubs, 11));
        let winch = give(&mut m, 0, card(4, CardKind::Winchester, Suit::Spades, 8));
        m.apply(&pid("p0"), Command::play(scho)).unwrap();
        m.apply(&pid("p0"), Command::play(winch)).unwrap();
        assert_eq!(m.players[0].weapon.map(|c| c.id), Some(winch));
        assert_eq!(m.discard_pile.last().map(|c| c.id), Some(scho));
        assert_eq!(m.players[0].weapon_range(), 5);
    }

    #[test]
    fn test_jail_rules() {
        let mut m = table();
        m.turn = 1;
        let jail = give(&mut m, 1, card(1, CardKind::Jail, Suit::Spades, 11));
        assert_eq!(
            m.apply(&pid("p1"), Command::play_on(jail, pid("p0"))),
            Err(ActionError::InvalidTarget)
        );
        m.apply(&pid("p1"), Command::play_on(jail, pid("p3"))).unwrap();
        assert!(m.players[3].has_in_play(CardKind::Jail));
        let jail2 = give(&mut m, 1, card(2, CardKind::Jail, Suit::Hearts, 4));
        assert_eq!(
            m.apply(&pid("p1"), Command::play_on(jail2, pid("p3"))),
            Err(ActionError::DuplicateEquipment(CardKind::Jail))
        );
    }

    #[test]
    fn test_jail_skips_turn_on_failed_check() {
        let mut m = table();
        m.players[1].in_play.push(card(1, CardKind::Jail, Suit::Spades, 11));
        m.draw_pile.push(card(2, CardKind::Bang, Suit::Clubs, 3));
        let events = m.apply(&pid("p0"), Command::Pass).unwrap();
        assert_eq!(m.turn, 2);
        assert_eq!(m.phase, Phase::Draw);
        assert!(!m.players[1].has_in_play(CardKind::Jail));
        assert!(events.contains(&GameEvent::TurnSkipped { player: pid("p1") }));
    }

    #[test]
    fn test_jail_freed_on_hearts() {
        let mut m = table();
        m.players[1].in_play.push(card(1, CardKind::Jail, Suit::Spades, 11));
        m.draw_pile.push(card(2, CardKind::Beer, Suit::Hearts, 8));
        m.apply(&pid("p0"), Command::Pass).unwrap();
        assert_eq!(m.turn, 1);
        assert!(!m.players[1].has_in_play(CardKind::Jail));
    }

    #[test]
    fn test_dynamite_passes_or_explodes() {
        let mut m = table();
        let dynamite = card(1, CardKind::Dynamite, Suit::Hearts, 2);
        m.players[1].in_play.push(dynamite);
        m.draw_pile.push(card(2, CardKind::Beer, Suit::Hearts, 8));
        m.apply(&pid("p0"), Command::Pass).unwrap();
        assert_eq!(m.turn, 1);
        assert!(m.players[2].has_in_play(CardKind::Dynamite));

        m.apply(&pid("p1"), Command::Draw(DrawOptions::default())).unwrap();
        m.draw_pile.push(card(3, CardKind::Missed, Suit::Spades, 5));
        m.apply(&pid("p1"), Command::Pass).unwrap();
        assert_eq!(m.players[2].health, 1);
        assert!(!m.players[2].has_in_play(CardKind::Dynamite));
        assert_eq!(m.turn, 2);
    }

    #[test]
    fn test_dynamite_kill_skips_jail_and_turn() {
        let mut m = table();
        m.players[1].health = 2;
        m.players[1].in_play.push(card(1, CardKind::Dynamite, Suit::Hearts, 2));
        m.players[1].in_play.push(card(2, CardKind::Jail, Suit::Spades, 11));
        m.draw_pile.push(card(3, CardKind::Missed, Suit::Spades, 5));
        let total = cards_owned(&m);
        let events = m.apply(&pid("p0"), Command::Pass).unwrap();
        assert!(!m.players[1].alive);
        assert_eq!(m.players[1].card_count(), 0);
        assert_eq!(m.turn, 2);
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, GameEvent::CheckRevealed { reason: CheckReason::Jail, .. }))
        );
        assert_eq!(cards_owned(&m), total);
    }

    #[test]
    fn test_pass_with_too_many_cards_forces_discard() {
        let mut m = table();
        m.players[0].health = 1;
        let a = give(&mut m, 0, card(1, CardKind::Beer, Suit::Hearts, 6));
        give(&mut m, 0, card(2, CardKind::Beer, Suit::Hearts, 7));
        m.apply(&pid("p0"), Command::Pass).unwrap();
        assert_eq!(m.phase, Phase::Discard);
        assert_eq!(m.turn, 0);
        m.apply(&pid("p0"), Command::Discard(a)).unwrap();
        assert_eq!(m.turn, 1);
        assert_eq!(m.phase, Phase::Draw);
    }

    #[test]
    fn test_general_store_order_starts_at_actor() {
        let mut m = table();
        m.turn = 2;
        let store = give(&mut m, 2, card(1, CardKind::GeneralStore, Suit::Clubs, 9));
        m.apply(&pid("p2"), Command::play(store)).unwrap();
        assert_eq!(m.phase, Phase::Market);
        let total = cards_owned(&m);
        let order = ["p2", "p3", "p0", "p1"];
        for (i, who) in order.iter().enumerate() {
            let offered = m.market.as_ref().map(|mk| mk.cards[0].id).unwrap();
            if i == 0 {
                assert_eq!(
                    m.apply(&pid("p3"), Command::PickMarketCard(offered)),
                    Err(ActionError::NotYourTurn)
                );
            }
            m.apply(&pid(who), Command::PickMarketCard(offered)).unwrap();
        }
        assert_eq!(m.phase, Phase::Play);
        assert!(m.market.is_none());
        assert!(m.players.iter().all(|p| p.hand.len() == 1));
        assert_eq!(cards_owned(&m), total);
    }

    #[test]
    fn test_outlaw_bounty() {
        let mut m = table();
        m.players[1].health = 1;
        let bang = give(&mut m, 0, card(1, CardKind::Bang, Suit::Diamonds, 5));
        m.apply(&pid("p0"), Command::play_on(bang, pid("p1"))).unwrap();
        let events = m
            .apply(&pid("p1"), Command::Respond(Response::Decline))
            .unwrap();
        assert!(!m.players[1].alive);
        assert_eq!(m.players[0].hand.len(), 3);
        let eliminated = events
            .iter()
            .position(|e| matches!(e, GameEvent::PlayerEliminated { .. }));
        let bounty = events
            .iter()
            .position(|e| matches!(e, GameEvent::CardsDrawn { count: 3, .. }));
        assert!(eliminated < bounty);
    }

    #[test]
    fn test_sheriff_killing_deputy_loses_everything() {
        let mut m = table();
        m.players[1].role = Role::Deputy;
        m.players[1].health = 1;
        m.players[0].weapon = Some(card(1, CardKind::Remington, Suit::Clubs, 13));
        let bang = give(&mut m, 0, card(2, CardKind::Bang, Suit::Diamonds, 5));
        give(&mut m, 0, card(3, CardKind::Beer, Suit::Hearts, 6));
        m.apply(&pid("p0"), Command::play_on(bang, pid("p1"))).unwrap();
        m.apply(&pid("p1"), Command::Respond(Response::Decline))
            .unwrap();
        assert_eq!(m.players[0].card_count(), 0);
    }

    #[test]
    fn test_vulture_sam_scavenges() {
        let mut m = table();
        m.players[3].character = Character::from(VultureSam);
        m.players[1].health = 1;
        give(&mut m, 1, card(1, CardKind::Beer, Suit::Hearts, 6));
        m.players[1].in_play.push(card(2, CardKind::Mustang, Suit::Hearts, 8));
        m.damage(1, 1, None);
        assert!(!m.players[1].alive);
        assert_eq!(m.players[3].hand.len(), 2);
    }

    #[test]
    fn test_elimination_is_idempotent() {
        let mut m = table();
        m.players[1].health = 1;
        m.damage(1, 1, Some(0));
        let log_len = m.log.len();
        let hand = m.players[0].hand.len();
        m.damage(1, 1, Some(0));
        assert_eq!(m.log.len(), log_len);
        assert_eq!(m.players[0].hand.len(), hand);
    }

    #[test]
    fn test_bart_cassidy_and_el_gringo() {
        let mut m = table();
        m.players[1].character = Character::from(BartCassidy);
        m.damage(1, 2, Some(0));
        assert_eq!(m.players[1].hand.len(), 2);

        m.players[2].character = Character::from(ElGringo);
        give(&mut m, 0, card(1, CardKind::Beer, Suit::Hearts, 6));
        m.damage(2, 1, Some(0));
        assert_eq!(m.players[2].hand.len(), 1);
        assert!(m.players[0].hand.is_empty());
    }

    #[test]
    fn test_suzy_refills_empty_hand() {
        let mut m = table();
        m.players[0].character = Character::from(SuzyLafayette);
        let barrel = give(&mut m, 0, card(1, CardKind::Barrel, Suit::Spades, 12));
        m.apply(&pid("p0"), Command::play(barrel)).unwrap();
        assert_eq!(m.players[0].hand.len(), 1);
    }

    #[test]
    fn test_sid_ketchum_heals_by_discarding() {
        let mut m = table();
        m.players[2].character = Character::from(SidKetchum);
        let a = give(&mut m, 2, card(1, CardKind::Beer, Suit::Hearts, 6));
        let b = give(&mut m, 2, card(2, CardKind::Bang, Suit::Clubs, 2));
        assert_eq!(
            m.apply(&pid("p2"), Command::DiscardToHeal([a, b])),
            Err(ActionError::AbilityUnavailable)
        );
        m.players[2].health = 2;
        assert_eq!(
            m.apply(&pid("p2"), Command::DiscardToHeal([a, a])),
            Err(ActionError::CardNotInHand(a))
        );
        m.apply(&pid("p2"), Command::DiscardToHeal([a, b])).unwrap();
        assert_eq!(m.players[2].health, 3);
        assert!(m.players[2].hand.is_empty());
    }

    #[test]
    fn test_sheriff_death_ends_match_for_outlaws() {
        let mut m = table();
        m.turn = 1;
        m.players[0].health = 1;
        let gatling = give(&mut m, 1, card(1, CardKind::Gatling, Suit::Hearts, 10));
        m.apply(&pid("p1"), Command::play(gatling)).unwrap();
        m.apply(&pid("p2"), Command::Respond(Response::Decline))
            .unwrap();
        m.apply(&pid("p3"), Command::Respond(Response::Decline))
            .unwrap();
        m.apply(&pid("p0"), Command::Respond(Response::Decline))
            .unwrap();
        assert_eq!(m.phase, Phase::GameOver);
        assert!(m.reaction.is_none());
        assert_eq!(
            m.outcome,
            Some(Outcome {
                team: Team::Outlaws,
                winner: None
            })
        );
        assert_eq!(m.apply(&pid("p1"), Command::Pass), Err(ActionError::MatchOver));
    }

    #[test]
    fn test_renegade_solo_win() {
        let mut m = table();
        m.players[1].alive = false;
        m.players[2].alive = false;
        m.players[0].health = 1;
        m.damage(0, 1, Some(3));
        assert_eq!(
            m.outcome,
            Some(Outcome {
                team: Team::Renegade,
                winner: Some(pid("p3"))
            })
        );
    }

    #[test]
    fn test_law_wins_when_threats_gone() {
        let mut m = table();
        m.players[1].alive = false;
        m.players[2].alive = false;
        m.players[3].health = 1;
        m.damage(3, 1, Some(0));
        assert_eq!(m.outcome.as_ref().map(|o| o.team), Some(Team::Law));
        assert_eq!(m.phase, Phase::GameOver);
    }

    #[test]
    fn test_leave_reports_when_everyone_left() {
        let mut m = table();
        for i in 0..3 {
            assert_eq!(m.leave(&pid(&format!("p{i}"))), Ok(false));
        }
        assert_eq!(m.leave(&pid("p3")), Ok(true));
        assert!(m.leave(&pid("ghost")).is_err());
    }
}
