//! Random but legal-minded seat player.
//!
//! The bot never inspects hidden state. It reads the same [`MatchView`] a
//! human client would get and proposes commands in order of preference;
//! the driver submits them until the engine accepts one.

use outlaw::game::{
    Ability, CardKind, Command, DrawOptions, MatchView, Phase, PlayerId, PlayerView, Response,
    Role,
};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Preference-ordered command generator for one seat.
pub struct Bot {
    rng: StdRng,
}

impl Bot {
    /// Create a new bot
    ///
    /// # Arguments
    ///
    /// * `seed` - Seed for card and target shuffling, random when `None`
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }

    /// Commands worth trying for `me`, best first. The last entry is
    /// always a command that is legal whenever `me` is the awaited seat,
    /// except during a draw where the default draw is the only option.
    pub fn candidates(&mut self, view: &MatchView, me: &PlayerId) -> Vec<Command> {
        let Some(seat) = view.player(me) else {
            return Vec::new();
        };

        match view.phase {
            Phase::Draw => self.draw(view, seat),
            Phase::ChooseDraw => {
                let keep = view
                    .draw_choice
                    .as_ref()
                    .map(|cards| cards.iter().take(2).map(|c| c.id).collect())
                    .unwrap_or_default();
                vec![Command::Draw(DrawOptions::keep(keep))]
            }
            Phase::Reaction => Self::react(view, seat),
            Phase::Market => view
                .market
                .as_ref()
                .and_then(|market| market.cards.first())
                .map(|card| vec![Command::PickMarketCard(card.id)])
                .unwrap_or_default(),
            Phase::Play => self.play(view, seat),
            Phase::Discard => {
                let mut commands = Self::heal(seat);
                commands.extend(hand(seat).map(|card| Command::Discard(card.id)));
                commands
            }
            Phase::WaitingForPlayers | Phase::Starting | Phase::GameOver => Vec::new(),
        }
    }

    fn draw(&mut self, view: &MatchView, seat: &PlayerView) -> Vec<Command> {
        let mut commands = Vec::new();
        if view.discard_pile_size > 0 {
            commands.push(Command::Draw(DrawOptions::from_discard()));
        }
        let mut others: Vec<&PlayerView> = view
            .players
            .iter()
            .filter(|p| p.alive && p.id != seat.id && p.hand_size > 0)
            .collect();
        others.shuffle(&mut self.rng);
        if let Some(victim) = others.first() {
            commands.push(Command::Draw(DrawOptions::from_player(victim.id.clone())));
        }
        // Characters without a draw ability reject the above.
        commands.push(Command::Draw(DrawOptions::default()));
        commands
    }

    fn react(view: &MatchView, seat: &PlayerView) -> Vec<Command> {
        let Some(reaction) = view.reaction.as_ref() else {
            return Vec::new();
        };
        let mut commands = Vec::new();
        if reaction.kind.is_shot() {
            commands.push(Command::UseAbility);
        }
        commands.extend(
            hand(seat)
                .filter(|card| seat.character.substitutes(card.kind, reaction.answer))
                .map(|card| Command::Respond(Response::Accept(card.id))),
        );
        commands.push(Command::Respond(Response::Decline));
        commands
    }

    fn heal(seat: &PlayerView) -> Vec<Command> {
        if !seat.character.heals_by_discarding() || seat.health >= seat.max_health {
            return Vec::new();
        }
        let cards: Vec<_> = hand(seat).map(|card| card.id).take(2).collect();
        match cards.as_slice() {
            [a, b] => vec![Command::DiscardToHeal([*a, *b])],
            _ => Vec::new(),
        }
    }

    fn play(&mut self, view: &MatchView, seat: &PlayerView) -> Vec<Command> {
        let mut commands = Self::heal(seat);

        let mut cards: Vec<_> = hand(seat).copied().collect();
        cards.shuffle(&mut self.rng);
        let targets = self.targets(view, seat);

        for card in cards {
            if card.kind == CardKind::Beer && seat.health >= seat.max_health {
                continue;
            }
            let aimed = card.kind.needs_target()
                || (card.kind == CardKind::Missed
                    && seat.character.substitutes(CardKind::Missed, CardKind::Bang));
            if aimed {
                commands.extend(
                    targets
                        .iter()
                        .map(|target| Command::play_on(card.id, target.clone())),
                );
            } else if card.kind != CardKind::Missed {
                commands.push(Command::play(card.id));
            }
        }

        commands.push(Command::Pass);
        commands
    }

    /// Living opponents in the order this seat would rather hit them.
    fn targets(&mut self, view: &MatchView, seat: &PlayerView) -> Vec<PlayerId> {
        let mut others: Vec<&PlayerView> = view
            .players
            .iter()
            .filter(|p| p.alive && p.id != seat.id)
            .collect();
        others.shuffle(&mut self.rng);

        match seat.role {
            Some(Role::Outlaw) => {
                others.sort_by_key(|p| !is_sheriff(p));
            }
            Some(Role::Deputy) => {
                others.retain(|p| !is_sheriff(p));
            }
            Some(Role::Renegade) => {
                others.sort_by_key(|p| is_sheriff(p));
            }
            Some(Role::Sheriff) | None => {}
        }
        others.into_iter().map(|p| p.id.clone()).collect()
    }
}

fn is_sheriff(player: &PlayerView) -> bool {
    player.role == Some(Role::Sheriff)
}

fn hand(seat: &PlayerView) -> impl Iterator<Item = &outlaw::game::Card> {
    seat.hand.iter().flatten()
}
