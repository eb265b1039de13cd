//! Domain events emitted by the engine, for narration and animation.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::{Card, PlayerId, Role, Team};

/// Why cards were flipped off the draw pile.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum CheckReason {
    Barrel,
    Jail,
    Dynamite,
    /// Black Jack showing his second draw.
    DrawReveal,
}

impl fmt::Display for CheckReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Barrel => "barrel",
            Self::Jail => "jail",
            Self::Dynamite => "dynamite",
            Self::DrawReveal => "draw",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum GameEvent {
    MatchStarted {
        players: usize,
        sheriff: PlayerId,
    },
    TurnStarted {
        player: PlayerId,
    },
    /// The jailed player's turn was skipped.
    TurnSkipped {
        player: PlayerId,
    },
    CardPlayed {
        player: PlayerId,
        card: Card,
        target: Option<PlayerId>,
    },
    CardsDrawn {
        player: PlayerId,
        count: usize,
    },
    CardDiscarded {
        player: PlayerId,
        card: Card,
    },
    /// Hand cards are stolen face down, so only the owners are named.
    CardStolen {
        player: PlayerId,
        from: PlayerId,
    },
    CardPassed {
        card: Card,
        from: PlayerId,
        to: PlayerId,
    },
    CheckRevealed {
        player: PlayerId,
        reason: CheckReason,
        cards: Vec<Card>,
        success: bool,
    },
    PlayerDamaged {
        player: PlayerId,
        source: Option<PlayerId>,
        amount: u8,
        health: u8,
    },
    PlayerHealed {
        player: PlayerId,
        health: u8,
    },
    PlayerEliminated {
        player: PlayerId,
        role: Role,
        killer: Option<PlayerId>,
    },
    CardsScavenged {
        player: PlayerId,
        from: PlayerId,
        count: usize,
    },
    MarketOpened {
        cards: Vec<Card>,
    },
    MarketCardPicked {
        player: PlayerId,
        card: Card,
    },
    MatchEnded {
        team: Team,
        winner: Option<PlayerId>,
    },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MatchStarted { players, sheriff } => {
                write!(f, "match started with {players} players, {sheriff} is the sheriff")
            }
            Self::TurnStarted { player } => write!(f, "{player}'s turn"),
            Self::TurnSkipped { player } => write!(f, "{player} stays in jail"),
            Self::CardPlayed {
                player,
                card,
                target,
            } => match target {
                Some(target) => write!(f, "{player} played {card} on {target}"),
                None => write!(f, "{player} played {card}"),
            },
            Self::CardsDrawn { player, count } => {
                let plural = if *count == 1 { "" } else { "s" };
                write!(f, "{player} drew {count} card{plural}")
            }
            Self::CardDiscarded { player, card } => write!(f, "{player} discarded {card}"),
            Self::CardStolen { player, from } => write!(f, "{player} took a card from {from}"),
            Self::CardPassed { card, from, to } => write!(f, "{card} passed from {from} to {to}"),
            Self::CheckRevealed {
                player,
                reason,
                cards,
                success,
            } => {
                let shown: Vec<String> = cards.iter().map(ToString::to_string).collect();
                let verdict = if *success { "success" } else { "failure" };
                write!(
                    f,
                    "{player} drew! for {reason}: {} ({verdict})",
                    shown.join(", ")
                )
            }
            Self::PlayerDamaged {
                player,
                amount,
                health,
                ..
            } => write!(f, "{player} lost {amount} life ({health} left)"),
            Self::PlayerHealed { player, health } => {
                write!(f, "{player} regained a life ({health} left)")
            }
            Self::PlayerEliminated { player, role, .. } => {
                write!(f, "{player} was eliminated, they were {role}")
            }
            Self::CardsScavenged {
                player,
                from,
                count,
            } => write!(f, "{player} took {count} cards from {from}"),
            Self::MarketOpened { cards } => write!(f, "general store opened {} cards", cards.len()),
            Self::MarketCardPicked { player, card } => write!(f, "{player} picked {card}"),
            Self::MatchEnded { team, winner } => match winner {
                Some(winner) => write!(f, "{winner} wins alone as {team}"),
                None => write!(f, "{team} win"),
            },
        }
    }
}
