//! Static card catalog.
//!
//! Every card kind, its category and colour, weapon ranges, and the exact
//! (value, suit) multiset that makes up a deck. Nothing in here holds state.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::{
    Suit::{self, Clubs as C, Diamonds as D, Hearts as H, Spades as S},
    Value,
};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum CardKind {
    Bang,
    Missed,
    Beer,
    Saloon,
    Stagecoach,
    WellsFargo,
    Panic,
    CatBalou,
    Duel,
    Gatling,
    Indians,
    GeneralStore,
    Barrel,
    Mustang,
    Scope,
    Jail,
    Dynamite,
    Volcanic,
    Schofield,
    Remington,
    RevCarabine,
    Winchester,
}

/// What a card does when it is played, independent of its name.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum CardCategory {
    Attack,
    Defense,
    Heal,
    GroupHeal,
    Draw,
    Steal,
    DiscardTarget,
    Duel,
    AreaAttack,
    Market,
    Equipment,
    Weapon,
}

/// Brown cards resolve and are discarded; blue cards stay in play.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum CardColor {
    Brown,
    Blue,
}

impl CardKind {
    pub const ALL: [CardKind; 22] = [
        Self::Bang,
        Self::Missed,
        Self::Beer,
        Self::Saloon,
        Self::Stagecoach,
        Self::WellsFargo,
        Self::Panic,
        Self::CatBalou,
        Self::Duel,
        Self::Gatling,
        Self::Indians,
        Self::GeneralStore,
        Self::Barrel,
        Self::Mustang,
        Self::Scope,
        Self::Jail,
        Self::Dynamite,
        Self::Volcanic,
        Self::Schofield,
        Self::Remington,
        Self::RevCarabine,
        Self::Winchester,
    ];

    #[must_use]
    pub const fn category(self) -> CardCategory {
        match self {
            Self::Bang => CardCategory::Attack,
            Self::Missed => CardCategory::Defense,
            Self::Beer => CardCategory::Heal,
            Self::Saloon => CardCategory::GroupHeal,
            Self::Stagecoach | Self::WellsFargo => CardCategory::Draw,
            Self::Panic => CardCategory::Steal,
            Self::CatBalou => CardCategory::DiscardTarget,
            Self::Duel => CardCategory::Duel,
            Self::Gatling | Self::Indians => CardCategory::AreaAttack,
            Self::GeneralStore => CardCategory::Market,
            Self::Barrel | Self::Mustang | Self::Scope | Self::Jail | Self::Dynamite => {
                CardCategory::Equipment
            }
            Self::Volcanic
            | Self::Schofield
            | Self::Remington
            | Self::RevCarabine
            | Self::Winchester => CardCategory::Weapon,
        }
    }

    #[must_use]
    pub const fn color(self) -> CardColor {
        match self.category() {
            CardCategory::Equipment | CardCategory::Weapon => CardColor::Blue,
            _ => CardColor::Brown,
        }
    }

    /// Reach of a weapon card, `None` for everything else.
    #[must_use]
    pub const fn weapon_range(self) -> Option<u8> {
        match self {
            Self::Volcanic => Some(1),
            Self::Schofield => Some(2),
            Self::Remington => Some(3),
            Self::RevCarabine => Some(4),
            Self::Winchester => Some(5),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_weapon(self) -> bool {
        self.weapon_range().is_some()
    }

    /// Whether playing the card names a single other player.
    #[must_use]
    pub const fn needs_target(self) -> bool {
        matches!(
            self,
            Self::Bang | Self::Panic | Self::CatBalou | Self::Duel | Self::Jail
        )
    }

    /// Number of cards the draw cards hand out.
    #[must_use]
    pub const fn draw_count(self) -> usize {
        match self {
            Self::Stagecoach => 2,
            Self::WellsFargo => 3,
            _ => 0,
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Bang => "BANG!",
            Self::Missed => "Missed!",
            Self::Beer => "Beer",
            Self::Saloon => "Saloon",
            Self::Stagecoach => "Stagecoach",
            Self::WellsFargo => "Wells Fargo",
            Self::Panic => "Panic!",
            Self::CatBalou => "Cat Balou",
            Self::Duel => "Duel",
            Self::Gatling => "Gatling",
            Self::Indians => "Indians!",
            Self::GeneralStore => "General Store",
            Self::Barrel => "Barrel",
            Self::Mustang => "Mustang",
            Self::Scope => "Scope",
            Self::Jail => "Jail",
            Self::Dynamite => "Dynamite",
            Self::Volcanic => "Volcanic",
            Self::Schofield => "Schofield",
            Self::Remington => "Remington",
            Self::RevCarabine => "Rev. Carabine",
            Self::Winchester => "Winchester",
        }
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The full deck, card kind by card kind. Values run 1 (ace) to 13 (king).
///
/// These counts are balance-sensitive; [`DECK_SIZE`](super::constants::DECK_SIZE)
/// must equal the sum of every row.
pub const DECK_TABLE: &[(CardKind, &[(Value, Suit)])] = &[
    (
        CardKind::Bang,
        &[
            (1, S),
            (2, D),
            (3, D),
            (4, D),
            (5, D),
            (6, D),
            (7, D),
            (8, D),
            (9, D),
            (10, D),
            (11, D),
            (12, D),
            (13, D),
            (1, D),
            (12, H),
            (13, H),
            (1, H),
            (2, C),
            (3, C),
            (4, C),
            (5, C),
            (6, C),
            (7, C),
            (8, C),
            (9, C),
        ],
    ),
    (
        CardKind::Missed,
        &[
            (10, C),
            (11, C),
            (12, C),
            (13, C),
            (1, C),
            (2, S),
            (3, S),
            (4, S),
            (5, S),
            (6, S),
            (7, S),
            (8, S),
        ],
    ),
    (
        CardKind::Beer,
        &[(6, H), (7, H), (8, H), (9, H), (10, H), (11, H)],
    ),
    (CardKind::Panic, &[(11, H), (12, H), (1, H), (8, D)]),
    (CardKind::CatBalou, &[(13, H), (9, D), (10, D), (11, D)]),
    (CardKind::Stagecoach, &[(9, S), (9, S)]),
    (CardKind::WellsFargo, &[(3, H)]),
    (CardKind::Gatling, &[(10, H)]),
    (CardKind::Duel, &[(12, D), (11, S), (8, C)]),
    (CardKind::Indians, &[(13, D), (1, D)]),
    (CardKind::GeneralStore, &[(9, C), (12, S)]),
    (CardKind::Saloon, &[(5, H)]),
    (CardKind::Barrel, &[(12, S), (13, S)]),
    (CardKind::Scope, &[(1, S)]),
    (CardKind::Mustang, &[(8, H), (9, H)]),
    (CardKind::Jail, &[(11, S), (4, H), (10, S)]),
    (CardKind::Dynamite, &[(2, H)]),
    (CardKind::Volcanic, &[(10, S), (10, C)]),
    (CardKind::Schofield, &[(11, C), (12, C), (13, S)]),
    (CardKind::Remington, &[(13, C)]),
    (CardKind::RevCarabine, &[(1, C)]),
    (CardKind::Winchester, &[(8, S)]),
];

/// How many copies of `kind` a deck contains.
#[must_use]
pub fn copies_of(kind: CardKind) -> usize {
    DECK_TABLE
        .iter()
        .find(|(k, _)| *k == kind)
        .map_or(0, |(_, cards)| cards.len())
}
