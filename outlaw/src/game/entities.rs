use serde::{Deserialize, Deserializer, Serialize};
use std::{
    borrow::Borrow,
    fmt::{self},
};

use super::{
    catalog::{CardColor, CardKind},
    characters::{Ability, Character},
    constants::{ATTACKS_PER_TURN, DEFAULT_WEAPON_RANGE, SHERIFF_BONUS_HEALTH},
};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    #[must_use]
    pub const fn is_red(self) -> bool {
        matches!(self, Self::Hearts | Self::Diamonds)
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Clubs => "♣",
            Self::Diamonds => "♦",
            Self::Hearts => "♥",
            Self::Spades => "♠",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values. Ace is 1, king is 13.
pub type Value = u8;

/// Identifier of a single physical card, unique within a match.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct CardId(pub u16);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A physical card. Cards are never copied between zones, only moved.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Card {
    pub id: CardId,
    pub kind: CardKind,
    pub suit: Suit,
    pub value: Value,
}

impl Card {
    #[must_use]
    pub const fn new(id: CardId, kind: CardKind, suit: Suit, value: Value) -> Self {
        Self {
            id,
            kind,
            suit,
            value,
        }
    }

    #[must_use]
    pub const fn color(&self) -> CardColor {
        self.kind.color()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.value {
            1 => "A".to_string(),
            11 => "J".to_string(),
            12 => "Q".to_string(),
            13 => "K".to_string(),
            v => v.to_string(),
        };
        write!(f, "{} [{value}{}]", self.kind, self.suit)
    }
}

/// Identity of a seated player, handed to the engine by the lobby.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(s: &str) -> Self {
        Self(s.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for PlayerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Type alias for seat positions around the table.
pub type SeatIndex = usize;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Role {
    Sheriff,
    Deputy,
    Outlaw,
    Renegade,
}

impl Role {
    #[must_use]
    pub const fn objective(self) -> &'static str {
        match self {
            Self::Sheriff => "Eliminate all Outlaws and the Renegade",
            Self::Deputy => "Protect the Sheriff at all costs",
            Self::Outlaw => "Kill the Sheriff",
            Self::Renegade => "Be the last one standing",
        }
    }

    /// The side this role wins with.
    #[must_use]
    pub const fn team(self) -> Team {
        match self {
            Self::Sheriff | Self::Deputy => Team::Law,
            Self::Outlaw => Team::Outlaws,
            Self::Renegade => Team::Renegade,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Sheriff => "Sheriff",
            Self::Deputy => "Deputy",
            Self::Outlaw => "Outlaw",
            Self::Renegade => "Renegade",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Team {
    /// Sheriff and deputies.
    Law,
    Outlaws,
    Renegade,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Law => "the law",
            Self::Outlaws => "the outlaws",
            Self::Renegade => "the renegade",
        };
        write!(f, "{repr}")
    }
}

/// Entry of the roster the lobby hands over when a match starts.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Seat {
    pub id: PlayerId,
    pub name: String,
}

impl Seat {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: PlayerId::new(id),
            name: name.to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub seat: SeatIndex,
    pub role: Role,
    pub character: Character,
    pub health: u8,
    pub max_health: u8,
    pub alive: bool,
    /// Cleared when the player walks away from the match.
    pub connected: bool,
    pub hand: Vec<Card>,
    /// Blue cards other than the weapon, at most one of each kind.
    pub in_play: Vec<Card>,
    pub weapon: Option<Card>,
    pub attacks_this_turn: u8,
}

impl Player {
    #[must_use]
    pub fn new(seat: Seat, index: SeatIndex, role: Role, character: Character) -> Self {
        let mut max_health = character.base_health();
        if role == Role::Sheriff {
            max_health += SHERIFF_BONUS_HEALTH;
        }
        Self {
            id: seat.id,
            name: seat.name,
            seat: index,
            role,
            character,
            health: max_health,
            max_health,
            alive: true,
            connected: true,
            hand: Vec::with_capacity(max_health as usize),
            in_play: Vec::new(),
            weapon: None,
            attacks_this_turn: 0,
        }
    }

    #[must_use]
    pub fn is_sheriff(&self) -> bool {
        self.role == Role::Sheriff
    }

    /// Cards a player may keep at the end of their turn.
    #[must_use]
    pub fn hand_limit(&self) -> usize {
        self.health as usize
    }

    #[must_use]
    pub fn is_injured(&self) -> bool {
        self.health < self.max_health
    }

    #[must_use]
    pub fn weapon_range(&self) -> u8 {
        self.weapon
            .and_then(|card| card.kind.weapon_range())
            .unwrap_or(DEFAULT_WEAPON_RANGE)
    }

    #[must_use]
    pub fn has_in_play(&self, kind: CardKind) -> bool {
        self.in_play.iter().any(|card| card.kind == kind)
    }

    #[must_use]
    pub fn has_barrel(&self) -> bool {
        self.character.innate_barrel() || self.has_in_play(CardKind::Barrel)
    }

    /// Distance others must add to reach this player. Stacks a real Mustang
    /// with an innate one.
    #[must_use]
    pub fn incoming_modifier(&self) -> i32 {
        let mustang = i32::from(self.has_in_play(CardKind::Mustang));
        mustang + self.character.incoming_distance()
    }

    /// Distance this player subtracts when reaching others.
    #[must_use]
    pub fn outgoing_modifier(&self) -> i32 {
        let scope = i32::from(self.has_in_play(CardKind::Scope));
        self.character.outgoing_distance() - scope
    }

    #[must_use]
    pub fn can_attack(&self) -> bool {
        self.character.unlimited_attacks()
            || self.weapon.is_some_and(|w| w.kind == CardKind::Volcanic)
            || self.attacks_this_turn < ATTACKS_PER_TURN
    }

    #[must_use]
    pub fn hand_card(&self, id: CardId) -> Option<&Card> {
        self.hand.iter().find(|card| card.id == id)
    }

    pub fn take_from_hand(&mut self, id: CardId) -> Option<Card> {
        let idx = self.hand.iter().position(|card| card.id == id)?;
        Some(self.hand.remove(idx))
    }

    /// Removes a specific card from play or the weapon slot.
    pub fn take_equipment(&mut self, id: CardId) -> Option<Card> {
        if let Some(idx) = self.in_play.iter().position(|card| card.id == id) {
            return Some(self.in_play.remove(idx));
        }
        if self.weapon.is_some_and(|w| w.id == id) {
            return self.weapon.take();
        }
        None
    }

    pub fn take_first_equipment(&mut self) -> Option<Card> {
        if self.in_play.is_empty() {
            self.weapon.take()
        } else {
            Some(self.in_play.remove(0))
        }
    }

    pub fn take_in_play(&mut self, kind: CardKind) -> Option<Card> {
        let idx = self.in_play.iter().position(|card| card.kind == kind)?;
        Some(self.in_play.remove(idx))
    }

    /// Total cards this player owns across hand, play area and weapon slot.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.hand.len() + self.in_play.len() + usize::from(self.weapon.is_some())
    }

    /// Empties hand, play area and weapon slot.
    pub fn strip(&mut self) -> Vec<Card> {
        let mut cards: Vec<Card> = self.hand.drain(..).collect();
        cards.append(&mut self.in_play);
        cards.extend(self.weapon.take());
        cards
    }

    pub fn reset_turn(&mut self) {
        self.attacks_this_turn = 0;
    }
}
