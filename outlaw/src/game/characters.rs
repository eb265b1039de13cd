//! Character catalog.
//!
//! Each character is a unit struct implementing [`Ability`]. The engine calls
//! every hook unconditionally; the default bodies are the behaviour of a
//! character without that ability, so effect resolution never has to ask
//! "which character is this?".

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::catalog::CardKind;

/// How a character takes cards during their draw phase.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum DrawPlan {
    /// Two cards off the top of the draw pile.
    Standard,
    /// Two cards; the second is shown and a red suit earns a third.
    RevealSecond,
    /// Look at three, keep two, put one back.
    KeepTwoOfThree,
    /// First card may come at random from another player's hand.
    FirstFromPlayer,
    /// First card may come from the top of the discard pile.
    FirstFromDiscard,
}

/// What happens, per life point lost, to a character that survives damage.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum DamageReaction {
    None,
    DrawFromDeck,
    StealFromSource,
}

#[enum_dispatch]
pub trait Ability {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn base_health(&self) -> u8 {
        4
    }

    fn draw_plan(&self) -> DrawPlan {
        DrawPlan::Standard
    }

    fn unlimited_attacks(&self) -> bool {
        false
    }

    /// Added to the distance other players measure to this character.
    fn incoming_distance(&self) -> i32 {
        0
    }

    /// Added to the distance this character measures to others.
    fn outgoing_distance(&self) -> i32 {
        0
    }

    fn innate_barrel(&self) -> bool {
        false
    }

    /// Missed cards a target needs to cancel this character's Bang.
    fn defenses_demanded(&self) -> u8 {
        1
    }

    /// Whether `played` may stand in for a required `required` card.
    fn substitutes(&self, played: CardKind, required: CardKind) -> bool {
        played == required
    }

    /// Cards flipped for every check; the best one counts.
    fn check_flips(&self) -> usize {
        1
    }

    fn on_damaged(&self) -> DamageReaction {
        DamageReaction::None
    }

    /// Takes every card of an eliminated player instead of the discard pile.
    fn scavenges(&self) -> bool {
        false
    }

    fn refills_empty_hand(&self) -> bool {
        false
    }

    fn heals_by_discarding(&self) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct BartCassidy;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct BlackJack;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct CalamityJanet;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ElGringo;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct JesseJones;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Jourdonnais;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct KitCarlson;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct LuckyDuke;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct PaulRegret;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct PedroRamirez;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct RoseDoolan;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct SidKetchum;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct SlabTheKiller;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct SuzyLafayette;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct VultureSam;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct WillyTheKid;

#[enum_dispatch(Ability)]
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Character {
    BartCassidy(BartCassidy),
    BlackJack(BlackJack),
    CalamityJanet(CalamityJanet),
    ElGringo(ElGringo),
    JesseJones(JesseJones),
    Jourdonnais(Jourdonnais),
    KitCarlson(KitCarlson),
    LuckyDuke(LuckyDuke),
    PaulRegret(PaulRegret),
    PedroRamirez(PedroRamirez),
    RoseDoolan(RoseDoolan),
    SidKetchum(SidKetchum),
    SlabTheKiller(SlabTheKiller),
    SuzyLafayette(SuzyLafayette),
    VultureSam(VultureSam),
    WillyTheKid(WillyTheKid),
}

impl Character {
    pub const ALL: [Character; 16] = [
        Character::BartCassidy(BartCassidy),
        Character::BlackJack(BlackJack),
        Character::CalamityJanet(CalamityJanet),
        Character::ElGringo(ElGringo),
        Character::JesseJones(JesseJones),
        Character::Jourdonnais(Jourdonnais),
        Character::KitCarlson(KitCarlson),
        Character::LuckyDuke(LuckyDuke),
        Character::PaulRegret(PaulRegret),
        Character::PedroRamirez(PedroRamirez),
        Character::RoseDoolan(RoseDoolan),
        Character::SidKetchum(SidKetchum),
        Character::SlabTheKiller(SlabTheKiller),
        Character::SuzyLafayette(SuzyLafayette),
        Character::VultureSam(VultureSam),
        Character::WillyTheKid(WillyTheKid),
    ];
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Ability for BartCassidy {
    fn name(&self) -> &'static str {
        "Bart Cassidy"
    }

    fn description(&self) -> &'static str {
        "Each time he loses a life point, he immediately draws a card from the deck."
    }

    fn on_damaged(&self) -> DamageReaction {
        DamageReaction::DrawFromDeck
    }
}

impl Ability for BlackJack {
    fn name(&self) -> &'static str {
        "Black Jack"
    }

    fn description(&self) -> &'static str {
        "He shows his second draw; on hearts or diamonds he draws one more card."
    }

    fn draw_plan(&self) -> DrawPlan {
        DrawPlan::RevealSecond
    }
}

impl Ability for CalamityJanet {
    fn name(&self) -> &'static str {
        "Calamity Janet"
    }

    fn description(&self) -> &'static str {
        "She can use BANG! cards as Missed! cards and vice versa."
    }

    fn substitutes(&self, played: CardKind, required: CardKind) -> bool {
        matches!(
            (played, required),
            (CardKind::Bang | CardKind::Missed, CardKind::Bang | CardKind::Missed)
        )
    }
}

impl Ability for ElGringo {
    fn name(&self) -> &'static str {
        "El Gringo"
    }

    fn description(&self) -> &'static str {
        "Each time he loses a life point to another player's card, he draws a random card from that player's hand."
    }

    fn base_health(&self) -> u8 {
        3
    }

    fn on_damaged(&self) -> DamageReaction {
        DamageReaction::StealFromSource
    }
}

impl Ability for JesseJones {
    fn name(&self) -> &'static str {
        "Jesse Jones"
    }

    fn description(&self) -> &'static str {
        "He may draw his first card from another player's hand."
    }

    fn draw_plan(&self) -> DrawPlan {
        DrawPlan::FirstFromPlayer
    }
}

impl Ability for Jourdonnais {
    fn name(&self) -> &'static str {
        "Jourdonnais"
    }

    fn description(&self) -> &'static str {
        "He is considered to have a Barrel in play at all times."
    }

    fn innate_barrel(&self) -> bool {
        true
    }
}

impl Ability for KitCarlson {
    fn name(&self) -> &'static str {
        "Kit Carlson"
    }

    fn description(&self) -> &'static str {
        "He looks at the top three cards, keeps two and puts the other back."
    }

    fn draw_plan(&self) -> DrawPlan {
        DrawPlan::KeepTwoOfThree
    }
}

impl Ability for LuckyDuke {
    fn name(&self) -> &'static str {
        "Lucky Duke"
    }

    fn description(&self) -> &'static str {
        "Each time he must draw!, he flips two cards and chooses the result."
    }

    fn check_flips(&self) -> usize {
        2
    }
}

impl Ability for PaulRegret {
    fn name(&self) -> &'static str {
        "Paul Regret"
    }

    fn description(&self) -> &'static str {
        "He is considered to have a Mustang in play at all times."
    }

    fn base_health(&self) -> u8 {
        3
    }

    fn incoming_distance(&self) -> i32 {
        1
    }
}

impl Ability for PedroRamirez {
    fn name(&self) -> &'static str {
        "Pedro Ramirez"
    }

    fn description(&self) -> &'static str {
        "He may draw his first card from the top of the discard pile."
    }

    fn draw_plan(&self) -> DrawPlan {
        DrawPlan::FirstFromDiscard
    }
}

impl Ability for RoseDoolan {
    fn name(&self) -> &'static str {
        "Rose Doolan"
    }

    fn description(&self) -> &'static str {
        "She is considered to have a Scope in play at all times."
    }

    fn outgoing_distance(&self) -> i32 {
        -1
    }
}

impl Ability for SidKetchum {
    fn name(&self) -> &'static str {
        "Sid Ketchum"
    }

    fn description(&self) -> &'static str {
        "He may discard two cards from his hand to regain one life point at any time."
    }

    fn heals_by_discarding(&self) -> bool {
        true
    }
}

impl Ability for SlabTheKiller {
    fn name(&self) -> &'static str {
        "Slab the Killer"
    }

    fn description(&self) -> &'static str {
        "Players need two Missed! cards to cancel his BANG!"
    }

    fn defenses_demanded(&self) -> u8 {
        2
    }
}

impl Ability for SuzyLafayette {
    fn name(&self) -> &'static str {
        "Suzy Lafayette"
    }

    fn description(&self) -> &'static str {
        "As soon as she has no cards in hand, she draws a card from the deck."
    }

    fn refills_empty_hand(&self) -> bool {
        true
    }
}

impl Ability for VultureSam {
    fn name(&self) -> &'static str {
        "Vulture Sam"
    }

    fn description(&self) -> &'static str {
        "Whenever a character is eliminated, he takes all of that player's cards."
    }

    fn scavenges(&self) -> bool {
        true
    }
}

impl Ability for WillyTheKid {
    fn name(&self) -> &'static str {
        "Willy the Kid"
    }

    fn description(&self) -> &'static str {
        "He can play any number of BANG! cards during his turn."
    }

    fn unlimited_attacks(&self) -> bool {
        true
    }
}
