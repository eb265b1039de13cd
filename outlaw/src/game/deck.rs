//! Deck construction and role/character assignment.
//!
//! Everything in here is a pure function of the random source it is handed,
//! so a seeded RNG reproduces a match setup exactly.

use rand::{
    Rng,
    seq::{IndexedRandom, SliceRandom},
};

use super::{
    catalog::DECK_TABLE,
    characters::Character,
    constants::{DECK_SIZE, MAX_PLAYERS, MIN_PLAYERS},
    entities::{Card, CardId, Role},
    errors::SetupError,
};

/// Builds the full deck with sequential ids and shuffles it. The last card
/// of the returned vector is the top of the draw pile.
pub fn build_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    let mut next_id = 0u16;
    for (kind, faces) in DECK_TABLE {
        for &(value, suit) in *faces {
            deck.push(Card::new(CardId(next_id), *kind, suit, value));
            next_id += 1;
        }
    }
    deck.shuffle(rng);
    deck
}

/// Roles for a table of `num_players`, before shuffling.
fn role_table(num_players: usize) -> Result<&'static [Role], SetupError> {
    use Role::{Deputy as D, Outlaw as O, Renegade as R, Sheriff as S};
    let roles: &'static [Role] = match num_players {
        4 => &[S, R, O, O],
        5 => &[S, R, O, O, D],
        6 => &[S, R, O, O, O, D],
        7 => &[S, R, O, O, O, D, D],
        n => return Err(SetupError::InvalidPlayerCount(n)),
    };
    Ok(roles)
}

/// Shuffled roles for a table. Exactly one sheriff and one renegade are
/// always dealt.
pub fn assign_roles<R: Rng + ?Sized>(
    num_players: usize,
    rng: &mut R,
) -> Result<Vec<Role>, SetupError> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players) {
        return Err(SetupError::InvalidPlayerCount(num_players));
    }
    let mut roles = role_table(num_players)?.to_vec();
    roles.shuffle(rng);
    Ok(roles)
}

/// Distinct characters sampled without replacement.
pub fn assign_characters<R: Rng + ?Sized>(
    num_players: usize,
    rng: &mut R,
) -> Result<Vec<Character>, SetupError> {
    let available = Character::ALL.len();
    if num_players > available {
        return Err(SetupError::NotEnoughCharacters {
            requested: num_players,
            available,
        });
    }
    Ok(Character::ALL
        .choose_multiple(rng, num_players)
        .copied()
        .collect())
}
