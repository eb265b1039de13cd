//! Game error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    catalog::CardKind,
    entities::{CardId, PlayerId},
    state::Phase,
};

/// Reasons a command is refused. A refused command never changes the match.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum ActionError {
    #[error("not your turn")]
    NotYourTurn,
    #[error("can't do that during {phase}")]
    WrongPhase { phase: Phase },
    #[error("not your turn to respond")]
    NotResponder,
    #[error("card {0} not in hand")]
    CardNotInHand(CardId),
    #[error("player {0} does not exist")]
    UnknownPlayer(PlayerId),
    #[error("player {0} is dead")]
    DeadPlayer(PlayerId),
    #[error("invalid target")]
    InvalidTarget,
    #[error("target is out of range")]
    OutOfRange,
    #[error("no more attacks this turn")]
    AttackLimitReached,
    #[error("{0} doesn't answer this")]
    InvalidResponse(CardKind),
    #[error("ability unavailable")]
    AbilityUnavailable,
    #[error("{0} already in play")]
    DuplicateEquipment(CardKind),
    #[error("{0} would have no effect")]
    NoEffect(CardKind),
    #[error("card {0} is not on offer")]
    MarketCardUnavailable(CardId),
    #[error("invalid draw choice")]
    InvalidDrawChoice,
    #[error("match is over")]
    MatchOver,
}

/// Reasons a match can't be set up.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum SetupError {
    #[error("need 4 to 7 players, got {0}")]
    InvalidPlayerCount(usize),
    #[error("player {0} is seated twice")]
    DuplicatePlayer(PlayerId),
    #[error("requested {requested} characters, only {available} exist")]
    NotEnoughCharacters { requested: usize, available: usize },
}

pub type GameResult<T> = Result<T, ActionError>;
