//! Card game rules engine.
//!
//! This module provides the whole synchronous game:
//! - Card catalog, character abilities and deck/role assignment
//! - Match state with distance, targeting and draw pile upkeep
//! - The turn/reaction engine that validates and resolves commands
//! - Domain events and per-viewer projections

pub mod catalog;
pub mod characters;
pub mod constants;
pub mod deck;
pub mod engine;
pub mod entities;
pub mod errors;
pub mod events;
pub mod state;
pub mod views;

pub use catalog::{CardCategory, CardColor, CardKind};
pub use characters::{Ability, Character};
pub use engine::{Command, DrawOptions, DrawSource, Response};
pub use entities::{Card, CardId, Player, PlayerId, Role, Seat, SeatIndex, Suit, Team};
pub use errors::{ActionError, GameResult, SetupError};
pub use events::{CheckReason, GameEvent};
pub use state::{Match, MatchId, Outcome, Phase, ReactionKind};
pub use views::{MatchView, MatchViews, PlayerView};
