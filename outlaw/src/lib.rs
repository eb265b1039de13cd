//! # Outlaw
//!
//! Rules engine for a western shootout social-deduction card game for 4 to 7
//! players: a hidden-role team game played with an 80 card deck.
//!
//! ## Architecture
//!
//! A match moves through a small set of phases:
//!
//! - **WaitingForPlayers / Starting**: roster seated, roles and characters dealt
//! - **Draw / ChooseDraw**: the current player draws, some characters choose
//! - **Play**: cards are played one at a time
//! - **Reaction**: targeted players answer an attack in queue order
//! - **Market**: a General Store passes around the table
//! - **Discard**: the hand is trimmed to the health limit
//! - **GameOver**: one team won
//!
//! ## Core Modules
//!
//! - [`game`]: catalog, match state, turn/reaction engine, events and views
//! - [`table`]: per-match actors and the match registry
//!
//! ## Example
//!
//! ```
//! use outlaw::game::{Match, Phase, Seat};
//!
//! let roster = ["ann", "bo", "cy", "di"].map(|id| Seat::new(id, id)).to_vec();
//! let mut game = Match::with_seed(1, roster, Some(42)).unwrap();
//! game.start().unwrap();
//! assert_eq!(game.phase, Phase::Draw);
//! ```

/// Synchronous game rules.
pub mod game;
pub use game::{
    ActionError, Command, GameEvent, GameResult, Match, MatchId, MatchView, Phase, PlayerId, Seat,
    SetupError,
    constants::{self, MAX_PLAYERS, MIN_PLAYERS},
};

/// Match registry and actors.
pub mod table;
pub use table::{MatchConfig, MatchManager, TableError};
