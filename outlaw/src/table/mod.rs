//! Table module providing concurrent matches with an async actor model.
//!
//! This module implements:
//! - MatchActor: async actor owning a single match
//! - MatchManager: registry spawning and addressing match actors
//! - Message-based communication with tokio channels
//!
//! ## Architecture
//!
//! Each match runs in a separate Tokio task with an mpsc message inbox, so
//! commands to one match are applied one at a time while different matches
//! proceed in parallel. Requests carry a oneshot reply channel.
//!
//! ## Example
//!
//! ```no_run
//! use outlaw::{
//!     game::{Command, DrawOptions, Seat},
//!     table::{MatchConfig, MatchManager},
//! };
//!
//! # async fn demo() -> Result<(), outlaw::table::TableError> {
//! let manager = MatchManager::new();
//! let roster = ["ann", "bo", "cy", "di"].map(|id| Seat::new(id, id)).to_vec();
//! let (match_id, _events) = manager.create_match(roster, MatchConfig::seeded(1)).await?;
//!
//! let status = manager.get_status(match_id).await?;
//! if let Some(current) = status.current_player {
//!     manager
//!         .send_command(match_id, current, Command::Draw(DrawOptions::default()))
//!         .await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod config;
pub mod errors;
pub mod manager;
pub mod messages;

pub use actor::{MatchActor, MatchHandle};
pub use config::MatchConfig;
pub use errors::{TableError, TableResult};
pub use manager::MatchManager;
pub use messages::{MatchMessage, MatchNotification, MatchStatus};
