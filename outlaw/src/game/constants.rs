//! Fixed numbers that shape a match.

/// Smallest table a match can be started with.
pub const MIN_PLAYERS: usize = 4;

/// Largest table a match can be started with.
pub const MAX_PLAYERS: usize = 7;

/// Number of cards in a freshly built deck. Every match conserves this total.
pub const DECK_SIZE: usize = 80;

/// Cards taken during an ordinary draw phase.
pub const DRAW_PHASE_CARDS: usize = 2;

/// Cards Kit Carlson looks at before keeping [`DRAW_PHASE_CARDS`] of them.
pub const KIT_CARLSON_PREVIEW: usize = 3;

/// Range of the colt every player carries when no weapon is in play.
pub const DEFAULT_WEAPON_RANGE: u8 = 1;

/// Bang cards a player without an override may play per turn.
pub const ATTACKS_PER_TURN: u8 = 1;

/// Damage dealt when dynamite explodes.
pub const DYNAMITE_DAMAGE: u8 = 3;

/// Cards drawn as a reward for eliminating an outlaw.
pub const OUTLAW_BOUNTY: usize = 3;

/// Hand cards Sid Ketchum discards to regain a life point.
pub const SID_KETCHUM_DISCARD: usize = 2;

/// Extra life point the sheriff starts with.
pub const SHERIFF_BONUS_HEALTH: u8 = 1;
