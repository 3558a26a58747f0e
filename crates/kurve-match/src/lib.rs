//! The lobby's narrow view of the live-match subsystem.
//!
//! The actual simulation (movement, collision, scoring) lives outside
//! this workspace. What the lobby needs from it is small:
//!
//! - [`MatchDriver`] — start a match for a room, stop it, and hand
//!   individual connections over and back.
//! - [`MatchEnded`] — the completion signal, delivered on the channel
//!   given to [`MatchDriver::start`].
//! - [`Bonus`] / [`BonusKind`] — the pickup-effect contract the match
//!   loop consumes: constant per-kind data plus `apply_to`/`clear`
//!   behavior, selected by tag.

mod bonus;
mod driver;
mod error;

pub use bonus::{Bonus, BonusActor, BonusAffect, BonusId, BonusKind, BonusSnapshot};
pub use driver::{
    ConnectionSender, MatchDriver, MatchEndSender, MatchEnded, MatchHandle, MatchId, MatchSeed,
};
pub use error::MatchError;
