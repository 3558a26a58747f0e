//! The match handoff contract.
//!
//! When a room's players are all ready, the lobby controller asks the
//! driver for a match and then delegates ownership of the room's
//! connections to it, one `attach` per member. From that point the
//! match subsystem owns those connections' event streams; the lobby
//! stops broadcasting to them. On completion the driver sends one
//! [`MatchEnded`] on the channel it was given, and the lobby takes the
//! connections back.

use std::fmt;

use tokio::sync::mpsc;

use kurve_protocol::{ConnectionId, PlayerSnapshot, ServerFrame};

use crate::MatchError;

/// Outbound channel for one connection. Whoever holds this may push
/// frames to that client; handing it to the driver *is* the handoff.
pub type ConnectionSender = mpsc::UnboundedSender<ServerFrame>;

/// Channel on which a driver reports match completion.
pub type MatchEndSender = mpsc::UnboundedSender<MatchEnded>;

/// A unique identifier for a running match, assigned by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchId(pub u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "match-{}", self.0)
    }
}

/// Everything the match subsystem needs to set up a match for a room.
#[derive(Debug, Clone)]
pub struct MatchSeed {
    /// Name of the room the match belongs to.
    pub room: String,
    /// The players at readiness time, in room order.
    pub players: Vec<PlayerSnapshot>,
}

/// Handle to a running match, returned by [`MatchDriver::start`].
///
/// The lobby stores this on the room while the match is active and
/// passes it back for `stop`/`attach`/`detach`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchHandle {
    pub id: MatchId,
    pub room: String,
}

/// Completion signal: the match for `room` is over.
///
/// Arrives asynchronously relative to lobby event processing — the
/// lobby treats it as an interrupt and must find consistent state
/// (room still registered, or already closed; never half-closed).
#[derive(Debug, Clone)]
pub struct MatchEnded {
    pub room: String,
}

/// The narrow interface the lobby uses to run matches.
///
/// Implementations live in the match subsystem. `start` is the only
/// fallible operation; a rejection leaves the room in no-match state
/// and is reported by the lobby as a failed readiness trigger.
pub trait MatchDriver: Send + Sync + 'static {
    /// Constructs a match for the seeded room. The driver keeps
    /// `on_end` and sends exactly one [`MatchEnded`] when play stops.
    fn start(&self, seed: MatchSeed, on_end: MatchEndSender) -> Result<MatchHandle, MatchError>;

    /// Tears down a match early (e.g. its room emptied out). The driver
    /// must not send [`MatchEnded`] for a stopped match.
    fn stop(&self, handle: &MatchHandle);

    /// Takes ownership of one connection's event stream.
    fn attach(&self, handle: &MatchHandle, connection: ConnectionId, sender: ConnectionSender);

    /// Releases one connection's event stream back to the caller.
    fn detach(&self, handle: &MatchHandle, connection: ConnectionId);
}
