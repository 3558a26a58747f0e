//! Identity types and serialized snapshots.
//!
//! Everything here either travels on the wire (snapshots, [`PlayerId`])
//! or deliberately does not ([`ConnectionId`]). Room and player
//! snapshots are the *only* shapes clients ever see — they carry names,
//! room-scoped ids, colors and ready flags, never a connection identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for a transport connection.
///
/// Assigned by the server accept loop, monotonically increasing for the
/// lifetime of the process. This is a server-internal handle: it has no
/// `Serialize` impl on purpose, so it can never leak into an outbound
/// event by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A player's numeric identity, unique within one room.
///
/// Allocated by the room when a player is added. A connection may own
/// several players in its room (local multiplayer on one keyboard), and
/// references them by this id in `room:talk`, `room:ready` and
/// `room:color` requests.
///
/// `#[serde(transparent)]` makes a `PlayerId(3)` appear as plain `3`
/// in JSON, matching what client SDKs expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player-{}", self.0)
    }
}

/// The serialized view of a player, as carried by `room:new` and
/// `room:join` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Room-scoped numeric id.
    pub id: PlayerId,
    /// Display name, unique within the room.
    pub name: String,
    /// Hex color, `#RRGGBB`.
    pub color: String,
    /// Current ready flag.
    pub ready: bool,
}

/// The serialized view of a room, as carried by `room:new` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    /// The room's unique name.
    pub name: String,
    /// Players currently registered in the room.
    pub players: Vec<PlayerSnapshot>,
}
