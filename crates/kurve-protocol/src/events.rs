//! The `room:*` event namespace and the frame model.
//!
//! The protocol is a symmetric event-with-optional-callback model over
//! a persistent connection:
//!
//! - A client sends a [`ClientFrame`]: an event plus an optional
//!   `callback` id. When the id is present, the server answers with a
//!   [`ServerFrame::Callback`] carrying an [`Ack`] for that id.
//! - The server pushes [`ServerEvent`] broadcasts at any time, either
//!   to one connection, to a room, or to the whole lobby.
//!
//! Event names are the wire-level tags (`"room:create"`,
//! `"room:player:ready"`, ...) — the serde renames below are the
//! protocol contract, and the tests pin every one of them.

use serde::{Deserialize, Serialize};

use crate::{PlayerId, PlayerSnapshot, RoomSnapshot};

// ---------------------------------------------------------------------------
// Inbound events
// ---------------------------------------------------------------------------

/// An event sent by a client to the lobby.
///
/// `#[serde(tag = "event")]` produces internally tagged JSON:
/// `{ "event": "room:create", "name": "alpha" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ClientEvent {
    /// Request a full push of the current room list (`room:new` per room).
    #[serde(rename = "room:fetch")]
    Fetch,

    /// Create a room with the given name.
    #[serde(rename = "room:create")]
    Create { name: String },

    /// Join the named room.
    #[serde(rename = "room:join")]
    Join { room: String },

    /// Say something in the current room, as one of the caller's players.
    #[serde(rename = "room:talk")]
    Talk { player: PlayerId, content: String },

    /// Leave the current room.
    #[serde(rename = "room:leave")]
    Leave,

    /// Register a new player in the current room.
    #[serde(rename = "room:player:add")]
    AddPlayer { name: String },

    /// Toggle the ready flag of one of the caller's players.
    #[serde(rename = "room:ready")]
    Ready { player: PlayerId },

    /// Change the color of one of the caller's players.
    #[serde(rename = "room:color")]
    Color { player: PlayerId, color: String },
}

// ---------------------------------------------------------------------------
// Outbound events
// ---------------------------------------------------------------------------

/// An event pushed by the lobby to clients.
///
/// Each carries the minimal snapshot of what changed: the room name,
/// and where relevant the player name/id and the changed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ServerEvent {
    /// A room exists (newly created, or part of a `room:fetch` sync).
    #[serde(rename = "room:new")]
    RoomNew { room: RoomSnapshot },

    /// A room was removed from the lobby.
    #[serde(rename = "room:close")]
    RoomClose { room: String },

    /// A player was registered in a room.
    #[serde(rename = "room:join")]
    RoomJoin { room: String, player: PlayerSnapshot },

    /// A player left a room (its owning connection departed).
    #[serde(rename = "room:leave")]
    RoomLeave { room: String, player: String },

    /// Chat line from a player in a room.
    #[serde(rename = "room:talk")]
    RoomTalk {
        room: String,
        player: String,
        content: String,
    },

    /// A player changed color.
    #[serde(rename = "room:player:color")]
    PlayerColor {
        room: String,
        player: String,
        color: String,
    },

    /// A player toggled readiness.
    #[serde(rename = "room:player:ready")]
    PlayerReady {
        room: String,
        player: String,
        ready: bool,
    },

    /// A match is starting (or already running, when sent to a late joiner).
    #[serde(rename = "room:game:start")]
    GameStart { room: String },

    /// A match finished; the room is back in the lobby.
    #[serde(rename = "room:game:end")]
    GameEnd { room: String },
}

// ---------------------------------------------------------------------------
// Callback results
// ---------------------------------------------------------------------------

/// The result payload of a request callback.
///
/// One flat shape covers every operation: `success` is always present,
/// the optional fields appear only for the operations that report them
/// (`room` for create, `ready` for ready toggles, `color` for color
/// changes — including *failed* color changes, which report the current
/// color unchanged).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Ack {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Ack {
    /// Plain success, no extra fields.
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// Plain failure, no extra fields.
    pub fn fail() -> Self {
        Self::default()
    }

    /// Successful room creation, reporting the assigned name.
    pub fn room(name: impl Into<String>) -> Self {
        Self {
            success: true,
            room: Some(name.into()),
            ..Self::default()
        }
    }

    /// Result of a ready toggle.
    pub fn ready(success: bool, ready: bool) -> Self {
        Self {
            success,
            ready: Some(ready),
            ..Self::default()
        }
    }

    /// Result of a color change. On failure `color` carries the current
    /// color when the player could be resolved at all.
    pub fn color(success: bool, color: Option<String>) -> Self {
        Self {
            success,
            color,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// The top-level inbound wire shape: an event plus an optional callback id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientFrame {
    /// Client-chosen id echoed back in the matching [`ServerFrame::Callback`].
    /// Absent for fire-and-forget events (`room:fetch`, `room:leave`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<u64>,

    #[serde(flatten)]
    pub event: ClientEvent,
}

/// The top-level outbound wire shape: either a callback answer or a
/// pushed event. The two are distinguished structurally — answers have
/// a `callback` field, events an `event` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerFrame {
    /// The answer to a [`ClientFrame`] that carried a callback id.
    Callback { callback: u64, result: Ack },

    /// A pushed broadcast event.
    Event {
        #[serde(flatten)]
        event: ServerEvent,
    },
}

impl From<ServerEvent> for ServerFrame {
    fn from(event: ServerEvent) -> Self {
        Self::Event { event }
    }
}
