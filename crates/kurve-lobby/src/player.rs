//! Players: named participants inside a room.
//!
//! A player is distinct from the connection that owns it — one
//! connection may register several players in its room (local
//! multiplayer on a shared keyboard).

use kurve_protocol::{ConnectionId, PlayerId, PlayerSnapshot};
use rand::Rng;

/// Default colors handed to new players, picked at random.
pub const PALETTE: [&str; 8] = [
    "#FF2222", "#33CC33", "#3399FF", "#FFCC11", "#FF44AA", "#22DDDD", "#FF8800", "#9966FF",
];

/// Checks a color against the wire format: `#` followed by exactly six
/// hex digits.
pub fn validate_color(color: &str) -> bool {
    let Some(hex) = color.strip_prefix('#') else {
        return false;
    };
    hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// A named participant in a room.
#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    connection: ConnectionId,
    name: String,
    color: String,
    ready: bool,
}

impl Player {
    /// Creates a player with a random palette color, not ready.
    pub(crate) fn new(id: PlayerId, connection: ConnectionId, name: String) -> Self {
        let color = PALETTE[rand::rng().random_range(0..PALETTE.len())];
        Self {
            id,
            connection,
            name,
            color: color.to_string(),
            ready: false,
        }
    }

    /// Room-scoped numeric identity.
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// The connection that registered this player.
    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Flips the ready flag and returns the new value.
    pub fn toggle_ready(&mut self) -> bool {
        self.ready = !self.ready;
        self.ready
    }

    /// Validates and applies a new color. Returns `false` (leaving the
    /// current color untouched) when the format is invalid.
    pub fn set_color(&mut self, color: &str) -> bool {
        if !validate_color(color) {
            return false;
        }
        self.color = color.to_string();
        true
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            name: self.name.clone(),
            color: self.color.clone(),
            ready: self.ready,
        }
    }
}
