//! Lobby configuration and name policy.

use serde::{Deserialize, Serialize};

/// Configuration for a lobby instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbyConfig {
    /// Maximum length of a room name, in characters.
    pub max_room_name: usize,

    /// Maximum length of a player name, in characters.
    pub max_player_name: usize,

    /// Minimum player count for a room to be match-ready. A room starts
    /// a match only when it has at least this many players and all of
    /// them are ready. Two is the floor that makes a match meaningful —
    /// one curve alone has nothing to crash into.
    pub min_match_players: usize,

    /// Bound of the controller's command channel.
    pub channel_size: usize,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            max_room_name: 24,
            max_player_name: 24,
            min_match_players: 2,
            channel_size: 64,
        }
    }
}

/// Checks a room or player name against the shared policy: non-empty
/// after trimming, at most `max_len` characters, printable ASCII and
/// spaces only.
///
/// Callers trim before storing; this function assumes a pre-trimmed
/// input.
pub fn validate_name(name: &str, max_len: usize) -> bool {
    !name.is_empty()
        && name.chars().count() <= max_len
        && name.chars().all(|c| c == ' ' || c.is_ascii_graphic())
}
