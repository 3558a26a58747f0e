//! One lobby session: membership, players, and the active match slot.

use std::collections::HashMap;

use kurve_match::{ConnectionSender, MatchHandle};
use kurve_protocol::{ConnectionId, PlayerId, RoomSnapshot, ServerEvent, ServerFrame};

use crate::Player;

/// A named grouping of connections awaiting or running one match.
///
/// Rooms are created by the [`RoomRepository`](crate::RoomRepository)
/// and hold their members' outbound channels so room-scoped events can
/// be delivered without going through the lobby group.
pub struct Room {
    name: String,
    members: HashMap<ConnectionId, ConnectionSender>,
    players: Vec<Player>,
    next_player_id: u32,
    game: Option<MatchHandle>,
}

impl Room {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            members: HashMap::new(),
            players: Vec::new(),
            next_player_id: 1,
            game: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // -- membership --

    /// Adds a member connection. Returns `false` if already a member.
    pub fn add_client(&mut self, connection: ConnectionId, sender: ConnectionSender) -> bool {
        if self.members.contains_key(&connection) {
            return false;
        }
        self.members.insert(connection, sender);
        true
    }

    /// Removes a member and every player it owns, returning the removed
    /// players so the caller can announce their departure.
    ///
    /// Ordering contract: when a match is active the caller detaches the
    /// connection from the match subsystem *before* calling this.
    pub fn remove_client(&mut self, connection: ConnectionId) -> Vec<Player> {
        if self.members.remove(&connection).is_none() {
            return Vec::new();
        }
        let mut departed = Vec::new();
        self.players.retain(|p| {
            if p.connection() == connection {
                departed.push(p.clone());
                false
            } else {
                true
            }
        });
        departed
    }

    pub fn is_member(&self, connection: ConnectionId) -> bool {
        self.members.contains_key(&connection)
    }

    pub fn member_ids(&self) -> Vec<ConnectionId> {
        self.members.keys().copied().collect()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    // -- players --

    /// `true` iff no existing player uses `name`. Comparison is
    /// case-sensitive: "Bob" and "bob" are different players.
    pub fn is_name_available(&self, name: &str) -> bool {
        !self.players.iter().any(|p| p.name() == name)
    }

    /// Registers a player for a member connection. Returns the new
    /// player, or `None` when the connection is not a member or the
    /// name is taken.
    pub fn add_player(&mut self, connection: ConnectionId, name: String) -> Option<&Player> {
        if !self.is_member(connection) || !self.is_name_available(&name) {
            return None;
        }
        let id = PlayerId(self.next_player_id);
        self.next_player_id += 1;
        self.players.push(Player::new(id, connection, name));
        self.players.last()
    }

    /// Resolves a player by id, but only if `connection` owns it.
    pub fn player(&self, connection: ConnectionId, id: PlayerId) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.id() == id && p.connection() == connection)
    }

    /// Mutable variant of [`Room::player`].
    pub fn player_mut(&mut self, connection: ConnectionId, id: PlayerId) -> Option<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id() == id && p.connection() == connection)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    // -- readiness and the match slot --

    /// `true` iff the room holds at least `min_players` players and
    /// every one of them is ready.
    pub fn is_ready(&self, min_players: usize) -> bool {
        self.players.len() >= min_players && self.players.iter().all(Player::is_ready)
    }

    /// Moves the room into match-active state. Returns `false` (and
    /// changes nothing) if a match is already active — the controller
    /// calls this at most once per readiness trigger.
    pub fn start_game(&mut self, handle: MatchHandle) -> bool {
        if self.game.is_some() {
            return false;
        }
        self.game = Some(handle);
        true
    }

    /// Leaves match-active state, returning the released handle. Every
    /// player's ready flag is reset so a finished match cannot
    /// immediately re-trigger.
    pub fn close_game(&mut self) -> Option<MatchHandle> {
        let handle = self.game.take()?;
        for player in &mut self.players {
            player.set_ready(false);
        }
        Some(handle)
    }

    pub fn game(&self) -> Option<&MatchHandle> {
        self.game.as_ref()
    }

    pub fn has_game(&self) -> bool {
        self.game.is_some()
    }

    // -- output --

    /// Delivers an event to every current member. Fire-and-forget.
    pub fn broadcast(&self, event: ServerEvent) {
        let frame = ServerFrame::from(event);
        for sender in self.members.values() {
            let _ = sender.send(frame.clone());
        }
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            name: self.name.clone(),
            players: self.players.iter().map(Player::snapshot).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurve_match::MatchId;
    use tokio::sync::mpsc;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn sender() -> ConnectionSender {
        mpsc::unbounded_channel().0
    }

    fn handle() -> MatchHandle {
        MatchHandle {
            id: MatchId(1),
            room: "alpha".into(),
        }
    }

    fn room_with_member() -> Room {
        let mut room = Room::new("alpha".into());
        room.add_client(conn(1), sender());
        room
    }

    #[test]
    fn test_add_client_rejects_duplicates() {
        let mut room = room_with_member();
        assert!(!room.add_client(conn(1), sender()));
        assert_eq!(room.member_count(), 1);
    }

    #[test]
    fn test_name_availability_is_case_sensitive() {
        let mut room = room_with_member();
        room.add_player(conn(1), "Bob".into()).unwrap();

        assert!(!room.is_name_available("Bob"));
        assert!(room.is_name_available("bob"));
        assert!(room.add_player(conn(1), "bob".into()).is_some());
    }

    #[test]
    fn test_add_player_rejects_taken_name() {
        let mut room = room_with_member();
        assert!(room.add_player(conn(1), "Bob".into()).is_some());
        assert!(room.add_player(conn(1), "Bob".into()).is_none());
        assert_eq!(room.players().len(), 1);
    }

    #[test]
    fn test_add_player_requires_membership() {
        let mut room = room_with_member();
        assert!(room.add_player(conn(2), "Eve".into()).is_none());
    }

    #[test]
    fn test_player_ids_are_unique_within_room() {
        let mut room = room_with_member();
        let a = room.add_player(conn(1), "Ada".into()).unwrap().id();
        let b = room.add_player(conn(1), "Bob".into()).unwrap().id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_player_lookup_is_scoped_to_owner() {
        let mut room = room_with_member();
        room.add_client(conn(2), sender());
        let id = room.add_player(conn(1), "Ada".into()).unwrap().id();

        assert!(room.player(conn(1), id).is_some());
        assert!(room.player(conn(2), id).is_none());
    }

    #[test]
    fn test_remove_client_drops_only_its_players() {
        let mut room = room_with_member();
        room.add_client(conn(2), sender());
        room.add_player(conn(1), "Ada".into());
        room.add_player(conn(2), "Bob".into());

        let departed = room.remove_client(conn(1));

        assert_eq!(departed.len(), 1);
        assert_eq!(departed[0].name(), "Ada");
        assert_eq!(room.players().len(), 1);
        assert_eq!(room.players()[0].name(), "Bob");
        assert!(!room.is_member(conn(1)));
    }

    #[test]
    fn test_remove_unknown_client_is_a_no_op() {
        let mut room = room_with_member();
        assert!(room.remove_client(conn(9)).is_empty());
        assert_eq!(room.member_count(), 1);
    }

    #[test]
    fn test_is_ready_needs_two_ready_players() {
        let mut room = room_with_member();
        assert!(!room.is_ready(2));

        let a = room.add_player(conn(1), "Ada".into()).unwrap().id();
        room.player_mut(conn(1), a).unwrap().set_ready(true);
        // One ready player is still below the threshold.
        assert!(!room.is_ready(2));

        let b = room.add_player(conn(1), "Bob".into()).unwrap().id();
        assert!(!room.is_ready(2));
        room.player_mut(conn(1), b).unwrap().set_ready(true);
        assert!(room.is_ready(2));
    }

    #[test]
    fn test_start_game_refuses_a_second_match() {
        let mut room = room_with_member();
        assert!(room.start_game(handle()));
        assert!(!room.start_game(MatchHandle {
            id: MatchId(2),
            room: "alpha".into(),
        }));
        assert_eq!(room.game().unwrap().id, MatchId(1));
    }

    #[test]
    fn test_close_game_releases_handle_and_resets_ready() {
        let mut room = room_with_member();
        let a = room.add_player(conn(1), "Ada".into()).unwrap().id();
        room.player_mut(conn(1), a).unwrap().set_ready(true);
        room.start_game(handle());

        let released = room.close_game();

        assert_eq!(released.unwrap().id, MatchId(1));
        assert!(!room.has_game());
        assert!(!room.players()[0].is_ready());
        assert!(room.close_game().is_none());
    }

    #[test]
    fn test_broadcast_reaches_members() {
        let mut room = Room::new("alpha".into());
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        room.add_client(conn(1), tx1);
        room.add_client(conn(2), tx2);

        room.broadcast(ServerEvent::GameStart {
            room: "alpha".into(),
        });

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_snapshot_lists_players_in_registration_order() {
        let mut room = room_with_member();
        room.add_player(conn(1), "Ada".into());
        room.add_player(conn(1), "Bob".into());

        let snapshot = room.snapshot();
        assert_eq!(snapshot.name, "alpha");
        let names: Vec<_> = snapshot.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Ada", "Bob"]);
    }
}
