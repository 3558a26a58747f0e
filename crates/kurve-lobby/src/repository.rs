//! The room registry: owns every active room, keyed by unique name.

use std::collections::HashMap;

use kurve_match::ConnectionSender;
use kurve_protocol::ConnectionId;

use crate::{Room, validate_name};

/// Owns the set of all active rooms.
///
/// Every registered room has at least one member: rooms are created
/// with their creator as first member, and the controller removes a
/// room as soon as its membership empties out.
pub struct RoomRepository {
    rooms: HashMap<String, Room>,
    max_name_len: usize,
}

impl RoomRepository {
    pub fn new(max_name_len: usize) -> Self {
        Self {
            rooms: HashMap::new(),
            max_name_len,
        }
    }

    /// Validates the name and creates a room with `creator` as its
    /// first member. Returns `None` — registry unchanged — when the
    /// name is invalid or already taken. Ordinary duplicate input is
    /// data, not an error.
    pub fn create(
        &mut self,
        name: &str,
        creator: ConnectionId,
        sender: ConnectionSender,
    ) -> Option<&Room> {
        let name = name.trim();
        if !validate_name(name, self.max_name_len) {
            return None;
        }
        if self.rooms.contains_key(name) {
            return None;
        }

        let mut room = Room::new(name.to_string());
        room.add_client(creator, sender);
        self.rooms.insert(name.to_string(), room);
        self.rooms.get(name)
    }

    /// O(1) lookup by name.
    pub fn get(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Room> {
        self.rooms.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rooms.contains_key(name)
    }

    /// Removes a room by name. Idempotent: removing an unregistered
    /// name is a no-op returning `false`.
    pub fn remove(&mut self, name: &str) -> bool {
        self.rooms.remove(name).is_some()
    }

    /// Current rooms, for full-state synchronization of a fresh client.
    /// Iteration order is unspecified.
    pub fn list(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
