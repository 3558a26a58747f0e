//! The lobby-wide broadcast group.
//!
//! Tracks which connections are currently subscribed to lobby events.
//! Connections handed to the match subsystem are removed from the group
//! and re-added when the match ends.

use std::collections::HashMap;

use kurve_match::ConnectionSender;
use kurve_protocol::{ConnectionId, ServerEvent, ServerFrame};

/// The set of connections receiving lobby-wide broadcasts.
#[derive(Default)]
pub struct ConnectionGroup {
    members: HashMap<ConnectionId, ConnectionSender>,
}

impl ConnectionGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection. Returns `false` if it was already a member.
    pub fn add(&mut self, connection: ConnectionId, sender: ConnectionSender) -> bool {
        self.members.insert(connection, sender).is_none()
    }

    /// Unsubscribes a connection. Returns `false` if it was not a member.
    pub fn remove(&mut self, connection: ConnectionId) -> bool {
        self.members.remove(&connection).is_some()
    }

    pub fn contains(&self, connection: ConnectionId) -> bool {
        self.members.contains_key(&connection)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Delivers an event to every subscribed connection. Fire-and-forget:
    /// a closed receiver (connection going away) is silently skipped.
    pub fn broadcast(&self, event: ServerEvent) {
        let frame = ServerFrame::from(event);
        for sender in self.members.values() {
            let _ = sender.send(frame.clone());
        }
    }
}
