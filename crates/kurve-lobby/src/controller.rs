//! The lobby controller: an actor task owning all lobby state.
//!
//! Every inbound event is a [`LobbyCommand`] processed as one discrete,
//! non-overlapping unit — the actor is the serialization mechanism, so
//! no two operations ever mutate the same room concurrently, and the
//! room-closure check is atomic with respect to racing joins.
//!
//! Match completion arrives on a second channel in the same `select!`
//! loop: an interrupt relative to ordinary lobby traffic that can land
//! between any two commands and always finds consistent state (room
//! still registered, or already closed — never half-closed).
//!
//! Per-connection lifecycle with respect to the lobby:
//!
//! ```text
//! Unattached ──attach──▶ Attached-to-lobby ──join──▶ In-room
//!      ▲                        ▲                      │
//!      └──disconnect──          └──match end / leave── ▼
//!                               Detached-to-match (owned by the driver)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use kurve_match::{ConnectionSender, MatchDriver, MatchEndSender, MatchEnded, MatchSeed};
use kurve_protocol::{Ack, ConnectionId, PlayerId, ServerEvent, ServerFrame};

use crate::{ConnectionGroup, LobbyConfig, LobbyError, RoomRepository, validate_name};

/// Commands sent to the lobby actor.
///
/// Each carries a `reply` channel. For operations whose wire protocol
/// has no callback (`fetch`, `leave`, ...) the reply is a unit ack so
/// callers can still await completion.
pub(crate) enum LobbyCommand {
    /// Subscribe a fresh connection to lobby-wide broadcasts.
    Attach {
        connection: ConnectionId,
        sender: ConnectionSender,
        reply: oneshot::Sender<()>,
    },

    /// The connection went away: implicit leave plus unsubscribe.
    Disconnect {
        connection: ConnectionId,
        reply: oneshot::Sender<()>,
    },

    /// Push the full room list to one connection.
    Fetch {
        connection: ConnectionId,
        reply: oneshot::Sender<()>,
    },

    Create {
        connection: ConnectionId,
        name: String,
        reply: oneshot::Sender<Ack>,
    },

    Join {
        connection: ConnectionId,
        room: String,
        reply: oneshot::Sender<Ack>,
    },

    Leave {
        connection: ConnectionId,
        reply: oneshot::Sender<()>,
    },

    AddPlayer {
        connection: ConnectionId,
        name: String,
        reply: oneshot::Sender<Ack>,
    },

    Talk {
        connection: ConnectionId,
        player: PlayerId,
        content: String,
        reply: oneshot::Sender<Ack>,
    },

    Ready {
        connection: ConnectionId,
        player: PlayerId,
        reply: oneshot::Sender<Ack>,
    },

    Color {
        connection: ConnectionId,
        player: PlayerId,
        color: String,
        reply: oneshot::Sender<Ack>,
    },
}

/// Handle to the running lobby actor. Cheap to clone; the server keeps
/// one per connection task.
#[derive(Clone)]
pub struct LobbyHandle {
    sender: mpsc::Sender<LobbyCommand>,
}

impl LobbyHandle {
    async fn send(&self, cmd: LobbyCommand) -> Result<(), LobbyError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| LobbyError::Unavailable)
    }

    /// Subscribes a connection to lobby broadcasts.
    pub async fn attach(
        &self,
        connection: ConnectionId,
        sender: ConnectionSender,
    ) -> Result<(), LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(LobbyCommand::Attach {
            connection,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| LobbyError::Unavailable)
    }

    /// Reports a closed connection. Equivalent to a leave followed by
    /// unsubscription; never leaves a dangling player or a stale match
    /// attachment.
    pub async fn disconnect(&self, connection: ConnectionId) -> Result<(), LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(LobbyCommand::Disconnect {
            connection,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| LobbyError::Unavailable)
    }

    /// Pushes one `room:new` per existing room to the connection.
    pub async fn fetch(&self, connection: ConnectionId) -> Result<(), LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(LobbyCommand::Fetch {
            connection,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| LobbyError::Unavailable)
    }

    /// Creates a room with the caller as first member.
    pub async fn create(
        &self,
        connection: ConnectionId,
        name: String,
    ) -> Result<Ack, LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(LobbyCommand::Create {
            connection,
            name,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| LobbyError::Unavailable)
    }

    /// Joins the caller to a named room.
    pub async fn join(&self, connection: ConnectionId, room: String) -> Result<Ack, LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(LobbyCommand::Join {
            connection,
            room,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| LobbyError::Unavailable)
    }

    /// Removes the caller from its current room, if any.
    pub async fn leave(&self, connection: ConnectionId) -> Result<(), LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(LobbyCommand::Leave {
            connection,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| LobbyError::Unavailable)
    }

    /// Registers a named player owned by the caller.
    pub async fn add_player(
        &self,
        connection: ConnectionId,
        name: String,
    ) -> Result<Ack, LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(LobbyCommand::AddPlayer {
            connection,
            name,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| LobbyError::Unavailable)
    }

    /// Says something in the caller's room as one of its players.
    pub async fn talk(
        &self,
        connection: ConnectionId,
        player: PlayerId,
        content: String,
    ) -> Result<Ack, LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(LobbyCommand::Talk {
            connection,
            player,
            content,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| LobbyError::Unavailable)
    }

    /// Toggles a player's ready flag; may trigger a match start.
    pub async fn ready(
        &self,
        connection: ConnectionId,
        player: PlayerId,
    ) -> Result<Ack, LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(LobbyCommand::Ready {
            connection,
            player,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| LobbyError::Unavailable)
    }

    /// Changes a player's color.
    pub async fn color(
        &self,
        connection: ConnectionId,
        player: PlayerId,
        color: String,
    ) -> Result<Ack, LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(LobbyCommand::Color {
            connection,
            player,
            color,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| LobbyError::Unavailable)
    }
}

/// What the controller knows about one attached connection.
struct ConnectionState {
    sender: ConnectionSender,
    /// Name of the room this connection is a member of, if any.
    room: Option<String>,
    /// `true` while the connection's event stream is owned by the
    /// match subsystem.
    in_match: bool,
}

/// The lobby actor. Owns the repository, the broadcast group, and the
/// per-connection table; constructed dependencies (config, driver) are
/// injected at spawn time.
struct Lobby {
    config: LobbyConfig,
    repository: RoomRepository,
    group: ConnectionGroup,
    connections: HashMap<ConnectionId, ConnectionState>,
    driver: Arc<dyn MatchDriver>,
    /// Handed to the driver on every start; completions come back on `ends`.
    end_tx: MatchEndSender,
    commands: mpsc::Receiver<LobbyCommand>,
    ends: mpsc::UnboundedReceiver<MatchEnded>,
}

/// Spawns the lobby actor task and returns a handle to it.
pub fn spawn_lobby(config: LobbyConfig, driver: Arc<dyn MatchDriver>) -> LobbyHandle {
    let (tx, rx) = mpsc::channel(config.channel_size);
    let (end_tx, end_rx) = mpsc::unbounded_channel();

    let actor = Lobby {
        repository: RoomRepository::new(config.max_room_name),
        config,
        group: ConnectionGroup::new(),
        connections: HashMap::new(),
        driver,
        end_tx,
        commands: rx,
        ends: end_rx,
    };

    tokio::spawn(actor.run());

    LobbyHandle { sender: tx }
}

impl Lobby {
    async fn run(mut self) {
        tracing::info!("lobby controller started");

        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(cmd) => self.dispatch(cmd),
                    None => break,
                },
                Some(ended) = self.ends.recv() => self.on_match_end(ended),
            }
        }

        tracing::info!("lobby controller stopped");
    }

    /// Replies are sent after the handler has fully run, so an awaited
    /// ack implies every broadcast for that command is already queued.
    fn dispatch(&mut self, cmd: LobbyCommand) {
        match cmd {
            LobbyCommand::Attach {
                connection,
                sender,
                reply,
            } => {
                self.on_attach(connection, sender);
                let _ = reply.send(());
            }
            LobbyCommand::Disconnect { connection, reply } => {
                self.on_disconnect(connection);
                let _ = reply.send(());
            }
            LobbyCommand::Fetch { connection, reply } => {
                self.sync_rooms(connection);
                let _ = reply.send(());
            }
            LobbyCommand::Create {
                connection,
                name,
                reply,
            } => {
                let ack = self.on_create(connection, name);
                let _ = reply.send(ack);
            }
            LobbyCommand::Join {
                connection,
                room,
                reply,
            } => {
                let ack = self.on_join(connection, room);
                let _ = reply.send(ack);
            }
            LobbyCommand::Leave { connection, reply } => {
                self.on_leave(connection);
                let _ = reply.send(());
            }
            LobbyCommand::AddPlayer {
                connection,
                name,
                reply,
            } => {
                let ack = self.on_add_player(connection, name);
                let _ = reply.send(ack);
            }
            LobbyCommand::Talk {
                connection,
                player,
                content,
                reply,
            } => {
                let ack = self.on_talk(connection, player, content);
                let _ = reply.send(ack);
            }
            LobbyCommand::Ready {
                connection,
                player,
                reply,
            } => {
                let ack = self.on_ready(connection, player);
                let _ = reply.send(ack);
            }
            LobbyCommand::Color {
                connection,
                player,
                color,
                reply,
            } => {
                let ack = self.on_color(connection, player, color);
                let _ = reply.send(ack);
            }
        }
    }

    // -- connection lifecycle --

    fn on_attach(&mut self, connection: ConnectionId, sender: ConnectionSender) {
        self.group.add(connection, sender.clone());
        self.connections.insert(
            connection,
            ConnectionState {
                sender,
                room: None,
                in_match: false,
            },
        );
        tracing::debug!(%connection, "connection attached to lobby");
    }

    fn on_disconnect(&mut self, connection: ConnectionId) {
        self.on_leave(connection);
        self.group.remove(connection);
        self.connections.remove(&connection);
        tracing::debug!(%connection, "connection detached from lobby");
    }

    /// Full-state sync: one `room:new` per registered room.
    fn sync_rooms(&self, connection: ConnectionId) {
        let Some(state) = self.connections.get(&connection) else {
            return;
        };
        for room in self.repository.list() {
            let _ = state.sender.send(ServerFrame::from(ServerEvent::RoomNew {
                room: room.snapshot(),
            }));
        }
    }

    // -- room membership --

    fn on_create(&mut self, connection: ConnectionId, name: String) -> Ack {
        let Some(state) = self.connections.get(&connection) else {
            return Ack::fail();
        };
        if state.room.is_some() {
            return Ack::fail();
        }
        let sender = state.sender.clone();

        let Some(room) = self.repository.create(&name, connection, sender) else {
            return Ack::fail();
        };
        let assigned = room.name().to_string();
        let snapshot = room.snapshot();

        if let Some(state) = self.connections.get_mut(&connection) {
            state.room = Some(assigned.clone());
        }
        self.group.broadcast(ServerEvent::RoomNew { room: snapshot });
        tracing::info!(room = %assigned, %connection, "room created");

        Ack::room(assigned)
    }

    fn on_join(&mut self, connection: ConnectionId, room_name: String) -> Ack {
        let Some(state) = self.connections.get(&connection) else {
            return Ack::fail();
        };
        if state.room.as_deref() == Some(room_name.as_str()) {
            // Create-then-join client flow: already a member.
            return Ack::ok();
        }
        if state.room.is_some() {
            return Ack::fail();
        }
        let sender = state.sender.clone();

        let Some(room) = self.repository.get_mut(&room_name) else {
            return Ack::fail();
        };
        room.add_client(connection, sender);
        let running = room.game().cloned();

        if let Some(state) = self.connections.get_mut(&connection) {
            state.room = Some(room_name.clone());
        }
        tracing::debug!(room = %room_name, %connection, "connection joined room");

        if let Some(handle) = running {
            // The room is mid-match: hand the connection straight over
            // and tell it a match is already in progress.
            self.group.remove(connection);
            if let Some(state) = self.connections.get_mut(&connection) {
                state.in_match = true;
                self.driver.attach(&handle, connection, state.sender.clone());
                let _ = state.sender.send(ServerFrame::from(ServerEvent::GameStart {
                    room: room_name.clone(),
                }));
            }
        }

        Ack::ok()
    }

    fn on_leave(&mut self, connection: ConnectionId) {
        let Some(state) = self.connections.get_mut(&connection) else {
            return;
        };
        let Some(room_name) = state.room.take() else {
            return;
        };
        let was_in_match = std::mem::take(&mut state.in_match);
        let sender = state.sender.clone();

        let mut departed = Vec::new();
        if let Some(room) = self.repository.get_mut(&room_name) {
            // Detach from the match subsystem before touching membership.
            if was_in_match {
                if let Some(handle) = room.game().cloned() {
                    self.driver.detach(&handle, connection);
                }
            }
            departed = room.remove_client(connection);
        }

        for player in &departed {
            self.group.broadcast(ServerEvent::RoomLeave {
                room: room_name.clone(),
                player: player.name().to_string(),
            });
        }

        if was_in_match {
            // Back from the match subsystem: resubscribe, then resync
            // below once the closure check has settled the registry.
            self.group.add(connection, sender);
        }

        self.check_room_close(&room_name);

        if was_in_match {
            self.sync_rooms(connection);
        }

        tracing::debug!(room = %room_name, %connection, "connection left room");
    }

    /// Removes the room when its membership emptied out. Runs on the
    /// actor, so no join can slip in between the check and the removal.
    fn check_room_close(&mut self, room_name: &str) {
        let empty = self
            .repository
            .get(room_name)
            .is_some_and(|room| room.is_empty());
        if !empty {
            return;
        }

        if let Some(room) = self.repository.get_mut(room_name) {
            if let Some(handle) = room.close_game() {
                // Nobody left to play it out.
                self.driver.stop(&handle);
            }
        }
        self.repository.remove(room_name);
        self.group.broadcast(ServerEvent::RoomClose {
            room: room_name.to_string(),
        });
        tracing::info!(room = room_name, "room closed");
    }

    // -- in-room operations --

    fn on_add_player(&mut self, connection: ConnectionId, name: String) -> Ack {
        let Some(state) = self.connections.get(&connection) else {
            return Ack::fail();
        };
        let Some(room_name) = state.room.clone() else {
            return Ack::fail();
        };

        let name = name.trim();
        if !validate_name(name, self.config.max_player_name) {
            return Ack::fail();
        }

        let Some(room) = self.repository.get_mut(&room_name) else {
            return Ack::fail();
        };
        let Some(player) = room.add_player(connection, name.to_string()) else {
            return Ack::fail();
        };
        let snapshot = player.snapshot();

        room.broadcast(ServerEvent::RoomJoin {
            room: room_name.clone(),
            player: snapshot,
        });
        tracing::debug!(room = %room_name, player = name, "player registered");

        Ack::ok()
    }

    fn on_talk(&mut self, connection: ConnectionId, player: PlayerId, content: String) -> Ack {
        let Some(state) = self.connections.get(&connection) else {
            return Ack::fail();
        };
        let Some(room_name) = state.room.clone() else {
            return Ack::fail();
        };
        if content.trim().is_empty() {
            return Ack::fail();
        }

        let Some(room) = self.repository.get(&room_name) else {
            return Ack::fail();
        };
        let Some(player) = room.player(connection, player) else {
            return Ack::fail();
        };

        room.broadcast(ServerEvent::RoomTalk {
            room: room_name,
            player: player.name().to_string(),
            content,
        });

        Ack::ok()
    }

    fn on_color(&mut self, connection: ConnectionId, player: PlayerId, color: String) -> Ack {
        let Some(state) = self.connections.get(&connection) else {
            return Ack::color(false, None);
        };
        let Some(room_name) = state.room.clone() else {
            return Ack::color(false, None);
        };
        let Some(room) = self.repository.get_mut(&room_name) else {
            return Ack::color(false, None);
        };
        let Some(player) = room.player_mut(connection, player) else {
            return Ack::color(false, None);
        };

        if !player.set_color(&color) {
            // Failure still reports the current color, unchanged.
            return Ack::color(false, Some(player.color().to_string()));
        }

        let name = player.name().to_string();
        let applied = player.color().to_string();
        room.broadcast(ServerEvent::PlayerColor {
            room: room_name,
            player: name,
            color: applied.clone(),
        });

        Ack::color(true, Some(applied))
    }

    fn on_ready(&mut self, connection: ConnectionId, player: PlayerId) -> Ack {
        let Some(state) = self.connections.get(&connection) else {
            return Ack::fail();
        };
        let Some(room_name) = state.room.clone() else {
            return Ack::fail();
        };
        let Some(room) = self.repository.get_mut(&room_name) else {
            return Ack::fail();
        };
        let Some(player) = room.player_mut(connection, player) else {
            return Ack::fail();
        };

        let ready = player.toggle_ready();
        let name = player.name().to_string();
        room.broadcast(ServerEvent::PlayerReady {
            room: room_name.clone(),
            player: name,
            ready,
        });

        // At most one match per readiness trigger: an active match
        // suppresses re-evaluation until it ends.
        let should_start = room.is_ready(self.config.min_match_players) && !room.has_game();
        if should_start {
            self.start_match(&room_name);
        }

        Ack::ready(true, ready)
    }

    // -- handoff --

    fn start_match(&mut self, room_name: &str) {
        let Some(room) = self.repository.get_mut(room_name) else {
            return;
        };

        let seed = MatchSeed {
            room: room_name.to_string(),
            players: room.players().iter().map(|p| p.snapshot()).collect(),
        };
        let handle = match self.driver.start(seed, self.end_tx.clone()) {
            Ok(handle) => handle,
            Err(error) => {
                // Failed readiness trigger: the room stays in no-match
                // state and may trigger again later.
                tracing::warn!(room = room_name, %error, "match start rejected");
                return;
            }
        };

        if !room.start_game(handle.clone()) {
            tracing::warn!(room = room_name, "readiness trigger raced an active match");
            self.driver.stop(&handle);
            return;
        }
        let members = room.member_ids();

        // Announce to the whole lobby first — members are still
        // subscribed at this point — then delegate their streams.
        self.group.broadcast(ServerEvent::GameStart {
            room: room_name.to_string(),
        });
        for connection in members {
            self.group.remove(connection);
            if let Some(state) = self.connections.get_mut(&connection) {
                state.in_match = true;
                self.driver.attach(&handle, connection, state.sender.clone());
            }
        }

        tracing::info!(room = room_name, id = %handle.id, "match started");
    }

    fn on_match_end(&mut self, ended: MatchEnded) {
        let room_name = ended.room;

        let Some(room) = self.repository.get_mut(&room_name) else {
            // The room emptied out and closed mid-match.
            tracing::debug!(room = %room_name, "match ended for a closed room");
            return;
        };
        let Some(handle) = room.close_game() else {
            tracing::debug!(room = %room_name, "stale match end signal");
            return;
        };
        let members = room.member_ids();

        // Take the connections back, then announce and resync so every
        // survivor ends up attached to the lobby with fresh state.
        for connection in &members {
            self.driver.detach(&handle, *connection);
            if let Some(state) = self.connections.get_mut(connection) {
                state.in_match = false;
                self.group.add(*connection, state.sender.clone());
            }
        }

        self.group.broadcast(ServerEvent::GameEnd {
            room: room_name.clone(),
        });
        for connection in members {
            self.sync_rooms(connection);
        }

        tracing::info!(room = %room_name, id = %handle.id, "match ended");
    }
}
