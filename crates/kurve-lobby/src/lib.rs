//! Lobby core for Kurve: rooms, players, and the controller actor.
//!
//! The lobby is a long-lived state machine coordinating many concurrent
//! connections against shared room state. All mutations run on a single
//! actor task; the outside world talks to it through a cloneable
//! [`LobbyHandle`] (message passing, no shared locks).
//!
//! # Key types
//!
//! - [`LobbyHandle`] / [`spawn_lobby`] — the controller front
//! - [`RoomRepository`] — owns all active rooms, keyed by unique name
//! - [`Room`] — one lobby session: membership, players, active match
//! - [`Player`] — a named participant, owned by a connection
//! - [`ConnectionGroup`] — lobby-wide broadcast membership
//! - [`LobbyConfig`] — name bounds, readiness threshold

mod config;
mod controller;
mod error;
mod group;
mod player;
mod repository;
mod room;

pub use config::{LobbyConfig, validate_name};
pub use controller::{LobbyHandle, spawn_lobby};
pub use error::LobbyError;
pub use group::ConnectionGroup;
pub use player::{PALETTE, Player, validate_color};
pub use repository::RoomRepository;
pub use room::Room;
