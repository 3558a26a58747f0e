//! Wire protocol for the Kurve lobby.
//!
//! This crate defines the "language" that clients and the lobby server
//! speak:
//!
//! - **Identity types** ([`ConnectionId`], [`PlayerId`]) — who is talking.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) — the `room:*` event
//!   namespace, inbound requests and outbound broadcasts.
//! - **Frames** ([`ClientFrame`], [`ServerFrame`], [`Ack`]) — the
//!   event-with-optional-callback envelope model.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how frames become bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while doing so.
//!
//! The protocol layer sits between transport (raw bytes) and the lobby
//! (room state). It knows nothing about rooms or matches — only how
//! messages are shaped on the wire.

mod codec;
mod error;
mod events;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{Ack, ClientEvent, ClientFrame, ServerEvent, ServerFrame};
pub use types::{ConnectionId, PlayerId, PlayerSnapshot, RoomSnapshot};
