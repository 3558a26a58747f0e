//! # Kurve
//!
//! Lobby server for a real-time curve-arena game.
//!
//! Kurve groups WebSocket clients into named rooms, tracks per-room
//! player registration and readiness, and hands a room's connections to
//! a live-match subsystem (a [`MatchDriver`](kurve_match::MatchDriver)
//! implementation) when every player is ready — then takes them back
//! when the match ends.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kurve::prelude::*;
//!
//! # struct MyDriver;
//! # impl kurve_match::MatchDriver for MyDriver {
//! #     fn start(&self, _: kurve_match::MatchSeed, _: kurve_match::MatchEndSender)
//! #         -> Result<kurve_match::MatchHandle, kurve_match::MatchError> { unimplemented!() }
//! #     fn stop(&self, _: &kurve_match::MatchHandle) {}
//! #     fn attach(&self, _: &kurve_match::MatchHandle, _: ConnectionId, _: kurve_match::ConnectionSender) {}
//! #     fn detach(&self, _: &kurve_match::MatchHandle, _: ConnectionId) {}
//! # }
//! # async fn run() -> Result<(), KurveError> {
//! kurve::init_tracing();
//! let server = KurveServerBuilder::new()
//!     .bind("0.0.0.0:8020")
//!     .build(Arc::new(MyDriver))
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::KurveError;
pub use server::{KurveServer, KurveServerBuilder};

/// Installs a `tracing` subscriber reading `RUST_LOG`, defaulting to
/// `info`. A no-op if a subscriber is already set (so tests can call it
/// freely).
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// The common imports for building on Kurve.
pub mod prelude {
    pub use crate::{KurveError, KurveServer, KurveServerBuilder, init_tracing};
    pub use kurve_lobby::{LobbyConfig, LobbyHandle, spawn_lobby};
    pub use kurve_match::{MatchDriver, MatchEnded, MatchHandle, MatchId, MatchSeed};
    pub use kurve_protocol::{
        Ack, ClientEvent, ClientFrame, ConnectionId, PlayerId, ServerEvent, ServerFrame,
    };
}
