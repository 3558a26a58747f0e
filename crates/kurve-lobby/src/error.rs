//! Error types for the lobby layer.
//!
//! Note the small surface: validation failures and state-consistency
//! violations are *data* (ack payloads with `success: false`), not
//! errors. The only thing that can actually fail here is reaching the
//! controller task at all.

/// Errors that can occur when talking to the lobby controller.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// The controller task is gone (channel closed or reply dropped).
    #[error("lobby is unavailable")]
    Unavailable,
}
