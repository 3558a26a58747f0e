//! Unified error type for the Kurve server.

use kurve_lobby::LobbyError;
use kurve_match::MatchError;
use kurve_protocol::ProtocolError;

/// Top-level error wrapping the layer-specific errors.
///
/// The `#[from]` attributes generate `From` impls so `?` converts
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum KurveError {
    /// An encode/decode error.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The lobby controller is gone.
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    /// The match subsystem failed.
    #[error(transparent)]
    Match(#[from] MatchError),

    /// A WebSocket-level failure on a connection.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Binding or accepting sockets failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lobby_error() {
        let err: KurveError = LobbyError::Unavailable.into();
        assert!(matches!(err, KurveError::Lobby(_)));
        assert!(err.to_string().contains("unavailable"));
    }

    #[test]
    fn test_from_match_error() {
        let err: KurveError = MatchError::Rejected("full".into()).into();
        assert!(matches!(err, KurveError::Match(_)));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: KurveError = ProtocolError::InvalidFrame("bad".into()).into();
        assert!(matches!(err, KurveError::Protocol(_)));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "taken");
        let err: KurveError = io.into();
        assert!(matches!(err, KurveError::Io(_)));
    }
}
