//! Codec trait and implementations for serializing frames.
//!
//! The lobby doesn't care how frames are serialized — anything
//! implementing [`Codec`] will do. [`JsonCodec`] is the default:
//! human-readable, easy to inspect in browser DevTools. A binary codec
//! can be swapped in later without touching the rest of the stack.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust types to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because the codec is shared across
/// per-connection Tokio tasks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or
    /// don't match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Ack, ServerFrame};

    #[test]
    fn test_json_codec_round_trip() {
        let codec = JsonCodec;
        let frame = ServerFrame::Callback {
            callback: 3,
            result: Ack::ok(),
        };
        let bytes = codec.encode(&frame).unwrap();
        let decoded: ServerFrame = codec.decode(&bytes).unwrap();
        assert_eq!(frame, decoded);
    }

    #[test]
    fn test_json_codec_decode_garbage_fails() {
        let codec = JsonCodec;
        let result: Result<ServerFrame, _> = codec.decode(b"not json at all");
        assert!(result.is_err());
    }
}
