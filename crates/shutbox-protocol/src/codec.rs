//! Codec trait and implementations for serializing engine snapshots.
//!
//! The engine never decides how its state looks on disk or on the wire.
//! Whoever needs bytes (the durable store, a presentation layer) picks
//! something that implements [`Codec`] and hands it the snapshot.
//!
//! Currently we provide [`JsonCodec`]. A binary codec can be added later
//! without touching the engine.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust values to bytes and decode bytes back.
///
/// ## Trait bounds
///
/// - `Send + Sync` → a single codec can be shared by every session
///   actor, whichever Tokio worker thread they run on.
/// - `'static` → the codec owns everything it needs, so it can live
///   inside long-running tasks.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the decoded value
/// doesn't borrow from the input buffer, which can be dropped right
/// after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Human-readable, which makes stored sessions easy to inspect while
/// debugging. Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use shutbox_protocol::{Codec, JsonCodec, SessionId};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&SessionId(12)).unwrap();
/// assert_eq!(bytes, b"12");
///
/// let decoded: SessionId = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, SessionId(12));
/// ```
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
