//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding snapshots.
///
/// Each crate in Shutbox defines its own error enum. A `ProtocolError`
/// always means the problem is in serialization, never in game rules.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (malformed JSON, missing fields, wrong
    /// types or a truncated record).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
