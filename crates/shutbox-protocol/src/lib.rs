//! Shared vocabulary for Shutbox.
//!
//! This crate holds the pieces every other layer agrees on:
//!
//! - **Identity types** ([`SessionId`], [`PlayerId`], [`UserId`]):
//!   newtypes so a session id can never be passed where a user id is
//!   expected.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how engine snapshots
//!   are turned into bytes for storage or presentation.
//! - **Errors** ([`ProtocolError`]): what can go wrong while encoding
//!   or decoding.
//!
//! ```text
//! Coordinator (actors) → Game (rules) → Protocol (ids, codec)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{PlayerId, SessionId, UserId};
