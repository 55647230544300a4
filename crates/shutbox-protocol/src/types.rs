//! Identity types shared by every Shutbox layer.
//!
//! All three ids are "newtype wrappers" around `u64`. They cost nothing
//! at runtime but make signatures like `fn join(session: SessionId,
//! user: UserId)` impossible to call with the arguments swapped.
//!
//! `#[serde(transparent)]` keeps the JSON form a plain number, so
//! `SessionId(42)` is stored and rendered as `42`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one game session, from creation to completion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// Identifies a participant record inside a session.
///
/// A user who plays in three sessions owns three distinct `PlayerId`s.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The authenticated identity supplied by the identity provider.
///
/// Shutbox never authenticates; it trusts whatever `UserId` the caller
/// hands it for the current request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}
