//! The Shut the Box rules engine.
//!
//! Everything in this crate is synchronous and side-effect free apart
//! from drawing dice. A [`Session`] value is the whole game: its
//! configuration, lifecycle status, round phase and every [`Player`].
//! Callers mutate it only through [`Session::apply`] (or the individual
//! transition methods it dispatches to), each of which either applies one
//! complete transition or returns a [`GameError`] without touching state.
//!
//! # Key types
//!
//! - [`validator`]: subset-sum feasibility and move validation
//! - [`Session`] / [`Player`]: the state records
//! - [`Action`]: one player request, routed by [`Session::apply`]
//! - [`RulesConfig`]: pass policy, tie-break, score limit
//! - [`DiceSource`]: injectable randomness

mod action;
mod config;
mod dice;
mod error;
mod lifecycle;
mod round;
mod scoring;
mod state;
pub mod validator;

pub use action::{Action, Outcome};
pub use config::{
    ALLOWED_TILE_COUNTS, MAX_NAME_LEN, MAX_PLAYERS_LIMIT, MIN_NAME_LEN, PassPolicy, RulesConfig,
    TieBreak,
};
pub use dice::{DiceSource, SeededDice, ThreadDice};
pub use error::{ErrorKind, GameError};
pub use lifecycle::NewSession;
pub use state::{Player, RoundPhase, Session, SessionStatus};
