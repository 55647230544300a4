//! Session coordination for Shutbox.
//!
//! Each session runs as an isolated Tokio task (actor model) that owns
//! its [`Session`](shutbox_game::Session) value. Every mutating request
//! is a message on that task's channel, so actions against one session
//! are applied one at a time in arrival order while different sessions
//! never contend.
//!
//! # Key types
//!
//! - [`SessionCoordinator`]: creates sessions, routes actions, serves views
//! - [`SessionHandle`]: talk to one running session actor
//! - [`SessionStore`]: the durable-store seam; [`MemoryStore`] for tests
//! - [`CoordinatorConfig`]: mailbox size, rules, dice seeding

#![allow(async_fn_in_trait)]

mod actor;
mod config;
mod coordinator;
mod error;
mod store;

pub use actor::SessionHandle;
pub use config::CoordinatorConfig;
pub use coordinator::{LeaveOutcome, SessionCoordinator, SessionSummary};
pub use error::CoordinatorError;
pub use store::{MemoryStore, SessionStore, StoreError};
