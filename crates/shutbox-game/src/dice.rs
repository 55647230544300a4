//! Randomness sources for dice rolls.
//!
//! The engine never reaches for a global generator. Each session owns a
//! [`DiceSource`], so tests can script exact rolls and replays can reuse
//! a seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces independent uniform die faces in `1..=6`.
pub trait DiceSource: Send {
    /// Draws one die.
    fn roll_die(&mut self) -> u8;
}

impl<D: DiceSource + ?Sized> DiceSource for Box<D> {
    fn roll_die(&mut self) -> u8 {
        (**self).roll_die()
    }
}

/// Draws from the thread-local generator seeded from OS entropy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDice;

impl DiceSource for ThreadDice {
    fn roll_die(&mut self) -> u8 {
        rand::rng().random_range(1..=6)
    }
}

/// A deterministic source: the same seed always yields the same rolls.
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: StdRng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DiceSource for SeededDice {
    fn roll_die(&mut self) -> u8 {
        self.rng.random_range(1..=6)
    }
}
