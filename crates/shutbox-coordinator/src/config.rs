//! Coordinator configuration.

use serde::{Deserialize, Serialize};
use shutbox_game::RulesConfig;

/// Settings shared by every session a coordinator runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Bound of each session actor's mailbox. When it fills, callers wait.
    pub channel_size: usize,

    /// Rules applied to every session.
    pub rules: RulesConfig,

    /// When set, every session rolls from a deterministic generator
    /// derived from this seed and its id. `None` draws from OS entropy.
    pub dice_seed: Option<u64>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            channel_size: 64,
            rules: RulesConfig::default(),
            dice_seed: None,
        }
    }
}
