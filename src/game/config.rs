//! Game configuration

use serde::{Deserialize, Serialize};

/// Tunable rule constants and run limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub starting_life: i32,
    pub opening_hand_size: u32,
    /// Poison counters at which a player loses
    pub poison_limit: u32,
    pub lands_per_turn: u32,
    /// Skip the draw step of the very first turn
    pub skip_first_draw: bool,
    /// Turn limit for [`crate::game::GameLoop::run_game`]
    pub max_turns: u32,
    /// Shuffle libraries with this seed at game start; `None` keeps deck order
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            starting_life: 20,
            opening_hand_size: 7,
            poison_limit: 10,
            lands_per_turn: 1,
            skip_first_draw: true,
            max_turns: 100,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
