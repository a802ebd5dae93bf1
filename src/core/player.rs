//! Player representation

use crate::core::{CounterType, Counters, ManaPool, PlayerId, PlayerName};
use serde::{Deserialize, Serialize};

/// Represents a player in the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Seat index
    pub id: PlayerId,

    pub name: PlayerName,

    pub life: i32,

    pub mana_pool: ManaPool,

    /// Poison and other player counters
    pub counters: Counters,

    /// Set once the player has lost; they no longer take turns or priority
    pub has_lost: bool,

    /// Lands played this turn
    pub lands_played_this_turn: u32,

    /// Maximum lands per turn (usually 1)
    pub max_lands_per_turn: u32,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, starting_life: i32) -> Self {
        Player {
            id,
            name: PlayerName::new(name),
            life: starting_life,
            mana_pool: ManaPool::new(),
            counters: Counters::default(),
            has_lost: false,
            lands_played_this_turn: 0,
            max_lands_per_turn: 1,
        }
    }

    pub fn gain_life(&mut self, amount: i32) {
        self.life += amount;
    }

    /// Losing life never makes a player lose directly; that is a state-based action
    pub fn lose_life(&mut self, amount: i32) {
        self.life -= amount;
    }

    pub fn poison(&self) -> u32 {
        self.counters.get(&CounterType::poison())
    }

    pub fn can_play_land(&self) -> bool {
        self.lands_played_this_turn < self.max_lands_per_turn
    }

    pub fn play_land(&mut self) {
        self.lands_played_this_turn += 1;
    }

    pub fn reset_lands_played(&mut self) {
        self.lands_played_this_turn = 0;
    }

    pub fn empty_mana_pool(&mut self) {
        self.mana_pool.empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_life_loss_does_not_flag_loss() {
        let mut player = Player::new(PlayerId::new(0), "Alice", 20);
        player.lose_life(25);
        assert_eq!(player.life, -5);
        assert!(!player.has_lost);
    }

    #[test]
    fn test_land_drops() {
        let mut player = Player::new(PlayerId::new(0), "Alice", 20);
        assert!(player.can_play_land());
        player.play_land();
        assert!(!player.can_play_land());
        player.reset_lands_played();
        assert!(player.can_play_land());
    }
}
