//! Zero controller for testing and automation
//!
//! A goldfish opponent: it never takes an action, never attacks or blocks and
//! accepts the engine's default for every other decision. Useful for
//! scripted scenarios where only one side should do anything.

use crate::core::PlayerId;
use crate::game::{GameStateView, PlayerAction, PlayerController};

/// A controller that always passes and always takes the defaults
pub struct ZeroController {
    player_id: PlayerId,
}

impl ZeroController {
    pub fn new(player_id: PlayerId) -> Self {
        ZeroController { player_id }
    }
}

impl PlayerController for ZeroController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_action(
        &mut self,
        _view: &GameStateView,
        _available_actions: &[PlayerAction],
    ) -> Option<PlayerAction> {
        None
    }
}
