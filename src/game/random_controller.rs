//! Random AI controller for testing and baseline gameplay
//!
//! Makes random legal choices. Seeded controllers are fully deterministic,
//! which makes them useful for fuzzing the engine and for simulations.

use crate::core::{ChoiceBounds, ObjectId, PlayerId, Target};
use crate::game::{
    combat, AttackDeclaration, ChoiceReason, GameStateView, PlayerAction, PlayerController,
};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

/// A controller that makes random choices
pub struct RandomController {
    player_id: PlayerId,
    rng: ChaCha12Rng,
}

impl RandomController {
    /// Create a new random controller seeded from system entropy
    pub fn new(player_id: PlayerId) -> Self {
        RandomController {
            player_id,
            rng: ChaCha12Rng::from_entropy(),
        }
    }

    /// Create a random controller with a seeded RNG (for deterministic testing)
    pub fn with_seed(player_id: PlayerId, seed: u64) -> Self {
        RandomController {
            player_id,
            rng: ChaCha12Rng::seed_from_u64(seed),
        }
    }
}

impl PlayerController for RandomController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_action(
        &mut self,
        _view: &GameStateView,
        available_actions: &[PlayerAction],
    ) -> Option<PlayerAction> {
        // One extra slot for passing, so games always make progress
        let index = self.rng.gen_range(0..=available_actions.len());
        available_actions.get(index).copied()
    }

    fn choose_objects(
        &mut self,
        _view: &GameStateView,
        candidates: &[Target],
        _reason: &ChoiceReason,
        bounds: ChoiceBounds,
    ) -> Option<Vec<Target>> {
        let max = bounds.max().min(candidates.len());
        let count = self.rng.gen_range(bounds.min.min(max)..=max);
        Some(
            candidates
                .choose_multiple(&mut self.rng, count)
                .copied()
                .collect(),
        )
    }

    fn choose_attackers(
        &mut self,
        _view: &GameStateView,
        attackers: &[ObjectId],
        defenders: &[Target],
    ) -> Option<AttackDeclaration> {
        let mut pairs = Vec::new();
        for attacker in attackers {
            if self.rng.gen_bool(0.5) {
                if let Some(defender) = defenders.choose(&mut self.rng) {
                    pairs.push((*attacker, *defender));
                }
            }
        }
        Some(AttackDeclaration::Map(pairs))
    }

    fn choose_blockers(
        &mut self,
        view: &GameStateView,
        attacks: &[(ObjectId, Target)],
        blockers: &[ObjectId],
    ) -> Option<Vec<(ObjectId, ObjectId)>> {
        let Some(state) = view.combat() else {
            return Some(Vec::new());
        };
        let mut blocks = Vec::new();
        for blocker in blockers {
            if !self.rng.gen_bool(0.5) {
                continue;
            }
            let Some((attacker, _)) = attacks.choose(&mut self.rng) else {
                continue;
            };
            blocks.push((*attacker, *blocker));
            if !combat::is_legal_block_set(view.game(), state, self.player_id, &blocks) {
                blocks.pop();
            }
        }
        Some(blocks)
    }
}
