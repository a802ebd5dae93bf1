//! Targets, choices and the fizzle check

use crate::core::{AbilityContext, AbilityRef, ChoiceBounds, ObjectKind, ObjectId, ObjectSet, PlayerId};
use crate::error::ChoiceResult;
use crate::game::{ChoiceReason, GameState, PlayerController};
use crate::zones::ZoneId;
use crate::MtgError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Anything that can be chosen: a player or an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Target {
    Player(PlayerId),
    Object(ObjectId),
}

impl Target {
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Target::Object(id) => Some(*id),
            Target::Player(_) => None,
        }
    }

    pub fn as_player(&self) -> Option<PlayerId> {
        match self {
            Target::Player(p) => Some(*p),
            Target::Object(_) => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Player(p) => write!(f, "{p}"),
            Target::Object(id) => write!(f, "{id}"),
        }
    }
}

impl From<PlayerId> for Target {
    fn from(p: PlayerId) -> Self {
        Target::Player(p)
    }
}

impl From<ObjectId> for Target {
    fn from(id: ObjectId) -> Self {
        Target::Object(id)
    }
}

/// Whether `target` may be targeted by `ability` controlled by `controller`
///
/// A missing or departed target is illegal, and a spell or ability on the stack
/// cannot target itself.
pub fn can_target(
    game: &GameState,
    ability: AbilityRef,
    _controller: PlayerId,
    target: Option<Target>,
) -> bool {
    match target {
        None => false,
        Some(Target::Player(p)) => game.is_in_game(p),
        Some(Target::Object(id)) => {
            let Ok(object) = game.objects.get(id) else {
                return false;
            };
            if object.zone == ZoneId::Stack {
                if id == ability.source {
                    return false;
                }
                if matches!(&object.kind, ObjectKind::StackAbility { origin, .. } if *origin == ability)
                {
                    return false;
                }
            }
            true
        }
    }
}

/// One target slot
#[derive(Debug, Clone)]
pub struct TargetSlot {
    /// Chosen targets; illegal ones are nulled at resolution
    pub chosen: Vec<Option<Target>>,
    /// The set the targets were chosen from
    pub candidates: ObjectSet,
    pub ability: AbilityRef,
    pub order_matters: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Targets {
    slots: BTreeMap<usize, TargetSlot>,
}

impl Targets {
    /// One past the highest used slot index
    pub fn next_index(&self) -> usize {
        self.slots.keys().next_back().map_or(0, |i| i + 1)
    }

    pub fn choose(
        &mut self,
        game: &GameState,
        ctx: &AbilityContext,
        chooser: &mut dyn PlayerController,
        candidates: ObjectSet,
        bounds: ChoiceBounds,
        index: Option<usize>,
    ) -> ChoiceResult<()> {
        let index = index.unwrap_or_else(|| self.next_index());
        if self.slots.contains_key(&index) {
            return Err(MtgError::IllegalAction(format!("target slot {index} already chosen")).into());
        }

        let legal: Vec<Target> = candidates
            .members(game)
            .into_iter()
            .filter(|t| can_target(game, ctx.ability, ctx.controller, Some(*t)))
            .collect();
        let chosen = crate::core::choose_from(
            game,
            chooser,
            legal,
            &ChoiceReason::Target(ctx.ability),
            bounds,
        )?;

        self.slots.insert(
            index,
            TargetSlot {
                chosen: chosen.into_iter().map(Some).collect(),
                candidates,
                ability: ctx.ability,
                order_matters: bounds.order_matters,
            },
        );
        Ok(())
    }

    /// The `n`-th target in slot `index`, if still legal
    pub fn get(&self, index: usize, n: usize) -> Option<Target> {
        self.slots.get(&index)?.chosen.get(n).copied().flatten()
    }

    pub fn slot(&self, index: usize) -> Option<&TargetSlot> {
        self.slots.get(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Re-check every target, nulling the illegal ones in place.
    /// True only if targets were chosen and none of them is still legal.
    pub fn should_fizzle(&mut self, game: &GameState, controller: PlayerId) -> bool {
        if self.slots.is_empty() {
            return false;
        }
        let mut any_legal = false;
        for slot in self.slots.values_mut() {
            for t in slot.chosen.iter_mut() {
                let legal = t.is_some_and(|target| slot.candidates.contains(game, target))
                    && can_target(game, slot.ability, controller, *t);
                if legal {
                    any_legal = true;
                } else {
                    *t = None;
                }
            }
        }
        !any_legal
    }

    /// Point every slot's ability at the object's new incarnation
    pub fn rebind_source(&mut self, old: ObjectId, new: ObjectId) {
        for slot in self.slots.values_mut() {
            if slot.ability.source == old {
                slot.ability.source = new;
            }
        }
    }
}

/// Choices made while putting a spell or ability on the stack
#[derive(Debug, Clone, Default)]
pub struct Choices {
    pub targets: Targets,
}

impl Choices {
    /// Choose targets into the next free (or given) slot
    pub fn choose_targets(
        &mut self,
        game: &GameState,
        ctx: &AbilityContext,
        chooser: &mut dyn PlayerController,
        candidates: ObjectSet,
        bounds: ChoiceBounds,
        index: Option<usize>,
    ) -> ChoiceResult<()> {
        self.targets.choose(game, ctx, chooser, candidates, bounds, index)
    }

    pub fn target(&self, index: usize, n: usize) -> Option<Target> {
        self.targets.get(index, n)
    }

    pub fn should_fizzle(&mut self, game: &GameState, controller: PlayerId) -> bool {
        self.targets.should_fizzle(game, controller)
    }
}
