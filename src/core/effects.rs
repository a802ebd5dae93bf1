//! Built-in spell and ability effects
//!
//! Each [`Effect`] knows which targets it needs and how to apply itself once
//! those targets have survived the fizzle check.

use crate::core::{
    AbilityContext, ChoiceBounds, Choices, CounterType, ObjectSet, StackEffect, Target,
};
use crate::error::ChoiceResult;
use crate::game::{GameState, PlayerController};
use crate::zones::ZoneId;
use crate::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Damage to any target, then you draw `then_draw` cards
    DealDamage { amount: i32, then_draw: u32 },
    /// Put target card from your graveyard on top of its owner's library
    ReturnToLibrary,
    /// Put counters on the source
    PutCounters { counter: CounterType, amount: u32 },
    /// You draw cards
    DrawCards { count: u32 },
    EachPlayerDraws { count: u32 },
    TargetPlayerDraws { count: u32 },
    GainLife { amount: i32 },
}

impl Effect {
    pub fn damage(amount: i32) -> Self {
        Effect::DealDamage {
            amount,
            then_draw: 0,
        }
    }

    fn candidates(&self, ctx: &AbilityContext) -> Option<ObjectSet> {
        match self {
            Effect::DealDamage { .. } => Some(ObjectSet::damageable()),
            Effect::ReturnToLibrary => Some(ObjectSet::Zone(ZoneId::Graveyard(ctx.controller))),
            Effect::TargetPlayerDraws { .. } => Some(ObjectSet::Players),
            _ => None,
        }
    }
}

impl StackEffect for Effect {
    fn make_choices(
        &self,
        ctx: &AbilityContext,
        game: &GameState,
        chooser: &mut dyn PlayerController,
    ) -> ChoiceResult<Choices> {
        let mut choices = Choices::default();
        if let Some(candidates) = self.candidates(ctx) {
            choices.choose_targets(game, ctx, chooser, candidates, ChoiceBounds::exactly(1), None)?;
        }
        Ok(choices)
    }

    fn resolve(&self, ctx: &AbilityContext, game: &mut GameState, choices: &Choices) -> Result<()> {
        match self {
            Effect::DealDamage { amount, then_draw } => {
                if let Some(target) = choices.target(0, 0) {
                    game.damage(ctx.source(), target, *amount, false)?;
                }
                if *then_draw > 0 {
                    game.draw(ctx.controller, *then_draw)?;
                }
            }
            Effect::ReturnToLibrary => {
                if let Some(Target::Object(card)) = choices.target(0, 0) {
                    let owner = game.objects.get(card)?.owner;
                    game.move_object(card, ZoneId::Library(owner))?;
                }
            }
            Effect::PutCounters { counter, amount } => {
                game.put_counters(ctx.source(), counter.clone(), *amount);
            }
            Effect::DrawCards { count } => {
                game.draw(ctx.controller, *count)?;
            }
            Effect::EachPlayerDraws { count } => {
                for player in game.apnap_order() {
                    game.draw(player, *count)?;
                }
            }
            Effect::TargetPlayerDraws { count } => {
                if let Some(Target::Player(player)) = choices.target(0, 0) {
                    game.draw(player, *count)?;
                }
            }
            Effect::GainLife { amount } => game.gain_life(ctx.controller, *amount)?,
        }
        Ok(())
    }

    fn describe(&self) -> String {
        match self {
            Effect::DealDamage { amount, then_draw: 0 } => {
                format!("Deal {amount} damage to any target")
            }
            Effect::DealDamage { amount, then_draw } => {
                format!("Deal {amount} damage to any target. Draw {then_draw} card(s)")
            }
            Effect::ReturnToLibrary => {
                "Put target card from your graveyard on top of your library".to_string()
            }
            Effect::PutCounters { counter, amount } => {
                format!("Put {amount} {} counter(s) on this", counter.as_str())
            }
            Effect::DrawCards { count } => format!("Draw {count} card(s)"),
            Effect::EachPlayerDraws { count } => format!("Each player draws {count} card(s)"),
            Effect::TargetPlayerDraws { count } => format!("Target player draws {count} card(s)"),
            Effect::GainLife { amount } => format!("Gain {amount} life"),
        }
    }
}
