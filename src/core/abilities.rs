//! Abilities and the stack-effect contract
//!
//! An [`Ability`] is bound to at most one source object, exactly once. Effects
//! that can use the stack (spells, activated and triggered abilities) implement
//! [`StackEffect`], which computes the choices needed to resolve and then
//! applies the effect.

use crate::core::{Choices, Color, Cost, Keyword, ObjectId, PlayerId};
use crate::error::ChoiceResult;
use crate::game::{GameState, PlayerController};
use crate::{MtgError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifies one ability on one object: the `index`-th ability of `source`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbilityRef {
    pub source: ObjectId,
    pub index: usize,
}

impl AbilityRef {
    pub fn new(source: ObjectId, index: usize) -> Self {
        AbilityRef { source, index }
    }
}

impl fmt::Display for AbilityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.source, self.index)
    }
}

/// The ability being resolved and the player it resolves for ("you")
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbilityContext {
    pub ability: AbilityRef,
    pub controller: PlayerId,
}

impl AbilityContext {
    pub fn new(ability: AbilityRef, controller: PlayerId) -> Self {
        AbilityContext {
            ability,
            controller,
        }
    }

    pub fn source(&self) -> ObjectId {
        self.ability.source
    }
}

/// An effect that can go on the stack
pub trait StackEffect: fmt::Debug + Send + Sync {
    /// Compute the choices (targets, modes) needed to resolve
    fn make_choices(
        &self,
        _ctx: &AbilityContext,
        _game: &GameState,
        _chooser: &mut dyn PlayerController,
    ) -> ChoiceResult<Choices> {
        Ok(Choices::default())
    }

    /// Apply the effect. Fizzle checks have already been made by the caller.
    fn resolve(&self, ctx: &AbilityContext, game: &mut GameState, choices: &Choices)
        -> Result<()>;

    fn describe(&self) -> String;
}

/// What an activated ability does once its cost is paid
#[derive(Debug, Clone)]
pub enum ActivatedEffect {
    /// Mana abilities resolve immediately without using the stack
    AddMana { color: Color, amount: u32 },
    Stack(Arc<dyn StackEffect>),
}

#[derive(Debug, Clone)]
pub struct ActivatedAbility {
    pub cost: Cost,
    pub effect: ActivatedEffect,
    /// Only activatable when a sorcery could be cast
    pub sorcery_speed: bool,
}

impl ActivatedAbility {
    pub fn is_mana_ability(&self) -> bool {
        matches!(self.effect, ActivatedEffect::AddMana { .. })
    }
}

#[derive(Debug, Clone)]
pub enum AbilityKind {
    Keyword(Keyword),
    /// Static ability text. Continuous effects are not modeled.
    Static(String),
    Activated(ActivatedAbility),
    /// Triggered ability. There is no trigger detection, so these never fire.
    Triggered(Arc<dyn StackEffect>),
    Spell(Arc<dyn StackEffect>),
}

/// An ability template, bound to its source object at most once
#[derive(Debug)]
pub struct Ability {
    kind: AbilityKind,
    source: Option<ObjectId>,
}

impl Ability {
    pub fn new(kind: AbilityKind) -> Self {
        Ability { kind, source: None }
    }

    pub fn keyword(keyword: Keyword) -> Self {
        Ability::new(AbilityKind::Keyword(keyword))
    }

    pub fn spell(effect: impl StackEffect + 'static) -> Self {
        Ability::new(AbilityKind::Spell(Arc::new(effect)))
    }

    pub fn activated(cost: Cost, effect: impl StackEffect + 'static) -> Self {
        Ability::new(AbilityKind::Activated(ActivatedAbility {
            cost,
            effect: ActivatedEffect::Stack(Arc::new(effect)),
            sorcery_speed: false,
        }))
    }

    pub fn mana(cost: Cost, color: Color, amount: u32) -> Self {
        Ability::new(AbilityKind::Activated(ActivatedAbility {
            cost,
            effect: ActivatedEffect::AddMana { color, amount },
            sorcery_speed: false,
        }))
    }

    /// Planeswalker loyalty ability, activated at sorcery speed
    pub fn loyalty(change: i32, effect: impl StackEffect + 'static) -> Self {
        Ability::new(AbilityKind::Activated(ActivatedAbility {
            cost: Cost::loyalty(change),
            effect: ActivatedEffect::Stack(Arc::new(effect)),
            sorcery_speed: true,
        }))
    }

    pub fn kind(&self) -> &AbilityKind {
        &self.kind
    }

    pub fn source(&self) -> Option<ObjectId> {
        self.source
    }

    pub fn as_activated(&self) -> Option<&ActivatedAbility> {
        match &self.kind {
            AbilityKind::Activated(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_spell(&self) -> Option<&Arc<dyn StackEffect>> {
        match &self.kind {
            AbilityKind::Spell(e) => Some(e),
            _ => None,
        }
    }

    pub fn bind(&mut self, source: ObjectId) -> Result<()> {
        if let Some(existing) = self.source {
            return Err(MtgError::AlreadyBound(existing));
        }
        self.source = Some(source);
        Ok(())
    }

    /// Independent copy with no source, ready to bind elsewhere
    pub fn copy_unbound(&self) -> Ability {
        Ability {
            kind: self.kind.clone(),
            source: None,
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AbilityKind::Keyword(k) => write!(f, "{k}"),
            AbilityKind::Static(text) => write!(f, "{text}"),
            AbilityKind::Activated(a) => match &a.effect {
                ActivatedEffect::AddMana { color, amount } => {
                    write!(f, "{}: Add ", a.cost)?;
                    for _ in 0..*amount {
                        write!(f, "{color}")?;
                    }
                    Ok(())
                }
                ActivatedEffect::Stack(e) => write!(f, "{}: {}", a.cost, e.describe()),
            },
            AbilityKind::Triggered(e) => write!(f, "(trigger) {}", e.describe()),
            AbilityKind::Spell(e) => write!(f, "{}", e.describe()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ability_binds_once() {
        let mut ability = Ability::keyword(Keyword::Haste);
        ability.bind(ObjectId::new(1)).unwrap();
        assert_eq!(ability.source(), Some(ObjectId::new(1)));

        let err = ability.bind(ObjectId::new(2)).unwrap_err();
        assert_eq!(err, MtgError::AlreadyBound(ObjectId::new(1)));
    }

    #[test]
    fn test_copy_is_unbound() {
        let mut ability = Ability::mana(Cost::Tap, Color::Green, 1);
        ability.bind(ObjectId::new(4)).unwrap();

        let mut copy = ability.copy_unbound();
        assert_eq!(copy.source(), None);
        copy.bind(ObjectId::new(5)).unwrap();
        assert!(copy.as_activated().unwrap().is_mana_ability());
        assert_eq!(copy.to_string(), "T: Add G");
    }
}
