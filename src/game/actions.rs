//! Player actions and stack resolution
//!
//! An action is taken in three phases: the engine asks for the choices it
//! needs (targets), checks that it is legal with those choices, then takes
//! it. Taking an action that is not legal is an engine fault; callers must
//! check first.

use crate::core::{
    AbilityContext, AbilityRef, ActivatedEffect, CardType, Characteristics, Choices, Keyword,
    ObjectId, ObjectKind, PlayerId, StackEffect,
};
use crate::error::ChoiceResult;
use crate::game::{GameState, PlayerController, VerbosityLevel};
use crate::zones::ZoneId;
use crate::{MtgError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Something a player with priority can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Play a land or cast a spell from hand
    PlayCard(ObjectId),
    /// Activate an activated ability of a permanent
    ActivateAbility(AbilityRef),
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerAction::PlayCard(id) => write!(f, "play {id}"),
            PlayerAction::ActivateAbility(ability) => write!(f, "activate {ability}"),
        }
    }
}

/// It is `player`'s main phase and the stack is empty
pub fn can_cast_sorcery(game: &GameState, player: PlayerId) -> bool {
    game.turn.active_player == player
        && game.turn.phase_kind().is_main()
        && game.zones.stack.is_empty()
}

fn first_spell_effect(game: &GameState, id: ObjectId) -> Option<(usize, Arc<dyn StackEffect>)> {
    let object = game.objects.get(id).ok()?;
    object
        .base()
        .abilities()
        .iter()
        .enumerate()
        .find_map(|(index, ability)| ability.as_spell().map(|e| (index, e.clone())))
}

impl PlayerAction {
    /// Make the choices this action needs, such as targets
    ///
    /// Fails with no-legal-choice when the action cannot currently be
    /// completed (e.g. a spell with no legal target).
    pub fn make_choices(
        &self,
        game: &GameState,
        player: PlayerId,
        chooser: &mut dyn PlayerController,
    ) -> ChoiceResult<Choices> {
        match *self {
            PlayerAction::PlayCard(id) => match first_spell_effect(game, id) {
                Some((index, effect)) => {
                    let ctx = AbilityContext::new(AbilityRef::new(id, index), player);
                    effect.make_choices(&ctx, game, chooser)
                }
                None => Ok(Choices::default()),
            },
            PlayerAction::ActivateAbility(ability) => {
                let effect = game
                    .objects
                    .get(ability.source)
                    .ok()
                    .and_then(|o| o.base().ability(ability.index))
                    .and_then(|a| a.as_activated())
                    .map(|a| a.effect.clone());
                match effect {
                    Some(ActivatedEffect::Stack(effect)) => {
                        let ctx = AbilityContext::new(ability, player);
                        effect.make_choices(&ctx, game, chooser)
                    }
                    _ => Ok(Choices::default()),
                }
            }
        }
    }

    /// Whether `player` can take this action right now
    pub fn can_take(&self, game: &GameState, player: PlayerId, _choices: &Choices) -> bool {
        match *self {
            PlayerAction::PlayCard(id) => can_play_card(game, player, id),
            PlayerAction::ActivateAbility(ability) => can_activate(game, player, ability),
        }
    }

    /// Take the action. It must have been checked with [`PlayerAction::can_take`].
    pub fn take(&self, game: &mut GameState, player: PlayerId, choices: Choices) -> Result<()> {
        if !self.can_take(game, player, &choices) {
            return Err(MtgError::IllegalAction(format!(
                "{} cannot {self} now",
                game.describe_target(player.into())
            )));
        }
        match *self {
            PlayerAction::PlayCard(id) => play_card(game, player, id, choices),
            PlayerAction::ActivateAbility(ability) => activate(game, player, ability, choices),
        }
    }
}

fn can_play_card(game: &GameState, player: PlayerId, id: ObjectId) -> bool {
    let Ok(card) = game.objects.get(id) else {
        return false;
    };
    if card.zone != ZoneId::Hand(player) {
        return false;
    }
    let instant_speed = card.has_type(CardType::Instant) || card.has_keyword(&Keyword::Flash);
    if !instant_speed && !can_cast_sorcery(game, player) {
        return false;
    }
    if card.has_type(CardType::Land) {
        game.player(player).is_ok_and(|p| p.can_play_land())
    } else {
        card.base().cost().can_pay(game, player, Some(id))
    }
}

fn play_card(game: &mut GameState, player: PlayerId, id: ObjectId, mut choices: Choices) -> Result<()> {
    let is_land = game.objects.get(id)?.has_type(CardType::Land);
    if is_land {
        game.logger.event(
            VerbosityLevel::Normal,
            "action",
            &format!("{} plays {}", game.describe_target(player.into()), game.describe(id)),
        );
        let land = game
            .move_object(id, ZoneId::Battlefield)?
            .ok_or(MtgError::ObjectNotFound(id))?;
        game.objects.get_mut(land)?.controller = player;
        game.player_mut(player)?.play_land();
        return Ok(());
    }

    let cost = game.objects.get(id)?.base().cost().clone();
    cost.pay(game, player, Some(id))?;
    game.logger.event(
        VerbosityLevel::Normal,
        "action",
        &format!("{} casts {}", game.describe_target(player.into()), game.describe(id)),
    );
    let spell = game
        .move_object(id, ZoneId::Stack)?
        .ok_or(MtgError::ObjectNotFound(id))?;
    choices.targets.rebind_source(id, spell);
    let spell = game.objects.get_mut(spell)?;
    spell.controller = player;
    spell.stack_choices = Some(choices);
    Ok(())
}

fn can_activate(game: &GameState, player: PlayerId, ability: AbilityRef) -> bool {
    let Ok(source) = game.objects.get(ability.source) else {
        return false;
    };
    if source.zone != ZoneId::Battlefield || source.controller != player {
        return false;
    }
    let Some(activated) = source.base().ability(ability.index).and_then(|a| a.as_activated()) else {
        return false;
    };
    if activated.sorcery_speed && !can_cast_sorcery(game, player) {
        return false;
    }
    activated.cost.can_pay(game, player, Some(ability.source))
}

fn activate(game: &mut GameState, player: PlayerId, ability: AbilityRef, choices: Choices) -> Result<()> {
    let (activated, source_name) = {
        let source = game.objects.get(ability.source)?;
        let activated = source
            .base()
            .ability(ability.index)
            .and_then(|a| a.as_activated())
            .cloned()
            .ok_or_else(|| MtgError::IllegalAction(format!("{ability} is not an activated ability")))?;
        (activated, source.name().to_string())
    };

    game.logger.event(
        VerbosityLevel::Normal,
        "action",
        &format!(
            "{} activates {}",
            game.describe_target(player.into()),
            game.describe(ability.source)
        ),
    );
    activated.cost.pay(game, player, Some(ability.source))?;

    match activated.effect {
        ActivatedEffect::AddMana { color, amount } => game.add_mana(player, color, amount),
        ActivatedEffect::Stack(effect) => {
            let chars = Characteristics::builder()
                .name(format!("{source_name} ability"))
                .types([CardType::Ability])
                .build();
            let id = game.create_object(
                ObjectKind::StackAbility {
                    origin: ability,
                    effect,
                },
                chars,
                ZoneId::Stack,
                player,
            )?;
            game.objects.get_mut(id)?.stack_choices = Some(choices);
            Ok(())
        }
    }
}

/// Every action `player` could take right now: cards in hand first, then
/// abilities of permanents in battlefield order
pub fn available_actions(game: &GameState, player: PlayerId) -> Vec<PlayerAction> {
    let none = Choices::default();
    let mut actions = Vec::new();
    if let Some(hand) = game.zones.get(ZoneId::Hand(player)) {
        actions.extend(
            hand.iter()
                .map(PlayerAction::PlayCard)
                .filter(|a| a.can_take(game, player, &none)),
        );
    }
    for id in game.zones.battlefield.iter() {
        let Ok(object) = game.objects.get(id) else {
            continue;
        };
        for index in 0..object.base().abilities().len() {
            let action = PlayerAction::ActivateAbility(AbilityRef::new(id, index));
            if action.can_take(game, player, &none) {
                actions.push(action);
            }
        }
    }
    actions
}

/// Resolve a spell or ability on the stack
///
/// Abilities cease to exist once resolved. Permanent spells enter the
/// battlefield; other spells apply their first spell ability unless every
/// target has become illegal, then go to their owner's graveyard.
pub fn resolve_stack_object(game: &mut GameState, id: ObjectId) -> Result<()> {
    let (kind, controller, owner, is_permanent, mut choices) = {
        let object = game.objects.get(id)?;
        (
            object.kind.clone(),
            object.controller,
            object.owner,
            object.base().is_permanent(),
            object.stack_choices.clone().unwrap_or_default(),
        )
    };
    game.logger.event(
        VerbosityLevel::Normal,
        "stack",
        &format!("{} resolves", game.describe(id)),
    );

    match kind {
        ObjectKind::StackAbility { origin, effect } => {
            let ctx = AbilityContext::new(origin, controller);
            if choices.should_fizzle(game, controller) {
                log_fizzle(game, id);
            } else {
                effect.resolve(&ctx, game, &choices)?;
            }
            game.delete_object(id);
        }
        ObjectKind::Card | ObjectKind::Token => {
            if is_permanent {
                game.move_object(id, ZoneId::Battlefield)?;
            } else {
                if let Some((index, effect)) = first_spell_effect(game, id) {
                    let ctx = AbilityContext::new(AbilityRef::new(id, index), controller);
                    if choices.should_fizzle(game, controller) {
                        log_fizzle(game, id);
                    } else {
                        effect.resolve(&ctx, game, &choices)?;
                    }
                }
                game.move_object(id, ZoneId::Graveyard(owner))?;
            }
        }
    }

    if game.objects.is_alive(id) {
        return Err(MtgError::IllegalAction(format!(
            "{} is still on the stack after resolving",
            game.describe(id)
        )));
    }
    Ok(())
}

fn log_fizzle(game: &GameState, id: ObjectId) {
    game.logger.event(
        VerbosityLevel::Normal,
        "stack",
        &format!("{} fizzles", game.describe(id)),
    );
}
