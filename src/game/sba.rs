//! State-based actions
//!
//! One sweep computes everything that applies from a single snapshot of the
//! game and then applies it, so the actions happen simultaneously. A sweep
//! runs each time a player would receive priority.

use crate::core::{CardType, CounterType, ObjectId, PlayerId};
use crate::error::EngineResult;
use crate::game::{GameState, VerbosityLevel};
use crate::zones::ZoneId;

/// Everything one sweep will do, gathered before anything is applied
#[derive(Debug, Default)]
struct Sweep {
    losers: Vec<PlayerId>,
    stray_tokens: Vec<ObjectId>,
    zero_toughness: Vec<ObjectId>,
    lethal_damage: Vec<ObjectId>,
    deathtouched: Vec<ObjectId>,
    zero_loyalty: Vec<ObjectId>,
    /// (permanent, number of +1/+1 and -1/-1 pairs to remove)
    annihilate: Vec<(ObjectId, u32)>,
}

impl Sweep {
    fn is_empty(&self) -> bool {
        self.losers.is_empty()
            && self.stray_tokens.is_empty()
            && self.zero_toughness.is_empty()
            && self.lethal_damage.is_empty()
            && self.deathtouched.is_empty()
            && self.zero_loyalty.is_empty()
            && self.annihilate.is_empty()
    }
}

fn snapshot(game: &GameState) -> Sweep {
    let mut sweep = Sweep::default();

    for player in game.players.iter().filter(|p| !p.has_lost) {
        if player.life <= 0 || player.poison() >= game.config.poison_limit {
            sweep.losers.push(player.id);
        }
    }

    for zone in game.zones.all() {
        if zone.id.holds_tokens() {
            continue;
        }
        sweep.stray_tokens.extend(
            zone.iter()
                .filter(|id| game.objects.get(*id).is_ok_and(|o| o.is_token())),
        );
    }

    let plus = CounterType::plus_one_plus_one();
    let minus = CounterType::minus_one_minus_one();
    for id in game.zones.battlefield.iter() {
        let Ok(object) = game.objects.get(id) else {
            continue;
        };
        if object.is_creature() {
            let toughness = object.toughness();
            if toughness <= 0 {
                sweep.zero_toughness.push(id);
            } else {
                if object.damage() >= toughness {
                    sweep.lethal_damage.push(id);
                }
                if object.permanent.as_ref().is_some_and(|p| p.deathtouch_damage) {
                    sweep.deathtouched.push(id);
                }
            }
        }
        if object.has_type(CardType::Planeswalker)
            && object.counters.get(&CounterType::loyalty()) == 0
        {
            sweep.zero_loyalty.push(id);
        }
        let pairs = object.counters.get(&plus).min(object.counters.get(&minus));
        if pairs > 0 {
            sweep.annihilate.push((id, pairs));
        }
    }

    sweep
}

/// Perform one sweep of state-based actions
///
/// Returns whether anything happened. A single pass is made; callers that
/// need a fixed point can repeat until this returns false. Fails with a game
/// over interrupt when the losses end the game.
pub fn check_state_based_actions(game: &mut GameState) -> EngineResult<bool> {
    let sweep = snapshot(game);
    let unimplemented = [
        legend_rule(game),
        world_rule(game),
        attachment_legality(game),
        counter_limits(game),
        saga_and_dungeon_cleanup(game),
    ];
    if sweep.is_empty() && !unimplemented.contains(&true) {
        return Ok(false);
    }

    game.lose_game(&sweep.losers)?;

    for id in sweep.stray_tokens {
        game.delete_object(id);
    }
    for id in sweep.zero_toughness {
        if let Ok(owner) = game.objects.get(id).map(|o| o.owner) {
            log(game, &format!("{} has no toughness", game.describe(id)));
            game.move_object(id, ZoneId::Graveyard(owner))?;
        }
    }
    for id in sweep.lethal_damage.into_iter().chain(sweep.deathtouched) {
        if game.objects.is_alive(id) {
            log(game, &format!("{} has been dealt lethal damage", game.describe(id)));
            game.destroy(id)?;
        }
    }
    for id in sweep.zero_loyalty {
        if let Ok(owner) = game.objects.get(id).map(|o| o.owner) {
            log(game, &format!("{} has no loyalty", game.describe(id)));
            game.move_object(id, ZoneId::Graveyard(owner))?;
        }
    }
    for (id, pairs) in sweep.annihilate {
        game.remove_counters(id, &CounterType::plus_one_plus_one(), pairs);
        game.remove_counters(id, &CounterType::minus_one_minus_one(), pairs);
    }
    Ok(true)
}

fn log(game: &GameState, message: &str) {
    game.logger
        .event(VerbosityLevel::Normal, "state_based", message);
}

/// Legend rule. Not implemented.
fn legend_rule(_game: &GameState) -> bool {
    false
}

/// World rule. Not implemented.
fn world_rule(_game: &GameState) -> bool {
    false
}

/// Aura, equipment and fortification attachment legality. Not implemented.
fn attachment_legality(_game: &GameState) -> bool {
    false
}

/// "Can't have more than N counters" limits. Not implemented.
fn counter_limits(_game: &GameState) -> bool {
    false
}

/// Saga sacrifice and dungeon completion. Not implemented.
fn saga_and_dungeon_cleanup(_game: &GameState) -> bool {
    false
}
