//! Combat system
//!
//! Handles declaring attackers, declaring blockers, damage assignment order
//! and combat damage. [`CombatState`] lives on the combat phase of the turn,
//! so it is discarded with the turn.

use crate::core::{CardType, Keyword, ObjectId, ObjectSet, PlayerId, Target};
use crate::error::EngineResult;
use crate::game::{
    controller_for, AttackDeclaration, ChoiceReason, GameState, GameStateView, PlayerController,
    Step, StepKind, VerbosityLevel,
};
use crate::MtgError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Combat state for the current combat phase
///
/// Uses BTreeMap/BTreeSet for deterministic iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    /// Attacking creature -> attacked player or planeswalker. `None` once the
    /// attacked planeswalker has left combat.
    pub attacks: BTreeMap<ObjectId, Option<Target>>,

    /// (attacker, blocker) pairs in declaration order
    pub blocks: Vec<(ObjectId, ObjectId)>,

    pub blockers: BTreeSet<ObjectId>,

    /// Attackers with no blockers declared. A blocked attacker stays blocked
    /// even if its blockers leave combat.
    pub unblocked: BTreeSet<ObjectId>,

    /// Per-creature order of the creatures it can deal combat damage to
    pub damage_orders: BTreeMap<ObjectId, Vec<ObjectId>>,

    /// Creatures that dealt damage in the first-strike damage step
    pub first_strikers: BTreeSet<ObjectId>,
}

impl CombatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attacking(&self, id: ObjectId) -> bool {
        self.attacks.contains_key(&id)
    }

    pub fn is_blocking(&self, id: ObjectId) -> bool {
        self.blockers.contains(&id)
    }

    pub fn is_blocked(&self, attacker: ObjectId) -> bool {
        self.attacks.contains_key(&attacker) && !self.unblocked.contains(&attacker)
    }

    pub fn blockers_of(&self, attacker: ObjectId) -> Vec<ObjectId> {
        self.blocks
            .iter()
            .filter(|(a, _)| *a == attacker)
            .map(|(_, b)| *b)
            .collect()
    }

    /// Attacked player or planeswalker
    pub fn defender_of(&self, attacker: ObjectId) -> Option<Target> {
        self.attacks.get(&attacker).copied().flatten()
    }

    pub fn attackers(&self) -> Vec<ObjectId> {
        self.attacks.keys().copied().collect()
    }

    /// Every creature currently attacking or blocking
    pub fn combatants(&self) -> BTreeSet<ObjectId> {
        self.attacks.keys().chain(self.blockers.iter()).copied().collect()
    }

    pub fn add_attack(&mut self, attacker: ObjectId, defender: Target) {
        self.attacks.insert(attacker, Some(defender));
    }

    pub fn add_block(&mut self, attacker: ObjectId, blocker: ObjectId) {
        self.blockers.insert(blocker);
        self.blocks.push((attacker, blocker));
        self.unblocked.remove(&attacker);
    }

    /// Forget a creature or planeswalker that left the battlefield
    pub fn remove(&mut self, id: ObjectId) {
        self.attacks.remove(&id);
        self.blockers.remove(&id);
        self.unblocked.remove(&id);
        self.first_strikers.remove(&id);
        self.blocks.retain(|(a, b)| *a != id && *b != id);
        self.damage_orders.remove(&id);
        for order in self.damage_orders.values_mut() {
            order.retain(|x| *x != id);
        }
        for defender in self.attacks.values_mut() {
            if *defender == Some(Target::Object(id)) {
                *defender = None;
            }
        }
    }
}

/// One chunk of combat damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageAssignment {
    pub source: ObjectId,
    pub target: Target,
    pub amount: i32,
}

impl DamageAssignment {
    pub fn new(source: ObjectId, target: impl Into<Target>, amount: i32) -> Self {
        DamageAssignment {
            source,
            target: target.into(),
            amount,
        }
    }
}

/// Source creature -> the recipients it may assign damage to, in order
pub type DamageOrders = BTreeMap<ObjectId, Vec<Target>>;

/// Creatures `player` could attack with
pub fn legal_attackers(game: &GameState, player: PlayerId) -> Vec<ObjectId> {
    ObjectSet::creatures()
        .controlled_by(player)
        .members(game)
        .into_iter()
        .filter_map(|t| t.as_object())
        .filter(|id| game.objects.get(*id).is_ok_and(|o| o.can_tap()))
        .collect()
}

/// Opponents and the planeswalkers `player` does not control
pub fn legal_attack_targets(game: &GameState, player: PlayerId) -> Vec<Target> {
    ObjectSet::opponents_of(player)
        .or(ObjectSet::permanents()
            .not_controlled_by(player)
            .with_type(CardType::Planeswalker))
        .members(game)
}

/// Untapped creatures `defender` controls
pub fn legal_blockers(game: &GameState, defender: PlayerId) -> Vec<ObjectId> {
    ObjectSet::creatures()
        .controlled_by(defender)
        .untapped()
        .members(game)
        .into_iter()
        .filter_map(|t| t.as_object())
        .collect()
}

/// Whether `blocks` is a legal declaration for `defender`
///
/// Each attacker must be attacking `defender` or one of their planeswalkers,
/// each blocker must be a legal blocker, and no creature blocks twice.
pub fn is_legal_block_set(
    game: &GameState,
    combat: &CombatState,
    defender: PlayerId,
    blocks: &[(ObjectId, ObjectId)],
) -> bool {
    let legal = legal_blockers(game, defender);
    let mut used = BTreeSet::new();
    blocks.iter().all(|(attacker, blocker)| {
        let attacked = combat
            .defender_of(*attacker)
            .and_then(|d| game.controller_of(d));
        attacked == Some(defender) && legal.contains(blocker) && used.insert(*blocker)
    })
}

/// Declare attackers turn-based action
///
/// Illegal entries in the declaration are dropped. Attackers without
/// vigilance become tapped.
pub fn declare_attackers(
    game: &mut GameState,
    controllers: &mut [Box<dyn PlayerController>],
) -> EngineResult<()> {
    let you = game.active_player();
    let attackers = legal_attackers(game, you);
    let targets = legal_attack_targets(game, you);
    if attackers.is_empty() || targets.is_empty() {
        return Ok(());
    }

    let declared = {
        let controller = controller_for(controllers, you)?;
        let view = GameStateView::new(game, you);
        controller.choose_attackers(&view, &attackers, &targets)
    };
    let default_defender = Target::Player(game.next_player(you));
    let pairs: Vec<(ObjectId, Target)> = match declared {
        None => Vec::new(),
        Some(AttackDeclaration::Creatures(creatures)) => creatures
            .into_iter()
            .map(|c| (c, default_defender))
            .collect(),
        Some(AttackDeclaration::Map(pairs)) => pairs,
    };

    let mut accepted: BTreeMap<ObjectId, Target> = BTreeMap::new();
    for (attacker, defender) in pairs {
        if attackers.contains(&attacker) && targets.contains(&defender) {
            accepted.entry(attacker).or_insert(defender);
        } else {
            game.logger.event(
                VerbosityLevel::Verbose,
                "combat",
                &format!("ignoring illegal attack by {attacker} on {defender}"),
            );
        }
    }

    for attacker in accepted.keys() {
        let vigilant = game
            .objects
            .get(*attacker)
            .is_ok_and(|o| o.has_keyword(&Keyword::Vigilance));
        if !vigilant {
            game.tap(*attacker);
        }
    }
    for (attacker, defender) in accepted {
        game.logger.event(
            VerbosityLevel::Normal,
            "combat",
            &format!(
                "{} attacks {}",
                game.describe(attacker),
                game.describe_target(defender)
            ),
        );
        if let Some(combat) = game.turn.combat_mut() {
            combat.add_attack(attacker, defender);
        }
    }
    Ok(())
}

/// After attackers: with no attackers there is nothing to block or damage
pub fn finish_declare_attackers(game: &mut GameState) {
    let no_attackers = game.turn.combat().map_or(true, |c| c.attacks.is_empty());
    if no_attackers {
        let phase = game.turn.phase_mut();
        phase.skip_step(StepKind::DeclareBlockers);
        phase.skip_step(StepKind::CombatDamage);
    }
}

/// Declare blockers turn-based action, followed by damage assignment orders
pub fn declare_blockers(
    game: &mut GameState,
    controllers: &mut [Box<dyn PlayerController>],
) -> EngineResult<()> {
    let Some(mut combat) = game.turn.combat().cloned() else {
        return Ok(());
    };
    combat.unblocked = combat.attacks.keys().copied().collect();

    let mut by_defender: BTreeMap<PlayerId, Vec<(ObjectId, Target)>> = BTreeMap::new();
    for (attacker, defender) in &combat.attacks {
        if let Some(defender) = defender {
            if let Some(player) = game.controller_of(*defender) {
                by_defender.entry(player).or_default().push((*attacker, *defender));
            }
        }
    }

    for defender in game.apnap_order() {
        let Some(attacks) = by_defender.get(&defender) else {
            continue;
        };
        let blockers = legal_blockers(game, defender);
        if blockers.is_empty() {
            continue;
        }
        let blocks = {
            let controller = controller_for(controllers, defender)?;
            let view = GameStateView::new(game, defender);
            controller
                .choose_blockers(&view, attacks, &blockers)
                .unwrap_or_default()
        };
        if !is_legal_block_set(game, &combat, defender, &blocks) {
            return Err(MtgError::InvalidDecision(format!(
                "illegal blocks for {defender}: {blocks:?}"
            ))
            .into());
        }
        for (attacker, blocker) in blocks {
            game.logger.event(
                VerbosityLevel::Normal,
                "combat",
                &format!(
                    "{} blocks {}",
                    game.describe(blocker),
                    game.describe(attacker)
                ),
            );
            combat.add_block(attacker, blocker);
        }
    }

    let mut recipients: BTreeMap<ObjectId, Vec<ObjectId>> = BTreeMap::new();
    for (attacker, blocker) in &combat.blocks {
        recipients.entry(*attacker).or_default().push(*blocker);
        recipients.entry(*blocker).or_default().push(*attacker);
    }
    for player in game.apnap_order() {
        for (creature, candidates) in &recipients {
            if game.controller_of(Target::Object(*creature)) != Some(player) {
                continue;
            }
            let order = if candidates.len() <= 1 {
                candidates.clone()
            } else {
                let controller = controller_for(controllers, player)?;
                let view = GameStateView::new(game, player);
                match controller.choose_order(&view, candidates, &ChoiceReason::DamageOrder(*creature)) {
                    None => candidates.clone(),
                    Some(order) => {
                        let mut sorted = order.clone();
                        sorted.sort();
                        let mut expected = candidates.clone();
                        expected.sort();
                        if sorted != expected {
                            return Err(MtgError::InvalidDecision(format!(
                                "damage order for {creature} is not a permutation of {candidates:?}"
                            ))
                            .into());
                        }
                        order
                    }
                }
            };
            combat.damage_orders.insert(*creature, order);
        }
    }

    if let Some(state) = game.turn.combat_mut() {
        *state = combat;
    }
    Ok(())
}

/// Combat damage turn-based action
///
/// If any combatant has first strike or double strike, only those deal damage
/// now and a second damage step is inserted for the rest (and double strikers
/// again).
pub fn combat_damage(
    game: &mut GameState,
    controllers: &mut [Box<dyn PlayerController>],
) -> EngineResult<()> {
    let Some(combat) = game.turn.combat().cloned() else {
        return Ok(());
    };
    let has = |game: &GameState, id: ObjectId, keyword: Keyword| {
        game.objects.get(id).is_ok_and(|o| o.has_keyword(&keyword))
    };
    let in_combat = combat.combatants();

    let to_damage: Vec<ObjectId> = if game.turn.step().inserted {
        in_combat
            .iter()
            .copied()
            .filter(|c| !combat.first_strikers.contains(c) || has(game, *c, Keyword::DoubleStrike))
            .collect()
    } else {
        let strikers: Vec<ObjectId> = in_combat
            .iter()
            .copied()
            .filter(|c| has(game, *c, Keyword::FirstStrike) || has(game, *c, Keyword::DoubleStrike))
            .collect();
        if strikers.is_empty() {
            in_combat.iter().copied().collect()
        } else {
            game.turn
                .phase_mut()
                .insert_after_current(Step::inserted(StepKind::CombatDamage));
            if let Some(state) = game.turn.combat_mut() {
                state.first_strikers = strikers.iter().copied().collect();
            }
            strikers
        }
    };

    let mut overall = Vec::new();
    for player in game.apnap_order() {
        let mut orders = DamageOrders::new();
        for creature in &to_damage {
            let Ok(object) = game.objects.get(*creature) else {
                continue;
            };
            if object.controller != player || object.power() <= 0 {
                continue;
            }
            let defender = combat.defender_of(*creature);
            if combat.unblocked.contains(creature) {
                if let Some(defender) = defender {
                    orders.insert(*creature, vec![defender]);
                }
                continue;
            }
            let mut order: Vec<Target> = combat
                .damage_orders
                .get(creature)
                .map(|o| o.iter().map(|id| Target::Object(*id)).collect())
                .unwrap_or_default();
            if let Some(defender) = defender {
                if object.has_keyword(&Keyword::Trample) {
                    order.push(defender);
                }
            }
            if !order.is_empty() {
                orders.insert(*creature, order);
            }
        }
        if orders.is_empty() {
            continue;
        }

        let assignment = if one_possible_assignment(game, &orders) {
            default_assignment(game, &orders)
        } else {
            let controller = controller_for(controllers, player)?;
            let view = GameStateView::new(game, player);
            controller
                .choose_damage_assignment(&view, &orders)
                .unwrap_or_else(|| default_assignment(game, &orders))
        };
        if !is_legal_assignment(game, &assignment, &orders) {
            return Err(MtgError::InvalidDecision(format!(
                "illegal damage assignment by {player}: {assignment:?}"
            ))
            .into());
        }
        overall.extend(assignment);
    }

    for chunk in overall {
        game.damage(chunk.source, chunk.target, chunk.amount, true)?;
    }
    Ok(())
}

/// Damage still needed to destroy `target`; a deathtouch source needs at most 1.
/// Players and non-creatures have no lethal threshold.
pub fn remaining_lethal(game: &GameState, target: Target, deathtouch: bool) -> i32 {
    let Some(object) = target
        .as_object()
        .and_then(|id| game.objects.get(id).ok())
        .filter(|o| o.is_creature())
    else {
        return i32::MAX;
    };
    let remaining = (object.toughness() - object.damage()).max(0);
    if deathtouch {
        remaining.min(1)
    } else {
        remaining
    }
}

fn power_of(game: &GameState, id: ObjectId) -> i32 {
    game.objects.get(id).map(|o| o.power()).unwrap_or(0)
}

fn has_deathtouch(game: &GameState, id: ObjectId) -> bool {
    game.objects
        .get(id)
        .is_ok_and(|o| o.has_keyword(&Keyword::Deathtouch))
}

/// Whether every source has exactly one legal way to divide its damage
///
/// True when each source has a single recipient, or its first recipient
/// absorbs all of its power and no other source's order starts with that
/// same recipient.
pub fn one_possible_assignment(game: &GameState, orders: &DamageOrders) -> bool {
    orders.iter().all(|(source, order)| {
        if order.len() < 2 {
            return true;
        }
        let first = order[0];
        let absorbs = power_of(game, *source)
            <= remaining_lethal(game, first, has_deathtouch(game, *source));
        let contested = orders
            .iter()
            .any(|(other, o)| other != source && o.first() == Some(&first));
        absorbs && !contested
    })
}

/// Lethal damage to each recipient in order, the rest to the last one
pub fn default_assignment(game: &GameState, orders: &DamageOrders) -> Vec<DamageAssignment> {
    let mut assignment = Vec::new();
    for (source, order) in orders {
        let Some((last, rest)) = order.split_last() else {
            continue;
        };
        let deathtouch = has_deathtouch(game, *source);
        let mut power = power_of(game, *source);
        for target in rest {
            if power <= 0 {
                break;
            }
            let lethal = remaining_lethal(game, *target, deathtouch);
            assignment.push(DamageAssignment::new(*source, *target, lethal.min(power)));
            power -= lethal.min(power);
        }
        if power > 0 {
            assignment.push(DamageAssignment::new(*source, *last, power));
        }
    }
    assignment
}

/// Check a damage assignment against the sources' orders
///
/// Every source assigns exactly its power, only to recipients in its order,
/// and a recipient gets damage only if every recipient before it in that
/// order has been assigned lethal damage (counting all sources together).
///
/// A recipient only counts as lethally assigned if the assignment names it.
/// One that already needs 0 more damage still blocks everything after it
/// until a chunk (even a 0 chunk) lists it.
pub fn is_legal_assignment(
    game: &GameState,
    assignment: &[DamageAssignment],
    orders: &DamageOrders,
) -> bool {
    let mut dealt: BTreeMap<ObjectId, i32> = BTreeMap::new();
    let mut received: BTreeMap<Target, i32> = BTreeMap::new();
    for chunk in assignment {
        let Some(order) = orders.get(&chunk.source) else {
            return false;
        };
        if !order.contains(&chunk.target) || chunk.amount < 0 {
            return false;
        }
        *dealt.entry(chunk.source).or_default() += chunk.amount;
        *received.entry(chunk.target).or_default() += chunk.amount;
    }

    if orders
        .keys()
        .any(|source| dealt.get(source).copied().unwrap_or(0) != power_of(game, *source))
    {
        return false;
    }

    let mut lethal: BTreeSet<Target> = received
        .iter()
        .filter(|(target, amount)| {
            let is_creature = target
                .as_object()
                .and_then(|id| game.objects.get(id).ok())
                .is_some_and(|o| o.is_creature());
            is_creature && **amount >= remaining_lethal(game, **target, false)
        })
        .map(|(target, _)| *target)
        .collect();
    for chunk in assignment {
        if chunk.amount > 0 && has_deathtouch(game, chunk.source) {
            lethal.insert(chunk.target);
        }
    }

    assignment.iter().filter(|c| c.amount > 0).all(|chunk| {
        orders[&chunk.source]
            .iter()
            .take_while(|t| **t != chunk.target)
            .all(|earlier| lethal.contains(earlier))
    })
}
