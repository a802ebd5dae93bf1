//! Costs that can be paid to cast spells and activate abilities
//!
//! `can_pay` is a pure predicate; `pay` must only be called after `can_pay`
//! returned true for the same payer and source.

use crate::core::{Color, CounterType, ManaCost, ObjectId, PlayerId};
use crate::game::GameState;
use crate::zones::ZoneId;
use crate::{MtgError, Result};
use std::fmt;
use std::ops::Add;
use std::sync::Arc;

/// Extension point for costs with no built-in variant
pub trait CostRule: fmt::Debug + Send + Sync {
    fn can_pay(&self, game: &GameState, payer: PlayerId, source: Option<ObjectId>) -> bool;
    fn pay(&self, game: &mut GameState, payer: PlayerId, source: Option<ObjectId>) -> Result<()>;
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub enum Cost {
    /// Can never be paid (e.g. the cost of a land or token)
    Null,
    /// Costs nothing
    Free,
    Mana(ManaCost),
    /// At most one mana part, always first, followed by other obligations in order
    Compound(Vec<Cost>),
    /// Tap the source
    Tap,
    /// Sacrifice the source
    SacrificeSelf,
    Custom(Arc<dyn CostRule>),
}

impl Cost {
    pub fn mana(s: &str) -> Cost {
        Cost::Mana(ManaCost::from_string(s))
    }

    /// Combine costs: mana parts merge, everything else is kept in order
    pub fn compound(costs: impl IntoIterator<Item = Cost>) -> Cost {
        costs.into_iter().fold(Cost::Free, |acc, c| acc + c)
    }

    /// Add (positive) or remove (negative) loyalty counters from the source
    pub fn loyalty(change: i32) -> Cost {
        Cost::Custom(Arc::new(LoyaltyCost(change)))
    }

    pub fn colors(&self) -> Vec<Color> {
        match self {
            Cost::Mana(m) => m.colors(),
            _ => Vec::new(),
        }
    }

    pub fn mana_value(&self) -> u32 {
        match self {
            Cost::Mana(m) => m.mana_value(),
            Cost::Compound(parts) => parts.iter().map(Cost::mana_value).sum(),
            _ => 0,
        }
    }

    pub fn can_pay(&self, game: &GameState, payer: PlayerId, source: Option<ObjectId>) -> bool {
        match self {
            Cost::Null => false,
            Cost::Free => true,
            Cost::Mana(m) => game
                .player(payer)
                .is_ok_and(|p| m.can_be_paid_from(&p.mana_pool, source)),
            Cost::Compound(parts) => parts.iter().all(|c| c.can_pay(game, payer, source)),
            Cost::Tap => source.is_some_and(|id| {
                game.objects.get(id).is_ok_and(|obj| {
                    obj.controller == payer && obj.zone == ZoneId::Battlefield && obj.can_tap()
                })
            }),
            Cost::SacrificeSelf => source.is_some_and(|id| {
                game.objects
                    .get(id)
                    .is_ok_and(|obj| obj.controller == payer && obj.zone == ZoneId::Battlefield)
            }),
            Cost::Custom(rule) => rule.can_pay(game, payer, source),
        }
    }

    pub fn pay(&self, game: &mut GameState, payer: PlayerId, source: Option<ObjectId>) -> Result<()> {
        match self {
            Cost::Null => Err(MtgError::PaymentFailed("cost cannot be paid".to_string())),
            Cost::Free => Ok(()),
            Cost::Mana(m) => {
                let player = game.player_mut(payer)?;
                m.pay_from(&mut player.mana_pool, source)
            }
            Cost::Compound(parts) => {
                for part in parts {
                    part.pay(game, payer, source)?;
                }
                Ok(())
            }
            Cost::Tap => {
                let id = source
                    .ok_or_else(|| MtgError::PaymentFailed("tap cost without source".to_string()))?;
                game.objects.get(id)?;
                game.tap(id);
                Ok(())
            }
            Cost::SacrificeSelf => {
                let id = source.ok_or_else(|| {
                    MtgError::PaymentFailed("sacrifice cost without source".to_string())
                })?;
                let owner = game.objects.get(id)?.owner;
                game.move_object(id, ZoneId::Graveyard(owner))?;
                Ok(())
            }
            Cost::Custom(rule) => rule.pay(game, payer, source),
        }
    }
}

/// Loyalty cost of a planeswalker ability; one loyalty ability per permanent per turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoyaltyCost(pub i32);

impl CostRule for LoyaltyCost {
    fn can_pay(&self, game: &GameState, payer: PlayerId, source: Option<ObjectId>) -> bool {
        let Some(object) = source.and_then(|id| game.objects.get(id).ok()) else {
            return false;
        };
        let unused = object.permanent.as_ref().is_some_and(|p| !p.used_loyalty);
        let loyalty = object.counters.get(&CounterType::loyalty()) as i32;
        object.controller == payer && unused && loyalty + self.0 >= 0
    }

    fn pay(&self, game: &mut GameState, _payer: PlayerId, source: Option<ObjectId>) -> Result<()> {
        let id = source
            .ok_or_else(|| MtgError::PaymentFailed("loyalty cost without source".to_string()))?;
        if self.0 >= 0 {
            game.put_counters(id, CounterType::loyalty(), self.0 as u32);
        } else {
            game.remove_counters(id, &CounterType::loyalty(), self.0.unsigned_abs());
        }
        if let Some(state) = game.objects.get_mut(id)?.permanent.as_mut() {
            state.used_loyalty = true;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{:+}", self.0)
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, other: Cost) -> Cost {
        match (self, other) {
            (Cost::Null, _) | (_, Cost::Null) => Cost::Null,
            (Cost::Free, c) | (c, Cost::Free) => c,
            (Cost::Mana(a), Cost::Mana(b)) => Cost::Mana(a + b),
            (a, b) => {
                let mut mana: Option<ManaCost> = None;
                let mut rest = Vec::new();
                for part in [a, b] {
                    let parts = match part {
                        Cost::Compound(parts) => parts,
                        single => vec![single],
                    };
                    for p in parts {
                        match p {
                            Cost::Mana(m) => mana = Some(mana.map_or(m, |acc| acc + m)),
                            other => rest.push(other),
                        }
                    }
                }
                let mut parts: Vec<Cost> = mana.into_iter().map(Cost::Mana).collect();
                parts.extend(rest);
                Cost::Compound(parts)
            }
        }
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cost::Null => write!(f, "-"),
            Cost::Free => write!(f, "0"),
            Cost::Mana(m) => write!(f, "{m}"),
            Cost::Compound(parts) => {
                let parts: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
            Cost::Tap => write!(f, "T"),
            Cost::SacrificeSelf => write!(f, "Sacrifice"),
            Cost::Custom(rule) => write!(f, "{}", rule.describe()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_absorbs_and_free_is_identity() {
        assert!(matches!(Cost::Null + Cost::Tap, Cost::Null));
        assert!(matches!(Cost::Tap + Cost::Null, Cost::Null));
        assert!(matches!(Cost::Free + Cost::Tap, Cost::Tap));
        assert!(matches!(Cost::mana("R") + Cost::Free, Cost::Mana(_)));
    }

    #[test]
    fn test_compound_merges_mana_parts() {
        let cost = Cost::mana("1") + Cost::Tap + Cost::mana("R") + Cost::SacrificeSelf;
        match &cost {
            Cost::Compound(parts) => {
                assert_eq!(parts.len(), 3);
                assert!(matches!(&parts[0], Cost::Mana(m) if *m == ManaCost::from_string("1R")));
                assert!(matches!(parts[1], Cost::Tap));
                assert!(matches!(parts[2], Cost::SacrificeSelf));
            }
            other => panic!("expected compound, got {other:?}"),
        }
        assert_eq!(cost.mana_value(), 2);
        assert_eq!(cost.to_string(), "1R, T, Sacrifice");
    }

    #[test]
    fn test_loyalty_cost_once_per_turn() {
        let mut game = GameState::new_two_player("Alice", "Bob");
        let alice = PlayerId::new(0);
        let jace = game
            .create_card(&crate::catalog::jace_beleren(), ZoneId::Battlefield, alice)
            .unwrap();
        let minus_four = Cost::loyalty(-4);
        assert!(!minus_four.can_pay(&game, alice, Some(jace)));

        let plus_two = Cost::loyalty(2);
        assert_eq!(plus_two.to_string(), "+2");
        assert!(plus_two.can_pay(&game, alice, Some(jace)));
        plus_two.pay(&mut game, alice, Some(jace)).unwrap();
        assert_eq!(
            game.objects.get(jace).unwrap().counters.get(&CounterType::loyalty()),
            5
        );
        assert!(!Cost::loyalty(-1).can_pay(&game, alice, Some(jace)));
    }

    #[test]
    fn test_compound_constructor() {
        let cost = Cost::compound([Cost::Tap, Cost::mana("2")]);
        assert_eq!(cost.to_string(), "2, T");
    }
}
