//! Printed characteristics of an object
//!
//! A [`Characteristics`] value is an immutable template. It is bound to exactly
//! one object; putting the same card on another object requires
//! [`Characteristics::copy_unbound`], which also resets every ability binding.

use crate::core::{Ability, CardName, CardType, Color, Cost, Counters, Keyword, ObjectId, Subtype, Supertype};
use crate::{MtgError, Result};
use smallvec::SmallVec;
use std::ops::Deref;

#[derive(Debug)]
pub struct Characteristics {
    name: CardName,
    cost: Cost,
    supertypes: SmallVec<[Supertype; 1]>,
    types: SmallVec<[CardType; 2]>,
    subtypes: SmallVec<[Subtype; 2]>,
    colors: SmallVec<[Color; 2]>,
    power: i32,
    toughness: i32,
    starting_loyalty: i32,
    abilities: Vec<Ability>,
    mana_value: u32,
    source: Option<ObjectId>,
}

impl Characteristics {
    pub fn builder() -> CharacteristicsBuilder {
        CharacteristicsBuilder::default()
    }

    pub fn name(&self) -> &CardName {
        &self.name
    }

    pub fn cost(&self) -> &Cost {
        &self.cost
    }

    pub fn supertypes(&self) -> &[Supertype] {
        &self.supertypes
    }

    pub fn types(&self) -> &[CardType] {
        &self.types
    }

    pub fn subtypes(&self) -> &[Subtype] {
        &self.subtypes
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn power(&self) -> i32 {
        self.power
    }

    pub fn toughness(&self) -> i32 {
        self.toughness
    }

    pub fn starting_loyalty(&self) -> i32 {
        self.starting_loyalty
    }

    pub fn mana_value(&self) -> u32 {
        self.mana_value
    }

    pub fn abilities(&self) -> &[Ability] {
        &self.abilities
    }

    pub fn ability(&self, index: usize) -> Option<&Ability> {
        self.abilities.get(index)
    }

    /// The object this template is bound to
    pub fn source(&self) -> Option<ObjectId> {
        self.source
    }

    pub fn has_type(&self, card_type: CardType) -> bool {
        self.types.contains(&card_type)
    }

    pub fn has_supertype(&self, supertype: Supertype) -> bool {
        self.supertypes.contains(&supertype)
    }

    pub fn has_subtype(&self, subtype: &Subtype) -> bool {
        self.subtypes.contains(subtype)
    }

    pub fn is_permanent(&self) -> bool {
        self.types.iter().any(|t| t.is_permanent())
    }

    pub fn has_keyword(&self, keyword: &Keyword) -> bool {
        self.abilities
            .iter()
            .any(|a| matches!(a.kind(), crate::core::AbilityKind::Keyword(k) if k == keyword))
    }

    /// Bind this template and all of its abilities to `source`
    pub fn bind(&mut self, source: ObjectId) -> Result<()> {
        if let Some(existing) = self.source {
            return Err(MtgError::AlreadyBound(existing));
        }
        for ability in &mut self.abilities {
            ability.bind(source)?;
        }
        self.source = Some(source);
        Ok(())
    }

    /// Deep copy with every binding reset
    pub fn copy_unbound(&self) -> Characteristics {
        Characteristics {
            name: self.name.clone(),
            cost: self.cost.clone(),
            supertypes: self.supertypes.clone(),
            types: self.types.clone(),
            subtypes: self.subtypes.clone(),
            colors: self.colors.clone(),
            power: self.power,
            toughness: self.toughness,
            starting_loyalty: self.starting_loyalty,
            abilities: self.abilities.iter().map(Ability::copy_unbound).collect(),
            mana_value: self.mana_value,
            source: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct CharacteristicsBuilder {
    name: Option<String>,
    cost: Option<Cost>,
    supertypes: SmallVec<[Supertype; 1]>,
    types: SmallVec<[CardType; 2]>,
    subtypes: SmallVec<[Subtype; 2]>,
    colors: Option<SmallVec<[Color; 2]>>,
    power: i32,
    toughness: i32,
    starting_loyalty: i32,
    abilities: Vec<Ability>,
}

impl CharacteristicsBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn cost(mut self, cost: Cost) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Shorthand for a plain mana cost such as "1R"
    pub fn mana_cost(self, cost: &str) -> Self {
        self.cost(Cost::mana(cost))
    }

    pub fn supertypes(mut self, supertypes: impl IntoIterator<Item = Supertype>) -> Self {
        self.supertypes = supertypes.into_iter().collect();
        self
    }

    pub fn types(mut self, types: impl IntoIterator<Item = CardType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    pub fn subtypes<S: AsRef<str>>(mut self, subtypes: impl IntoIterator<Item = S>) -> Self {
        self.subtypes = subtypes.into_iter().map(Subtype::new).collect();
        self
    }

    /// Override the colors otherwise derived from the cost
    pub fn colors(mut self, colors: impl IntoIterator<Item = Color>) -> Self {
        self.colors = Some(colors.into_iter().collect());
        self
    }

    pub fn power_toughness(mut self, power: i32, toughness: i32) -> Self {
        self.power = power;
        self.toughness = toughness;
        self
    }

    pub fn loyalty(mut self, loyalty: i32) -> Self {
        self.starting_loyalty = loyalty;
        self
    }

    pub fn keyword(mut self, keyword: Keyword) -> Self {
        self.abilities.push(Ability::keyword(keyword));
        self
    }

    pub fn ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }

    pub fn build(self) -> Characteristics {
        let cost = self.cost.unwrap_or(Cost::Null);
        let colors = self
            .colors
            .unwrap_or_else(|| cost.colors().into_iter().collect());
        // Unnamed objects are tokens named after their subtypes
        let name = self.name.unwrap_or_else(|| {
            let words: Vec<String> = self.subtypes.iter().map(Subtype::title).collect();
            if words.is_empty() {
                "Token".to_string()
            } else {
                format!("{} Token", words.join(" "))
            }
        });

        Characteristics {
            name: CardName::new(name),
            mana_value: cost.mana_value(),
            cost,
            supertypes: self.supertypes,
            types: self.types,
            subtypes: self.subtypes,
            colors,
            power: self.power,
            toughness: self.toughness,
            starting_loyalty: self.starting_loyalty,
            abilities: self.abilities,
            source: None,
        }
    }
}

/// Characteristics as currently seen in the game: the template with counter
/// modifiers applied to power and toughness
#[derive(Debug, Clone, Copy)]
pub struct LiveCharacteristics<'a> {
    base: &'a Characteristics,
    counters: &'a Counters,
}

impl<'a> LiveCharacteristics<'a> {
    pub fn new(base: &'a Characteristics, counters: &'a Counters) -> Self {
        LiveCharacteristics { base, counters }
    }

    fn pt_delta(&self) -> (i32, i32) {
        self.counters
            .iter()
            .filter_map(|(kind, n)| {
                let n = i32::try_from(*n).unwrap_or(i32::MAX);
                kind.pt_modifier()
                    .map(|(p, t)| (p.saturating_mul(n), t.saturating_mul(n)))
            })
            .fold((0, 0), |(p, t), (dp, dt)| {
                (p.saturating_add(dp), t.saturating_add(dt))
            })
    }

    pub fn power(&self) -> i32 {
        self.base.power.saturating_add(self.pt_delta().0)
    }

    pub fn toughness(&self) -> i32 {
        self.base.toughness.saturating_add(self.pt_delta().1)
    }
}

impl Deref for LiveCharacteristics<'_> {
    type Target = Characteristics;

    fn deref(&self) -> &Characteristics {
        self.base
    }
}
