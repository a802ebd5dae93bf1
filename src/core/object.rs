//! Game objects and the object registry
//!
//! Objects are never mutated into a different card: a zone change retires the
//! old id (tombstoned with a successor link) and allocates a new one.

use crate::core::{
    AbilityRef, CardType, Characteristics, Choices, CounterType, Keyword, LiveCharacteristics,
    StackEffect,
};
use crate::zones::ZoneId;
use crate::{MtgError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Identifier of a game object, unique for the whole game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    pub const fn new(id: u32) -> Self {
        ObjectId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Seat index of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    pub const fn new(id: u32) -> Self {
        PlayerId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Counter multiset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters(SmallVec<[(CounterType, u32); 2]>);

impl Counters {
    pub fn get(&self, kind: &CounterType) -> u32 {
        self.0
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn add(&mut self, kind: CounterType, amount: u32) {
        if amount == 0 {
            return;
        }
        match self.0.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, n)) => *n = n.saturating_add(amount),
            None => self.0.push((kind, amount)),
        }
    }

    /// Remove up to `amount`; returns how many were removed
    pub fn remove(&mut self, kind: &CounterType, amount: u32) -> u32 {
        let Some(pos) = self.0.iter().position(|(k, _)| k == kind) else {
            return 0;
        };
        let removed = amount.min(self.0[pos].1);
        self.0[pos].1 -= removed;
        if self.0[pos].1 == 0 {
            self.0.remove(pos);
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &(CounterType, u32)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// State that only exists while an object is on the battlefield
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermanentState {
    pub tapped: bool,
    pub summoning_sick: bool,
    pub used_loyalty: bool,
    pub damage: i32,
    pub deathtouch_damage: bool,
}

impl PermanentState {
    pub fn entering() -> Self {
        PermanentState {
            summoning_sick: true,
            ..PermanentState::default()
        }
    }
}

#[derive(Debug, Clone)]
pub enum ObjectKind {
    Card,
    Token,
    /// An activated or triggered ability waiting on the stack
    StackAbility {
        origin: AbilityRef,
        effect: Arc<dyn StackEffect>,
    },
}

#[derive(Debug)]
pub struct GameObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub zone: ZoneId,
    pub owner: PlayerId,
    pub controller: PlayerId,
    chars: Characteristics,
    pub permanent: Option<PermanentState>,
    pub counters: Counters,
    /// Choices made when this spell or ability was put on the stack
    pub stack_choices: Option<Choices>,
}

impl GameObject {
    pub(crate) fn new(
        id: ObjectId,
        kind: ObjectKind,
        zone: ZoneId,
        mut chars: Characteristics,
        owner: PlayerId,
        controller: PlayerId,
    ) -> Result<Self> {
        chars.bind(id)?;
        Ok(GameObject {
            id,
            kind,
            zone,
            owner,
            controller,
            chars,
            permanent: (zone == ZoneId::Battlefield).then(PermanentState::entering),
            counters: Counters::default(),
            stack_choices: None,
        })
    }

    /// The bound template
    pub fn base(&self) -> &Characteristics {
        &self.chars
    }

    pub fn live(&self) -> LiveCharacteristics<'_> {
        LiveCharacteristics::new(&self.chars, &self.counters)
    }

    pub fn name(&self) -> &str {
        self.chars.name().as_str()
    }

    pub fn power(&self) -> i32 {
        self.live().power()
    }

    pub fn toughness(&self) -> i32 {
        self.live().toughness()
    }

    pub fn has_type(&self, card_type: CardType) -> bool {
        self.chars.has_type(card_type)
    }

    pub fn is_creature(&self) -> bool {
        self.has_type(CardType::Creature)
    }

    pub fn has_keyword(&self, keyword: &Keyword) -> bool {
        self.chars.has_keyword(keyword)
    }

    pub fn is_token(&self) -> bool {
        matches!(self.kind, ObjectKind::Token)
    }

    pub fn is_tapped(&self) -> bool {
        self.permanent.as_ref().is_some_and(|p| p.tapped)
    }

    /// Untapped, and not summoning sick unless hasty or not a creature
    pub fn can_tap(&self) -> bool {
        match &self.permanent {
            Some(p) => {
                !p.tapped
                    && (!p.summoning_sick
                        || self.has_keyword(&Keyword::Haste)
                        || !self.is_creature())
            }
            None => false,
        }
    }

    pub fn damage(&self) -> i32 {
        self.permanent.as_ref().map(|p| p.damage).unwrap_or(0)
    }
}

impl fmt::Display for GameObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id)
    }
}

#[derive(Debug)]
struct Tombstone {
    object: GameObject,
    successor: Option<ObjectId>,
}

/// Registry of live objects plus tombstones of retired ones
#[derive(Debug, Default)]
pub struct ObjectStore {
    live: FxHashMap<ObjectId, GameObject>,
    retired: FxHashMap<ObjectId, Tombstone>,
    next_id: u32,
}

impl ObjectStore {
    pub fn new() -> Self {
        ObjectStore::default()
    }

    pub fn next_id(&mut self) -> ObjectId {
        let id = ObjectId::new(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn insert(&mut self, object: GameObject) {
        self.live.insert(object.id, object);
    }

    pub fn get(&self, id: ObjectId) -> Result<&GameObject> {
        self.live.get(&id).ok_or(MtgError::ObjectNotFound(id))
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Result<&mut GameObject> {
        self.live.get_mut(&id).ok_or(MtgError::ObjectNotFound(id))
    }

    pub fn is_alive(&self, id: ObjectId) -> bool {
        self.live.contains_key(&id)
    }

    /// Live object, or the last state of a retired one
    pub fn last_known(&self, id: ObjectId) -> Option<&GameObject> {
        self.live
            .get(&id)
            .or_else(|| self.retired.get(&id).map(|t| &t.object))
    }

    /// Remove from the registry, leaving a tombstone
    pub(crate) fn retire(&mut self, id: ObjectId) -> Option<&GameObject> {
        let object = self.live.remove(&id)?;
        let tomb = self.retired.entry(id).or_insert(Tombstone {
            object,
            successor: None,
        });
        Some(&tomb.object)
    }

    pub(crate) fn link_successor(&mut self, old: ObjectId, new: ObjectId) {
        if let Some(tomb) = self.retired.get_mut(&old) {
            tomb.successor = Some(new);
        }
    }

    pub fn successor(&self, id: ObjectId) -> Option<ObjectId> {
        self.retired.get(&id).and_then(|t| t.successor)
    }

    /// Follow successor links to the newest incarnation
    pub fn latest(&self, mut id: ObjectId) -> ObjectId {
        while let Some(next) = self.successor(id) {
            id = next;
        }
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameObject> {
        self.live.values()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
