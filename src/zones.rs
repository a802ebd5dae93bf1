//! Game zones (Library, Hand, Graveyard, Battlefield, Stack, Exile)
//!
//! Zone contents are insertion-ordered: the "top" of a zone is the object that
//! entered it most recently.

use crate::core::{ObjectId, PlayerId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one concrete zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneId {
    Library(PlayerId),
    Hand(PlayerId),
    Graveyard(PlayerId),
    Battlefield,
    Stack,
    Exile,
}

impl ZoneId {
    /// Objects entering these zones keep their controller; elsewhere the
    /// controller resets to the owner
    pub fn keeps_controller(self) -> bool {
        matches!(self, ZoneId::Battlefield | ZoneId::Stack)
    }

    /// Moving an object from this zone into itself still re-creates it
    pub fn reenters_on_self_move(self) -> bool {
        matches!(self, ZoneId::Exile)
    }

    /// Tokens survive only in these zones
    pub fn holds_tokens(self) -> bool {
        matches!(self, ZoneId::Battlefield | ZoneId::Stack)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneId::Library(p) => write!(f, "{p}'s library"),
            ZoneId::Hand(p) => write!(f, "{p}'s hand"),
            ZoneId::Graveyard(p) => write!(f, "{p}'s graveyard"),
            ZoneId::Battlefield => write!(f, "battlefield"),
            ZoneId::Stack => write!(f, "stack"),
            ZoneId::Exile => write!(f, "exile"),
        }
    }
}

/// An ordered container of object references
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub objects: Vec<ObjectId>,
}

impl Zone {
    pub fn new(id: ZoneId) -> Self {
        Zone {
            id,
            objects: Vec::new(),
        }
    }

    pub fn add(&mut self, object: ObjectId) {
        self.objects.push(object);
    }

    pub fn remove(&mut self, object: ObjectId) -> bool {
        if let Some(pos) = self.objects.iter().position(|&id| id == object) {
            // Order is meaningful in every zone, so no swap_remove
            self.objects.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, object: ObjectId) -> bool {
        self.objects.contains(&object)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Most recently inserted object
    pub fn top(&self) -> Option<ObjectId> {
        self.objects.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.iter().copied()
    }

    pub fn shuffle(&mut self, rng: &mut impl rand::Rng) {
        use rand::seq::SliceRandom;
        self.objects.shuffle(rng);
    }
}

/// The zones belonging to a single player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerZones {
    pub library: Zone,
    pub hand: Zone,
    pub graveyard: Zone,
}

impl PlayerZones {
    pub fn new(player: PlayerId) -> Self {
        PlayerZones {
            library: Zone::new(ZoneId::Library(player)),
            hand: Zone::new(ZoneId::Hand(player)),
            graveyard: Zone::new(ZoneId::Graveyard(player)),
        }
    }
}

/// Every zone in the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zones {
    pub battlefield: Zone,
    pub stack: Zone,
    pub exile: Zone,
    pub players: Vec<PlayerZones>,
}

impl Zones {
    pub fn new(player_count: usize) -> Self {
        Zones {
            battlefield: Zone::new(ZoneId::Battlefield),
            stack: Zone::new(ZoneId::Stack),
            exile: Zone::new(ZoneId::Exile),
            players: (0..player_count)
                .map(|i| PlayerZones::new(PlayerId::new(i as u32)))
                .collect(),
        }
    }

    pub fn get(&self, id: ZoneId) -> Option<&Zone> {
        match id {
            ZoneId::Library(p) => self.players.get(p.index()).map(|z| &z.library),
            ZoneId::Hand(p) => self.players.get(p.index()).map(|z| &z.hand),
            ZoneId::Graveyard(p) => self.players.get(p.index()).map(|z| &z.graveyard),
            ZoneId::Battlefield => Some(&self.battlefield),
            ZoneId::Stack => Some(&self.stack),
            ZoneId::Exile => Some(&self.exile),
        }
    }

    pub fn get_mut(&mut self, id: ZoneId) -> Option<&mut Zone> {
        match id {
            ZoneId::Library(p) => self.players.get_mut(p.index()).map(|z| &mut z.library),
            ZoneId::Hand(p) => self.players.get_mut(p.index()).map(|z| &mut z.hand),
            ZoneId::Graveyard(p) => self.players.get_mut(p.index()).map(|z| &mut z.graveyard),
            ZoneId::Battlefield => Some(&mut self.battlefield),
            ZoneId::Stack => Some(&mut self.stack),
            ZoneId::Exile => Some(&mut self.exile),
        }
    }

    /// Every zone, shared zones first
    pub fn all(&self) -> impl Iterator<Item = &Zone> {
        [&self.battlefield, &self.stack, &self.exile]
            .into_iter()
            .chain(
                self.players
                    .iter()
                    .flat_map(|p| [&p.library, &p.hand, &p.graveyard]),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_order() {
        let mut zone = Zone::new(ZoneId::Stack);
        zone.add(ObjectId::new(10));
        zone.add(ObjectId::new(11));
        zone.add(ObjectId::new(12));

        assert_eq!(zone.top(), Some(ObjectId::new(12)));
        assert!(zone.remove(ObjectId::new(11)));
        assert!(!zone.remove(ObjectId::new(11)));
        assert_eq!(zone.objects, vec![ObjectId::new(10), ObjectId::new(12)]);
    }

    #[test]
    fn test_zone_lookup() {
        let mut zones = Zones::new(2);
        let p1 = PlayerId::new(1);
        zones.get_mut(ZoneId::Hand(p1)).unwrap().add(ObjectId::new(3));

        assert!(zones.get(ZoneId::Hand(p1)).unwrap().contains(ObjectId::new(3)));
        assert!(zones.get(ZoneId::Hand(PlayerId::new(0))).unwrap().is_empty());
        assert!(zones.get(ZoneId::Library(PlayerId::new(5))).is_none());
        assert_eq!(zones.all().count(), 9);
    }

    #[test]
    fn test_controller_rules() {
        assert!(ZoneId::Battlefield.keeps_controller());
        assert!(ZoneId::Stack.keeps_controller());
        assert!(!ZoneId::Graveyard(PlayerId::new(0)).keeps_controller());
        assert!(ZoneId::Exile.reenters_on_self_move());
        assert!(!ZoneId::Battlefield.reenters_on_self_move());
    }
}
