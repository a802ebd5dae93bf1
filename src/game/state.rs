//! Main game state structure
//!
//! [`GameState`] bundles the object registry, zones, players and the current
//! turn. Every rules operation takes it explicitly, so independent games can
//! run side by side.

use crate::core::{
    CardType, Characteristics, Color, CounterType, GameObject, Keyword, ObjectId, ObjectKind,
    ObjectSet, ObjectStore, Player, PlayerId, Target,
};
use crate::error::{EngineResult, GameOver};
use crate::game::{GameConfig, GameLogger, Turn, VerbosityLevel};
use crate::zones::{ZoneId, Zones};
use crate::{MtgError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::fmt;

/// A zone change about to happen (`successor` is `None`) or just completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneChange {
    pub object: ObjectId,
    pub from: ZoneId,
    pub to: ZoneId,
    pub successor: Option<ObjectId>,
}

/// Hook notified around every zone change
pub trait ZoneChangeListener: fmt::Debug {
    fn before_move(&mut self, _change: &ZoneChange) {}
    fn after_move(&mut self, _change: &ZoneChange) {}
}

/// Complete game state
#[derive(Debug)]
pub struct GameState {
    /// Live objects and tombstones of retired ones
    pub objects: ObjectStore,

    /// Players in seat order; lost players stay here with `has_lost` set
    pub players: Vec<Player>,

    pub zones: Zones,

    pub turn: Turn,

    /// 1-based number of the current turn
    pub turn_number: u32,

    pub config: GameConfig,

    /// Centralized logger for game events
    pub logger: GameLogger,

    /// Used for library shuffles
    pub rng: ChaCha12Rng,

    listeners: Vec<Box<dyn ZoneChangeListener>>,

    outcome: Option<GameOver>,
}

impl GameState {
    pub fn new(names: &[&str], config: GameConfig) -> Self {
        let players: Vec<Player> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut player = Player::new(PlayerId::new(i as u32), *name, config.starting_life);
                player.max_lands_per_turn = config.lands_per_turn;
                player
            })
            .collect();
        let rng = ChaCha12Rng::seed_from_u64(config.seed.unwrap_or(0));

        GameState {
            objects: ObjectStore::new(),
            zones: Zones::new(players.len()),
            players,
            turn: Turn::new(PlayerId::new(0)),
            turn_number: 1,
            config,
            logger: GameLogger::new(),
            rng,
            listeners: Vec::new(),
            outcome: None,
        }
    }

    /// Two players with the default configuration
    pub fn new_two_player(player1_name: &str, player2_name: &str) -> Self {
        GameState::new(&[player1_name, player2_name], GameConfig::default())
    }

    pub fn add_zone_listener(&mut self, listener: Box<dyn ZoneChangeListener>) {
        self.listeners.push(listener);
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        self.players
            .get(id.index())
            .ok_or(MtgError::PlayerNotFound(id))
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        self.players
            .get_mut(id.index())
            .ok_or(MtgError::PlayerNotFound(id))
    }

    pub fn is_in_game(&self, id: PlayerId) -> bool {
        self.player(id).is_ok_and(|p| !p.has_lost)
    }

    pub fn players_in_game(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().filter(|p| !p.has_lost).map(|p| p.id)
    }

    pub fn active_player(&self) -> PlayerId {
        self.turn.active_player
    }

    /// Next player in seat order who is still in the game
    pub fn next_player(&self, player: PlayerId) -> PlayerId {
        let n = self.players.len();
        (1..=n)
            .map(|offset| PlayerId::new(((player.index() + offset) % n) as u32))
            .find(|p| self.is_in_game(*p))
            .unwrap_or(player)
    }

    /// Players still in the game, starting with the active player
    pub fn apnap_order(&self) -> Vec<PlayerId> {
        let active = self.turn.active_player;
        let n = self.players.len();
        (0..n)
            .map(|offset| PlayerId::new(((active.index() + offset) % n) as u32))
            .filter(|p| self.is_in_game(*p))
            .collect()
    }

    pub fn opponents(&self, player: PlayerId) -> Vec<PlayerId> {
        self.players_in_game().filter(|p| *p != player).collect()
    }

    /// A player controls themself; objects report their controller
    pub fn controller_of(&self, target: Target) -> Option<PlayerId> {
        match target {
            Target::Player(p) => Some(p),
            Target::Object(id) => self.objects.get(id).ok().map(|o| o.controller),
        }
    }

    pub fn stack_top(&self) -> Option<ObjectId> {
        self.zones.stack.top()
    }

    fn zone_mut(&mut self, zone: ZoneId) -> Result<&mut crate::zones::Zone> {
        self.zones
            .get_mut(zone)
            .ok_or_else(|| MtgError::IllegalAction(format!("no such zone: {zone}")))
    }

    /// Register a fresh object and place it on top of `zone`
    fn spawn(
        &mut self,
        kind: ObjectKind,
        chars: Characteristics,
        zone: ZoneId,
        owner: PlayerId,
        controller: PlayerId,
    ) -> Result<ObjectId> {
        self.zone_mut(zone)?;
        let id = self.objects.next_id();
        let mut object = GameObject::new(id, kind, zone, chars, owner, controller)?;
        if zone == ZoneId::Battlefield && object.has_type(CardType::Planeswalker) {
            let loyalty = object.base().starting_loyalty().max(0) as u32;
            object.counters.add(CounterType::loyalty(), loyalty);
        }
        self.objects.insert(object);
        self.zone_mut(zone)?.add(id);
        Ok(id)
    }

    /// Create an object owned and controlled by `owner`
    pub fn create_object(
        &mut self,
        kind: ObjectKind,
        chars: Characteristics,
        zone: ZoneId,
        owner: PlayerId,
    ) -> Result<ObjectId> {
        let id = self.spawn(kind, chars, zone, owner, owner)?;
        self.logger.event(
            VerbosityLevel::Verbose,
            "zone_change",
            &format!("{} created in {zone}", self.describe(id)),
        );
        Ok(id)
    }

    /// Create a card from a shared template
    pub fn create_card(
        &mut self,
        template: &Characteristics,
        zone: ZoneId,
        owner: PlayerId,
    ) -> Result<ObjectId> {
        self.create_object(ObjectKind::Card, template.copy_unbound(), zone, owner)
    }

    /// Create a token on the battlefield
    pub fn create_token(&mut self, template: &Characteristics, owner: PlayerId) -> Result<ObjectId> {
        self.create_object(
            ObjectKind::Token,
            template.copy_unbound(),
            ZoneId::Battlefield,
            owner,
        )
    }

    /// Put one card per template into the owner's library, in order (the last
    /// template ends up on top)
    pub fn build_deck(&mut self, owner: PlayerId, deck: &[Characteristics]) -> Result<Vec<ObjectId>> {
        deck.iter()
            .map(|template| self.create_card(template, ZoneId::Library(owner), owner))
            .collect()
    }

    fn notify(&mut self, change: &ZoneChange) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in &mut listeners {
            if change.successor.is_some() {
                listener.after_move(change);
            } else {
                listener.before_move(change);
            }
        }
        self.listeners = listeners;
    }

    /// Move an object to another zone, re-creating it there
    ///
    /// Returns the new object's id. Moving a dead object is a no-op returning
    /// `None`; moving an object into the zone it is already in returns it
    /// unchanged, except for zones that always re-create. Abilities on the
    /// stack cease to exist instead of moving.
    pub fn move_object(&mut self, id: ObjectId, to: ZoneId) -> Result<Option<ObjectId>> {
        let Ok(object) = self.objects.get(id) else {
            return Ok(None);
        };
        let from = object.zone;
        if from == to && !to.reenters_on_self_move() {
            return Ok(Some(id));
        }
        if matches!(object.kind, ObjectKind::StackAbility { .. }) {
            self.delete_object(id);
            return Ok(None);
        }
        self.zone_mut(to)?;

        let mut change = ZoneChange {
            object: id,
            from,
            to,
            successor: None,
        };
        self.notify(&change);

        if let Some(zone) = self.zones.get_mut(from) {
            zone.remove(id);
        }
        let old = self.objects.retire(id).ok_or(MtgError::ObjectNotFound(id))?;
        let kind = old.kind.clone();
        let chars = old.base().copy_unbound();
        let owner = old.owner;
        let controller = if to.keeps_controller() {
            old.controller
        } else {
            owner
        };
        let name = old.name().to_string();

        let new_id = self.spawn(kind, chars, to, owner, controller)?;
        self.objects.link_successor(id, new_id);
        if from == ZoneId::Battlefield {
            self.turn.remove_from_combat(id);
        }
        self.logger.event(
            VerbosityLevel::Verbose,
            "zone_change",
            &format!("{name} ({id}) moved from {from} to {to} as {new_id}"),
        );

        change.successor = Some(new_id);
        self.notify(&change);
        Ok(Some(new_id))
    }

    /// Remove an object from the game with no successor
    pub fn delete_object(&mut self, id: ObjectId) {
        let Ok(object) = self.objects.get(id) else {
            return;
        };
        let zone = object.zone;
        if let Some(z) = self.zones.get_mut(zone) {
            z.remove(id);
        }
        self.objects.retire(id);
        if zone == ZoneId::Battlefield {
            self.turn.remove_from_combat(id);
        }
        self.logger.event(
            VerbosityLevel::Verbose,
            "zone_change",
            &format!("{id} ceased to exist"),
        );
    }

    /// Name and id of an object, live or retired
    pub fn describe(&self, id: ObjectId) -> String {
        match self.objects.last_known(id) {
            Some(object) => object.to_string(),
            None => id.to_string(),
        }
    }

    /// Describe a player or object for log messages
    pub fn describe_target(&self, target: Target) -> String {
        match target {
            Target::Player(p) => self
                .player(p)
                .map(|pl| pl.name.to_string())
                .unwrap_or_else(|_| p.to_string()),
            Target::Object(id) => self.describe(id),
        }
    }

    pub fn shuffle_library(&mut self, player: PlayerId) {
        if let Some(library) = self.zones.get_mut(ZoneId::Library(player)) {
            library.shuffle(&mut self.rng);
        }
    }

    /// Draw up to `count` cards; stops silently when the library runs out
    pub fn draw(&mut self, player: PlayerId, count: u32) -> Result<Vec<ObjectId>> {
        let mut drawn = Vec::new();
        for _ in 0..count {
            let Some(top) = self.zones.get(ZoneId::Library(player)).and_then(|z| z.top()) else {
                self.logger.event(
                    VerbosityLevel::Verbose,
                    "draw",
                    &format!("{player} has no cards left to draw"),
                );
                break;
            };
            if let Some(card) = self.move_object(top, ZoneId::Hand(player))? {
                drawn.push(card);
            }
        }
        Ok(drawn)
    }

    pub fn tap(&mut self, id: ObjectId) {
        if let Some(state) = self.objects.get_mut(id).ok().and_then(|o| o.permanent.as_mut()) {
            state.tapped = true;
        }
    }

    pub fn untap(&mut self, id: ObjectId) {
        if let Some(state) = self.objects.get_mut(id).ok().and_then(|o| o.permanent.as_mut()) {
            state.tapped = false;
        }
    }

    /// Put a permanent into its owner's graveyard; anything else is ignored
    pub fn destroy(&mut self, id: ObjectId) -> Result<Option<ObjectId>> {
        let Ok(object) = self.objects.get(id) else {
            return Ok(None);
        };
        if object.zone != ZoneId::Battlefield {
            return Ok(None);
        }
        let owner = object.owner;
        self.logger.event(
            VerbosityLevel::Normal,
            "destroy",
            &format!("{} is destroyed", self.describe(id)),
        );
        self.move_object(id, ZoneId::Graveyard(owner))
    }

    /// Deal damage from `source` to a player, creature or planeswalker
    ///
    /// The source's last known characteristics are used, so a source that has
    /// already left its zone still deals damage with its keywords.
    pub fn damage(&mut self, source: ObjectId, target: Target, amount: i32, combat: bool) -> Result<()> {
        if amount <= 0 || !ObjectSet::damageable().contains(self, target) {
            return Ok(());
        }
        let src = self
            .objects
            .last_known(source)
            .ok_or(MtgError::ObjectNotFound(source))?;
        let deathtouch = src.has_keyword(&Keyword::Deathtouch);
        let infect = src.has_keyword(&Keyword::Infect);
        let wither = src.has_keyword(&Keyword::Wither);
        let lifelink = src.has_keyword(&Keyword::Lifelink);
        let source_controller = src.controller;

        self.logger.event(
            VerbosityLevel::Normal,
            "damage",
            &format!(
                "{} deals {amount} {}damage to {}",
                self.describe(source),
                if combat { "combat " } else { "" },
                self.describe_target(target)
            ),
        );

        match target {
            Target::Player(p) => {
                let player = self.player_mut(p)?;
                if infect {
                    player.counters.add(CounterType::poison(), amount as u32);
                } else {
                    player.lose_life(amount);
                }
            }
            Target::Object(id) => {
                let object = self.objects.get_mut(id)?;
                if object.is_creature() {
                    if infect || wither {
                        object
                            .counters
                            .add(CounterType::minus_one_minus_one(), amount as u32);
                    } else if let Some(state) = object.permanent.as_mut() {
                        state.damage += amount;
                    }
                    if deathtouch {
                        if let Some(state) = object.permanent.as_mut() {
                            state.deathtouch_damage = true;
                        }
                    }
                }
                if object.has_type(CardType::Planeswalker) {
                    object.counters.remove(&CounterType::loyalty(), amount as u32);
                }
            }
        }

        if lifelink {
            self.gain_life(source_controller, amount)?;
        }
        Ok(())
    }

    pub fn gain_life(&mut self, player: PlayerId, amount: i32) -> Result<()> {
        self.player_mut(player)?.gain_life(amount);
        Ok(())
    }

    pub fn lose_life(&mut self, player: PlayerId, amount: i32) -> Result<()> {
        self.player_mut(player)?.lose_life(amount);
        Ok(())
    }

    pub fn set_life(&mut self, player: PlayerId, life: i32) -> Result<()> {
        self.player_mut(player)?.life = life;
        Ok(())
    }

    pub fn put_counters(&mut self, id: ObjectId, kind: CounterType, amount: u32) {
        if let Ok(object) = self.objects.get_mut(id) {
            object.counters.add(kind, amount);
        }
    }

    /// Returns how many counters were actually removed
    pub fn remove_counters(&mut self, id: ObjectId, kind: &CounterType, amount: u32) -> u32 {
        match self.objects.get_mut(id) {
            Ok(object) => object.counters.remove(kind, amount),
            Err(_) => 0,
        }
    }

    pub fn add_mana(&mut self, player: PlayerId, color: Color, amount: u32) -> Result<()> {
        self.player_mut(player)?.mana_pool.add(color, amount);
        Ok(())
    }

    pub fn empty_mana_pools(&mut self) {
        for player in &mut self.players {
            player.empty_mana_pool();
        }
    }

    /// The given players lose simultaneously
    ///
    /// Their objects leave the game. Fails with [`GameOver`] once at most one
    /// player remains.
    pub fn lose_game(&mut self, losers: &[PlayerId]) -> EngineResult<()> {
        let losers: Vec<PlayerId> = losers
            .iter()
            .copied()
            .filter(|p| self.is_in_game(*p))
            .collect();
        if losers.is_empty() {
            return Ok(());
        }
        for p in &losers {
            self.player_mut(*p)?.has_lost = true;
            self.logger.event(
                VerbosityLevel::Minimal,
                "game",
                &format!("{} loses the game", self.describe_target(Target::Player(*p))),
            );
        }

        let mut owned: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|o| losers.contains(&o.owner))
            .map(|o| o.id)
            .collect();
        owned.sort();
        for id in owned {
            self.delete_object(id);
        }

        let remaining: Vec<PlayerId> = self.players_in_game().collect();
        if remaining.len() <= 1 {
            let over = GameOver {
                winner: remaining.first().copied(),
            };
            self.outcome = Some(over);
            return Err(over.into());
        }
        Ok(())
    }

    /// Every other player loses
    pub fn win_game(&mut self, winner: PlayerId) -> EngineResult<()> {
        let others = self.opponents(winner);
        self.lose_game(&others)
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Winner of a finished game; `None` while running or after a draw
    pub fn winner(&self) -> Option<PlayerId> {
        self.outcome.and_then(|o| o.winner)
    }

    pub fn outcome(&self) -> Option<GameOver> {
        self.outcome
    }
}
