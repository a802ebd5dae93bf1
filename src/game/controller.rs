//! Player controller trait and game state view
//!
//! This module defines the interface between the game engine and player
//! controllers (AI, scripts or a human). The engine calls the controller at
//! every point where a decision is needed, and the controller inspects a
//! read-only view of the game state to make its choice. Returning `None`
//! from any decision asks the engine for its default.

use crate::core::{
    AbilityRef, ChoiceBounds, GameObject, ManaPool, ObjectId, ObjectSet, PlayerId, Target,
};
use crate::game::combat::{self, DamageAssignment, DamageOrders};
use crate::game::{available_actions, CombatState, GameState, PhaseKind, PlayerAction, StepKind};
use crate::zones::ZoneId;
use crate::{MtgError, Result};

/// Why a controller is being asked to choose objects or an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceReason {
    /// Targets for this ability
    Target(AbilityRef),
    /// Order of the creatures this creature deals combat damage to
    DamageOrder(ObjectId),
    /// Any other choice an effect asks for
    Effect(AbilityRef),
}

/// Attackers as chosen by a controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttackDeclaration {
    /// Attack the next opponent with every listed creature
    Creatures(Vec<ObjectId>),
    /// Explicit attacker to defender pairs
    Map(Vec<(ObjectId, Target)>),
}

/// Read-only view of game state for controllers
///
/// This provides access to game information without allowing mutation.
pub struct GameStateView<'a> {
    game: &'a GameState,
    player_id: PlayerId,
}

impl<'a> GameStateView<'a> {
    /// Create a new view of the game state from a player's perspective
    pub fn new(game: &'a GameState, player_id: PlayerId) -> Self {
        GameStateView { game, player_id }
    }

    /// The player this view is for
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn game(&self) -> &'a GameState {
        self.game
    }

    pub fn turn_number(&self) -> u32 {
        self.game.turn_number
    }

    pub fn active_player(&self) -> PlayerId {
        self.game.turn.active_player
    }

    pub fn priority_player(&self) -> PlayerId {
        self.game.turn.priority
    }

    pub fn phase_kind(&self) -> PhaseKind {
        self.game.turn.phase_kind()
    }

    pub fn step_kind(&self) -> StepKind {
        self.game.turn.step_kind()
    }

    pub fn opponents(&self) -> Vec<PlayerId> {
        self.game.opponents(self.player_id)
    }

    pub fn life(&self, player: PlayerId) -> i32 {
        self.game.player(player).map(|p| p.life).unwrap_or(0)
    }

    pub fn poison(&self, player: PlayerId) -> u32 {
        self.game.player(player).map(|p| p.poison()).unwrap_or(0)
    }

    pub fn mana_pool(&self) -> Option<&'a ManaPool> {
        self.game.player(self.player_id).ok().map(|p| &p.mana_pool)
    }

    /// Objects in a zone, bottom to top
    pub fn zone(&self, zone: ZoneId) -> &'a [ObjectId] {
        self.game
            .zones
            .get(zone)
            .map(|z| z.objects.as_slice())
            .unwrap_or(&[])
    }

    /// This player's hand
    pub fn hand(&self) -> &'a [ObjectId] {
        self.zone(ZoneId::Hand(self.player_id))
    }

    pub fn library_size(&self, player: PlayerId) -> usize {
        self.zone(ZoneId::Library(player)).len()
    }

    pub fn graveyard(&self, player: PlayerId) -> &'a [ObjectId] {
        self.zone(ZoneId::Graveyard(player))
    }

    pub fn battlefield(&self) -> &'a [ObjectId] {
        self.zone(ZoneId::Battlefield)
    }

    /// Spells and abilities waiting to resolve; the last one resolves first
    pub fn stack(&self) -> &'a [ObjectId] {
        self.zone(ZoneId::Stack)
    }

    pub fn object(&self, id: ObjectId) -> Option<&'a GameObject> {
        self.game.objects.get(id).ok()
    }

    pub fn name(&self, id: ObjectId) -> Option<&'a str> {
        self.object(id).map(|o| o.name())
    }

    /// First object with this name in a zone
    pub fn find_named(&self, zone: ZoneId, name: &str) -> Option<ObjectId> {
        self.zone(zone)
            .iter()
            .copied()
            .find(|id| self.name(*id) == Some(name))
    }

    pub fn power_toughness(&self, id: ObjectId) -> Option<(i32, i32)> {
        self.object(id).map(|o| (o.power(), o.toughness()))
    }

    pub fn is_tapped(&self, id: ObjectId) -> bool {
        self.object(id).is_some_and(|o| o.is_tapped())
    }

    pub fn combat(&self) -> Option<&'a CombatState> {
        self.game.turn.combat()
    }

    pub fn members(&self, set: &ObjectSet) -> Vec<Target> {
        set.members(self.game)
    }

    pub fn legal_attackers(&self) -> Vec<ObjectId> {
        combat::legal_attackers(self.game, self.player_id)
    }

    pub fn legal_blockers(&self) -> Vec<ObjectId> {
        combat::legal_blockers(self.game, self.player_id)
    }

    /// Actions this player could take right now
    pub fn available_actions(&self) -> Vec<PlayerAction> {
        available_actions(self.game, self.player_id)
    }
}

/// Player controller trait
///
/// Implement this trait to create AI players or connect to UI.
/// The game engine will call these methods when decisions need to be made.
pub trait PlayerController {
    /// Get the player ID this controller is responsible for
    fn player_id(&self) -> PlayerId;

    /// Choose an action from available options, or None to pass priority
    fn choose_action(
        &mut self,
        view: &GameStateView,
        available_actions: &[PlayerAction],
    ) -> Option<PlayerAction>;

    /// Choose between `bounds.min` and `bounds.max()` distinct candidates
    fn choose_objects(
        &mut self,
        _view: &GameStateView,
        _candidates: &[Target],
        _reason: &ChoiceReason,
        _bounds: ChoiceBounds,
    ) -> Option<Vec<Target>> {
        None
    }

    /// None declares no attackers
    fn choose_attackers(
        &mut self,
        _view: &GameStateView,
        _attackers: &[ObjectId],
        _defenders: &[Target],
    ) -> Option<AttackDeclaration> {
        None
    }

    /// Choose (attacker, blocker) pairs; None declares no blockers
    fn choose_blockers(
        &mut self,
        _view: &GameStateView,
        _attacks: &[(ObjectId, Target)],
        _blockers: &[ObjectId],
    ) -> Option<Vec<(ObjectId, ObjectId)>> {
        None
    }

    /// Put `objects` in order; None keeps the given order
    fn choose_order(
        &mut self,
        _view: &GameStateView,
        _objects: &[ObjectId],
        _reason: &ChoiceReason,
    ) -> Option<Vec<ObjectId>> {
        None
    }

    /// None uses the default assignment (lethal damage in order)
    fn choose_damage_assignment(
        &mut self,
        _view: &GameStateView,
        _orders: &DamageOrders,
    ) -> Option<Vec<DamageAssignment>> {
        None
    }

    /// Called when this player passes priority
    fn on_priority_passed(&mut self, _view: &GameStateView) {}

    /// Called when the game ends
    fn on_game_end(&mut self, _view: &GameStateView, _won: bool) {}
}

/// The controller responsible for `player`
pub fn controller_for(
    controllers: &mut [Box<dyn PlayerController>],
    player: PlayerId,
) -> Result<&mut dyn PlayerController> {
    for controller in controllers.iter_mut() {
        if controller.player_id() == player {
            return Ok(controller.as_mut());
        }
    }
    Err(MtgError::PlayerNotFound(player))
}
