//! Combat end-to-end tests
//!
//! Creatures start on the battlefield and one full turn is played. The
//! attacking player attacks with everything; the defender blocks as told.

use mtg_rules::{
    catalog,
    core::{Characteristics, ObjectId, PlayerId, Target},
    game::{
        AttackDeclaration, ChoiceReason, DamageAssignment, DamageOrders, GameLoop, GameState,
        GameStateView, OutputMode, PlayerAction, PlayerController, StepKind,
    },
    zones::ZoneId,
};
use similar_asserts::assert_eq;

const ALICE: PlayerId = PlayerId::new(0);
const BOB: PlayerId = PlayerId::new(1);

/// Attacks, blocks and orders damage as configured
#[derive(Default)]
struct Combatant {
    player: Option<PlayerId>,
    /// Cast whatever it can in its main phase, tapping lands as needed
    cast: bool,
    attack: bool,
    blocks: Vec<(ObjectId, ObjectId)>,
    order: Option<Vec<ObjectId>>,
    assignment: Option<Vec<DamageAssignment>>,
}

impl Combatant {
    fn attacker(player: PlayerId) -> Self {
        Combatant {
            player: Some(player),
            attack: true,
            ..Default::default()
        }
    }

    fn blocker(player: PlayerId, blocks: Vec<(ObjectId, ObjectId)>) -> Self {
        Combatant {
            player: Some(player),
            blocks,
            ..Default::default()
        }
    }
}

impl PlayerController for Combatant {
    fn player_id(&self) -> PlayerId {
        self.player.unwrap_or(ALICE)
    }

    fn choose_action(&mut self, view: &GameStateView, actions: &[PlayerAction]) -> Option<PlayerAction> {
        if !self.cast || view.step_kind() != StepKind::Main {
            return None;
        }
        actions
            .iter()
            .find(|a| matches!(a, PlayerAction::PlayCard(_)))
            .or_else(|| actions.first())
            .copied()
    }

    fn choose_attackers(
        &mut self,
        _view: &GameStateView,
        attackers: &[ObjectId],
        _defenders: &[Target],
    ) -> Option<AttackDeclaration> {
        self.attack
            .then(|| AttackDeclaration::Creatures(attackers.to_vec()))
    }

    fn choose_blockers(
        &mut self,
        _view: &GameStateView,
        _attacks: &[(ObjectId, Target)],
        _blockers: &[ObjectId],
    ) -> Option<Vec<(ObjectId, ObjectId)>> {
        Some(self.blocks.clone())
    }

    fn choose_order(
        &mut self,
        _view: &GameStateView,
        _objects: &[ObjectId],
        _reason: &ChoiceReason,
    ) -> Option<Vec<ObjectId>> {
        self.order.clone()
    }

    fn choose_damage_assignment(
        &mut self,
        _view: &GameStateView,
        _orders: &DamageOrders,
    ) -> Option<Vec<DamageAssignment>> {
        self.assignment.take()
    }
}

fn game() -> GameState {
    let mut game = GameState::new_two_player("Alice", "Bob");
    game.logger.set_output_mode(OutputMode::Memory);
    game
}

fn creature(game: &mut GameState, card: Characteristics, owner: PlayerId) -> ObjectId {
    game.create_card(&card, ZoneId::Battlefield, owner).unwrap()
}

fn play_turn(game: &mut GameState, alice: Combatant, bob: Combatant) {
    let mut controllers: Vec<Box<dyn PlayerController>> = vec![Box::new(alice), Box::new(bob)];
    GameLoop::new(game).run_turns(&mut controllers, 1).unwrap();
}

fn graveyard_names(game: &GameState, player: PlayerId) -> Vec<&str> {
    let mut names: Vec<&str> = game
        .zones
        .get(ZoneId::Graveyard(player))
        .unwrap()
        .iter()
        .filter_map(|id| game.objects.get(id).ok())
        .map(|o| o.name())
        .collect();
    names.sort_unstable();
    names
}

#[test]
fn test_unblocked_attackers_hit_the_player() {
    let mut game = game();
    let bears = creature(&mut game, catalog::grizzly_bears(), ALICE);
    let angel = creature(&mut game, catalog::serra_angel(), ALICE);

    play_turn(&mut game, Combatant::attacker(ALICE), Combatant::blocker(BOB, vec![]));

    assert_eq!(game.player(BOB).unwrap().life, 14);
    assert!(game.objects.get(bears).unwrap().is_tapped());
    // Vigilance
    assert!(!game.objects.get(angel).unwrap().is_tapped());
}

#[test]
fn test_only_hasty_creatures_attack_the_turn_they_arrive() {
    let mut game = game();
    for land in [catalog::mountain(), catalog::forest(), catalog::forest()] {
        creature(&mut game, land, ALICE);
    }
    for card in [catalog::raging_goblin(), catalog::grizzly_bears()] {
        game.create_card(&card, ZoneId::Hand(ALICE), ALICE).unwrap();
    }

    let alice = Combatant {
        cast: true,
        ..Combatant::attacker(ALICE)
    };
    play_turn(&mut game, alice, Combatant::blocker(BOB, vec![]));

    assert_eq!(game.player(BOB).unwrap().life, 19);
    let creatures: Vec<(&str, bool)> = game
        .zones
        .battlefield
        .iter()
        .filter_map(|id| game.objects.get(id).ok())
        .filter(|o| o.is_creature())
        .map(|o| (o.name(), o.is_tapped()))
        .collect();
    assert_eq!(
        creatures,
        vec![("Raging Goblin", true), ("Grizzly Bears", false)]
    );
}

#[test]
fn test_blocked_creatures_trade_damage() {
    let mut game = game();
    let wurm = creature(&mut game, catalog::craw_wurm(), ALICE);
    let bears = creature(&mut game, catalog::grizzly_bears(), BOB);

    play_turn(
        &mut game,
        Combatant::attacker(ALICE),
        Combatant::blocker(BOB, vec![(wurm, bears)]),
    );

    assert_eq!(game.player(BOB).unwrap().life, 20);
    assert_eq!(graveyard_names(&game, BOB), vec!["Grizzly Bears"]);
    let wurm = game.objects.get(wurm).unwrap();
    assert_eq!(wurm.zone, ZoneId::Battlefield);
    // Cleanup removed the marked damage
    assert_eq!(wurm.damage(), 0);
}

#[test]
fn test_trample_assigns_excess_to_the_player() {
    let mut game = game();
    let dreadmaw = creature(&mut game, catalog::colossal_dreadmaw(), ALICE);
    let bears = creature(&mut game, catalog::grizzly_bears(), BOB);

    play_turn(
        &mut game,
        Combatant::attacker(ALICE),
        Combatant::blocker(BOB, vec![(dreadmaw, bears)]),
    );

    assert_eq!(game.player(BOB).unwrap().life, 16);
    assert_eq!(graveyard_names(&game, BOB), vec!["Grizzly Bears"]);
}

#[test]
fn test_first_strike_kills_before_regular_damage() {
    let mut game = game();
    let knight = creature(&mut game, catalog::white_knight(), ALICE);
    let bears = creature(&mut game, catalog::grizzly_bears(), BOB);

    play_turn(
        &mut game,
        Combatant::attacker(ALICE),
        Combatant::blocker(BOB, vec![(knight, bears)]),
    );

    assert_eq!(graveyard_names(&game, BOB), vec!["Grizzly Bears"]);
    assert_eq!(graveyard_names(&game, ALICE), Vec::<&str>::new());
    assert!(game.objects.is_alive(knight));
}

#[test]
fn test_deathtouch_spreads_damage_over_ordered_blockers() {
    let mut game = game();
    let nighthawk = creature(&mut game, catalog::vampire_nighthawk(), ALICE);
    let angel = creature(&mut game, catalog::serra_angel(), BOB);
    let their_hawk = creature(&mut game, catalog::vampire_nighthawk(), BOB);

    let alice = Combatant {
        order: Some(vec![their_hawk, angel]),
        ..Combatant::attacker(ALICE)
    };
    play_turn(
        &mut game,
        alice,
        Combatant::blocker(BOB, vec![(nighthawk, angel), (nighthawk, their_hawk)]),
    );

    assert_eq!(
        graveyard_names(&game, BOB),
        vec!["Serra Angel", "Vampire Nighthawk"]
    );
    assert_eq!(graveyard_names(&game, ALICE), vec!["Vampire Nighthawk"]);
    // Both lifelinkers dealt two damage
    assert_eq!(game.player(ALICE).unwrap().life, 22);
    assert_eq!(game.player(BOB).unwrap().life, 22);
}

#[test]
fn test_chosen_assignment_is_used_when_several_are_possible() {
    let mut game = game();
    let wurm = creature(&mut game, catalog::craw_wurm(), ALICE);
    let first = creature(&mut game, catalog::grizzly_bears(), BOB);
    let second = creature(&mut game, catalog::grizzly_bears(), BOB);

    // All six damage to the first blocker; the second survives
    let alice = Combatant {
        order: Some(vec![first, second]),
        assignment: Some(vec![
            DamageAssignment::new(wurm, first, 6),
            DamageAssignment::new(wurm, second, 0),
        ]),
        ..Combatant::attacker(ALICE)
    };
    play_turn(
        &mut game,
        alice,
        Combatant::blocker(BOB, vec![(wurm, first), (wurm, second)]),
    );

    assert_eq!(graveyard_names(&game, BOB), vec!["Grizzly Bears"]);
    assert!(game.objects.is_alive(second));
    // 4 toughness, 4 damage from the two bears
    assert_eq!(graveyard_names(&game, ALICE), vec!["Craw Wurm"]);
}
