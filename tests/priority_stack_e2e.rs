//! Priority and stack end-to-end tests
//!
//! Both players act through scripted controllers so responses happen exactly
//! where the priority protocol hands them a decision.

use mtg_rules::{
    catalog,
    core::{Characteristics, Color, PlayerId},
    game::{
        available_actions, GameLoop, GameState, PlayerAction, PlayerController,
        ScriptedController, ZeroController,
    },
    zones::ZoneId,
};
use similar_asserts::assert_eq;

const ALICE: PlayerId = PlayerId::new(0);
const BOB: PlayerId = PlayerId::new(1);

fn game() -> GameState {
    let mut game = GameState::new_two_player("Alice", "Bob");
    game.logger.enable_capture();
    game
}

fn put(game: &mut GameState, card: Characteristics, zone: ZoneId, owner: PlayerId) {
    game.create_card(&card, zone, owner).unwrap();
}

fn scripted(player: PlayerId, lines: &[&str]) -> Box<dyn PlayerController> {
    Box::new(ScriptedController::from_lines(player, lines.iter().copied()).unwrap())
}

#[test]
fn test_response_resolves_before_the_spell_it_answers() {
    let mut game = game();
    put(&mut game, catalog::mountain(), ZoneId::Battlefield, ALICE);
    put(&mut game, catalog::lightning_bolt(), ZoneId::Hand(ALICE), ALICE);
    put(&mut game, catalog::plains(), ZoneId::Battlefield, BOB);
    put(&mut game, catalog::healing_salve(), ZoneId::Hand(BOB), BOB);

    let mut controllers = vec![
        scripted(ALICE, &["wait 1 main", "a Mountain", "p Lightning Bolt>Bob"]),
        scripted(BOB, &["wait 1 main", "a Plains", "p Healing Salve"]),
    ];
    GameLoop::new(&mut game)
        .run_turns(&mut controllers, 1)
        .unwrap();

    let resolved: Vec<String> = game
        .logger
        .messages_in("stack")
        .into_iter()
        .filter(|m| m.ends_with("resolves"))
        .collect();
    assert_eq!(resolved.len(), 2);
    assert!(resolved[0].starts_with("Healing Salve"), "{resolved:?}");
    assert!(resolved[1].starts_with("Lightning Bolt"), "{resolved:?}");
    assert_eq!(game.player(BOB).unwrap().life, 20);
    assert!(game.zones.stack.is_empty());
}

#[test]
fn test_land_then_mana_then_instant_at_an_opposing_creature() {
    let mut game = game();
    put(&mut game, catalog::mountain(), ZoneId::Hand(ALICE), ALICE);
    put(&mut game, catalog::lightning_bolt(), ZoneId::Hand(ALICE), ALICE);
    let bears = game
        .create_card(&catalog::grizzly_bears(), ZoneId::Battlefield, BOB)
        .unwrap();

    let mut controllers = vec![
        scripted(
            ALICE,
            &[
                "wait 1 main",
                "p Mountain",
                "a Mountain",
                "p Lightning Bolt>Grizzly Bears",
            ],
        ),
        Box::new(ZeroController::new(BOB)) as Box<dyn PlayerController>,
    ];
    GameLoop::new(&mut game)
        .run_turns(&mut controllers, 1)
        .unwrap();

    assert!(game.zones.get(ZoneId::Hand(ALICE)).unwrap().is_empty());
    let lands: Vec<(&str, bool)> = game
        .zones
        .battlefield
        .iter()
        .filter_map(|id| game.objects.get(id).ok())
        .filter(|o| o.controller == ALICE)
        .map(|o| (o.name(), o.is_tapped()))
        .collect();
    assert_eq!(lands, vec![("Mountain", true)]);

    let hits: Vec<String> = game
        .logger
        .messages_in("damage")
        .into_iter()
        .filter(|m| m.contains("Grizzly Bears"))
        .collect();
    assert_eq!(hits.len(), 1, "{hits:?}");
    assert!(!game.objects.is_alive(bears));
    let dead = game.objects.latest(bears);
    assert_eq!(game.objects.get(dead).unwrap().zone, ZoneId::Graveyard(BOB));

    let graveyard = game.zones.get(ZoneId::Graveyard(ALICE)).unwrap();
    assert_eq!(graveyard.len(), 1);
    let bolt = graveyard.top().unwrap();
    assert_eq!(game.objects.get(bolt).unwrap().name(), "Lightning Bolt");
    assert!(game.zones.stack.is_empty());
}

#[test]
fn test_spell_without_targets_is_dropped_from_the_offer() {
    let mut game = game();
    put(&mut game, catalog::forest(), ZoneId::Battlefield, ALICE);
    put(&mut game, catalog::reclaim(), ZoneId::Hand(ALICE), ALICE);
    put(&mut game, catalog::forest(), ZoneId::Hand(ALICE), ALICE);

    let mut controllers = vec![
        scripted(ALICE, &["wait 1 main", "a Forest", "p Reclaim", "p Forest"]),
        Box::new(ZeroController::new(BOB)) as Box<dyn PlayerController>,
    ];
    GameLoop::new(&mut game)
        .run_turns(&mut controllers, 1)
        .unwrap();

    let hand = game.zones.get(ZoneId::Hand(ALICE)).unwrap();
    assert_eq!(hand.len(), 1);
    let reclaim = hand.top().unwrap();
    assert_eq!(game.objects.get(reclaim).unwrap().name(), "Reclaim");
    assert_eq!(game.zones.battlefield.len(), 2);
}

#[test]
fn test_sorcery_speed_only_for_the_active_player_with_empty_stack() {
    let mut game = game();
    put(&mut game, catalog::forest(), ZoneId::Hand(BOB), BOB);
    put(&mut game, catalog::mountain(), ZoneId::Battlefield, BOB);
    put(&mut game, catalog::lightning_bolt(), ZoneId::Hand(BOB), BOB);
    game.turn.phase_index = 1;

    let offered = available_actions(&game, BOB);
    assert_eq!(offered.len(), 1, "{offered:?}");
    assert!(matches!(offered[0], PlayerAction::ActivateAbility(_)));

    // Bolt becomes castable once red mana is floating
    game.add_mana(BOB, Color::Red, 1).unwrap();
    let playable: Vec<&str> = available_actions(&game, BOB)
        .into_iter()
        .filter_map(|a| match a {
            PlayerAction::PlayCard(id) => game.objects.get(id).ok().map(|o| o.name()),
            PlayerAction::ActivateAbility(_) => None,
        })
        .collect();
    assert_eq!(playable, vec!["Lightning Bolt"]);
}

#[test]
fn test_activated_ability_waits_on_the_stack() {
    let mut game = game();
    put(&mut game, catalog::prodigal_sorcerer(), ZoneId::Battlefield, ALICE);

    let mut controllers = vec![
        scripted(ALICE, &["wait 1 main", "a Prodigal Sorcerer>Bob"]),
        Box::new(ZeroController::new(BOB)) as Box<dyn PlayerController>,
    ];
    GameLoop::new(&mut game)
        .run_turns(&mut controllers, 1)
        .unwrap();

    assert_eq!(game.player(BOB).unwrap().life, 19);
    let sorcerer = game.zones.battlefield.top().unwrap();
    assert!(game.objects.get(sorcerer).unwrap().is_tapped());
    let resolved = game.logger.messages_in("stack");
    assert_eq!(resolved.len(), 1, "{resolved:?}");
}
