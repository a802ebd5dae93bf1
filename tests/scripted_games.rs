//! Scripted end-to-end games
//!
//! Player 1 follows a fixed script against a goldfish opponent. Each test
//! runs whole turns through the game loop and checks the resulting board.

use mtg_rules::{
    catalog,
    core::{Characteristics, PlayerId},
    game::{
        GameLoop, GameState, OutputMode, PlayerController, ScriptEntry, ScriptedController,
        StepKind, ZeroController,
    },
    zones::ZoneId,
};
use similar_asserts::assert_eq;

fn scripted_game(
    deck: &[Characteristics],
    script: Vec<ScriptEntry>,
) -> (GameState, Vec<Box<dyn PlayerController>>) {
    let mut game = GameState::new_two_player("Alice", "Bob");
    game.build_deck(PlayerId::new(0), deck).unwrap();
    game.logger.set_output_mode(OutputMode::Memory);
    let controllers: Vec<Box<dyn PlayerController>> = vec![
        Box::new(ScriptedController::new(PlayerId::new(0), script)),
        Box::new(ZeroController::new(PlayerId::new(1))),
    ];
    (game, controllers)
}

fn entry(line: &str) -> ScriptEntry {
    line.parse().unwrap()
}

fn on_battlefield(game: &GameState, name: &str) -> Option<(i32, i32)> {
    game.zones
        .battlefield
        .iter()
        .filter_map(|id| game.objects.get(id).ok())
        .find(|o| o.name() == name)
        .map(|o| (o.power(), o.toughness()))
}

#[test]
fn test_cast_creature_with_two_lands() {
    let deck = [
        catalog::memnite(),
        catalog::mountain(),
        catalog::forest(),
        catalog::grizzly_bears(),
    ];
    let script = vec![
        ScriptEntry::Pass,
        entry("p Forest"),
        ScriptEntry::wait(3, StepKind::Main),
        entry("p Mountain"),
        entry("a Forest"),
        entry("a Mountain"),
        entry("p Grizzly Bears"),
    ];
    let (mut game, mut controllers) = scripted_game(&deck, script);

    GameLoop::new(&mut game)
        .run_turns(&mut controllers, 5)
        .unwrap();

    assert_eq!(on_battlefield(&game, "Grizzly Bears"), Some((2, 2)));
    assert!(on_battlefield(&game, "Forest").is_some());
    assert!(on_battlefield(&game, "Mountain").is_some());
    let hand = game.zones.get(ZoneId::Hand(PlayerId::new(0))).unwrap();
    assert_eq!(hand.len(), 1);
}

#[test]
fn test_activated_ability_in_opponents_end_step() {
    let deck = [catalog::wastes(), catalog::chronomaton()];
    let script = vec![
        ScriptEntry::Pass,
        entry("p Wastes"),
        entry("a Wastes"),
        entry("p Chronomaton"),
        ScriptEntry::wait(4, StepKind::End),
        entry("a Wastes"),
        entry("a Chronomaton"),
        ScriptEntry::wait(6, StepKind::End),
        entry("a Wastes"),
        entry("a Chronomaton"),
    ];
    let (mut game, mut controllers) = scripted_game(&deck, script);

    GameLoop::new(&mut game)
        .run_turns(&mut controllers, 6)
        .unwrap();

    assert_eq!(on_battlefield(&game, "Chronomaton"), Some((3, 3)));
}

#[test]
fn test_second_spell_fizzles_after_target_dies() {
    let mut deck: Vec<_> = (0..10).map(|_| catalog::wastes()).collect();
    deck.extend([
        catalog::memnite(),
        catalog::mountain(),
        catalog::black_lotus(),
        catalog::lightning_bolt(),
        catalog::zap(),
    ]);
    let script = vec![
        ScriptEntry::Pass,
        entry("p Memnite"),
        ScriptEntry::Pass,
        entry("p Mountain"),
        entry("p Black Lotus"),
        ScriptEntry::Pass,
        entry("a Mountain"),
        entry("a Black Lotus.3"),
        entry("p Zap>Memnite"),
        entry("p Lightning Bolt>Memnite"),
    ];
    let (mut game, mut controllers) = scripted_game(&deck, script);
    game.logger.enable_capture();

    GameLoop::new(&mut game)
        .run_turns(&mut controllers, 1)
        .unwrap();

    let alice = PlayerId::new(0);
    // Zap never resolved, so its card draw did not happen
    assert_eq!(game.zones.get(ZoneId::Library(alice)).unwrap().len(), 8);
    assert_eq!(on_battlefield(&game, "Memnite"), None);
    assert_eq!(on_battlefield(&game, "Black Lotus"), None);

    let graveyard: Vec<&str> = game
        .zones
        .get(ZoneId::Graveyard(alice))
        .unwrap()
        .iter()
        .filter_map(|id| game.objects.get(id).ok())
        .map(|o| o.name())
        .collect();
    for name in ["Memnite", "Black Lotus", "Lightning Bolt", "Zap"] {
        assert!(graveyard.contains(&name), "{name} missing from {graveyard:?}");
    }

    let stack = game.logger.messages_in("stack");
    assert!(stack.iter().any(|m| m.contains("Zap") && m.contains("fizzles")));
    assert!(!stack.iter().any(|m| m.contains("Lightning Bolt") && m.contains("fizzles")));
}
