//! Game loop implementation
//!
//! Manages turn progression, the priority protocol and the turn-based actions
//! of each step. The loop asks controllers for decisions and converts the
//! engine's game-over interrupt into a [`GameResult`].

use crate::core::{ObjectId, PlayerId};
use crate::error::{ChoiceError, EngineResult, GameOver, Interrupt};
use crate::game::{
    available_actions, check_state_based_actions, combat, controller_for, resolve_stack_object,
    GameState, GameStateView, PlayerController, StepKind, Turn, VerbosityLevel,
};
use crate::{MtgError, Result};
use serde::{Deserialize, Serialize};

/// Result of running a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// Winner of the game (None if draw or game didn't complete)
    pub winner: Option<PlayerId>,
    /// Total number of turns played
    pub turns_played: u32,
    /// Reason the game ended
    pub end_reason: GameEndReason,
}

/// Reason the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEndReason {
    /// Every other player lost
    Victory(PlayerId),
    /// All remaining players lost at the same time
    Draw,
    /// Game reached maximum turn limit
    TurnLimit,
    /// The requested number of turns ran without the game ending
    Manual,
}

/// Game loop manager
///
/// Handles turn progression, priority, and win condition checking
pub struct GameLoop<'a> {
    /// The game state
    pub game: &'a mut GameState,
    /// Maximum turns before forcing a draw
    max_turns: u32,
    /// Turn counter for the loop
    turns_elapsed: u32,
    /// Whether opening hands have been drawn
    game_started: bool,
}

impl<'a> GameLoop<'a> {
    /// Create a new game loop for the given game state
    pub fn new(game: &'a mut GameState) -> Self {
        let max_turns = game.config.max_turns;
        GameLoop {
            game,
            max_turns,
            turns_elapsed: 0,
            game_started: false,
        }
    }

    /// Set maximum turns before forcing a draw
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Set verbosity level on the game's logger
    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.game.logger.set_verbosity(verbosity);
        self
    }

    pub fn turns_elapsed(&self) -> u32 {
        self.turns_elapsed
    }

    /// Shuffle (when seeded), draw opening hands and set up the first turn
    pub fn start_game(&mut self, first: PlayerId) -> Result<()> {
        let players: Vec<PlayerId> = self.game.players_in_game().collect();
        if self.game.config.seed.is_some() {
            for player in &players {
                self.game.shuffle_library(*player);
            }
        }
        let hand_size = self.game.config.opening_hand_size;
        for player in &players {
            self.game.draw(*player, hand_size)?;
        }

        self.game.turn = Turn::new(first);
        if self.game.config.skip_first_draw {
            self.game.turn.phases[0].skip_step(StepKind::Draw);
        }
        self.game_started = true;
        self.game.logger.event(
            VerbosityLevel::Minimal,
            "game",
            &format!("{} goes first", self.game.describe_target(first.into())),
        );
        Ok(())
    }

    /// Run the game loop until a player wins or the turn limit is reached
    pub fn run_game(
        &mut self,
        controllers: &mut [Box<dyn PlayerController>],
    ) -> Result<GameResult> {
        self.ensure_started()?;
        loop {
            if let Some(result) = self.run_turn_once(controllers)? {
                return Ok(result);
            }
        }
    }

    /// Run a bounded number of turns
    ///
    /// Returns the game outcome if the game ended, or a result with
    /// [`GameEndReason::Manual`] if all turns completed without ending.
    pub fn run_turns(
        &mut self,
        controllers: &mut [Box<dyn PlayerController>],
        turns_to_run: u32,
    ) -> Result<GameResult> {
        self.ensure_started()?;
        for _ in 0..turns_to_run {
            if let Some(result) = self.run_turn_once(controllers)? {
                return Ok(result);
            }
        }
        Ok(GameResult {
            winner: None,
            turns_played: self.turns_elapsed,
            end_reason: GameEndReason::Manual,
        })
    }

    fn ensure_started(&mut self) -> Result<()> {
        if !self.game_started {
            let first = self.game.turn.active_player;
            self.start_game(first)?;
        }
        Ok(())
    }

    /// Run a single turn and check for game-ending conditions
    ///
    /// Returns `Ok(Some(_))` once the game is over or the turn limit is hit.
    pub fn run_turn_once(
        &mut self,
        controllers: &mut [Box<dyn PlayerController>],
    ) -> Result<Option<GameResult>> {
        if let Some(over) = self.game.outcome() {
            return Ok(Some(self.finish(controllers, over)));
        }
        if self.turns_elapsed >= self.max_turns {
            return Ok(Some(GameResult {
                winner: None,
                turns_played: self.turns_elapsed,
                end_reason: GameEndReason::TurnLimit,
            }));
        }

        let outcome = self.run_turn(controllers);
        self.turns_elapsed += 1;
        match outcome {
            Ok(()) => Ok(None),
            Err(Interrupt::GameOver(over)) => Ok(Some(self.finish(controllers, over))),
            Err(Interrupt::Fault(err)) => Err(err),
        }
    }

    fn finish(&self, controllers: &mut [Box<dyn PlayerController>], over: GameOver) -> GameResult {
        for controller in controllers.iter_mut() {
            let player = controller.player_id();
            let view = GameStateView::new(self.game, player);
            controller.on_game_end(&view, over.winner == Some(player));
        }
        let end_reason = match over.winner {
            Some(winner) => GameEndReason::Victory(winner),
            None => GameEndReason::Draw,
        };
        self.game.logger.event(
            VerbosityLevel::Minimal,
            "game",
            &format!("Game over after {} turns: {end_reason:?}", self.turns_elapsed),
        );
        GameResult {
            winner: over.winner,
            turns_played: self.turns_elapsed,
            end_reason,
        }
    }

    /// Play the current turn to its end, then set up the next player's turn
    pub fn run_turn(&mut self, controllers: &mut [Box<dyn PlayerController>]) -> EngineResult<()> {
        self.start_turn(controllers)?;
        while !self.game.turn.finished {
            self.priority_decision(controllers)?;
        }

        let next = self.game.next_player(self.game.turn.active_player);
        self.game.turn_number += 1;
        self.game.turn = Turn::new(next);
        Ok(())
    }

    fn start_turn(&mut self, controllers: &mut [Box<dyn PlayerController>]) -> EngineResult<()> {
        let active = self.game.turn.active_player;
        self.game.logger.event(
            VerbosityLevel::Normal,
            "turn",
            &format!(
                "Turn {} - {}'s turn",
                self.game.turn_number,
                self.game.describe_target(active.into())
            ),
        );
        self.game.turn.started = true;
        self.game.turn.phase_index = 0;
        if self.game.turn.phase_mut().enter() || self.enter_next_phase() {
            self.start_step(controllers)?;
        }
        Ok(())
    }

    /// Move to the first phase after the current one with a step that is not
    /// skipped. False (and the turn finished) if there is none.
    fn enter_next_phase(&mut self) -> bool {
        let turn = &mut self.game.turn;
        loop {
            turn.phase_index += 1;
            if turn.phase_index >= turn.phases.len() {
                turn.finished = true;
                return false;
            }
            if turn.phase_mut().enter() {
                return true;
            }
        }
    }

    /// Run the turn-based action of the current step, then give the active
    /// player priority. The untap step has no priority and moves straight on.
    pub fn start_step(&mut self, controllers: &mut [Box<dyn PlayerController>]) -> EngineResult<()> {
        let step = self.game.turn.step_kind();
        let active = self.game.turn.active_player;
        self.game.logger.event(
            VerbosityLevel::Verbose,
            "step",
            &format!("{} step", step),
        );
        match step {
            StepKind::Untap => {
                self.untap_step()?;
                return self.next_step(controllers);
            }
            StepKind::Draw => {
                self.game.draw(active, 1)?;
            }
            StepKind::DeclareAttackers => combat::declare_attackers(self.game, controllers)?,
            StepKind::DeclareBlockers => combat::declare_blockers(self.game, controllers)?,
            StepKind::CombatDamage => combat::combat_damage(self.game, controllers)?,
            StepKind::Cleanup => self.cleanup_step(),
            _ => {}
        }
        self.give_priority(active)
    }

    /// Finish the current step: mana empties and attack declarations settle
    pub fn end_step(&mut self) {
        if self.game.turn.step_kind() == StepKind::DeclareAttackers {
            combat::finish_declare_attackers(self.game);
        }
        self.game.empty_mana_pools();
    }

    /// End the current step and start the next one, moving through phases as
    /// needed. The turn is finished after the last step.
    pub fn next_step(&mut self, controllers: &mut [Box<dyn PlayerController>]) -> EngineResult<()> {
        self.end_step();
        let advanced = self.game.turn.phase_mut().advance() || self.enter_next_phase();
        self.game.turn.last_actor = self.game.turn.active_player;
        if advanced {
            self.start_step(controllers)?;
        }
        Ok(())
    }

    /// Grant priority, performing state-based actions first
    pub fn give_priority(&mut self, player: PlayerId) -> EngineResult<()> {
        check_state_based_actions(self.game)?;
        self.game.turn.priority = player;
        self.game.logger.event(
            VerbosityLevel::Verbose,
            "priority",
            &format!("{} has priority", self.game.describe_target(player.into())),
        );
        Ok(())
    }

    /// The priority holder passes
    ///
    /// When priority would return to the last player to act, everyone has
    /// passed in succession: the top of the stack resolves, or with an empty
    /// stack the step ends.
    pub fn pass_priority(&mut self, controllers: &mut [Box<dyn PlayerController>]) -> EngineResult<()> {
        let current = self.game.turn.priority;
        self.game.logger.event(
            VerbosityLevel::Verbose,
            "priority",
            &format!("{} passes", self.game.describe_target(current.into())),
        );
        let next = self.game.next_player(current);
        if next != self.game.turn.last_actor {
            return self.give_priority(next);
        }

        if let Some(top) = self.game.stack_top() {
            resolve_stack_object(self.game, top)?;
            let active = self.game.turn.active_player;
            self.give_priority(active)?;
        } else {
            self.next_step(controllers)?;
        }
        self.game.turn.last_actor = self.game.turn.active_player;
        Ok(())
    }

    /// The priority holder took an action and receives priority again
    pub fn take_action(&mut self) -> EngineResult<()> {
        let player = self.game.turn.priority;
        self.game.turn.last_actor = player;
        self.give_priority(player)
    }

    /// Ask the priority holder for an action and carry it out
    ///
    /// Actions whose choices cannot be made are dropped from the offered list
    /// and the player is asked again.
    fn priority_decision(&mut self, controllers: &mut [Box<dyn PlayerController>]) -> EngineResult<()> {
        let player = self.game.turn.priority;
        let mut actions = available_actions(self.game, player);
        loop {
            let controller = controller_for(controllers, player)?;
            let view = GameStateView::new(self.game, player);
            let Some(action) = controller.choose_action(&view, &actions) else {
                controller.on_priority_passed(&view);
                return self.pass_priority(controllers);
            };

            let choices = match action.make_choices(self.game, player, controller) {
                Ok(choices) => choices,
                Err(ChoiceError::NoLegalChoice(reason)) => {
                    self.game.logger.event(
                        VerbosityLevel::Verbose,
                        "priority",
                        &format!("No possible choices for {action}: {reason}"),
                    );
                    actions.retain(|a| *a != action);
                    continue;
                }
                Err(ChoiceError::Fault(err)) => return Err(err.into()),
            };
            if !action.can_take(self.game, player, &choices) {
                return Err(MtgError::InvalidDecision(format!(
                    "{} chose {action}, which cannot be taken now",
                    self.game.describe_target(player.into())
                ))
                .into());
            }
            self.game.logger.event(
                VerbosityLevel::Normal,
                "action",
                &format!("{}: {action}", self.game.describe_target(player.into())),
            );
            action.take(self.game, player, choices)?;
            return self.take_action();
        }
    }

    /// Untap the active player's permanents, reset per-turn allowances and
    /// run state-based actions
    fn untap_step(&mut self) -> EngineResult<()> {
        let active = self.game.turn.active_player;
        let permanents: Vec<ObjectId> = self.game.zones.battlefield.iter().collect();
        for id in permanents {
            let Ok(object) = self.game.objects.get_mut(id) else {
                continue;
            };
            let controlled = object.controller == active;
            if let Some(state) = object.permanent.as_mut() {
                state.used_loyalty = false;
                if controlled {
                    state.summoning_sick = false;
                }
            }
            if controlled {
                self.game.untap(id);
            }
        }
        for player in self.game.players.iter_mut() {
            player.reset_lands_played();
        }
        check_state_based_actions(self.game)?;
        Ok(())
    }

    /// Marked damage wears off
    fn cleanup_step(&mut self) {
        let permanents: Vec<ObjectId> = self.game.zones.battlefield.iter().collect();
        for id in permanents {
            if let Some(state) = self
                .game
                .objects
                .get_mut(id)
                .ok()
                .and_then(|o| o.permanent.as_mut())
            {
                state.damage = 0;
                state.deathtouch_damage = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::core::Color;
    use crate::game::{OutputMode, PhaseKind, PlayerAction, ZeroController};
    use crate::zones::ZoneId;

    fn goldfish() -> Vec<Box<dyn PlayerController>> {
        vec![
            Box::new(ZeroController::new(PlayerId::new(0))),
            Box::new(ZeroController::new(PlayerId::new(1))),
        ]
    }

    fn game_with_libraries(cards: usize) -> GameState {
        let mut game = GameState::new_two_player("Alice", "Bob");
        for player in [PlayerId::new(0), PlayerId::new(1)] {
            let deck: Vec<_> = (0..cards).map(|_| catalog::wastes()).collect();
            game.build_deck(player, &deck).unwrap();
        }
        game.logger.set_output_mode(OutputMode::Memory);
        game
    }

    /// Plays a land whenever it can
    struct LandPlayer(PlayerId);

    impl PlayerController for LandPlayer {
        fn player_id(&self) -> PlayerId {
            self.0
        }

        fn choose_action(
            &mut self,
            _view: &GameStateView,
            actions: &[PlayerAction],
        ) -> Option<PlayerAction> {
            actions
                .iter()
                .copied()
                .find(|a| matches!(a, PlayerAction::PlayCard(_)))
        }
    }

    #[test]
    fn test_start_game_draws_opening_hands() {
        let mut game = game_with_libraries(10);
        let mut game_loop = GameLoop::new(&mut game);
        game_loop.start_game(PlayerId::new(1)).unwrap();

        assert_eq!(game.zones.get(ZoneId::Hand(PlayerId::new(0))).unwrap().len(), 7);
        assert_eq!(game.zones.get(ZoneId::Library(PlayerId::new(1))).unwrap().len(), 3);
        assert_eq!(game.turn.active_player, PlayerId::new(1));
        assert!(game.turn.phases[0].steps.iter().any(|s| s.kind == StepKind::Draw && s.skipped));
    }

    #[test]
    fn test_first_turn_skips_draw_second_turn_draws() {
        let mut game = game_with_libraries(10);
        let mut controllers = goldfish();
        let mut game_loop = GameLoop::new(&mut game);

        game_loop.run_turns(&mut controllers, 1).unwrap();
        assert_eq!(game_loop.game.zones.get(ZoneId::Hand(PlayerId::new(0))).unwrap().len(), 7);

        game_loop.run_turns(&mut controllers, 1).unwrap();
        assert_eq!(game.zones.get(ZoneId::Hand(PlayerId::new(1))).unwrap().len(), 8);
        assert_eq!(game.turn_number, 3);
        assert_eq!(game.turn.active_player, PlayerId::new(0));
    }

    #[test]
    fn test_untap_step_untaps_active_player_only() {
        let mut game = game_with_libraries(0);
        let alice = PlayerId::new(0);
        let bob = PlayerId::new(1);
        let mine = game
            .create_card(&catalog::grizzly_bears(), ZoneId::Battlefield, alice)
            .unwrap();
        let theirs = game
            .create_card(&catalog::grizzly_bears(), ZoneId::Battlefield, bob)
            .unwrap();
        game.tap(mine);
        game.tap(theirs);
        game.player_mut(alice).unwrap().play_land();

        let mut game_loop = GameLoop::new(&mut game);
        game_loop.untap_step().unwrap();

        let mine = game.objects.get(mine).unwrap();
        assert!(!mine.is_tapped());
        assert!(!mine.permanent.as_ref().unwrap().summoning_sick);
        let theirs = game.objects.get(theirs).unwrap();
        assert!(theirs.is_tapped());
        assert!(theirs.permanent.as_ref().unwrap().summoning_sick);
        assert!(game.player(alice).unwrap().can_play_land());
    }

    #[test]
    fn test_everyone_passing_resolves_the_stack_first() {
        let mut game = game_with_libraries(0);
        let alice = PlayerId::new(0);
        let bears = game
            .create_card(&catalog::grizzly_bears(), ZoneId::Hand(alice), alice)
            .unwrap();
        game.add_mana(alice, Color::Green, 2).unwrap();
        game.turn.phase_index = 1;
        let mut controllers = goldfish();

        let mut game_loop = GameLoop::new(&mut game);
        PlayerAction::PlayCard(bears)
            .take(game_loop.game, alice, Default::default())
            .unwrap();
        game_loop.take_action().unwrap();
        assert_eq!(game_loop.game.zones.stack.len(), 1);

        game_loop.pass_priority(&mut controllers).unwrap();
        assert_eq!(game_loop.game.turn.priority, PlayerId::new(1));
        game_loop.pass_priority(&mut controllers).unwrap();

        assert!(game.zones.stack.is_empty());
        assert_eq!(game.zones.battlefield.len(), 1);
        assert_eq!(game.turn.phase_kind(), PhaseKind::PrecombatMain);
        assert_eq!(game.turn.priority, alice);
    }

    #[test]
    fn test_everyone_passing_on_empty_stack_ends_the_step() {
        let mut game = game_with_libraries(0);
        game.turn.phase_index = 1;
        let mut controllers = goldfish();
        let mut game_loop = GameLoop::new(&mut game);
        game_loop.pass_priority(&mut controllers).unwrap();
        game_loop.pass_priority(&mut controllers).unwrap();
        assert_eq!(game.turn.phase_kind(), PhaseKind::Combat);
    }

    #[test]
    fn test_land_player_plays_one_land_per_turn() {
        let mut game = game_with_libraries(10);
        let mut controllers: Vec<Box<dyn PlayerController>> = vec![
            Box::new(LandPlayer(PlayerId::new(0))),
            Box::new(ZeroController::new(PlayerId::new(1))),
        ];
        let mut game_loop = GameLoop::new(&mut game);
        let result = game_loop.run_turns(&mut controllers, 3).unwrap();

        assert_eq!(result.end_reason, GameEndReason::Manual);
        assert_eq!(result.turns_played, 3);
        let lands = game
            .zones
            .battlefield
            .iter()
            .filter(|id| game.objects.get(*id).is_ok_and(|o| o.controller == PlayerId::new(0)))
            .count();
        assert_eq!(lands, 2);
    }

    #[test]
    fn test_turn_limit() {
        let mut game = game_with_libraries(20);
        let mut controllers = goldfish();
        let mut game_loop = GameLoop::new(&mut game).with_max_turns(4);
        let result = game_loop.run_game(&mut controllers).unwrap();
        assert_eq!(result.end_reason, GameEndReason::TurnLimit);
        assert_eq!(result.turns_played, 4);
        assert_eq!(result.winner, None);
    }

    #[test]
    fn test_player_at_zero_life_loses_at_next_priority() {
        let mut game = game_with_libraries(10);
        game.set_life(PlayerId::new(1), 0).unwrap();
        let mut controllers = goldfish();
        let mut game_loop = GameLoop::new(&mut game);
        let result = game_loop.run_game(&mut controllers).unwrap();

        assert_eq!(result.winner, Some(PlayerId::new(0)));
        assert_eq!(result.end_reason, GameEndReason::Victory(PlayerId::new(0)));
        assert_eq!(result.turns_played, 1);
        assert!(game.is_game_over());
    }

    #[test]
    fn test_mana_empties_between_steps() {
        let mut game = game_with_libraries(0);
        let alice = PlayerId::new(0);
        game.turn.phase_index = 1;
        game.add_mana(alice, Color::Red, 1).unwrap();
        let mut controllers = goldfish();
        let mut game_loop = GameLoop::new(&mut game);
        game_loop.next_step(&mut controllers).unwrap();
        assert_eq!(game.player(alice).unwrap().mana_pool.total(), 0);
        assert_eq!(game.turn.last_actor, alice);
    }
}
