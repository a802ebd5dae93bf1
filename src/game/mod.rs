//! Game state, turn structure and the rules engine driving it

pub mod actions;
pub mod combat;
pub mod config;
pub mod controller;
pub mod game_loop;
pub mod logger;
pub mod phase;
pub mod random_controller;
pub mod sba;
pub mod scripted_controller;
pub mod state;
pub mod zero_controller;

pub use actions::{available_actions, can_cast_sorcery, resolve_stack_object, PlayerAction};
pub use combat::{CombatState, DamageAssignment, DamageOrders};
pub use config::GameConfig;
pub use controller::{
    controller_for, AttackDeclaration, ChoiceReason, GameStateView, PlayerController,
};
pub use game_loop::{GameEndReason, GameLoop, GameResult};
pub use logger::{GameLogger, LogEntry, OutputFormat, OutputMode, VerbosityLevel};
pub use phase::{Phase, PhaseKind, Step, StepKind, Turn};
pub use random_controller::RandomController;
pub use sba::check_state_based_actions;
pub use scripted_controller::{ScriptEntry, ScriptedController};
pub use state::{GameState, ZoneChange, ZoneChangeListener};
pub use zero_controller::ZeroController;
