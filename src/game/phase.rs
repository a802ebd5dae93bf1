//! Turns, phases and steps
//!
//! A [`Turn`] owns its phases, each phase owns its steps, and exactly one step
//! is current at a time. This module only tracks position; starting and ending
//! steps (and the rules that happen then) is the job of the game loop.

use crate::core::{ObjectId, PlayerId};
use crate::game::CombatState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Major phases of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseKind {
    Beginning,
    PrecombatMain,
    Combat,
    PostcombatMain,
    Ending,
}

impl PhaseKind {
    pub fn is_main(self) -> bool {
        matches!(self, PhaseKind::PrecombatMain | PhaseKind::PostcombatMain)
    }

    fn steps(self) -> Vec<Step> {
        let kinds: &[StepKind] = match self {
            PhaseKind::Beginning => &[StepKind::Untap, StepKind::Upkeep, StepKind::Draw],
            PhaseKind::PrecombatMain | PhaseKind::PostcombatMain => &[StepKind::Main],
            PhaseKind::Combat => &[
                StepKind::BeginCombat,
                StepKind::DeclareAttackers,
                StepKind::DeclareBlockers,
                StepKind::CombatDamage,
                StepKind::EndCombat,
            ],
            PhaseKind::Ending => &[StepKind::End, StepKind::Cleanup],
        };
        kinds.iter().map(|k| Step::new(*k)).collect()
    }
}

/// Specific steps within phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    Untap,
    Upkeep,
    Draw,
    Main,
    BeginCombat,
    DeclareAttackers,
    DeclareBlockers,
    CombatDamage,
    EndCombat,
    End,
    Cleanup,
}

impl StepKind {
    pub fn parse(s: &str) -> Option<StepKind> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "untap" => Some(StepKind::Untap),
            "upkeep" => Some(StepKind::Upkeep),
            "draw" => Some(StepKind::Draw),
            "main" => Some(StepKind::Main),
            "begincombat" => Some(StepKind::BeginCombat),
            "declareattackers" | "attack" => Some(StepKind::DeclareAttackers),
            "declareblockers" | "block" => Some(StepKind::DeclareBlockers),
            "combatdamage" | "damage" => Some(StepKind::CombatDamage),
            "endcombat" => Some(StepKind::EndCombat),
            "end" => Some(StepKind::End),
            "cleanup" => Some(StepKind::Cleanup),
            _ => None,
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepKind::Untap => "untap",
            StepKind::Upkeep => "upkeep",
            StepKind::Draw => "draw",
            StepKind::Main => "main",
            StepKind::BeginCombat => "beginning of combat",
            StepKind::DeclareAttackers => "declare attackers",
            StepKind::DeclareBlockers => "declare blockers",
            StepKind::CombatDamage => "combat damage",
            StepKind::EndCombat => "end of combat",
            StepKind::End => "end",
            StepKind::Cleanup => "cleanup",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub kind: StepKind,
    pub skipped: bool,
    /// Added during the turn (the regular damage step after first strike)
    pub inserted: bool,
}

impl Step {
    pub fn new(kind: StepKind) -> Self {
        Step {
            kind,
            skipped: false,
            inserted: false,
        }
    }

    pub fn inserted(kind: StepKind) -> Self {
        Step {
            inserted: true,
            ..Step::new(kind)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub kind: PhaseKind,
    pub steps: Vec<Step>,
    pub current: usize,
    /// Present on the combat phase only
    pub combat: Option<CombatState>,
}

impl Phase {
    pub fn new(kind: PhaseKind) -> Self {
        Phase {
            kind,
            steps: kind.steps(),
            current: 0,
            combat: (kind == PhaseKind::Combat).then(CombatState::default),
        }
    }

    /// Current step, or the last one once the phase is over
    pub fn step(&self) -> &Step {
        &self.steps[self.current.min(self.steps.len() - 1)]
    }

    /// Mark every step of this kind as skipped
    pub fn skip_step(&mut self, kind: StepKind) {
        for step in self.steps.iter_mut().filter(|s| s.kind == kind) {
            step.skipped = true;
        }
    }

    pub fn insert_after_current(&mut self, step: Step) {
        self.steps.insert(self.current + 1, step);
    }

    /// Move to the next step that is not skipped. False if the phase is over.
    pub fn advance(&mut self) -> bool {
        loop {
            self.current += 1;
            match self.steps.get(self.current) {
                None => return false,
                Some(step) if !step.skipped => return true,
                Some(_) => {}
            }
        }
    }

    /// Position on the first step that is not skipped. False if all are.
    pub fn enter(&mut self) -> bool {
        self.current = 0;
        if self.steps.first().is_some_and(|s| !s.skipped) {
            return true;
        }
        self.advance()
    }
}

/// One player's turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub active_player: PlayerId,
    /// Player who currently has priority
    pub priority: PlayerId,
    /// Player who most recently took an action; all others passing after them
    /// ends the round of priority
    pub last_actor: PlayerId,
    pub phases: Vec<Phase>,
    pub phase_index: usize,
    pub started: bool,
    pub finished: bool,
}

impl Turn {
    pub fn new(active_player: PlayerId) -> Self {
        Turn {
            active_player,
            priority: active_player,
            last_actor: active_player,
            phases: [
                PhaseKind::Beginning,
                PhaseKind::PrecombatMain,
                PhaseKind::Combat,
                PhaseKind::PostcombatMain,
                PhaseKind::Ending,
            ]
            .into_iter()
            .map(Phase::new)
            .collect(),
            phase_index: 0,
            started: false,
            finished: false,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phases[self.phase_index.min(self.phases.len() - 1)]
    }

    pub fn phase_mut(&mut self) -> &mut Phase {
        let idx = self.phase_index.min(self.phases.len() - 1);
        &mut self.phases[idx]
    }

    pub fn phase_kind(&self) -> PhaseKind {
        self.phase().kind
    }

    pub fn step(&self) -> &Step {
        self.phase().step()
    }

    pub fn step_kind(&self) -> StepKind {
        self.step().kind
    }

    /// Combat state of the current phase, if it is combat
    pub fn combat(&self) -> Option<&CombatState> {
        self.phase().combat.as_ref()
    }

    pub fn combat_mut(&mut self) -> Option<&mut CombatState> {
        self.phase_mut().combat.as_mut()
    }

    /// Forget an object that left the battlefield
    pub fn remove_from_combat(&mut self, id: ObjectId) {
        for phase in &mut self.phases {
            if let Some(combat) = phase.combat.as_mut() {
                combat.remove(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_layout() {
        let turn = Turn::new(PlayerId::new(0));
        assert_eq!(turn.phases.len(), 5);
        assert_eq!(turn.step_kind(), StepKind::Untap);
        assert!(turn.phases[2].combat.is_some());
        assert!(turn.phases[1].combat.is_none());
    }

    #[test]
    fn test_advance_skips_marked_steps() {
        let mut phase = Phase::new(PhaseKind::Beginning);
        phase.skip_step(StepKind::Draw);
        assert!(phase.advance());
        assert_eq!(phase.step().kind, StepKind::Upkeep);
        assert!(!phase.advance());
    }

    #[test]
    fn test_enter_skips_leading_steps() {
        let mut phase = Phase::new(PhaseKind::Combat);
        phase.skip_step(StepKind::BeginCombat);
        assert!(phase.enter());
        assert_eq!(phase.step().kind, StepKind::DeclareAttackers);

        let mut main = Phase::new(PhaseKind::PrecombatMain);
        main.skip_step(StepKind::Main);
        assert!(!main.enter());
    }

    #[test]
    fn test_inserted_step_runs_next() {
        let mut phase = Phase::new(PhaseKind::Combat);
        phase.current = 3;
        phase.insert_after_current(Step::inserted(StepKind::CombatDamage));
        assert!(phase.advance());
        assert_eq!(phase.step().kind, StepKind::CombatDamage);
        assert!(phase.step().inserted);
        assert!(phase.advance());
        assert_eq!(phase.step().kind, StepKind::EndCombat);
    }

    #[test]
    fn test_step_names() {
        assert_eq!(StepKind::parse("End"), Some(StepKind::End));
        assert_eq!(StepKind::parse("declare-blockers"), Some(StepKind::DeclareBlockers));
        assert_eq!(StepKind::parse("nope"), None);
    }
}
