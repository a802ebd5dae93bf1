//! Scripted player controller for testing and examples
//!
//! The controller follows a list of [`ScriptEntry`] values. Entries name
//! cards instead of ids, so a script can be written before the game exists:
//!
//! ```text
//! p Forest                  play the first Forest in hand
//! a Black Lotus.3           activate ability 3 of a Black Lotus you control
//! p Zap>Memnite             play Zap, targeting the first legal Memnite
//! wait 3 main               pass until turn 3's main step
//! pass                      pass priority once
//! ```

use crate::core::{AbilityRef, ChoiceBounds, ObjectId, PlayerId, Target};
use crate::game::{ChoiceReason, GameStateView, PlayerAction, PlayerController, StepKind};
use crate::zones::ZoneId;
use crate::{MtgError, Result};
use std::collections::VecDeque;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEntry {
    Pass,
    /// Pass until this turn number and step are reached
    WaitUntil { turn: u32, step: StepKind },
    Play { card: String, targets: Vec<String> },
    Activate {
        source: String,
        ability: usize,
        targets: Vec<String>,
    },
}

impl ScriptEntry {
    pub fn wait(turn: u32, step: StepKind) -> Self {
        ScriptEntry::WaitUntil { turn, step }
    }
}

/// Split `"Name>First;Second"` into the name and its target names
fn split_targets(s: &str) -> (String, Vec<String>) {
    match s.split_once('>') {
        None => (s.trim().to_string(), Vec::new()),
        Some((name, targets)) => (
            name.trim().to_string(),
            targets
                .split(';')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        ),
    }
}

impl FromStr for ScriptEntry {
    type Err = MtgError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || MtgError::InvalidDecision(format!("bad script entry: {s:?}"));
        let s = s.trim();
        let (command, rest) = s.split_once(' ').unwrap_or((s, ""));
        match command {
            "pass" => Ok(ScriptEntry::Pass),
            "wait" => {
                let (turn, step) = rest.trim().split_once(' ').ok_or_else(bad)?;
                Ok(ScriptEntry::WaitUntil {
                    turn: turn.parse().map_err(|_| bad())?,
                    step: StepKind::parse(step).ok_or_else(bad)?,
                })
            }
            "p" => {
                let (card, targets) = split_targets(rest);
                if card.is_empty() {
                    return Err(bad());
                }
                Ok(ScriptEntry::Play { card, targets })
            }
            "a" => {
                let (source, targets) = split_targets(rest);
                let (source, ability) = match source.rsplit_once('.') {
                    Some((name, index)) if index.parse::<usize>().is_ok() => {
                        (name.to_string(), index.parse().map_err(|_| bad())?)
                    }
                    _ => (source, 0),
                };
                if source.is_empty() {
                    return Err(bad());
                }
                Ok(ScriptEntry::Activate {
                    source,
                    ability,
                    targets,
                })
            }
            _ => Err(bad()),
        }
    }
}

/// A controller that follows a predetermined sequence of entries
pub struct ScriptedController {
    player_id: PlayerId,
    entries: VecDeque<ScriptEntry>,
    wait: Option<(u32, StepKind)>,
    pending_targets: VecDeque<String>,
}

impl ScriptedController {
    pub fn new(player_id: PlayerId, entries: impl IntoIterator<Item = ScriptEntry>) -> Self {
        ScriptedController {
            player_id,
            entries: entries.into_iter().collect(),
            wait: None,
            pending_targets: VecDeque::new(),
        }
    }

    /// Parse one entry per line
    pub fn from_lines<S: AsRef<str>>(
        player_id: PlayerId,
        lines: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let entries = lines
            .into_iter()
            .map(|line| line.as_ref().parse())
            .collect::<Result<Vec<ScriptEntry>>>()?;
        Ok(Self::new(player_id, entries))
    }

    /// Entries not yet used
    pub fn remaining(&self) -> usize {
        self.entries.len()
    }

    fn find_source(&self, view: &GameStateView, name: &str) -> Option<ObjectId> {
        view.battlefield().iter().copied().find(|id| {
            view.object(*id)
                .is_some_and(|o| o.name() == name && o.controller == self.player_id)
        })
    }

    fn target_name(view: &GameStateView, target: Target) -> Option<String> {
        match target {
            Target::Object(id) => view.name(id).map(str::to_string),
            Target::Player(p) => view
                .game()
                .player(p)
                .ok()
                .map(|player| player.name.as_str().to_string()),
        }
    }
}

impl PlayerController for ScriptedController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_action(
        &mut self,
        view: &GameStateView,
        _available_actions: &[PlayerAction],
    ) -> Option<PlayerAction> {
        if let Some((turn, step)) = self.wait {
            if view.turn_number() != turn || view.step_kind() != step {
                return None;
            }
            self.wait = None;
        }

        match self.entries.pop_front()? {
            ScriptEntry::Pass => None,
            ScriptEntry::WaitUntil { turn, step } => {
                self.wait = Some((turn, step));
                None
            }
            ScriptEntry::Play { card, targets } => {
                self.pending_targets = targets.into();
                view.find_named(ZoneId::Hand(self.player_id), &card)
                    .map(PlayerAction::PlayCard)
            }
            ScriptEntry::Activate {
                source,
                ability,
                targets,
            } => {
                self.pending_targets = targets.into();
                self.find_source(view, &source)
                    .map(|id| PlayerAction::ActivateAbility(AbilityRef::new(id, ability)))
            }
        }
    }

    fn choose_objects(
        &mut self,
        view: &GameStateView,
        candidates: &[Target],
        _reason: &ChoiceReason,
        bounds: ChoiceBounds,
    ) -> Option<Vec<Target>> {
        if self.pending_targets.is_empty() {
            return None;
        }
        let count = bounds.max().min(self.pending_targets.len());
        let mut chosen = Vec::with_capacity(count);
        for name in self.pending_targets.drain(..count) {
            let found = candidates.iter().copied().find(|t| {
                !chosen.contains(t) && Self::target_name(view, *t).as_deref() == Some(name.as_str())
            });
            if let Some(target) = found {
                chosen.push(target);
            }
        }
        Some(chosen)
    }
}
