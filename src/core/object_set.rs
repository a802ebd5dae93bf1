//! Dynamic sets of players and objects
//!
//! An [`ObjectSet`] is a query, not a snapshot: membership is evaluated
//! against the game state each time it is asked.

use crate::core::{CardType, Keyword, PlayerId, Subtype, Target};
use crate::error::{ChoiceResult, NoLegalChoice};
use crate::game::{ChoiceReason, GameState, GameStateView, PlayerController};
use crate::zones::ZoneId;
use crate::MtgError;
use std::fmt;
use std::sync::Arc;

/// Extension point for sets with no built-in variant
pub trait ObjectPredicate: fmt::Debug + Send + Sync {
    fn contains(&self, game: &GameState, target: Target) -> bool;

    fn members(&self, game: &GameState) -> Vec<Target> {
        ObjectSet::All
            .members(game)
            .into_iter()
            .filter(|t| self.contains(game, *t))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    ControlledBy(PlayerId),
    NotControlledBy(PlayerId),
    WithType(CardType),
    WithoutType(CardType),
    WithSubtype(Subtype),
    WithoutSubtype(Subtype),
    WithKeyword(Keyword),
    WithoutKeyword(Keyword),
    OtherThan(Target),
    Tapped,
    Untapped,
}

impl Filter {
    fn matches(&self, game: &GameState, target: Target) -> bool {
        let object = match target {
            Target::Object(id) => game.objects.get(id).ok(),
            Target::Player(_) => None,
        };
        match self {
            Filter::ControlledBy(p) => game.controller_of(target) == Some(*p),
            Filter::NotControlledBy(p) => game.controller_of(target) != Some(*p),
            Filter::WithType(t) => object.is_some_and(|o| o.has_type(*t)),
            Filter::WithoutType(t) => !object.is_some_and(|o| o.has_type(*t)),
            Filter::WithSubtype(s) => object.is_some_and(|o| o.base().has_subtype(s)),
            Filter::WithoutSubtype(s) => !object.is_some_and(|o| o.base().has_subtype(s)),
            Filter::WithKeyword(k) => object.is_some_and(|o| o.has_keyword(k)),
            Filter::WithoutKeyword(k) => !object.is_some_and(|o| o.has_keyword(k)),
            Filter::OtherThan(other) => target != *other,
            Filter::Tapped => object.is_some_and(|o| o.permanent.as_ref().is_some_and(|p| p.tapped)),
            Filter::Untapped => {
                object.is_some_and(|o| o.permanent.as_ref().is_some_and(|p| !p.tapped))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum ObjectSet {
    /// Every live object and every player still in the game
    All,
    Zone(ZoneId),
    Players,
    /// Cards in their owner's graveyard
    GraveyardCards,
    Filtered(Box<ObjectSet>, Filter),
    Union(Box<ObjectSet>, Box<ObjectSet>),
    Intersection(Box<ObjectSet>, Box<ObjectSet>),
    Custom(Arc<dyn ObjectPredicate>),
}

impl ObjectSet {
    pub fn permanents() -> ObjectSet {
        ObjectSet::Zone(ZoneId::Battlefield)
    }

    pub fn creatures() -> ObjectSet {
        ObjectSet::permanents().with_type(CardType::Creature)
    }

    pub fn nonland_permanents() -> ObjectSet {
        ObjectSet::permanents().without_type(CardType::Land)
    }

    /// Players, creatures and planeswalkers
    pub fn damageable() -> ObjectSet {
        ObjectSet::Players
            .or(ObjectSet::creatures())
            .or(ObjectSet::permanents().with_type(CardType::Planeswalker))
    }

    pub fn opponents_of(player: PlayerId) -> ObjectSet {
        ObjectSet::Players.other_than(Target::Player(player))
    }

    pub fn filter(self, filter: Filter) -> ObjectSet {
        ObjectSet::Filtered(Box::new(self), filter)
    }

    pub fn controlled_by(self, player: PlayerId) -> ObjectSet {
        self.filter(Filter::ControlledBy(player))
    }

    pub fn not_controlled_by(self, player: PlayerId) -> ObjectSet {
        self.filter(Filter::NotControlledBy(player))
    }

    pub fn with_type(self, card_type: CardType) -> ObjectSet {
        self.filter(Filter::WithType(card_type))
    }

    pub fn without_type(self, card_type: CardType) -> ObjectSet {
        self.filter(Filter::WithoutType(card_type))
    }

    pub fn with_subtype(self, subtype: &str) -> ObjectSet {
        self.filter(Filter::WithSubtype(Subtype::new(subtype)))
    }

    pub fn with_keyword(self, keyword: Keyword) -> ObjectSet {
        self.filter(Filter::WithKeyword(keyword))
    }

    pub fn without_keyword(self, keyword: Keyword) -> ObjectSet {
        self.filter(Filter::WithoutKeyword(keyword))
    }

    pub fn other_than(self, target: Target) -> ObjectSet {
        self.filter(Filter::OtherThan(target))
    }

    pub fn tapped(self) -> ObjectSet {
        self.filter(Filter::Tapped)
    }

    pub fn untapped(self) -> ObjectSet {
        self.filter(Filter::Untapped)
    }

    pub fn or(self, other: ObjectSet) -> ObjectSet {
        ObjectSet::Union(Box::new(self), Box::new(other))
    }

    pub fn and(self, other: ObjectSet) -> ObjectSet {
        ObjectSet::Intersection(Box::new(self), Box::new(other))
    }

    pub fn contains(&self, game: &GameState, target: Target) -> bool {
        match self {
            ObjectSet::All => match target {
                Target::Player(p) => game.is_in_game(p),
                Target::Object(id) => game.objects.is_alive(id),
            },
            ObjectSet::Zone(zone) => match target {
                Target::Object(id) => game.objects.get(id).is_ok_and(|o| o.zone == *zone),
                Target::Player(_) => false,
            },
            ObjectSet::Players => matches!(target, Target::Player(p) if game.is_in_game(p)),
            ObjectSet::GraveyardCards => match target {
                Target::Object(id) => game
                    .objects
                    .get(id)
                    .is_ok_and(|o| o.zone == ZoneId::Graveyard(o.owner)),
                Target::Player(_) => false,
            },
            ObjectSet::Filtered(base, filter) => {
                base.contains(game, target) && filter.matches(game, target)
            }
            ObjectSet::Union(a, b) => a.contains(game, target) || b.contains(game, target),
            ObjectSet::Intersection(a, b) => a.contains(game, target) && b.contains(game, target),
            ObjectSet::Custom(pred) => pred.contains(game, target),
        }
    }

    /// Current members in a deterministic order
    pub fn members(&self, game: &GameState) -> Vec<Target> {
        match self {
            ObjectSet::All => {
                let mut all: Vec<Target> = game.players_in_game().map(Target::Player).collect();
                for zone in game.zones.all() {
                    all.extend(zone.iter().map(Target::Object));
                }
                all
            }
            ObjectSet::Zone(zone) => game
                .zones
                .get(*zone)
                .map(|z| z.iter().map(Target::Object).collect())
                .unwrap_or_default(),
            ObjectSet::Players => game.players_in_game().map(Target::Player).collect(),
            ObjectSet::GraveyardCards => game
                .zones
                .players
                .iter()
                .flat_map(|pz| pz.graveyard.iter().map(Target::Object))
                .collect(),
            ObjectSet::Filtered(base, filter) => base
                .members(game)
                .into_iter()
                .filter(|t| filter.matches(game, *t))
                .collect(),
            ObjectSet::Union(a, b) => {
                let mut members = a.members(game);
                for t in b.members(game) {
                    if !members.contains(&t) {
                        members.push(t);
                    }
                }
                members
            }
            ObjectSet::Intersection(a, b) => a
                .members(game)
                .into_iter()
                .filter(|t| b.contains(game, *t))
                .collect(),
            ObjectSet::Custom(pred) => pred.members(game),
        }
    }

    /// Ask `chooser` to pick members of this set
    pub fn choose(
        &self,
        game: &GameState,
        chooser: &mut dyn PlayerController,
        reason: &ChoiceReason,
        bounds: ChoiceBounds,
    ) -> ChoiceResult<Vec<Target>> {
        choose_from(game, chooser, self.members(game), reason, bounds)
    }
}

/// Count limits for a choice. `max: None` means exactly `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceBounds {
    pub min: usize,
    pub max: Option<usize>,
    pub order_matters: bool,
}

impl ChoiceBounds {
    pub fn exactly(n: usize) -> Self {
        ChoiceBounds {
            min: n,
            max: None,
            order_matters: false,
        }
    }

    pub fn up_to(max: usize) -> Self {
        ChoiceBounds {
            min: 0,
            max: Some(max),
            order_matters: false,
        }
    }

    pub fn max(&self) -> usize {
        self.max.unwrap_or(self.min).max(self.min)
    }
}

/// Choose among `candidates`, skipping the chooser when only one answer is possible
///
/// Fails with [`NoLegalChoice`] when there are fewer candidates than the minimum.
/// A `None` answer takes the first `min` candidates.
pub fn choose_from(
    game: &GameState,
    chooser: &mut dyn PlayerController,
    candidates: Vec<Target>,
    reason: &ChoiceReason,
    bounds: ChoiceBounds,
) -> ChoiceResult<Vec<Target>> {
    let min = bounds.min;
    let max = bounds.max();
    if min > candidates.len() {
        return Err(NoLegalChoice::new(format!(
            "need {} of {} candidates for {:?}",
            min,
            candidates.len(),
            reason
        ))
        .into());
    }
    if min == candidates.len() && (min == 1 || !bounds.order_matters) {
        return Ok(candidates);
    }

    let view = GameStateView::new(game, chooser.player_id());
    let Some(chosen) = chooser.choose_objects(&view, &candidates, reason, bounds) else {
        return Ok(candidates.into_iter().take(min).collect());
    };

    let mut seen = Vec::with_capacity(chosen.len());
    for t in &chosen {
        if !candidates.contains(t) || seen.contains(t) {
            return Err(MtgError::InvalidDecision(format!(
                "{t} is not an available choice for {reason:?}"
            ))
            .into());
        }
        seen.push(*t);
    }
    if chosen.len() < min || chosen.len() > max {
        return Err(MtgError::InvalidDecision(format!(
            "chose {} objects, expected {}..={}",
            chosen.len(),
            min,
            max
        ))
        .into());
    }
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::core::{AbilityRef, ObjectId};
    use crate::error::ChoiceError;
    use crate::game::PlayerAction;

    /// Answers every choice with a fixed pick and counts how often it was asked
    struct Picker {
        answer: Option<Vec<Target>>,
        asked: usize,
    }

    impl Picker {
        fn answering(answer: Option<Vec<Target>>) -> Self {
            Picker { answer, asked: 0 }
        }
    }

    impl PlayerController for Picker {
        fn player_id(&self) -> PlayerId {
            PlayerId::new(0)
        }

        fn choose_action(&mut self, _view: &GameStateView, _actions: &[PlayerAction]) -> Option<PlayerAction> {
            None
        }

        fn choose_objects(
            &mut self,
            _view: &GameStateView,
            _candidates: &[Target],
            _reason: &ChoiceReason,
            _bounds: ChoiceBounds,
        ) -> Option<Vec<Target>> {
            self.asked += 1;
            self.answer.clone()
        }
    }

    fn reason() -> ChoiceReason {
        ChoiceReason::Target(AbilityRef::new(ObjectId::new(0), 0))
    }

    fn board() -> (GameState, Vec<Target>) {
        let mut game = GameState::new_two_player("A", "B");
        let cards = [
            (catalog::grizzly_bears(), 0),
            (catalog::forest(), 0),
            (catalog::craw_wurm(), 1),
        ];
        let targets = cards
            .into_iter()
            .map(|(card, owner)| {
                let id = game
                    .create_card(&card, ZoneId::Battlefield, PlayerId::new(owner))
                    .unwrap();
                Target::Object(id)
            })
            .collect();
        (game, targets)
    }

    fn choose(
        game: &GameState,
        picker: &mut Picker,
        candidates: &[Target],
        bounds: ChoiceBounds,
    ) -> ChoiceResult<Vec<Target>> {
        choose_from(game, picker, candidates.to_vec(), &reason(), bounds)
    }

    fn is_invalid(result: ChoiceResult<Vec<Target>>) -> bool {
        matches!(result, Err(ChoiceError::Fault(MtgError::InvalidDecision(_))))
    }

    #[test]
    fn test_too_few_candidates_is_no_legal_choice() {
        let (game, targets) = board();
        let mut picker = Picker::answering(None);

        let result = choose(&game, &mut picker, &targets[..1], ChoiceBounds::exactly(2));
        assert!(matches!(result, Err(ChoiceError::NoLegalChoice(_))));
        let result = choose(&game, &mut picker, &[], ChoiceBounds::exactly(1));
        assert!(matches!(result, Err(ChoiceError::NoLegalChoice(_))));
        assert_eq!(picker.asked, 0);
    }

    #[test]
    fn test_forced_choices_skip_the_chooser() {
        let (game, targets) = board();
        let mut picker = Picker::answering(Some(vec![]));

        assert_eq!(
            choose(&game, &mut picker, &targets[..1], ChoiceBounds::exactly(1)),
            Ok(targets[..1].to_vec())
        );
        assert_eq!(
            choose(&game, &mut picker, &targets, ChoiceBounds::exactly(3)),
            Ok(targets.clone())
        );
        let single_ordered = ChoiceBounds {
            order_matters: true,
            ..ChoiceBounds::exactly(1)
        };
        assert_eq!(
            choose(&game, &mut picker, &targets[1..2], single_ordered),
            Ok(targets[1..2].to_vec())
        );
        assert_eq!(picker.asked, 0);
    }

    #[test]
    fn test_ordering_all_candidates_asks_the_chooser() {
        let (game, targets) = board();
        let reversed: Vec<Target> = targets.iter().rev().copied().collect();
        let mut picker = Picker::answering(Some(reversed.clone()));
        let bounds = ChoiceBounds {
            order_matters: true,
            ..ChoiceBounds::exactly(3)
        };

        assert_eq!(choose(&game, &mut picker, &targets, bounds), Ok(reversed));
        assert_eq!(picker.asked, 1);
    }

    #[test]
    fn test_no_answer_takes_the_first_candidates() {
        let (game, targets) = board();
        let mut picker = Picker::answering(None);

        assert_eq!(
            choose(&game, &mut picker, &targets, ChoiceBounds::exactly(2)),
            Ok(targets[..2].to_vec())
        );
        assert_eq!(
            choose(&game, &mut picker, &targets, ChoiceBounds::up_to(2)),
            Ok(vec![])
        );
        assert_eq!(picker.asked, 2);
    }

    #[test]
    fn test_chooser_answer_is_used() {
        let (game, targets) = board();
        let mut picker = Picker::answering(Some(vec![targets[2]]));

        assert_eq!(
            choose(&game, &mut picker, &targets, ChoiceBounds::up_to(2)),
            Ok(vec![targets[2]])
        );
    }

    #[test]
    fn test_bad_answers_are_invalid_decisions() {
        let (game, targets) = board();
        let outsider = Target::Player(PlayerId::new(1));

        let mut duplicate = Picker::answering(Some(vec![targets[0], targets[0]]));
        assert!(is_invalid(choose(&game, &mut duplicate, &targets, ChoiceBounds::up_to(2))));

        let mut stranger = Picker::answering(Some(vec![outsider]));
        assert!(is_invalid(choose(&game, &mut stranger, &targets, ChoiceBounds::exactly(1))));

        let mut too_many = Picker::answering(Some(targets.clone()));
        assert!(is_invalid(choose(&game, &mut too_many, &targets, ChoiceBounds::up_to(2))));

        let mut too_few = Picker::answering(Some(vec![targets[0]]));
        assert!(is_invalid(choose(&game, &mut too_few, &targets, ChoiceBounds::exactly(2))));
    }

    #[test]
    fn test_filtered_membership() {
        let (mut game, targets) = board();
        let (bears, forest, wurm) = (targets[0], targets[1], targets[2]);
        let alice = PlayerId::new(0);

        let mine = ObjectSet::permanents().controlled_by(alice);
        assert_eq!(mine.members(&game), vec![bears, forest]);
        assert!(!mine.contains(&game, wurm));

        let creatures = ObjectSet::creatures();
        assert_eq!(creatures.members(&game), vec![bears, wurm]);
        assert!(!creatures.contains(&game, Target::Player(alice)));

        if let Target::Object(id) = wurm {
            game.objects.get_mut(id).unwrap().permanent.as_mut().unwrap().tapped = true;
        }
        assert_eq!(ObjectSet::creatures().untapped().members(&game), vec![bears]);
        assert_eq!(ObjectSet::creatures().tapped().members(&game), vec![wurm]);
    }

    #[test]
    fn test_union_and_intersection_membership() {
        let (game, targets) = board();
        let (bears, forest, wurm) = (targets[0], targets[1], targets[2]);
        let alice = PlayerId::new(0);
        let bob = PlayerId::new(1);

        let damageable = ObjectSet::damageable();
        assert_eq!(
            damageable.members(&game),
            vec![Target::Player(alice), Target::Player(bob), bears, wurm]
        );
        assert!(!damageable.contains(&game, forest));

        // Overlapping halves list each member once
        let overlap = ObjectSet::creatures().or(ObjectSet::permanents().controlled_by(alice));
        assert_eq!(overlap.members(&game), vec![bears, wurm, forest]);

        let my_creatures = ObjectSet::creatures().and(ObjectSet::permanents().controlled_by(alice));
        assert_eq!(my_creatures.members(&game), vec![bears]);
        assert!(!my_creatures.contains(&game, wurm));
        assert!(!my_creatures.contains(&game, forest));

        assert_eq!(
            ObjectSet::opponents_of(alice).members(&game),
            vec![Target::Player(bob)]
        );
    }
}
