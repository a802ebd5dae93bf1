//! Core game types: objects, characteristics, mana, costs, abilities and targets

pub mod abilities;
pub mod characteristics;
pub mod costs;
pub mod effects;
pub mod mana;
pub mod object;
pub mod object_set;
pub mod player;
pub mod targets;
pub mod types;

pub use abilities::{
    Ability, AbilityContext, AbilityKind, AbilityRef, ActivatedAbility, ActivatedEffect,
    StackEffect,
};
pub use characteristics::{Characteristics, CharacteristicsBuilder, LiveCharacteristics};
pub use costs::{Cost, CostRule, LoyaltyCost};
pub use effects::Effect;
pub use mana::{Color, ManaCost, ManaPool, SpecialMana, SpecialManaRule};
pub use object::{
    Counters, GameObject, ObjectId, ObjectKind, ObjectStore, PermanentState, PlayerId,
};
pub use object_set::{choose_from, ChoiceBounds, Filter, ObjectPredicate, ObjectSet};
pub use player::Player;
pub use targets::{can_target, Choices, Target, TargetSlot, Targets};
pub use types::{CardName, CardType, CounterType, Keyword, PlayerName, Subtype, Supertype};
