//! Sample card definitions
//!
//! A small, hand-written card pool used by the demo binary, the benchmark and
//! the tests. Each function returns a fresh template; templates are never
//! bound to a game object themselves (the game copies them).

use crate::core::{
    Ability, CardType, Characteristics, Color, Cost, CounterType, Effect, Keyword, Supertype,
};

fn basic_land(name: &str, subtype: Option<&str>, color: Color) -> Characteristics {
    Characteristics::builder()
        .name(name)
        .supertypes([Supertype::Basic])
        .types([CardType::Land])
        .subtypes(subtype)
        .ability(Ability::mana(Cost::Tap, color, 1))
        .build()
}

pub fn plains() -> Characteristics {
    basic_land("Plains", Some("Plains"), Color::White)
}

pub fn island() -> Characteristics {
    basic_land("Island", Some("Island"), Color::Blue)
}

pub fn swamp() -> Characteristics {
    basic_land("Swamp", Some("Swamp"), Color::Black)
}

pub fn mountain() -> Characteristics {
    basic_land("Mountain", Some("Mountain"), Color::Red)
}

pub fn forest() -> Characteristics {
    basic_land("Forest", Some("Forest"), Color::Green)
}

pub fn wastes() -> Characteristics {
    basic_land("Wastes", None, Color::Colorless)
}

fn creature(name: &str, cost: &str, subtypes: &[&str], power: i32, toughness: i32) -> Characteristics {
    Characteristics::builder()
        .name(name)
        .mana_cost(cost)
        .types([CardType::Creature])
        .subtypes(subtypes.iter().copied())
        .power_toughness(power, toughness)
        .build()
}

pub fn memnite() -> Characteristics {
    Characteristics::builder()
        .name("Memnite")
        .mana_cost("0")
        .types([CardType::Artifact, CardType::Creature])
        .subtypes(["Construct"])
        .power_toughness(1, 1)
        .build()
}

pub fn grizzly_bears() -> Characteristics {
    creature("Grizzly Bears", "1G", &["Bear"], 2, 2)
}

pub fn craw_wurm() -> Characteristics {
    creature("Craw Wurm", "4GG", &["Wurm"], 6, 4)
}

pub fn colossal_dreadmaw() -> Characteristics {
    Characteristics::builder()
        .name("Colossal Dreadmaw")
        .mana_cost("4GG")
        .types([CardType::Creature])
        .subtypes(["Dinosaur"])
        .power_toughness(6, 6)
        .keyword(Keyword::Trample)
        .build()
}

/// {1}, {T}: Put a +1/+1 counter on Chronomaton.
pub fn chronomaton() -> Characteristics {
    Characteristics::builder()
        .name("Chronomaton")
        .mana_cost("1")
        .types([CardType::Artifact, CardType::Creature])
        .subtypes(["Golem"])
        .power_toughness(1, 1)
        .ability(Ability::activated(
            Cost::mana("1") + Cost::Tap,
            Effect::PutCounters {
                counter: CounterType::plus_one_plus_one(),
                amount: 1,
            },
        ))
        .build()
}

/// {T}: Prodigal Sorcerer deals 1 damage to any target.
pub fn prodigal_sorcerer() -> Characteristics {
    Characteristics::builder()
        .name("Prodigal Sorcerer")
        .mana_cost("2U")
        .types([CardType::Creature])
        .subtypes(["Human", "Wizard"])
        .power_toughness(1, 1)
        .ability(Ability::activated(Cost::Tap, Effect::damage(1)))
        .build()
}

pub fn typhoid_rats() -> Characteristics {
    Characteristics::builder()
        .name("Typhoid Rats")
        .mana_cost("B")
        .types([CardType::Creature])
        .subtypes(["Rat"])
        .power_toughness(1, 1)
        .keyword(Keyword::Deathtouch)
        .build()
}

pub fn raging_goblin() -> Characteristics {
    Characteristics::builder()
        .name("Raging Goblin")
        .mana_cost("R")
        .types([CardType::Creature])
        .subtypes(["Goblin", "Berserker"])
        .power_toughness(1, 1)
        .keyword(Keyword::Haste)
        .build()
}

pub fn serra_angel() -> Characteristics {
    Characteristics::builder()
        .name("Serra Angel")
        .mana_cost("3WW")
        .types([CardType::Creature])
        .subtypes(["Angel"])
        .power_toughness(4, 4)
        .keyword(Keyword::Flying)
        .keyword(Keyword::Vigilance)
        .build()
}

pub fn vampire_nighthawk() -> Characteristics {
    Characteristics::builder()
        .name("Vampire Nighthawk")
        .mana_cost("1BB")
        .types([CardType::Creature])
        .subtypes(["Vampire", "Shaman"])
        .power_toughness(2, 3)
        .keyword(Keyword::Flying)
        .keyword(Keyword::Deathtouch)
        .keyword(Keyword::Lifelink)
        .build()
}

pub fn glistener_elf() -> Characteristics {
    Characteristics::builder()
        .name("Glistener Elf")
        .mana_cost("G")
        .types([CardType::Creature])
        .subtypes(["Phyrexian", "Elf", "Warrior"])
        .power_toughness(1, 1)
        .keyword(Keyword::Infect)
        .build()
}

pub fn white_knight() -> Characteristics {
    Characteristics::builder()
        .name("White Knight")
        .mana_cost("WW")
        .types([CardType::Creature])
        .subtypes(["Human", "Knight"])
        .power_toughness(2, 2)
        .keyword(Keyword::FirstStrike)
        .build()
}

/// 1/1 white Soldier creature token
pub fn soldier_token() -> Characteristics {
    Characteristics::builder()
        .types([CardType::Creature])
        .subtypes(["Soldier"])
        .colors([Color::White])
        .power_toughness(1, 1)
        .build()
}

/// {T}, Sacrifice Black Lotus: Add three mana of any one color.
///
/// Modeled as one ability per color, in WUBRG order.
pub fn black_lotus() -> Characteristics {
    let mut builder = Characteristics::builder()
        .name("Black Lotus")
        .mana_cost("0")
        .types([CardType::Artifact]);
    for color in [Color::White, Color::Blue, Color::Black, Color::Red, Color::Green] {
        builder = builder.ability(Ability::mana(Cost::Tap + Cost::SacrificeSelf, color, 3));
    }
    builder.build()
}

pub fn lightning_bolt() -> Characteristics {
    Characteristics::builder()
        .name("Lightning Bolt")
        .mana_cost("R")
        .types([CardType::Instant])
        .ability(Ability::spell(Effect::damage(3)))
        .build()
}

/// Zap deals 1 damage to any target. Draw a card.
pub fn zap() -> Characteristics {
    Characteristics::builder()
        .name("Zap")
        .mana_cost("2R")
        .types([CardType::Instant])
        .ability(Ability::spell(Effect::DealDamage {
            amount: 1,
            then_draw: 1,
        }))
        .build()
}

pub fn reclaim() -> Characteristics {
    Characteristics::builder()
        .name("Reclaim")
        .mana_cost("G")
        .types([CardType::Instant])
        .ability(Ability::spell(Effect::ReturnToLibrary))
        .build()
}

pub fn divination() -> Characteristics {
    Characteristics::builder()
        .name("Divination")
        .mana_cost("2U")
        .types([CardType::Sorcery])
        .ability(Ability::spell(Effect::DrawCards { count: 2 }))
        .build()
}

pub fn healing_salve() -> Characteristics {
    Characteristics::builder()
        .name("Healing Salve")
        .mana_cost("W")
        .types([CardType::Instant])
        .ability(Ability::spell(Effect::GainLife { amount: 3 }))
        .build()
}

/// +2: Each player draws a card. -1: Target player draws a card.
pub fn jace_beleren() -> Characteristics {
    Characteristics::builder()
        .name("Jace Beleren")
        .mana_cost("1UU")
        .supertypes([Supertype::Legendary])
        .types([CardType::Planeswalker])
        .subtypes(["Jace"])
        .loyalty(3)
        .ability(Ability::loyalty(2, Effect::EachPlayerDraws { count: 1 }))
        .ability(Ability::loyalty(-1, Effect::TargetPlayerDraws { count: 1 }))
        .build()
}

fn copies(count: usize, card: fn() -> Characteristics) -> impl Iterator<Item = Characteristics> {
    std::iter::repeat_with(card).take(count)
}

/// 40-card green creature deck
pub fn green_deck() -> Vec<Characteristics> {
    copies(17, forest)
        .chain(copies(4, glistener_elf))
        .chain(copies(8, grizzly_bears))
        .chain(copies(4, craw_wurm))
        .chain(copies(3, colossal_dreadmaw))
        .chain(copies(4, reclaim))
        .collect()
}

/// 40-card red burn deck
pub fn red_deck() -> Vec<Characteristics> {
    copies(17, mountain)
        .chain(copies(4, memnite))
        .chain(copies(8, raging_goblin))
        .chain(copies(4, chronomaton))
        .chain(copies(4, lightning_bolt))
        .chain(copies(3, zap))
        .collect()
}

/// 40-card white and blue deck
pub fn azorius_deck() -> Vec<Characteristics> {
    copies(8, plains)
        .chain(copies(9, island))
        .chain(copies(6, white_knight))
        .chain(copies(4, serra_angel))
        .chain(copies(4, prodigal_sorcerer))
        .chain(copies(3, divination))
        .chain(copies(4, healing_salve))
        .chain(copies(2, jace_beleren))
        .collect()
}

pub const DECK_NAMES: [&str; 3] = ["green", "red", "azorius"];

pub fn deck_by_name(name: &str) -> Option<Vec<Characteristics>> {
    match name.to_ascii_lowercase().as_str() {
        "green" => Some(green_deck()),
        "red" => Some(red_deck()),
        "azorius" => Some(azorius_deck()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decks_have_forty_cards() {
        for name in DECK_NAMES {
            assert_eq!(deck_by_name(name).unwrap().len(), 40, "{name}");
        }
        assert!(deck_by_name("purple").is_none());
    }

    #[test]
    fn test_black_lotus_abilities_in_wubrg_order() {
        let lotus = black_lotus();
        assert_eq!(lotus.abilities().len(), 5);
        assert_eq!(lotus.ability(3).unwrap().to_string(), "T, Sacrifice: Add RRR");
    }

    #[test]
    fn test_token_is_named_after_subtypes() {
        let token = soldier_token();
        assert_eq!(token.name().as_str(), "Soldier Token");
        assert_eq!(token.colors(), &[Color::White]);
    }

    #[test]
    fn test_spell_text() {
        assert_eq!(
            zap().ability(0).unwrap().to_string(),
            "Deal 1 damage to any target. Draw 1 card(s)"
        );
        assert_eq!(
            jace_beleren().ability(1).unwrap().to_string(),
            "-1: Target player draws 1 card(s)"
        );
    }
}
