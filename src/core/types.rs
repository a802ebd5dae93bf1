//! Strongly-typed wrappers for rules concepts
//!
//! Names, subtypes and counter kinds are all strings underneath, but they are
//! wrapped in distinct types so they cannot be mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Card type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardType {
    Artifact,
    Creature,
    Enchantment,
    Instant,
    Land,
    Planeswalker,
    Sorcery,
    /// Marker type carried by ability objects on the stack
    Ability,
}

impl CardType {
    /// Types whose objects resolve onto the battlefield
    pub fn is_permanent(self) -> bool {
        matches!(
            self,
            CardType::Artifact
                | CardType::Creature
                | CardType::Enchantment
                | CardType::Land
                | CardType::Planeswalker
        )
    }
}

impl FromStr for CardType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "artifact" => Ok(CardType::Artifact),
            "creature" => Ok(CardType::Creature),
            "enchantment" => Ok(CardType::Enchantment),
            "instant" => Ok(CardType::Instant),
            "land" => Ok(CardType::Land),
            "planeswalker" => Ok(CardType::Planeswalker),
            "sorcery" => Ok(CardType::Sorcery),
            "ability" => Ok(CardType::Ability),
            other => Err(format!("unknown card type '{other}'")),
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CardType::Artifact => "Artifact",
            CardType::Creature => "Creature",
            CardType::Enchantment => "Enchantment",
            CardType::Instant => "Instant",
            CardType::Land => "Land",
            CardType::Planeswalker => "Planeswalker",
            CardType::Sorcery => "Sorcery",
            CardType::Ability => "Ability",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Supertype {
    Basic,
    Legendary,
    Snow,
    World,
}

/// Keyword abilities the engine knows how to apply
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Deathtouch,
    DoubleStrike,
    FirstStrike,
    Flash,
    Flying,
    Haste,
    Infect,
    Lifelink,
    Reach,
    Trample,
    Vigilance,
    Wither,
    /// Keyword with no engine support; kept so it still shows up in `has_keyword`
    Other(String),
}

impl Keyword {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "deathtouch" => Keyword::Deathtouch,
            "double strike" => Keyword::DoubleStrike,
            "first strike" => Keyword::FirstStrike,
            "flash" => Keyword::Flash,
            "flying" => Keyword::Flying,
            "haste" => Keyword::Haste,
            "infect" => Keyword::Infect,
            "lifelink" => Keyword::Lifelink,
            "reach" => Keyword::Reach,
            "trample" => Keyword::Trample,
            "vigilance" => Keyword::Vigilance,
            "wither" => Keyword::Wither,
            other => Keyword::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keyword::Deathtouch => write!(f, "deathtouch"),
            Keyword::DoubleStrike => write!(f, "double strike"),
            Keyword::FirstStrike => write!(f, "first strike"),
            Keyword::Flash => write!(f, "flash"),
            Keyword::Flying => write!(f, "flying"),
            Keyword::Haste => write!(f, "haste"),
            Keyword::Infect => write!(f, "infect"),
            Keyword::Lifelink => write!(f, "lifelink"),
            Keyword::Reach => write!(f, "reach"),
            Keyword::Trample => write!(f, "trample"),
            Keyword::Vigilance => write!(f, "vigilance"),
            Keyword::Wither => write!(f, "wither"),
            Keyword::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Subtype (creature type, land type, ...), stored lowercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subtype(String);

impl Subtype {
    pub fn new(s: impl AsRef<str>) -> Self {
        Subtype(s.as_ref().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Capitalized form used in generated token names
    pub fn title(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Subtype {
    fn from(s: &str) -> Self {
        Subtype::new(s)
    }
}

/// Counter kind (e.g. "+1/+1", "-1/-1", "poison", "loyalty")
///
/// Kinds spelled `<sign><n>/<sign><n>` modify power and toughness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CounterType(String);

impl CounterType {
    pub fn new(s: impl Into<String>) -> Self {
        CounterType(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn plus_one_plus_one() -> Self {
        CounterType("+1/+1".to_string())
    }

    pub fn minus_one_minus_one() -> Self {
        CounterType("-1/-1".to_string())
    }

    pub fn loyalty() -> Self {
        CounterType("loyalty".to_string())
    }

    pub fn poison() -> Self {
        CounterType("poison".to_string())
    }

    /// Power/toughness delta of one counter of this kind, if it is a P/T kind
    pub fn pt_modifier(&self) -> Option<(i32, i32)> {
        let (p, t) = self.0.split_once('/')?;
        Some((parse_signed(p)?, parse_signed(t)?))
    }
}

fn parse_signed(s: &str) -> Option<i32> {
    let digits = s.strip_prefix('+').or_else(|| s.strip_prefix('-'))?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for CounterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CounterType {
    fn from(s: &str) -> Self {
        CounterType(s.to_string())
    }
}

/// Card name (distinct from other string types)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardName(String);

impl CardName {
    pub fn new(s: impl Into<String>) -> Self {
        CardName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CardName {
    fn from(s: &str) -> Self {
        CardName(s.to_string())
    }
}

impl From<String> for CardName {
    fn from(s: String) -> Self {
        CardName(s)
    }
}

/// Player name (distinct from other string types)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(s: impl Into<String>) -> Self {
        PlayerName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pt_counter_modifiers() {
        assert_eq!(CounterType::plus_one_plus_one().pt_modifier(), Some((1, 1)));
        assert_eq!(CounterType::minus_one_minus_one().pt_modifier(), Some((-1, -1)));
        assert_eq!(CounterType::new("+2/-0").pt_modifier(), Some((2, 0)));
        assert_eq!(CounterType::new("+10/+3").pt_modifier(), Some((10, 3)));
    }

    #[test]
    fn test_non_pt_counters() {
        assert_eq!(CounterType::loyalty().pt_modifier(), None);
        assert_eq!(CounterType::new("1/1").pt_modifier(), None);
        assert_eq!(CounterType::new("+1/").pt_modifier(), None);
        assert_eq!(CounterType::new("+a/+1").pt_modifier(), None);
    }

    #[test]
    fn test_subtype_is_lowercased() {
        let subtype = Subtype::new("Goblin");
        assert_eq!(subtype.as_str(), "goblin");
        assert_eq!(subtype.title(), "Goblin");
    }

    #[test]
    fn test_card_type_parsing() {
        assert_eq!("Creature".parse::<CardType>().unwrap(), CardType::Creature);
        assert!("tribal".parse::<CardType>().is_err());
        assert!(CardType::Land.is_permanent());
        assert!(!CardType::Instant.is_permanent());
    }

    #[test]
    fn test_keyword_parsing() {
        assert_eq!(Keyword::parse("First Strike"), Keyword::FirstStrike);
        assert_eq!(Keyword::parse("banding"), Keyword::Other("banding".to_string()));
    }
}
