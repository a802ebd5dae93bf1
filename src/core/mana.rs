//! Mana costs and mana pools

use crate::core::ObjectId;
use crate::{MtgError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::sync::Arc;

/// Mana colors, plus colorless mana
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
    Colorless,
}

impl Color {
    /// Order in which pool mana is spent on generic costs
    pub const SPEND_ORDER: [Color; 6] = [
        Color::Colorless,
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];

    pub fn from_symbol(c: char) -> Option<Color> {
        match c.to_ascii_uppercase() {
            'W' => Some(Color::White),
            'U' => Some(Color::Blue),
            'B' => Some(Color::Black),
            'R' => Some(Color::Red),
            'G' => Some(Color::Green),
            'C' => Some(Color::Colorless),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "W"),
            Color::Blue => write!(f, "U"),
            Color::Black => write!(f, "B"),
            Color::Red => write!(f, "R"),
            Color::Green => write!(f, "G"),
            Color::Colorless => write!(f, "C"),
        }
    }
}

/// A mana cost (e.g., "2RR" = 2 generic + 2 red)
///
/// The `colorless` field is a requirement for colorless mana specifically ({C}),
/// not generic mana.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaCost {
    pub generic: u32,
    pub white: u32,
    pub blue: u32,
    pub black: u32,
    pub red: u32,
    pub green: u32,
    pub colorless: u32,
}

impl ManaCost {
    pub fn new() -> Self {
        ManaCost::default()
    }

    /// Parse a mana cost string like "2RR" or "1UB"
    ///
    /// Digits form the generic amount, saturating at `u32::MAX`; unknown
    /// characters are ignored.
    pub fn from_string(s: &str) -> Self {
        let mut cost = ManaCost::new();

        for c in s.chars() {
            if let Some(digit) = c.to_digit(10) {
                cost.generic = cost.generic.saturating_mul(10).saturating_add(digit);
            } else if let Some(color) = Color::from_symbol(c) {
                *cost.amount_mut(color) += 1;
            }
        }

        cost
    }

    pub fn generic(amount: u32) -> Self {
        ManaCost {
            generic: amount,
            ..ManaCost::default()
        }
    }

    /// Required amount of one specific kind of mana
    pub fn amount(&self, color: Color) -> u32 {
        match color {
            Color::White => self.white,
            Color::Blue => self.blue,
            Color::Black => self.black,
            Color::Red => self.red,
            Color::Green => self.green,
            Color::Colorless => self.colorless,
        }
    }

    fn amount_mut(&mut self, color: Color) -> &mut u32 {
        match color {
            Color::White => &mut self.white,
            Color::Blue => &mut self.blue,
            Color::Black => &mut self.black,
            Color::Red => &mut self.red,
            Color::Green => &mut self.green,
            Color::Colorless => &mut self.colorless,
        }
    }

    /// Total mana value, generic included
    pub fn mana_value(&self) -> u32 {
        Color::SPEND_ORDER
            .iter()
            .fold(self.generic, |total, c| total.saturating_add(self.amount(*c)))
    }

    /// The real colors (WUBRG) this cost requires
    pub fn colors(&self) -> Vec<Color> {
        [Color::White, Color::Blue, Color::Black, Color::Red, Color::Green]
            .into_iter()
            .filter(|c| self.amount(*c) > 0)
            .collect()
    }

    /// Whether the mana in `pool` that may be spent on `spent_on` covers this cost
    pub fn can_be_paid_from(&self, pool: &ManaPool, spent_on: Option<ObjectId>) -> bool {
        let payable = pool.payable_for(spent_on);
        let mut spare = 0;
        for color in Color::SPEND_ORDER {
            let have = payable.amount(color);
            let need = self.amount(color);
            if have < need {
                return false;
            }
            spare += have - need;
        }
        spare >= self.generic
    }

    /// Spend mana from `pool`: colored requirements first, then generic in
    /// [`Color::SPEND_ORDER`]
    pub fn pay_from(&self, pool: &mut ManaPool, spent_on: Option<ObjectId>) -> Result<()> {
        let mut unpaid = 0;
        for color in Color::SPEND_ORDER {
            unpaid += pool.spend(color, self.amount(color), spent_on);
        }

        let mut generic = self.generic;
        for color in Color::SPEND_ORDER {
            if generic == 0 {
                break;
            }
            generic = pool.spend(color, generic, spent_on);
        }

        if unpaid + generic > 0 {
            return Err(MtgError::PaymentFailed(format!(
                "{} of {} left unpaid",
                unpaid + generic,
                self
            )));
        }
        Ok(())
    }
}

impl Add for ManaCost {
    type Output = ManaCost;

    fn add(self, other: ManaCost) -> ManaCost {
        ManaCost {
            generic: self.generic + other.generic,
            white: self.white + other.white,
            blue: self.blue + other.blue,
            black: self.black + other.black,
            red: self.red + other.red,
            green: self.green + other.green,
            colorless: self.colorless + other.colorless,
        }
    }
}

impl fmt::Display for ManaCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mana_value() == 0 {
            return write!(f, "0");
        }
        if self.generic > 0 {
            write!(f, "{}", self.generic)?;
        }
        for color in [
            Color::Colorless,
            Color::White,
            Color::Blue,
            Color::Black,
            Color::Red,
            Color::Green,
        ] {
            for _ in 0..self.amount(color) {
                write!(f, "{color}")?;
            }
        }
        Ok(())
    }
}

/// Restrictions and riders on a unit of special mana
pub trait SpecialManaRule: fmt::Debug + Send + Sync {
    /// Whether this mana may pay for `spent_on`
    fn can_spend_on(&self, _spent_on: Option<ObjectId>) -> bool {
        true
    }

    /// Called after `amount` of this mana has been spent
    fn on_spend(&self, _spent_on: Option<ObjectId>, _amount: u32) {}

    /// Whether this mana disappears when the pool empties
    fn should_empty(&self) -> bool {
        true
    }
}

/// Mana with a spending restriction or rider
#[derive(Debug, Clone)]
pub struct SpecialMana {
    pub color: Color,
    pub amount: u32,
    pub rule: Arc<dyn SpecialManaRule>,
}

/// Mana pool for a player
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManaPool {
    pub white: u32,
    pub blue: u32,
    pub black: u32,
    pub red: u32,
    pub green: u32,
    pub colorless: u32,
    #[serde(skip)]
    pub special: Vec<SpecialMana>,
}

impl ManaPool {
    pub fn new() -> Self {
        ManaPool::default()
    }

    pub fn amount(&self, color: Color) -> u32 {
        match color {
            Color::White => self.white,
            Color::Blue => self.blue,
            Color::Black => self.black,
            Color::Red => self.red,
            Color::Green => self.green,
            Color::Colorless => self.colorless,
        }
    }

    fn amount_mut(&mut self, color: Color) -> &mut u32 {
        match color {
            Color::White => &mut self.white,
            Color::Blue => &mut self.blue,
            Color::Black => &mut self.black,
            Color::Red => &mut self.red,
            Color::Green => &mut self.green,
            Color::Colorless => &mut self.colorless,
        }
    }

    pub fn add(&mut self, color: Color, amount: u32) {
        *self.amount_mut(color) += amount;
    }

    pub fn add_special(&mut self, mana: SpecialMana) {
        self.special.push(mana);
    }

    /// Regular mana plus the special mana allowed to pay for `spent_on`
    pub fn payable_for(&self, spent_on: Option<ObjectId>) -> ManaPool {
        let mut payable = ManaPool {
            special: Vec::new(),
            ..self.clone()
        };
        for s in self.special.iter().filter(|s| s.rule.can_spend_on(spent_on)) {
            payable.add(s.color, s.amount);
        }
        payable
    }

    /// Spend up to `amount` of `color`, regular mana before special mana.
    /// Returns the amount that could not be paid.
    pub fn spend(&mut self, color: Color, amount: u32, spent_on: Option<ObjectId>) -> u32 {
        let regular = self.amount_mut(color);
        let used = amount.min(*regular);
        *regular -= used;
        let mut remaining = amount - used;

        for s in self.special.iter_mut() {
            if remaining == 0 {
                break;
            }
            if s.color != color || !s.rule.can_spend_on(spent_on) {
                continue;
            }
            let used = remaining.min(s.amount);
            if used > 0 {
                s.amount -= used;
                remaining -= used;
                s.rule.on_spend(spent_on, used);
            }
        }
        self.special.retain(|s| s.amount > 0);
        remaining
    }

    /// Empty the pool, keeping special mana that persists
    pub fn empty(&mut self) {
        self.white = 0;
        self.blue = 0;
        self.black = 0;
        self.red = 0;
        self.green = 0;
        self.colorless = 0;
        self.special.retain(|s| !s.rule.should_empty());
    }

    /// Total mana in pool, special mana included
    pub fn total(&self) -> u32 {
        Color::SPEND_ORDER.iter().map(|c| self.amount(*c)).sum::<u32>()
            + self.special.iter().map(|s| s.amount).sum::<u32>()
    }
}
