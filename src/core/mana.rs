//! Mana amounts for casting spells and activating abilities
//!
//! Only green is tracked as a color. Everything else (colorless, the blue
//! half of a Simic karoo, Bojuka Bog's black) is folded into the generic
//! remainder, which is all the card pool ever needs.

use crate::{Result, SequencerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Glyph for one unit of the tracked color
pub const GREEN: char = 'G';

/// An amount of mana: `total` units, of which `green` are green
///
/// Invariant: `green <= total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Mana {
    green: u32,
    total: u32,
}

/// Returned by [`Mana::minus`] when the pool can't cover a cost
///
/// This is an expected outcome during search (the action simply doesn't
/// apply), not a configuration problem.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("can't subtract {need} from {have}")]
pub struct InsufficientMana {
    pub have: Mana,
    pub need: Mana,
}

impl Mana {
    /// No mana at all
    pub const fn zero() -> Self {
        Mana { green: 0, total: 0 }
    }

    /// Build from explicit generic and green amounts
    pub const fn new(generic: u32, green: u32) -> Self {
        Mana {
            green,
            total: generic + green,
        }
    }

    /// `n` green mana
    pub const fn green(n: u32) -> Self {
        Mana { green: n, total: n }
    }

    /// Parse a cost string like "2GG", "G" or "" (zero)
    pub fn parse(s: &str) -> Result<Self> {
        let mut green = 0u32;
        let mut generic_str = String::new();

        for c in s.trim().chars() {
            match c {
                GREEN => green += 1,
                '0'..='9' => generic_str.push(c),
                _ => return Err(SequencerError::InvalidManaCost(s.to_string())),
            }
        }

        let generic = if generic_str.is_empty() {
            0
        } else {
            generic_str
                .parse::<u32>()
                .map_err(|_| SequencerError::InvalidManaCost(s.to_string()))?
        };

        Ok(Mana::new(generic, green))
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn green_count(&self) -> u32 {
        self.green
    }

    /// Mana that may be spent on anything but green requirements
    pub fn generic(&self) -> u32 {
        self.total - self.green
    }

    pub fn is_zero(&self) -> bool {
        self.total == 0
    }

    pub fn plus(&self, other: Mana) -> Self {
        Mana {
            green: self.green + other.green,
            total: self.total + other.total,
        }
    }

    /// Multiply both components, e.g. three Forests tapping for G each
    pub fn times(&self, n: u32) -> Self {
        Mana {
            green: self.green * n,
            total: self.total * n,
        }
    }

    /// Check if this pool covers `cost`
    pub fn can_pay(&self, cost: Mana) -> bool {
        self.green >= cost.green && self.total >= cost.total
    }

    /// Pay `cost` out of this amount
    ///
    /// Generic costs are paid with non-green mana first; once that runs out
    /// the remainder eats into green, so the green count is capped at the
    /// remaining total.
    pub fn minus(&self, cost: Mana) -> std::result::Result<Mana, InsufficientMana> {
        if !self.can_pay(cost) {
            return Err(InsufficientMana {
                have: *self,
                need: cost,
            });
        }
        let total = self.total - cost.total;
        let green = (self.green - cost.green).min(total);
        Ok(Mana { green, total })
    }

    /// Digits for the uncolored part, then one glyph per green unit
    ///
    /// The digit is omitted when it's zero and there is at least one green.
    pub fn pretty(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Mana {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generic() > 0 || self.green == 0 {
            write!(f, "{}", self.generic())?;
        }
        for _ in 0..self.green {
            write!(f, "{GREEN}")?;
        }
        Ok(())
    }
}

impl FromStr for Mana {
    type Err = SequencerError;

    fn from_str(s: &str) -> Result<Self> {
        Mana::parse(s)
    }
}

impl TryFrom<String> for Mana {
    type Error = SequencerError;

    fn try_from(s: String) -> Result<Self> {
        Mana::parse(&s)
    }
}

impl From<Mana> for String {
    fn from(m: Mana) -> Self {
        m.to_string()
    }
}
