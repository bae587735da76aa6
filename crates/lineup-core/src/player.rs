// Player records, positions and prices.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Soccer positions a lineup slot can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    /// All positions in pitch order, goalkeeper first.
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    /// Parse a catalog `Posicion` value into a Position.
    ///
    /// Accepts the Spanish sheet values (Portero, Defensa, Mediocentro,
    /// Delantero) plus the usual English names and abbreviations.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "portero" | "gk" | "goalkeeper" => Some(Position::Goalkeeper),
            "defensa" | "def" | "defender" => Some(Position::Defender),
            "mediocentro" | "mid" | "midfielder" => Some(Position::Midfielder),
            "delantero" | "fwd" | "forward" => Some(Position::Forward),
            _ => None,
        }
    }

    /// Short display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    /// Deterministic ordering index; also the store column order.
    pub fn sort_order(&self) -> u8 {
        match self {
            Position::Goalkeeper => 0,
            Position::Defender => 1,
            Position::Midfielder => 2,
            Position::Forward => 3,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Price
// ---------------------------------------------------------------------------

/// A non-negative euro amount held as whole cents.
///
/// Keeping cents as an integer makes the budget comparison exact: a team
/// costing 700,00 is within a 700 cap, 700,01 is not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(u64);

impl Price {
    pub const ZERO: Price = Price(0);

    pub const fn from_cents(cents: u64) -> Self {
        Price(cents)
    }

    /// Saturates at the largest representable amount.
    pub const fn from_euros(euros: u64) -> Self {
        Price(euros.saturating_mul(100))
    }

    /// Like `from_euros`, but `None` when the amount does not fit.
    pub const fn checked_from_euros(euros: u64) -> Option<Self> {
        match euros.checked_mul(100) {
            Some(cents) => Some(Price(cents)),
            None => None,
        }
    }

    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Price rounded to the nearest whole euro.
    pub fn whole_euros(&self) -> u64 {
        (self.0 + 50) / 100
    }

    pub fn is_whole(&self) -> bool {
        self.0 % 100 == 0
    }

    /// Parse a locale-formatted amount: "100,35", "100.35" or "100".
    ///
    /// Returns None for empty, negative, non-finite or out-of-range input.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().replace(',', ".");
        if normalized.is_empty() {
            return None;
        }
        let value: f64 = normalized.parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents >= u64::MAX as f64 {
            return None;
        }
        Some(Price(cents as u64))
    }

    /// European formatting with two decimals: 100.35 -> "100,35".
    pub fn to_eu_string(&self) -> String {
        format!("{},{:02}", self.0 / 100, self.0 % 100)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}€", self.to_eu_string())
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::ZERO, Add::add)
    }
}

// ---------------------------------------------------------------------------
// PlayerRecord
// ---------------------------------------------------------------------------

/// One eligible player from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub team: String,
    pub position: Position,
    pub price: Price,
}
