//! European wheel configuration.
//!
//! A single wheel layout: 37 pockets (0–36), the standard red/black map,
//! and the derived attributes (parity, table half, dozen, column) that
//! outside bets are resolved against. Zero carries no derived attributes,
//! so every outside bet loses on it by construction.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::EngineError;

/// Pocket colors. Zero is the only green pocket on a European wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Black,
    Green,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "red"),
            Color::Black => write!(f, "black"),
            Color::Green => write!(f, "green"),
        }
    }
}

/// Number parity for odd/even bets. Zero is neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    Even,
    Odd,
}

/// Low (1–18) / High (19–36) table halves. Zero is neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableHalf {
    Low,
    High,
}

/// The standard red pockets of the European layout.
const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

// ---------------------------------------------------------------------------
// SpinOutcome
// ---------------------------------------------------------------------------

/// A winning number together with its derived attributes, computed once per
/// round. Derived fields are `None` for zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub number: u8,
    pub color: Color,
    pub parity: Option<Parity>,
    pub half: Option<TableHalf>,
    /// Dozen index 0–2 (1–12, 13–24, 25–36).
    pub dozen: Option<u8>,
    /// Column index 0–2 (columns starting at 1, 2, 3).
    pub column: Option<u8>,
}

impl fmt::Display for SpinOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number, self.color)
    }
}

// ---------------------------------------------------------------------------
// Wheel
// ---------------------------------------------------------------------------

/// Wheel configuration: pocket count and color map.
///
/// Only the European layout exists today; the type is kept so a second
/// configuration can be added without touching the resolution code.
#[derive(Debug, Clone)]
pub struct Wheel {
    pockets: u8,
}

impl Wheel {
    /// The standard single-zero European wheel.
    pub fn european() -> Self {
        Self { pockets: 37 }
    }

    /// Number of pockets (37 for European).
    pub fn pockets(&self) -> u8 {
        self.pockets
    }

    /// Highest valid number on this wheel.
    pub fn max_number(&self) -> u8 {
        self.pockets - 1
    }

    /// Whether a number exists on this wheel.
    pub fn contains(&self, number: u8) -> bool {
        number <= self.max_number()
    }

    /// Color of a pocket. Callers must pass a valid number.
    pub fn color(&self, number: u8) -> Color {
        if number == 0 {
            Color::Green
        } else if RED_NUMBERS.contains(&number) {
            Color::Red
        } else {
            Color::Black
        }
    }

    /// Compute the full derived outcome for a winning number.
    pub fn outcome(&self, number: u8) -> Result<SpinOutcome, EngineError> {
        if !self.contains(number) {
            return Err(EngineError::NumberOutOfRange {
                number,
                max: self.max_number(),
            });
        }

        if number == 0 {
            return Ok(SpinOutcome {
                number,
                color: Color::Green,
                parity: None,
                half: None,
                dozen: None,
                column: None,
            });
        }

        Ok(SpinOutcome {
            number,
            color: self.color(number),
            parity: Some(if number % 2 == 0 {
                Parity::Even
            } else {
                Parity::Odd
            }),
            half: Some(if number <= 18 {
                TableHalf::Low
            } else {
                TableHalf::High
            }),
            dozen: Some((number - 1) / 12),
            column: Some((number - 1) % 3),
        })
    }
}

impl Default for Wheel {
    fn default() -> Self {
        Self::european()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
