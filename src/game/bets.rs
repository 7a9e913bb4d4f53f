//! Bet definitions for the European layout.
//!
//! Each `BetKind` knows its payout ratio (standard European odds), its
//! coverage (the set of numbers it wins on), and how to validate its
//! targets against the wheel. Payouts are derived from the standard odds
//! table rather than listed per bet: straight 35:1, split 17:1, street
//! 11:1, corner 8:1, line 5:1, dozen/column 2:1, even-money 1:1.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::wheel::{Color, Parity, SpinOutcome, TableHalf, Wheel};
use super::EngineError;

/// Number of streets (rows of three) on the layout.
const STREETS: u8 = 12;

/// A single bet on the layout.
///
/// Inside bets carry their target numbers or layout index; even-money bets
/// carry nothing and resolve purely against the spin's derived attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BetKind {
    /// Single number, 0–36. Pays 35:1.
    Straight { number: u8 },
    /// Two adjacent numbers. Pays 17:1. Zero splits (0-1, 0-2, 0-3) count.
    Split { first: u8, second: u8 },
    /// Row of three: index 0–11 covers `3i+1 … 3i+3`. Pays 11:1.
    Street { index: u8 },
    /// Four numbers in a square, identified by the top-left number. Pays 8:1.
    Corner { anchor: u8 },
    /// Two adjacent streets: index 0–10 covers `3i+1 … 3i+6`. Pays 5:1.
    Line { index: u8 },
    /// Dozen 0–2 (1–12, 13–24, 25–36). Pays 2:1.
    Dozen { index: u8 },
    /// Column 0–2 (starting at 1, 2, 3). Pays 2:1.
    Column { index: u8 },
    Red,
    Black,
    Even,
    Odd,
    /// 1–18. Pays 1:1.
    Low,
    /// 19–36. Pays 1:1.
    High,
}

impl BetKind {
    /// Payout ratio (winnings per unit staked, stake excluded).
    pub fn payout_ratio(&self) -> u32 {
        match self {
            BetKind::Straight { .. } => 35,
            BetKind::Split { .. } => 17,
            BetKind::Street { .. } => 11,
            BetKind::Corner { .. } => 8,
            BetKind::Line { .. } => 5,
            BetKind::Dozen { .. } | BetKind::Column { .. } => 2,
            BetKind::Red
            | BetKind::Black
            | BetKind::Even
            | BetKind::Odd
            | BetKind::Low
            | BetKind::High => 1,
        }
    }

    /// The numbers this bet wins on.
    pub fn coverage(&self) -> Vec<u8> {
        match *self {
            BetKind::Straight { number } => vec![number],
            BetKind::Split { first, second } => vec![first, second],
            BetKind::Street { index } => {
                let base = index * 3 + 1;
                (base..base + 3).collect()
            }
            BetKind::Corner { anchor } => {
                vec![anchor, anchor + 1, anchor + 3, anchor + 4]
            }
            BetKind::Line { index } => {
                let base = index * 3 + 1;
                (base..base + 6).collect()
            }
            BetKind::Dozen { index } => {
                let base = index * 12 + 1;
                (base..base + 12).collect()
            }
            BetKind::Column { index } => (0..12).map(|row| row * 3 + index + 1).collect(),
            BetKind::Red => RED_COVERAGE.to_vec(),
            BetKind::Black => (1..=36).filter(|n| !RED_COVERAGE.contains(n)).collect(),
            BetKind::Even => (1..=36).filter(|n| n % 2 == 0).collect(),
            BetKind::Odd => (1..=36).filter(|n| n % 2 == 1).collect(),
            BetKind::Low => (1..=18).collect(),
            BetKind::High => (19..=36).collect(),
        }
    }

    /// Theoretical win probability on the given wheel.
    pub fn probability(&self, wheel: &Wheel) -> f64 {
        self.coverage().len() as f64 / wheel.pockets() as f64
    }

    /// Validate the bet's targets against the wheel layout.
    pub fn validate(&self, wheel: &Wheel) -> Result<(), EngineError> {
        let invalid = |detail: &str| {
            Err(EngineError::InvalidBetTarget {
                bet: self.to_string(),
                detail: detail.to_string(),
            })
        };

        match *self {
            BetKind::Straight { number } => {
                if !wheel.contains(number) {
                    return invalid("number not on the wheel");
                }
            }
            BetKind::Split { first, second } => {
                if !wheel.contains(first) || !wheel.contains(second) {
                    return invalid("number not on the wheel");
                }
                if !split_adjacent(first, second) {
                    return invalid("numbers are not adjacent on the layout");
                }
            }
            BetKind::Street { index } => {
                if index >= STREETS {
                    return invalid("street index out of range");
                }
            }
            BetKind::Corner { anchor } => {
                // Valid anchors sit in the first two columns of rows 1–11.
                if anchor == 0 || anchor > 32 || anchor % 3 == 0 {
                    return invalid("not a valid corner anchor");
                }
            }
            BetKind::Line { index } => {
                if index >= STREETS - 1 {
                    return invalid("line index out of range");
                }
            }
            BetKind::Dozen { index } | BetKind::Column { index } => {
                if index >= 3 {
                    return invalid("index out of range");
                }
            }
            BetKind::Red
            | BetKind::Black
            | BetKind::Even
            | BetKind::Odd
            | BetKind::Low
            | BetKind::High => {}
        }

        Ok(())
    }

    /// Whether this bet wins on the given outcome.
    ///
    /// Even-money, dozen, and column bets resolve against the outcome's
    /// derived attributes; since zero carries none, they all lose on zero.
    pub fn wins_on(&self, outcome: &SpinOutcome) -> bool {
        match *self {
            BetKind::Straight { number } => outcome.number == number,
            BetKind::Split { .. }
            | BetKind::Street { .. }
            | BetKind::Corner { .. }
            | BetKind::Line { .. } => self.coverage().contains(&outcome.number),
            BetKind::Dozen { index } => outcome.dozen == Some(index),
            BetKind::Column { index } => outcome.column == Some(index),
            BetKind::Red => outcome.color == Color::Red,
            BetKind::Black => outcome.color == Color::Black,
            BetKind::Even => outcome.parity == Some(Parity::Even),
            BetKind::Odd => outcome.parity == Some(Parity::Odd),
            BetKind::Low => outcome.half == Some(TableHalf::Low),
            BetKind::High => outcome.half == Some(TableHalf::High),
        }
    }
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            BetKind::Straight { number } => write!(f, "straight {number}"),
            BetKind::Split { first, second } => write!(f, "split {first}-{second}"),
            BetKind::Street { index } => {
                let base = index * 3 + 1;
                write!(f, "street {}-{}", base, base + 2)
            }
            BetKind::Corner { anchor } => write!(f, "corner {anchor}"),
            BetKind::Line { index } => {
                let base = index * 3 + 1;
                write!(f, "line {}-{}", base, base + 5)
            }
            BetKind::Dozen { index } => {
                let base = index * 12 + 1;
                write!(f, "dozen {}-{}", base, base + 11)
            }
            BetKind::Column { index } => write!(f, "column {}", index + 1),
            BetKind::Red => write!(f, "red"),
            BetKind::Black => write!(f, "black"),
            BetKind::Even => write!(f, "even"),
            BetKind::Odd => write!(f, "odd"),
            BetKind::Low => write!(f, "low"),
            BetKind::High => write!(f, "high"),
        }
    }
}

const RED_COVERAGE: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

/// Two numbers share a layout edge: horizontal neighbours in the same row,
/// vertical neighbours one row apart, or a zero split (0 touches 1, 2, 3).
fn split_adjacent(first: u8, second: u8) -> bool {
    let (a, b) = if first < second {
        (first, second)
    } else {
        (second, first)
    };
    if a == b {
        return false;
    }
    if a == 0 {
        return (1..=3).contains(&b);
    }
    // Vertical: same column, next row.
    if b == a + 3 {
        return true;
    }
    // Horizontal: consecutive, and `a` not at a row's right edge.
    b == a + 1 && a % 3 != 0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn wheel() -> Wheel {
        Wheel::european()
    }

    #[test]
    fn test_payout_ratios_follow_standard_odds() {
        assert_eq!(BetKind::Straight { number: 0 }.payout_ratio(), 35);
        assert_eq!(BetKind::Split { first: 1, second: 2 }.payout_ratio(), 17);
        assert_eq!(BetKind::Street { index: 0 }.payout_ratio(), 11);
        assert_eq!(BetKind::Corner { anchor: 1 }.payout_ratio(), 8);
        assert_eq!(BetKind::Line { index: 0 }.payout_ratio(), 5);
        assert_eq!(BetKind::Dozen { index: 0 }.payout_ratio(), 2);
        assert_eq!(BetKind::Column { index: 0 }.payout_ratio(), 2);
        for even_money in [
            BetKind::Red,
            BetKind::Black,
            BetKind::Even,
            BetKind::Odd,
            BetKind::Low,
            BetKind::High,
        ] {
            assert_eq!(even_money.payout_ratio(), 1);
        }
    }

    #[test]
    fn test_coverage_sizes() {
        assert_eq!(BetKind::Straight { number: 7 }.coverage().len(), 1);
        assert_eq!(BetKind::Split { first: 7, second: 8 }.coverage().len(), 2);
        assert_eq!(BetKind::Street { index: 4 }.coverage(), vec![13, 14, 15]);
        assert_eq!(
            BetKind::Corner { anchor: 14 }.coverage(),
            vec![14, 15, 17, 18]
        );
        assert_eq!(
            BetKind::Line { index: 4 }.coverage(),
            vec![13, 14, 15, 16, 17, 18]
        );
        assert_eq!(BetKind::Dozen { index: 1 }.coverage().len(), 12);
        assert_eq!(
            BetKind::Column { index: 1 }.coverage(),
            vec![2, 5, 8, 11, 14, 17, 20, 23, 26, 29, 32, 35]
        );
        assert_eq!(BetKind::Red.coverage().len(), 18);
        assert_eq!(BetKind::Black.coverage().len(), 18);
        assert_eq!(BetKind::High.coverage(), (19..=36).collect::<Vec<u8>>());
    }

    #[test]
    fn test_probability() {
        let w = wheel();
        assert!((BetKind::Straight { number: 0 }.probability(&w) - 1.0 / 37.0).abs() < 1e-12);
        assert!((BetKind::Red.probability(&w) - 18.0 / 37.0).abs() < 1e-12);
        assert!((BetKind::Dozen { index: 2 }.probability(&w) - 12.0 / 37.0).abs() < 1e-12);
    }

    #[test]
    fn test_split_adjacency() {
        let w = wheel();
        // Horizontal and vertical splits
        assert!(BetKind::Split { first: 7, second: 8 }.validate(&w).is_ok());
        assert!(BetKind::Split { first: 7, second: 10 }.validate(&w).is_ok());
        // Order does not matter
        assert!(BetKind::Split { first: 10, second: 7 }.validate(&w).is_ok());
        // Zero splits
        assert!(BetKind::Split { first: 0, second: 2 }.validate(&w).is_ok());
        // Across a row edge: 6 and 7 do not touch
        assert!(BetKind::Split { first: 6, second: 7 }.validate(&w).is_err());
        // Not neighbours at all
        assert!(BetKind::Split { first: 1, second: 5 }.validate(&w).is_err());
        assert!(BetKind::Split { first: 0, second: 4 }.validate(&w).is_err());
    }

    #[test]
    fn test_validation_rejects_off_layout_targets() {
        let w = wheel();
        assert!(BetKind::Straight { number: 37 }.validate(&w).is_err());
        assert!(BetKind::Street { index: 12 }.validate(&w).is_err());
        assert!(BetKind::Line { index: 11 }.validate(&w).is_err());
        assert!(BetKind::Dozen { index: 3 }.validate(&w).is_err());
        assert!(BetKind::Column { index: 3 }.validate(&w).is_err());
        // 33 sits in the right column; 36 is in the last row
        assert!(BetKind::Corner { anchor: 33 }.validate(&w).is_err());
        assert!(BetKind::Corner { anchor: 34 }.validate(&w).is_err());
        assert!(BetKind::Corner { anchor: 32 }.validate(&w).is_ok());
        assert!(BetKind::Corner { anchor: 0 }.validate(&w).is_err());
    }

    #[test]
    fn test_zero_loses_every_non_straight_bet() {
        let w = wheel();
        let zero = w.outcome(0).unwrap();
        let bets = [
            BetKind::Split { first: 1, second: 2 },
            BetKind::Street { index: 0 },
            BetKind::Corner { anchor: 1 },
            BetKind::Line { index: 0 },
            BetKind::Dozen { index: 0 },
            BetKind::Column { index: 0 },
            BetKind::Red,
            BetKind::Black,
            BetKind::Even,
            BetKind::Odd,
            BetKind::Low,
            BetKind::High,
        ];
        for bet in bets {
            assert!(!bet.wins_on(&zero), "{bet} must lose on zero");
        }
        assert!(BetKind::Straight { number: 0 }.wins_on(&zero));
    }

    #[test]
    fn test_zero_splits_win_on_zero() {
        // A zero split covers zero explicitly, so it does win there.
        let w = wheel();
        let zero = w.outcome(0).unwrap();
        assert!(BetKind::Split { first: 0, second: 1 }.wins_on(&zero));
    }

    #[test]
    fn test_wins_on_derived_attributes() {
        let w = wheel();
        let o = w.outcome(17).unwrap(); // black, odd, low, dozen 1, column 1
        assert!(BetKind::Black.wins_on(&o));
        assert!(!BetKind::Red.wins_on(&o));
        assert!(BetKind::Odd.wins_on(&o));
        assert!(BetKind::Low.wins_on(&o));
        assert!(BetKind::Dozen { index: 1 }.wins_on(&o));
        assert!(BetKind::Column { index: 1 }.wins_on(&o));
        assert!(!BetKind::Column { index: 0 }.wins_on(&o));
        assert!(BetKind::Straight { number: 17 }.wins_on(&o));
        assert!(!BetKind::Straight { number: 16 }.wins_on(&o));
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(BetKind::Straight { number: 17 }.to_string(), "straight 17");
        assert_eq!(BetKind::Line { index: 4 }.to_string(), "line 13-18");
        assert_eq!(BetKind::Dozen { index: 2 }.to_string(), "dozen 25-36");
        assert_eq!(BetKind::Column { index: 0 }.to_string(), "column 1");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let bets = [
            BetKind::Straight { number: 0 },
            BetKind::Split { first: 0, second: 3 },
            BetKind::Line { index: 4 },
            BetKind::High,
        ];
        for bet in bets {
            let json = serde_json::to_string(&bet).unwrap();
            let parsed: BetKind = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, bet);
        }
    }
}
