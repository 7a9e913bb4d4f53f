//! James Bond fixed-coverage allocation.
//!
//! Not a progression: every round places the same three bets — 140 units on
//! High (19–36), 50 on the 13–18 line, 10 on straight zero — scaled by the
//! configured unit multiplier. Covers 25 of 37 numbers; only 1–12 loses the
//! whole round. Plays until a shared stop condition fires.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{balance_guard, shared_stops, BettingMethod, MethodInput, MethodOutput};
use crate::game::{BetKind, PlacedBet};
use crate::types::{CroupierError, MethodId, MethodParams, Progression};

/// Line index of the 13–18 six-number block.
const MIDDLE_LINE: u8 = 4;

pub struct JamesBond;

impl JamesBond {
    /// The fixed per-round allocation at a given multiplier.
    fn plan(multiplier: Decimal) -> Vec<PlacedBet> {
        vec![
            PlacedBet {
                bet: BetKind::High,
                stake: dec!(140) * multiplier,
            },
            PlacedBet {
                bet: BetKind::Line { index: MIDDLE_LINE },
                stake: dec!(50) * multiplier,
            },
            PlacedBet {
                bet: BetKind::Straight { number: 0 },
                stake: dec!(10) * multiplier,
            },
        ]
    }
}

impl BettingMethod for JamesBond {
    fn id(&self) -> MethodId {
        MethodId::JamesBond
    }

    fn initial_progression(&self, _params: &MethodParams) -> Progression {
        // Nothing evolves between rounds.
        Progression::default()
    }

    fn validate_params(&self, params: &MethodParams) -> Result<(), CroupierError> {
        if params.unit_multiplier <= Decimal::ZERO {
            return Err(CroupierError::Validation(
                "unit_multiplier must be positive".into(),
            ));
        }
        Ok(())
    }

    fn execute(&self, input: &MethodInput<'_>) -> Result<MethodOutput, CroupierError> {
        let progression = input.progression.clone();

        if let Some(stop) = shared_stops(input, &progression) {
            return Ok(stop);
        }

        let bets = Self::plan(input.params.unit_multiplier);
        let total: Decimal = bets.iter().map(|b| b.stake).sum();

        if let Some(stop) = balance_guard(total, input, &progression) {
            return Ok(stop);
        }

        Ok(MethodOutput::suggest(bets, progression))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
