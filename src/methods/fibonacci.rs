//! Fibonacci progression.
//!
//! Walks an index over the Fibonacci sequence (1, 1, 2, 3, 5, 8, …),
//! generated lazily up to `max_sequence_length`. A loss moves the index
//! forward one step; a win moves it back two (floored at the start).
//! Stake = base × sequence[index], always on the configured fixed target.

use rust_decimal::Decimal;

use super::{balance_guard, shared_stops, BettingMethod, MethodInput, MethodOutput};
use crate::game::PlacedBet;
use crate::types::{CroupierError, EndReason, MethodId, MethodParams, Progression};

pub struct Fibonacci;

/// Grow the sequence until `index` is addressable.
fn extend_to(values: &mut Vec<u32>, index: usize) {
    while values.len() <= index {
        let next = match values.len() {
            0 | 1 => 1,
            n => values[n - 1].saturating_add(values[n - 2]),
        };
        values.push(next);
    }
}

impl BettingMethod for Fibonacci {
    fn id(&self) -> MethodId {
        MethodId::Fibonacci
    }

    fn initial_progression(&self, _params: &MethodParams) -> Progression {
        Progression::new(vec![1])
    }

    fn validate_params(&self, params: &MethodParams) -> Result<(), CroupierError> {
        if params.max_sequence_length < 2 {
            return Err(CroupierError::Validation(
                "fibonacci needs max_sequence_length of at least 2".into(),
            ));
        }
        Ok(())
    }

    fn execute(&self, input: &MethodInput<'_>) -> Result<MethodOutput, CroupierError> {
        let mut progression = input.progression.clone();

        if let Some(last) = input.last {
            if last.won {
                progression.cursor = progression.cursor.saturating_sub(2);
            } else {
                let next = progression.cursor + 1;
                if next >= input.params.max_sequence_length {
                    return Ok(MethodOutput::stop(
                        progression,
                        EndReason::StopLoss,
                        "fibonacci sequence limit reached",
                    ));
                }
                extend_to(&mut progression.values, next);
                progression.cursor = next;
            }
        }

        if let Some(stop) = shared_stops(input, &progression) {
            return Ok(stop);
        }

        let units = progression.current().unwrap_or(1);
        let stake = input.base_amount * Decimal::from(units);

        if let Some(stop) = balance_guard(stake, input, &progression) {
            return Ok(stop);
        }

        Ok(MethodOutput::suggest(
            vec![PlacedBet {
                bet: input.params.target,
                stake,
            }],
            progression,
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
