//! Labouchère (cancellation) progression.
//!
//! Maintains a sequence of unit counts. The stake is first + last (the
//! single element when only one remains) × base. A win cancels both ends;
//! a loss appends the units just lost. An empty sequence means the line's
//! profit target has been met and the session stops — the only method with
//! a built-in win condition. A runaway sequence past `max_sequence_length`
//! stops the session instead.

use rust_decimal::Decimal;

use super::{balance_guard, shared_stops, BettingMethod, MethodInput, MethodOutput};
use crate::game::PlacedBet;
use crate::types::{CroupierError, EndReason, MethodId, MethodParams, Progression};

pub struct Labouchere;

/// Units staked against the current sequence: first + last, or the lone
/// element.
fn line_units(values: &[u32]) -> u32 {
    match values {
        [] => 0,
        [only] => *only,
        [first, .., last] => first + last,
    }
}

impl BettingMethod for Labouchere {
    fn id(&self) -> MethodId {
        MethodId::Labouchere
    }

    fn initial_progression(&self, params: &MethodParams) -> Progression {
        Progression::new(params.labouchere_start.clone())
    }

    fn validate_params(&self, params: &MethodParams) -> Result<(), CroupierError> {
        if params.labouchere_start.is_empty() {
            return Err(CroupierError::Validation(
                "labouchere starting sequence must not be empty".into(),
            ));
        }
        if params.labouchere_start.iter().all(|&v| v == 0) {
            return Err(CroupierError::Validation(
                "labouchere starting sequence must contain a positive value".into(),
            ));
        }
        if params.max_sequence_length < params.labouchere_start.len() {
            return Err(CroupierError::Validation(
                "max_sequence_length must cover the starting sequence".into(),
            ));
        }
        Ok(())
    }

    fn execute(&self, input: &MethodInput<'_>) -> Result<MethodOutput, CroupierError> {
        let mut values = input.progression.values.clone();

        if let Some(last) = input.last {
            if last.won {
                // Cancel both ends (the lone element when only one is left).
                values.pop();
                if !values.is_empty() {
                    values.remove(0);
                }
                if values.is_empty() {
                    return Ok(MethodOutput::stop(
                        Progression::new(values),
                        EndReason::StopWin,
                        "labouchere sequence cleared, profit target reached",
                    ));
                }
            } else {
                values.push(line_units(&input.progression.values));
                if values.len() > input.params.max_sequence_length {
                    return Ok(MethodOutput::stop(
                        Progression::new(values),
                        EndReason::StopLoss,
                        "labouchere sequence limit reached",
                    ));
                }
            }
        }

        let progression = Progression::new(values);

        if let Some(stop) = shared_stops(input, &progression) {
            return Ok(stop);
        }

        let stake = input.base_amount * Decimal::from(line_units(&progression.values));

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
