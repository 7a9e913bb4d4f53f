//! Martingale progression.
//!
//! Doubles the stake after every loss on a single even-money target:
//! stake = base × 2^consecutive_losses. A win resets the counter. The
//! counter is hard-capped by `max_double_count`; exceeding it ends the
//! session instead of chasing the loss further.

use rust_decimal::Decimal;

use super::{balance_guard, require_even_money, shared_stops, BettingMethod, MethodInput, MethodOutput};
use crate::game::PlacedBet;
use crate::types::{CroupierError, EndReason, MethodId, MethodParams, Progression};

pub struct Martingale;

impl BettingMethod for Martingale {
    fn id(&self) -> MethodId {
        MethodId::Martingale
    }

    fn initial_progression(&self, _params: &MethodParams) -> Progression {
        // Single value: the consecutive-loss counter.
        Progression::new(vec![0])
    }

    fn validate_params(&self, params: &MethodParams) -> Result<(), CroupierError> {
        require_even_money(params, self.id())?;
        if params.max_double_count == 0 || params.max_double_count > 32 {
            return Err(CroupierError::Validation(
                "max_double_count must be between 1 and 32".into(),
            ));
        }
        Ok(())
    }

    fn execute(&self, input: &MethodInput<'_>) -> Result<MethodOutput, CroupierError> {
        let mut losses = input.progression.current().unwrap_or(0);

        if let Some(last) = input.last {
            if last.won {
                losses = 0;
            } else {
                losses += 1;
                if losses > input.params.max_double_count {
                    return Ok(MethodOutput::stop(
                        Progression::new(vec![losses]),
                        EndReason::StopLoss,
                        "martingale double limit reached",
                    ));
                }
            }
        }

        let progression = Progression::new(vec![losses]);

        if let Some(stop) = shared_stops(input, &progression) {
            return Ok(stop);
        }

        let stake = input.base_amount * Decimal::from(1u64 << losses);

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
