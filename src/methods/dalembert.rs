//! D'Alembert progression.
//!
//! A unit counter rises by one on a loss and falls by one on a win, floored
//! at `min_units` and bounded by `max_units`. stake = base + units × unit
//! size, so exposure grows linearly instead of geometrically.

use rust_decimal::Decimal;

use super::{balance_guard, shared_stops, BettingMethod, MethodInput, MethodOutput};
use crate::game::PlacedBet;
use crate::types::{CroupierError, EndReason, MethodId, MethodParams, Progression};

pub struct DAlembert;

impl BettingMethod for DAlembert {
    fn id(&self) -> MethodId {
        MethodId::DAlembert
    }

    fn initial_progression(&self, params: &MethodParams) -> Progression {
        Progression::new(vec![params.min_units])
    }

    fn validate_params(&self, params: &MethodParams) -> Result<(), CroupierError> {
        if params.unit_size <= Decimal::ZERO {
            return Err(CroupierError::Validation(
                "unit_size must be positive".into(),
            ));
        }
        if params.min_units > params.max_units {
            return Err(CroupierError::Validation(
                "min_units must not exceed max_units".into(),
            ));
        }
        Ok(())
    }

    fn execute(&self, input: &MethodInput<'_>) -> Result<MethodOutput, CroupierError> {
        let mut units = input.progression.current().unwrap_or(input.params.min_units);

        if let Some(last) = input.last {
            if last.won {
                units = units.saturating_sub(1).max(input.params.min_units);
            } else {
                units += 1;
                if units > input.params.max_units {
                    return Ok(MethodOutput::stop(
                        Progression::new(vec![units]),
                        EndReason::StopLoss,
                        "dalembert unit limit reached",
                    ));
                }
            }
        }

        let progression = Progression::new(vec![units]);

        if let Some(stop) = shared_stops(input, &progression) {
            return Ok(stop);
        }

        let stake = input.base_amount + Decimal::from(units) * input.params.unit_size;

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::testing::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_loss_adds_a_unit() {
        let mut fx = InputFixture::new(Progression::new(vec![2]));
        fx.params.unit_size = dec!(5);
        fx.last = lost(dec!(20));
        let out = DAlembert.execute(&fx.input()).unwrap();
        assert_eq!(out.progression.values, vec![3]);
        // stake = 10 + 3 × 5
        assert_eq!(out.amount, dec!(25));
    }

    #[test]
    fn test_win_removes_a_unit() {
        let mut fx = InputFixture::new(Progression::new(vec![2]));
        fx.params.unit_size = dec!(5);
        fx.last = won(dec!(20), dec!(20));
        let out = DAlembert.execute(&fx.input()).unwrap();
        assert_eq!(out.progression.values, vec![1]);
        assert_eq!(out.amount, dec!(15));
    }

    #[test]
    fn test_win_floors_at_min_units() {
        let mut fx = InputFixture::new(Progression::new(vec![1]));
        fx.params.min_units = 1;
        fx.last = won(dec!(15), dec!(15));
        let out = DAlembert.execute(&fx.input()).unwrap();
        assert_eq!(out.progression.values, vec![1]);
    }

    #[test]
    fn test_unit_limit_stops_session() {
        let mut fx = InputFixture::new(Progression::new(vec![20]));
        fx.params.max_units = 20;
        fx.last = lost(dec!(30));
        let out = DAlembert.execute(&fx.input()).unwrap();
        assert!(out.stop_session);
        assert_eq!(out.reason.as_deref(), Some("dalembert unit limit reached"));
    }

    #[test]
    fn test_opening_round_uses_min_units() {
        let mut params = crate::types::MethodParams::default();
        params.min_units = 2;
        let progression = DAlembert.initial_progression(&params);
        assert_eq!(progression.values, vec![2]);
    }

    #[test]
    fn test_validate_params() {
        let mut params = crate::types::MethodParams::default();
        assert!(DAlembert.validate_params(&params).is_ok());
        params.unit_size = Decimal::ZERO;
        assert!(DAlembert.validate_params(&params).is_err());
        params.unit_size = dec!(1);
        params.min_units = 5;
        params.max_units = 4;
        assert!(DAlembert.validate_params(&params).is_err());
    }
}
