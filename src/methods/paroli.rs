//! Paroli progression — the Martingale mirrored onto wins.
//!
//! stake = base × 2^consecutive_wins. Reaching `max_wins` banks the streak
//! and resets to base; any loss resets immediately. The reset is the safety
//! bound, so Paroli never stops a session on its own.

use rust_decimal::Decimal;

use super::{balance_guard, require_even_money, shared_stops, BettingMethod, MethodInput, MethodOutput};
use crate::game::PlacedBet;
use crate::types::{CroupierError, MethodId, MethodParams, Progression};

pub struct Paroli;

impl BettingMethod for Paroli {
    fn id(&self) -> MethodId {
        MethodId::Paroli
    }

    fn initial_progression(&self, _params: &MethodParams) -> Progression {
        // Single value: the consecutive-win counter.
        Progression::new(vec![0])
    }

    fn validate_params(&self, params: &MethodParams) -> Result<(), CroupierError> {
        require_even_money(params, self.id())?;
        if params.max_wins == 0 || params.max_wins > 32 {
            return Err(CroupierError::Validation(
                "max_wins must be between 1 and 32".into(),
            ));
        }
        Ok(())
    }

    fn execute(&self, input: &MethodInput<'_>) -> Result<MethodOutput, CroupierError> {
        let mut wins = input.progression.current().unwrap_or(0);

        if let Some(last) = input.last {
            if last.won {
                wins += 1;
                if wins >= input.params.max_wins {
                    // Streak complete: bank it and start over.
                    wins = 0;
                }
            } else {
                wins = 0;
            }
        }

        let progression = Progression::new(vec![wins]);

        if let Some(stop) = shared_stops(input, &progression) {
            return Ok(stop);
        }

        let stake = input.base_amount * Decimal::from(1u64 << wins);

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
    use crate::game::BetKind;
    use crate::methods::testing::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_win_doubles_next_stake() {
        let mut fx = InputFixture::new(Progression::new(vec![0]));
        fx.last = won(dec!(10), dec!(10));
        let out = Paroli.execute(&fx.input()).unwrap();
        assert_eq!(out.progression.values, vec![1]);
        assert_eq!(out.amount, dec!(20));
    }

    #[test]
    fn test_streak_builds_until_max_wins() {
        let mut fx = InputFixture::new(Progression::new(vec![1]));
        fx.params.max_wins = 3;
        fx.last = won(dec!(20), dec!(20));
        let out = Paroli.execute(&fx.input()).unwrap();
        assert_eq!(out.progression.values, vec![2]);
        assert_eq!(out.amount, dec!(40));
    }

    #[test]
    fn test_completed_streak_resets_to_base() {
        let mut fx = InputFixture::new(Progression::new(vec![2]));
        fx.params.max_wins = 3;
        fx.last = won(dec!(40), dec!(40));
        let out = Paroli.execute(&fx.input()).unwrap();
        assert_eq!(out.progression.values, vec![0]);
        assert_eq!(out.amount, dec!(10));
        assert!(!out.stop_session);
    }

    #[test]
    fn test_loss_resets_immediately() {
        let mut fx = InputFixture::new(Progression::new(vec![2]));
        fx.last = lost(dec!(40));
        let out = Paroli.execute(&fx.input()).unwrap();
        assert_eq!(out.progression.values, vec![0]);
        assert_eq!(out.amount, dec!(10));
    }

    #[test]
    fn test_shared_stops_still_apply() {
        let mut fx = InputFixture::new(Progression::new(vec![0]));
        fx.balance = dec!(90);
        let out = Paroli.execute(&fx.input()).unwrap();
        assert!(out.stop_session);
        assert_eq!(out.reason.as_deref(), Some("stop loss reached"));
    }

    #[test]
    fn test_requires_even_money_target() {
        let mut params = crate::types::MethodParams::default();
        params.target = BetKind::Dozen { index: 1 };
        assert!(Paroli.validate_params(&params).is_err());
    }
}
