//! Game engine — deterministic bet resolution for one spin.
//!
//! The engine owns a wheel configuration and turns (bets, winning number)
//! into per-bet results and round totals. It holds no mutable state and
//! never consults clocks or randomness: identical input always yields
//! identical output, which is what makes sessions replayable.

pub mod bets;
pub mod wheel;

pub use bets::BetKind;
pub use wheel::{Color, Parity, SpinOutcome, TableHalf, Wheel};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures the engine can report. Both are caller-input problems, never
/// internal faults.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("Winning number out of range: {number} (wheel holds 0-{max})")]
    NumberOutOfRange { number: u8, max: u8 },

    #[error("Invalid bet target ({bet}): {detail}")]
    InvalidBetTarget { bet: String, detail: String },
}

// ---------------------------------------------------------------------------
// Resolution types
// ---------------------------------------------------------------------------

/// A bet together with the stake riding on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedBet {
    pub bet: BetKind,
    pub stake: Decimal,
}

impl fmt::Display for PlacedBet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.bet, self.stake)
    }
}

/// Outcome of one placed bet for one spin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetResolution {
    pub bet: BetKind,
    pub stake: Decimal,
    pub won: bool,
    /// Winnings minus nothing on a win (stake × ratio), −stake on a loss.
    pub net: Decimal,
}

/// Aggregates over all bets in a round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundTotals {
    /// Sum of stakes placed.
    pub staked: Decimal,
    /// Sum of amounts returned to the player (stake + winnings on wins).
    pub returned: Decimal,
    /// `returned − staked`.
    pub net: Decimal,
}

impl fmt::Display for RoundTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.net >= Decimal::ZERO { "+" } else { "" };
        write!(
            f,
            "staked={} returned={} ({sign}{})",
            self.staked, self.returned, self.net
        )
    }
}

/// Full result of resolving one spin against a set of bets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinResolution {
    pub outcome: SpinOutcome,
    pub per_bet: Vec<BetResolution>,
    pub totals: RoundTotals,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Resolves spins against a wheel configuration. Pure; safe to share across
/// sessions.
#[derive(Debug, Clone, Default)]
pub struct GameEngine {
    wheel: Wheel,
}

impl GameEngine {
    pub fn new(wheel: Wheel) -> Self {
        Self { wheel }
    }

    /// Engine over the standard European wheel.
    pub fn european() -> Self {
        Self::new(Wheel::european())
    }

    pub fn wheel(&self) -> &Wheel {
        &self.wheel
    }

    /// Resolve one winning number against a set of placed bets.
    ///
    /// Validates every bet target before resolving anything, so a bad bet
    /// never produces a partial result.
    pub fn resolve_spin(
        &self,
        bets: &[PlacedBet],
        winning_number: u8,
    ) -> Result<SpinResolution, EngineError> {
        let outcome = self.wheel.outcome(winning_number)?;

        for placed in bets {
            placed.bet.validate(&self.wheel)?;
        }

        let mut per_bet = Vec::with_capacity(bets.len());
        let mut staked = Decimal::ZERO;
        let mut returned = Decimal::ZERO;

        for placed in bets {
            let won = placed.bet.wins_on(&outcome);
            let net = if won {
                placed.stake * Decimal::from(placed.bet.payout_ratio())
            } else {
                -placed.stake
            };
            staked += placed.stake;
            if won {
                returned += placed.stake + net;
            }
            per_bet.push(BetResolution {
                bet: placed.bet,
                stake: placed.stake,
                won,
                net,
            });
        }

        let totals = RoundTotals {
            staked,
            returned,
            net: returned - staked,
        };

        debug!(
            winning = winning_number,
            bets = bets.len(),
            net = %totals.net,
            "Spin resolved"
        );

        Ok(SpinResolution {
            outcome,
            per_bet,
            totals,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
