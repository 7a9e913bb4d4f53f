//! Betting methods — the pluggable progression strategies.
//!
//! Every method implements the same contract: fold the previous round's
//! result into the progression, run the shared stop rules, and suggest the
//! next bet. Methods are stateless across invocations — everything they
//! need arrives in `MethodInput`, and the updated progression travels back
//! in `MethodOutput` for the session to own.
//!
//! Selection happens through `MethodRegistry`, an explicitly constructed
//! identifier → implementation map that callers build once at startup and
//! inject wherever it is needed. No globals, no inheritance.

pub mod dalembert;
pub mod fibonacci;
pub mod james_bond;
pub mod labouchere;
pub mod martingale;
pub mod paroli;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::game::PlacedBet;
use crate::types::{BetRecord, CroupierError, EndReason, MethodId, MethodParams, Progression};

pub use dalembert::DAlembert;
pub use fibonacci::Fibonacci;
pub use james_bond::JamesBond;
pub use labouchere::Labouchere;
pub use martingale::Martingale;
pub use paroli::Paroli;

// ---------------------------------------------------------------------------
// Contract types
// ---------------------------------------------------------------------------

/// The previous round's result, reduced to what the progressions care about.
#[derive(Debug, Clone, Copy)]
pub struct LastRound {
    pub won: bool,
    pub staked: Decimal,
    pub net: Decimal,
}

impl LastRound {
    pub fn from_record(record: &BetRecord) -> Self {
        Self {
            won: record.won(),
            staked: record.totals.staked,
            net: record.totals.net,
        }
    }
}

/// Everything a method invocation sees. Built fresh by the orchestrator for
/// every round; methods never cache any of it.
#[derive(Debug)]
pub struct MethodInput<'a> {
    /// The round just resolved, `None` on the opening suggestion.
    pub last: Option<LastRound>,
    /// Full session ledger, oldest first.
    pub history: &'a [BetRecord],
    /// Progression as of before this round was folded in.
    pub progression: &'a Progression,
    pub base_amount: Decimal,
    pub balance: Decimal,
    /// Cumulative session profit.
    pub profit: Decimal,
    pub stop_loss: Decimal,
    pub stop_win: Option<Decimal>,
    pub params: &'a MethodParams,
}

/// A method's verdict for the next round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodOutput {
    pub should_bet: bool,
    /// Suggested bets — one entry for the progressions, three for James Bond.
    pub bets: Vec<PlacedBet>,
    /// Total suggested stake across `bets`.
    pub amount: Decimal,
    /// Progression after folding in the last round. The session adopts this
    /// wholesale.
    pub progression: Progression,
    /// When set, the session must end; this is a successful terminal
    /// outcome, not an error.
    pub stop_session: bool,
    pub end_reason: Option<EndReason>,
    /// Human-readable reason for a stop; always present when stopping.
    pub reason: Option<String>,
}

impl MethodOutput {
    /// A stop verdict: no bet, zero amount, session over.
    pub fn stop(progression: Progression, end_reason: EndReason, reason: impl Into<String>) -> Self {
        Self {
            should_bet: false,
            bets: Vec::new(),
            amount: Decimal::ZERO,
            progression,
            stop_session: true,
            end_reason: Some(end_reason),
            reason: Some(reason.into()),
        }
    }

    /// A normal suggestion.
    pub fn suggest(bets: Vec<PlacedBet>, progression: Progression) -> Self {
        let amount = bets.iter().map(|b| b.stake).sum();
        Self {
            should_bet: true,
            bets,
            amount,
            progression,
            stop_session: false,
            end_reason: None,
            reason: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Method contract
// ---------------------------------------------------------------------------

/// A betting progression strategy. Implementations are pure: no interior
/// mutability, safe to share across sessions and threads.
pub trait BettingMethod: Send + Sync {
    fn id(&self) -> MethodId;

    /// The progression a fresh session starts from.
    fn initial_progression(&self, params: &MethodParams) -> Progression;

    /// Check method parameters once, at session creation.
    fn validate_params(&self, params: &MethodParams) -> Result<(), CroupierError> {
        let _ = params;
        Ok(())
    }

    /// Fold the last round into the progression and produce the next
    /// suggestion or a stop verdict.
    fn execute(&self, input: &MethodInput<'_>) -> Result<MethodOutput, CroupierError>;
}

// ---------------------------------------------------------------------------
// Shared stop rules
// ---------------------------------------------------------------------------

/// Stop-loss and stop-win, evaluated before any stake is computed.
/// `progression` is the already-folded progression the stop verdict carries.
pub(crate) fn shared_stops(
    input: &MethodInput<'_>,
    progression: &Progression,
) -> Option<MethodOutput> {
    if input.balance <= input.stop_loss {
        debug!(balance = %input.balance, stop_loss = %input.stop_loss, "Stop loss hit");
        return Some(MethodOutput::stop(
            progression.clone(),
            EndReason::StopLoss,
            "stop loss reached",
        ));
    }
    if let Some(stop_win) = input.stop_win {
        if input.profit >= stop_win {
            debug!(profit = %input.profit, stop_win = %stop_win, "Stop win hit");
            return Some(MethodOutput::stop(
                progression.clone(),
                EndReason::StopWin,
                "stop win reached",
            ));
        }
    }
    None
}

/// The computed stake must fit inside the balance; otherwise the session
/// stops rather than suggesting an unaffordable bet.
pub(crate) fn balance_guard(
    stake: Decimal,
    input: &MethodInput<'_>,
    progression: &Progression,
) -> Option<MethodOutput> {
    if stake > input.balance {
        debug!(stake = %stake, balance = %input.balance, "Stake exceeds balance");
        return Some(MethodOutput::stop(
            progression.clone(),
            EndReason::StopLoss,
            "insufficient balance",
        ));
    }
    None
}

/// Martingale and Paroli must target an even-money outcome.
pub(crate) fn require_even_money(
    params: &MethodParams,
    method: MethodId,
) -> Result<(), CroupierError> {
    if params.target.payout_ratio() != 1 {
        return Err(CroupierError::Validation(format!(
            "{method} requires an even-money target, got {}",
            params.target
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Identifier → implementation map. Constructed explicitly and injected —
/// never ambient state.
pub struct MethodRegistry {
    methods: HashMap<MethodId, Arc<dyn BettingMethod>>,
}

impl MethodRegistry {
    /// Registry holding all six standard methods.
    pub fn standard() -> Self {
        let mut methods: HashMap<MethodId, Arc<dyn BettingMethod>> = HashMap::new();
        for method in [
            Arc::new(Fibonacci) as Arc<dyn BettingMethod>,
            Arc::new(Martingale),
            Arc::new(Paroli),
            Arc::new(DAlembert),
            Arc::new(Labouchere),
            Arc::new(JamesBond),
        ] {
            methods.insert(method.id(), method);
        }
        Self { methods }
    }

    pub fn get(&self, id: MethodId) -> Option<Arc<dyn BettingMethod>> {
        self.methods.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Test helpers shared by the method modules
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use rust_decimal_macros::dec;

    pub fn won(staked: Decimal, net: Decimal) -> Option<LastRound> {
        Some(LastRound {
            won: true,
            staked,
            net,
        })
    }

    pub fn lost(staked: Decimal) -> Option<LastRound> {
        Some(LastRound {
            won: false,
            staked,
            net: -staked,
        })
    }

    /// Input with sensible defaults: base 10, balance 1000, stop-loss 100.
    pub struct InputFixture {
        pub history: Vec<BetRecord>,
        pub progression: Progression,
        pub params: MethodParams,
        pub last: Option<LastRound>,
        pub balance: Decimal,
        pub profit: Decimal,
        pub stop_loss: Decimal,
        pub stop_win: Option<Decimal>,
        pub base_amount: Decimal,
    }

    impl InputFixture {
        pub fn new(progression: Progression) -> Self {
            Self {
                history: Vec::new(),
                progression,
                params: MethodParams::default(),
                last: None,
                balance: dec!(1000),
                profit: Decimal::ZERO,
                stop_loss: dec!(100),
                stop_win: None,
                base_amount: dec!(10),
            }
        }

        pub fn input(&self) -> MethodInput<'_> {
            MethodInput {
                last: self.last,
                history: &self.history,
                progression: &self.progression,
                base_amount: self.base_amount,
                balance: self.balance,
                profit: self.profit,
                stop_loss: self.stop_loss,
                stop_win: self.stop_win,
                params: &self.params,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
