//! Shared types for the croupier engine.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that game, method, session, and
//! storage modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::game::{BetKind, BetResolution, EngineError, RoundTotals, SpinOutcome};
use crate::storage::StorageError;

// ---------------------------------------------------------------------------
// Method identifiers
// ---------------------------------------------------------------------------

/// Identifier of a betting method. One implementation exists per identifier,
/// looked up through the explicitly constructed `MethodRegistry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodId {
    Fibonacci,
    Martingale,
    Paroli,
    DAlembert,
    Labouchere,
    JamesBond,
}

impl MethodId {
    /// All known methods (useful for iteration and registry checks).
    pub const ALL: &'static [MethodId] = &[
        MethodId::Fibonacci,
        MethodId::Martingale,
        MethodId::Paroli,
        MethodId::DAlembert,
        MethodId::Labouchere,
        MethodId::JamesBond,
    ];
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodId::Fibonacci => write!(f, "fibonacci"),
            MethodId::Martingale => write!(f, "martingale"),
            MethodId::Paroli => write!(f, "paroli"),
            MethodId::DAlembert => write!(f, "dalembert"),
            MethodId::Labouchere => write!(f, "labouchere"),
            MethodId::JamesBond => write!(f, "james_bond"),
        }
    }
}

/// Attempt to parse a string into a MethodId (case-insensitive, tolerant of
/// common spellings).
impl std::str::FromStr for MethodId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' ', '\''], "_").as_str() {
            "fibonacci" => Ok(MethodId::Fibonacci),
            "martingale" => Ok(MethodId::Martingale),
            "paroli" => Ok(MethodId::Paroli),
            "dalembert" | "d_alembert" => Ok(MethodId::DAlembert),
            "labouchere" => Ok(MethodId::Labouchere),
            "james_bond" | "jamesbond" => Ok(MethodId::JamesBond),
            _ => Err(anyhow::anyhow!("Unknown betting method: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Progression
// ---------------------------------------------------------------------------

/// Method-specific progression state: an ordered sequence of non-negative
/// unit values plus a cursor. Owned exclusively by the session and replaced
/// wholesale by each method invocation — methods never mutate it in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Progression {
    pub values: Vec<u32>,
    pub cursor: usize,
}

impl Progression {
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, cursor: 0 }
    }

    /// The value under the cursor, if any.
    pub fn current(&self) -> Option<u32> {
        self.values.get(self.cursor).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Progression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        write!(f, "[{}] @{}", rendered.join(","), self.cursor)
    }
}

// ---------------------------------------------------------------------------
// Session status
// ---------------------------------------------------------------------------

/// Why a session reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    Manual,
    StopLoss,
    StopWin,
    Error,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::Manual => write!(f, "manual"),
            EndReason::StopLoss => write!(f, "stop loss"),
            EndReason::StopWin => write!(f, "stop win"),
            EndReason::Error => write!(f, "error"),
        }
    }
}

/// Session lifecycle status. `Ended` is terminal; every other state can
/// still reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    Active,
    Paused,
    Ended { reason: EndReason },
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Ended { .. })
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Created => write!(f, "created"),
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Paused => write!(f, "paused"),
            SessionStatus::Ended { reason } => write!(f, "ended ({reason})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Method parameters & session config
// ---------------------------------------------------------------------------

/// Tunable parameters for the betting methods. A session carries one set;
/// each method reads only the fields it cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodParams {
    /// Fixed target the progression methods bet every round.
    pub target: BetKind,
    /// Cap on the Fibonacci and Labouchère sequences.
    pub max_sequence_length: usize,
    /// Martingale: maximum consecutive doublings.
    pub max_double_count: u32,
    /// Paroli: winning streak length that resets to base.
    pub max_wins: u32,
    /// D'Alembert: money value of one unit.
    pub unit_size: Decimal,
    /// D'Alembert: floor for the unit counter.
    pub min_units: u32,
    /// D'Alembert: ceiling for the unit counter.
    pub max_units: u32,
    /// Labouchère: starting sequence of unit counts.
    pub labouchere_start: Vec<u32>,
    /// James Bond: scales the fixed 200-unit allocation.
    pub unit_multiplier: Decimal,
}

impl Default for MethodParams {
    fn default() -> Self {
        Self {
            target: BetKind::Red,
            max_sequence_length: 20,
            max_double_count: 8,
            max_wins: 3,
            unit_size: Decimal::ONE,
            min_units: 0,
            max_units: 20,
            labouchere_start: vec![1, 2, 3],
            unit_multiplier: Decimal::ONE,
        }
    }
}

/// Per-session configuration fixed at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub base_amount: Decimal,
    pub initial_balance: Decimal,
    /// Balance at or below which the session stops.
    pub stop_loss: Decimal,
    /// Optional cumulative profit at which the session stops.
    pub stop_win: Option<Decimal>,
    #[serde(default)]
    pub params: MethodParams,
}

impl SessionConfig {
    /// Check the configuration invariants before a session is created.
    pub fn validate(&self) -> Result<(), CroupierError> {
        if self.base_amount <= Decimal::ZERO {
            return Err(CroupierError::Validation(
                "base amount must be positive".into(),
            ));
        }
        if self.initial_balance < self.base_amount {
            return Err(CroupierError::Validation(
                "initial balance must cover at least one base bet".into(),
            ));
        }
        if self.stop_loss < Decimal::ZERO || self.stop_loss >= self.initial_balance {
            return Err(CroupierError::Validation(
                "stop loss must lie between zero and the initial balance".into(),
            ));
        }
        if let Some(stop_win) = self.stop_win {
            if stop_win <= Decimal::ZERO {
                return Err(CroupierError::Validation(
                    "stop win must be positive when set".into(),
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Immutable ledger entry for one completed round. Never mutated or removed
/// once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetRecord {
    /// 1-based round number within the session.
    pub round: u64,
    pub bets: Vec<BetResolution>,
    pub outcome: SpinOutcome,
    pub totals: RoundTotals,
    pub balance_after: Decimal,
    pub placed_at: DateTime<Utc>,
}

impl BetRecord {
    /// A round counts as won when it returned more than it staked.
    pub fn won(&self) -> bool {
        self.totals.net > Decimal::ZERO
    }
}

impl fmt::Display for BetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "round {}: spin {} | {} | balance {}",
            self.round, self.outcome, self.totals, self.balance_after
        )
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One betting session: identity, configuration, live balance and
/// progression, and the append-only round ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: String,
    pub method: MethodId,
    pub config: SessionConfig,
    pub status: SessionStatus,
    pub balance: Decimal,
    pub rounds_played: u64,
    /// Cumulative profit (balance − initial balance, maintained incrementally).
    pub profit: Decimal,
    pub progression: Progression,
    pub ledger: Vec<BetRecord>,
    /// Human-readable detail behind a stop (the method's reason string).
    pub stop_detail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a session in `Created` state; the orchestrator activates it.
    pub fn new(
        user_id: impl Into<String>,
        method: MethodId,
        config: SessionConfig,
        progression: Progression,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            method,
            balance: config.initial_balance,
            config,
            status: SessionStatus::Created,
            rounds_played: 0,
            profit: Decimal::ZERO,
            progression,
            ledger: Vec::new(),
            stop_detail: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Rounds the player came out ahead on.
    pub fn rounds_won(&self) -> u64 {
        self.ledger.iter().filter(|r| r.won()).count() as u64
    }

    /// Wall-clock lifetime of the session so far.
    pub fn duration(&self) -> chrono::Duration {
        self.updated_at - self.created_at
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.profit >= Decimal::ZERO { "+" } else { "" };
        write!(
            f,
            "{} [{}] {} | balance={} ({sign}{}) | rounds={} | {}",
            self.id,
            self.method,
            self.status,
            self.balance,
            self.profit,
            self.rounds_played,
            self.progression,
        )
    }
}

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Domain-level failures. Reaching a stop condition is never one of these —
/// stops are successful terminal outcomes carried in `MethodOutput`.
#[derive(Debug, thiserror::Error)]
pub enum CroupierError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    #[error("Session {session_id}: cannot {operation} while {status}")]
    SessionState {
        session_id: Uuid,
        operation: String,
        status: String,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("User {user_id} already has an active session")]
    ActiveSessionExists { user_id: String },

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    /// Infrastructure failure — retry-safe, unlike the domain errors above.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_config() -> SessionConfig {
        SessionConfig {
            base_amount: dec!(10),
            initial_balance: dec!(1000),
            stop_loss: dec!(100),
            stop_win: None,
            params: MethodParams::default(),
        }
    }

    // -- MethodId tests --

    #[test]
    fn test_method_id_display() {
        assert_eq!(MethodId::Fibonacci.to_string(), "fibonacci");
        assert_eq!(MethodId::DAlembert.to_string(), "dalembert");
        assert_eq!(MethodId::JamesBond.to_string(), "james_bond");
    }

    #[test]
    fn test_method_id_from_str() {
        assert_eq!("fibonacci".parse::<MethodId>().unwrap(), MethodId::Fibonacci);
        assert_eq!("Martingale".parse::<MethodId>().unwrap(), MethodId::Martingale);
        assert_eq!("d'alembert".parse::<MethodId>().unwrap(), MethodId::DAlembert);
        assert_eq!("james-bond".parse::<MethodId>().unwrap(), MethodId::JamesBond);
        assert_eq!("James Bond".parse::<MethodId>().unwrap(), MethodId::JamesBond);
        assert!("fibonaci".parse::<MethodId>().is_err());
    }

    #[test]
    fn test_method_id_serialization_roundtrip() {
        for id in MethodId::ALL {
            let json = serde_json::to_string(id).unwrap();
            let parsed: MethodId = serde_json::from_str(&json).unwrap();
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn test_method_id_all() {
        assert_eq!(MethodId::ALL.len(), 6);
    }

    // -- Progression tests --

    #[test]
    fn test_progression_current() {
        let p = Progression::new(vec![1, 1, 2, 3]);
        assert_eq!(p.current(), Some(1));
        let p = Progression {
            values: vec![1, 1, 2, 3],
            cursor: 3,
        };
        assert_eq!(p.current(), Some(3));
        let p = Progression::new(vec![]);
        assert!(p.is_empty());
        assert_eq!(p.current(), None);
    }

    #[test]
    fn test_progression_display() {
        let p = Progression {
            values: vec![1, 2, 3],
            cursor: 1,
        };
        assert_eq!(p.to_string(), "[1,2,3] @1");
    }

    // -- Status tests --

    #[test]
    fn test_status_terminal() {
        assert!(!SessionStatus::Created.is_terminal());
        assert!(!SessionStatus::Active.is_terminal());
        assert!(!SessionStatus::Paused.is_terminal());
        assert!(SessionStatus::Ended {
            reason: EndReason::Manual
        }
        .is_terminal());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SessionStatus::Active.to_string(), "active");
        assert_eq!(
            SessionStatus::Ended {
                reason: EndReason::StopLoss
            }
            .to_string(),
            "ended (stop loss)"
        );
    }

    #[test]
    fn test_status_serialization_roundtrip() {
        let statuses = [
            SessionStatus::Created,
            SessionStatus::Active,
            SessionStatus::Paused,
            SessionStatus::Ended {
                reason: EndReason::StopWin,
            },
        ];
        for status in statuses {
            let json = serde_json::to_string(&status).unwrap();
            let parsed: SessionStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, status);
        }
    }

    // -- Config tests --

    #[test]
    fn test_config_validate_ok() {
        assert!(make_config().validate().is_ok());
    }

    #[test]
    fn test_config_rejects_nonpositive_base() {
        let mut cfg = make_config();
        cfg.base_amount = Decimal::ZERO;
        assert!(matches!(cfg.validate(), Err(CroupierError::Validation(_))));
    }

    #[test]
    fn test_config_rejects_stop_loss_outside_balance() {
        let mut cfg = make_config();
        cfg.stop_loss = dec!(1000);
        assert!(cfg.validate().is_err());
        cfg.stop_loss = dec!(-1);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_config_rejects_balance_below_base() {
        let mut cfg = make_config();
        cfg.initial_balance = dec!(5);
        cfg.stop_loss = dec!(1);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_config_rejects_nonpositive_stop_win() {
        let mut cfg = make_config();
        cfg.stop_win = Some(Decimal::ZERO);
        assert!(cfg.validate().is_err());
        cfg.stop_win = Some(dec!(200));
        assert!(cfg.validate().is_ok());
    }

    // -- Session tests --

    #[test]
    fn test_session_new() {
        let session = Session::new(
            "user-1",
            MethodId::Martingale,
            make_config(),
            Progression::new(vec![0]),
        );
        assert_eq!(session.status, SessionStatus::Created);
        assert_eq!(session.balance, dec!(1000));
        assert_eq!(session.profit, Decimal::ZERO);
        assert_eq!(session.rounds_played, 0);
        assert!(session.ledger.is_empty());
        assert!(!session.is_active());
    }

    #[test]
    fn test_session_serialization_roundtrip() {
        let session = Session::new(
            "user-1",
            MethodId::Labouchere,
            make_config(),
            Progression::new(vec![1, 2, 3]),
        );
        let json = serde_json::to_string(&session).unwrap();
        let parsed: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, session);
    }

    #[test]
    fn test_session_display() {
        let session = Session::new(
            "user-1",
            MethodId::Paroli,
            make_config(),
            Progression::new(vec![0]),
        );
        let display = session.to_string();
        assert!(display.contains("paroli"));
        assert!(display.contains("created"));
        assert!(display.contains("1000"));
    }

    // -- Error tests --

    #[test]
    fn test_error_display() {
        let e = CroupierError::InsufficientBalance {
            needed: dec!(20),
            available: dec!(15),
        };
        assert_eq!(e.to_string(), "Insufficient balance: need 20, have 15");

        let e = CroupierError::ActiveSessionExists {
            user_id: "user-1".into(),
        };
        assert!(e.to_string().contains("user-1"));
    }
}
