//! Session orchestration.
//!
//! `SessionService` owns the glue between the three pure pieces: the game
//! engine resolves the spin, the configured betting method folds it into
//! the progression and suggests the next bet, and the reducer in
//! [`state`] applies the transition. Persistence happens through the
//! injected repository; a new session state only becomes visible after the
//! snapshot write succeeds, so a crash can never expose a half-applied
//! round.

pub mod state;

pub use state::SessionEvent;

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::game::{GameEngine, PlacedBet};
use crate::methods::{LastRound, MethodInput, MethodOutput, MethodRegistry};
use crate::storage::SessionRepository;
use crate::types::{
    BetRecord, CroupierError, EndReason, MethodId, Session, SessionConfig,
};

// ---------------------------------------------------------------------------
// Caller-facing results
// ---------------------------------------------------------------------------

/// Result of one completed round.
#[derive(Debug, Clone)]
pub struct RoundReport {
    /// The ledger entry just appended.
    pub record: BetRecord,
    /// The method's suggestion for the next round (or its stop verdict).
    pub next: MethodOutput,
    pub session_ended: bool,
    pub end_reason: Option<EndReason>,
}

/// Closing summary handed back by `end_session`.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub total_bets: u64,
    pub final_balance: Decimal,
    pub profit: Decimal,
    pub duration: chrono::Duration,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Orchestrates session lifecycles over an injected engine, method registry,
/// and repository.
pub struct SessionService {
    engine: GameEngine,
    registry: MethodRegistry,
    repo: Arc<dyn SessionRepository>,
    /// One mutex per session id. A round's method input depends on the
    /// previous round's output, so mutations of one session are strictly
    /// serialized; unrelated sessions proceed in parallel.
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl SessionService {
    pub fn new(
        engine: GameEngine,
        registry: MethodRegistry,
        repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            engine,
            registry,
            repo,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    async fn lock_for(&self, id: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn load_session(&self, id: Uuid) -> Result<Session, CroupierError> {
        self.repo
            .load(id)
            .await?
            .ok_or(CroupierError::SessionNotFound(id))
    }

    /// Create and activate a session, returning it together with the
    /// method's opening suggestion. A user may only hold one active session
    /// at a time.
    pub async fn create_session(
        &self,
        user_id: &str,
        method_id: MethodId,
        config: SessionConfig,
    ) -> Result<(Session, MethodOutput), CroupierError> {
        config.validate()?;
        let method = self.registry.get(method_id).ok_or_else(|| {
            CroupierError::Validation(format!("no implementation registered for {method_id}"))
        })?;
        method.validate_params(&config.params)?;
        config.params.target.validate(self.engine.wheel())?;

        if let Some(existing) = self.repo.find_active(user_id).await? {
            warn!(user_id, existing = %existing.id, "Rejecting second active session");
            return Err(CroupierError::ActiveSessionExists {
                user_id: user_id.to_string(),
            });
        }

        let progression = method.initial_progression(&config.params);
        let session =
            Session::new(user_id, method_id, config, progression).apply(SessionEvent::Activated)?;

        let opening = method.execute(&MethodInput {
            last: None,
            history: &session.ledger,
            progression: &session.progression,
            base_amount: session.config.base_amount,
            balance: session.balance,
            profit: session.profit,
            stop_loss: session.config.stop_loss,
            stop_win: session.config.stop_win,
            params: &session.config.params,
        })?;

        // A config that can't even afford the opening bet ends on the spot.
        let session = if opening.stop_session {
            session.apply(SessionEvent::Ended {
                reason: opening.end_reason.unwrap_or(EndReason::Error),
                detail: opening.reason.clone(),
            })?
        } else {
            session
        };

        self.repo.save(&session).await?;

        info!(
            session_id = %session.id,
            user_id,
            method = %method_id,
            balance = %session.balance,
            opening_stake = %opening.amount,
            "Session created"
        );

        Ok((session, opening))
    }

    /// Apply one round: resolve the spin, append the ledger entry, fold the
    /// outcome into the progression, and return the next suggestion.
    ///
    /// Only legal while the session is `Active`. The round is all-or-nothing:
    /// either the record is appended and persisted, or nothing changed.
    pub async fn place_bet(
        &self,
        session_id: Uuid,
        bets: &[PlacedBet],
        winning_number: u8,
    ) -> Result<RoundReport, CroupierError> {
        let lock = self.lock_for(session_id).await;
        let _guard = lock.lock().await;

        let session = self.load_session(session_id).await?;
        if !session.is_active() {
            return Err(CroupierError::SessionState {
                session_id,
                operation: "place a bet".to_string(),
                status: session.status.to_string(),
            });
        }

        if bets.is_empty() {
            return Err(CroupierError::Validation(
                "a round needs at least one bet".into(),
            ));
        }
        if bets.iter().any(|b| b.stake <= Decimal::ZERO) {
            return Err(CroupierError::Validation(
                "every stake must be positive".into(),
            ));
        }
        let total_stake: Decimal = bets.iter().map(|b| b.stake).sum();
        if total_stake > session.balance {
            return Err(CroupierError::InsufficientBalance {
                needed: total_stake,
                available: session.balance,
            });
        }

        let resolution = self.engine.resolve_spin(bets, winning_number)?;
        let record = BetRecord {
            round: session.rounds_played + 1,
            bets: resolution.per_bet,
            outcome: resolution.outcome,
            totals: resolution.totals,
            balance_after: session.balance + resolution.totals.net,
            placed_at: Utc::now(),
        };

        // The method sees the history *including* the round just resolved.
        let method = self.registry.get(session.method).ok_or_else(|| {
            CroupierError::Validation(format!(
                "no implementation registered for {}",
                session.method
            ))
        })?;
        let mut history = session.ledger.clone();
        history.push(record.clone());
        let next = method.execute(&MethodInput {
            last: Some(LastRound::from_record(&record)),
            history: &history,
            progression: &session.progression,
            base_amount: session.config.base_amount,
            balance: record.balance_after,
            profit: session.profit + record.totals.net,
            stop_loss: session.config.stop_loss,
            stop_win: session.config.stop_win,
            params: &session.config.params,
        })?;

        let mut updated = session.apply(SessionEvent::RoundPlayed {
            record: record.clone(),
            progression: next.progression.clone(),
        })?;

        let end_reason = if next.stop_session {
            let reason = next.end_reason.unwrap_or(EndReason::Error);
            updated = updated.apply(SessionEvent::Ended {
                reason,
                detail: next.reason.clone(),
            })?;
            Some(reason)
        } else {
            None
        };

        // Persist before anything becomes visible to the caller.
        self.repo.save(&updated).await?;

        info!(
            session_id = %session_id,
            round = record.round,
            winning = record.outcome.number,
            net = %record.totals.net,
            balance = %updated.balance,
            next_stake = %next.amount,
            ended = next.stop_session,
            "Round applied"
        );

        Ok(RoundReport {
            record,
            next,
            session_ended: end_reason.is_some(),
            end_reason,
        })
    }

    /// `Active` → `Paused`. The progression is untouched.
    pub async fn pause_session(&self, session_id: Uuid) -> Result<Session, CroupierError> {
        self.transition(session_id, SessionEvent::Paused).await
    }

    /// `Paused` → `Active`.
    pub async fn resume_session(&self, session_id: Uuid) -> Result<Session, CroupierError> {
        self.transition(session_id, SessionEvent::Resumed).await
    }

    /// End a session from any non-terminal state and return its summary.
    pub async fn end_session(
        &self,
        session_id: Uuid,
        reason: EndReason,
    ) -> Result<SessionSummary, CroupierError> {
        let ended = self
            .transition(
                session_id,
                SessionEvent::Ended {
                    reason,
                    detail: None,
                },
            )
            .await?;

        info!(
            session_id = %session_id,
            reason = %reason,
            rounds = ended.rounds_played,
            balance = %ended.balance,
            profit = %ended.profit,
            "Session ended"
        );

        Ok(SessionSummary {
            session_id: ended.id,
            total_bets: ended.rounds_played,
            final_balance: ended.balance,
            profit: ended.profit,
            duration: ended.duration(),
        })
    }

    /// Fetch a session snapshot.
    pub async fn session(&self, session_id: Uuid) -> Result<Session, CroupierError> {
        self.load_session(session_id).await
    }

    async fn transition(
        &self,
        session_id: Uuid,
        event: SessionEvent,
    ) -> Result<Session, CroupierError> {
        let lock = self.lock_for(session_id).await;
        let _guard = lock.lock().await;

        let session = self.load_session(session_id).await?;
        let updated = session.apply(event)?;
        self.repo.save(&updated).await?;
        Ok(updated)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
