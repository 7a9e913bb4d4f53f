//! Session state machine — events and the pure reducer.
//!
//! Every mutation of a session goes through `Session::apply`, a pure
//! `(state, event) → new state` fold. The orchestrator decides *which*
//! events to emit; this module only knows which transitions are legal.
//! Keeping the reducer pure makes the whole machine testable by replaying
//! event sequences.

use chrono::Utc;

use crate::types::{
    BetRecord, CroupierError, EndReason, Progression, Session, SessionStatus,
};

/// A state transition applied to a session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// `Created` → `Active`. Fires exactly once, at creation.
    Activated,
    /// One resolved round: the ledger entry to append plus the progression
    /// that replaces the current one.
    RoundPlayed {
        record: BetRecord,
        progression: Progression,
    },
    Paused,
    Resumed,
    /// Any non-terminal state → `Ended`.
    Ended {
        reason: EndReason,
        detail: Option<String>,
    },
}

impl Session {
    /// Fold one event into this session, returning the successor state.
    ///
    /// Illegal transitions come back as `SessionState` errors and leave the
    /// input untouched.
    pub fn apply(&self, event: SessionEvent) -> Result<Session, CroupierError> {
        let mut next = self.clone();
        next.updated_at = Utc::now();

        match event {
            SessionEvent::Activated => {
                if self.status != SessionStatus::Created {
                    return Err(self.state_error("activate"));
                }
                next.status = SessionStatus::Active;
            }
            SessionEvent::RoundPlayed {
                record,
                progression,
            } => {
                if self.status != SessionStatus::Active {
                    return Err(self.state_error("place a bet"));
                }
                next.rounds_played += 1;
                next.balance += record.totals.net;
                next.profit += record.totals.net;
                next.progression = progression;
                next.ledger.push(record);
            }
            SessionEvent::Paused => {
                if self.status != SessionStatus::Active {
                    return Err(self.state_error("pause"));
                }
                next.status = SessionStatus::Paused;
            }
            SessionEvent::Resumed => {
                if self.status != SessionStatus::Paused {
                    return Err(self.state_error("resume"));
                }
                next.status = SessionStatus::Active;
            }
            SessionEvent::Ended { reason, detail } => {
                if self.status.is_terminal() {
                    return Err(self.state_error("end"));
                }
                next.status = SessionStatus::Ended { reason };
                next.stop_detail = detail;
            }
        }

        Ok(next)
    }

    fn state_error(&self, operation: &str) -> CroupierError {
        CroupierError::SessionState {
            session_id: self.id,
            operation: operation.to_string(),
            status: self.status.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
