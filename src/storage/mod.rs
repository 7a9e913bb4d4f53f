//! Persistence layer.
//!
//! The core never talks to storage directly: the orchestrator exchanges
//! whole `Session` snapshots through the `SessionRepository` trait. Two
//! implementations ship with the crate — an in-memory map for tests and
//! embedding, and a JSON-file store (one pretty-printed snapshot per
//! session). SQLite can be slotted in later behind the same trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::types::Session;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Infrastructure failures. Kept separate from the domain taxonomy so a
/// caller can tell "retry-safe" apart from "must fix input".
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session snapshot: {0}")]
    Corrupt(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Repository contract
// ---------------------------------------------------------------------------

/// Whole-snapshot session persistence.
///
/// `save` must be atomic relative to the caller's in-memory transition: the
/// orchestrator only exposes a new session state after `save` returns Ok.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Load a session by id. `None` when no such session exists.
    async fn load(&self, id: Uuid) -> Result<Option<Session>, StorageError>;

    /// Persist a full session snapshot, replacing any previous one.
    async fn save(&self, session: &Session) -> Result<(), StorageError>;

    /// Find a user's non-terminal session, if any.
    async fn find_active(&self, user_id: &str) -> Result<Option<Session>, StorageError>;
}

// ---------------------------------------------------------------------------
// In-memory repository
// ---------------------------------------------------------------------------

/// Map-backed repository for tests and embedded use.
#[derive(Default)]
pub struct MemoryRepository {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionRepository for MemoryRepository {
    async fn load(&self, id: Uuid) -> Result<Option<Session>, StorageError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn save(&self, session: &Session) -> Result<(), StorageError> {
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        debug!(session_id = %session.id, status = %session.status, "Session saved (memory)");
        Ok(())
    }

    async fn find_active(&self, user_id: &str) -> Result<Option<Session>, StorageError> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .find(|s| s.user_id == user_id && !s.status.is_terminal())
            .cloned())
    }
}

// ---------------------------------------------------------------------------
// JSON-file repository
// ---------------------------------------------------------------------------

/// One JSON snapshot per session under a data directory.
pub struct JsonFileRepository {
    dir: PathBuf,
}

impl JsonFileRepository {
    /// Open (and create if needed) a repository rooted at `dir`.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        info!(dir = %dir.display(), "Session store opened");
        Ok(Self { dir })
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    async fn read_snapshot(path: &Path) -> Result<Session, StorageError> {
        let json = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[async_trait]
impl SessionRepository for JsonFileRepository {
    async fn load(&self, id: Uuid) -> Result<Option<Session>, StorageError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(Self::read_snapshot(&path).await?))
    }

    async fn save(&self, session: &Session) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(session)?;
        // Write to a temp file first so a crash mid-write never leaves a
        // truncated snapshot behind.
        let path = self.path_for(session.id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(
            session_id = %session.id,
            status = %session.status,
            balance = %session.balance,
            "Session saved"
        );
        Ok(())
    }

    async fn find_active(&self, user_id: &str) -> Result<Option<Session>, StorageError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let session = Self::read_snapshot(&path).await?;
            if session.user_id == user_id && !session.status.is_terminal() {
                return Ok(Some(session));
            }
        }
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
