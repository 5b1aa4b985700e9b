//! Session bridge between the submission flow and the dashboard
//!
//! A submission creates an [`AnalysisSession`] and the dashboard is reached
//! with its id in the URL. Sessions expire after a fixed TTL; an expired
//! session reads exactly like a missing one.
//!
//! [`BridgeEntries`] is the flat three-key form (`documentName`,
//! `fullDocumentText`, `analysisResult`) for clients that still hand state
//! around as string pairs.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use shared_types::{AnalysisResult, DecodeError};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::chat::{ChatMessage, ChatState};

pub const KEY_DOCUMENT_NAME: &str = "documentName";
pub const KEY_FULL_DOCUMENT_TEXT: &str = "fullDocumentText";
pub const KEY_ANALYSIS_RESULT: &str = "analysisResult";

/// Default session lifetime
pub const DEFAULT_TTL_MINUTES: i64 = 60;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("No analysis data found")]
    Missing,

    #[error("Invalid session id '{0}'")]
    InvalidId(String),

    #[error("Session {0} has expired")]
    Expired(SessionId),

    #[error("Bridge entry '{0}' is missing")]
    MissingKey(&'static str),

    #[error(transparent)]
    Malformed(#[from] DecodeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(SessionId)
            .map_err(|_| BridgeError::InvalidId(s.to_string()))
    }
}

/// Everything the dashboard needs, handed over from the submission flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSession {
    pub id: SessionId,
    pub document_name: String,
    /// Chat context; empty for binary uploads
    pub full_document_text: String,
    pub result: AnalysisResult,
    pub transcript: Vec<ChatMessage>,
    /// Questions sent but not yet answered
    pub pending_questions: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AnalysisSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn chat_state(&self) -> ChatState {
        if self.pending_questions > 0 {
            ChatState::AwaitingResponse
        } else {
            ChatState::Idle
        }
    }
}

/// In-memory session store shared by all request handlers
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<SessionId, AnalysisSession>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_TTL_MINUTES))
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored sessions, expired ones included until purged
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Store a finished analysis and return the id to navigate with
    pub fn create(
        &self,
        document_name: impl Into<String>,
        full_document_text: impl Into<String>,
        result: AnalysisResult,
    ) -> SessionId {
        let now = Utc::now();
        let session = AnalysisSession {
            id: SessionId::new(),
            document_name: document_name.into(),
            full_document_text: full_document_text.into(),
            result,
            transcript: Vec::new(),
            pending_questions: 0,
            created_at: now,
            expires_at: now + self.ttl,
        };
        let id = session.id;

        info!("Created session {} for {}", id, session.document_name);
        self.sessions.insert(id, session);
        id
    }

    /// Snapshot of a live session
    pub fn get(&self, id: &SessionId) -> Result<AnalysisSession, BridgeError> {
        let now = Utc::now();
        let session = self.sessions.get(id).ok_or(BridgeError::Missing)?.clone();

        if session.is_expired(now) {
            self.sessions.remove(id);
            debug!("Session {} expired", id);
            return Err(BridgeError::Expired(*id));
        }

        Ok(session)
    }

    /// Look a session up from the raw `session` query value
    pub fn lookup(&self, raw_id: Option<&str>) -> Result<AnalysisSession, BridgeError> {
        let raw_id = raw_id.ok_or(BridgeError::Missing)?;
        let id: SessionId = raw_id.parse()?;
        self.get(&id)
    }

    /// Apply a change to a live session
    pub fn update<F>(&self, id: &SessionId, change: F) -> Result<(), BridgeError>
    where
        F: FnOnce(&mut AnalysisSession),
    {
        let now = Utc::now();
        let mut entry = self.sessions.get_mut(id).ok_or(BridgeError::Missing)?;
        if entry.is_expired(now) {
            drop(entry);
            self.sessions.remove(id);
            return Err(BridgeError::Expired(*id));
        }
        change(&mut *entry);
        Ok(())
    }

    pub fn remove(&self, id: &SessionId) -> Option<AnalysisSession> {
        self.sessions.remove(id).map(|(_, session)| session)
    }

    /// Drop expired sessions, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired(now));
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            debug!("Purged {} expired sessions", purged);
        }
        purged
    }

    /// Flat key/value view of a session
    pub fn export_entries(&self, id: &SessionId) -> Result<BridgeEntries, BridgeError> {
        let session = self.get(id)?;
        BridgeEntries::from_session(&session)
    }

    /// Create a session from flat key/value state
    pub fn import_entries(&self, entries: &BridgeEntries) -> Result<SessionId, BridgeError> {
        let (name, text, result) = entries.to_parts()?;
        Ok(self.create(name, text, result))
    }
}

/// The three string entries of the legacy tab-storage bridge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BridgeEntries(BTreeMap<String, String>);

impl BridgeEntries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn from_session(session: &AnalysisSession) -> Result<Self, BridgeError> {
        let mut entries = Self::new();
        entries.set(KEY_DOCUMENT_NAME, session.document_name.clone());
        entries.set(KEY_FULL_DOCUMENT_TEXT, session.full_document_text.clone());
        entries.set(KEY_ANALYSIS_RESULT, session.result.to_json()?);
        Ok(entries)
    }

    /// Split into name, document text and decoded result.
    ///
    /// `documentName` and `analysisResult` are required; a missing
    /// `fullDocumentText` reads as empty.
    pub fn to_parts(&self) -> Result<(String, String, AnalysisResult), BridgeError> {
        let name = self
            .get(KEY_DOCUMENT_NAME)
            .filter(|v| !v.is_empty())
            .ok_or(BridgeError::MissingKey(KEY_DOCUMENT_NAME))?;
        let raw_result = self
            .get(KEY_ANALYSIS_RESULT)
            .filter(|v| !v.is_empty())
            .ok_or(BridgeError::MissingKey(KEY_ANALYSIS_RESULT))?;
        let text = self.get(KEY_FULL_DOCUMENT_TEXT).unwrap_or_default();

        let result = AnalysisResult::from_json(raw_result)?;
        Ok((name.to_string(), text.to_string(), result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatMessage;
    use pretty_assertions::assert_eq;

    fn result() -> AnalysisResult {
        AnalysisResult {
            summary: "A lease.".to_string(),
            risk_flags: vec![],
            key_clauses: vec![],
        }
    }

    #[test]
    fn test_create_then_get() {
        let store = SessionStore::default();
        let id = store.create("Lease.pdf", "full text", result());

        let session = store.get(&id).unwrap();
        assert_eq!(session.document_name, "Lease.pdf");
        assert_eq!(session.full_document_text, "full text");
        assert_eq!(session.result, result());
        assert_eq!(session.chat_state(), ChatState::Idle);
    }

    #[test]
    fn test_unknown_session_is_missing() {
        let store = SessionStore::default();
        assert!(matches!(store.get(&SessionId::new()), Err(BridgeError::Missing)));
        assert!(matches!(store.lookup(None), Err(BridgeError::Missing)));
        assert!(matches!(
            store.lookup(Some("not-a-uuid")),
            Err(BridgeError::InvalidId(_))
        ));
    }

    #[test]
    fn test_expired_session_reads_as_gone() {
        let store = SessionStore::new(Duration::zero());
        let id = store.create("Lease.pdf", "", result());

        assert!(matches!(store.get(&id), Err(BridgeError::Expired(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_purge_removes_only_expired() {
        let expired = SessionStore::new(Duration::zero());
        expired.create("a", "", result());
        expired.create("b", "", result());
        assert_eq!(expired.purge_expired(), 2);

        let live = SessionStore::default();
        live.create("a", "", result());
        assert_eq!(live.purge_expired(), 0);
        assert_eq!(live.len(), 1);
    }

    #[test]
    fn test_update_appends_to_transcript() {
        let store = SessionStore::default();
        let id = store.create("Lease.pdf", "", result());

        store
            .update(&id, |s| s.transcript.push(ChatMessage::user("hello")))
            .unwrap();

        assert_eq!(store.get(&id).unwrap().transcript.len(), 1);
    }

    #[test]
    fn test_entries_round_trip_through_store() {
        let store = SessionStore::default();
        let id = store.create("Lease.pdf", "lease body", result());

        let entries = store.export_entries(&id).unwrap();
        assert_eq!(entries.get(KEY_DOCUMENT_NAME), Some("Lease.pdf"));
        assert_eq!(entries.get(KEY_FULL_DOCUMENT_TEXT), Some("lease body"));
        assert!(entries.get(KEY_ANALYSIS_RESULT).unwrap().contains("A lease."));

        let copy = store.import_entries(&entries).unwrap();
        assert_ne!(copy, id);
        assert_eq!(store.get(&copy).unwrap().document_name, "Lease.pdf");
    }

    #[test]
    fn test_entries_require_name_and_result() {
        let mut entries = BridgeEntries::new();
        entries.set(KEY_ANALYSIS_RESULT, r#"{"summary": "s"}"#);
        assert!(matches!(
            entries.to_parts(),
            Err(BridgeError::MissingKey(KEY_DOCUMENT_NAME))
        ));

        let mut entries = BridgeEntries::new();
        entries.set(KEY_DOCUMENT_NAME, "Lease.pdf");
        assert!(matches!(
            entries.to_parts(),
            Err(BridgeError::MissingKey(KEY_ANALYSIS_RESULT))
        ));
    }

    #[test]
    fn test_entries_reject_malformed_result() {
        let mut entries = BridgeEntries::new();
        entries.set(KEY_DOCUMENT_NAME, "Lease.pdf");
        entries.set(KEY_ANALYSIS_RESULT, "{not json");
        assert!(matches!(entries.to_parts(), Err(BridgeError::Malformed(_))));
    }
}
