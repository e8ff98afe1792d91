// src/chat/history.rs
// Session-keyed conversation buffers

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Speaker label used in the prompt transcript
    pub fn transcript_label(&self) -> &'static str {
        match self {
            Role::User => "Uživatel",
            Role::Assistant => "Asistent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One role-tagged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered turns of one session, bounded to `capacity` (oldest dropped first)
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<ConversationTurn>,
    capacity: usize,
}

impl ConversationHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        if self.turns.len() == self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    /// Always succeeds, also on an empty buffer
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Full buffer in insertion order
    pub fn turns(&self) -> Vec<ConversationTurn> {
        self.turns.iter().cloned().collect()
    }

    /// The last `window` turns as "Label: content" lines, oldest first
    pub fn transcript(&self, window: usize) -> String {
        let skip = self.turns.len().saturating_sub(window);
        self.turns
            .iter()
            .skip(skip)
            .map(|turn| format!("{}: {}", turn.role.transcript_label(), turn.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Sessions kept in memory when no limit is configured
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct SessionEntry {
    history: Arc<Mutex<ConversationHistory>>,
    last_used: AtomicU64,
}

impl SessionEntry {
    /// Nobody outside the map holds the buffer
    fn is_idle(&self) -> bool {
        Arc::strong_count(&self.history) == 1
    }
}

/// Owns every session's history. A request locks only its own session.
///
/// At most `max_sessions` buffers are kept; creating one more evicts the
/// least recently used idle session. Cleared sessions are dropped.
pub struct SessionManager {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    default_session_id: String,
    max_stored_turns: usize,
    max_sessions: usize,
    clock: AtomicU64,
}

impl SessionManager {
    /// New manager with a random default session id
    pub fn new(max_stored_turns: usize) -> Self {
        Self::with_default_session(Uuid::new_v4().to_string(), max_stored_turns)
    }

    pub fn with_default_session(default_session_id: impl Into<String>, max_stored_turns: usize) -> Self {
        let default_session_id = default_session_id.into();
        info!("Default session id: {}", default_session_id);
        Self {
            sessions: RwLock::new(HashMap::new()),
            default_session_id,
            max_stored_turns,
            max_sessions: DEFAULT_MAX_SESSIONS,
            clock: AtomicU64::new(0),
        }
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    pub fn default_session_id(&self) -> &str {
        &self.default_session_id
    }

    /// Client-supplied id, or the default one when missing or blank
    pub fn resolve(&self, session_id: Option<&str>) -> String {
        match session_id.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => self.default_session_id.clone(),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Handle to a session's history, created on first use
    pub async fn session(&self, session_id: &str) -> Arc<Mutex<ConversationHistory>> {
        if let Some(existing) = self.sessions.read().await.get(session_id) {
            existing.last_used.store(self.tick(), Ordering::Relaxed);
            return existing.history.clone();
        }

        let mut sessions = self.sessions.write().await;
        if let Some(existing) = sessions.get(session_id) {
            existing.last_used.store(self.tick(), Ordering::Relaxed);
            return existing.history.clone();
        }

        if sessions.len() >= self.max_sessions {
            Self::evict_least_recent(&mut sessions);
        }

        debug!("Creating history for session {}", session_id);
        let history = Arc::new(Mutex::new(ConversationHistory::new(self.max_stored_turns)));
        sessions.insert(
            session_id.to_string(),
            SessionEntry {
                history: history.clone(),
                last_used: AtomicU64::new(self.tick()),
            },
        );
        history
    }

    // Sessions in use by a request are skipped.
    fn evict_least_recent(sessions: &mut HashMap<String, SessionEntry>) {
        let oldest = sessions
            .iter()
            .filter(|(_, entry)| entry.is_idle())
            .min_by_key(|(_, entry)| entry.last_used.load(Ordering::Relaxed))
            .map(|(id, _)| id.clone());

        match oldest {
            Some(id) => {
                sessions.remove(&id);
                debug!("Evicted session {}", id);
            }
            None => warn!("Session limit reached and every session is busy"),
        }
    }

    /// Full history of a session; empty for unknown sessions
    pub async fn history(&self, session_id: &str) -> Vec<ConversationTurn> {
        let handle = self
            .sessions
            .read()
            .await
            .get(session_id)
            .map(|entry| entry.history.clone());
        match handle {
            Some(history) => history.lock().await.turns(),
            None => Vec::new(),
        }
    }

    /// Empty one session's history and forget the session
    pub async fn clear(&self, session_id: &str) {
        let handle = self
            .sessions
            .read()
            .await
            .get(session_id)
            .map(|entry| entry.history.clone());
        if let Some(history) = handle {
            history.lock().await.clear();
        }

        let mut sessions = self.sessions.write().await;
        if sessions.get(session_id).is_some_and(SessionEntry::is_idle) {
            sessions.remove(session_id);
        }
        info!("Conversation history cleared for session {}", session_id);
    }

    /// Empty every session's history and forget the idle sessions
    pub async fn clear_all(&self) {
        let handles: Vec<_> = self
            .sessions
            .read()
            .await
            .values()
            .map(|entry| entry.history.clone())
            .collect();
        for history in handles {
            history.lock().await.clear();
        }

        self.sessions.write().await.retain(|_, entry| !entry.is_idle());
        info!("Conversation history cleared for all sessions");
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_window_keeps_latest() {
        let mut history = ConversationHistory::new(100);
        for i in 0..6 {
            history.push(ConversationTurn::user(format!("q{}", i)));
            history.push(ConversationTurn::assistant(format!("a{}", i)));
        }

        let transcript = history.transcript(4);
        assert_eq!(transcript, "Uživatel: q4\nAsistent: a4\nUživatel: q5\nAsistent: a5");
        assert_eq!(history.len(), 12);
        assert_eq!(history.turns().len(), 12);
    }

    #[test]
    fn test_transcript_shorter_than_window() {
        let mut history = ConversationHistory::new(100);
        history.push(ConversationTurn::user("Kde jsou tabulky?"));
        assert_eq!(history.transcript(4), "Uživatel: Kde jsou tabulky?");
        assert_eq!(ConversationHistory::new(10).transcript(4), "");
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = ConversationHistory::new(3);
        for i in 0..5 {
            history.push(ConversationTurn::user(i.to_string()));
        }
        let contents: Vec<_> = history.turns().into_iter().map(|t| t.content).collect();
        assert_eq!(contents, vec!["2", "3", "4"]);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut history = ConversationHistory::new(10);
        history.clear();
        history.push(ConversationTurn::user("x"));
        history.clear();
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_value(ConversationTurn::assistant("ok")).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "ok");
    }

    #[tokio::test]
    async fn test_resolve_session_id() {
        let manager = SessionManager::with_default_session("default-id", 10);
        assert_eq!(manager.resolve(None), "default-id");
        assert_eq!(manager.resolve(Some("")), "default-id");
        assert_eq!(manager.resolve(Some("  ")), "default-id");
        assert_eq!(manager.resolve(Some("test_123")), "test_123");
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let manager = SessionManager::new(10);
        manager.session("a").await.lock().await.push(ConversationTurn::user("from a"));
        manager.session("b").await.lock().await.push(ConversationTurn::user("from b"));

        assert_eq!(manager.history("a").await, vec![ConversationTurn::user("from a")]);
        assert_eq!(manager.history("b").await, vec![ConversationTurn::user("from b")]);
        assert!(manager.history("unknown").await.is_empty());
        assert_eq!(manager.session_count().await, 2);
    }

    #[tokio::test]
    async fn test_clear_one_and_all() {
        let manager = SessionManager::new(10);
        manager.session("a").await.lock().await.push(ConversationTurn::user("1"));
        manager.session("b").await.lock().await.push(ConversationTurn::user("2"));

        manager.clear("a").await;
        assert!(manager.history("a").await.is_empty());
        assert_eq!(manager.history("b").await.len(), 1);

        manager.clear_all().await;
        manager.clear_all().await;
        manager.clear("never-seen").await;
        assert!(manager.history("b").await.is_empty());
        assert_eq!(manager.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_session_count_is_capped() {
        let manager = SessionManager::new(10).with_max_sessions(100);
        for i in 0..10_000 {
            manager.session(&format!("visitor-{}", i)).await;
        }
        assert_eq!(manager.session_count().await, 100);

        manager.clear_all().await;
        assert_eq!(manager.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_least_recent_session_is_evicted() {
        let manager = SessionManager::new(10).with_max_sessions(2);
        manager.session("a").await.lock().await.push(ConversationTurn::user("a1"));
        manager.session("b").await.lock().await.push(ConversationTurn::user("b1"));
        manager.session("a").await;

        manager.session("c").await;
        assert_eq!(manager.session_count().await, 2);
        assert_eq!(manager.history("a").await.len(), 1);
        assert!(manager.history("b").await.is_empty());
    }

    #[tokio::test]
    async fn test_busy_session_survives_eviction_and_clear() {
        let manager = SessionManager::new(10).with_max_sessions(1);
        let busy = manager.session("busy").await;
        let mut guard = busy.lock().await;
        guard.push(ConversationTurn::user("still answering"));

        manager.session("other").await;
        assert_eq!(manager.session_count().await, 2);

        drop(guard);
        manager.clear("busy").await;
        assert_eq!(manager.session_count().await, 2);
        drop(busy);
        manager.clear("busy").await;
        assert_eq!(manager.session_count().await, 1);
    }
}
