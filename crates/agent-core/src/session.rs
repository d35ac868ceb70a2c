//! Session Management
//!
//! A session is one conversation: its id, its [`ConversationContext`], and
//! some bookkeeping. Each session sits behind its own mutex so turns of one
//! conversation run one at a time while separate conversations proceed in
//! parallel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::context::ConversationContext;

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,

    /// Cross-turn scratchpad
    pub context: ConversationContext,

    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,

    /// Completed turns
    pub turns: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    pub fn with_id(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            context: ConversationContext::new(),
            created_at: now,
            updated_at: now,
            turns: 0,
        }
    }

    /// Record a finished turn
    pub fn touch(&mut self) {
        self.turns += 1;
        self.updated_at = Utc::now();
    }

    /// Time since creation
    pub fn duration(&self) -> chrono::Duration {
        self.updated_at - self.created_at
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

/// Idle time after which a conversation is forgotten
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Conversations kept at once
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

/// In-memory session store.
///
/// Idle sessions are swept whenever a new one is created, and the oldest
/// idle ones go first once the store is full. A session locked by a running
/// turn is never evicted.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SharedSession>>,
    idle_timeout: chrono::Duration,
    max_sessions: usize,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS)
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout: chrono::Duration::from_std(idle_timeout)
                .unwrap_or(chrono::Duration::MAX),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Fetch the session for `id`, creating it when absent or when no id is
    /// given.
    pub async fn open(&self, id: Option<SessionId>) -> (SessionId, SharedSession) {
        let id = id.unwrap_or_default();

        if let Some(session) = self.sessions.read().await.get(&id) {
            return (id, Arc::clone(session));
        }

        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get(&id) {
            return (id, Arc::clone(session));
        }

        self.evict(&mut sessions);
        tracing::debug!(session = %id, "Opening session");
        let session = Arc::new(Mutex::new(Session::with_id(id.clone())));
        sessions.insert(id.clone(), Arc::clone(&session));
        (id, session)
    }

    /// Drop idle sessions now; returns how many went
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        self.sweep_idle(&mut sessions);
        before - sessions.len()
    }

    pub async fn get(&self, id: &SessionId) -> Option<SharedSession> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &SessionId) -> Option<SharedSession> {
        self.sessions.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Make room for one more session
    fn evict(&self, sessions: &mut HashMap<SessionId, SharedSession>) {
        self.sweep_idle(sessions);

        if sessions.len() < self.max_sessions {
            return;
        }

        let mut idle: Vec<(DateTime<Utc>, SessionId)> = sessions
            .iter()
            .filter_map(|(id, session)| {
                let updated_at = session.try_lock().ok()?.updated_at;
                Some((updated_at, id.clone()))
            })
            .collect();
        idle.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let excess = sessions.len() + 1 - self.max_sessions;
        for (_, id) in idle.into_iter().take(excess) {
            sessions.remove(&id);
        }
        tracing::debug!(remaining = sessions.len(), "Session store full, evicted oldest");
    }

    fn sweep_idle(&self, sessions: &mut HashMap<SessionId, SharedSession>) {
        let cutoff = Utc::now()
            .checked_sub_signed(self.idle_timeout)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        // In-use sessions are locked and always kept
        sessions.retain(|_, session| {
            session
                .try_lock()
                .map_or(true, |session| session.updated_at > cutoff)
        });
    }
}
