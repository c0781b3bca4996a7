use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    services::window::RecommendationWindows,
};

/// Idle time after which a browsing session is dropped
pub const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60;

/// Live sessions kept per user; creating one more drops the least recently used
pub const DEFAULT_MAX_SESSIONS_PER_USER: usize = 5;

/// One user's recommendation browsing state
#[derive(Debug)]
pub struct BrowsingSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub windows: RecommendationWindows,
}

impl BrowsingSession {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
            windows: RecommendationWindows::new(),
        }
    }
}

pub type SharedSession = Arc<Mutex<BrowsingSession>>;

struct SessionEntry {
    user_id: Uuid,
    last_used: DateTime<Utc>,
    // Tie-breaker for sessions touched within the same clock tick
    use_seq: u64,
    session: SharedSession,
}

#[derive(Default)]
struct Sessions {
    entries: HashMap<Uuid, SessionEntry>,
    seq: u64,
}

impl Sessions {
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}

/// Live browsing sessions
///
/// Each session sits behind its own mutex, so paging or refreshing one
/// session never waits on another. Ownership is checked against the map
/// entry without touching that mutex. Sessions idle longer than the TTL
/// are dropped, and each user keeps at most `max_per_user` of them.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<Sessions>>,
    ttl: Duration,
    max_per_user: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            DEFAULT_MAX_SESSIONS_PER_USER,
        )
    }
}

impl SessionRegistry {
    pub fn new(ttl: Duration, max_per_user: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(Sessions::default())),
            ttl,
            max_per_user: max_per_user.max(1),
        }
    }

    fn is_expired(&self, entry: &SessionEntry, now: DateTime<Utc>) -> bool {
        (now - entry.last_used)
            .to_std()
            .is_ok_and(|idle| idle >= self.ttl)
    }

    /// Registers a session and returns its shared handle
    ///
    /// Expired sessions are swept first. If the user is at the cap, their
    /// least recently used sessions make room for the new one.
    pub async fn insert(&self, session: BrowsingSession) -> SharedSession {
        let id = session.id;
        let user_id = session.user_id;
        let shared = Arc::new(Mutex::new(session));
        let now = Utc::now();

        let mut sessions = self.sessions.write().await;
        let before = sessions.entries.len();
        sessions
            .entries
            .retain(|_, entry| !self.is_expired(entry, now));
        let expired = before - sessions.entries.len();

        let mut owned: Vec<(u64, Uuid)> = sessions
            .entries
            .iter()
            .filter(|(_, entry)| entry.user_id == user_id)
            .map(|(session_id, entry)| (entry.use_seq, *session_id))
            .collect();
        let mut evicted = 0;
        if owned.len() >= self.max_per_user {
            owned.sort_unstable();
            let excess = owned.len() + 1 - self.max_per_user;
            for (_, session_id) in owned.into_iter().take(excess) {
                sessions.entries.remove(&session_id);
                evicted += 1;
            }
        }

        let use_seq = sessions.next_seq();
        sessions.entries.insert(
            id,
            SessionEntry {
                user_id,
                last_used: now,
                use_seq,
                session: Arc::clone(&shared),
            },
        );

        tracing::debug!(
            session_id = %id,
            user_id = %user_id,
            expired,
            evicted,
            live_sessions = sessions.entries.len(),
            "Browsing session created"
        );
        shared
    }

    /// Looks up a session owned by `user_id` and marks it as used
    pub async fn get(&self, session_id: Uuid, user_id: Uuid) -> AppResult<SharedSession> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let expired = match sessions.entries.get(&session_id) {
            Some(entry) => self.is_expired(entry, now),
            None => return Err(not_found(session_id)),
        };
        if expired {
            sessions.entries.remove(&session_id);
            tracing::debug!(session_id = %session_id, "Browsing session expired");
            return Err(not_found(session_id));
        }

        let use_seq = sessions.next_seq();
        let entry = sessions
            .entries
            .get_mut(&session_id)
            .ok_or_else(|| not_found(session_id))?;

        if entry.user_id != user_id {
            tracing::warn!(session_id = %session_id, user_id = %user_id, "Session accessed by another user");
            return Err(AppError::Forbidden(
                "Session belongs to another user".to_string(),
            ));
        }

        entry.last_used = now;
        entry.use_seq = use_seq;
        Ok(Arc::clone(&entry.session))
    }

    /// Drops a session owned by `user_id`
    pub async fn remove(&self, session_id: Uuid, user_id: Uuid) -> AppResult<()> {
        self.get(session_id, user_id).await?;
        self.sessions.write().await.entries.remove(&session_id);
        tracing::debug!(session_id = %session_id, "Browsing session removed");
        Ok(())
    }

    /// Number of sessions held, including any not yet swept
    pub async fn len(&self) -> usize {
        self.sessions.read().await.entries.len()
    }
}

fn not_found(session_id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {} not found", session_id))
}
