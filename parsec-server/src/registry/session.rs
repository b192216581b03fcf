use super::{lock, read, write};
use crate::errors::registry_error::RegistryError;
use crate::models::stats_payload::StatsPayload;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

#[derive(Debug)]
struct SessionState {
    last_activity: DateTime<Utc>,
    group_id: Option<i32>,
    stats: StatsPayload,
}

/// One connected client, identified by its token.
#[derive(Debug)]
pub struct Session {
    pub token: Arc<str>,
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new(token: Arc<str>, group_id: i32, now: DateTime<Utc>) -> Self {
        Session {
            token,
            state: Mutex::new(SessionState {
                last_activity: now,
                group_id: Some(group_id),
                stats: StatsPayload::default(),
            }),
        }
    }

    /// Moves the activity timestamp forward. Older readings are ignored.
    pub fn touch(&self, now: DateTime<Utc>) {
        let mut state = lock(&self.state);
        if now > state.last_activity {
            state.last_activity = now;
        }
    }

    pub fn set_stats(&self, stats: StatsPayload) {
        lock(&self.state).stats = stats;
    }

    pub fn stats(&self) -> StatsPayload {
        lock(&self.state).stats.clone()
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        lock(&self.state).last_activity
    }

    /// The owning group, or `None` once the session has been evicted.
    pub fn group_id(&self) -> Option<i32> {
        lock(&self.state).group_id
    }

    pub fn is_idle(&self, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
        now - self.last_activity() > idle_timeout
    }

    pub(crate) fn detach(&self) -> Option<i32> {
        lock(&self.state).group_id.take()
    }
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Arc<str>, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry::default()
    }

    pub fn create(
        &self,
        token: Arc<str>,
        group_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Arc<Session>, RegistryError> {
        let mut sessions = write(&self.sessions);
        if sessions.contains_key(&token) {
            return Err(RegistryError::DuplicateToken);
        }

        let session = Arc::new(Session::new(token.clone(), group_id, now));
        sessions.insert(token, session.clone());
        Ok(session)
    }

    pub fn lookup(&self, token: &str) -> Result<Arc<Session>, RegistryError> {
        read(&self.sessions)
            .get(token)
            .cloned()
            .ok_or(RegistryError::NotFound)
    }

    /// Looks the session up and refreshes its activity. The map lock is
    /// released before the session itself is touched.
    pub fn touch(&self, token: &str, now: DateTime<Utc>) -> Result<Arc<Session>, RegistryError> {
        let session = self.lookup(token)?;
        session.touch(now);
        Ok(session)
    }

    /// Callers detach the session from its group first.
    pub fn remove(&self, token: &str) -> Option<Arc<Session>> {
        write(&self.sessions).remove(token)
    }

    pub fn snapshot(&self) -> Vec<Arc<Session>> {
        read(&self.sessions).values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        read(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        read(&self.sessions).is_empty()
    }
}
