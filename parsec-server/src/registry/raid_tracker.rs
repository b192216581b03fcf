use super::aggregator;
use super::live_group::GroupRegistry;
use super::session::{Session, SessionRegistry};
use super::sweeper::Sweeper;
use crate::directory::GroupDirectory;
use crate::errors::registry_error::RegistryError;
use crate::models::stats_payload::StatsPayload;
use chrono::{DateTime, Duration, Utc};
use log::{trace, warn};
use rand::distr::SampleString;
use rand_distr::Alphanumeric;
use std::sync::Arc;

const TOKEN_LENGTH: usize = 32;

/// Produces candidate session tokens. Uniqueness is checked by the session
/// registry, so a source may repeat itself.
pub type TokenSource = Box<dyn Fn() -> Arc<str> + Send + Sync>;

fn random_token() -> Arc<str> {
    Alphanumeric
        .sample_string(&mut rand::rng(), TOKEN_LENGTH)
        .into()
}

/// Entry point for request handlers: connects clients to their raid group and
/// exchanges stats with them.
pub struct RaidTracker {
    directory: Arc<dyn GroupDirectory>,
    sessions: Arc<SessionRegistry>,
    groups: Arc<GroupRegistry>,
    generate_token: TokenSource,
}

impl RaidTracker {
    pub fn new(directory: Arc<dyn GroupDirectory>) -> Self {
        RaidTracker::with_token_source(directory, Box::new(random_token))
    }

    pub fn with_token_source(directory: Arc<dyn GroupDirectory>, generate_token: TokenSource) -> Self {
        RaidTracker {
            directory,
            sessions: Arc::new(SessionRegistry::new()),
            groups: Arc::new(GroupRegistry::new()),
            generate_token,
        }
    }

    pub fn directory(&self) -> &dyn GroupDirectory {
        self.directory.as_ref()
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    /// A sweeper over this tracker's registries.
    pub fn sweeper(&self, idle_timeout: Duration) -> Sweeper {
        Sweeper::new(self.sessions.clone(), self.groups.clone(), idle_timeout)
    }

    pub fn connect(&self, name: &str, password: &str) -> Result<Arc<str>, RegistryError> {
        self.connect_at(name, password, Utc::now())
    }

    /// Authenticates against the group directory and returns a fresh token
    /// for a session attached to the group's live entry.
    pub fn connect_at(
        &self,
        name: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Arc<str>, RegistryError> {
        let group_id = self
            .directory
            .authenticate(name, password)?
            .ok_or(RegistryError::Unauthorized)?;

        loop {
            let group = self.groups.get_or_create(group_id, name);
            // Session registry lock is only ever taken inside the group lock
            if let Some(session) = group.attach_new(|| self.create_session(group_id, now))? {
                trace!("Client connected to raid group '{}'", group.name);
                return Ok(session.token.clone());
            }

            trace!("Raid group '{name}' was reclaimed while connecting, retrying");
        }
    }

    fn create_session(&self, group_id: i32, now: DateTime<Utc>) -> Result<Arc<Session>, RegistryError> {
        loop {
            let token = (self.generate_token)();
            match self.sessions.create(token, group_id, now) {
                Err(RegistryError::DuplicateToken) => warn!("Token collision, regenerating"),
                result => return result,
            }
        }
    }

    pub fn push_and_get_stats(
        &self,
        token: &str,
        payload: Option<StatsPayload>,
    ) -> Result<Vec<StatsPayload>, RegistryError> {
        self.push_and_get_stats_at(token, payload, Utc::now())
    }

    /// Stores `payload` as the session's latest stats, if given, and returns
    /// the stats of every member of its group.
    pub fn push_and_get_stats_at(
        &self,
        token: &str,
        payload: Option<StatsPayload>,
        now: DateTime<Utc>,
    ) -> Result<Vec<StatsPayload>, RegistryError> {
        let session = self
            .sessions
            .touch(token, now)
            .or(Err(RegistryError::InvalidToken))?;

        if let Some(payload) = payload {
            session.set_stats(payload);
        }

        // Evicted between lookup and here
        let group_id = session.group_id().ok_or(RegistryError::InvalidToken)?;
        aggregator::aggregate(&self.groups, group_id).or(Err(RegistryError::InvalidToken))
    }
}
