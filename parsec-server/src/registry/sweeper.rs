use super::live_group::GroupRegistry;
use super::session::SessionRegistry;
use chrono::{DateTime, Duration, Utc};
use log::{info, trace};
use std::sync::Arc;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub sessions_evicted: usize,
    pub groups_evicted: usize,
}

/// Evicts idle sessions, then groups left without members.
pub struct Sweeper {
    sessions: Arc<SessionRegistry>,
    groups: Arc<GroupRegistry>,
    idle_timeout: Duration,
}

impl Sweeper {
    pub fn new(
        sessions: Arc<SessionRegistry>,
        groups: Arc<GroupRegistry>,
        idle_timeout: Duration,
    ) -> Self {
        Sweeper {
            sessions,
            groups,
            idle_timeout,
        }
    }

    /// Sweeps every `interval` until the process exits.
    pub async fn run(self, interval: std::time::Duration) {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let report = self.sweep();
            if report != SweepReport::default() {
                info!(
                    "Reclaimed {} idle sessions and {} empty raid groups",
                    report.sessions_evicted, report.groups_evicted
                );
            }
        }
    }

    pub fn sweep(&self) -> SweepReport {
        self.sweep_at(Utc::now())
    }

    pub fn sweep_at(&self, now: DateTime<Utc>) -> SweepReport {
        SweepReport {
            sessions_evicted: self.sweep_sessions(now),
            groups_evicted: self.sweep_groups(),
        }
    }

    fn sweep_sessions(&self, now: DateTime<Utc>) -> usize {
        let idle = self
            .sessions
            .snapshot()
            .into_iter()
            .filter(|session| session.is_idle(now, self.idle_timeout));

        let mut evicted = 0;
        for session in idle {
            // Group lock first, released before the session registry lock
            let detached = match session.group_id().and_then(|id| self.groups.get(id)) {
                Some(group) => group.evict_idle(&session, now, self.idle_timeout),
                None => {
                    session.detach();
                    true
                }
            };

            if !detached {
                trace!("Session became active during sweep, keeping it");
                continue;
            }

            if self.sessions.remove(&session.token).is_some() {
                evicted += 1;
            }
        }

        evicted
    }

    fn sweep_groups(&self) -> usize {
        let mut evicted = 0;
        for group in self.groups.snapshot() {
            if self.groups.remove_group(&group) {
                trace!("Raid group '{}' has no members left", group.name);
                evicted += 1;
            }
        }

        evicted
    }
}
