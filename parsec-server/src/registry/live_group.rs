use super::session::Session;
use super::{read, write};
use crate::errors::registry_error::RegistryError;
use chrono::{DateTime, Duration, Utc};
use log::trace;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Membership {
    sessions: Vec<Arc<Session>>,
    // Set once the group has been dropped from the registry
    retired: bool,
}

/// Sessions currently connected to one raid group, in connect order.
#[derive(Debug)]
pub struct LiveGroup {
    pub group_id: i32,
    pub name: String,
    members: RwLock<Membership>,
}

impl LiveGroup {
    pub fn new(group_id: i32, name: String) -> Self {
        LiveGroup {
            group_id,
            name,
            members: RwLock::new(Membership::default()),
        }
    }

    /// Appends an existing `session`. Returns `false` if the group was already
    /// retired.
    pub fn attach(&self, session: Arc<Session>) -> bool {
        matches!(self.attach_new(|| Ok(session)), Ok(Some(_)))
    }

    /// Runs `create` while holding the membership lock and appends the session
    /// it returns, so a session never exists in the session registry without
    /// being a member here. `Ok(None)` means the group was retired. Every
    /// append goes through here.
    pub fn attach_new<F>(&self, create: F) -> Result<Option<Arc<Session>>, RegistryError>
    where
        F: FnOnce() -> Result<Arc<Session>, RegistryError>,
    {
        let mut members = write(&self.members);
        if members.retired {
            return Ok(None);
        }

        let session = create()?;
        members.sessions.push(session.clone());
        Ok(Some(session))
    }

    /// Copies member references out. The lock is released on return, so
    /// session fields are read without it.
    pub fn members(&self) -> Vec<Arc<Session>> {
        read(&self.members).sessions.clone()
    }

    pub fn is_empty(&self) -> bool {
        read(&self.members).sessions.is_empty()
    }

    /// Removes `session` if it is still idle once the membership lock is held,
    /// and clears its group reference.
    pub(crate) fn evict_idle(
        &self,
        session: &Session,
        now: DateTime<Utc>,
        idle_timeout: Duration,
    ) -> bool {
        let mut members = write(&self.members);
        if !session.is_idle(now, idle_timeout) {
            return false;
        }

        members
            .sessions
            .retain(|member| member.token != session.token);
        session.detach();
        true
    }

    /// Marks the group retired if it has no members, handing back the held
    /// membership lock.
    fn retire_if_empty(&self) -> Option<RwLockWriteGuard<'_, Membership>> {
        let mut members = write(&self.members);
        if !members.sessions.is_empty() {
            return None;
        }

        members.retired = true;
        Some(members)
    }
}

#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<i32, Arc<LiveGroup>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        GroupRegistry::default()
    }

    pub fn get(&self, group_id: i32) -> Option<Arc<LiveGroup>> {
        read(&self.groups).get(&group_id).cloned()
    }

    pub fn get_or_create(&self, group_id: i32, name: &str) -> Arc<LiveGroup> {
        if let Some(group) = self.get(group_id) {
            return group;
        }

        let mut groups = write(&self.groups);
        // Another request may have created it between the two locks
        groups
            .entry(group_id)
            .or_insert_with(|| {
                trace!("Raid group '{name}' is now live");
                Arc::new(LiveGroup::new(group_id, name.to_string()))
            })
            .clone()
    }

    pub fn attach(&self, group_id: i32, session: Arc<Session>) -> Result<(), RegistryError> {
        let group = self.get(group_id).ok_or(RegistryError::NotFound)?;
        if group.attach(session) {
            Ok(())
        } else {
            Err(RegistryError::NotFound)
        }
    }

    pub fn snapshot_members(&self, group_id: i32) -> Result<Vec<Arc<Session>>, RegistryError> {
        let group = self.get(group_id).ok_or(RegistryError::NotFound)?;
        Ok(group.members())
    }

    /// Drops `group` from the registry if it has no members. The group's lock
    /// is taken before the registry's, and the group is marked retired so a
    /// concurrent connect holding a stale reference re-resolves it.
    pub fn remove_group(&self, group: &Arc<LiveGroup>) -> bool {
        let Some(_retired) = group.retire_if_empty() else {
            return false;
        };

        let mut groups = write(&self.groups);
        let registered = groups
            .get(&group.group_id)
            .is_some_and(|current| Arc::ptr_eq(current, group));
        if registered {
            groups.remove(&group.group_id);
        }

        registered
    }

    pub fn snapshot(&self) -> Vec<Arc<LiveGroup>> {
        read(&self.groups).values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        read(&self.groups).len()
    }

    pub fn is_empty(&self) -> bool {
        read(&self.groups).is_empty()
    }
}
