use super::live_group::GroupRegistry;
use crate::errors::registry_error::RegistryError;
use crate::models::stats_payload::StatsPayload;

/// Latest stats of every live member of `group_id`, in connect order.
///
/// Member stats are read after the group lock is released, so a concurrent
/// push may or may not be reflected.
pub fn aggregate(groups: &GroupRegistry, group_id: i32) -> Result<Vec<StatsPayload>, RegistryError> {
    Ok(groups
        .snapshot_members(group_id)?
        .iter()
        .filter(|member| member.group_id() == Some(group_id))
        .map(|member| member.stats())
        .collect())
}
