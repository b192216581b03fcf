pub mod raid_group;
pub mod stats_payload;
