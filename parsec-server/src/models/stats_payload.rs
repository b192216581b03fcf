use serde::{Deserialize, Serialize};

/// Latest telemetry pushed by one client. Stored and returned verbatim.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct StatsPayload {
    pub character_name: String,
    pub class_name: String,
    pub encounter_id: u32,
    pub combat_start: i64,
    pub combat_ticks: u32,
    pub damage_out: u64,
    pub damage_in: u64,
    pub healing_out: u64,
    pub healing_in: u64,
    pub effective_healing_out: u64,
    pub threat_out: u64,
}
