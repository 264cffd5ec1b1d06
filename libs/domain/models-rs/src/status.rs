// [libs/domain/models-rs/src/status.rs]
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Per-device line of a hashcat status frame. `temperature = -1` means
/// unmonitored (no sensor, or the agent's platform doesn't expose one).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    #[typeshare(serialized_as = "number")]
    pub speed: u64,
    pub utilization: u32,
    pub temperature: i32,
}

/// One progress frame from a running task. Bounded-history at the store
/// layer: only the most recent N per task survive (§3, default 10).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashcatStatus {
    pub task_id: String,
    pub received_at: String,
    pub session: String,
    pub status_code: u32,
    pub target: String,
    /// `[done, total]`
    #[typeshare(serialized_as = "[number, number]")]
    pub progress: [u64; 2],
    #[typeshare(serialized_as = "number")]
    pub restore_point: u64,
    pub recovered_hashes: Vec<u64>,
    pub recovered_salts: Vec<u64>,
    pub rejected: u64,
    pub devices: Vec<DeviceStatus>,
    pub time_start: String,
    pub estimated_stop: Option<String>,
    pub hashcat_guess: Option<serde_json::Value>,
}

impl HashcatStatus {
    /// `progress[0] / progress[1]` (done / total) bounded `[0.0, 100.0]`.
    pub fn progress_percentage(&self) -> f64 {
        let [done, total] = self.progress;
        if total == 0 {
            return 0.0;
        }
        ((done as f64 / total as f64) * 100.0).clamp(0.0, 100.0)
    }
}
