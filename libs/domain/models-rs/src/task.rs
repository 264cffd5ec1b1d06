// [libs/domain/models-rs/src/task.rs]
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Running,
    Paused,
    Completed,
    Exhausted,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Exhausted | TaskState::Failed
        )
    }
}

/// A leased slice: `[keyspace_offset, keyspace_offset + keyspace_limit)` of
/// an attack's total keyspace, dispatched to exactly one agent at a time.
///
/// Invariant (§3): `state = Running` implies `agent_id.is_some()` and an
/// unexpired lease; `state = Pending` implies `agent_id.is_none()`.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub attack_id: String,
    pub agent_id: Option<String>,
    #[typeshare(serialized_as = "number")]
    pub keyspace_offset: u64,
    #[typeshare(serialized_as = "number")]
    pub keyspace_limit: u64,
    pub start_date: String,
    pub activity_timestamp: String,
    pub state: TaskState,
    pub stale: bool,
    /// Set by an attack-level cancel while the task is still running; the
    /// agent observes this on its next status/heartbeat round-trip and is
    /// expected to call the confirm-cancel operation (§4.7, §5).
    pub cancel_requested: bool,
}
