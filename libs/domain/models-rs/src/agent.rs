// [libs/domain/models-rs/src/agent.rs]
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Pending,
    Active,
    Stopped,
    Error,
}

/// One compute device reported at registration (a GPU or CPU core group).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub index: u32,
    pub name: String,
    pub device_type: String,
}

/// A remote worker running hashcat, registered with a long-lived `csa_`
/// token. `advanced_config` is opaque passthrough JSON the agent and
/// operator UI agree on; the core never interprets its contents.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub host_name: String,
    pub client_signature: String,
    pub operating_system: String,
    pub devices: Vec<Device>,
    pub token: String,
    pub state: AgentState,
    pub last_seen_at: Option<String>,
    pub last_ipaddress: Option<String>,
    pub project_ids: Vec<String>,
    pub advanced_config: serde_json::Value,
}

/// A recent speed measurement for one `(agent, hash_type, device)` tuple.
/// The Matcher (§4.2) only trusts benchmarks measured inside the
/// configured freshness window.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Benchmark {
    pub agent_id: String,
    pub hash_type_id: i32,
    pub device_index: u32,
    #[typeshare(serialized_as = "number")]
    pub hash_speed: u64,
    #[typeshare(serialized_as = "number")]
    pub runtime_ms: u64,
    pub measured_at: String,
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentErrorSeverity {
    Info,
    Warning,
    Minor,
    Major,
    Fatal,
}

impl AgentErrorSeverity {
    /// Only a fatal report drives the task's `error` transition (§C7).
    pub fn is_fatal(self) -> bool {
        matches!(self, AgentErrorSeverity::Fatal)
    }
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentError {
    pub id: String,
    pub agent_id: String,
    pub severity: AgentErrorSeverity,
    pub message: String,
    pub task_id: Option<String>,
    pub recorded_at: String,
    pub context_json: Option<serde_json::Value>,
}
