// [libs/domain/models-rs/src/wire.rs]
//! Wire DTOs for the Agent API (§6, §6.2). Kept separate from the entity
//! structs in the sibling modules: entities are the store's shape, DTOs are
//! the wire's shape, and the two are allowed to drift (e.g. the DTO's
//! `attack_mode_hashcat` field has no entity-side counterpart — it is
//! derived at serialization time from `AttackMode::hashcat_mode`).

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::agent::Device;

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackResourceFileDto {
    pub id: String,
    pub download_url: String,
    /// Base64-encoded MD5, matching hashcat agents' existing checksum
    /// verification step.
    pub checksum: String,
    pub file_name: String,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackDto {
    pub id: String,
    pub attack_mode: String,
    pub attack_mode_hashcat: u8,
    pub mask: String,
    pub increment_mode: bool,
    pub increment_minimum: u32,
    pub increment_maximum: u32,
    pub optimized: bool,
    pub slow_candidate_generators: bool,
    pub workload_profile: u8,
    pub disable_markov: bool,
    pub classic_markov: bool,
    pub markov_threshold: u32,
    pub left_rule: String,
    pub right_rule: String,
    pub custom_charset_1: String,
    pub custom_charset_2: String,
    pub custom_charset_3: String,
    pub custom_charset_4: String,
    pub hash_list_id: String,
    pub hash_mode: i32,
    pub word_list: Option<AttackResourceFileDto>,
    pub rule_list: Option<AttackResourceFileDto>,
    pub mask_list: Option<AttackResourceFileDto>,
    pub hash_list_url: String,
    pub hash_list_checksum: String,
    pub url: String,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDto {
    pub id: String,
    pub attack_id: String,
    pub start_date: String,
    pub status: String,
    #[typeshare(serialized_as = "number")]
    pub skip: Option<i64>,
    #[typeshare(serialized_as = "number")]
    pub limit: Option<i64>,
}

/// `GET /client/tasks/next` response. Exactly one variant is ever populated.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NextTaskResponse {
    Task(TaskDto),
    Status { status: NextTaskStatus },
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NextTaskStatus {
    NoWork,
    BenchmarkRequired,
}

#[typeshare]
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterAgentRequest {
    pub invitation_token: String,
    pub host_name: String,
    pub client_signature: String,
    pub operating_system: String,
    pub devices: Vec<Device>,
}

#[typeshare]
#[derive(Debug, Clone, Serialize)]
pub struct RegisterAgentResponse {
    pub agent_id: String,
    pub token: String,
    pub projects: Vec<String>,
}

#[typeshare]
#[derive(Debug, Clone, Deserialize)]
pub struct HashcatBenchmarkEntry {
    pub hash_type_id: i32,
    pub device_index: u32,
    #[typeshare(serialized_as = "number")]
    pub hash_speed: u64,
    #[typeshare(serialized_as = "number")]
    pub runtime_ms: u64,
}

#[typeshare]
#[derive(Debug, Clone, Deserialize)]
pub struct HeartbeatRequest {
    pub state: Option<String>,
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentCommand {
    Continue,
    Pause,
    Stop,
    Backoff,
}

#[typeshare]
#[derive(Debug, Clone, Serialize)]
pub struct HeartbeatResponse {
    pub command: AgentCommand,
    #[typeshare(serialized_as = "number")]
    pub backoff_seconds: Option<u32>,
    /// Tasks this agent holds that an operator has cancelled (§4.7, §5) —
    /// the agent should stop each one and call the confirm-cancel operation.
    pub cancel_task_ids: Vec<String>,
}

/// `POST /client/tasks/:id/submit_status` response — cheap enough to fold
/// the cancel signal into the same round-trip rather than wait for the next
/// heartbeat.
#[typeshare]
#[derive(Debug, Clone, Serialize)]
pub struct SubmitStatusResponse {
    pub cancel_requested: bool,
}

#[typeshare]
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitCrackEntry {
    pub timestamp: String,
    pub hash: String,
    pub plain_text: String,
}

#[typeshare]
#[derive(Debug, Clone, Deserialize)]
pub struct ReportErrorRequest {
    pub severity: String,
    pub message: String,
    pub task_id: Option<String>,
    pub context: Option<serde_json::Value>,
}
