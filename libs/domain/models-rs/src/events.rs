// [libs/domain/models-rs/src/events.rs]
//! Event contract for the internal broadcast bus. An implementation of
//! §9's "uniform, failure-isolating event broadcast hook": every cascade
//! effect that should be observable outside the transaction that produced
//! it is expressed as one of these variants, fire-and-forget, over the
//! orchestrator's `EventBus`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use typeshare::typeshare;

/// Unified log entry, independent of `tracing`'s own output — this is the
/// structured record an operator-facing surface could subscribe to, not a
/// replacement for `tracing`'s stdout/JSON sink.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemLog {
    pub id: String,
    pub timestamp: String,
    pub component: String,
    pub severity: String,
    pub message: String,
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

/// Discriminated union of every signal the core emits. Subscribers
/// (operator-facing push, if one exists downstream) decode by `t`.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", content = "p")]
pub enum RealTimeEvent {
    /// A task changed state; carries the new state as a string so
    /// subscribers don't need this crate's enum to decode the frame.
    #[serde(rename = "task_state_changed")]
    TaskStateChanged {
        task_id: String,
        attack_id: String,
        state: String,
    },
    #[serde(rename = "attack_state_changed")]
    AttackStateChanged {
        attack_id: String,
        campaign_id: String,
        state: String,
    },
    #[serde(rename = "campaign_state_changed")]
    CampaignStateChanged {
        campaign_id: String,
        state: String,
    },
    /// A hash was cracked; `uncracked_remaining` lets a dashboard update a
    /// progress bar without a follow-up read.
    #[serde(rename = "crack_observed")]
    CrackObserved {
        hash_list_id: String,
        task_id: String,
        uncracked_remaining: u64,
    },
    #[serde(rename = "agent_heartbeat")]
    AgentHeartbeatReceived { agent_id: String },
    #[serde(rename = "task_abandoned")]
    TaskAbandoned { task_id: String, agent_id: String },
    #[serde(rename = "system_log")]
    SystemLogEmission(SystemLog),
}
