// [libs/domain/models-rs/src/campaign.rs]
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Scheduling precedence. Declared low-to-high so the derived `Ord` puts
/// `Flash` greatest and `Deferred` least, matching "flash > immediate >
/// urgent > priority > routine > deferred" directly — the Matcher sorts
/// candidates by `priority` descending.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CampaignPriority {
    Deferred,
    Routine,
    Priority,
    Urgent,
    Immediate,
    Flash,
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignState {
    Draft,
    Active,
    Completed,
    Archived,
}

/// An ordered, priority-bearing collection of attacks against one hash list.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub priority: CampaignPriority,
    pub hash_list_id: String,
    pub state: CampaignState,
    pub created_at: String,
    pub updated_at: String,
}
