// [libs/domain/models-rs/src/attack.rs]
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttackMode {
    Dictionary,
    Mask,
    HybridDictionary,
    HybridMask,
}

impl AttackMode {
    /// Hashcat's own `-a` mode id, carried in the wire DTO (§6.2).
    pub fn hashcat_mode(self) -> u8 {
        match self {
            AttackMode::Dictionary => 0,
            AttackMode::Mask => 3,
            AttackMode::HybridDictionary => 6,
            AttackMode::HybridMask => 7,
        }
    }
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttackState {
    Pending,
    Running,
    Paused,
    Completed,
    Exhausted,
    Failed,
}

impl AttackState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AttackState::Completed | AttackState::Exhausted | AttackState::Failed
        )
    }
}

/// A hashcat-equivalent configuration (mode, resources, mask, flags) bound
/// to a campaign. Required-resource presence per `attack_mode` is an
/// invariant validated at creation time by the operator API, not by this
/// struct itself (plain data, no validation logic baked in).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attack {
    pub id: String,
    pub campaign_id: String,
    pub position: i32,
    pub attack_mode: AttackMode,
    pub word_list_id: Option<String>,
    pub rule_list_id: Option<String>,
    pub mask_list_id: Option<String>,
    pub mask: Option<String>,
    pub custom_charset_1: Option<String>,
    pub custom_charset_2: Option<String>,
    pub custom_charset_3: Option<String>,
    pub custom_charset_4: Option<String>,
    pub increment_mode: bool,
    pub increment_min: Option<u32>,
    pub increment_max: Option<u32>,
    pub workload_profile: u8,
    pub optimized: bool,
    pub disable_markov: bool,
    pub classic_markov: bool,
    pub markov_threshold: Option<u32>,
    pub slow_candidate_generators: bool,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub state: AttackState,
}

impl Attack {
    /// §3 invariant: the resources required by the chosen mode must be present.
    pub fn has_required_resources(&self) -> bool {
        match self.attack_mode {
            AttackMode::Dictionary => self.word_list_id.is_some(),
            AttackMode::Mask => self.mask.is_some() || self.mask_list_id.is_some(),
            AttackMode::HybridDictionary | AttackMode::HybridMask => {
                self.word_list_id.is_some() && (self.mask.is_some() || self.mask_list_id.is_some())
            }
        }
    }
}
