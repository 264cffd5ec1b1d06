// [libs/domain/models-rs/src/crack.rs]
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// One cracked hash, as submitted by an agent and deduplicated against
/// the task's target `HashList` by the Result Ingestor (C9).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrackResult {
    pub task_id: String,
    pub hash_value: String,
    pub plaintext: String,
    pub cracked_at: String,
}
