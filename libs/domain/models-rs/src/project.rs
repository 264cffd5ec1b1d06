// [libs/domain/models-rs/src/project.rs]
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Tenant boundary. Owns campaigns, resources, and agent memberships;
/// an agent only ever sees tasks whose campaign's `project_id` is in
/// its own `project_ids`.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}
