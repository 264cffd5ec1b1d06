// [libs/domain/models-rs/src/resource.rs]
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// The three attack-resource shapes hashcat consumes.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    WordList,
    RuleList,
    MaskList,
}

/// Metadata for an uploaded word/rule/mask list. The file itself lives in
/// object storage, outside this crate's scope; `file_handle` is an opaque
/// reference the storage layer resolves into a signed download URL.
///
/// `line_count = None` means "not yet computed" — the Keyspace Planner
/// must treat any attack referencing such a resource as non-dispatchable.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub kind: ResourceKind,
    pub file_handle: String,
    #[typeshare(serialized_as = "number")]
    pub line_count: Option<u64>,
    pub sensitive: bool,
    pub project_ids: Vec<String>,
}

impl Resource {
    /// Sensitive resources must be scoped to at least one project.
    pub fn is_valid(&self) -> bool {
        !self.sensitive || !self.project_ids.is_empty()
    }
}
