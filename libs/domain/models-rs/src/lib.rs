//! [libs/domain/models-rs/src/lib.rs]
//! Single source of truth for CipherSwarm's domain entities and wire DTOs.
//! Every type here is plain data: no repository access, no transition logic.
//! State-machine transitions live in `cipherswarm-infra-store::transitions`,
//! which consumes the `*State` enums defined here.

pub mod agent;
pub mod attack;
pub mod campaign;
pub mod crack;
pub mod events;
pub mod hash_list;
pub mod project;
pub mod resource;
pub mod status;
pub mod task;
pub mod wire;

pub use agent::{Agent, AgentError, AgentErrorSeverity, AgentState, Benchmark, Device};
pub use attack::{Attack, AttackMode, AttackState};
pub use campaign::{Campaign, CampaignPriority, CampaignState};
pub use crack::CrackResult;
pub use events::{RealTimeEvent, SystemLog};
pub use hash_list::{HashItem, HashList};
pub use project::Project;
pub use resource::{Resource, ResourceKind};
pub use status::{DeviceStatus, HashcatStatus};
pub use task::{Task, TaskState};
