// [apps/orchestrator/src/state/mod.rs]
/*!
 * APARATO: APPLICATION STATE (ESTRATO L4)
 * RESPONSABILIDAD: COMPOSICION DE REPOSITORIOS, BUS DE EVENTOS Y CONFIGURACION
 *
 * Todo el estado mutable de proceso fuera del Store se reduce a dos
 * singletons (§9): el propio bus de difusión y, futuro, una caché de
 * benchmarks. Cualquier otra cosa vive en la base de datos y se consulta
 * bajo demanda a través de los repositorios aquí ensamblados.
 */

use crate::config::OrchestratorConfig;
use crate::services::event_bus::EventBus;
use cipherswarm_infra_store::repositories::{
    AgentErrorRepository, AgentRepository, AttackRepository, BenchmarkRepository, CampaignRepository,
    CrackRepository, HashListRepository, ProjectRepository, ResourceRepository, StatusRepository, TaskRepository,
};
use cipherswarm_infra_store::StoreClient;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<OrchestratorConfig>,
    pub event_bus: Arc<EventBus>,

    pub projects: Arc<ProjectRepository>,
    pub campaigns: Arc<CampaignRepository>,
    pub attacks: Arc<AttackRepository>,
    pub tasks: Arc<TaskRepository>,
    pub agents: Arc<AgentRepository>,
    pub agent_errors: Arc<AgentErrorRepository>,
    pub benchmarks: Arc<BenchmarkRepository>,
    pub statuses: Arc<StatusRepository>,
    pub cracks: Arc<CrackRepository>,
    pub hash_lists: Arc<HashListRepository>,
    pub resources: Arc<ResourceRepository>,
}

impl AppState {
    pub fn new(database_client: StoreClient, config: Arc<OrchestratorConfig>) -> Self {
        Self {
            config,
            event_bus: Arc::new(EventBus::new()),
            projects: Arc::new(ProjectRepository::new(database_client.clone())),
            campaigns: Arc::new(CampaignRepository::new(database_client.clone())),
            attacks: Arc::new(AttackRepository::new(database_client.clone())),
            tasks: Arc::new(TaskRepository::new(database_client.clone())),
            agents: Arc::new(AgentRepository::new(database_client.clone())),
            agent_errors: Arc::new(AgentErrorRepository::new(database_client.clone())),
            benchmarks: Arc::new(BenchmarkRepository::new(database_client.clone())),
            statuses: Arc::new(StatusRepository::new(database_client.clone())),
            cracks: Arc::new(CrackRepository::new(database_client.clone())),
            hash_lists: Arc::new(HashListRepository::new(database_client.clone())),
            resources: Arc::new(ResourceRepository::new(database_client)),
        }
    }
}
