/*!
 * =================================================================
 * APARATO: REPOSITORY ACCESS MATRIX (V22.0 - TOPOLOGY MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ORQUESTACIÓN DE SUBSISTEMAS DE PERSISTENCIA
 *
 * El barrel file actúa como una interfaz galvánica. Los sub-módulos
 * permanecen aislados, y solo las estructuras de autoridad (Repositories)
 * son expuestas al exterior, reduciendo el acoplamiento sistémico.
 * =================================================================
 */

// --- ESTRATO 1: TENANCY Y DATOS ---

/// Gestión de proyectos: el límite de tenencia de todo lo demás.
pub mod project;
/// Listas de hashes objetivo y sus items individuales.
pub mod hash_list;
/// Recursos compartidos: wordlists, rulelists, masklists.
pub mod resource;

// --- ESTRATO 2: CAMPAÑAS Y DESPACHO ---

/// Campañas: colecciones ordenadas de ataques con prioridad.
pub mod campaign;
/// Ataques: configuración hashcat-equivalente ligada a una campaña.
pub mod attack;
/// Tareas: slices arrendados de keyspace, el reclamo atómico y el barrido.
pub mod task;

// --- ESTRATO 3: FLOTA DE AGENTES ---

/// Registro y ciclo de vida de agentes remotos.
pub mod agent;
/// Mediciones de velocidad de hashing por agente/tipo/dispositivo.
pub mod benchmark;
/// Reportes de error de agente.
pub mod agent_error;

// --- ESTRATO 4: INGESTA DE RESULTADOS ---

/// Frames de progreso hashcat, historia acotada por tarea.
pub mod status;
/// Hashes agrietados, deduplicación contra la lista objetivo.
pub mod crack;

// --- RE-EXPORTACIONES SOBERANAS (NOMINAL ACCESS API) ---

pub use agent::AgentRepository;
pub use agent_error::AgentErrorRepository;
pub use attack::AttackRepository;
pub use benchmark::{BenchmarkRepository, DEFAULT_FRESHNESS_WINDOW_SECONDS};
pub use campaign::CampaignRepository;
pub use crack::CrackRepository;
pub use hash_list::HashListRepository;
pub use project::ProjectRepository;
pub use resource::ResourceRepository;
pub use status::{StatusRepository, DEFAULT_STATUS_RETENTION_PER_TASK};
pub use task::{TaskRepository, DEFAULT_ZOMBIE_THRESHOLD_SECONDS};
