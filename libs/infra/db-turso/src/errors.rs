// [libs/infra/db-turso/src/errors.rs]
/*!
 * =================================================================
 * APARATO: STORE ERROR CATALOG (V180.7 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE PERSISTENCIA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CONFIGURATION AWARENESS: Inyecta 'ConfigurationError' para distinguir
 *    entre fallos de red y variables de entorno vacías (GitHub Actions).
 * 2. ZERO ABBREVIATIONS: Nomenclatura nominal absoluta.
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Error de enlace físico o de red con el cluster de Turso.
    #[error("[L3_DB_NET_FAULT]: DATABASE_UPLINK_SEVERED -> {0}")]
    ConnectionError(String),

    /// Fallo en la configuración del entorno (Variables vacías o malformadas).
    #[error("[L3_DB_CONFIG_FAULT]: STRATEGIC_ENV_VOID -> {0}")]
    ConfigurationError(String),

    /// Error de sintaxis o ejecución devuelto por el motor libSQL.
    #[error("[L3_DB_QUERY_FAULT]: SQL_QUERY_REJECTED -> {0}")]
    QueryError(#[from] libsql::Error),

    /// Fallo en la transformación de tipos entre SQLite y el Dominio Rust.
    #[error("[L3_DB_MAPPING_FAULT]: DATA_MAPPING_VIOLATION -> {0}")]
    MappingError(String),

    // --- ESTRATO DE ENTIDADES ---
    #[error("[L3_ENTITY_FAULT]: PROJECT_NOT_FOUND")]
    ProjectNotFound,

    #[error("[L3_ENTITY_FAULT]: HASH_LIST_NOT_FOUND")]
    HashListNotFound,

    #[error("[L3_ENTITY_FAULT]: RESOURCE_NOT_FOUND")]
    ResourceNotFound,

    #[error("[L3_ENTITY_FAULT]: CAMPAIGN_NOT_FOUND")]
    CampaignNotFound,

    #[error("[L3_ENTITY_FAULT]: ATTACK_NOT_FOUND")]
    AttackNotFound,

    #[error("[L3_ENTITY_FAULT]: TASK_NOT_FOUND")]
    TaskNotFound,

    #[error("[L3_ENTITY_FAULT]: AGENT_NOT_FOUND")]
    AgentNotFound,

    // --- ESTRATO DE MAQUINA DE ESTADOS ---

    /// La tarea/ataque/campaña no se encuentra en un estado apto para la
    /// transición solicitada.
    #[error("[L3_STATE_FAULT]: INVALID_TRANSITION -> {0}")]
    InvalidTransition(String),

    /// Conflicto de arrendamiento: la tarea ya tiene un candado de otro agente.
    #[error("[L3_LEASE_FAULT]: CLAIM_RACE_LOST")]
    ClaimRaceLost,

    /// El ataque referenciado carece de los recursos requeridos por su modo.
    #[error("[L3_ATTACK_FAULT]: RESOURCE_NOT_READY -> {0}")]
    NotDispatchable(String),

    #[error("[L3_KEYSPACE_FAULT]: {0}")]
    Keyspace(#[from] cipherswarm_core_keyspace::KeyspaceError),

    /// Error al comprometer cambios en una secuencia multi-tabla.
    #[error("[L3_DB_FAULT]: TRANSACTION_COLLAPSE -> {0}")]
    TransactionError(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
