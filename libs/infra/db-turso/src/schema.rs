/**
 * =================================================================
 * APARATO: SOVEREIGN DATABASE SCHEMA (V200.0 - CIPHERSWARM STRATA)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. BIG-KEYSPACE SAFE: columnas de keyspace/velocidad se persisten como
 *    TEXT para evitar el desbordamiento del INTEGER de 64 bits de SQLite.
 * 2. IDEMPOTENCIA: gestión de errores para migraciones en caliente en Turso.
 * 3. PERFORMANCE: índices de aceleración para el despacho masivo de tareas.
 * =================================================================
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument, warn};

/**
 * ESTRATO 1: SOLIDIFICACIÓN (Génesis de Tablas)
 * Define las entidades base del ecosistema CipherSwarm.
 */
const TACTICAL_TABLES: &[(&str, &str)] = &[
    ("TABLE_PROJECTS", r#"
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_HASH_LISTS", r#"
        CREATE TABLE IF NOT EXISTS hash_lists (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            name TEXT NOT NULL,
            hash_type_id INTEGER NOT NULL,
            uncracked_count INTEGER NOT NULL DEFAULT 0
        );
    "#),
    ("TABLE_HASH_ITEMS", r#"
        CREATE TABLE IF NOT EXISTS hash_items (
            id TEXT PRIMARY KEY,
            hash_list_id TEXT NOT NULL,
            hash_value TEXT NOT NULL,
            salt TEXT,
            plaintext TEXT,
            cracked_at DATETIME
        );
    "#),
    ("TABLE_RESOURCES", r#"
        CREATE TABLE IF NOT EXISTS resources (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            file_handle TEXT NOT NULL,
            line_count INTEGER
        );
    "#),
    ("TABLE_RESOURCE_PROJECT_LINKS", r#"
        CREATE TABLE IF NOT EXISTS resource_project_links (
            resource_id TEXT NOT NULL,
            project_id TEXT NOT NULL,
            PRIMARY KEY (resource_id, project_id)
        );
    "#),
    ("TABLE_CAMPAIGNS", r#"
        CREATE TABLE IF NOT EXISTS campaigns (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            name TEXT NOT NULL,
            priority TEXT NOT NULL DEFAULT 'routine',
            hash_list_id TEXT NOT NULL,
            state TEXT NOT NULL DEFAULT 'draft',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_ATTACKS", r#"
        CREATE TABLE IF NOT EXISTS attacks (
            id TEXT PRIMARY KEY,
            campaign_id TEXT NOT NULL,
            position INTEGER NOT NULL DEFAULT 0,
            attack_mode TEXT NOT NULL,
            word_list_id TEXT,
            rule_list_id TEXT,
            mask_list_id TEXT,
            mask TEXT,
            custom_charset_1 TEXT,
            custom_charset_2 TEXT,
            custom_charset_3 TEXT,
            custom_charset_4 TEXT,
            increment_mode INTEGER NOT NULL DEFAULT 0,
            increment_min INTEGER,
            increment_max INTEGER,
            workload_profile INTEGER NOT NULL DEFAULT 3,
            optimized INTEGER NOT NULL DEFAULT 0,
            disable_markov INTEGER NOT NULL DEFAULT 0,
            classic_markov INTEGER NOT NULL DEFAULT 0,
            markov_threshold INTEGER,
            slow_candidate_generators INTEGER NOT NULL DEFAULT 0,
            state TEXT NOT NULL DEFAULT 'pending',
            start_time DATETIME,
            end_time DATETIME
        );
    "#),
    ("TABLE_TASKS", r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            attack_id TEXT NOT NULL,
            agent_id TEXT,
            keyspace_offset TEXT NOT NULL DEFAULT '0',
            keyspace_limit TEXT NOT NULL DEFAULT '0',
            start_date DATETIME,
            activity_timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
            state TEXT NOT NULL DEFAULT 'pending'
        );
    "#),
    ("TABLE_AGENTS", r#"
        CREATE TABLE IF NOT EXISTS agents (
            id TEXT PRIMARY KEY,
            host_name TEXT NOT NULL,
            client_signature TEXT NOT NULL,
            operating_system TEXT NOT NULL,
            devices_json TEXT NOT NULL DEFAULT '[]',
            token TEXT NOT NULL UNIQUE,
            state TEXT NOT NULL DEFAULT 'pending',
            last_seen_at DATETIME
        );
    "#),
    ("TABLE_AGENT_PROJECT_MEMBERSHIPS", r#"
        CREATE TABLE IF NOT EXISTS agent_project_memberships (
            agent_id TEXT NOT NULL,
            project_id TEXT NOT NULL,
            PRIMARY KEY (agent_id, project_id)
        );
    "#),
    ("TABLE_BENCHMARKS", r#"
        CREATE TABLE IF NOT EXISTS benchmarks (
            agent_id TEXT NOT NULL,
            hash_type_id INTEGER NOT NULL,
            device_index INTEGER NOT NULL,
            hash_speed TEXT NOT NULL DEFAULT '0',
            runtime_ms INTEGER NOT NULL DEFAULT 0,
            measured_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (agent_id, hash_type_id, device_index)
        );
    "#),
    ("TABLE_AGENT_ERRORS", r#"
        CREATE TABLE IF NOT EXISTS agent_errors (
            id TEXT PRIMARY KEY,
            agent_id TEXT NOT NULL,
            severity TEXT NOT NULL,
            message TEXT NOT NULL,
            task_id TEXT,
            recorded_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_HASHCAT_STATUSES", r#"
        CREATE TABLE IF NOT EXISTS hashcat_statuses (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL,
            received_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            session TEXT NOT NULL DEFAULT '',
            status_code INTEGER NOT NULL DEFAULT 0,
            target TEXT NOT NULL DEFAULT '',
            progress_done TEXT NOT NULL DEFAULT '0',
            progress_total TEXT NOT NULL DEFAULT '0',
            restore_point TEXT NOT NULL DEFAULT '0',
            recovered_hashes_json TEXT NOT NULL DEFAULT '[]',
            recovered_salts_json TEXT NOT NULL DEFAULT '[]',
            rejected TEXT NOT NULL DEFAULT '0',
            devices_json TEXT NOT NULL DEFAULT '[]',
            time_start DATETIME
        );
    "#),
    ("TABLE_CRACK_RESULTS", r#"
        CREATE TABLE IF NOT EXISTS crack_results (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL,
            hash_value TEXT NOT NULL,
            plaintext TEXT NOT NULL,
            cracked_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
];

/**
 * ESTRATO 2: EVOLUCIÓN (Mutaciones de Columna)
 * Columnas añadidas tras el lanzamiento inicial del esquema V200.
 */
const EVOLUTIONARY_STRATA: &[(&str, &str)] = &[
    ("RESOURCE_SENSITIVE", "ALTER TABLE resources ADD COLUMN sensitive INTEGER NOT NULL DEFAULT 0"),
    ("TASK_STALE", "ALTER TABLE tasks ADD COLUMN stale INTEGER NOT NULL DEFAULT 0"),
    ("AGENT_LAST_IP", "ALTER TABLE agents ADD COLUMN last_ipaddress TEXT"),
    ("AGENT_ADVANCED_CONFIG", "ALTER TABLE agents ADD COLUMN advanced_config_json TEXT NOT NULL DEFAULT '{}'"),
    ("AGENT_ERROR_CONTEXT", "ALTER TABLE agent_errors ADD COLUMN context_json TEXT"),
    ("STATUS_ESTIMATED_STOP", "ALTER TABLE hashcat_statuses ADD COLUMN estimated_stop DATETIME"),
    ("STATUS_HASHCAT_GUESS", "ALTER TABLE hashcat_statuses ADD COLUMN hashcat_guess_json TEXT"),
    ("TASK_CANCEL_REQUESTED", "ALTER TABLE tasks ADD COLUMN cancel_requested INTEGER NOT NULL DEFAULT 0"),
];

/**
 * ESTRATO 3: ENDURECIMIENTO (Índices de Aceleración)
 * Optimiza el acceso para el despacho masivo de tareas.
 */
const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    ("IDX_HASH_ITEMS_LIST", "CREATE INDEX IF NOT EXISTS idx_hash_items_list ON hash_items(hash_list_id);"),
    ("IDX_ATTACKS_CAMPAIGN", "CREATE INDEX IF NOT EXISTS idx_attacks_campaign ON attacks(campaign_id, position);"),
    ("IDX_TASKS_ATTACK_STATE", "CREATE INDEX IF NOT EXISTS idx_tasks_attack_state ON tasks(attack_id, state);"),
    ("IDX_TASKS_AGENT", "CREATE INDEX IF NOT EXISTS idx_tasks_agent ON tasks(agent_id);"),
    ("IDX_TASKS_RECLAIM", "CREATE INDEX IF NOT EXISTS idx_tasks_reclaim ON tasks(state, activity_timestamp);"),
    ("IDX_CAMPAIGNS_PROJECT", "CREATE INDEX IF NOT EXISTS idx_campaigns_project ON campaigns(project_id, state);"),
    ("IDX_BENCHMARKS_LOOKUP", "CREATE INDEX IF NOT EXISTS idx_benchmarks_lookup ON benchmarks(agent_id, hash_type_id);"),
    ("IDX_STATUSES_TASK", "CREATE INDEX IF NOT EXISTS idx_statuses_task ON hashcat_statuses(task_id, received_at);"),
    ("IDX_CRACKS_TASK", "CREATE INDEX IF NOT EXISTS idx_cracks_task ON crack_results(task_id);"),
    ("IDX_CRACKS_DEDUP", "CREATE UNIQUE INDEX IF NOT EXISTS idx_cracks_dedup ON crack_results(task_id, hash_value);"),
    ("IDX_AGENT_MEMBERSHIP", "CREATE INDEX IF NOT EXISTS idx_agent_membership ON agent_project_memberships(agent_id);"),
];

/**
 * Ejecuta la secuencia maestra de sincronización del esquema estructural.
 *
 * # Errors:
 * Retorna error si alguna tabla base falla en solidificarse, indicando
 * un colapso en el enlace con Turso.
 */
#[instrument(skip(database_connection))]
pub async fn apply_full_sovereign_schema(database_connection: &Connection) -> Result<()> {
    info!("🏗️ [SCHEMA_ENGINE]: Initiating structural synchronization V200.0...");

    solidify_base_strata(database_connection).await?;
    execute_evolutionary_repair(database_connection).await?;
    harden_access_layer(database_connection).await?;

    info!("✅ [SCHEMA_ENGINE]: Tactical Ledger V200.0 leveled and certified.");
    Ok(())
}

async fn solidify_base_strata(db: &Connection) -> Result<()> {
    for (identifier, sql) in TACTICAL_TABLES {
        debug!("  ↳ Solidifying: {}", identifier);
        db.execute(*sql, ())
            .await
            .with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: {}", identifier))?;
    }
    Ok(())
}

async fn execute_evolutionary_repair(db: &Connection) -> Result<()> {
    for (identifier, sql) in EVOLUTIONARY_STRATA {
        match db.execute(*sql, ()).await {
            Ok(_) => info!("  🟢 [REPAIR_OK]: Applied evolutionary stratum {}", identifier),
            Err(e) => {
                let message = e.to_string();
                if message.contains("duplicate column name") {
                    debug!("  ⚪ [REPAIR_SKIP]: {} already level.", identifier);
                } else {
                    warn!("  ⚠️ [REPAIR_BYPASS]: {} check incomplete: {}", identifier, message);
                }
            }
        }
    }
    Ok(())
}

async fn harden_access_layer(db: &Connection) -> Result<()> {
    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("  ↳ Hardening: {}", identifier);
        db.execute(*sql, ())
            .await
            .with_context(|| format!("CRITICAL_HARDENING_FAULT: {}", identifier))?;
    }
    Ok(())
}
