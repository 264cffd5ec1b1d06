// [apps/orchestrator/src/config.rs]
/*!
 * APARATO: ORCHESTRATOR CONFIGURATION (ESTRATO L4)
 * RESPONSABILIDAD: SSoT DE VARIABLES DE ENTORNO Y UMBRALES OPERATIVOS
 *
 * Toda constante que antes vivía dispersa como literal en los repositorios
 * o en `main` se consolida aquí. El resto del árbol recibe un
 * `Arc<OrchestratorConfig>` y nunca vuelve a leer `std::env` directamente.
 */

use crate::errors::ApiError;
use cipherswarm_infra_store::repositories::{
    DEFAULT_FRESHNESS_WINDOW_SECONDS, DEFAULT_STATUS_RETENTION_PER_TASK, DEFAULT_ZOMBIE_THRESHOLD_SECONDS,
};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub database_url: String,
    pub database_auth_token: Option<String>,
    pub listen_port: u16,
    /// Shared secret an agent must present on `POST /client/agents` to
    /// register. Rotating it invalidates only future registrations, not
    /// already-issued bearer tokens.
    pub agent_invitation_secret: String,
    /// Lease TTL (§4.3): a `running` task whose `activity_timestamp` is
    /// older than this is reclaimed by the sweep daemon.
    pub task_lease_ttl_seconds: i64,
    /// How often the reclamation sweep daemon runs (§4.3).
    pub reclamation_sweep_interval_seconds: u64,
    /// Benchmark freshness window (§4.2/§9).
    pub benchmark_freshness_window_seconds: i64,
    /// Status-history frames retained per task (§3).
    pub status_history_retention_per_task: usize,
    /// Default keyspace slice size handed to `cipherswarm_core_keyspace::plan`
    /// when materializing a fresh attack (§4.2/§5).
    pub default_keyspace_slice_size: u128,
}

impl OrchestratorConfig {
    /// Builds the configuration from environment variables, applying the
    /// spec's stated defaults (§10.3) wherever a variable is unset. Only
    /// `DATABASE_URL` and `AGENT_INVITATION_SECRET` are mandatory; anything
    /// else missing falls back silently rather than failing startup.
    pub fn from_env() -> Result<Self, ApiError> {
        let database_url = non_empty_env("DATABASE_URL")
            .ok_or_else(|| ApiError::Configuration("DATABASE_URL is required".into()))?;
        let database_auth_token = non_empty_env("TURSO_AUTH_TOKEN");
        let agent_invitation_secret = non_empty_env("AGENT_INVITATION_SECRET")
            .ok_or_else(|| ApiError::Configuration("AGENT_INVITATION_SECRET is required".into()))?;

        let listen_port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);

        let task_lease_ttl_seconds = env_i64("CIPHERSWARM_TASK_LEASE_TTL_SECS", DEFAULT_ZOMBIE_THRESHOLD_SECONDS);
        let reclamation_sweep_interval_seconds = std::env::var("CIPHERSWARM_RECLAMATION_SWEEP_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);
        let benchmark_freshness_window_seconds =
            env_i64("CIPHERSWARM_BENCHMARK_FRESHNESS_SECS", DEFAULT_FRESHNESS_WINDOW_SECONDS);
        let status_history_retention_per_task = std::env::var("CIPHERSWARM_STATUS_RETENTION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_STATUS_RETENTION_PER_TASK);
        let default_keyspace_slice_size = std::env::var("CIPHERSWARM_KEYSPACE_SLICE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1_000_000_000_000);

        Ok(Self {
            database_url,
            database_auth_token,
            listen_port,
            agent_invitation_secret,
            task_lease_ttl_seconds,
            reclamation_sweep_interval_seconds,
            benchmark_freshness_window_seconds,
            status_history_retention_per_task,
            default_keyspace_slice_size,
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_database_url_is_a_configuration_error() {
        // SAFETY: test-only env mutation, single-threaded within this test.
        unsafe {
            std::env::remove_var("DATABASE_URL");
        }
        assert!(matches!(OrchestratorConfig::from_env(), Err(ApiError::Configuration(_))));
    }
}
