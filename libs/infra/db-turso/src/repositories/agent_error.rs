// [libs/infra/db-turso/src/repositories/agent_error.rs]
/*!
 * APARATO: AGENT ERROR REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: BITACORA DE FALLOS REPORTADOS POR AGENTES
 */

use crate::errors::{StoreError, StoreResult};
use crate::StoreClient;
use cipherswarm_domain_models::{AgentError, AgentErrorSeverity};
use libsql::params;
use tracing::{info, instrument, warn};

pub struct AgentErrorRepository {
    database_client: StoreClient,
}

impl AgentErrorRepository {
    pub fn new(database_client: StoreClient) -> Self {
        Self { database_client }
    }

    /// Records one error report. A `Fatal` severity drives the owning
    /// task's `error` transition (§C7) — the caller checks
    /// `severity.is_fatal()` on the returned record and dispatches
    /// `transitions::TaskEvent::Error` itself, keeping this repository
    /// free of cross-entity cascade logic.
    #[instrument(skip(self, context))]
    pub async fn record(
        &self,
        agent_id: &str,
        severity: AgentErrorSeverity,
        message: &str,
        task_id: Option<&str>,
        context: Option<serde_json::Value>,
    ) -> StoreResult<AgentError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let context_json = context
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StoreError::MappingError(format!("context serialization failed: {e}")))?;

        let connection = self.database_client.get_connection()?;
        connection
            .execute(
                "INSERT INTO agent_errors (id, agent_id, severity, message, task_id, recorded_at, context_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![id.clone(), agent_id, severity_label(severity), message, task_id, now.clone(), context_json],
            )
            .await?;

        if severity.is_fatal() {
            warn!("🚨 [AGENT_ERROR]: fatal report from {agent_id}: {message}");
        } else {
            info!("⚠️ [AGENT_ERROR]: {severity:?} report from {agent_id}: {message}");
        }

        Ok(AgentError {
            id,
            agent_id: agent_id.to_string(),
            severity,
            message: message.to_string(),
            task_id: task_id.map(str::to_string),
            recorded_at: now,
            context_json: context,
        })
    }

    #[instrument(skip(self))]
    pub async fn list_for_agent(&self, agent_id: &str) -> StoreResult<Vec<AgentError>> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, agent_id, severity, message, task_id, recorded_at, context_json
                 FROM agent_errors WHERE agent_id = ?1 ORDER BY recorded_at DESC",
                params![agent_id],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let context_json: Option<String> = row.get(6)?;
            let context_json = context_json
                .map(|raw| serde_json::from_str(&raw))
                .transpose()
                .map_err(|e| StoreError::MappingError(format!("context deserialization failed: {e}")))?;
            out.push(AgentError {
                id: row.get(0)?,
                agent_id: row.get(1)?,
                severity: parse_severity(&row.get::<String>(2)?)?,
                message: row.get(3)?,
                task_id: row.get(4)?,
                recorded_at: row.get(5)?,
                context_json,
            });
        }
        Ok(out)
    }
}

fn severity_label(s: AgentErrorSeverity) -> &'static str {
    match s {
        AgentErrorSeverity::Info => "info",
        AgentErrorSeverity::Warning => "warning",
        AgentErrorSeverity::Minor => "minor",
        AgentErrorSeverity::Major => "major",
        AgentErrorSeverity::Fatal => "fatal",
    }
}

fn parse_severity(label: &str) -> StoreResult<AgentErrorSeverity> {
    Ok(match label {
        "info" => AgentErrorSeverity::Info,
        "warning" => AgentErrorSeverity::Warning,
        "minor" => AgentErrorSeverity::Minor,
        "major" => AgentErrorSeverity::Major,
        "fatal" => AgentErrorSeverity::Fatal,
        other => return Err(StoreError::MappingError(format!("unknown agent error severity '{other}'"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_client(name: &str) -> StoreClient {
        StoreClient::connect(&format!("file:mem_{name}?mode=memory&cache=shared"), None).await.unwrap()
    }

    #[tokio::test]
    async fn fatal_report_is_flagged_and_persisted() {
        let repo = AgentErrorRepository::new(memory_client("agent_error_fatal").await);
        let recorded = repo
            .record("agent-1", AgentErrorSeverity::Fatal, "GPU fell off the bus", Some("task-1"), None)
            .await
            .unwrap();
        assert!(recorded.severity.is_fatal());

        let listed = repo.list_for_agent("agent-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].task_id.as_deref(), Some("task-1"));
    }
}
