// [libs/infra/db-turso/src/repositories/agent.rs]
/*!
 * APARATO: AGENT REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: REGISTRO DE AGENTES, TOKENS Y MEMBRESIA DE PROYECTO
 */

use crate::errors::{StoreError, StoreResult};
use crate::StoreClient;
use cipherswarm_domain_models::{Agent, AgentState, Device};
use libsql::{params, Connection};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{info, instrument};

pub struct AgentRepository {
    database_client: StoreClient,
}

impl AgentRepository {
    pub fn new(database_client: StoreClient) -> Self {
        Self { database_client }
    }

    /// Registers a new agent and mints its long-lived bearer token
    /// (§6.1: `csa_<agent_id>_<opaque>`). The token is returned once here;
    /// `get_by_token` compares it verbatim against the stored column on
    /// every subsequent request — there is no hashing on this path.
    #[instrument(skip(self, devices))]
    pub async fn register(
        &self,
        host_name: &str,
        client_signature: &str,
        operating_system: &str,
        devices: Vec<Device>,
        project_ids: &[String],
    ) -> StoreResult<Agent> {
        let id = uuid::Uuid::new_v4().to_string();
        let token = format!("csa_{id}_{}", random_opaque_suffix());
        let devices_json = serde_json::to_string(&devices)
            .map_err(|e| StoreError::MappingError(format!("devices serialization failed: {e}")))?;

        let connection = self.database_client.get_connection()?;
        let transaction = connection.transaction().await?;

        transaction
            .execute(
                "INSERT INTO agents (id, host_name, client_signature, operating_system, devices_json, token, state)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending')",
                params![id.clone(), host_name, client_signature, operating_system, devices_json, token.clone()],
            )
            .await?;

        for project_id in project_ids {
            transaction
                .execute(
                    "INSERT INTO agent_project_memberships (agent_id, project_id) VALUES (?1, ?2)",
                    params![id.clone(), project_id.clone()],
                )
                .await?;
        }

        transaction.commit().await?;
        info!("🤝 [AGENT]: registered {id} ({host_name})");

        Ok(Agent {
            id,
            host_name: host_name.to_string(),
            client_signature: client_signature.to_string(),
            operating_system: operating_system.to_string(),
            devices,
            token,
            state: AgentState::Pending,
            last_seen_at: None,
            last_ipaddress: None,
            project_ids: project_ids.to_vec(),
            advanced_config: serde_json::json!({}),
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, agent_id: &str) -> StoreResult<Agent> {
        let connection = self.database_client.get_connection()?;
        self.get_with(&connection, agent_id).await
    }

    #[instrument(skip(self, bearer_token))]
    pub async fn get_by_token(&self, bearer_token: &str) -> StoreResult<Agent> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, host_name, client_signature, operating_system, devices_json, token, state,
                        last_seen_at, last_ipaddress, advanced_config_json
                 FROM agents WHERE token = ?1",
                params![bearer_token],
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::AgentNotFound)?;
        self.hydrate(&connection, row).await
    }

    async fn get_with(&self, connection: &Connection, agent_id: &str) -> StoreResult<Agent> {
        let mut rows = connection
            .query(
                "SELECT id, host_name, client_signature, operating_system, devices_json, token, state,
                        last_seen_at, last_ipaddress, advanced_config_json
                 FROM agents WHERE id = ?1",
                params![agent_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::AgentNotFound)?;
        self.hydrate(connection, row).await
    }

    async fn hydrate(&self, connection: &Connection, row: libsql::Row) -> StoreResult<Agent> {
        let id: String = row.get(0)?;
        let devices: Vec<Device> = serde_json::from_str(&row.get::<String>(4)?)
            .map_err(|e| StoreError::MappingError(format!("devices deserialization failed: {e}")))?;
        let advanced_config: serde_json::Value = serde_json::from_str(&row.get::<String>(9)?)
            .map_err(|e| StoreError::MappingError(format!("advanced_config deserialization failed: {e}")))?;
        let project_ids = self.project_ids_for(connection, &id).await?;

        Ok(Agent {
            id,
            host_name: row.get(1)?,
            client_signature: row.get(2)?,
            operating_system: row.get(3)?,
            devices,
            token: row.get(5)?,
            state: parse_state(&row.get::<String>(6)?)?,
            last_seen_at: row.get(7)?,
            last_ipaddress: row.get(8)?,
            project_ids,
            advanced_config,
        })
    }

    async fn project_ids_for(&self, connection: &Connection, agent_id: &str) -> StoreResult<Vec<String>> {
        let mut rows = connection
            .query("SELECT project_id FROM agent_project_memberships WHERE agent_id = ?1", params![agent_id])
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row.get(0)?);
        }
        Ok(out)
    }

    /// Active agents scoped to any of `project_ids`, for the Matcher's
    /// agent-candidate pool (§4.2).
    #[instrument(skip(self))]
    pub async fn list_active_for_project(&self, project_id: &str) -> StoreResult<Vec<Agent>> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT agent_id FROM agent_project_memberships WHERE project_id = ?1",
                params![project_id],
            )
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }
        let mut out = Vec::new();
        for id in ids {
            let agent = self.get_with(&connection, &id).await?;
            if agent.state == AgentState::Active {
                out.push(agent);
            }
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn mark_seen(&self, agent_id: &str, ip_address: Option<&str>) -> StoreResult<()> {
        let connection = self.database_client.get_connection()?;
        let now = chrono::Utc::now().to_rfc3339();
        let affected = connection
            .execute(
                "UPDATE agents SET last_seen_at = ?2, last_ipaddress = COALESCE(?3, last_ipaddress) WHERE id = ?1",
                params![agent_id, now, ip_address],
            )
            .await?;
        if affected == 0 {
            return Err(StoreError::AgentNotFound);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn set_state(&self, agent_id: &str, state: AgentState) -> StoreResult<Agent> {
        let connection = self.database_client.get_connection()?;
        let affected = connection
            .execute(
                "UPDATE agents SET state = ?2 WHERE id = ?1",
                params![agent_id, agent_state_label(state)],
            )
            .await?;
        if affected == 0 {
            return Err(StoreError::AgentNotFound);
        }
        info!("📡 [AGENT]: {agent_id} state -> {state:?}");
        self.get_with(&connection, agent_id).await
    }
}

fn random_opaque_suffix() -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(32).map(char::from).collect()
}

fn agent_state_label(s: AgentState) -> &'static str {
    match s {
        AgentState::Pending => "pending",
        AgentState::Active => "active",
        AgentState::Stopped => "stopped",
        AgentState::Error => "error",
    }
}

fn parse_state(label: &str) -> StoreResult<AgentState> {
    Ok(match label {
        "pending" => AgentState::Pending,
        "active" => AgentState::Active,
        "stopped" => AgentState::Stopped,
        "error" => AgentState::Error,
        other => return Err(StoreError::MappingError(format!("unknown agent state '{other}'"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_client(name: &str) -> StoreClient {
        StoreClient::connect(&format!("file:mem_{name}?mode=memory&cache=shared"), None).await.unwrap()
    }

    #[tokio::test]
    async fn register_mints_token_bound_to_agent_id() {
        let repo = AgentRepository::new(memory_client("agent_register").await);
        let devices = vec![Device { index: 0, name: "RTX 4090".into(), device_type: "gpu".into() }];
        let agent = repo
            .register("worker-01", "hashcat-6.2.6", "linux", devices, &["proj-1".to_string()])
            .await
            .unwrap();

        assert!(agent.token.starts_with(&format!("csa_{}_", agent.id)));
        assert_eq!(agent.state, AgentState::Pending);

        let fetched = repo.get_by_token(&agent.token).await.unwrap();
        assert_eq!(fetched.id, agent.id);
        assert_eq!(fetched.project_ids, vec!["proj-1".to_string()]);
    }

    #[tokio::test]
    async fn list_active_excludes_pending_agents() {
        let repo = AgentRepository::new(memory_client("agent_active_list").await);
        let agent = repo.register("worker-02", "hashcat-6.2.6", "linux", vec![], &["proj-9".to_string()]).await.unwrap();

        assert!(repo.list_active_for_project("proj-9").await.unwrap().is_empty());
        repo.set_state(&agent.id, AgentState::Active).await.unwrap();
        assert_eq!(repo.list_active_for_project("proj-9").await.unwrap().len(), 1);
    }
}
