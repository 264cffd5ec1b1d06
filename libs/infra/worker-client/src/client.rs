// [libs/infra/worker-client/src/client.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN AGENT UPLINK (ESTRATO L3)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER
 * RESPONSABILIDAD: NEGOCIACIÓN DEL PROTOCOLO DE AGENTE (C10)
 *
 * Implementa el lado cliente del protocolo de agente descrito en §6.1:
 * registro, heartbeat, adquisición de tareas, envío de progreso y de
 * hallazgos. Cada request lleva el Bearer token emitido en el registro.
 * =================================================================
 */

use crate::errors::ClientError;
use cipherswarm_domain_models::wire::{
    AttackDto, HashcatBenchmarkEntry, HeartbeatRequest, HeartbeatResponse, NextTaskResponse, RegisterAgentRequest,
    RegisterAgentResponse, ReportErrorRequest, SubmitCrackEntry,
};
use cipherswarm_domain_models::HashcatStatus;
use reqwest::{Client, StatusCode};
use tracing::{instrument, warn};

pub struct AgentClient {
    network_session_client: Client,
    orchestrator_base_endpoint: String,
}

impl AgentClient {
    /// Builds an unauthenticated client suitable only for `register`; every
    /// other method requires [`AgentClient::with_token`].
    pub fn new(base_url: String) -> Self {
        Self {
            network_session_client: Client::builder()
                .user_agent("CipherSwarm-Agent/1.0")
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("FATAL: Client initialization failed."),
            orchestrator_base_endpoint: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Builds a client carrying the long-lived `csa_<agent_id>_<opaque>`
    /// bearer token minted by `register`.
    pub fn with_token(base_url: String, token: &str) -> Self {
        let mut header_map = reqwest::header::HeaderMap::new();
        let auth_value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
            .expect("CRITICAL: Invalid Authentication Token Format.");
        header_map.insert(reqwest::header::AUTHORIZATION, auth_value);

        Self {
            network_session_client: Client::builder()
                .default_headers(header_map)
                .user_agent("CipherSwarm-Agent/1.0")
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("FATAL: Client initialization failed."),
            orchestrator_base_endpoint: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.orchestrator_base_endpoint, path)
    }

    async fn expect_status(response: reqwest::Response, expected: StatusCode) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status == expected {
            Ok(response)
        } else if status == StatusCode::UNAUTHORIZED {
            Err(ClientError::Unauthorized)
        } else {
            Err(ClientError::ServerRejection(format!("HTTP_{status}")))
        }
    }

    #[instrument(skip(self, request))]
    pub async fn register(&self, request: &RegisterAgentRequest) -> Result<RegisterAgentResponse, ClientError> {
        let response = self.network_session_client.post(self.endpoint("/client/agents")).json(request).send().await?;
        let response = Self::expect_status(response, StatusCode::CREATED).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self, entries))]
    pub async fn submit_benchmarks(&self, agent_id: &str, entries: &[HashcatBenchmarkEntry]) -> Result<(), ClientError> {
        let response = self
            .network_session_client
            .post(self.endpoint(&format!("/client/agents/{agent_id}/benchmark")))
            .json(entries)
            .send()
            .await?;
        Self::expect_status(response, StatusCode::NO_CONTENT).await?;
        Ok(())
    }

    #[instrument(skip(self, request))]
    pub async fn heartbeat(&self, agent_id: &str, request: &HeartbeatRequest) -> Result<HeartbeatResponse, ClientError> {
        let response = self
            .network_session_client
            .post(self.endpoint(&format!("/client/agents/{agent_id}/heartbeat")))
            .json(request)
            .send()
            .await?;
        let response = Self::expect_status(response, StatusCode::OK).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self))]
    pub async fn next_task(&self) -> Result<NextTaskResponse, ClientError> {
        let response = self.network_session_client.get(self.endpoint("/client/tasks/next")).send().await?;
        let response = Self::expect_status(response, StatusCode::OK).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self))]
    pub async fn fetch_attack(&self, attack_id: &str) -> Result<AttackDto, ClientError> {
        let response = self
            .network_session_client
            .get(self.endpoint(&format!("/client/attacks/{attack_id}")))
            .send()
            .await?;
        let response = Self::expect_status(response, StatusCode::OK).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self, status))]
    pub async fn submit_status(&self, task_id: &str, status: &HashcatStatus) -> Result<(), ClientError> {
        let response = self
            .network_session_client
            .post(self.endpoint(&format!("/client/tasks/{task_id}/status")))
            .json(status)
            .send()
            .await?;
        if response.status() == StatusCode::CONFLICT {
            warn!("🚫 [LEASE_CONFLICT]: task {task_id} is no longer leased to this agent");
            return Err(ClientError::ServerRejection("HTTP_409".to_string()));
        }
        Self::expect_status(response, StatusCode::NO_CONTENT).await?;
        Ok(())
    }

    #[instrument(skip(self, cracks))]
    pub async fn submit_cracks(&self, task_id: &str, cracks: &[SubmitCrackEntry]) -> Result<(), ClientError> {
        let response = self
            .network_session_client
            .post(self.endpoint(&format!("/client/tasks/{task_id}/cracks")))
            .json(cracks)
            .send()
            .await?;
        Self::expect_status(response, StatusCode::NO_CONTENT).await?;
        Ok(())
    }

    #[instrument(skip(self, request))]
    pub async fn report_error(&self, task_id: &str, request: &ReportErrorRequest) -> Result<(), ClientError> {
        let response = self
            .network_session_client
            .post(self.endpoint(&format!("/client/tasks/{task_id}/error")))
            .json(request)
            .send()
            .await?;
        Self::expect_status(response, StatusCode::NO_CONTENT).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn abandon_task(&self, task_id: &str) -> Result<(), ClientError> {
        let response = self
            .network_session_client
            .post(self.endpoint(&format!("/client/tasks/{task_id}/abandon")))
            .send()
            .await?;
        Self::expect_status(response, StatusCode::NO_CONTENT).await?;
        Ok(())
    }
}
