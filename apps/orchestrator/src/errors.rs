// [apps/orchestrator/src/errors.rs]
/*!
 * APARATO: API ERROR CATALOG (ESTRATO L4)
 * RESPONSABILIDAD: UNIFICACIÓN DE FALLOS EN RESPUESTAS HTTP (§7)
 *
 * Cada estrato inferior declara su propio `thiserror`; este archivo es el
 * único lugar donde un fallo de dominio se traduce a un código HTTP. Las
 * rutas de los handlers devuelven `Result<T, ApiError>` y se apoyan en `?`
 * para que la conversión ocurra sin ramificación manual.
 */

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cipherswarm_agent_client::ClientError;
use cipherswarm_core_keyspace::KeyspaceError;
use cipherswarm_infra_store::{StoreError, TransitionError};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("[L4_AUTH_FAULT]: {0}")]
    Unauthenticated(String),

    #[error("[L4_SCOPE_FAULT]: {0}")]
    Forbidden(String),

    #[error("[L4_VALIDATION_FAULT]: {0}")]
    Validation(String),

    #[error("[L4_STATE_CONFLICT]: {0}")]
    Conflict(String),

    #[error("[L4_ENTITY_FAULT]: {0}")]
    NotFound(String),

    #[error("[L4_BACKPRESSURE_FAULT]: {0}")]
    Backpressure(String),

    #[error("[L4_CONFIG_FAULT]: {0}")]
    Configuration(String),

    #[error("[L4_INTERNAL_FAULT]: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ProjectNotFound
            | StoreError::HashListNotFound
            | StoreError::ResourceNotFound
            | StoreError::CampaignNotFound
            | StoreError::AttackNotFound
            | StoreError::TaskNotFound
            | StoreError::AgentNotFound => ApiError::NotFound(err.to_string()),

            StoreError::InvalidTransition(_) | StoreError::ClaimRaceLost => ApiError::Conflict(err.to_string()),

            StoreError::NotDispatchable(_) => ApiError::Validation(err.to_string()),

            StoreError::Keyspace(inner) => inner.into(),

            StoreError::ConnectionError(_)
            | StoreError::ConfigurationError(_)
            | StoreError::QueryError(_)
            | StoreError::MappingError(_)
            | StoreError::TransactionError(_) => {
                error!("store failure surfaced to API layer: {err}");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<KeyspaceError> for ApiError {
    fn from(err: KeyspaceError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<TransitionError> for ApiError {
    fn from(err: TransitionError) -> Self {
        ApiError::Conflict(err.to_string())
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        warn!("outbound agent-client call failed: {err}");
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Backpressure(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Configuration(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("🔥 [API_FAULT]: {self}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
