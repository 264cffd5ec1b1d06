// [apps/orchestrator/src/middleware.rs]
/*!
 * APARATO: AGENT AUTHENTICATION GUARD (ESTRATO L4)
 * RESPONSABILIDAD: VALIDACION DEL TOKEN PORTADOR DEL AGENTE (§6.1)
 *
 * Operador/administrador queda fuera de alcance (§1) — solo existe una
 * identidad que autenticar contra el `/client/*` nest: el agente dueño del
 * token `csa_<agent_id>_<opaque>`. El agente resuelto se inyecta como
 * extensión de la petición para que los handlers lo reciban vía
 * `Extension<Agent>` en lugar de volver a resolverlo desde el header.
 */

use crate::errors::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use cipherswarm_domain_models::Agent;
use tracing::warn;

pub async fn agent_auth_guard(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer_token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthenticated("missing bearer token".into()))?;

    let agent: Agent = state.agents.get_by_token(bearer_token).await.map_err(|_| {
        warn!("❌ [AUTH_REJECTION]: unrecognized agent token");
        ApiError::Unauthenticated("invalid agent token".into())
    })?;

    req.extensions_mut().insert(agent);
    Ok(next.run(req).await)
}
