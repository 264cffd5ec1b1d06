// [apps/orchestrator/src/routes.rs]
/*!
 * APARATO: ROUTING MATRIX (ESTRATO L3)
 * RESPONSABILIDAD: COMPOSICION DEL ARBOL DE RUTAS HTTP
 *
 * Dos estratos conviven aquí: `/client/*` — protocolo de agentes hashcat,
 * detrás de `agent_auth_guard` — y `/operator/*` — CRUD delgado, sin guardia
 * propia (§1 no-goal: RBAC de operador). `/health` vive fuera de ambos.
 */

use crate::handlers::{agent_api, operator};
use crate::middleware::agent_auth_guard;
use crate::state::AppState;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::{middleware, Router};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

pub fn create_router(application_shared_state: AppState) -> Router {
    let network_security_shield = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let client_stratum = Router::new()
        .route("/agents", post(agent_api::register_agent))
        .route("/agents/:agent_id", get(agent_api::get_agent))
        .route("/agents/:agent_id/submit_benchmark", post(agent_api::submit_benchmarks))
        .route("/agents/:agent_id/heartbeat", post(agent_api::heartbeat))
        .route("/attacks/:attack_id", get(agent_api::fetch_attack))
        .route("/tasks/new", get(agent_api::next_task))
        .route("/tasks/:task_id/submit_status", post(agent_api::submit_status))
        .route("/tasks/:task_id/submit_crack", post(agent_api::submit_cracks))
        .route("/tasks/:task_id/exhausted", post(agent_api::abandon_task))
        .route("/tasks/:task_id/abandon", post(agent_api::abandon_task))
        .route("/tasks/:task_id/error", post(agent_api::report_error))
        .route("/tasks/:task_id/confirm_cancel", post(agent_api::confirm_cancel))
        .layer(middleware::from_fn_with_state(application_shared_state.clone(), agent_auth_guard));

    let operator_stratum = Router::new()
        .route("/projects", post(operator::create_project).get(operator::list_projects))
        .route("/projects/:project_id/hash_lists", post(operator::create_hash_list))
        .route("/resources", post(operator::create_resource))
        .route("/resources/:resource_id/line_count", post(operator::set_resource_line_count))
        .route("/campaigns", post(operator::create_campaign))
        .route("/campaigns/:campaign_id", get(operator::get_campaign))
        .route("/campaigns/:campaign_id/activate", post(operator::activate_campaign))
        .route("/campaigns/:campaign_id/archive", post(operator::archive_campaign))
        .route("/campaigns/:campaign_id/attacks", post(operator::create_attack).get(operator::list_attacks_for_campaign))
        .route("/campaigns/:campaign_id/attacks/reorder", post(operator::reorder_attacks))
        .route("/attacks/:attack_id", get(operator::get_attack))
        .route("/attacks/:attack_id/pause", post(operator::pause_attack))
        .route("/attacks/:attack_id/resume", post(operator::resume_attack))
        .route("/attacks/:attack_id/cancel", post(operator::cancel_attack))
        .route("/campaigns/:campaign_id/cancel", post(operator::cancel_campaign))
        .route("/agents/:agent_id/disable", post(operator::disable_agent))
        .route("/agents/:agent_id/enable", post(operator::enable_agent))
        .route("/agents/:agent_id/errors", get(operator::get_agent_errors))
        .route("/system/health", get(operator::system_health))
        .route("/system/maintenance/reset", post(operator::request_system_reset));

    Router::new()
        .route("/health", get(|| async { "STATUS_OK" }))
        .nest("/client", client_stratum)
        .nest("/operator", operator_stratum)
        .layer(network_security_shield)
        .with_state(application_shared_state)
}
// FIN DEL ARCHIVO [apps/orchestrator/src/routes.rs]
