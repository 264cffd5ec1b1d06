// [apps/orchestrator/src/handlers/operator.rs]
/*!
 * APARATO: OPERATOR API (ESTRATO L4)
 * RESPONSABILIDAD: GESTION DE PROYECTOS, CAMPAÑAS, ATAQUES Y AGENTES (§6.3)
 *
 * Deliberadamente delgada: sin cuentas de operador ni RBAC propio (§1 no-goal)
 * — cualquier cliente con acceso de red a este nest puede administrar el
 * enjambre. Cada handler traduce un payload a una llamada de repositorio y,
 * cuando esa llamada produce efectos, los despacha él mismo antes de
 * responder — la misma disciplina que el nest `/client/*`.
 */

use crate::errors::ApiError;
use crate::services::cascade;
use crate::state::AppState;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use cipherswarm_domain_models::{
    Agent, AgentState, Attack, AttackState, Campaign, CampaignPriority, HashList, Project, Resource, ResourceKind,
};
use cipherswarm_infra_store::{AttackEvent, CampaignEvent};
use serde::Deserialize;
use serde_json::json;
use tracing::{instrument, warn};

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
}

#[instrument(skip(state, payload))]
pub async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let project = state.projects.create(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

#[instrument(skip(state))]
pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(state.projects.list().await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateHashListRequest {
    pub name: String,
    pub hash_type_id: i32,
    pub hashes: Vec<(String, Option<String>)>,
}

#[instrument(skip(state, payload))]
pub async fn create_hash_list(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(payload): Json<CreateHashListRequest>,
) -> Result<(StatusCode, Json<HashList>), ApiError> {
    let hash_list = state.hash_lists.create(&project_id, &payload.name, payload.hash_type_id, &payload.hashes).await?;
    Ok((StatusCode::CREATED, Json(hash_list)))
}

#[derive(Debug, Deserialize)]
pub struct CreateResourceRequest {
    pub name: String,
    pub kind: ResourceKind,
    pub file_handle: String,
    pub sensitive: bool,
    pub project_ids: Vec<String>,
}

#[instrument(skip(state, payload))]
pub async fn create_resource(
    State(state): State<AppState>,
    Json(payload): Json<CreateResourceRequest>,
) -> Result<(StatusCode, Json<Resource>), ApiError> {
    let resource = state
        .resources
        .create(&payload.name, payload.kind, &payload.file_handle, payload.sensitive, &payload.project_ids)
        .await?;
    Ok((StatusCode::CREATED, Json(resource)))
}

#[derive(Debug, Deserialize)]
pub struct SetLineCountRequest {
    pub line_count: u64,
}

#[instrument(skip(state, payload))]
pub async fn set_resource_line_count(
    State(state): State<AppState>,
    Path(resource_id): Path<String>,
    Json(payload): Json<SetLineCountRequest>,
) -> Result<StatusCode, ApiError> {
    state.resources.set_line_count(&resource_id, payload.line_count).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequest {
    pub project_id: String,
    pub name: String,
    pub priority: CampaignPriority,
    pub hash_list_id: String,
}

#[instrument(skip(state, payload))]
pub async fn create_campaign(
    State(state): State<AppState>,
    Json(payload): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<Campaign>), ApiError> {
    let campaign =
        state.campaigns.create(&payload.project_id, &payload.name, payload.priority, &payload.hash_list_id).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

#[instrument(skip(state))]
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> Result<Json<Campaign>, ApiError> {
    Ok(Json(state.campaigns.get(&campaign_id).await?))
}

#[instrument(skip(state))]
pub async fn activate_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> Result<Json<Campaign>, ApiError> {
    let (campaign, effects) = state.campaigns.apply_event(&campaign_id, CampaignEvent::Activate).await?;
    cascade::dispatch_campaign_effects(&state, effects).await?;
    Ok(Json(campaign))
}

#[instrument(skip(state))]
pub async fn archive_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> Result<Json<Campaign>, ApiError> {
    let (campaign, effects) = state.campaigns.apply_event(&campaign_id, CampaignEvent::Archive).await?;
    cascade::dispatch_campaign_effects(&state, effects).await?;
    Ok(Json(campaign))
}

#[derive(Debug, Deserialize)]
pub struct CreateAttackRequest {
    pub position: i32,
    pub attack_mode: cipherswarm_domain_models::AttackMode,
    pub word_list_id: Option<String>,
    pub rule_list_id: Option<String>,
    pub mask_list_id: Option<String>,
    pub mask: Option<String>,
    pub custom_charset_1: Option<String>,
    pub custom_charset_2: Option<String>,
    pub custom_charset_3: Option<String>,
    pub custom_charset_4: Option<String>,
    pub increment_mode: bool,
    pub increment_min: Option<u32>,
    pub increment_max: Option<u32>,
    pub workload_profile: u8,
    pub optimized: bool,
    pub disable_markov: bool,
    pub classic_markov: bool,
    pub markov_threshold: Option<u32>,
    pub slow_candidate_generators: bool,
}

#[instrument(skip(state, payload))]
pub async fn create_attack(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    Json(payload): Json<CreateAttackRequest>,
) -> Result<(StatusCode, Json<Attack>), ApiError> {
    let attack = Attack {
        id: String::new(),
        campaign_id: String::new(),
        position: payload.position,
        attack_mode: payload.attack_mode,
        word_list_id: payload.word_list_id,
        rule_list_id: payload.rule_list_id,
        mask_list_id: payload.mask_list_id,
        mask: payload.mask,
        custom_charset_1: payload.custom_charset_1,
        custom_charset_2: payload.custom_charset_2,
        custom_charset_3: payload.custom_charset_3,
        custom_charset_4: payload.custom_charset_4,
        increment_mode: payload.increment_mode,
        increment_min: payload.increment_min,
        increment_max: payload.increment_max,
        workload_profile: payload.workload_profile,
        optimized: payload.optimized,
        disable_markov: payload.disable_markov,
        classic_markov: payload.classic_markov,
        markov_threshold: payload.markov_threshold,
        slow_candidate_generators: payload.slow_candidate_generators,
        start_time: None,
        end_time: None,
        state: AttackState::Pending,
    };
    let created = state.attacks.create(&campaign_id, attack).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state))]
pub async fn get_attack(
    State(state): State<AppState>,
    Path(attack_id): Path<String>,
) -> Result<Json<Attack>, ApiError> {
    Ok(Json(state.attacks.get(&attack_id).await?))
}

#[instrument(skip(state))]
pub async fn list_attacks_for_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> Result<Json<Vec<Attack>>, ApiError> {
    Ok(Json(state.attacks.list_for_campaign(&campaign_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ReorderAttacksRequest {
    pub ordered_attack_ids: Vec<String>,
}

#[instrument(skip(state, payload))]
pub async fn reorder_attacks(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    Json(payload): Json<ReorderAttacksRequest>,
) -> Result<StatusCode, ApiError> {
    state.attacks.reorder(&campaign_id, &payload.ordered_attack_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn pause_attack(
    State(state): State<AppState>,
    Path(attack_id): Path<String>,
) -> Result<Json<Attack>, ApiError> {
    let (attack, effects) = state.attacks.apply_event(&attack_id, AttackEvent::Pause).await?;
    cascade::dispatch_attack_effects(&state, &attack_id, effects).await?;
    Ok(Json(attack))
}

#[instrument(skip(state))]
pub async fn resume_attack(
    State(state): State<AppState>,
    Path(attack_id): Path<String>,
) -> Result<Json<Attack>, ApiError> {
    let (attack, effects) = state.attacks.apply_event(&attack_id, AttackEvent::Resume).await?;
    cascade::dispatch_attack_effects(&state, &attack_id, effects).await?;
    Ok(Json(attack))
}

/// Operator cancel (§4.7, §5): pending tasks of this attack fail outright,
/// running tasks are flagged and wait on the owning agent's confirmation.
#[instrument(skip(state))]
pub async fn cancel_attack(
    State(state): State<AppState>,
    Path(attack_id): Path<String>,
) -> Result<Json<Attack>, ApiError> {
    let (attack, effects) = state.attacks.apply_event(&attack_id, AttackEvent::Cancel).await?;
    cascade::dispatch_attack_effects(&state, &attack_id, effects).await?;
    Ok(Json(attack))
}

/// Cancels every non-completed attack in the campaign. There is no
/// campaign-level cancelled state (§3) — this fans straight out to the
/// child attacks, best-effort: an attack that can't accept `Cancel` from its
/// current state (already terminal) is skipped, not fatal to the request.
#[instrument(skip(state))]
pub async fn cancel_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let attacks = state.attacks.list_for_campaign(&campaign_id).await?;
    for attack in attacks {
        if attack.state.is_terminal() {
            continue;
        }
        match state.attacks.apply_event(&attack.id, AttackEvent::Cancel).await {
            Ok((_, effects)) => cascade::dispatch_attack_effects(&state, &attack.id, effects).await?,
            Err(err) => warn!("attack {} did not accept campaign-wide cancel: {err}", attack.id),
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn disable_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<Agent>, ApiError> {
    Ok(Json(state.agents.set_state(&agent_id, AgentState::Stopped).await?))
}

#[instrument(skip(state))]
pub async fn enable_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<Agent>, ApiError> {
    Ok(Json(state.agents.set_state(&agent_id, AgentState::Active).await?))
}

#[instrument(skip(state))]
pub async fn get_agent_errors(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<Vec<cipherswarm_domain_models::AgentError>>, ApiError> {
    Ok(Json(state.agent_errors.list_for_agent(&agent_id).await?))
}

#[instrument(skip(state))]
pub async fn system_health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let report = json!({
        "status": "ok",
        "task_lease_ttl_seconds": state.config.task_lease_ttl_seconds,
        "reclamation_sweep_interval_seconds": state.config.reclamation_sweep_interval_seconds,
        "cpu_cores_logical": num_cpus::get(),
    });
    (StatusCode::OK, Json(report))
}

/// Full-system reset (drop every campaign/attack/task row) isn't a decision
/// this API makes lightly — it's destructive and irreversible, and the
/// CipherSwarm wire protocol has no notion of it either. Reserved for a
/// future maintenance window; for now it only records intent.
#[instrument(skip(_state))]
pub async fn request_system_reset(State(_state): State<AppState>) -> StatusCode {
    warn!("🚨 [MAINTENANCE]: system reset requested but not implemented");
    StatusCode::NOT_IMPLEMENTED
}
