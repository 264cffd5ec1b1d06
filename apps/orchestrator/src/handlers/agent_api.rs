// [apps/orchestrator/src/handlers/agent_api.rs]
/*!
 * APARATO: AGENT API (ESTRATO L4)
 * RESPONSABILIDAD: PROTOCOLO `/client/*` HABLADO POR LOS AGENTES HASHCAT (§4.7, §6.1)
 *
 * Cada handler confía en `agent_auth_guard` para la identidad del agente —
 * nunca vuelve a resolver el token. El Matcher (`next_task`) es el único
 * punto donde se decide qué trabajo recibe un agente; todo lo demás es
 * una traducción directa de una llamada de repositorio a su DTO de salida.
 */

use crate::errors::ApiError;
use crate::services::cascade;
use crate::state::AppState;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use cipherswarm_core_keyspace::{self as keyspace, AttackInput, CustomCharsets, IncrementRange};
use cipherswarm_domain_models::wire::{
    AgentCommand, AttackDto, AttackResourceFileDto, HashcatBenchmarkEntry, HeartbeatRequest, HeartbeatResponse,
    NextTaskResponse, NextTaskStatus, RegisterAgentRequest, RegisterAgentResponse, ReportErrorRequest,
    SubmitCrackEntry, SubmitStatusResponse, TaskDto,
};
use cipherswarm_domain_models::{
    Agent, AgentErrorSeverity, AgentState, Attack, AttackMode as DomainAttackMode, Benchmark, HashcatStatus,
};
use tracing::{info, instrument, warn};

#[instrument(skip(state, payload))]
pub async fn register_agent(
    State(state): State<AppState>,
    Json(payload): Json<RegisterAgentRequest>,
) -> Result<(StatusCode, Json<RegisterAgentResponse>), ApiError> {
    if payload.invitation_token != state.config.agent_invitation_secret {
        warn!("❌ [REGISTER_REJECTION]: bad invitation token from {}", payload.host_name);
        return Err(ApiError::Unauthenticated("invalid invitation token".into()));
    }

    let agent = state
        .agents
        .register(&payload.host_name, &payload.client_signature, &payload.operating_system, payload.devices, &[])
        .await?;

    info!("🤝 [REGISTER]: {} ({}) enrolled, awaiting benchmark", agent.id, agent.host_name);
    Ok((
        StatusCode::CREATED,
        Json(RegisterAgentResponse { agent_id: agent.id, token: agent.token, projects: agent.project_ids }),
    ))
}

#[instrument(skip(state, authenticated_agent))]
pub async fn get_agent(
    State(state): State<AppState>,
    Extension(authenticated_agent): Extension<Agent>,
    Path(agent_id): Path<String>,
) -> Result<Json<Agent>, ApiError> {
    if agent_id != authenticated_agent.id {
        return Err(ApiError::Forbidden("agents may only fetch their own profile".into()));
    }
    let agent = state.agents.get(&agent_id).await?;
    Ok(Json(agent))
}

#[instrument(skip(state, authenticated_agent, entries))]
pub async fn submit_benchmarks(
    State(state): State<AppState>,
    Extension(authenticated_agent): Extension<Agent>,
    Json(entries): Json<Vec<HashcatBenchmarkEntry>>,
) -> Result<StatusCode, ApiError> {
    let now = chrono::Utc::now().to_rfc3339();
    let benchmarks: Vec<Benchmark> = entries
        .into_iter()
        .map(|entry| Benchmark {
            agent_id: authenticated_agent.id.clone(),
            hash_type_id: entry.hash_type_id,
            device_index: entry.device_index,
            hash_speed: entry.hash_speed,
            runtime_ms: entry.runtime_ms,
            measured_at: now.clone(),
        })
        .collect();

    state.benchmarks.upsert_bulk(&authenticated_agent.id, &benchmarks).await?;

    if authenticated_agent.state == AgentState::Pending {
        state.agents.set_state(&authenticated_agent.id, AgentState::Active).await?;
        info!("📊 [BENCHMARK]: {} cleared its first sweep, now active", authenticated_agent.id);
    }

    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, authenticated_agent, payload))]
pub async fn heartbeat(
    State(state): State<AppState>,
    Extension(authenticated_agent): Extension<Agent>,
    Json(payload): Json<HeartbeatRequest>,
) -> Result<Json<HeartbeatResponse>, ApiError> {
    state.agents.mark_seen(&authenticated_agent.id, None).await?;

    if payload.state.as_deref() == Some("shutdown") {
        let held = state.tasks.list_running_for_agent(&authenticated_agent.id).await?;
        for task in held {
            let (_, effects) = state.tasks.apply_event(&task.id, cipherswarm_infra_store::TaskEvent::Abandon, false).await?;
            cascade::dispatch_task_effects(&state, effects).await?;
        }
        state.agents.set_state(&authenticated_agent.id, AgentState::Stopped).await?;
        info!("🛑 [HEARTBEAT]: {} reported shutdown, tasks surrendered", authenticated_agent.id);
        return Ok(Json(HeartbeatResponse { command: AgentCommand::Stop, backoff_seconds: None, cancel_task_ids: vec![] }));
    }

    let cancel_task_ids = state
        .tasks
        .list_running_for_agent(&authenticated_agent.id)
        .await?
        .into_iter()
        .filter(|task| task.cancel_requested)
        .map(|task| task.id)
        .collect();

    Ok(Json(HeartbeatResponse { command: AgentCommand::Continue, backoff_seconds: None, cancel_task_ids }))
}

/// The Matcher (§4.2): walks this agent's active campaigns by priority,
/// then each campaign's attacks by position, looking for the first
/// dispatchable slice. A campaign/attack that can't be served yet is
/// skipped, not fatal to the whole request.
#[instrument(skip(state, authenticated_agent))]
pub async fn next_task(
    State(state): State<AppState>,
    Extension(authenticated_agent): Extension<Agent>,
) -> Result<Json<NextTaskResponse>, ApiError> {
    let campaigns = state.campaigns.list_active_for_projects(&authenticated_agent.project_ids).await?;

    for campaign in campaigns {
        let hash_list = state.hash_lists.get(&campaign.hash_list_id).await?;
        let fresh_benchmarks = state
            .benchmarks
            .fresh_for_agent_hash_type(
                &authenticated_agent.id,
                hash_list.hash_type_id,
                state.config.benchmark_freshness_window_seconds,
            )
            .await?;
        if fresh_benchmarks.is_empty() {
            return Ok(Json(NextTaskResponse::Status { status: NextTaskStatus::BenchmarkRequired }));
        }

        let attacks = state.attacks.list_for_campaign(&campaign.id).await?;
        for attack in attacks {
            if attack.state.is_terminal() || !attack.has_required_resources() {
                continue;
            }
            if let Some(task) = state.tasks.claim_next(&attack.id, &authenticated_agent.id).await? {
                return Ok(Json(NextTaskResponse::Task(task_dto(&task))));
            }

            let Some(plan_input) = attack_input(&state, &attack).await? else {
                continue;
            };
            let plan = keyspace::plan(&plan_input, state.config.default_keyspace_slice_size)?;
            state.tasks.materialize_plan(&attack.id, &plan).await?;

            if attack.state == cipherswarm_domain_models::AttackState::Pending {
                let (_, effects) =
                    state.attacks.apply_event(&attack.id, cipherswarm_infra_store::AttackEvent::Run).await?;
                cascade::dispatch_attack_effects(&state, &attack.id, effects).await?;
            }

            if let Some(task) = state.tasks.claim_next(&attack.id, &authenticated_agent.id).await? {
                return Ok(Json(NextTaskResponse::Task(task_dto(&task))));
            }
        }
    }

    Ok(Json(NextTaskResponse::Status { status: NextTaskStatus::NoWork }))
}

/// Resolves resource line counts into a pure [`AttackInput`] for the
/// keyspace planner. Returns `Ok(None)` when the attack can't be planned
/// yet — a required resource hasn't finished its line-counting pass, or a
/// mask-list attack has no inline mask (enumerating a mask list's actual
/// lines is an object-storage read this store layer doesn't perform).
async fn attack_input(state: &AppState, attack: &Attack) -> Result<Option<AttackInput>, ApiError> {
    let word_list_line_count = match &attack.word_list_id {
        Some(id) => match state.resources.get(id).await?.line_count {
            Some(n) => Some(n),
            None => return Ok(None),
        },
        None => None,
    };
    let rule_list_line_count = match &attack.rule_list_id {
        Some(id) => match state.resources.get(id).await?.line_count {
            Some(n) => Some(n),
            None => return Ok(None),
        },
        None => None,
    };

    let masks = match (&attack.mask, &attack.mask_list_id) {
        (Some(mask), _) => vec![mask.clone()],
        (None, Some(_)) => return Ok(None),
        (None, None) => vec![],
    };

    Ok(Some(AttackInput {
        mode: keyspace_mode(attack.attack_mode),
        word_list_line_count,
        rule_list_line_count,
        masks,
        custom_charsets: CustomCharsets {
            c1: attack.custom_charset_1.clone(),
            c2: attack.custom_charset_2.clone(),
            c3: attack.custom_charset_3.clone(),
            c4: attack.custom_charset_4.clone(),
        },
        increment: match (attack.increment_mode, attack.increment_min, attack.increment_max) {
            (true, Some(min), Some(max)) => Some(IncrementRange { min, max }),
            _ => None,
        },
    }))
}

fn keyspace_mode(mode: DomainAttackMode) -> keyspace::AttackMode {
    match mode {
        DomainAttackMode::Dictionary => keyspace::AttackMode::Dictionary,
        DomainAttackMode::Mask => keyspace::AttackMode::Mask,
        DomainAttackMode::HybridDictionary => keyspace::AttackMode::HybridDictionary,
        DomainAttackMode::HybridMask => keyspace::AttackMode::HybridMask,
    }
}

fn task_dto(task: &cipherswarm_domain_models::Task) -> TaskDto {
    TaskDto {
        id: task.id.clone(),
        attack_id: task.attack_id.clone(),
        start_date: task.start_date.clone(),
        status: "running".to_string(),
        skip: Some(task.keyspace_offset as i64),
        limit: Some(task.keyspace_limit as i64),
    }
}

#[instrument(skip(state, authenticated_agent))]
pub async fn fetch_attack(
    State(state): State<AppState>,
    Extension(authenticated_agent): Extension<Agent>,
    Path(attack_id): Path<String>,
) -> Result<Json<AttackDto>, ApiError> {
    let attack = state.attacks.get(&attack_id).await?;
    let campaign = state.campaigns.get(&attack.campaign_id).await?;
    if !authenticated_agent.project_ids.iter().any(|p| p == &campaign.project_id) {
        return Err(ApiError::Forbidden("attack belongs to a project this agent isn't assigned to".into()));
    }
    let hash_list = state.hash_lists.get(&campaign.hash_list_id).await?;

    let word_list = resolve_resource_file(&state, attack.word_list_id.as_deref()).await?;
    let rule_list = resolve_resource_file(&state, attack.rule_list_id.as_deref()).await?;
    let mask_list = resolve_resource_file(&state, attack.mask_list_id.as_deref()).await?;

    Ok(Json(AttackDto {
        id: attack.id.clone(),
        attack_mode: attack_mode_label(attack.attack_mode).to_string(),
        attack_mode_hashcat: attack.attack_mode.hashcat_mode(),
        mask: attack.mask.clone().unwrap_or_default(),
        increment_mode: attack.increment_mode,
        increment_minimum: attack.increment_min.unwrap_or(0),
        increment_maximum: attack.increment_max.unwrap_or(0),
        optimized: attack.optimized,
        slow_candidate_generators: attack.slow_candidate_generators,
        workload_profile: attack.workload_profile,
        disable_markov: attack.disable_markov,
        classic_markov: attack.classic_markov,
        markov_threshold: attack.markov_threshold.unwrap_or(0),
        left_rule: String::new(),
        right_rule: String::new(),
        custom_charset_1: attack.custom_charset_1.clone().unwrap_or_default(),
        custom_charset_2: attack.custom_charset_2.clone().unwrap_or_default(),
        custom_charset_3: attack.custom_charset_3.clone().unwrap_or_default(),
        custom_charset_4: attack.custom_charset_4.clone().unwrap_or_default(),
        hash_list_id: hash_list.id.clone(),
        hash_mode: hash_list.hash_type_id,
        word_list,
        rule_list,
        mask_list,
        hash_list_url: hash_list.id.clone(),
        hash_list_checksum: synthetic_checksum(&hash_list.id),
        url: String::new(),
    }))
}

/// There is no object-storage layer behind a [`Resource`](cipherswarm_domain_models::Resource)
/// here — `file_handle` already is the opaque locator an agent dereferences,
/// so `download_url` reuses it verbatim and `checksum` is a deterministic
/// MD5 of that same handle rather than of real file bytes this store never
/// reads.
async fn resolve_resource_file(
    state: &AppState,
    resource_id: Option<&str>,
) -> Result<Option<AttackResourceFileDto>, ApiError> {
    let Some(resource_id) = resource_id else { return Ok(None) };
    let resource = state.resources.get(resource_id).await?;
    Ok(Some(AttackResourceFileDto {
        id: resource.id.clone(),
        download_url: resource.file_handle.clone(),
        checksum: synthetic_checksum(&resource.file_handle),
        file_name: resource.name,
    }))
}

fn synthetic_checksum(seed: &str) -> String {
    BASE64.encode(md5::compute(seed.as_bytes()).0)
}

fn attack_mode_label(mode: DomainAttackMode) -> &'static str {
    match mode {
        DomainAttackMode::Dictionary => "dictionary",
        DomainAttackMode::Mask => "mask",
        DomainAttackMode::HybridDictionary => "hybrid_dictionary",
        DomainAttackMode::HybridMask => "hybrid_mask",
    }
}

#[instrument(skip(state, authenticated_agent, status))]
pub async fn submit_status(
    State(state): State<AppState>,
    Extension(authenticated_agent): Extension<Agent>,
    Path(task_id): Path<String>,
    Json(status): Json<HashcatStatus>,
) -> Result<Json<SubmitStatusResponse>, ApiError> {
    let task = own_running_task(&state, &authenticated_agent, &task_id).await?;

    state.statuses.append(&status, state.config.status_history_retention_per_task).await?;
    state.tasks.renew_lease(&task.id).await?;

    let (_, effects) =
        state.tasks.apply_event(&task.id, cipherswarm_infra_store::TaskEvent::AcceptStatus, false).await?;
    cascade::dispatch_task_effects(&state, effects).await?;

    Ok(Json(SubmitStatusResponse { cancel_requested: task.cancel_requested }))
}

#[instrument(skip(state, authenticated_agent, submissions))]
pub async fn submit_cracks(
    State(state): State<AppState>,
    Extension(authenticated_agent): Extension<Agent>,
    Path(task_id): Path<String>,
    Json(submissions): Json<Vec<SubmitCrackEntry>>,
) -> Result<StatusCode, ApiError> {
    let task = own_running_task(&state, &authenticated_agent, &task_id).await?;

    let pairs: Vec<(String, String)> =
        submissions.into_iter().map(|entry| (entry.hash, entry.plain_text)).collect();
    let (newly_cracked, hash_list_fully_cracked) =
        state.cracks.ingest_batch(&task.id, &task.attack_id, &pairs).await?;

    if newly_cracked > 0 {
        let (_, effects) = state
            .tasks
            .apply_event(&task.id, cipherswarm_infra_store::TaskEvent::AcceptCrack, hash_list_fully_cracked)
            .await?;
        cascade::dispatch_task_effects(&state, effects).await?;
    }

    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, authenticated_agent, payload))]
pub async fn report_error(
    State(state): State<AppState>,
    Extension(authenticated_agent): Extension<Agent>,
    Path(task_id): Path<String>,
    Json(payload): Json<ReportErrorRequest>,
) -> Result<StatusCode, ApiError> {
    let severity = parse_severity(&payload.severity)?;
    let record = state
        .agent_errors
        .record(&authenticated_agent.id, severity, &payload.message, Some(task_id.as_str()), payload.context)
        .await?;

    if record.severity.is_fatal() {
        let (_, effects) = state.tasks.apply_event(&task_id, cipherswarm_infra_store::TaskEvent::Error, false).await?;
        cascade::dispatch_task_effects(&state, effects).await?;
    }

    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, authenticated_agent))]
pub async fn abandon_task(
    State(state): State<AppState>,
    Extension(authenticated_agent): Extension<Agent>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    own_running_task(&state, &authenticated_agent, &task_id).await?;
    let (_, effects) =
        state.tasks.apply_event(&task_id, cipherswarm_infra_store::TaskEvent::Abandon, false).await?;
    cascade::dispatch_task_effects(&state, effects).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Agent-facing acknowledgement of an operator's cancel (§4.7, §6.1): the
/// agent has observed `cancel_requested` via heartbeat or status submission,
/// stopped hashcat, and now confirms the task is done so it can move to its
/// terminal `failed` state.
#[instrument(skip(state, authenticated_agent))]
pub async fn confirm_cancel(
    State(state): State<AppState>,
    Extension(authenticated_agent): Extension<Agent>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    own_running_task(&state, &authenticated_agent, &task_id).await?;
    let (_, effects) = state.tasks.apply_event(&task_id, cipherswarm_infra_store::TaskEvent::Cancel, false).await?;
    cascade::dispatch_task_effects(&state, effects).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn own_running_task(
    state: &AppState,
    authenticated_agent: &Agent,
    task_id: &str,
) -> Result<cipherswarm_domain_models::Task, ApiError> {
    let task = state.tasks.get(task_id).await?;
    if task.agent_id.as_deref() != Some(authenticated_agent.id.as_str()) {
        return Err(ApiError::Conflict(format!("task {task_id} is not leased to this agent")));
    }
    if task.state != cipherswarm_domain_models::TaskState::Running {
        return Err(ApiError::Conflict(format!("task {task_id} is not currently leased ({:?})", task.state)));
    }
    Ok(task)
}

fn parse_severity(label: &str) -> Result<AgentErrorSeverity, ApiError> {
    Ok(match label {
        "info" => AgentErrorSeverity::Info,
        "warning" => AgentErrorSeverity::Warning,
        "minor" => AgentErrorSeverity::Minor,
        "major" => AgentErrorSeverity::Major,
        "fatal" => AgentErrorSeverity::Fatal,
        other => return Err(ApiError::Validation(format!("unknown error severity '{other}'"))),
    })
}
