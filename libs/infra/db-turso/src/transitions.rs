// [libs/infra/db-turso/src/transitions.rs]
/*!
 * =================================================================
 * APARATO: STATE ENGINE TRANSITION TABLES (ESTRATO L3)
 * RESPONSABILIDAD: MAQUINA DE ESTADOS PURA PARA TASK/ATTACK/CAMPAIGN
 *
 * Cada función aquí es `(estado, evento, contexto) -> (estado', efectos[])`
 * sin acceso a la base de datos ni al reloj. El repositorio que la invoca
 * calcula el contexto (p.ej. "¿están todas las tareas hermanas en estado
 * terminal?") mediante una consulta previa, ejecuta la escritura dentro de
 * su propia transacción, y despacha los efectos (broadcast, cascada) fuera
 * de ella. Mantener esta función pura es lo que la hace exhaustivamente
 * comprobable sin un Connection de libSQL.
 * =================================================================
 */

use cipherswarm_domain_models::{AttackState, CampaignState, RealTimeEvent, TaskState};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("[L3_STATE_FAULT]: event {event:?} is not valid from state {from:?}")]
    Invalid { from: String, event: String },
}

fn invalid<S: std::fmt::Debug, E: std::fmt::Debug>(from: S, event: E) -> TransitionError {
    TransitionError::Invalid { from: format!("{from:?}"), event: format!("{event:?}") }
}

// --------------------------------------------------------------------
// Task
// --------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent {
    Accept,
    Run,
    Complete,
    AcceptCrack,
    AcceptStatus,
    Pause,
    Resume,
    Exhaust,
    Error,
    Cancel,
    Abandon,
}

/// Cascade/side-effect intents a task transition may request. The calling
/// repository method executes these after the row write commits.
#[derive(Debug, Clone)]
pub enum Effect {
    Broadcast(RealTimeEvent),
    /// Re-evaluate the parent attack's own transition (e.g. all siblings
    /// terminal now that this task reached a terminal state).
    CascadeAttack { attack_id: String, event: AttackEvent },
    /// Purge HashcatStatus rows for this task beyond the retention window.
    PurgeStatusHistory { task_id: String },
}

#[derive(Debug, Clone)]
pub struct TaskContext {
    pub task_id: String,
    pub attack_id: String,
    /// Only meaningful for `AcceptCrack`: whether the attack's hash list has
    /// zero uncracked items remaining after this batch.
    pub hash_list_fully_cracked: bool,
    /// Only meaningful for leaving `running` by success/exhaustion: whether
    /// every other task of the same attack is already in a terminal state.
    pub siblings_all_terminal: bool,
}

pub fn transition_task(
    state: TaskState,
    event: TaskEvent,
    ctx: &TaskContext,
) -> Result<(TaskState, Vec<Effect>), TransitionError> {
    use TaskEvent::*;
    use TaskState::*;

    let (next, mut effects): (TaskState, Vec<Effect>) = match (state, event) {
        (Pending, Accept) | (Pending, Run) => (Running, vec![]),

        (Running, Complete) => (Completed, vec![Effect::PurgeStatusHistory { task_id: ctx.task_id.clone() }]),

        (Running, AcceptCrack) => {
            if ctx.hash_list_fully_cracked {
                (Completed, vec![Effect::PurgeStatusHistory { task_id: ctx.task_id.clone() }])
            } else {
                (Running, vec![])
            }
        }

        (s, AcceptStatus) if s != Paused => (Running, vec![]),

        (Pending, Pause) | (Running, Pause) => (Paused, vec![]),

        (Paused, Resume) => (Pending, vec![]),

        (Running, Exhaust) => (Exhausted, vec![]),

        (Running, Error) => (Failed, vec![]),

        (Pending, Cancel) | (Running, Cancel) => (Failed, vec![]),

        (Running, Abandon) => (Pending, vec![]),

        _ => return Err(invalid(state, event)),
    };

    effects.push(Effect::Broadcast(RealTimeEvent::TaskStateChanged {
        task_id: ctx.task_id.clone(),
        attack_id: ctx.attack_id.clone(),
        state: task_state_label(next).to_string(),
    }));

    if next.is_terminal() && ctx.siblings_all_terminal {
        let cascade_event = match next {
            Exhausted => AttackEvent::Exhaust,
            Completed => AttackEvent::Complete,
            Failed => AttackEvent::Cancel,
            _ => unreachable!("is_terminal() only returns true for the arms above"),
        };
        effects.push(Effect::CascadeAttack { attack_id: ctx.attack_id.clone(), event: cascade_event });
    }

    Ok((next, effects))
}

fn task_state_label(s: TaskState) -> &'static str {
    match s {
        TaskState::Pending => "pending",
        TaskState::Running => "running",
        TaskState::Paused => "paused",
        TaskState::Completed => "completed",
        TaskState::Exhausted => "exhausted",
        TaskState::Failed => "failed",
    }
}

// --------------------------------------------------------------------
// Attack
// --------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackEvent {
    Accept,
    Run,
    Complete,
    Exhaust,
    Pause,
    Resume,
    Abandon,
    Cancel,
    Error,
    Reset,
}

#[derive(Debug, Clone)]
pub enum AttackEffect {
    Broadcast(RealTimeEvent),
    /// Non-paused tasks must be paused / paused tasks resumed+marked stale.
    CascadeTasksPause,
    CascadeTasksResume,
    /// All child tasks are destroyed; the attack will be re-planned.
    DestroyChildTasks,
    /// All remaining non-completed tasks must be force-completed before
    /// this attack transition is considered final.
    ForceCompleteRemainingTasks,
    CascadeCampaign { campaign_id: String, event: CampaignEvent },
    /// Operator cancel propagates down: pending tasks fail immediately,
    /// running tasks are flagged for the agent to observe and confirm (§5).
    CascadeTasksCancel,
}

#[derive(Debug, Clone)]
pub struct AttackContext {
    pub attack_id: String,
    pub campaign_id: String,
    pub hash_list_fully_cracked: bool,
}

pub fn transition_attack(
    state: AttackState,
    event: AttackEvent,
    ctx: &AttackContext,
) -> Result<(AttackState, Vec<AttackEffect>), TransitionError> {
    use AttackEvent::*;
    use AttackState::*;

    let (next, mut effects): (AttackState, Vec<AttackEffect>) = match (state, event) {
        (s, Accept) if s != Completed && s != Failed => (Running, vec![]),
        (Pending, Run) => (Running, vec![]),

        (Running, Complete) => {
            let mut fx = vec![];
            if ctx.hash_list_fully_cracked {
                fx.push(AttackEffect::ForceCompleteRemainingTasks);
            }
            (Completed, fx)
        }

        (Running, Exhaust) => (Exhausted, vec![]),

        (s, Pause) if s == Pending || s == Running => (Paused, vec![AttackEffect::CascadeTasksPause]),

        (Paused, Resume) => (Running, vec![AttackEffect::CascadeTasksResume]),

        (Running, Abandon) => (Pending, vec![AttackEffect::DestroyChildTasks]),

        (s, Cancel) if s != Completed => (Failed, vec![AttackEffect::CascadeTasksCancel]),

        (Running, Error) => (Failed, vec![]),

        (Failed, Reset) | (Completed, Reset) | (Exhausted, Reset) => (Pending, vec![]),

        _ => return Err(invalid(state, event)),
    };

    effects.push(AttackEffect::Broadcast(RealTimeEvent::AttackStateChanged {
        attack_id: ctx.attack_id.clone(),
        campaign_id: ctx.campaign_id.clone(),
        state: attack_state_label(next).to_string(),
    }));

    if next == Completed && ctx.hash_list_fully_cracked {
        effects.push(AttackEffect::CascadeCampaign { campaign_id: ctx.campaign_id.clone(), event: CampaignEvent::Complete });
    }

    Ok((next, effects))
}

fn attack_state_label(s: AttackState) -> &'static str {
    match s {
        AttackState::Pending => "pending",
        AttackState::Running => "running",
        AttackState::Paused => "paused",
        AttackState::Completed => "completed",
        AttackState::Exhausted => "exhausted",
        AttackState::Failed => "failed",
    }
}

// --------------------------------------------------------------------
// Campaign
// --------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignEvent {
    Activate,
    Complete,
    Pause,
    Resume,
    Archive,
}

#[derive(Debug, Clone)]
pub enum CampaignEffect {
    Broadcast(RealTimeEvent),
    /// The campaign's hash list emptied out: every other non-completed
    /// attack in it is fanned out a `Complete` event too (§4.4, best-effort).
    CascadeSiblingAttacksComplete { campaign_id: String },
}

#[derive(Debug, Clone)]
pub struct CampaignContext {
    pub campaign_id: String,
}

pub fn transition_campaign(
    state: CampaignState,
    event: CampaignEvent,
    ctx: &CampaignContext,
) -> Result<(CampaignState, Vec<CampaignEffect>), TransitionError> {
    use CampaignEvent::*;
    use CampaignState::*;

    let (next, mut effects): (CampaignState, Vec<CampaignEffect>) = match (state, event) {
        (Draft, Activate) => (Active, vec![]),
        (Active, Complete) => {
            (Completed, vec![CampaignEffect::CascadeSiblingAttacksComplete { campaign_id: ctx.campaign_id.clone() }])
        }
        (Active, Pause) => (Active, vec![]), // operator pause is modeled attack-side; campaign stays active
        (Active, Resume) => (Active, vec![]),
        (s, Archive) if s != Archived => (Archived, vec![]),
        _ => return Err(invalid(state, event)),
    };

    effects.push(CampaignEffect::Broadcast(RealTimeEvent::CampaignStateChanged {
        campaign_id: ctx.campaign_id.clone(),
        state: campaign_state_label(next).to_string(),
    }));

    Ok((next, effects))
}

fn campaign_state_label(s: CampaignState) -> &'static str {
    match s {
        CampaignState::Draft => "draft",
        CampaignState::Active => "active",
        CampaignState::Completed => "completed",
        CampaignState::Archived => "archived",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_ctx() -> TaskContext {
        TaskContext {
            task_id: "t1".into(),
            attack_id: "a1".into(),
            hash_list_fully_cracked: false,
            siblings_all_terminal: false,
        }
    }

    #[test]
    fn pending_accept_goes_running() {
        let (next, _) = transition_task(TaskState::Pending, TaskEvent::Accept, &task_ctx()).unwrap();
        assert_eq!(next, TaskState::Running);
    }

    #[test]
    fn accept_crack_completes_only_when_hash_list_fully_cracked() {
        let mut ctx = task_ctx();
        let (next, _) = transition_task(TaskState::Running, TaskEvent::AcceptCrack, &ctx).unwrap();
        assert_eq!(next, TaskState::Running);

        ctx.hash_list_fully_cracked = true;
        let (next, _) = transition_task(TaskState::Running, TaskEvent::AcceptCrack, &ctx).unwrap();
        assert_eq!(next, TaskState::Completed);
    }

    #[test]
    fn terminal_state_with_terminal_siblings_cascades_to_attack() {
        let mut ctx = task_ctx();
        ctx.siblings_all_terminal = true;
        let (next, effects) = transition_task(TaskState::Running, TaskEvent::Exhaust, &ctx).unwrap();
        assert_eq!(next, TaskState::Exhausted);
        assert!(effects.iter().any(|e| matches!(e, Effect::CascadeAttack { event: AttackEvent::Exhaust, .. })));
    }

    #[test]
    fn terminal_state_without_terminal_siblings_does_not_cascade() {
        let ctx = task_ctx();
        let (_, effects) = transition_task(TaskState::Running, TaskEvent::Exhaust, &ctx).unwrap();
        assert!(!effects.iter().any(|e| matches!(e, Effect::CascadeAttack { .. })));
    }

    #[test]
    fn resume_goes_to_pending_not_running() {
        let (next, _) = transition_task(TaskState::Paused, TaskEvent::Resume, &task_ctx()).unwrap();
        assert_eq!(next, TaskState::Pending);
    }

    #[test]
    fn paused_rejects_accept_status() {
        assert!(transition_task(TaskState::Paused, TaskEvent::AcceptStatus, &task_ctx()).is_err());
    }

    #[test]
    fn abandon_returns_task_to_pending() {
        let (next, _) = transition_task(TaskState::Running, TaskEvent::Abandon, &task_ctx()).unwrap();
        assert_eq!(next, TaskState::Pending);
    }

    #[test]
    fn attack_abandon_destroys_children() {
        let ctx = AttackContext { attack_id: "a1".into(), campaign_id: "c1".into(), hash_list_fully_cracked: false };
        let (next, effects) = transition_attack(AttackState::Running, AttackEvent::Abandon, &ctx).unwrap();
        assert_eq!(next, AttackState::Pending);
        assert!(effects.iter().any(|e| matches!(e, AttackEffect::DestroyChildTasks)));
    }

    #[test]
    fn attack_complete_with_fully_cracked_list_cascades_campaign() {
        let ctx = AttackContext { attack_id: "a1".into(), campaign_id: "c1".into(), hash_list_fully_cracked: true };
        let (next, effects) = transition_attack(AttackState::Running, AttackEvent::Complete, &ctx).unwrap();
        assert_eq!(next, AttackState::Completed);
        assert!(effects.iter().any(|e| matches!(e, AttackEffect::ForceCompleteRemainingTasks)));
        assert!(effects.iter().any(|e| matches!(e, AttackEffect::CascadeCampaign { .. })));
    }

    #[test]
    fn campaign_draft_to_active() {
        let ctx = CampaignContext { campaign_id: "c1".into() };
        let (next, _) = transition_campaign(CampaignState::Draft, CampaignEvent::Activate, &ctx).unwrap();
        assert_eq!(next, CampaignState::Active);
    }

    #[test]
    fn campaign_rejects_activate_from_archived() {
        let ctx = CampaignContext { campaign_id: "c1".into() };
        assert!(transition_campaign(CampaignState::Archived, CampaignEvent::Activate, &ctx).is_err());
    }

    #[test]
    fn attack_cancel_cascades_to_tasks() {
        let ctx = AttackContext { attack_id: "a1".into(), campaign_id: "c1".into(), hash_list_fully_cracked: false };
        let (next, effects) = transition_attack(AttackState::Running, AttackEvent::Cancel, &ctx).unwrap();
        assert_eq!(next, AttackState::Failed);
        assert!(effects.iter().any(|e| matches!(e, AttackEffect::CascadeTasksCancel)));
    }

    #[test]
    fn attack_cancel_rejected_once_completed() {
        let ctx = AttackContext { attack_id: "a1".into(), campaign_id: "c1".into(), hash_list_fully_cracked: false };
        assert!(transition_attack(AttackState::Completed, AttackEvent::Cancel, &ctx).is_err());
    }

    #[test]
    fn campaign_complete_cascades_to_sibling_attacks() {
        let ctx = CampaignContext { campaign_id: "c1".into() };
        let (next, effects) = transition_campaign(CampaignState::Active, CampaignEvent::Complete, &ctx).unwrap();
        assert_eq!(next, CampaignState::Completed);
        assert!(effects.iter().any(|e| matches!(e, CampaignEffect::CascadeSiblingAttacksComplete { .. })));
    }
}
