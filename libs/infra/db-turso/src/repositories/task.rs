// [libs/infra/db-turso/src/repositories/task.rs]
/*!
 * APARATO: TASK REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: RECLAMACION ATOMICA DE SLICES Y BARRIDO DE ZOMBIS
 *
 * El reclamo de una tarea pendiente es una única sentencia UPDATE
 * condicional: cero filas afectadas significa "otro agente ganó la
 * carrera", no un error. No existe un paso de SELECT-then-UPDATE que
 * pueda dividirse entre dos conexiones.
 */

use crate::errors::{StoreError, StoreResult};
use crate::transitions::{self, Effect, TaskContext, TaskEvent};
use crate::StoreClient;
use cipherswarm_core_keyspace::KeyspacePlan;
use cipherswarm_domain_models::{Task, TaskState};
use libsql::{params, Connection};
use tracing::{info, instrument, warn};

/// Default lease TTL when the orchestrator's configuration doesn't override
/// it. Tasks whose `activity_timestamp` is older than the threshold passed
/// to [`TaskRepository::reclaim_zombies`] are presumed abandoned by a dead
/// or partitioned agent and are swept back to `pending`.
pub const DEFAULT_ZOMBIE_THRESHOLD_SECONDS: i64 = 1_800;

pub struct TaskRepository {
    database_client: StoreClient,
}

impl TaskRepository {
    pub fn new(database_client: StoreClient) -> Self {
        Self { database_client }
    }

    /// Materializes every slice of a [`KeyspacePlan`] as a `pending` task
    /// row. Called once per attack, right after it leaves `pending` (§4.1).
    #[instrument(skip(self, plan))]
    pub async fn materialize_plan(&self, attack_id: &str, plan: &KeyspacePlan) -> StoreResult<Vec<Task>> {
        let connection = self.database_client.get_connection()?;
        let transaction = connection.transaction().await?;
        let now = chrono::Utc::now().to_rfc3339();
        let mut tasks = Vec::new();

        for slice in plan.slices() {
            let id = uuid::Uuid::new_v4().to_string();
            let skip = u64::try_from(slice.skip).map_err(|_| {
                StoreError::Keyspace(cipherswarm_core_keyspace::KeyspaceError::Overflow("slice skip exceeds u64"))
            })?;
            let limit = u64::try_from(slice.limit).map_err(|_| {
                StoreError::Keyspace(cipherswarm_core_keyspace::KeyspaceError::Overflow("slice limit exceeds u64"))
            })?;
            transaction
                .execute(
                    "INSERT INTO tasks (id, attack_id, agent_id, keyspace_offset, keyspace_limit, start_date, activity_timestamp, state, stale, cancel_requested)
                     VALUES (?1, ?2, NULL, ?3, ?4, ?5, ?5, 'pending', 0, 0)",
                    params![id.clone(), attack_id, skip.to_string(), limit.to_string(), now.clone()],
                )
                .await?;
            tasks.push(Task {
                id,
                attack_id: attack_id.to_string(),
                agent_id: None,
                keyspace_offset: skip,
                keyspace_limit: limit,
                start_date: now.clone(),
                activity_timestamp: now.clone(),
                state: TaskState::Pending,
                stale: false,
                cancel_requested: false,
            });
        }

        transaction.commit().await?;
        info!("🧩 [TASK]: materialized {} slices for attack {}", tasks.len(), attack_id);
        Ok(tasks)
    }

    /// Atomically claims one pending, unassigned task belonging to `attack_id`
    /// for `agent_id`. Returns `Ok(None)` both when nothing is pending and
    /// when the claim race was lost to another agent — the caller cannot
    /// tell the two apart from the row count alone, and doesn't need to:
    /// both mean "try the next candidate attack".
    #[instrument(skip(self))]
    pub async fn claim_next(&self, attack_id: &str, agent_id: &str) -> StoreResult<Option<Task>> {
        let connection = self.database_client.get_connection()?;
        let now = chrono::Utc::now().to_rfc3339();

        let mut candidate_rows = connection
            .query(
                "SELECT id FROM tasks WHERE attack_id = ?1 AND state = 'pending' AND agent_id IS NULL
                 ORDER BY keyspace_offset ASC LIMIT 1",
                params![attack_id],
            )
            .await?;
        let Some(row) = candidate_rows.next().await? else {
            return Ok(None);
        };
        let candidate_id: String = row.get(0)?;

        let affected = connection
            .execute(
                "UPDATE tasks SET state = 'running', agent_id = ?2, start_date = ?3, activity_timestamp = ?3
                 WHERE id = ?1 AND state = 'pending' AND agent_id IS NULL",
                params![candidate_id.clone(), agent_id, now],
            )
            .await?;

        if affected == 0 {
            warn!("🏁 [TASK]: claim race lost for {candidate_id}, yielding to another agent");
            return Ok(None);
        }

        Ok(Some(self.get_with(&connection, &candidate_id).await?))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, task_id: &str) -> StoreResult<Task> {
        let connection = self.database_client.get_connection()?;
        self.get_with(&connection, task_id).await
    }

    async fn get_with(&self, connection: &Connection, task_id: &str) -> StoreResult<Task> {
        let mut rows = connection
            .query(
                "SELECT id, attack_id, agent_id, keyspace_offset, keyspace_limit, start_date, activity_timestamp, state, stale, cancel_requested
                 FROM tasks WHERE id = ?1",
                params![task_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::TaskNotFound)?;
        row_to_task(&row)
    }

    #[instrument(skip(self))]
    pub async fn list_for_attack(&self, attack_id: &str) -> StoreResult<Vec<Task>> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, attack_id, agent_id, keyspace_offset, keyspace_limit, start_date, activity_timestamp, state, stale, cancel_requested
                 FROM tasks WHERE attack_id = ?1 ORDER BY keyspace_offset ASC",
                params![attack_id],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_task(&row)?);
        }
        Ok(out)
    }

    /// Tasks currently leased to `agent_id` and still `running`. Used by the
    /// heartbeat handler when an agent reports it is shutting down: each one
    /// is abandoned explicitly rather than left for the reclamation sweep to
    /// time out (§4.5).
    #[instrument(skip(self))]
    pub async fn list_running_for_agent(&self, agent_id: &str) -> StoreResult<Vec<Task>> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, attack_id, agent_id, keyspace_offset, keyspace_limit, start_date, activity_timestamp, state, stale, cancel_requested
                 FROM tasks WHERE agent_id = ?1 AND state = 'running'",
                params![agent_id],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_task(&row)?);
        }
        Ok(out)
    }

    /// Refreshes the lease heartbeat; called on every agent heartbeat and
    /// status submission for a `running` task (§4.5).
    #[instrument(skip(self))]
    pub async fn renew_lease(&self, task_id: &str) -> StoreResult<()> {
        let connection = self.database_client.get_connection()?;
        let now = chrono::Utc::now().to_rfc3339();
        let affected = connection
            .execute(
                "UPDATE tasks SET activity_timestamp = ?2 WHERE id = ?1 AND state = 'running'",
                params![task_id, now],
            )
            .await?;
        if affected == 0 {
            return Err(StoreError::NotDispatchable(format!("task {task_id} is not running")));
        }
        Ok(())
    }

    /// Sweeps `running` tasks whose lease has expired back to `pending`,
    /// clearing `agent_id` and marking them `stale` for observability. Run
    /// periodically by the reclamation service, never by the request path.
    /// `threshold_seconds` is the configured lease TTL (§4.3); callers pass
    /// [`DEFAULT_ZOMBIE_THRESHOLD_SECONDS`] absent an explicit config value.
    #[instrument(skip(self))]
    pub async fn reclaim_zombies(&self, threshold_seconds: i64) -> StoreResult<u64> {
        let connection = self.database_client.get_connection()?;
        let cutoff = (chrono::Utc::now() - chrono::Duration::seconds(threshold_seconds)).to_rfc3339();
        let affected = connection
            .execute(
                "UPDATE tasks SET state = 'pending', agent_id = NULL, stale = 1
                 WHERE state = 'running' AND activity_timestamp < ?1",
                params![cutoff],
            )
            .await?;
        if affected > 0 {
            warn!("🧟 [TASK]: reclaimed {affected} zombie task(s)");
        }
        Ok(affected)
    }

    /// True when every other task of `attack_id` is already terminal —
    /// feeds the cascade decision in [`transition_task`](transitions::transition_task).
    #[instrument(skip(self))]
    pub async fn siblings_all_terminal(&self, attack_id: &str, excluding_task_id: &str) -> StoreResult<bool> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT state FROM tasks WHERE attack_id = ?1 AND id != ?2",
                params![attack_id, excluding_task_id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            let state = parse_state(&row.get::<String>(0)?)?;
            if !state.is_terminal() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `AttackEffect::CascadeTasksPause` (§4.4): every non-terminal task of
    /// the attack is paused in place, keeping its agent assignment.
    #[instrument(skip(self))]
    pub async fn pause_all_for_attack(&self, attack_id: &str) -> StoreResult<u64> {
        let connection = self.database_client.get_connection()?;
        let affected = connection
            .execute(
                "UPDATE tasks SET state = 'paused' WHERE attack_id = ?1 AND state IN ('pending', 'running')",
                params![attack_id],
            )
            .await?;
        Ok(affected)
    }

    /// `AttackEffect::CascadeTasksResume` (§4.4): paused tasks go back to
    /// `pending` and are marked `stale` so an operator dashboard can tell
    /// these apart from freshly materialized tasks; the agent assignment is
    /// cleared so they re-enter the claim pool rather than resuming in place.
    #[instrument(skip(self))]
    pub async fn resume_all_for_attack(&self, attack_id: &str) -> StoreResult<u64> {
        let connection = self.database_client.get_connection()?;
        let affected = connection
            .execute(
                "UPDATE tasks SET state = 'pending', agent_id = NULL, stale = 1
                 WHERE attack_id = ?1 AND state = 'paused'",
                params![attack_id],
            )
            .await?;
        Ok(affected)
    }

    /// `AttackEffect::DestroyChildTasks` (§4.4): the attack is about to be
    /// re-planned from scratch, so its existing slices are discarded rather
    /// than left around in a terminal state.
    #[instrument(skip(self))]
    pub async fn destroy_all_for_attack(&self, attack_id: &str) -> StoreResult<u64> {
        let connection = self.database_client.get_connection()?;
        let affected = connection.execute("DELETE FROM tasks WHERE attack_id = ?1", params![attack_id]).await?;
        Ok(affected)
    }

    /// `AttackEffect::ForceCompleteRemainingTasks` (§4.4): once the attack's
    /// hash list is fully cracked, every task still in flight is marked
    /// `completed` without having run to its own exhaustion.
    #[instrument(skip(self))]
    pub async fn force_complete_remaining(&self, attack_id: &str) -> StoreResult<u64> {
        let connection = self.database_client.get_connection()?;
        let affected = connection
            .execute(
                "UPDATE tasks SET state = 'completed' WHERE attack_id = ?1 AND state NOT IN ('completed', 'exhausted', 'failed')",
                params![attack_id],
            )
            .await?;
        Ok(affected)
    }

    /// `AttackEffect::CascadeTasksCancel` (§4.4, §5): a pending task has no
    /// agent running it yet, so it fails outright; a running task has no
    /// safe way to be force-stopped here, so it is only flagged — the agent
    /// observes `cancel_requested` on its next status/heartbeat round-trip
    /// and confirms the cancel itself (§4.7).
    #[instrument(skip(self))]
    pub async fn cancel_all_for_attack(&self, attack_id: &str) -> StoreResult<u64> {
        let connection = self.database_client.get_connection()?;
        connection
            .execute(
                "UPDATE tasks SET state = 'failed' WHERE attack_id = ?1 AND state = 'pending'",
                params![attack_id],
            )
            .await?;
        let flagged = connection
            .execute(
                "UPDATE tasks SET cancel_requested = 1 WHERE attack_id = ?1 AND state = 'running'",
                params![attack_id],
            )
            .await?;
        Ok(flagged)
    }

    #[instrument(skip(self))]
    pub async fn apply_event(
        &self,
        task_id: &str,
        event: TaskEvent,
        hash_list_fully_cracked: bool,
    ) -> StoreResult<(Task, Vec<Effect>)> {
        let connection = self.database_client.get_connection()?;
        let current = self.get_with(&connection, task_id).await?;
        let siblings_all_terminal = self.siblings_all_terminal(&current.attack_id, task_id).await?;

        let ctx = TaskContext {
            task_id: task_id.to_string(),
            attack_id: current.attack_id.clone(),
            hash_list_fully_cracked,
            siblings_all_terminal,
        };
        let (next_state, effects) = transitions::transition_task(current.state, event, &ctx)
            .map_err(|e| StoreError::InvalidTransition(e.to_string()))?;

        let now = chrono::Utc::now().to_rfc3339();
        let clear_agent = matches!(next_state, TaskState::Pending);
        connection
            .execute(
                "UPDATE tasks SET state = ?2, activity_timestamp = ?3,
                    agent_id = CASE WHEN ?4 = 1 THEN NULL ELSE agent_id END
                 WHERE id = ?1",
                params![task_id, task_state_label(next_state), now, clear_agent as i64],
            )
            .await?;

        info!("🔧 [TASK]: {} transitioned to {:?}", task_id, next_state);
        let updated = self.get_with(&connection, task_id).await?;
        Ok((updated, effects))
    }
}

fn row_to_task(row: &libsql::Row) -> StoreResult<Task> {
    Ok(Task {
        id: row.get(0)?,
        attack_id: row.get(1)?,
        agent_id: row.get(2)?,
        keyspace_offset: row.get::<String>(3)?.parse().map_err(|_| {
            StoreError::MappingError("keyspace_offset column is not a valid u64 decimal string".to_string())
        })?,
        keyspace_limit: row.get::<String>(4)?.parse().map_err(|_| {
            StoreError::MappingError("keyspace_limit column is not a valid u64 decimal string".to_string())
        })?,
        start_date: row.get(5)?,
        activity_timestamp: row.get(6)?,
        state: parse_state(&row.get::<String>(7)?)?,
        stale: row.get::<i64>(8)? != 0,
        cancel_requested: row.get::<i64>(9)? != 0,
    })
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

fn parse_state(label: &str) -> StoreResult<TaskState> {
    Ok(match label {
        "pending" => TaskState::Pending,
        "running" => TaskState::Running,
        "paused" => TaskState::Paused,
        "completed" => TaskState::Completed,
        "exhausted" => TaskState::Exhausted,
        "failed" => TaskState::Failed,
        other => return Err(StoreError::MappingError(format!("unknown task state '{other}'"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cipherswarm_core_keyspace::Slice;

    async fn memory_client(name: &str) -> StoreClient {
        StoreClient::connect(&format!("file:mem_{name}?mode=memory&cache=shared"), None).await.unwrap()
    }

    fn single_phase_plan(slices: Vec<Slice>) -> KeyspacePlan {
        let total = slices.iter().map(|s| s.limit).sum();
        KeyspacePlan { total, phases: vec![cipherswarm_core_keyspace::Phase { keyspace: total, slices }] }
    }

    #[tokio::test]
    async fn materialize_then_claim_sets_agent_and_state() {
        let repo = TaskRepository::new(memory_client("task_claim").await);
        let plan = single_phase_plan(vec![Slice { skip: 0, limit: 1_000 }, Slice { skip: 1_000, limit: 1_000 }]);
        let tasks = repo.materialize_plan("attack-1", &plan).await.unwrap();
        assert_eq!(tasks.len(), 2);

        let claimed = repo.claim_next("attack-1", "agent-1").await.unwrap().unwrap();
        assert_eq!(claimed.agent_id.as_deref(), Some("agent-1"));
        assert_eq!(claimed.state, TaskState::Running);
        assert_eq!(claimed.keyspace_offset, 0);
    }

    #[tokio::test]
    async fn claim_returns_none_once_exhausted() {
        let repo = TaskRepository::new(memory_client("task_claim_exhausted").await);
        let plan = single_phase_plan(vec![Slice { skip: 0, limit: 500 }]);
        repo.materialize_plan("attack-1", &plan).await.unwrap();

        assert!(repo.claim_next("attack-1", "agent-1").await.unwrap().is_some());
        assert!(repo.claim_next("attack-1", "agent-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reclaim_zombies_ignores_fresh_leases() {
        let repo = TaskRepository::new(memory_client("task_reclaim_fresh").await);
        let plan = single_phase_plan(vec![Slice { skip: 0, limit: 500 }]);
        repo.materialize_plan("attack-1", &plan).await.unwrap();
        repo.claim_next("attack-1", "agent-1").await.unwrap();

        let reclaimed = repo.reclaim_zombies(DEFAULT_ZOMBIE_THRESHOLD_SECONDS).await.unwrap();
        assert_eq!(reclaimed, 0);
    }

    #[tokio::test]
    async fn cancel_fails_pending_and_flags_running() {
        let repo = TaskRepository::new(memory_client("task_cancel").await);
        let plan = single_phase_plan(vec![Slice { skip: 0, limit: 500 }, Slice { skip: 500, limit: 500 }]);
        repo.materialize_plan("attack-1", &plan).await.unwrap();
        repo.claim_next("attack-1", "agent-1").await.unwrap();

        let flagged = repo.cancel_all_for_attack("attack-1").await.unwrap();
        assert_eq!(flagged, 1);

        let tasks = repo.list_for_attack("attack-1").await.unwrap();
        let running = tasks.iter().find(|t| t.state == TaskState::Running).unwrap();
        assert!(running.cancel_requested);
        let pending_turned_failed = tasks.iter().find(|t| t.id != running.id).unwrap();
        assert_eq!(pending_turned_failed.state, TaskState::Failed);
    }
}
