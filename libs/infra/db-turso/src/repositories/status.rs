// [libs/infra/db-turso/src/repositories/status.rs]
/*!
 * APARATO: HASHCAT STATUS REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: HISTORIAL ACOTADO DE PROGRESO POR TAREA
 */

use crate::errors::{StoreError, StoreResult};
use crate::StoreClient;
use cipherswarm_domain_models::{DeviceStatus, HashcatStatus};
use libsql::params;
use tracing::instrument;

/// Default retention when the orchestrator's configuration doesn't override
/// it. Most recent frames kept per task (§3); older frames are trimmed on
/// every append so the table never grows unbounded under a chatty agent.
pub const DEFAULT_STATUS_RETENTION_PER_TASK: usize = 10;

pub struct StatusRepository {
    database_client: StoreClient,
}

impl StatusRepository {
    pub fn new(database_client: StoreClient) -> Self {
        Self { database_client }
    }

    #[instrument(skip(self, status))]
    pub async fn append(&self, status: &HashcatStatus, retention_per_task: usize) -> StoreResult<()> {
        let id = uuid::Uuid::new_v4().to_string();
        let devices_json = serde_json::to_string(&status.devices)
            .map_err(|e| StoreError::MappingError(format!("devices serialization failed: {e}")))?;
        let recovered_hashes_json = serde_json::to_string(&status.recovered_hashes)
            .map_err(|e| StoreError::MappingError(format!("recovered_hashes serialization failed: {e}")))?;
        let recovered_salts_json = serde_json::to_string(&status.recovered_salts)
            .map_err(|e| StoreError::MappingError(format!("recovered_salts serialization failed: {e}")))?;
        let hashcat_guess_json = status
            .hashcat_guess
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StoreError::MappingError(format!("hashcat_guess serialization failed: {e}")))?;

        let connection = self.database_client.get_connection()?;
        let transaction = connection.transaction().await?;

        transaction
            .execute(
                "INSERT INTO hashcat_statuses (
                    id, task_id, received_at, session, status_code, target,
                    progress_done, progress_total, restore_point,
                    recovered_hashes_json, recovered_salts_json, rejected, devices_json,
                    time_start, estimated_stop, hashcat_guess_json
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    id,
                    status.task_id.clone(),
                    status.received_at.clone(),
                    status.session.clone(),
                    status.status_code as i64,
                    status.target.clone(),
                    status.progress[0].to_string(),
                    status.progress[1].to_string(),
                    status.restore_point.to_string(),
                    recovered_hashes_json,
                    recovered_salts_json,
                    status.rejected.to_string(),
                    devices_json,
                    status.time_start.clone(),
                    status.estimated_stop.clone(),
                    hashcat_guess_json,
                ],
            )
            .await?;

        transaction
            .execute(
                "DELETE FROM hashcat_statuses WHERE task_id = ?1 AND id NOT IN (
                    SELECT id FROM hashcat_statuses WHERE task_id = ?1 ORDER BY received_at DESC LIMIT ?2
                 )",
                params![status.task_id.clone(), retention_per_task as i64],
            )
            .await?;

        transaction.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn latest_for_task(&self, task_id: &str) -> StoreResult<Option<HashcatStatus>> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT task_id, received_at, session, status_code, target,
                        progress_done, progress_total, restore_point,
                        recovered_hashes_json, recovered_salts_json, rejected, devices_json,
                        time_start, estimated_stop, hashcat_guess_json
                 FROM hashcat_statuses WHERE task_id = ?1 ORDER BY received_at DESC LIMIT 1",
                params![task_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_status(&row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn history_for_task(&self, task_id: &str) -> StoreResult<Vec<HashcatStatus>> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT task_id, received_at, session, status_code, target,
                        progress_done, progress_total, restore_point,
                        recovered_hashes_json, recovered_salts_json, rejected, devices_json,
                        time_start, estimated_stop, hashcat_guess_json
                 FROM hashcat_statuses WHERE task_id = ?1 ORDER BY received_at DESC",
                params![task_id],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_status(&row)?);
        }
        Ok(out)
    }
}

fn row_to_status(row: &libsql::Row) -> StoreResult<HashcatStatus> {
    let devices_json: String = row.get(11)?;
    let devices: Vec<DeviceStatus> = serde_json::from_str(&devices_json)
        .map_err(|e| StoreError::MappingError(format!("devices deserialization failed: {e}")))?;
    let recovered_hashes_json: String = row.get(8)?;
    let recovered_hashes: Vec<u64> = serde_json::from_str(&recovered_hashes_json)
        .map_err(|e| StoreError::MappingError(format!("recovered_hashes deserialization failed: {e}")))?;
    let recovered_salts_json: String = row.get(9)?;
    let recovered_salts: Vec<u64> = serde_json::from_str(&recovered_salts_json)
        .map_err(|e| StoreError::MappingError(format!("recovered_salts deserialization failed: {e}")))?;
    let hashcat_guess_json: Option<String> = row.get(14)?;
    let hashcat_guess = hashcat_guess_json
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(|e| StoreError::MappingError(format!("hashcat_guess deserialization failed: {e}")))?;

    let progress_done: String = row.get(5)?;
    let progress_total: String = row.get(6)?;
    let restore_point: String = row.get(7)?;
    let rejected: String = row.get(10)?;

    Ok(HashcatStatus {
        task_id: row.get(0)?,
        received_at: row.get(1)?,
        session: row.get(2)?,
        status_code: row.get::<i64>(3)? as u32,
        target: row.get(4)?,
        progress: [
            progress_done.parse().unwrap_or(0),
            progress_total.parse().unwrap_or(0),
        ],
        restore_point: restore_point.parse().unwrap_or(0),
        recovered_hashes,
        recovered_salts,
        rejected: rejected.parse().unwrap_or(0),
        devices,
        time_start: row.get(12)?,
        estimated_stop: row.get(13)?,
        hashcat_guess,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_client(name: &str) -> StoreClient {
        StoreClient::connect(&format!("file:mem_{name}?mode=memory&cache=shared"), None).await.unwrap()
    }

    fn sample(task_id: &str, received_at: &str) -> HashcatStatus {
        HashcatStatus {
            task_id: task_id.to_string(),
            received_at: received_at.to_string(),
            session: "session1".into(),
            status_code: 3,
            target: "dump.txt".into(),
            progress: [500_000, 1_000_000],
            restore_point: 0,
            recovered_hashes: vec![],
            recovered_salts: vec![],
            rejected: 0,
            devices: vec![],
            time_start: "2026-01-01T00:00:00Z".into(),
            estimated_stop: None,
            hashcat_guess: None,
        }
    }

    #[tokio::test]
    async fn retains_only_most_recent_n_frames() {
        let repo = StatusRepository::new(memory_client("status_retention").await);
        for i in 0..(DEFAULT_STATUS_RETENTION_PER_TASK + 5) {
            let ts = format!("2026-01-01T00:{i:02}:00Z");
            repo.append(&sample("task-1", &ts), DEFAULT_STATUS_RETENTION_PER_TASK).await.unwrap();
        }
        let history = repo.history_for_task("task-1").await.unwrap();
        assert_eq!(history.len(), DEFAULT_STATUS_RETENTION_PER_TASK);
    }

    #[tokio::test]
    async fn progress_percentage_derives_from_stored_frame() {
        let repo = StatusRepository::new(memory_client("status_progress").await);
        repo.append(&sample("task-2", "2026-01-01T00:00:00Z"), DEFAULT_STATUS_RETENTION_PER_TASK).await.unwrap();
        let latest = repo.latest_for_task("task-2").await.unwrap().unwrap();
        assert_eq!(latest.progress_percentage(), 50.0);
    }
}
