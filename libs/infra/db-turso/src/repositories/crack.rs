// [libs/infra/db-turso/src/repositories/crack.rs]
/*!
 * APARATO: CRACK RESULT REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: INGESTA DE HALLAZGOS CON DEDUPLICACION POR HASH
 */

use crate::errors::{StoreError, StoreResult};
use crate::StoreClient;
use cipherswarm_domain_models::CrackResult;
use libsql::params;
use tracing::{info, instrument};

pub struct CrackRepository {
    database_client: StoreClient,
}

impl CrackRepository {
    pub fn new(database_client: StoreClient) -> Self {
        Self { database_client }
    }

    /// Ingests a batch of `(hash, plaintext)` submissions for one task.
    /// Dedup is two-layered: `INSERT OR IGNORE` against
    /// `idx_cracks_dedup(task_id, hash_value)` absorbs an agent resending
    /// the same crack, and the `hash_items` update only touches rows still
    /// `plaintext IS NULL` so re-cracking an already-solved hash from a
    /// sibling task's overlapping slice is a no-op. Returns the number of
    /// hash items newly marked cracked, and whether the hash list is now
    /// fully solved (drives the `accept_crack` cascade, §4.4).
    #[instrument(skip(self, submissions))]
    pub async fn ingest_batch(
        &self,
        task_id: &str,
        attack_id: &str,
        submissions: &[(String, String)],
    ) -> StoreResult<(u64, bool)> {
        let hash_list_id = self.hash_list_id_for_attack(attack_id).await?;

        let connection = self.database_client.get_connection()?;
        let transaction = connection.transaction().await?;
        let now = chrono::Utc::now().to_rfc3339();
        let mut newly_cracked: u64 = 0;

        for (hash_value, plaintext) in submissions {
            transaction
                .execute(
                    "INSERT OR IGNORE INTO crack_results (id, task_id, hash_value, plaintext, cracked_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![uuid::Uuid::new_v4().to_string(), task_id, hash_value.clone(), plaintext.clone(), now.clone()],
                )
                .await?;

            let affected = transaction
                .execute(
                    "UPDATE hash_items SET plaintext = ?3, cracked_at = ?4
                     WHERE hash_list_id = ?1 AND hash_value = ?2 AND plaintext IS NULL",
                    params![hash_list_id.clone(), hash_value.clone(), plaintext.clone(), now.clone()],
                )
                .await?;
            newly_cracked += affected;
        }

        if newly_cracked > 0 {
            transaction
                .execute(
                    "UPDATE hash_lists SET uncracked_count = uncracked_count - ?2 WHERE id = ?1",
                    params![hash_list_id.clone(), newly_cracked as i64],
                )
                .await?;
        }

        let remaining = {
            let mut rows = transaction
                .query("SELECT uncracked_count FROM hash_lists WHERE id = ?1", params![hash_list_id.clone()])
                .await?;
            let row = rows.next().await?.ok_or(StoreError::HashListNotFound)?;
            row.get::<i64>(0)?
        };

        transaction.commit().await?;

        if newly_cracked > 0 {
            info!("🔓 [CRACK]: task {task_id} cracked {newly_cracked} new hash(es), {remaining} remaining");
        }

        Ok((newly_cracked, remaining == 0))
    }

    async fn hash_list_id_for_attack(&self, attack_id: &str) -> StoreResult<String> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT c.hash_list_id FROM campaigns c
                 JOIN attacks a ON a.campaign_id = c.id
                 WHERE a.id = ?1",
                params![attack_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::AttackNotFound)?;
        Ok(row.get(0)?)
    }

    #[instrument(skip(self))]
    pub async fn list_for_task(&self, task_id: &str) -> StoreResult<Vec<CrackResult>> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT task_id, hash_value, plaintext, cracked_at FROM crack_results WHERE task_id = ?1",
                params![task_id],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(CrackResult {
                task_id: row.get(0)?,
                hash_value: row.get(1)?,
                plaintext: row.get(2)?,
                cracked_at: row.get(3)?,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{AttackRepository, CampaignRepository, HashListRepository};
    use cipherswarm_domain_models::{Attack, AttackMode, AttackState, CampaignPriority};

    fn new_mask_attack() -> Attack {
        Attack {
            id: String::new(),
            campaign_id: String::new(),
            position: 0,
            attack_mode: AttackMode::Mask,
            word_list_id: None,
            rule_list_id: None,
            mask_list_id: None,
            mask: Some("?d?d?d?d".into()),
            custom_charset_1: None,
            custom_charset_2: None,
            custom_charset_3: None,
            custom_charset_4: None,
            increment_mode: false,
            increment_min: None,
            increment_max: None,
            workload_profile: 3,
            optimized: false,
            disable_markov: false,
            classic_markov: false,
            markov_threshold: None,
            slow_candidate_generators: false,
            start_time: None,
            end_time: None,
            state: AttackState::Pending,
        }
    }

    async fn memory_client(name: &str) -> StoreClient {
        StoreClient::connect(&format!("file:mem_{name}?mode=memory&cache=shared"), None).await.unwrap()
    }

    #[tokio::test]
    async fn ingest_decrements_uncracked_and_reports_exhaustion() {
        let client = memory_client("crack_ingest").await;
        let hash_lists = HashListRepository::new(client.clone());
        let campaigns = CampaignRepository::new(client.clone());
        let attacks = AttackRepository::new(client.clone());
        let cracks = CrackRepository::new(client);

        let hl = hash_lists.create("proj-1", "dump", 0, &[("abc".into(), None), ("def".into(), None)]).await.unwrap();
        let campaign = campaigns.create("proj-1", "camp", CampaignPriority::Routine, &hl.id).await.unwrap();
        let attack = attacks.create(&campaign.id, new_mask_attack()).await.unwrap();

        let (count, fully_cracked) =
            cracks.ingest_batch("task-1", &attack.id, &[("abc".into(), "1234".into())]).await.unwrap();
        assert_eq!(count, 1);
        assert!(!fully_cracked);

        let (count, fully_cracked) =
            cracks.ingest_batch("task-1", &attack.id, &[("def".into(), "5678".into())]).await.unwrap();
        assert_eq!(count, 1);
        assert!(fully_cracked);
    }

    #[tokio::test]
    async fn resubmitting_same_hash_is_not_double_counted() {
        let client = memory_client("crack_dedup").await;
        let hash_lists = HashListRepository::new(client.clone());
        let campaigns = CampaignRepository::new(client.clone());
        let attacks = AttackRepository::new(client.clone());
        let cracks = CrackRepository::new(client);

        let hl = hash_lists.create("proj-1", "dump", 0, &[("abc".into(), None)]).await.unwrap();
        let campaign = campaigns.create("proj-1", "camp", CampaignPriority::Routine, &hl.id).await.unwrap();
        let attack = attacks.create(&campaign.id, new_mask_attack()).await.unwrap();

        cracks.ingest_batch("task-1", &attack.id, &[("abc".into(), "1234".into())]).await.unwrap();
        let (count, _) = cracks.ingest_batch("task-1", &attack.id, &[("abc".into(), "1234".into())]).await.unwrap();
        assert_eq!(count, 0);
    }
}
