// [libs/infra/db-turso/src/repositories/attack.rs]
/*!
 * APARATO: ATTACK REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: CONFIGURACION HASHCAT-EQUIVALENTE Y CASCADA DE ESTADO
 */

use crate::errors::{StoreError, StoreResult};
use crate::transitions::{self, AttackContext, AttackEffect, AttackEvent};
use crate::StoreClient;
use cipherswarm_domain_models::{Attack, AttackMode, AttackState};
use libsql::{params, Connection};
use tracing::{info, instrument};

pub struct AttackRepository {
    database_client: StoreClient,
}

impl AttackRepository {
    pub fn new(database_client: StoreClient) -> Self {
        Self { database_client }
    }

    #[instrument(skip(self, attack))]
    pub async fn create(&self, campaign_id: &str, attack: Attack) -> StoreResult<Attack> {
        if !attack.has_required_resources() {
            return Err(StoreError::NotDispatchable(format!(
                "attack mode {:?} is missing a required resource",
                attack.attack_mode
            )));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let connection = self.database_client.get_connection()?;
        connection
            .execute(
                "INSERT INTO attacks (
                    id, campaign_id, position, attack_mode, word_list_id, rule_list_id, mask_list_id, mask,
                    custom_charset_1, custom_charset_2, custom_charset_3, custom_charset_4,
                    increment_mode, increment_min, increment_max, workload_profile, optimized,
                    disable_markov, classic_markov, markov_threshold, slow_candidate_generators, state
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, 'pending')",
                params![
                    id.clone(),
                    campaign_id,
                    attack.position as i64,
                    mode_label(attack.attack_mode),
                    attack.word_list_id.clone(),
                    attack.rule_list_id.clone(),
                    attack.mask_list_id.clone(),
                    attack.mask.clone(),
                    attack.custom_charset_1.clone(),
                    attack.custom_charset_2.clone(),
                    attack.custom_charset_3.clone(),
                    attack.custom_charset_4.clone(),
                    attack.increment_mode as i64,
                    attack.increment_min.map(|v| v as i64),
                    attack.increment_max.map(|v| v as i64),
                    attack.workload_profile as i64,
                    attack.optimized as i64,
                    attack.disable_markov as i64,
                    attack.classic_markov as i64,
                    attack.markov_threshold.map(|v| v as i64),
                    attack.slow_candidate_generators as i64,
                ],
            )
            .await?;

        Ok(Attack { id, campaign_id: campaign_id.to_string(), state: AttackState::Pending, ..attack })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, attack_id: &str) -> StoreResult<Attack> {
        let connection = self.database_client.get_connection()?;
        self.get_with(&connection, attack_id).await
    }

    async fn get_with(&self, connection: &Connection, attack_id: &str) -> StoreResult<Attack> {
        let mut rows = connection
            .query(
                "SELECT id, campaign_id, position, attack_mode, word_list_id, rule_list_id, mask_list_id, mask,
                        custom_charset_1, custom_charset_2, custom_charset_3, custom_charset_4,
                        increment_mode, increment_min, increment_max, workload_profile, optimized,
                        disable_markov, classic_markov, markov_threshold, slow_candidate_generators,
                        state, start_time, end_time
                 FROM attacks WHERE id = ?1",
                params![attack_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::AttackNotFound)?;
        Ok(Attack {
            id: row.get(0)?,
            campaign_id: row.get(1)?,
            position: row.get::<i64>(2)? as i32,
            attack_mode: parse_mode(&row.get::<String>(3)?)?,
            word_list_id: row.get(4)?,
            rule_list_id: row.get(5)?,
            mask_list_id: row.get(6)?,
            mask: row.get(7)?,
            custom_charset_1: row.get(8)?,
            custom_charset_2: row.get(9)?,
            custom_charset_3: row.get(10)?,
            custom_charset_4: row.get(11)?,
            increment_mode: row.get::<i64>(12)? != 0,
            increment_min: row.get::<Option<i64>>(13)?.map(|v| v as u32),
            increment_max: row.get::<Option<i64>>(14)?.map(|v| v as u32),
            workload_profile: row.get::<i64>(15)? as u8,
            optimized: row.get::<i64>(16)? != 0,
            disable_markov: row.get::<i64>(17)? != 0,
            classic_markov: row.get::<i64>(18)? != 0,
            markov_threshold: row.get::<Option<i64>>(19)?.map(|v| v as u32),
            slow_candidate_generators: row.get::<i64>(20)? != 0,
            state: parse_state(&row.get::<String>(21)?)?,
            start_time: row.get(22)?,
            end_time: row.get(23)?,
        })
    }

    #[instrument(skip(self))]
    pub async fn list_for_campaign(&self, campaign_id: &str) -> StoreResult<Vec<Attack>> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query("SELECT id FROM attacks WHERE campaign_id = ?1 ORDER BY position ASC", params![campaign_id])
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            out.push(self.get_with(&connection, &id).await?);
        }
        Ok(out)
    }

    /// IDs of every attack in the campaign not already completed — feeds the
    /// sibling-completion fanout once the campaign's hash list empties out
    /// (§4.4). An attack's own completion has already been committed by the
    /// time this runs, so it is naturally excluded.
    #[instrument(skip(self))]
    pub async fn list_incomplete_for_campaign(&self, campaign_id: &str) -> StoreResult<Vec<String>> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id FROM attacks WHERE campaign_id = ?1 AND state != 'completed'",
                params![campaign_id],
            )
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }
        Ok(ids)
    }

    /// Rewrites `position` for every attack in `ordered_attack_ids`, in the
    /// order given — the operator's drag-and-drop reorder (§6.3). Positions
    /// not named are left untouched; the caller is expected to pass the
    /// full sibling set.
    #[instrument(skip(self, ordered_attack_ids))]
    pub async fn reorder(&self, campaign_id: &str, ordered_attack_ids: &[String]) -> StoreResult<()> {
        let connection = self.database_client.get_connection()?;
        let transaction = connection.transaction().await?;
        for (position, attack_id) in ordered_attack_ids.iter().enumerate() {
            let affected = transaction
                .execute(
                    "UPDATE attacks SET position = ?3 WHERE id = ?1 AND campaign_id = ?2",
                    params![attack_id.clone(), campaign_id, position as i64],
                )
                .await?;
            if affected == 0 {
                return Err(StoreError::AttackNotFound);
            }
        }
        transaction.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn apply_event(&self, attack_id: &str, event: AttackEvent) -> StoreResult<(Attack, Vec<AttackEffect>)> {
        let connection = self.database_client.get_connection()?;
        let current = self.get_with(&connection, attack_id).await?;

        let hash_list_fully_cracked = self.hash_list_fully_cracked(&connection, &current.campaign_id).await?;
        let ctx = AttackContext {
            attack_id: attack_id.to_string(),
            campaign_id: current.campaign_id.clone(),
            hash_list_fully_cracked,
        };

        let (next_state, effects) = transitions::transition_attack(current.state, event, &ctx)
            .map_err(|e| StoreError::InvalidTransition(e.to_string()))?;

        let now = chrono::Utc::now().to_rfc3339();
        let set_start = matches!(event, AttackEvent::Run) && current.start_time.is_none();
        let set_end = matches!(next_state, AttackState::Completed | AttackState::Exhausted | AttackState::Failed);

        connection
            .execute(
                "UPDATE attacks SET state = ?2,
                    start_time = CASE WHEN ?3 = 1 THEN ?4 ELSE start_time END,
                    end_time = CASE WHEN ?5 = 1 THEN ?4 ELSE end_time END
                 WHERE id = ?1",
                params![
                    attack_id,
                    attack_state_label(next_state),
                    set_start as i64,
                    now,
                    set_end as i64,
                ],
            )
            .await?;

        info!("⚔️ [ATTACK]: {} transitioned to {:?}", attack_id, next_state);
        let updated = self.get_with(&connection, attack_id).await?;
        Ok((updated, effects))
    }

    async fn hash_list_fully_cracked(&self, connection: &Connection, campaign_id: &str) -> StoreResult<bool> {
        let mut rows = connection
            .query(
                "SELECT hl.uncracked_count FROM hash_lists hl
                 JOIN campaigns c ON c.hash_list_id = hl.id
                 WHERE c.id = ?1",
                params![campaign_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::CampaignNotFound)?;
        Ok(row.get::<i64>(0)? == 0)
    }
}

fn mode_label(mode: AttackMode) -> &'static str {
    match mode {
        AttackMode::Dictionary => "dictionary",
        AttackMode::Mask => "mask",
        AttackMode::HybridDictionary => "hybrid_dictionary",
        AttackMode::HybridMask => "hybrid_mask",
    }
}

fn parse_mode(label: &str) -> StoreResult<AttackMode> {
    Ok(match label {
        "dictionary" => AttackMode::Dictionary,
        "mask" => AttackMode::Mask,
        "hybrid_dictionary" => AttackMode::HybridDictionary,
        "hybrid_mask" => AttackMode::HybridMask,
        other => return Err(StoreError::MappingError(format!("unknown attack mode '{other}'"))),
    })
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

fn parse_state(label: &str) -> StoreResult<AttackState> {
    Ok(match label {
        "pending" => AttackState::Pending,
        "running" => AttackState::Running,
        "paused" => AttackState::Paused,
        "completed" => AttackState::Completed,
        "exhausted" => AttackState::Exhausted,
        "failed" => AttackState::Failed,
        other => return Err(StoreError::MappingError(format!("unknown attack state '{other}'"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{CampaignRepository, HashListRepository};
    use cipherswarm_domain_models::CampaignPriority;

    fn new_attack(mode: AttackMode) -> Attack {
        Attack {
            id: String::new(),
            campaign_id: String::new(),
            position: 0,
            attack_mode: mode,
            word_list_id: None,
            rule_list_id: None,
            mask_list_id: None,
            mask: None,
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

    #[tokio::test]
    async fn rejects_dictionary_attack_without_word_list() {
        let client = StoreClient::connect("file:mem_attack_missing_res?mode=memory&cache=shared", None)
            .await
            .unwrap();
        let repo = AttackRepository::new(client);
        let attack = new_attack(AttackMode::Dictionary);
        assert!(repo.create("campaign-1", attack).await.is_err());
    }

    #[tokio::test]
    async fn accepts_mask_attack_with_inline_mask() {
        let client = StoreClient::connect("file:mem_attack_mask_ok?mode=memory&cache=shared", None).await.unwrap();
        let campaigns = CampaignRepository::new(client.clone());
        let hash_lists = HashListRepository::new(client.clone());
        let hl = hash_lists.create("proj-1", "dump", 0, &[("abc".into(), None)]).await.unwrap();
        let campaign = campaigns.create("proj-1", "camp", CampaignPriority::Routine, &hl.id).await.unwrap();

        let repo = AttackRepository::new(client);
        let mut attack = new_attack(AttackMode::Mask);
        attack.mask = Some("?d?d?d?d".to_string());
        let created = repo.create(&campaign.id, attack).await.unwrap();
        assert_eq!(created.state, AttackState::Pending);
    }
}
