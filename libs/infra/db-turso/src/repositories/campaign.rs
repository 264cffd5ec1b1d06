// [libs/infra/db-turso/src/repositories/campaign.rs]
/*!
 * APARATO: CAMPAIGN REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: CICLO DE VIDA DE CAMPAÑAS Y CASCADA DE ESTADO
 */

use crate::errors::{StoreError, StoreResult};
use crate::transitions::{self, CampaignContext, CampaignEffect, CampaignEvent};
use crate::StoreClient;
use cipherswarm_domain_models::{Campaign, CampaignPriority, CampaignState};
use libsql::params;
use tracing::{info, instrument};

pub struct CampaignRepository {
    database_client: StoreClient,
}

impl CampaignRepository {
    pub fn new(database_client: StoreClient) -> Self {
        Self { database_client }
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        project_id: &str,
        name: &str,
        priority: CampaignPriority,
        hash_list_id: &str,
    ) -> StoreResult<Campaign> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let connection = self.database_client.get_connection()?;
        connection
            .execute(
                "INSERT INTO campaigns (id, project_id, name, priority, hash_list_id, state, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 'draft', ?6, ?6)",
                params![id.clone(), project_id, name, priority_label(priority), hash_list_id, now.clone()],
            )
            .await?;
        Ok(Campaign {
            id,
            project_id: project_id.to_string(),
            name: name.to_string(),
            priority,
            hash_list_id: hash_list_id.to_string(),
            state: CampaignState::Draft,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, campaign_id: &str) -> StoreResult<Campaign> {
        let connection = self.database_client.get_connection()?;
        self.get_with(&connection, campaign_id).await
    }

    async fn get_with(&self, connection: &libsql::Connection, campaign_id: &str) -> StoreResult<Campaign> {
        let mut rows = connection
            .query(
                "SELECT id, project_id, name, priority, hash_list_id, state, created_at, updated_at
                 FROM campaigns WHERE id = ?1",
                params![campaign_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::CampaignNotFound)?;
        Ok(Campaign {
            id: row.get(0)?,
            project_id: row.get(1)?,
            name: row.get(2)?,
            priority: parse_priority(&row.get::<String>(3)?)?,
            hash_list_id: row.get(4)?,
            state: parse_state(&row.get::<String>(5)?)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    /// Active campaigns scoped to `project_ids`, ordered for the Matcher:
    /// priority descending, then `created_at` ascending (§4.2 rule 3). The
    /// project filter is applied in Rust rather than a dynamic `IN (...)`
    /// clause — an agent's project set is small, and this keeps the query
    /// shape static.
    #[instrument(skip(self))]
    pub async fn list_active_for_projects(&self, project_ids: &[String]) -> StoreResult<Vec<Campaign>> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, project_id, name, priority, hash_list_id, state, created_at, updated_at
                 FROM campaigns WHERE state = 'active' ORDER BY created_at ASC",
                (),
            )
            .await?;
        let mut campaigns = Vec::new();
        while let Some(row) = rows.next().await? {
            let project_id: String = row.get(1)?;
            if !project_ids.iter().any(|p| p == &project_id) {
                continue;
            }
            campaigns.push(Campaign {
                id: row.get(0)?,
                project_id: row.get(1)?,
                name: row.get(2)?,
                priority: parse_priority(&row.get::<String>(3)?)?,
                hash_list_id: row.get(4)?,
                state: parse_state(&row.get::<String>(5)?)?,
                created_at: row.get(6)?,
                updated_at: row.get(7)?,
            });
        }
        campaigns.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.created_at.cmp(&b.created_at)));
        Ok(campaigns)
    }

    #[instrument(skip(self))]
    pub async fn activate(&self, campaign_id: &str) -> StoreResult<(Campaign, Vec<CampaignEffect>)> {
        self.apply_event(campaign_id, CampaignEvent::Activate).await
    }

    #[instrument(skip(self))]
    pub async fn archive(&self, campaign_id: &str) -> StoreResult<(Campaign, Vec<CampaignEffect>)> {
        self.apply_event(campaign_id, CampaignEvent::Archive).await
    }

    /// Invoked by the attack-completion cascade (§4.4) when the campaign's
    /// hash list has zero uncracked items remaining, or directly by an
    /// operator lifecycle action. Returns the raised effects undispatched —
    /// the caller owns the event bus and decides when a write has truly
    /// committed.
    #[instrument(skip(self))]
    pub async fn apply_event(
        &self,
        campaign_id: &str,
        event: CampaignEvent,
    ) -> StoreResult<(Campaign, Vec<CampaignEffect>)> {
        let connection = self.database_client.get_connection()?;
        let current = self.get_with(&connection, campaign_id).await?;

        let ctx = CampaignContext { campaign_id: campaign_id.to_string() };
        let (next_state, effects) = transitions::transition_campaign(current.state, event, &ctx)
            .map_err(|e| StoreError::InvalidTransition(e.to_string()))?;

        let now = chrono::Utc::now().to_rfc3339();
        connection
            .execute(
                "UPDATE campaigns SET state = ?2, updated_at = ?3 WHERE id = ?1",
                params![campaign_id, campaign_state_label(next_state), now.clone()],
            )
            .await?;

        info!("🚩 [CAMPAIGN]: {} transitioned to {:?}", campaign_id, next_state);
        let updated = self.get_with(&connection, campaign_id).await?;
        Ok((updated, effects))
    }
}

fn priority_label(p: CampaignPriority) -> &'static str {
    match p {
        CampaignPriority::Deferred => "deferred",
        CampaignPriority::Routine => "routine",
        CampaignPriority::Priority => "priority",
        CampaignPriority::Urgent => "urgent",
        CampaignPriority::Immediate => "immediate",
        CampaignPriority::Flash => "flash",
    }
}

fn parse_priority(label: &str) -> StoreResult<CampaignPriority> {
    Ok(match label {
        "deferred" => CampaignPriority::Deferred,
        "routine" => CampaignPriority::Routine,
        "priority" => CampaignPriority::Priority,
        "urgent" => CampaignPriority::Urgent,
        "immediate" => CampaignPriority::Immediate,
        "flash" => CampaignPriority::Flash,
        other => return Err(StoreError::MappingError(format!("unknown campaign priority '{other}'"))),
    })
}

fn campaign_state_label(s: CampaignState) -> &'static str {
    match s {
        CampaignState::Draft => "draft",
        CampaignState::Active => "active",
        CampaignState::Completed => "completed",
        CampaignState::Archived => "archived",
    }
}

fn parse_state(label: &str) -> StoreResult<CampaignState> {
    Ok(match label {
        "draft" => CampaignState::Draft,
        "active" => CampaignState::Active,
        "completed" => CampaignState::Completed,
        "archived" => CampaignState::Archived,
        other => return Err(StoreError::MappingError(format!("unknown campaign state '{other}'"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_client(name: &str) -> StoreClient {
        StoreClient::connect(&format!("file:mem_{name}?mode=memory&cache=shared"), None).await.unwrap()
    }

    #[tokio::test]
    async fn draft_campaign_activates() {
        let repo = CampaignRepository::new(memory_client("campaign_activate").await);
        let created = repo.create("proj-1", "Q3 dump", CampaignPriority::Urgent, "hl-1").await.unwrap();
        assert_eq!(created.state, CampaignState::Draft);
        let (activated, _effects) = repo.activate(&created.id).await.unwrap();
        assert_eq!(activated.state, CampaignState::Active);
    }

    #[tokio::test]
    async fn active_campaigns_sort_by_priority_then_age() {
        let repo = CampaignRepository::new(memory_client("campaign_sort").await);
        let low = repo.create("proj-1", "low", CampaignPriority::Routine, "hl-1").await.unwrap();
        let high = repo.create("proj-1", "high", CampaignPriority::Flash, "hl-1").await.unwrap();
        repo.activate(&low.id).await.unwrap();
        repo.activate(&high.id).await.unwrap();

        let active = repo.list_active_for_projects(&["proj-1".to_string()]).await.unwrap();
        assert_eq!(active[0].id, high.id);
        assert_eq!(active[1].id, low.id);
    }
}
