// [libs/infra/db-turso/src/repositories/project.rs]
/*!
 * APARATO: PROJECT REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DEL LIMITE DE TENENCIA
 */

use crate::errors::{StoreError, StoreResult};
use crate::StoreClient;
use cipherswarm_domain_models::Project;
use libsql::params;
use tracing::instrument;

pub struct ProjectRepository {
    database_client: StoreClient,
}

impl ProjectRepository {
    pub fn new(database_client: StoreClient) -> Self {
        Self { database_client }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, name: &str) -> StoreResult<Project> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let connection = self.database_client.get_connection()?;
        connection
            .execute(
                "INSERT INTO projects (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
                params![id.clone(), name, now.clone()],
            )
            .await?;
        Ok(Project { id, name: name.to_string(), created_at: now.clone(), updated_at: now })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, project_id: &str) -> StoreResult<Project> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query("SELECT id, name, created_at, updated_at FROM projects WHERE id = ?1", params![project_id])
            .await?;
        let row = rows.next().await?.ok_or(StoreError::ProjectNotFound)?;
        Ok(Project {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: row.get(2)?,
            updated_at: row.get(3)?,
        })
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> StoreResult<Vec<Project>> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query("SELECT id, name, created_at, updated_at FROM projects ORDER BY created_at ASC", ())
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(Project {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_client(name: &str) -> StoreClient {
        StoreClient::connect(&format!("file:mem_{name}?mode=memory&cache=shared"), None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_and_get_round_trips() {
        let repo = ProjectRepository::new(memory_client("project_crud").await);
        let created = repo.create("Red Team Alpha").await.unwrap();
        let fetched = repo.get(&created.id).await.unwrap();
        assert_eq!(created.id, fetched.id);
        assert_eq!(fetched.name, "Red Team Alpha");
    }

    #[tokio::test]
    async fn get_missing_project_errors() {
        let repo = ProjectRepository::new(memory_client("project_missing").await);
        assert!(matches!(repo.get("nope").await, Err(StoreError::ProjectNotFound)));
    }
}
