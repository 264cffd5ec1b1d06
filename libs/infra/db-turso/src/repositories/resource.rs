// [libs/infra/db-turso/src/repositories/resource.rs]
/*!
 * APARATO: RESOURCE REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: WORDLISTS, RULELISTS Y MASKLISTS COMPARTIDOS
 */

use crate::errors::{StoreError, StoreResult};
use crate::StoreClient;
use cipherswarm_domain_models::{Resource, ResourceKind};
use libsql::params;
use tracing::instrument;

pub struct ResourceRepository {
    database_client: StoreClient,
}

impl ResourceRepository {
    pub fn new(database_client: StoreClient) -> Self {
        Self { database_client }
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        name: &str,
        kind: ResourceKind,
        file_handle: &str,
        sensitive: bool,
        project_ids: &[String],
    ) -> StoreResult<Resource> {
        if sensitive && project_ids.is_empty() {
            return Err(StoreError::NotDispatchable(
                "sensitive resource requires at least one project".to_string(),
            ));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let connection = self.database_client.get_connection()?;
        let transaction = connection.transaction().await?;

        transaction
            .execute(
                "INSERT INTO resources (id, name, kind, file_handle, line_count, sensitive) VALUES (?1, ?2, ?3, ?4, NULL, ?5)",
                params![id.clone(), name, kind_label(kind), file_handle, sensitive as i64],
            )
            .await?;

        for project_id in project_ids {
            transaction
                .execute(
                    "INSERT INTO resource_project_links (resource_id, project_id) VALUES (?1, ?2)",
                    params![id.clone(), project_id.clone()],
                )
                .await?;
        }

        transaction.commit().await?;

        Ok(Resource {
            id,
            name: name.to_string(),
            kind,
            file_handle: file_handle.to_string(),
            line_count: None,
            sensitive,
            project_ids: project_ids.to_vec(),
        })
    }

    /// Called once the asynchronous line-counting pass finishes (§3: a
    /// `line_count = NULL` resource is not dispatchable until this runs).
    #[instrument(skip(self))]
    pub async fn set_line_count(&self, resource_id: &str, line_count: u64) -> StoreResult<()> {
        let connection = self.database_client.get_connection()?;
        let affected = connection
            .execute(
                "UPDATE resources SET line_count = ?2 WHERE id = ?1",
                params![resource_id, line_count as i64],
            )
            .await?;
        if affected == 0 {
            return Err(StoreError::ResourceNotFound);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, resource_id: &str) -> StoreResult<Resource> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, name, kind, file_handle, line_count, sensitive FROM resources WHERE id = ?1",
                params![resource_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::ResourceNotFound)?;
        let project_ids = self.project_ids_for(resource_id).await?;
        Ok(Resource {
            id: row.get(0)?,
            name: row.get(1)?,
            kind: parse_kind(&row.get::<String>(2)?)?,
            file_handle: row.get(3)?,
            line_count: row.get::<Option<i64>>(4)?.map(|v| v as u64),
            sensitive: row.get::<i64>(5)? != 0,
            project_ids,
        })
    }

    async fn project_ids_for(&self, resource_id: &str) -> StoreResult<Vec<String>> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query("SELECT project_id FROM resource_project_links WHERE resource_id = ?1", params![resource_id])
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row.get(0)?);
        }
        Ok(out)
    }
}

fn kind_label(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::WordList => "word_list",
        ResourceKind::RuleList => "rule_list",
        ResourceKind::MaskList => "mask_list",
    }
}

fn parse_kind(label: &str) -> StoreResult<ResourceKind> {
    match label {
        "word_list" => Ok(ResourceKind::WordList),
        "rule_list" => Ok(ResourceKind::RuleList),
        "mask_list" => Ok(ResourceKind::MaskList),
        other => Err(StoreError::MappingError(format!("unknown resource kind '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_client(name: &str) -> StoreClient {
        StoreClient::connect(&format!("file:mem_{name}?mode=memory&cache=shared"), None).await.unwrap()
    }

    #[tokio::test]
    async fn sensitive_resource_requires_project() {
        let repo = ResourceRepository::new(memory_client("resource_sensitive").await);
        let result = repo.create("leaked.txt", ResourceKind::WordList, "s3://x", true, &[]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn line_count_starts_null_until_set() {
        let repo = ResourceRepository::new(memory_client("resource_linecount").await);
        let created = repo.create("rockyou.txt", ResourceKind::WordList, "s3://x", false, &[]).await.unwrap();
        assert_eq!(created.line_count, None);
        repo.set_line_count(&created.id, 14_344_391).await.unwrap();
        let fetched = repo.get(&created.id).await.unwrap();
        assert_eq!(fetched.line_count, Some(14_344_391));
    }
}
