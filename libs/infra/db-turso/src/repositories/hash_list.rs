// [libs/infra/db-turso/src/repositories/hash_list.rs]
/*!
 * APARATO: HASH LIST REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: LISTAS DE HASHES OBJETIVO Y CONTEO DE NO-AGRIETADOS
 */

use crate::errors::{StoreError, StoreResult};
use crate::StoreClient;
use cipherswarm_domain_models::{HashItem, HashList};
use libsql::params;
use tracing::instrument;

pub struct HashListRepository {
    database_client: StoreClient,
}

impl HashListRepository {
    pub fn new(database_client: StoreClient) -> Self {
        Self { database_client }
    }

    #[instrument(skip(self, hashes))]
    pub async fn create(
        &self,
        project_id: &str,
        name: &str,
        hash_type_id: i32,
        hashes: &[(String, Option<String>)],
    ) -> StoreResult<HashList> {
        let id = uuid::Uuid::new_v4().to_string();
        let connection = self.database_client.get_connection()?;
        let transaction = connection.transaction().await?;

        transaction
            .execute(
                "INSERT INTO hash_lists (id, project_id, name, hash_type_id, uncracked_count) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id.clone(), project_id, name, hash_type_id as i64, hashes.len() as i64],
            )
            .await?;

        for (hash_value, salt) in hashes {
            transaction
                .execute(
                    "INSERT INTO hash_items (id, hash_list_id, hash_value, salt) VALUES (?1, ?2, ?3, ?4)",
                    params![uuid::Uuid::new_v4().to_string(), id.clone(), hash_value.clone(), salt.clone()],
                )
                .await?;
        }

        transaction.commit().await?;

        Ok(HashList {
            id,
            project_id: project_id.to_string(),
            name: name.to_string(),
            hash_type_id,
            uncracked_count: hashes.len() as u64,
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, hash_list_id: &str) -> StoreResult<HashList> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, project_id, name, hash_type_id, uncracked_count FROM hash_lists WHERE id = ?1",
                params![hash_list_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::HashListNotFound)?;
        Ok(HashList {
            id: row.get(0)?,
            project_id: row.get(1)?,
            name: row.get(2)?,
            hash_type_id: row.get::<i64>(3)? as i32,
            uncracked_count: row.get::<i64>(4)? as u64,
        })
    }

    /// Invariant check (§3): `uncracked_count = count(items with plaintext IS NULL)`.
    /// Exposed for tests and for operator diagnostics; the cached counter is
    /// otherwise the one read on the hot path.
    #[instrument(skip(self))]
    pub async fn recount_uncracked(&self, hash_list_id: &str) -> StoreResult<u64> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT COUNT(*) FROM hash_items WHERE hash_list_id = ?1 AND plaintext IS NULL",
                params![hash_list_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::HashListNotFound)?;
        Ok(row.get::<i64>(0)? as u64)
    }

    #[instrument(skip(self))]
    pub async fn list_items(&self, hash_list_id: &str) -> StoreResult<Vec<HashItem>> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, hash_list_id, hash_value, salt, plaintext, cracked_at FROM hash_items WHERE hash_list_id = ?1",
                params![hash_list_id],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(HashItem {
                id: row.get(0)?,
                hash_list_id: row.get(1)?,
                hash_value: row.get(2)?,
                salt: row.get(3)?,
                plaintext: row.get(4)?,
                cracked_at: row.get(5)?,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_client(name: &str) -> StoreClient {
        StoreClient::connect(&format!("file:mem_{name}?mode=memory&cache=shared"), None).await.unwrap()
    }

    #[tokio::test]
    async fn create_seeds_uncracked_count_from_hash_count() {
        let repo = HashListRepository::new(memory_client("hash_list_create").await);
        let hashes = vec![("abc".to_string(), None), ("def".to_string(), None)];
        let created = repo.create("proj-1", "Target dump", 0, &hashes).await.unwrap();
        assert_eq!(created.uncracked_count, 2);
        assert_eq!(repo.recount_uncracked(&created.id).await.unwrap(), 2);
    }
}
