// [libs/infra/db-turso/src/repositories/benchmark.rs]
/*!
 * APARATO: BENCHMARK REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: VELOCIDADES DE HASHCAT POR DISPOSITIVO Y SU VENTANA DE FRESCURA
 */

use crate::errors::StoreResult;
use crate::StoreClient;
use cipherswarm_domain_models::Benchmark;
use libsql::params;
use tracing::{info, instrument};

/// Default freshness window when the orchestrator's configuration doesn't
/// override it. Benchmarks older than the window passed to
/// [`BenchmarkRepository::fresh_for_agent_hash_type`] are treated as stale
/// and ignored by the Matcher (§4.2) — an agent must re-benchmark after it.
pub const DEFAULT_FRESHNESS_WINDOW_SECONDS: i64 = 7 * 24 * 60 * 60;

pub struct BenchmarkRepository {
    database_client: StoreClient,
}

impl BenchmarkRepository {
    pub fn new(database_client: StoreClient) -> Self {
        Self { database_client }
    }

    /// Bulk-upserts one agent's full benchmark sweep in a single
    /// transaction: an agent always reports every device together, so a
    /// partial write would leave stale rows for devices it stopped testing.
    #[instrument(skip(self, entries))]
    pub async fn upsert_bulk(&self, agent_id: &str, entries: &[Benchmark]) -> StoreResult<()> {
        let connection = self.database_client.get_connection()?;
        let transaction = connection.transaction().await?;

        for entry in entries {
            transaction
                .execute(
                    "INSERT INTO benchmarks (agent_id, hash_type_id, device_index, hash_speed, runtime_ms, measured_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(agent_id, hash_type_id, device_index) DO UPDATE SET
                        hash_speed = excluded.hash_speed,
                        runtime_ms = excluded.runtime_ms,
                        measured_at = excluded.measured_at",
                    params![
                        agent_id,
                        entry.hash_type_id as i64,
                        entry.device_index as i64,
                        entry.hash_speed.to_string(),
                        entry.runtime_ms as i64,
                        entry.measured_at.clone(),
                    ],
                )
                .await?;
        }

        transaction.commit().await?;
        info!("📊 [BENCHMARK]: upserted {} entries for agent {}", entries.len(), agent_id);
        Ok(())
    }

    /// Fresh benchmarks for `(agent, hash_type)`, one row per device. The
    /// Matcher sums `hash_speed` across devices for that agent's estimate.
    #[instrument(skip(self))]
    pub async fn fresh_for_agent_hash_type(
        &self,
        agent_id: &str,
        hash_type_id: i32,
        freshness_window_seconds: i64,
    ) -> StoreResult<Vec<Benchmark>> {
        let connection = self.database_client.get_connection()?;
        let cutoff = (chrono::Utc::now() - chrono::Duration::seconds(freshness_window_seconds)).to_rfc3339();
        let mut rows = connection
            .query(
                "SELECT agent_id, hash_type_id, device_index, hash_speed, runtime_ms, measured_at
                 FROM benchmarks
                 WHERE agent_id = ?1 AND hash_type_id = ?2 AND measured_at >= ?3",
                params![agent_id, hash_type_id as i64, cutoff],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(Benchmark {
                agent_id: row.get(0)?,
                hash_type_id: row.get::<i64>(1)? as i32,
                device_index: row.get::<i64>(2)? as u32,
                hash_speed: row
                    .get::<String>(3)?
                    .parse()
                    .unwrap_or(0),
                runtime_ms: row.get::<i64>(4)? as u64,
                measured_at: row.get(5)?,
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
    async fn upsert_replaces_prior_measurement_for_same_device() {
        let repo = BenchmarkRepository::new(memory_client("benchmark_upsert").await);
        let now = chrono::Utc::now().to_rfc3339();
        let first = Benchmark { agent_id: "a1".into(), hash_type_id: 0, device_index: 0, hash_speed: 1_000_000, runtime_ms: 500, measured_at: now.clone() };
        repo.upsert_bulk("a1", &[first]).await.unwrap();

        let second = Benchmark { agent_id: "a1".into(), hash_type_id: 0, device_index: 0, hash_speed: 2_000_000, runtime_ms: 500, measured_at: now };
        repo.upsert_bulk("a1", &[second]).await.unwrap();

        let fresh = repo.fresh_for_agent_hash_type("a1", 0, DEFAULT_FRESHNESS_WINDOW_SECONDS).await.unwrap();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].hash_speed, 2_000_000);
    }
}
