// [apps/orchestrator/src/bin/migrator.rs]
/*!
 * APARATO: DB MIGRATOR CLI (ESTRATO L6)
 * RESPONSABILIDAD: APLICACION IDEMPOTENTE DEL ESQUEMA DE LA BASE
 */

use dotenvy::dotenv;
use cipherswarm_infra_store::schema::apply_full_sovereign_schema;
use cipherswarm_infra_store::StoreClient;
use cipherswarm_telemetry::init_tracing;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing("cipherswarm_migrator");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_stack_size(4 * 1024 * 1024)
        .build()?;

    runtime.block_on(async {
        info!("🚀 [MIGRATOR]: applying schema...");

        let database_url =
            std::env::var("DATABASE_URL").expect("CRITICAL_FAULT: DATABASE_URL undefined in terminal context.");
        let database_token = std::env::var("TURSO_AUTH_TOKEN").ok();

        let database_client = match StoreClient::connect(&database_url, database_token).await {
            Ok(client) => client,
            Err(connection_error) => {
                error!("❌ [UPLINK_FAULT]: failed to establish link to Turso: {}", connection_error);
                return Err(anyhow::anyhow!(connection_error));
            }
        };

        let database_connection =
            database_client.get_connection().map_err(|error| anyhow::anyhow!("POOL_EXHAUSTED: {}", error))?;

        match apply_full_sovereign_schema(&database_connection).await {
            Ok(_) => {
                info!("✨ [MIGRATOR_SUCCESS]: schema is up to date.");
                Ok(())
            }
            Err(schema_fault) => {
                error!("💀 [SCHEMA_COLLAPSE]: fatal structural error: {}", schema_fault);
                std::process::exit(1);
            }
        }
    })
}
// FIN DEL ARCHIVO [apps/orchestrator/src/bin/migrator.rs]
