// [apps/orchestrator/src/main.rs]
/*!
 * APARATO: ORCHESTRATOR MAIN ENTRY POINT (ESTRATO L3)
 * RESPONSABILIDAD: IGNICION DEL RUNTIME Y DEL KERNEL
 */

use cipherswarm_orchestrator::prelude::*;

use cipherswarm_telemetry::init_tracing;
use dotenvy::dotenv;
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("cipherswarm_orchestrator");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_stack_size(4 * 1024 * 1024)
        .build()?;

    runtime.block_on(async {
        info!("🛰️  [ORCHESTRATOR]: ignition sequence starting...");

        let config = OrchestratorConfig::from_env().unwrap_or_else(|err| {
            error!("❌ [CONFIG_FAULT]: {err}");
            std::process::exit(1);
        });
        let listen_port = config.listen_port;

        let kernel = OrchestratorKernel::ignite(config).await.unwrap_or_else(|err| {
            error!("💀 [IGNITION_FAULT]: database link collapse: {err}");
            std::process::exit(1);
        });

        info!("🚀 [ORCHESTRATOR_ONLINE]: serving on port {listen_port}");
        kernel.launch().await
    })?;

    Ok(())
}
