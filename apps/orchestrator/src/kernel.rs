// [apps/orchestrator/src/kernel.rs]
/*!
 * APARATO: ORCHESTRATOR KERNEL (ESTRATO L1-APP)
 * RESPONSABILIDAD: COMPOSITION ROOT — CONEXION A LA BASE, ENSAMBLADO DEL
 * ESTADO Y ARRANQUE DEL SERVIDOR HTTP
 */

use crate::routes::create_router;
use crate::state::AppState;
use cipherswarm_infra_store::StoreClient;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::config::OrchestratorConfig;
use crate::services::reclamation::spawn_reclamation_sweep;

pub struct OrchestratorKernel {
    pub application_state: AppState,
}

impl OrchestratorKernel {
    #[instrument(skip(config))]
    pub async fn ignite(config: OrchestratorConfig) -> Result<Self, cipherswarm_infra_store::StoreError> {
        let database_client = StoreClient::connect(&config.database_url, config.database_auth_token.clone()).await?;

        Ok(Self { application_state: AppState::new(database_client, Arc::new(config)) })
    }

    pub async fn launch(self) -> Result<(), std::io::Error> {
        spawn_reclamation_sweep(self.application_state.clone());

        let listen_port = self.application_state.config.listen_port;
        let router = create_router(self.application_state);

        let bind_address = SocketAddr::new("0.0.0.0".parse::<IpAddr>().unwrap(), listen_port);
        info!("🚀 [KERNEL_ONLINE]: orchestrator listening at {}", bind_address);

        let listener = tokio::net::TcpListener::bind(bind_address).await?;
        if let Err(server_error) = axum::serve(listener, router).await {
            error!("💀 [KERNEL_COLLAPSE]: runtime failure: {}", server_error);
            std::process::exit(1);
        }
        Ok(())
    }
}
// FIN DEL ARCHIVO [apps/orchestrator/src/kernel.rs]
