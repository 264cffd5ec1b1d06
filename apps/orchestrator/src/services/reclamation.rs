// [apps/orchestrator/src/services/reclamation.rs]
/*!
 * APARATO: RECLAMATION SWEEP SERVICE (ESTRATO L4)
 * RESPONSABILIDAD: BARRIDO PERIODICO DE TAREAS ZOMBI (§4.3)
 *
 * Único daemon de fondo del proceso además del bus de eventos (§9). Corre
 * en un intervalo configurable y nunca se invoca desde la ruta de una
 * petición: reclamar un lease vencido es responsabilidad de este barrido,
 * no de ningún handler.
 */

use crate::state::AppState;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, instrument};

#[instrument(skip(application_state))]
pub fn spawn_reclamation_sweep(application_state: AppState) {
    let sweep_interval_seconds = application_state.config.reclamation_sweep_interval_seconds;
    let lease_ttl_seconds = application_state.config.task_lease_ttl_seconds;

    tokio::spawn(async move {
        let mut ticker = interval(std::time::Duration::from_secs(sweep_interval_seconds));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("🧟 [RECLAMATION]: sweep daemon active, interval={sweep_interval_seconds}s ttl={lease_ttl_seconds}s");

        loop {
            ticker.tick().await;
            match application_state.tasks.reclaim_zombies(lease_ttl_seconds).await {
                Ok(reclaimed) => info!("🧟 [RECLAMATION]: pass complete, reclaimed {reclaimed} task(s)"),
                Err(err) => tracing::error!("🧟 [RECLAMATION_FAULT]: sweep pass failed: {err}"),
            }
        }
    });
}
