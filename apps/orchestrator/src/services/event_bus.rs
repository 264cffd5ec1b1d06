// [apps/orchestrator/src/services/event_bus.rs]
/*!
 * APARATO: EVENT BUS SERVICE (ESTRATO L4)
 * RESPONSABILIDAD: DIFUSION DE SEÑALES EN TIEMPO REAL A SUSCRIPTORES SSE/WS
 *
 * Un único `broadcast::Sender` de proceso (§9: singleton justificado). Los
 * repositorios nunca lo tocan — devuelven `Vec<Effect>` puros y es la capa
 * de handlers quien, tras confirmar la escritura, traduce cada efecto
 * `Broadcast(event)` en una llamada aquí. Mantener el despacho fuera del
 * repositorio es lo que permite que `transitions.rs` siga siendo puro.
 */

use cipherswarm_domain_models::RealTimeEvent;
use tokio::sync::broadcast;
use tracing::{instrument, trace};

/// Generous enough to absorb a burst of task transitions without a lagging
/// subscriber dropping frames under normal operator-dashboard load.
const CHANNEL_CAPACITY: usize = 4096;

#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<RealTimeEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealTimeEvent> {
        self.sender.subscribe()
    }

    /// Emits one event. Absence of subscribers is the common case between
    /// dashboard connections and isn't an error.
    #[instrument(skip(self, event))]
    pub fn broadcast(&self, event: RealTimeEvent) {
        match self.sender.send(event) {
            Ok(subscriber_count) => trace!(subscriber_count, "📡 [EVENT_BUS]: dispatched"),
            Err(_) => trace!("💤 [EVENT_BUS]: no active subscribers"),
        }
    }

    pub fn broadcast_all(&self, events: impl IntoIterator<Item = RealTimeEvent>) {
        for event in events {
            self.broadcast(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
