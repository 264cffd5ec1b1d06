// INICIO DEL ARCHIVO [libs/infra/worker-client/src/lib.rs]
/*!
 * =================================================================
 * APARATO: AGENT CLIENT LIBRARY BARREL (ESTRATO L3)
 * CLASIFICACIÓN: INFRASTRUCTURE LIB
 * RESPONSABILIDAD: EXPOSICIÓN PÚBLICA DE MÓDULOS DE UPLINK DEL AGENTE
 * =================================================================
 */

pub mod client;
pub mod errors;
pub mod hydrator;

pub use client::AgentClient;
pub use errors::ClientError;
pub use hydrator::ResourceHydrator;
// FIN DEL ARCHIVO [libs/infra/worker-client/src/lib.rs]
