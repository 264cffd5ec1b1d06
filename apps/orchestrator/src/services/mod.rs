// [apps/orchestrator/src/services/mod.rs]
/*!
 * APARATO: SERVICE REGISTRY (ESTRATO L4)
 * RESPONSABILIDAD: EXPOSICION NOMINAL DE DAEMONS DE FONDO
 */

pub mod cascade;
pub mod event_bus;
pub mod reclamation;
