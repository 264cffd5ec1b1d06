// [apps/orchestrator/src/handlers/mod.rs]
/*!
 * APARATO: HANDLER REGISTRY (ESTRATO L4)
 * RESPONSABILIDAD: EXPOSICION NOMINAL DE LOS PUNTOS DE ENTRADA HTTP
 */

pub mod agent_api;
pub mod operator;
