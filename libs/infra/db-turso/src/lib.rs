// [libs/infra/db-turso/src/lib.rs]
/*!
 * =================================================================
 * APARATO: PERSISTENCE ENGINE ENTRYPOINT (ESTRATO L3)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DEL MOTOR DE PERSISTENCIA LIBSQL
 *
 * Ensambla el cliente de conexión, el catálogo de errores, la máquina
 * de estados pura y los repositorios por entidad en una única fachada
 * consumida por `apps/orchestrator`.
 * =================================================================
 */

mod client;
mod errors;
mod schema;
mod transitions;

pub mod repositories;

pub use client::StoreClient;
pub use errors::{StoreError, StoreResult};
pub use transitions::{
    AttackContext, AttackEffect, AttackEvent, CampaignContext, CampaignEffect, CampaignEvent, Effect, TaskContext,
    TaskEvent, TransitionError,
};
