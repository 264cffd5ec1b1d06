// INICIO DEL ARCHIVO [libs/infra/worker-client/src/errors.rs]
//! =================================================================
//! APARATO: AGENT CLIENT ERRORS
//! RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DE COMUNICACIÓN CON EL ORQUESTADOR
//! =================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("NETWORK_UNREACHABLE: Failed to connect to Command Center: {0}")]
    NetworkFault(#[from] reqwest::Error),

    #[error("IO_VAULT_FAULT: Disk access denied or full: {0}")]
    IoFault(#[from] std::io::Error),

    #[error("ENVELOPE_CORRUPTION: Failed to decode server response: {0}")]
    DecodingFault(#[from] serde_json::Error),

    #[error("COMMAND_REJECTION: Server returned status {0}")]
    ServerRejection(String),

    #[error("IDENTITY_REVOKED: Session material invalid or expired")]
    Unauthorized,

    #[error("RESOURCE_HYDRATION_FAILED: Multi-resource download collapsed")]
    HydrationFailed,

    #[error("CHECKSUM_MISMATCH: downloaded resource {file_name} does not match its declared MD5")]
    ChecksumMismatch { file_name: String },
}
// FIN DEL ARCHIVO [libs/infra/worker-client/src/errors.rs]
