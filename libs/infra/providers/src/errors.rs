// [libs/infra/providers/src/errors.rs]
/*!
 * APARATO: PROVIDER ADAPTER ERROR CATALOG (ESTRATO L3)
 * RESPONSABILIDAD: CLASIFICACIÓN DE FALLOS DE RED HACIA PROVEEDORES EXTERNOS
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("NETWORK_UNREACHABLE: {0}")]
    Network(#[from] reqwest::Error),

    #[error("ENVELOPE_CORRUPTION: {0}")]
    Decoding(#[from] serde_json::Error),

    #[error("SERVER_REJECTION: upstream returned HTTP {0}")]
    ServerRejection(u16),

    #[error("RATE_LIMITED: upstream returned HTTP 429")]
    RateLimited,

    #[error("UNAUTHORIZED: bearer token rejected by upstream")]
    Unauthorized,
}

impl ClientError {
    /// Clasifica un código de estado HTTP en el taxón de error del spec
    /// §6: `401 → Unauthorized`, `429 → RateLimited`, `5xx → ServerRejection`,
    /// cualquier otro 4xx también cae en `ServerRejection` con su código.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ClientError::Unauthorized,
            429 => ClientError::RateLimited,
            _ => ClientError::ServerRejection(status),
        }
    }
}

/// Proyecta un fallo de adaptador al vocabulario del ejecutor por
/// cohortes (C5), que decide la política de reintento por unidad.
impl From<&ClientError> for tracer_core_executor::UnitError {
    fn from(error: &ClientError) -> Self {
        use tracer_core_executor::UnitError;
        match error {
            ClientError::RateLimited => UnitError::RateLimitError,
            ClientError::ServerRejection(status) if *status >= 500 => UnitError::ServerError,
            ClientError::ServerRejection(status) => UnitError::ClientError(format!("http-{status}")),
            ClientError::Unauthorized => UnitError::ClientError("unauthorized".to_string()),
            ClientError::Network(_) => UnitError::TransportError,
            ClientError::Decoding(_) => UnitError::ClientError("decoding-failure".to_string()),
        }
    }
}

/// Proyecta un fallo de adaptador al vocabulario del verificador (C4):
/// `Unauthorized` modela la señal "cuenta del SISTEMA agotada" del
/// proxy de scraping (spec §4.4, §7's `api-insufficient-credits`).
impl From<&ClientError> for tracer_domain_verification::SiteCallError {
    fn from(error: &ClientError) -> Self {
        use tracer_domain_verification::SiteCallError;
        match error {
            ClientError::Network(_) => SiteCallError::Transport,
            ClientError::Unauthorized => SiteCallError::InsufficientCredits,
            other => SiteCallError::Other(other.to_string()),
        }
    }
}
