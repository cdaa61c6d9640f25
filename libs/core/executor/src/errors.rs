// [libs/core/executor/src/errors.rs]
/*!
 * APARATO: EXECUTOR UNIT ERROR CATALOG (ESTRATO L1)
 * RESPONSABILIDAD: CLASIFICACIÓN SEMÁNTICA DE FALLOS POR UNIDAD
 */

use std::fmt;

/// Clasificación de fallo de una unidad de trabajo, tal como la observa
/// el llamador (un adaptador HTTP mapea códigos de estado a estas
/// variantes antes de devolver el control al ejecutor).
#[derive(Debug, Clone)]
pub enum UnitError {
    /// HTTP 5xx. Reintentable con backoff exponencial dentro del pase principal.
    ServerError,
    /// HTTP 429. Reintentable de inmediato, luego diferido si se agota.
    RateLimitError,
    /// Reset/timeout/DNS. Reintentable una vez, sin pase diferido.
    TransportError,
    /// 4xx distinto de 429. Falla sin reintento.
    ClientError(String),
}

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitError::ServerError => write!(f, "server-error"),
            UnitError::RateLimitError => write!(f, "rate-limited"),
            UnitError::TransportError => write!(f, "network"),
            UnitError::ClientError(message) => write!(f, "client-error: {message}"),
        }
    }
}
