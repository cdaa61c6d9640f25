// [libs/domain/verification/src/errors.rs]
/*!
 * APARATO: VERIFIER TRANSPORT ERROR CATALOG (ESTRATO L2)
 * RESPONSABILIDAD: CLASIFICACIÓN DE FALLOS DE UNA LLAMADA AL PROXY DE SCRAPING
 */

/// Fallo de una única llamada al proxy de scraping reverso. Distinto del
/// `UnitError` del ejecutor por cohortes: este vive un nivel más abajo,
/// alrededor de una sola decisión de puntuación, no de un lote.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SiteCallError {
    /// Reset/timeout/DNS. Reintentable localmente, acotado por `VerifierConfig`.
    #[error("transport failure calling reverse-lookup site")]
    Transport,

    /// La cuenta de proveedor del SISTEMA está agotada — corta-circuita
    /// toda la verificación (spec §4.4), no solo el sitio actual.
    #[error("upstream scraping proxy reports insufficient credits")]
    InsufficientCredits,

    /// Cualquier otro fallo no retryable (4xx, payload inesperado, etc.).
    #[error("reverse-lookup site call failed: {0}")]
    Other(String),
}
