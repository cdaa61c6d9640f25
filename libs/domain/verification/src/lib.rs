// [libs/domain/verification/src/lib.rs]
/*!
 * =================================================================
 * APARATO: REVERSE-LOOKUP VERIFICATION ENGINE (V1.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: CONFIRMAR QUE UN TELÉFONO PERTENECE A LA PERSONA ESPERADA
 * =================================================================
 */

pub mod errors;
pub mod phone_signal;
pub mod scoring;
pub mod transport;
pub mod verifier;

pub use errors::SiteCallError;
pub use phone_signal::{classify_phone_signal, DetectedLineKind};
pub use scoring::{score_profile, ScoredProfile, ScrapedProfile, VerificationQuery};
pub use transport::{ReverseLookupSite, ReverseLookupTransport};
pub use verifier::{ReverseLookupVerifier, VerifierConfig};

/// Re-exportado aquí para que los llamadores de `PhoneVerifier::verify`
/// (p.ej. `tracer-domain-pipeline`'s `ports.rs`) no necesiten depender
/// directamente de `tracer-domain-models` sólo por este tipo de retorno.
pub use tracer_domain_models::verification::VerificationOutcome;
