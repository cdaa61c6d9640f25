// [libs/domain/models/src/verification.rs]
/*!
 * =================================================================
 * APARATO: VERIFICATION OUTCOME CONTRACT (V1.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: FORMA CANÓNICA DEL VEREDICTO DE UN CRUCE REVERSO
 * =================================================================
 */

use serde::{Deserialize, Serialize};

use crate::lead::PhoneType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerificationSource {
    Primary,
    Fallback,
    None,
}

/// Señal de error distinguida que el verificador debe propagar sin
/// convertir en una simple cadena opaca — el driver decide la respuesta
/// operativa en función de cuál de estas señales observó.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ApiErrorSignal {
    InsufficientCredits,
    RateLimited,
    Network,
    Unknown,
}

/// Veredicto de una verificación reversa de teléfono contra un `LeadPerson`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub verified: bool,
    pub source: VerificationSource,
    pub match_score: u8,
    pub phone_type: Option<PhoneType>,
    pub carrier: Option<String>,
    pub age: Option<u32>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub api_error: Option<ApiErrorSignal>,
}

impl VerificationOutcome {
    pub fn unverified(source: VerificationSource, score: u8) -> Self {
        Self {
            verified: false,
            source,
            match_score: score,
            phone_type: None,
            carrier: None,
            age: None,
            city: None,
            state: None,
            api_error: None,
        }
    }

    pub fn api_error(signal: ApiErrorSignal) -> Self {
        Self {
            verified: false,
            source: VerificationSource::None,
            match_score: 0,
            phone_type: None,
            carrier: None,
            age: None,
            city: None,
            state: None,
            api_error: Some(signal),
        }
    }
}
