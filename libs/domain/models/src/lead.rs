// [libs/domain/models/src/lead.rs]
/*!
 * =================================================================
 * APARATO: LEAD NORMALIZATION CONTRACT (V1.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: FORMA CANÓNICA DE UN REGISTRO DE PROVEEDOR
 *
 * VISION HIPER-HOLÍSTICA:
 * Las idiosincrasias de cada proveedor externo (campos ausentes, strings
 * de ubicación compuestos, teléfonos sin tipo) mueren en la frontera del
 * adaptador. Lo que entra al motor es siempre un `LeadPerson`.
 * =================================================================
 */

use serde::{Deserialize, Serialize};

/// Clasificación de un número de teléfono tal como lo reporta el proveedor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhoneType {
    Mobile,
    Work,
    Other,
}

/// Un teléfono normalizado, aún no verificado contra fuentes públicas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadPhone {
    /// Representación tal como llegó del proveedor.
    pub raw: String,
    /// Dígitos únicamente, formato E.164-lite sin prefijo de país forzado.
    pub sanitized: String,
    pub phone_type: PhoneType,
    /// Posición en el arreglo original del proveedor (para desempate determinista).
    pub position: usize,
}

/// Registro normalizado de persona, forma canónica entre proveedores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadPerson {
    /// Identificador del proveedor de origen (para envelope de caché `person:<id>`).
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phones: Vec<LeadPhone>,
    pub linkedin_url: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub organization_name: Option<String>,
    /// Tag libre del proveedor de origen (p.ej. "apify", "exact-scrape").
    pub source: String,
}

impl LeadPerson {
    /// Selecciona el teléfono preferido: móvil primero, si no el primero disponible.
    pub fn preferred_phone(&self) -> Option<&LeadPhone> {
        self.phones
            .iter()
            .find(|phone| phone.phone_type == PhoneType::Mobile)
            .or_else(|| self.phones.first())
    }

    pub fn has_phone(&self) -> bool {
        !self.phones.is_empty()
    }

    pub fn has_email(&self) -> bool {
        self.email.as_deref().map(|e| !e.is_empty()).unwrap_or(false)
    }
}
