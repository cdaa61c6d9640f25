// [libs/domain/models/src/cache.rs]
/*!
 * =================================================================
 * APARATO: CACHE ENVELOPE CONTRACT (V1.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: FORMA CANÓNICA DE LOS BLOBS DE CACHÉ TIPADOS
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lead::LeadPerson;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CacheKind {
    Search,
    Person,
    Verification,
}

/// Payload de un envelope `kind = search`: soporta la decisión de
/// fulfillment-ratio del §4.6 sin tener que re-consultar al proveedor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCacheData {
    pub data: Vec<LeadPerson>,
    pub total_available: u32,
    pub requested_count: u32,
    pub search_params_fingerprint: String,
    pub created_at: DateTime<Utc>,
}

impl SearchCacheData {
    /// `len(data) / totalAvailable`, usado para decidir cache-hit vs refresh.
    pub fn fulfillment_ratio(&self) -> f64 {
        if self.total_available == 0 {
            return 0.0;
        }
        self.data.len() as f64 / self.total_available as f64
    }
}

/// Envelope de caché genérico. El payload se serializa como JSON opaco;
/// el `kind` indica cómo deserializarlo en el llamador.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEnvelope {
    pub key: String,
    pub kind: CacheKind,
    pub payload_json: String,
    pub hit_count: u64,
    pub expires_at: DateTime<Utc>,
}

impl CacheEnvelope {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fulfillment_ratio_of_zero_total_is_zero() {
        let cache = SearchCacheData {
            data: vec![],
            total_available: 0,
            requested_count: 10,
            search_params_fingerprint: "f".into(),
            created_at: Utc::now(),
        };
        assert_eq!(cache.fulfillment_ratio(), 0.0);
    }
}
