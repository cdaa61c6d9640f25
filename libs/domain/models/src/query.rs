// [libs/domain/models/src/query.rs]
/*!
 * =================================================================
 * APARATO: QUERY FINGERPRINT CONTRACT (V1.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: NORMALIZACIÓN Y HASH DETERMINISTA DE CONSULTAS
 *
 * # Mathematical Proof (Deterministic Fingerprint):
 * Dos consultas con los mismos campos normalizados producen siempre el
 * mismo fingerprint, habilitando la deduplicación de caché y de tareas
 * sin depender del orden o de la capitalización provista por el caller.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Modo de búsqueda: `Fuzzy` consulta el proveedor masivo con caché;
/// `Exact` siempre invoca el adaptador de scraping de mayor costo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    Fuzzy,
    Exact,
}

/// Parámetros de entrada de una búsqueda de persona, previos a normalización.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQueryParams {
    pub name: String,
    pub title: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub requested_count: u32,
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
    pub mode: SearchMode,
}

impl SearchQueryParams {
    fn normalized_field(value: &str) -> String {
        value.trim().to_lowercase()
    }

    /// Hash determinista de `{name, title, state, requested_count, mode}`,
    /// usado como clave de caché y como hint de deduplicación de tareas.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(Self::normalized_field(&self.name).as_bytes());
        hasher.update(b"|");
        hasher.update(
            Self::normalized_field(self.title.as_deref().unwrap_or("")).as_bytes(),
        );
        hasher.update(b"|");
        hasher.update(
            Self::normalized_field(self.state.as_deref().unwrap_or("")).as_bytes(),
        );
        hasher.update(b"|");
        hasher.update(self.requested_count.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(if self.mode == SearchMode::Exact { b"exact" } else { b"fuzzy" });

        hex_digest(&hasher.finalize())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.requested_count == 0 {
            return Err("requestedCount must be >= 1".to_string());
        }
        if let (Some(min), Some(max)) = (self.age_min, self.age_max) {
            if min > max {
                return Err("ageMin must be <= ageMax".to_string());
            }
        }
        Ok(())
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{:02x}", byte)).collect()
}

/// Helper público usado por las capas de caché (`apify:<hash>`).
pub fn compute_query_fingerprint(params: &SearchQueryParams) -> String {
    params.fingerprint()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_params() -> SearchQueryParams {
        SearchQueryParams {
            name: "Jane Doe".into(),
            title: Some("Engineer".into()),
            state: Some("CA".into()),
            city: None,
            requested_count: 50,
            age_min: None,
            age_max: None,
            mode: SearchMode::Fuzzy,
        }
    }

    #[test]
    fn fingerprint_is_stable_across_case_and_whitespace() {
        let a = base_params();
        let mut b = base_params();
        b.name = "  JANE doe  ".into();
        b.title = Some("ENGINEER".into());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn fingerprint_changes_with_mode() {
        let a = base_params();
        let mut b = base_params();
        b.mode = SearchMode::Exact;
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn rejects_zero_requested_count() {
        let mut params = base_params();
        params.requested_count = 0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn accepts_single_requested_count() {
        let mut params = base_params();
        params.requested_count = 1;
        assert!(params.validate().is_ok());
    }
}
