// [libs/domain/models/src/result.rs]
/*!
 * =================================================================
 * APARATO: SEARCH RESULT CONTRACT (V1.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: FORMA CANÓNICA DE UN REGISTRO PERSISTIDO POR TAREA
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lead::PhoneType;

/// Estado del teléfono de un resultado persistido.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PhoneStatus {
    /// El lead no tenía teléfono; sólo se conservó el correo.
    NoPhone,
    /// Teléfono presente pero no cruzado con éxito contra fuentes públicas.
    Received,
    /// Teléfono cruzado con éxito, `verified = true`.
    Verified,
}

/// Una fila hija de una Search Task, una por registro conservado.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub task_id: String,
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub phone_type: Option<PhoneType>,
    pub phone_status: PhoneStatus,
    pub linkedin_url: Option<String>,
    pub age: Option<u32>,
    pub carrier: Option<String>,
    pub verified: bool,
    pub verification_score: u8,
    pub verification_source: String,
    pub data_source: String,
    pub created_at: DateTime<Utc>,
}

impl SearchResult {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn full_location(&self) -> String {
        let parts: Vec<&str> = [self.city.as_deref(), self.state.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        parts.join(", ")
    }
}
