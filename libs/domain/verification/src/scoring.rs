// [libs/domain/verification/src/scoring.rs]
/*!
 * =================================================================
 * APARATO: REVERSE-LOOKUP SCORING RUBRIC (ESTRATO L2)
 * RESPONSABILIDAD: PUNTAJE PURO DE COINCIDENCIA ENTRE PERFIL Y CONSULTA
 *
 * # Mathematical Proof (Rubric Bound):
 * La suma de pesos (40 nombre + 30 edad + 20 estado + 10 ciudad) totaliza
 * exactamente 100, de modo que `score` siempre cae en `[0, 100]`. El
 * rechazo duro por edad fuera de rango devuelve de inmediato el puntaje
 * parcial acumulado hasta ese punto (solo el peso de nombre), sin
 * continuar evaluando estado/ciudad.
 * =================================================================
 */

const NAME_MATCH_WEIGHT: u8 = 40;
const AGE_MATCH_WEIGHT: u8 = 30;
const STATE_MATCH_WEIGHT: u8 = 20;
const CITY_MATCH_WEIGHT: u8 = 10;

/// Perfil ya extraído de un sitio de cruce reverso — el core nunca toca
/// HTML; un módulo de parseo en la frontera de infraestructura produce
/// esta forma.
#[derive(Debug, Clone, Default)]
pub struct ScrapedProfile {
    pub full_name: Option<String>,
    pub age: Option<u32>,
    pub state: Option<String>,
    pub city: Option<String>,
    /// Texto crudo donde `classify_phone_signal` busca palabras clave de
    /// tipo de línea y operador.
    pub raw_text_blob: String,
}

/// Lo que el llamador espera encontrar, derivado de `SearchQueryParams`
/// y del `LeadPerson` bajo verificación.
#[derive(Debug, Clone)]
pub struct VerificationQuery {
    pub expected_first_name: String,
    pub expected_last_name: String,
    pub min_age: u32,
    pub max_age: u32,
    pub expected_state: Option<String>,
    pub expected_city: Option<String>,
}

/// Resultado puro de puntuar un perfil contra una consulta. `rejected_on_age`
/// marca el rechazo duro del spec (edad fuera de rango no continúa sumando).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredProfile {
    pub score: u8,
    pub name_matched: bool,
    pub rejected_on_age: bool,
    pub age: Option<u32>,
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
}

fn substring_match(haystack: &Option<String>, needle: &str) -> bool {
    match haystack {
        Some(value) if !needle.is_empty() => normalize(value).contains(&normalize(needle)),
        _ => false,
    }
}

/// Aplica la rúbrica de puntaje spec §4.4 a un perfil extraído.
pub fn score_profile(profile: &ScrapedProfile, query: &VerificationQuery) -> ScoredProfile {
    let full_name_lower = profile.full_name.as_deref().map(normalize).unwrap_or_default();
    let first_matches = !query.expected_first_name.is_empty()
        && full_name_lower.contains(&normalize(&query.expected_first_name));
    let last_matches = !query.expected_last_name.is_empty()
        && full_name_lower.contains(&normalize(&query.expected_last_name));
    let name_matched = first_matches && last_matches;

    let mut score: u16 = 0;
    if name_matched {
        score += NAME_MATCH_WEIGHT as u16;
    }

    if let Some(age) = profile.age {
        if age < query.min_age || age > query.max_age {
            return ScoredProfile {
                score: score as u8,
                name_matched,
                rejected_on_age: true,
                age: Some(age),
            };
        }
        score += AGE_MATCH_WEIGHT as u16;
    }

    if let Some(expected_state) = &query.expected_state {
        if substring_match(&profile.state, expected_state) {
            score += STATE_MATCH_WEIGHT as u16;
        }
    }

    if let Some(expected_city) = &query.expected_city {
        if substring_match(&profile.city, expected_city) {
            score += CITY_MATCH_WEIGHT as u16;
        }
    }

    ScoredProfile {
        score: score.min(100) as u8,
        name_matched,
        rejected_on_age: false,
        age: profile.age,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_query() -> VerificationQuery {
        VerificationQuery {
            expected_first_name: "Jane".to_string(),
            expected_last_name: "Doe".to_string(),
            min_age: 25,
            max_age: 45,
            expected_state: Some("California".to_string()),
            expected_city: Some("Oakland".to_string()),
        }
    }

    #[test]
    fn full_match_scores_one_hundred() {
        let profile = ScrapedProfile {
            full_name: Some("Jane M. Doe".to_string()),
            age: Some(32),
            state: Some("California".to_string()),
            city: Some("Oakland".to_string()),
            raw_text_blob: String::new(),
        };
        let scored = score_profile(&profile, &base_query());
        assert_eq!(scored.score, 100);
        assert!(scored.name_matched);
        assert!(!scored.rejected_on_age);
    }

    #[test]
    fn age_outside_range_rejects_hard_and_stops_at_name_weight() {
        let profile = ScrapedProfile {
            full_name: Some("Jane Doe".to_string()),
            age: Some(70),
            state: Some("California".to_string()),
            city: Some("Oakland".to_string()),
            raw_text_blob: String::new(),
        };
        let scored = score_profile(&profile, &base_query());
        assert!(scored.rejected_on_age);
        assert_eq!(scored.score, 40);
    }

    #[test]
    fn name_mismatch_scores_zero_for_name_weight() {
        let profile = ScrapedProfile {
            full_name: Some("John Smith".to_string()),
            age: Some(32),
            state: Some("California".to_string()),
            city: Some("Oakland".to_string()),
            raw_text_blob: String::new(),
        };
        let scored = score_profile(&profile, &base_query());
        assert!(!scored.name_matched);
        assert_eq!(scored.score, 60);
    }

    #[test]
    fn missing_age_skips_age_weight_without_rejecting() {
        let profile = ScrapedProfile {
            full_name: Some("Jane Doe".to_string()),
            age: None,
            state: Some("California".to_string()),
            city: None,
            raw_text_blob: String::new(),
        };
        let scored = score_profile(&profile, &base_query());
        assert!(!scored.rejected_on_age);
        assert_eq!(scored.score, 60);
    }
}
