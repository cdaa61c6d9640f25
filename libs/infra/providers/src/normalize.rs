// [libs/infra/providers/src/normalize.rs]
/*!
 * APARATO: PROVIDER RECORD NORMALIZATION (ESTRATO L3)
 * RESPONSABILIDAD: COLAPSAR LA FORMA NATIVA DE UN PROVEEDOR EN `LeadPerson`
 *
 * VISION HIPER-HOLÍSTICA:
 * Las idiosincrasias de cada proveedor (strings de ubicación compuestos,
 * teléfonos sin tipo, nombre de empresa ausente) mueren aquí. Ningún
 * otro módulo del workspace vuelve a ver un payload crudo de proveedor.
 */

use serde::Deserialize;
use tracer_domain_models::lead::{LeadPerson, LeadPhone, PhoneType};

/// Forma cruda de un teléfono tal como la entrega el proveedor de
/// búsqueda masiva.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProviderPhone {
    pub number: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Forma cruda de un registro de persona tal como la entrega el
/// proveedor de búsqueda masiva o el de enriquecimiento.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProviderPerson {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phones: Vec<RawProviderPhone>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    /// Cadena compuesta típica del proveedor: `"City, ST, Country"` o
    /// `"City, ST"` (país implícito).
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
}

fn classify_label(label: &str) -> PhoneType {
    let lower = label.to_lowercase();
    if lower.contains("mobile") || lower.contains("cell") {
        PhoneType::Mobile
    } else if lower.contains("work") || lower.contains("office") {
        PhoneType::Work
    } else {
        PhoneType::Other
    }
}

fn sanitize_phone_number(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect()
}

/// Parsea `"City, ST, Country"` / `"City, ST"` / `"City"` en sus tres
/// componentes; cualquier segmento ausente queda en `None`.
pub fn parse_composite_location(location: &str) -> (Option<String>, Option<String>, Option<String>) {
    let segments: Vec<String> = location.split(',').map(|part| part.trim().to_string()).filter(|s| !s.is_empty()).collect();
    match segments.len() {
        0 => (None, None, None),
        1 => (Some(segments[0].clone()), None, None),
        2 => (Some(segments[0].clone()), Some(segments[1].clone()), None),
        _ => (Some(segments[0].clone()), Some(segments[1].clone()), Some(segments[2].clone())),
    }
}

/// Normaliza el registro nativo de un proveedor a la forma canónica
/// `LeadPerson`, incluyendo la selección de teléfono preferido que el
/// propio `LeadPerson` expone vía `preferred_phone()`.
pub fn normalize_provider_person(raw: RawProviderPerson, source_tag: &str) -> LeadPerson {
    let (city, state, country) = raw
        .location
        .as_deref()
        .map(parse_composite_location)
        .unwrap_or((None, None, None));

    let phones = raw
        .phones
        .into_iter()
        .enumerate()
        .map(|(position, phone)| LeadPhone {
            sanitized: sanitize_phone_number(&phone.number),
            phone_type: phone.label.as_deref().map(classify_label).unwrap_or(PhoneType::Other),
            raw: phone.number,
            position,
        })
        .collect();

    let full_name = format!("{} {}", raw.first_name, raw.last_name).trim().to_string();

    LeadPerson {
        id: raw.id,
        first_name: raw.first_name,
        last_name: raw.last_name,
        full_name,
        title: raw.title,
        email: raw.email,
        phones,
        linkedin_url: raw.linkedin_url,
        city,
        state,
        country,
        organization_name: raw.company_name,
        source: source_tag.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_part_location() {
        let (city, state, country) = parse_composite_location("Oakland, CA, USA");
        assert_eq!(city.as_deref(), Some("Oakland"));
        assert_eq!(state.as_deref(), Some("CA"));
        assert_eq!(country.as_deref(), Some("USA"));
    }

    #[test]
    fn parses_two_part_location_leaves_country_none() {
        let (city, state, country) = parse_composite_location("Oakland, CA");
        assert_eq!(city.as_deref(), Some("Oakland"));
        assert_eq!(state.as_deref(), Some("CA"));
        assert!(country.is_none());
    }

    #[test]
    fn normalization_prefers_mobile_phone() {
        let raw = RawProviderPerson {
            id: "p1".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            title: None,
            email: None,
            phones: vec![
                RawProviderPhone { number: "555-0100".into(), label: Some("work".into()) },
                RawProviderPhone { number: "555-0101".into(), label: Some("mobile".into()) },
            ],
            linkedin_url: None,
            location: Some("Oakland, CA".into()),
            company_name: Some("Acme".into()),
        };
        let lead = normalize_provider_person(raw, "bulk-search");
        let preferred = lead.preferred_phone().expect("expected a preferred phone");
        assert_eq!(preferred.phone_type, PhoneType::Mobile);
        assert_eq!(preferred.sanitized, "5550101");
    }

    #[test]
    fn normalization_falls_back_to_first_phone_without_mobile() {
        let raw = RawProviderPerson {
            id: "p2".into(),
            first_name: "John".into(),
            last_name: "Smith".into(),
            title: None,
            email: None,
            phones: vec![RawProviderPhone { number: "555-0200".into(), label: Some("work".into()) }],
            linkedin_url: None,
            location: None,
            company_name: None,
        };
        let lead = normalize_provider_person(raw, "bulk-search");
        assert_eq!(lead.preferred_phone().unwrap().phone_type, PhoneType::Work);
    }
}
