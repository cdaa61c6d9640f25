// [libs/domain/verification/src/phone_signal.rs]
/*!
 * APARATO: PHONE SIGNAL CLASSIFIER (ESTRATO L2)
 * RESPONSABILIDAD: DETECCIÓN DE TIPO DE LÍNEA Y OPERADOR VÍA PALABRAS CLAVE
 */

use tracer_domain_models::lead::PhoneType;

/// Tipo de línea detectado por escaneo de palabras clave sobre el texto
/// crudo del perfil — más granular que `lead::PhoneType`, que solo
/// distingue móvil/trabajo/otro en la forma canónica persistida.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedLineKind {
    Mobile,
    Landline,
    Voip,
    Unknown,
}

impl DetectedLineKind {
    /// Colapsa la clasificación fina a la forma canónica que persiste en
    /// `VerificationOutcome`/`LeadPhone`.
    pub fn to_phone_type(self) -> Option<PhoneType> {
        match self {
            DetectedLineKind::Mobile => Some(PhoneType::Mobile),
            DetectedLineKind::Landline | DetectedLineKind::Voip => Some(PhoneType::Other),
            DetectedLineKind::Unknown => None,
        }
    }
}

const MOBILE_KEYWORDS: &[&str] = &["mobile", "cell", "wireless"];
const LANDLINE_KEYWORDS: &[&str] = &["landline", "residential", "fixed line"];
const VOIP_KEYWORDS: &[&str] = &["voip", "internet telephone", "virtual number"];

/// Escanea `raw_text` por palabras clave de tipo de línea y captura el
/// nombre de operador cuando aparece con el patrón `carrier: <value>`.
pub fn classify_phone_signal(raw_text: &str) -> (DetectedLineKind, Option<String>) {
    let lower = raw_text.to_lowercase();

    let kind = if MOBILE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        DetectedLineKind::Mobile
    } else if LANDLINE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        DetectedLineKind::Landline
    } else if VOIP_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        DetectedLineKind::Voip
    } else {
        DetectedLineKind::Unknown
    };

    let carrier = lower.find("carrier:").map(|index| {
        raw_text[index + "carrier:".len()..]
            .split(|c: char| c == '\n' || c == ',' || c == ';')
            .next()
            .unwrap_or("")
            .trim()
            .to_string()
    });

    (kind, carrier.filter(|value| !value.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_mobile_keyword() {
        let (kind, _) = classify_phone_signal("Line type: Mobile, Carrier: Verizon Wireless");
        assert_eq!(kind, DetectedLineKind::Mobile);
    }

    #[test]
    fn detects_landline_keyword() {
        let (kind, _) = classify_phone_signal("This is a residential landline number.");
        assert_eq!(kind, DetectedLineKind::Landline);
    }

    #[test]
    fn detects_voip_keyword() {
        let (kind, _) = classify_phone_signal("Registered as a VoIP virtual number.");
        assert_eq!(kind, DetectedLineKind::Voip);
    }

    #[test]
    fn falls_back_to_unknown() {
        let (kind, carrier) = classify_phone_signal("No useful signal here.");
        assert_eq!(kind, DetectedLineKind::Unknown);
        assert!(carrier.is_none());
    }

    #[test]
    fn extracts_carrier_name() {
        let (_, carrier) = classify_phone_signal("Mobile, Carrier: AT&T\nOther details");
        assert_eq!(carrier.as_deref(), Some("AT&T"));
    }
}
