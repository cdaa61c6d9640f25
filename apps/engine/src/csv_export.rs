// [apps/engine/src/csv_export.rs]
/*!
 * APARATO: CSV EXPORT RENDERER (ESTRATO L4 - APPLICATION)
 * RESPONSABILIDAD: SERIALIZACIÓN BYTE-EXACTA DEL FORMATO DE EXPORTACIÓN (spec §6)
 *
 * Función pura: ningún I/O, ninguna llamada a red o persistencia. Toma
 * la tarea dueña (para `searchName`/`searchLocation`, que son propiedad
 * de la consulta, no de cada fila) y sus resultados ya ordenados por
 * `created_at` (orden de creación, spec §6).
 */

use tracer_domain_models::{LeadPerson, PhoneType, SearchResult, SearchTask};

const CSV_HEADER: &[&str] = &[
    "fullName",
    "firstName",
    "lastName",
    "age",
    "city",
    "state",
    "fullLocation",
    "phone",
    "phoneType",
    "carrier",
    "propertyValue",
    "searchName",
    "searchLocation",
    "detailUrl",
    "dataSource",
    "fetchDate",
];

/// Renderiza el CSV de exportación exactamente como exige spec §6: UTF-8
/// con BOM, fila de cabecera, una fila por resultado en orden de creación.
pub fn render_results_csv(task: &SearchTask, results: &[SearchResult]) -> Vec<u8> {
    let search_name = task.query_params.name.clone();
    let search_location = [task.query_params.city.as_deref(), task.query_params.state.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(CSV_HEADER).expect("writing the CSV header into an in-memory buffer cannot fail");

    for result in results {
        let record = [
            result.full_name(),
            result.first_name.clone(),
            result.last_name.clone(),
            result.age.map(|age| age.to_string()).unwrap_or_default(),
            result.city.clone().unwrap_or_default(),
            result.state.clone().unwrap_or_default(),
            result.full_location(),
            result.phone.as_deref().map(normalize_phone_for_export).unwrap_or_default(),
            result.phone_type.map(phone_type_tag).unwrap_or_default().to_string(),
            result.carrier.clone().unwrap_or_default(),
            String::new(), // propertyValue: never modeled for this adapter family (DESIGN.md).
            search_name.clone(),
            search_location.clone(),
            String::new(), // detailUrl: never modeled for this adapter family (DESIGN.md).
            result.data_source.clone(),
            result.created_at.format("%Y-%m-%d").to_string(),
        ];
        writer.write_record(&record).expect("writing a CSV row into an in-memory buffer cannot fail");
    }

    let body = writer.into_inner().expect("flushing an in-memory CSV writer cannot fail");

    let mut out = Vec::with_capacity(body.len() + 3);
    out.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
    out.extend_from_slice(&body);
    out
}

fn phone_type_tag(kind: PhoneType) -> &'static str {
    match kind {
        PhoneType::Mobile => "mobile",
        PhoneType::Work => "work",
        PhoneType::Other => "other",
    }
}

/// Normaliza un teléfono ya saneado (solo dígitos) al formato estadounidense
/// de 10 dígitos exigido por spec §6: `1XXXXXXXXXX`. Números ya prefijados
/// con `1` de 11 dígitos se respetan tal cual; cualquier otra longitud se
/// deja intacta (no es un número estadounidense normalizable).
fn normalize_phone_for_export(sanitized: &str) -> String {
    let digits: String = sanitized.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        10 => format!("1{}", digits),
        11 if digits.starts_with('1') => digits,
        _ => digits,
    }
}

/// Deriva `organizationName`-style búsquedas de ubicación a partir de un
/// `LeadPerson`, usado únicamente por las pruebas de este módulo para
/// construir fixtures realistas sin reconstruir el adaptador completo.
#[cfg(test)]
fn sample_lead(first: &str, last: &str) -> LeadPerson {
    LeadPerson {
        id: "prov-1".into(),
        first_name: first.into(),
        last_name: last.into(),
        full_name: format!("{first} {last}"),
        title: None,
        email: None,
        phones: vec![],
        linkedin_url: None,
        city: Some("Austin".into()),
        state: Some("TX".into()),
        country: Some("US".into()),
        organization_name: None,
        source: "apify".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tracer_domain_models::{PhoneStatus, SearchMode, SearchQueryParams, SearchTaskStatus};

    fn sample_task() -> SearchTask {
        SearchTask {
            id: "t1".into(),
            token: "tok-1".into(),
            submitter_id: "u1".into(),
            query_fingerprint: "f1".into(),
            query_params: SearchQueryParams {
                name: "Jane Doe".into(),
                title: None,
                state: Some("TX".into()),
                city: Some("Austin".into()),
                requested_count: 10,
                age_min: None,
                age_max: None,
                mode: SearchMode::Fuzzy,
            },
            requested_count: 10,
            actual_kept_count: 1,
            credits_spent: 3,
            status: SearchTaskStatus::Completed,
            progress_percent: 100,
            logs: vec![],
            error_message: None,
            created_at: Utc::now(),
            completed_at: Some(Utc::now()),
        }
    }

    fn sample_result() -> SearchResult {
        let _lead = sample_lead("Jane", "Doe");
        SearchResult {
            id: "r1".into(),
            task_id: "t1".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            title: None,
            company: None,
            city: Some("Austin".into()),
            state: Some("TX".into()),
            country: Some("US".into()),
            email: None,
            phone: Some("5125551234".into()),
            phone_type: Some(PhoneType::Mobile),
            phone_status: PhoneStatus::Verified,
            linkedin_url: None,
            age: Some(34),
            carrier: Some("Verizon".into()),
            verified: true,
            verification_score: 85,
            verification_source: "primary".into(),
            data_source: "apify".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn csv_starts_with_utf8_bom() {
        let bytes = render_results_csv(&sample_task(), &[]);
        assert_eq!(&bytes[0..3], &[0xEF, 0xBB, 0xBF]);
    }

    #[test]
    fn csv_header_matches_spec_column_order() {
        let bytes = render_results_csv(&sample_task(), &[]);
        let text = String::from_utf8(bytes).unwrap();
        let header_line = text.lines().next().unwrap();
        assert_eq!(
            header_line,
            "fullName,firstName,lastName,age,city,state,fullLocation,phone,phoneType,carrier,propertyValue,searchName,searchLocation,detailUrl,dataSource,fetchDate"
        );
    }

    #[test]
    fn phone_is_normalized_to_eleven_digit_us_format() {
        let bytes = render_results_csv(&sample_task(), &[sample_result()]);
        let text = String::from_utf8(bytes).unwrap();
        let data_line = text.lines().nth(1).unwrap();
        assert!(data_line.contains("15125551234"));
    }

    #[test]
    fn search_name_and_location_come_from_the_owning_task() {
        let bytes = render_results_csv(&sample_task(), &[sample_result()]);
        let text = String::from_utf8(bytes).unwrap();
        let data_line = text.lines().nth(1).unwrap();
        assert!(data_line.contains("Jane Doe"));
        assert!(data_line.contains("Austin, TX"));
    }

    #[test]
    fn cells_with_commas_are_quoted() {
        let mut result = sample_result();
        result.city = Some("Austin, Travis County".into());
        let bytes = render_results_csv(&sample_task(), &[result]);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"Austin, Travis County\""));
    }
}
