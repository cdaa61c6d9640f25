// [libs/domain/verification/src/verifier.rs]
/*!
 * =================================================================
 * APARATO: REVERSE-LOOKUP VERIFIER (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: POLÍTICA DE DOS ETAPAS SOBRE SITIOS DE CRUCE REVERSO
 *
 * # Mathematical Proof (Acceptance vs. Verified):
 * El umbral de aceptación de etapa (60) gobierna si se consulta el sitio
 * de respaldo; el umbral de veredicto final (70) gobierna el campo
 * `verified` del resultado. Un resultado puede aceptarse en la etapa
 * primaria (deteniendo la consulta al fallback) y aun así reportar
 * `verified=false` si su puntaje cae en [60, 70).
 * =================================================================
 */

use std::time::Duration;

use tracing::{debug, instrument, warn};

use tracer_domain_models::verification::{ApiErrorSignal, VerificationOutcome, VerificationSource};

use crate::errors::SiteCallError;
use crate::phone_signal::classify_phone_signal;
use crate::scoring::{score_profile, ScoredProfile, ScrapedProfile, VerificationQuery};
use crate::transport::{ReverseLookupSite, ReverseLookupTransport};

/// Umbral a partir del cual una etapa se acepta sin consultar la siguiente.
const ACCEPT_THRESHOLD: u8 = 60;
/// Umbral a partir del cual el veredicto final es `verified = true`.
const VERIFIED_THRESHOLD: u8 = 70;

#[derive(Debug, Clone, Copy)]
pub struct VerifierConfig {
    /// Reintentos locales ante fallos de transporte, antes de ceder al
    /// siguiente sitio. 5xx/429 no se retocan aquí — pertenecen al
    /// ejecutor por cohortes (spec §4.5).
    pub transport_retry_count: u32,
    pub transport_retry_delay_ms: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self { transport_retry_count: 2, transport_retry_delay_ms: 500 }
    }
}

pub struct ReverseLookupVerifier<T: ReverseLookupTransport> {
    transport: T,
    config: VerifierConfig,
}

struct StageOutcome {
    scored: ScoredProfile,
    profile: ScrapedProfile,
    source: VerificationSource,
}

impl<T: ReverseLookupTransport> ReverseLookupVerifier<T> {
    pub fn new(transport: T, config: VerifierConfig) -> Self {
        Self { transport, config }
    }

    #[instrument(skip(self, query, phone))]
    pub async fn verify(&self, phone: &str, query: &VerificationQuery) -> VerificationOutcome {
        let primary = match self.call_with_retry(ReverseLookupSite::Primary, phone, query).await {
            Ok(stage) => Some(stage),
            Err(SiteCallError::InsufficientCredits) => {
                warn!("🚫 [VERIFIER]: Upstream scraping proxy reports insufficient credits.");
                return VerificationOutcome::api_error(ApiErrorSignal::InsufficientCredits);
            }
            Err(_) => None,
        };

        if let Some(stage) = &primary {
            if stage.scored.name_matched && stage.scored.score >= ACCEPT_THRESHOLD {
                debug!("✅ [VERIFIER]: Primary site accepted at score {}.", stage.scored.score);
                return self.finalize(stage);
            }
        }

        let fallback = match self.call_with_retry(ReverseLookupSite::Fallback, phone, query).await {
            Ok(stage) => Some(stage),
            Err(SiteCallError::InsufficientCredits) => {
                warn!("🚫 [VERIFIER]: Upstream scraping proxy reports insufficient credits (fallback stage).");
                return VerificationOutcome::api_error(ApiErrorSignal::InsufficientCredits);
            }
            Err(_) => None,
        };

        if let Some(stage) = &fallback {
            if stage.scored.name_matched && stage.scored.score >= ACCEPT_THRESHOLD {
                debug!("✅ [VERIFIER]: Fallback site accepted at score {}.", stage.scored.score);
                return self.finalize(stage);
            }
        }

        // Ninguna etapa aceptó: devolver la de mayor puntaje.
        match (primary, fallback) {
            (Some(p), Some(f)) => {
                if f.scored.score > p.scored.score {
                    self.finalize(&f)
                } else {
                    self.finalize(&p)
                }
            }
            (Some(p), None) => self.finalize(&p),
            (None, Some(f)) => self.finalize(&f),
            (None, None) => VerificationOutcome::unverified(VerificationSource::None, 0),
        }
    }

    fn finalize(&self, stage: &StageOutcome) -> VerificationOutcome {
        let (line_kind, carrier) = classify_phone_signal(&stage.profile.raw_text_blob);
        VerificationOutcome {
            verified: stage.scored.name_matched && stage.scored.score >= VERIFIED_THRESHOLD,
            source: stage.source,
            match_score: stage.scored.score,
            phone_type: line_kind.to_phone_type(),
            carrier,
            age: stage.scored.age,
            city: stage.profile.city.clone(),
            state: stage.profile.state.clone(),
            api_error: None,
        }
    }

    async fn call_with_retry(
        &self,
        site: ReverseLookupSite,
        phone: &str,
        query: &VerificationQuery,
    ) -> Result<StageOutcome, SiteCallError> {
        let source = match site {
            ReverseLookupSite::Primary => VerificationSource::Primary,
            ReverseLookupSite::Fallback => VerificationSource::Fallback,
        };

        let mut attempts_remaining = self.config.transport_retry_count + 1;
        loop {
            attempts_remaining -= 1;
            match self.transport.query(site, phone).await {
                Ok(profile) => {
                    let scored = score_profile(&profile, query);
                    return Ok(StageOutcome { scored, profile, source });
                }
                Err(SiteCallError::Transport) if attempts_remaining > 0 => {
                    tokio::time::sleep(Duration::from_millis(self.config.transport_retry_delay_ms)).await;
                    continue;
                }
                Err(other) => return Err(other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct ScriptedTransport {
        primary_responses: Mutex<Vec<Result<ScrapedProfile, SiteCallError>>>,
        fallback_responses: Mutex<Vec<Result<ScrapedProfile, SiteCallError>>>,
        call_count: AtomicU32,
    }

    #[async_trait]
    impl ReverseLookupTransport for ScriptedTransport {
        async fn query(&self, site: ReverseLookupSite, _phone: &str) -> Result<ScrapedProfile, SiteCallError> {
            self.call_count.fetch_add(1, Ordering::Relaxed);
            let mut queue = match site {
                ReverseLookupSite::Primary => self.primary_responses.lock().unwrap(),
                ReverseLookupSite::Fallback => self.fallback_responses.lock().unwrap(),
            };
            queue.pop().unwrap_or(Err(SiteCallError::Other("exhausted".into())))
        }
    }

    fn query() -> VerificationQuery {
        VerificationQuery {
            expected_first_name: "Jane".into(),
            expected_last_name: "Doe".into(),
            min_age: 25,
            max_age: 45,
            expected_state: Some("California".into()),
            expected_city: Some("Oakland".into()),
        }
    }

    fn strong_profile() -> ScrapedProfile {
        ScrapedProfile {
            full_name: Some("Jane Doe".into()),
            age: Some(32),
            state: Some("California".into()),
            city: Some("Oakland".into()),
            raw_text_blob: "Line type: Mobile, Carrier: Verizon".into(),
        }
    }

    #[tokio::test]
    async fn primary_accept_skips_fallback_call() {
        let transport = ScriptedTransport {
            primary_responses: Mutex::new(vec![Ok(strong_profile())]),
            fallback_responses: Mutex::new(vec![]),
            call_count: AtomicU32::new(0),
        };
        let verifier = ReverseLookupVerifier::new(transport, VerifierConfig::default());
        let outcome = verifier.verify("+15555550100", &query()).await;

        assert!(outcome.verified);
        assert_eq!(outcome.source, VerificationSource::Primary);
        assert_eq!(outcome.match_score, 100);
        assert_eq!(verifier.transport.call_count.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn weak_primary_falls_through_to_fallback() {
        let weak_profile = ScrapedProfile {
            full_name: Some("John Smith".into()),
            ..strong_profile()
        };
        let transport = ScriptedTransport {
            primary_responses: Mutex::new(vec![Ok(weak_profile)]),
            fallback_responses: Mutex::new(vec![Ok(strong_profile())]),
            call_count: AtomicU32::new(0),
        };
        let verifier = ReverseLookupVerifier::new(transport, VerifierConfig::default());
        let outcome = verifier.verify("+15555550100", &query()).await;

        assert!(outcome.verified);
        assert_eq!(outcome.source, VerificationSource::Fallback);
    }

    #[tokio::test]
    async fn insufficient_credits_short_circuits_immediately() {
        let transport = ScriptedTransport {
            primary_responses: Mutex::new(vec![Err(SiteCallError::InsufficientCredits)]),
            fallback_responses: Mutex::new(vec![Ok(strong_profile())]),
            call_count: AtomicU32::new(0),
        };
        let verifier = ReverseLookupVerifier::new(transport, VerifierConfig::default());
        let outcome = verifier.verify("+15555550100", &query()).await;

        assert_eq!(outcome.api_error, Some(ApiErrorSignal::InsufficientCredits));
        assert_eq!(verifier.transport.call_count.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn accepted_at_sixty_but_below_verified_threshold_reports_unverified() {
        // Name match (+40) + state match (+20) = 60: clears the stage accept
        // threshold (no fallback call needed) but misses the 70 verified bar.
        let borderline_profile = ScrapedProfile {
            full_name: Some("Jane Doe".into()),
            age: None,
            state: Some("California".into()),
            city: None,
            raw_text_blob: String::new(),
        };
        let transport = ScriptedTransport {
            primary_responses: Mutex::new(vec![Ok(borderline_profile)]),
            fallback_responses: Mutex::new(vec![]),
            call_count: AtomicU32::new(0),
        };
        let verifier = ReverseLookupVerifier::new(transport, VerifierConfig::default());
        let outcome = verifier.verify("+15555550100", &query()).await;

        assert_eq!(outcome.match_score, 60);
        assert!(!outcome.verified);
        assert_eq!(verifier.transport.call_count.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn neither_stage_accepts_returns_higher_scoring() {
        let primary_weak = ScrapedProfile { full_name: Some("Someone Else".into()), ..strong_profile() };
        let fallback_weak = ScrapedProfile {
            full_name: Some("Jane Doe".into()),
            age: Some(90),
            ..strong_profile()
        };
        let transport = ScriptedTransport {
            primary_responses: Mutex::new(vec![Ok(primary_weak)]),
            fallback_responses: Mutex::new(vec![Ok(fallback_weak)]),
            call_count: AtomicU32::new(0),
        };
        let verifier = ReverseLookupVerifier::new(transport, VerifierConfig::default());
        let outcome = verifier.verify("+15555550100", &query()).await;

        assert!(!outcome.verified);
        assert_eq!(outcome.source, VerificationSource::Fallback);
    }
}
