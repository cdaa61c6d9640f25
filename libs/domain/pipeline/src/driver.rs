// [libs/domain/pipeline/src/driver.rs]
/*!
 * =================================================================
 * APARATO: CREDIT-METERED PIPELINE DRIVER (V1.0 - PRODUCTION MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: MÁQUINA DE ESTADOS DE UNA SEARCH TASK, DE PRINCIPIO A FIN
 *
 * VISION HIPER-HOLÍSTICA:
 * Sucesor directo del `OrchestratorKernel` soberano: un único punto de
 * composición que inyecta el libro mayor, la caché, los adaptadores de
 * proveedor y el verificador, y corre las nueve fases de una tarea de
 * principio a fin sin que ninguna de esas dependencias conozca a las
 * demás. Cada fase es una sección de este método; el orden es el único
 * contrato — no hay bifurcaciones ocultas entre fases.
 * =================================================================
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use rand::seq::SliceRandom;
use rand::thread_rng;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use tracer_domain_credit::{CreditLedger, CreditLedgerError};
use tracer_domain_models::{
    ApiErrorSignal, CacheEnvelope, CacheKind, LeadPerson, LogLevel, LogPhase, PhoneStatus,
    SearchCacheData, SearchQueryParams, SearchMode, SearchResult, SearchTask, SearchTaskStatus,
    StatsSnapshot, User, VerificationSource,
};
use tracer_domain_progress::{compute_progress_percent, log_entry, stats_entry, LogEnvelope};
use tracer_domain_verification::VerificationQuery;
use tracer_core_executor::{execute_batched, CreditGate, ExecutorConfig, UnitError};
use tracer_infra_persistence::{CacheRepository, ResultRepository, TaskRepository, UserRepository};

use crate::errors::EngineError;
use crate::fees::{FeeSchedule, CACHE_FULFILLMENT_THRESHOLD, CACHE_TTL_DAYS};
use crate::ports::{EnrichmentProvider, ExactSearchProvider, PhoneVerifier, SearchProvider};
use crate::status::{to_persisted_status, DriverPhase};

/// Entrada pública de `run_task`: lo mínimo que un llamador (el arnés de
/// CLI, una futura capa RPC) necesita proveer — nada de config ambiental.
#[derive(Debug, Clone)]
pub struct SubmitParams {
    pub user_id: Uuid,
    pub query: SearchQueryParams,
    pub enable_verification: bool,
    /// Id y token pre-asignados por el llamador (la fachada de `apps/engine`)
    /// para poder devolver `{taskToken}` al invocante antes de que la
    /// corrida termine, sin esperar a que el driver los genere internamente.
    pub task_id: Uuid,
    pub task_token: String,
}

pub struct PipelineDriver {
    user_repo: Arc<dyn UserRepository>,
    task_repo: Arc<dyn TaskRepository>,
    result_repo: Arc<dyn ResultRepository>,
    cache_repo: Arc<dyn CacheRepository>,
    ledger: Arc<dyn CreditLedger>,
    search_provider: Arc<dyn SearchProvider>,
    enrichment_provider: Arc<dyn EnrichmentProvider>,
    exact_search_provider: Arc<dyn ExactSearchProvider>,
    verifier: Arc<dyn PhoneVerifier>,
    fees: FeeSchedule,
    executor_config: ExecutorConfig,
}

/// Estado mutable acumulado de una corrida, hilo conductor entre fases.
struct RunState {
    task: SearchTask,
    log_envelope: LogEnvelope,
    stats: StatsSnapshot,
    results: Vec<SearchResult>,
    current_step: u32,
}

impl PipelineDriver {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        task_repo: Arc<dyn TaskRepository>,
        result_repo: Arc<dyn ResultRepository>,
        cache_repo: Arc<dyn CacheRepository>,
        ledger: Arc<dyn CreditLedger>,
        search_provider: Arc<dyn SearchProvider>,
        enrichment_provider: Arc<dyn EnrichmentProvider>,
        exact_search_provider: Arc<dyn ExactSearchProvider>,
        verifier: Arc<dyn PhoneVerifier>,
        fees: FeeSchedule,
        executor_config: ExecutorConfig,
    ) -> Self {
        Self {
            user_repo,
            task_repo,
            result_repo,
            cache_repo,
            ledger,
            search_provider,
            enrichment_provider,
            exact_search_provider,
            verifier,
            fees,
            executor_config,
        }
    }

    /// Corre las nueve fases de spec §4.6 para una tarea, de principio a
    /// fin. El `cancel_signal` es observado entre fases y en los límites
    /// de cohorte del ejecutor (C5) — el llamador lo expone a una
    /// operación `cancel` externa.
    #[instrument(skip(self, params, cancel_signal), fields(user_id = %params.user_id))]
    pub async fn run_task(
        &self,
        params: SubmitParams,
        cancel_signal: Arc<AtomicBool>,
    ) -> Result<SearchTask, EngineError> {
        params.query.validate().map_err(EngineError::Validation)?;

        // --- Phase 1: init ---------------------------------------------
        let user = self
            .user_repo
            .get(&params.user_id.to_string())
            .await?
            .ok_or_else(|| EngineError::Validation("user does not exist".to_string()))?;

        if user.credit_balance < self.fees.base_fee {
            return Err(EngineError::InsufficientCredits {
                balance: user.credit_balance,
                required: self.fees.base_fee,
            });
        }

        let fingerprint = params.query.fingerprint();
        let task_id = params.task_id;
        let mut state = RunState {
            task: SearchTask {
                id: task_id.to_string(),
                token: params.task_token.clone(),
                submitter_id: params.user_id.to_string(),
                query_fingerprint: fingerprint.clone(),
                query_params: params.query.clone(),
                requested_count: params.query.requested_count,
                actual_kept_count: 0,
                credits_spent: 0,
                status: SearchTaskStatus::Pending,
                progress_percent: 0,
                logs: Vec::new(),
                error_message: None,
                created_at: Utc::now(),
                completed_at: None,
            },
            log_envelope: LogEnvelope::new(3),
            stats: StatsSnapshot::default(),
            results: Vec::new(),
            current_step: 0,
        };

        self.append_log(&mut state, LogLevel::Info, LogPhase::Init, "task accepted, opening pipeline").await;
        self.task_repo.create(&state.task).await?;

        // --- Phase 2: authorize-base -------------------------------------
        state.task.status = to_persisted_status(DriverPhase::Initializing);
        match self
            .ledger
            .deduct(params.user_id, self.fees.base_fee, kind_search_spend(), "base fee", Some(task_id))
            .await
        {
            Ok(outcome) => {
                state.task.credits_spent += self.fees.base_fee;
                info!("base fee debited, new balance {}", outcome.new_balance);
            }
            Err(CreditLedgerError::InsufficientCredits { .. }) => {
                return self.finalize(state, DriverPhase::InsufficientCredits, "insufficient credits at base fee").await;
            }
            Err(other) => return Err(other.into()),
        }

        // --- Phase 3: acquire-cohort --------------------------------------
        state.task.status = to_persisted_status(DriverPhase::Searching);
        self.append_log(&mut state, LogLevel::Info, LogPhase::Apify, "acquiring cohort").await;

        let people = match self.acquire_cohort(&params, &fingerprint).await? {
            Some(people) => people,
            None => {
                // Exact-search, zero results: base fee refunded.
                if let Err(error) = self
                    .ledger
                    .deduct(params.user_id, -self.fees.base_fee, kind_refund(), "exact-search zero results", Some(task_id))
                    .await
                {
                    warn!("refund of base fee failed: {}", error);
                } else {
                    state.task.credits_spent -= self.fees.base_fee;
                }
                self.append_log(&mut state, LogLevel::Info, LogPhase::Apify, "exact search returned zero results, base fee refunded").await;
                return self.finalize(state, DriverPhase::Completed, "completed with zero results").await;
            }
        };

        if people.is_empty() {
            self.append_log(&mut state, LogLevel::Info, LogPhase::Apify, "provider returned zero results").await;
            return self.finalize(state, DriverPhase::Completed, "completed with zero results").await;
        }

        // --- Phase 4: authorize-cohort --------------------------------------
        state.task.status = to_persisted_status(DriverPhase::Processing);
        let actual = people.len().min(params.query.requested_count as usize);
        let cohort: Vec<LeadPerson> = people.into_iter().take(actual).collect();
        let required = actual as i64 * self.fees.per_record_fee;

        match self
            .ledger
            .deduct(params.user_id, required, kind_search_spend(), "per-record fee", Some(task_id))
            .await
        {
            Ok(_) => state.task.credits_spent += required,
            Err(CreditLedgerError::InsufficientCredits { .. }) => {
                return self.finalize(state, DriverPhase::InsufficientCredits, "insufficient credits at cohort authorize").await;
            }
            Err(other) => return Err(other.into()),
        }
        self.append_log(&mut state, LogLevel::Info, LogPhase::Process, &format!("authorized cohort of {} records", actual)).await;

        // --- Phase 5: partition --------------------------------------------
        let (with_phone, without_phone_results, excluded_no_contact) =
            self.partition(&params, cohort, task_id.to_string()).await;
        state.stats.excluded_no_contact = excluded_no_contact;
        state.results.extend(without_phone_results);

        // --- Phase 6: verify-cohort (withPhone) -----------------------------
        state.task.status = to_persisted_status(DriverPhase::Verifying);
        let verify_outcome = if params.enable_verification && !with_phone.is_empty() {
            self.verify_cohort(&params, with_phone, task_id.to_string(), cancel_signal.clone()).await
        } else {
            VerifyCohortOutcome::default()
        };

        state.stats.excluded_age += verify_outcome.excluded_age;
        state.stats.excluded_error += verify_outcome.excluded_error;
        state.stats.requests += verify_outcome.executor_stats.requests;
        state.stats.failed_requests += verify_outcome.executor_stats.failed_requests;
        state.stats.retry_success += verify_outcome.executor_stats.retry_success;
        state.stats.retry_total += verify_outcome.executor_stats.retry_total;
        state.stats.total_batches += verify_outcome.executor_stats.total_batches;
        state.stats.stopped_due_to_cancel = verify_outcome.executor_stats.stopped_due_to_cancel;

        for result in &verify_outcome.results {
            if result.verified {
                state.stats.results_verified += 1;
            } else {
                state.stats.results_received += 1;
            }
        }
        state.results.extend(verify_outcome.results);

        // --- Phase 7: early-stop handling (exhaustion or cancellation) ------
        // Either cause leaves `unprocessed` cohort records never sent to the
        // verifier — their per-record fee was already authorized in phase 4
        // and must be refunded so `creditsSpent` only reflects work actually
        // attempted (spec §8 scenarios 5 and 6).
        if verify_outcome.unprocessed > 0 && (verify_outcome.api_exhausted || verify_outcome.executor_stats.stopped_due_to_cancel) {
            let refund_amount = verify_outcome.unprocessed as i64 * self.fees.per_record_fee;
            let reason = if verify_outcome.api_exhausted { "system API exhausted" } else { "task cancelled" };
            match self.ledger.deduct(params.user_id, -refund_amount, kind_refund(), reason, Some(task_id)).await {
                Ok(_) => state.task.credits_spent -= refund_amount,
                Err(error) => warn!("refund of unprocessed records failed: {}", error),
            }
        }

        if verify_outcome.api_exhausted {
            self.append_log(
                &mut state,
                LogLevel::Error,
                LogPhase::Verify,
                "system API exhausted — operator attention required",
            )
            .await;

            // --- Phase 8: persist (partial) ---------------------------------
            self.persist_results(&mut state).await?;
            return self.finalize(state, DriverPhase::Stopped, "stopped: upstream verification account depleted").await;
        }

        if verify_outcome.executor_stats.stopped_due_to_cancel {
            self.append_log(&mut state, LogLevel::Warning, LogPhase::Verify, "cancellation observed at cohort boundary").await;
            self.persist_results(&mut state).await?;
            return self.finalize(state, DriverPhase::Stopped, "stopped: user cancelled").await;
        }

        // --- Phase 8: persist ------------------------------------------------
        self.persist_results(&mut state).await?;

        // --- Phase 9: finalize -------------------------------------------
        self.finalize(state, DriverPhase::Completed, "completed").await
    }

    /// Fase 3: consulta caché con disciplina de fulfillment-ratio o invoca
    /// el adaptador correspondiente. `Ok(None)` señala el caso especial
    /// "exact-search, cero resultados" (requiere reembolso de base fee en
    /// el llamador). `Ok(Some(vec![]))` es el caso general sin reembolso.
    async fn acquire_cohort(
        &self,
        params: &SubmitParams,
        fingerprint: &str,
    ) -> Result<Option<Vec<LeadPerson>>, EngineError> {
        if params.query.mode == SearchMode::Exact {
            let outcome = self
                .exact_search_provider
                .exact_search(
                    &params.query.name,
                    params.query.title.as_deref(),
                    params.query.state.as_deref(),
                    params.query.requested_count,
                )
                .await
                .map_err(|error| EngineError::Unknown(error.to_string()))?;

            if outcome.people.is_empty() {
                return Ok(None);
            }
            return Ok(Some(outcome.people));
        }

        let cache_key = format!("apify:{}", fingerprint);
        if let Some(envelope) = self.cache_repo.get(&cache_key).await? {
            if !envelope.is_expired(Utc::now()) {
                if let Ok(cached) = serde_json::from_str::<SearchCacheData>(&envelope.payload_json) {
                    if cached.fulfillment_ratio() >= CACHE_FULFILLMENT_THRESHOLD {
                        let _ = self.cache_repo.increment_hit(&cache_key).await;
                        let mut data = cached.data;
                        data.shuffle(&mut thread_rng());
                        data.truncate(params.query.requested_count as usize);
                        return Ok(Some(data));
                    }
                }
            }
        }

        let outcome = self
            .search_provider
            .search(
                &params.query.name,
                params.query.title.as_deref(),
                params.query.state.as_deref(),
                params.query.requested_count,
                params.user_id,
            )
            .await
            .map_err(|error| EngineError::Unknown(error.to_string()))?;

        let cache_payload = SearchCacheData {
            data: outcome.people.clone(),
            total_available: outcome.total_count.unwrap_or(outcome.people.len() as u32),
            requested_count: params.query.requested_count,
            search_params_fingerprint: fingerprint.to_string(),
            created_at: Utc::now(),
        };
        if let Ok(payload_json) = serde_json::to_string(&cache_payload) {
            let _ = self
                .cache_repo
                .put(CacheEnvelope {
                    key: cache_key,
                    kind: CacheKind::Search,
                    payload_json,
                    hit_count: 0,
                    expires_at: Utc::now() + ChronoDuration::days(CACHE_TTL_DAYS),
                })
                .await;
        }

        Ok(Some(outcome.people))
    }

    /// Fase 5: baraja la cohorte y separa por contactabilidad. Los
    /// registros sin teléfono reciben un intento de enriquecimiento antes
    /// de caer a `phoneStatus=no-phone` (si hay email) o ser descartados.
    async fn partition(
        &self,
        params: &SubmitParams,
        mut cohort: Vec<LeadPerson>,
        task_id: String,
    ) -> (Vec<LeadPerson>, Vec<SearchResult>, u32) {
        cohort.shuffle(&mut thread_rng());

        let mut with_phone = Vec::new();
        let mut no_phone_results = Vec::new();
        let mut excluded_no_contact = 0u32;

        for person in cohort {
            if person.has_phone() {
                with_phone.push(person);
                continue;
            }

            let enriched = self.enrichment_provider.enrich(&person.id, params.user_id).await.ok().flatten();
            if let Some(enriched) = enriched {
                if enriched.has_phone() {
                    with_phone.push(enriched);
                    continue;
                }
                if enriched.has_email() || person.has_email() {
                    no_phone_results.push(no_phone_result(&person, &task_id));
                    continue;
                }
            } else if person.has_email() {
                no_phone_results.push(no_phone_result(&person, &task_id));
                continue;
            }

            excluded_no_contact += 1;
        }

        (with_phone, no_phone_results, excluded_no_contact)
    }

    /// Fase 6: somete la cohorte con teléfono al ejecutor por cohortes
    /// (C5), llamando al verificador (C4) por unidad. La señal de
    /// agotamiento de crédito del SISTEMA se captura vía una bandera
    /// compartida consultada por la compuerta de crédito del ejecutor —
    /// una vez levantada, ningún cohorte subsiguiente se despacha.
    async fn verify_cohort(
        &self,
        params: &SubmitParams,
        with_phone: Vec<LeadPerson>,
        task_id: String,
        cancel_signal: Arc<AtomicBool>,
    ) -> VerifyCohortOutcome {
        let cohort_size = with_phone.len();
        let api_exhausted = Arc::new(AtomicBool::new(false));
        let age_min = params.query.age_min;
        let age_max = params.query.age_max;
        let verifier = self.verifier.clone();

        let flag_for_gate = api_exhausted.clone();
        let credit_gate: CreditGate = Arc::new(move |_n: usize| {
            let flag = flag_for_gate.clone();
            Box::pin(async move { !flag.load(Ordering::Relaxed) })
        });

        let flag_for_unit = api_exhausted.clone();
        let report = execute_batched(
            with_phone,
            move |person: LeadPerson| {
                let verifier = verifier.clone();
                let flag = flag_for_unit.clone();
                async move {
                    let phone = person.preferred_phone().expect("partition only admits records with a phone").sanitized.clone();
                    let query = VerificationQuery {
                        expected_first_name: person.first_name.clone(),
                        expected_last_name: person.last_name.clone(),
                        min_age: age_min.unwrap_or(0),
                        max_age: age_max.unwrap_or(130),
                        expected_state: person.state.clone(),
                        expected_city: person.city.clone(),
                    };
                    let outcome = verifier.verify(&phone, &query).await;
                    if outcome.api_error == Some(ApiErrorSignal::InsufficientCredits) {
                        flag.store(true, Ordering::Relaxed);
                    }
                    Ok::<_, UnitError>((person, outcome))
                }
            },
            self.executor_config,
            cancel_signal,
            credit_gate,
        )
        .await;

        let dispatched = report.successes.len() + report.failures.len();

        let mut outcome = VerifyCohortOutcome {
            api_exhausted: api_exhausted.load(Ordering::Relaxed),
            executor_stats: report.stats.clone(),
            ..Default::default()
        };

        for (person, verification) in report.successes {
            if verification.api_error.is_some() {
                continue;
            }
            if let Some(min) = age_min {
                if let Some(age) = verification.age {
                    if age < min {
                        outcome.excluded_age += 1;
                        continue;
                    }
                }
            }
            if let Some(max) = age_max {
                if let Some(age) = verification.age {
                    if age > max {
                        outcome.excluded_age += 1;
                        continue;
                    }
                }
            }
            outcome.results.push(verified_result(&person, &verification, &task_id));
        }

        outcome.excluded_error += report.failures.len() as u32;

        // Units neither in `successes` nor `failures` were never dispatched —
        // the credit gate or a cancellation halted the main pass before
        // reaching them (spec §4.5 "in-flight completes, the rest doesn't").
        outcome.unprocessed = (cohort_size as u32).saturating_sub(dispatched as u32);

        outcome
    }

    async fn persist_results(&self, state: &mut RunState) -> Result<(), EngineError> {
        if !state.results.is_empty() {
            self.result_repo.insert_many(&state.results).await?;
            for result in &state.results {
                let _ = self
                    .cache_repo
                    .put(CacheEnvelope {
                        key: format!("person:{}", result.id),
                        kind: CacheKind::Person,
                        payload_json: serde_json::to_string(result).unwrap_or_default(),
                        hit_count: 0,
                        expires_at: Utc::now() + ChronoDuration::days(CACHE_TTL_DAYS),
                    })
                    .await;
            }
        }
        state.stats.total_results = state.results.len() as u32;
        state.task.actual_kept_count = state.results.len() as u32;
        Ok(())
    }

    async fn finalize(
        &self,
        mut state: RunState,
        phase: DriverPhase,
        message: &str,
    ) -> Result<SearchTask, EngineError> {
        let now = Utc::now();
        state.task.try_finalize(to_persisted_status(phase), now);
        self.append_log(&mut state, LogLevel::Info, LogPhase::Complete, message).await;
        let entry = stats_entry(&state.stats);
        state.log_envelope.append(entry);
        state.task.logs = state.log_envelope.entries().to_vec();
        self.task_repo.save_progress(&state.task).await?;
        Ok(state.task)
    }

    async fn append_log(&self, state: &mut RunState, level: LogLevel, phase: LogPhase, message: &str) {
        state.current_step += 1;
        let total = state.task.requested_count;
        let entry = log_entry(level, phase, message.to_string(), Some(state.current_step), Some(total));
        let should_flush = state.log_envelope.append(entry);
        state.task.progress_percent = compute_progress_percent(state.current_step, total);
        state.task.logs = state.log_envelope.entries().to_vec();
        if should_flush {
            if let Err(error) = self.task_repo.save_progress(&state.task).await {
                warn!("progress flush failed: {}", error);
            }
        }
    }
}

#[derive(Default)]
struct VerifyCohortOutcome {
    results: Vec<SearchResult>,
    excluded_age: u32,
    excluded_error: u32,
    unprocessed: u32,
    api_exhausted: bool,
    executor_stats: tracer_core_executor::ExecutorStats,
}

fn kind_search_spend() -> tracer_domain_models::CreditJournalEntryKind {
    tracer_domain_models::CreditJournalEntryKind::SearchSpend
}

fn kind_refund() -> tracer_domain_models::CreditJournalEntryKind {
    tracer_domain_models::CreditJournalEntryKind::Refund
}

fn no_phone_result(person: &LeadPerson, task_id: &str) -> SearchResult {
    SearchResult {
        id: Uuid::new_v4().to_string(),
        task_id: task_id.to_string(),
        first_name: person.first_name.clone(),
        last_name: person.last_name.clone(),
        title: person.title.clone(),
        company: person.organization_name.clone(),
        city: person.city.clone(),
        state: person.state.clone(),
        country: person.country.clone(),
        email: person.email.clone(),
        phone: None,
        phone_type: None,
        phone_status: PhoneStatus::NoPhone,
        linkedin_url: person.linkedin_url.clone(),
        age: None,
        carrier: None,
        verified: false,
        verification_score: 0,
        verification_source: verification_source_tag(VerificationSource::None).to_string(),
        data_source: person.source.clone(),
        created_at: Utc::now(),
    }
}

fn verified_result(
    person: &LeadPerson,
    outcome: &tracer_domain_models::VerificationOutcome,
    task_id: &str,
) -> SearchResult {
    let phone = person.preferred_phone();
    SearchResult {
        id: Uuid::new_v4().to_string(),
        task_id: task_id.to_string(),
        first_name: person.first_name.clone(),
        last_name: person.last_name.clone(),
        title: person.title.clone(),
        company: person.organization_name.clone(),
        city: outcome.city.clone().or_else(|| person.city.clone()),
        state: outcome.state.clone().or_else(|| person.state.clone()),
        country: person.country.clone(),
        email: person.email.clone(),
        phone: phone.map(|p| p.sanitized.clone()),
        phone_type: outcome.phone_type.or_else(|| phone.map(|p| p.phone_type)),
        phone_status: if outcome.verified { PhoneStatus::Verified } else { PhoneStatus::Received },
        linkedin_url: person.linkedin_url.clone(),
        age: outcome.age,
        carrier: outcome.carrier.clone(),
        verified: outcome.verified,
        verification_score: outcome.match_score,
        verification_source: verification_source_tag(outcome.source).to_string(),
        data_source: person.source.clone(),
        created_at: Utc::now(),
    }
}

fn verification_source_tag(source: VerificationSource) -> &'static str {
    match source {
        VerificationSource::Primary => "primary",
        VerificationSource::Fallback => "fallback",
        VerificationSource::None => "none",
    }
}
