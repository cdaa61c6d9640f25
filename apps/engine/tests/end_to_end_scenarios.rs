// [apps/engine/tests/end_to_end_scenarios.rs]
/*!
 * =================================================================
 * APARATO: END-TO-END SCENARIO CERTIFICATION (ESTRATO L4 - APPLICATION)
 * RESPONSABILIDAD: LOS SEIS ESCENARIOS DE CERTIFICACIÓN DE EXTREMO A EXTREMO
 *
 * VISION HIPER-HOLÍSTICA:
 * Dobles en memoria de cada puerto (repositorios, libro mayor, proveedores,
 * verificador) conducen `PipelineDriver::run_task()` de principio a fin sin
 * tocar una base real. Cinco escenarios corren contra el driver completo;
 * el escenario de agotamiento de tasa del proveedor (reintento inmediato +
 * pase diferido) se certifica directamente contra `execute_batched` (C5),
 * porque `verify_cohort` nunca construye un `Err` para el ejecutor — el
 * verificador devuelve un veredicto plano, nunca un `Result` — así que esa
 * ruta de reintento no es alcanzable a través del driver completo.
 * =================================================================
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use tracer_core_executor::{execute_batched, CreditGate, ExecutorConfig, UnitError};
use tracer_domain_credit::{CreditLedger, CreditLedgerError, DeductOutcome, SettleOutcome};
use tracer_domain_models::{
    CacheEnvelope, CacheKind, CreditJournalEntryKind, LeadPerson, LeadPhone, PhoneType,
    SearchCacheData, SearchMode, SearchQueryParams, SearchResult, SearchTask, SearchTaskStatus,
    User, UserStatus,
};
use tracer_domain_pipeline::{
    EnrichmentProvider, ExactSearchProvider, FeeSchedule, PhoneVerifier, PipelineDriver,
    SearchProvider, SubmitParams,
};
use tracer_domain_progress::extract_stats;
use tracer_domain_verification::VerificationQuery;
use tracer_infra_persistence::{
    CacheRepository, InMemoryCacheRepository, PersistenceError, ResultRepository, TaskRepository,
    UserRepository,
};
use tracer_infra_providers::{ClientError, SearchOutcome};

// ---------------------------------------------------------------------
// In-memory port doubles
// ---------------------------------------------------------------------

struct FakeUserRepo {
    users: Mutex<HashMap<String, User>>,
}

impl FakeUserRepo {
    fn seeded(user_id: Uuid, balance: i64) -> Self {
        let mut users = HashMap::new();
        users.insert(
            user_id.to_string(),
            User { id: user_id.to_string(), credit_balance: balance, status: UserStatus::Active },
        );
        Self { users: Mutex::new(users) }
    }
}

#[async_trait]
impl UserRepository for FakeUserRepo {
    async fn get(&self, user_id: &str) -> Result<Option<User>, PersistenceError> {
        Ok(self.users.lock().unwrap().get(user_id).cloned())
    }

    async fn ensure_exists(&self, user_id: &str, initial_balance: i64) -> Result<(), PersistenceError> {
        self.users.lock().unwrap().entry(user_id.to_string()).or_insert(User {
            id: user_id.to_string(),
            credit_balance: initial_balance,
            status: UserStatus::Active,
        });
        Ok(())
    }
}

#[derive(Default)]
struct FakeTaskRepo {
    tasks: Mutex<HashMap<String, SearchTask>>,
}

#[async_trait]
impl TaskRepository for FakeTaskRepo {
    async fn create(&self, task: &SearchTask) -> Result<(), PersistenceError> {
        self.tasks.lock().unwrap().insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn get(&self, task_id: &str) -> Result<Option<SearchTask>, PersistenceError> {
        Ok(self.tasks.lock().unwrap().get(task_id).cloned())
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<SearchTask>, PersistenceError> {
        Ok(self.tasks.lock().unwrap().values().find(|task| task.token == token).cloned())
    }

    async fn list(&self, submitter_id: &str) -> Result<Vec<SearchTask>, PersistenceError> {
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .values()
            .filter(|task| task.submitter_id == submitter_id)
            .cloned()
            .collect())
    }

    async fn save_progress(&self, task: &SearchTask) -> Result<(), PersistenceError> {
        self.tasks.lock().unwrap().insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn cancel(&self, task_id: &str) -> Result<bool, PersistenceError> {
        let mut tasks = self.tasks.lock().unwrap();
        if let Some(task) = tasks.get_mut(task_id) {
            if !task.status.is_terminal() {
                task.status = SearchTaskStatus::Stopped;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[derive(Default)]
struct FakeResultRepo {
    by_task: Mutex<HashMap<String, Vec<SearchResult>>>,
}

#[async_trait]
impl ResultRepository for FakeResultRepo {
    async fn insert_many(&self, results: &[SearchResult]) -> Result<(), PersistenceError> {
        let mut by_task = self.by_task.lock().unwrap();
        for result in results {
            by_task.entry(result.task_id.clone()).or_default().push(result.clone());
        }
        Ok(())
    }

    async fn list_for_task(&self, task_id: &str) -> Result<Vec<SearchResult>, PersistenceError> {
        Ok(self.by_task.lock().unwrap().get(task_id).cloned().unwrap_or_default())
    }
}

/// Libro mayor de prueba: un balance en memoria por usuario, suficiente
/// para certificar los invariantes de débito/reembolso del driver sin
/// abrir una conexión `libsql`.
#[derive(Default)]
struct FakeLedger {
    balances: Mutex<HashMap<Uuid, i64>>,
}

impl FakeLedger {
    fn seeded(user_id: Uuid, balance: i64) -> Self {
        let mut balances = HashMap::new();
        balances.insert(user_id, balance);
        Self { balances: Mutex::new(balances) }
    }
}

#[async_trait]
impl CreditLedger for FakeLedger {
    async fn deduct(
        &self,
        user_id: Uuid,
        amount: i64,
        _kind: CreditJournalEntryKind,
        _description: &str,
        _related_task_id: Option<Uuid>,
    ) -> Result<DeductOutcome, CreditLedgerError> {
        let mut balances = self.balances.lock().unwrap();
        let balance = balances.entry(user_id).or_insert(0);
        if amount > 0 && *balance < amount {
            return Err(CreditLedgerError::InsufficientCredits { user_id, balance: *balance, required: amount });
        }
        *balance -= amount;
        Ok(DeductOutcome { new_balance: *balance })
    }

    async fn settle(
        &self,
        user_id: Uuid,
        frozen: i64,
        actual_spent: i64,
        _related_task_id: Uuid,
    ) -> Result<SettleOutcome, CreditLedgerError> {
        let delta = tracer_domain_credit::compute_settlement_delta(frozen, actual_spent);
        let mut balances = self.balances.lock().unwrap();
        let balance = balances.entry(user_id).or_insert(0);
        *balance += delta;
        Ok(SettleOutcome { refunded: delta, new_balance: *balance })
    }

    async fn balance(&self, user_id: Uuid) -> Result<i64, CreditLedgerError> {
        Ok(*self.balances.lock().unwrap().get(&user_id).unwrap_or(&0))
    }
}

/// Adaptador de búsqueda masiva de prueba: siempre devuelve el mismo
/// lote scripteado, sin red.
struct FakeSearchProvider {
    outcome: SearchOutcome,
}

#[async_trait]
impl SearchProvider for FakeSearchProvider {
    async fn search(
        &self,
        _name: &str,
        _title: Option<&str>,
        _state: Option<&str>,
        _limit: u32,
        _user_id: Uuid,
    ) -> Result<SearchOutcome, ClientError> {
        Ok(self.outcome.clone())
    }
}

struct FakeExactSearchProvider {
    outcome: SearchOutcome,
}

#[async_trait]
impl ExactSearchProvider for FakeExactSearchProvider {
    async fn exact_search(
        &self,
        _name: &str,
        _title: Option<&str>,
        _state: Option<&str>,
        _limit: u32,
    ) -> Result<SearchOutcome, ClientError> {
        Ok(self.outcome.clone())
    }
}

/// Nunca se ejercita en estos escenarios (toda la cohorte llega con
/// teléfono), pero el driver la invoca incondicionalmente en `partition`
/// para cualquier registro sin teléfono.
struct NeverEnriches;

#[async_trait]
impl EnrichmentProvider for NeverEnriches {
    async fn enrich(&self, _provider_id: &str, _user_id: Uuid) -> Result<Option<LeadPerson>, ClientError> {
        Ok(None)
    }
}

/// Verificador de prueba: decide por orden de llamada global (no por
/// identidad de la unidad), lo que lo hace inmune al barajado aleatorio
/// que `partition`/`acquire_cohort` aplican a la cohorte antes de
/// someterla al ejecutor.
struct ScriptedVerifier {
    call_count: AtomicUsize,
    /// Índice de llamada (0-based) a partir del cual el verificador
    /// reporta agotamiento de crédito del sistema upstream.
    fail_from_call: usize,
    /// Si está presente, levanta esta bandera tras la N-ésima llamada —
    /// simula una cancelación de usuario disparada a mitad de cohorte.
    raise_after_call: Option<(usize, Arc<AtomicBool>)>,
}

impl ScriptedVerifier {
    fn always_verified() -> Self {
        Self { call_count: AtomicUsize::new(0), fail_from_call: usize::MAX, raise_after_call: None }
    }

    fn exhausts_after(n: usize) -> Self {
        Self { call_count: AtomicUsize::new(0), fail_from_call: n, raise_after_call: None }
    }

    fn cancels_after(n: usize, flag: Arc<AtomicBool>) -> Self {
        Self { call_count: AtomicUsize::new(0), fail_from_call: usize::MAX, raise_after_call: Some((n, flag)) }
    }
}

#[async_trait]
impl PhoneVerifier for ScriptedVerifier {
    async fn verify(&self, _phone: &str, _query: &VerificationQuery) -> tracer_domain_models::VerificationOutcome {
        let index = self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some((threshold, flag)) = &self.raise_after_call {
            if index + 1 == *threshold {
                flag.store(true, Ordering::SeqCst);
            }
        }

        if index >= self.fail_from_call {
            return tracer_domain_models::VerificationOutcome::api_error(
                tracer_domain_models::ApiErrorSignal::InsufficientCredits,
            );
        }

        tracer_domain_models::VerificationOutcome {
            verified: true,
            source: tracer_domain_models::VerificationSource::Primary,
            match_score: 85,
            phone_type: Some(PhoneType::Mobile),
            carrier: Some("Verizon".to_string()),
            age: Some(34),
            city: None,
            state: None,
            api_error: None,
        }
    }
}

// ---------------------------------------------------------------------
// Fixture builders
// ---------------------------------------------------------------------

fn zero_delay_executor_config(batch_size: usize) -> ExecutorConfig {
    ExecutorConfig {
        batch_size,
        batch_delay_ms: 0,
        retry_base_ms: 0,
        deferred_retry_delay_ms: 0,
        deferred_batch_size: batch_size,
        deferred_batch_delay_ms: 0,
    }
}

fn person_with_phone(tag: &str) -> LeadPerson {
    LeadPerson {
        id: format!("prov-{tag}"),
        first_name: "Jane".to_string(),
        last_name: format!("Doe-{tag}"),
        full_name: format!("Jane Doe-{tag}"),
        title: None,
        email: Some(format!("jane.{tag}@example.com")),
        phones: vec![LeadPhone {
            raw: "(512) 555-0100".to_string(),
            sanitized: "5125550100".to_string(),
            phone_type: PhoneType::Mobile,
            position: 0,
        }],
        linkedin_url: None,
        city: Some("Austin".to_string()),
        state: Some("TX".to_string()),
        country: Some("US".to_string()),
        organization_name: None,
        source: "apify".to_string(),
    }
}

fn people_with_phone(n: usize) -> Vec<LeadPerson> {
    (0..n).map(|i| person_with_phone(&i.to_string())).collect()
}

fn base_query(requested_count: u32, mode: SearchMode) -> SearchQueryParams {
    SearchQueryParams {
        name: "Jane Doe".to_string(),
        title: None,
        state: Some("TX".to_string()),
        city: None,
        requested_count,
        age_min: None,
        age_max: None,
        mode,
    }
}

fn submit_params(user_id: Uuid, query: SearchQueryParams, enable_verification: bool) -> SubmitParams {
    SubmitParams {
        user_id,
        query,
        enable_verification,
        task_id: Uuid::new_v4(),
        task_token: Uuid::new_v4().to_string(),
    }
}

// ---------------------------------------------------------------------
// Scenario 1: cache hit, full cohort, all verified
// ---------------------------------------------------------------------

#[tokio::test]
async fn scenario_1_cache_hit_full_cohort_all_verified() {
    let user_id = Uuid::new_v4();
    let fees = FeeSchedule { base_fee: 1, per_record_fee: 2 };
    let query = base_query(50, SearchMode::Fuzzy);
    let fingerprint = query.fingerprint();

    let user_repo = Arc::new(FakeUserRepo::seeded(user_id, 1000));
    let task_repo = Arc::new(FakeTaskRepo::default());
    let result_repo = Arc::new(FakeResultRepo::default());
    let cache_repo = Arc::new(InMemoryCacheRepository::new());
    let ledger = Arc::new(FakeLedger::seeded(user_id, 1000));

    let cached = SearchCacheData {
        data: people_with_phone(50),
        total_available: 60,
        requested_count: 50,
        search_params_fingerprint: fingerprint.clone(),
        created_at: Utc::now(),
    };
    cache_repo
        .put(CacheEnvelope {
            key: format!("apify:{fingerprint}"),
            kind: CacheKind::Search,
            payload_json: serde_json::to_string(&cached).unwrap(),
            hit_count: 0,
            expires_at: Utc::now() + chrono::Duration::days(1),
        })
        .await
        .unwrap();

    let driver = PipelineDriver::new(
        user_repo.clone(),
        task_repo.clone(),
        result_repo.clone(),
        cache_repo.clone(),
        ledger.clone(),
        Arc::new(FakeSearchProvider { outcome: SearchOutcome { success: true, people: vec![], total_count: None, error_message: None } }),
        Arc::new(NeverEnriches),
        Arc::new(FakeExactSearchProvider { outcome: SearchOutcome { success: true, people: vec![], total_count: None, error_message: None } }),
        Arc::new(ScriptedVerifier::always_verified()),
        fees,
        zero_delay_executor_config(50),
    );

    let params = submit_params(user_id, query, true);
    let task = driver.run_task(params, Arc::new(AtomicBool::new(false))).await.expect("task run must succeed");

    assert_eq!(task.status, SearchTaskStatus::Completed);
    assert_eq!(task.credits_spent, 101); // 1 base + 50 * 2
    assert_eq!(task.actual_kept_count, 50);
    assert_eq!(ledger.balance(user_id).await.unwrap(), 899);

    let results = result_repo.list_for_task(&task.id).await.unwrap();
    assert_eq!(results.len(), 50);
    assert!(results.iter().all(|r| r.verified));

    let stats = extract_stats(&task.logs).expect("final stats entry must be present");
    assert_eq!(stats.total_results, 50);
    assert_eq!(stats.results_verified, 50);
}

// ---------------------------------------------------------------------
// Scenario 2: exact-search returns zero results, base fee refunded
// ---------------------------------------------------------------------

#[tokio::test]
async fn scenario_2_exact_search_zero_results_refunds_base_fee() {
    let user_id = Uuid::new_v4();
    let fees = FeeSchedule { base_fee: 5, per_record_fee: 10 };
    let query = base_query(20, SearchMode::Exact);

    let user_repo = Arc::new(FakeUserRepo::seeded(user_id, 500));
    let task_repo = Arc::new(FakeTaskRepo::default());
    let result_repo = Arc::new(FakeResultRepo::default());
    let cache_repo = Arc::new(InMemoryCacheRepository::new());
    let ledger = Arc::new(FakeLedger::seeded(user_id, 500));

    let driver = PipelineDriver::new(
        user_repo.clone(),
        task_repo.clone(),
        result_repo.clone(),
        cache_repo.clone(),
        ledger.clone(),
        Arc::new(FakeSearchProvider { outcome: SearchOutcome { success: true, people: vec![], total_count: None, error_message: None } }),
        Arc::new(NeverEnriches),
        Arc::new(FakeExactSearchProvider { outcome: SearchOutcome { success: true, people: vec![], total_count: Some(0), error_message: None } }),
        Arc::new(ScriptedVerifier::always_verified()),
        fees,
        zero_delay_executor_config(10),
    );

    let params = submit_params(user_id, query, true);
    let task = driver.run_task(params, Arc::new(AtomicBool::new(false))).await.expect("task run must succeed");

    assert_eq!(task.status, SearchTaskStatus::Completed);
    assert_eq!(task.credits_spent, 0); // base fee charged then fully refunded
    assert_eq!(task.actual_kept_count, 0);
    assert_eq!(ledger.balance(user_id).await.unwrap(), 500);
    assert!(result_repo.list_for_task(&task.id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------
// Scenario 3: mid-task credit starvation at cohort authorize
// ---------------------------------------------------------------------

#[tokio::test]
async fn scenario_3_mid_task_credit_starvation_at_cohort_authorize() {
    let user_id = Uuid::new_v4();
    let fees = FeeSchedule { base_fee: 1, per_record_fee: 2 };
    let query = base_query(100, SearchMode::Fuzzy);

    let user_repo = Arc::new(FakeUserRepo::seeded(user_id, 101));
    let task_repo = Arc::new(FakeTaskRepo::default());
    let result_repo = Arc::new(FakeResultRepo::default());
    let cache_repo = Arc::new(InMemoryCacheRepository::new());
    let ledger = Arc::new(FakeLedger::seeded(user_id, 101));

    let driver = PipelineDriver::new(
        user_repo.clone(),
        task_repo.clone(),
        result_repo.clone(),
        cache_repo.clone(),
        ledger.clone(),
        Arc::new(FakeSearchProvider {
            outcome: SearchOutcome { success: true, people: people_with_phone(100), total_count: Some(100), error_message: None },
        }),
        Arc::new(NeverEnriches),
        Arc::new(FakeExactSearchProvider { outcome: SearchOutcome { success: true, people: vec![], total_count: None, error_message: None } }),
        Arc::new(ScriptedVerifier::always_verified()),
        fees,
        zero_delay_executor_config(25),
    );

    let params = submit_params(user_id, query, true);
    let task = driver.run_task(params, Arc::new(AtomicBool::new(false))).await.expect("task run must succeed");

    assert_eq!(task.status, SearchTaskStatus::InsufficientCredits);
    assert_eq!(task.credits_spent, 1); // only the base fee was ever debited
    assert_eq!(ledger.balance(user_id).await.unwrap(), 100);
    assert!(result_repo.list_for_task(&task.id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------
// Scenario 4: provider rate-limits part of a batch, all recover on the
// deferred pass — certified directly against the executor (C5), since
// `verify_cohort`'s unit closure always resolves `Ok` and can never
// surface a `UnitError` through the driver (see module doc comment).
// ---------------------------------------------------------------------

#[tokio::test]
async fn scenario_4_rate_limited_units_recover_on_deferred_pass() {
    let attempts: Arc<Mutex<HashMap<u32, u32>>> = Arc::new(Mutex::new(HashMap::new()));
    let attempts_clone = attempts.clone();

    // Units 20..30 are rate-limited twice (initial attempt + the one
    // immediate retry the main pass grants) before succeeding on the
    // deferred pass; units 0..20 succeed outright.
    let report = execute_batched(
        (0..30u32).collect(),
        move |unit: u32| {
            let attempts = attempts_clone.clone();
            async move {
                if unit < 20 {
                    return Ok::<u32, UnitError>(unit);
                }
                let mut map = attempts.lock().unwrap();
                let count = map.entry(unit).or_insert(0);
                *count += 1;
                if *count <= 2 {
                    Err(UnitError::RateLimitError)
                } else {
                    Ok(unit)
                }
            }
        },
        zero_delay_executor_config(30),
        Arc::new(AtomicBool::new(false)),
        Arc::new(|_n: usize| Box::pin(async { true })) as CreditGate,
    )
    .await;

    assert_eq!(report.successes.len(), 30);
    assert!(report.failures.is_empty());
    assert_eq!(report.stats.requests, 30);
    assert_eq!(report.stats.failed_requests, 0);
    assert_eq!(report.stats.retry_total, 10);
    assert_eq!(report.stats.retry_success, 10);
}

// ---------------------------------------------------------------------
// Scenario 5: system API credits exhausted mid-verification
// ---------------------------------------------------------------------

#[tokio::test]
async fn scenario_5_system_api_exhausted_during_verification() {
    let user_id = Uuid::new_v4();
    let fees = FeeSchedule { base_fee: 1, per_record_fee: 2 };
    let query = base_query(30, SearchMode::Fuzzy);

    let user_repo = Arc::new(FakeUserRepo::seeded(user_id, 1000));
    let task_repo = Arc::new(FakeTaskRepo::default());
    let result_repo = Arc::new(FakeResultRepo::default());
    let cache_repo = Arc::new(InMemoryCacheRepository::new());
    let ledger = Arc::new(FakeLedger::seeded(user_id, 1000));

    let driver = PipelineDriver::new(
        user_repo.clone(),
        task_repo.clone(),
        result_repo.clone(),
        cache_repo.clone(),
        ledger.clone(),
        Arc::new(FakeSearchProvider {
            outcome: SearchOutcome { success: true, people: people_with_phone(30), total_count: Some(30), error_message: None },
        }),
        Arc::new(NeverEnriches),
        Arc::new(FakeExactSearchProvider { outcome: SearchOutcome { success: true, people: vec![], total_count: None, error_message: None } }),
        // First 12 verify calls succeed; the 13th (and every call after)
        // reports the upstream account depleted. With a cohort (batch)
        // size of 13, the remaining 17 records are never dispatched.
        Arc::new(ScriptedVerifier::exhausts_after(12)),
        fees,
        zero_delay_executor_config(13),
    );

    let params = submit_params(user_id, query, true);
    let task = driver.run_task(params, Arc::new(AtomicBool::new(false))).await.expect("task run must succeed");

    assert_eq!(task.status, SearchTaskStatus::Stopped);
    assert_eq!(task.credits_spent, 27); // 1 base + 60 cohort authorize - 34 refund
    assert_eq!(ledger.balance(user_id).await.unwrap(), 973);

    let results = result_repo.list_for_task(&task.id).await.unwrap();
    assert_eq!(results.len(), 12);
    assert!(results.iter().all(|r| r.verified));

    let has_exhaustion_log = task
        .logs
        .iter()
        .any(|entry| entry.message.contains("system API exhausted"));
    assert!(has_exhaustion_log);
}

// ---------------------------------------------------------------------
// Scenario 6: user cancellation mid-verification
// ---------------------------------------------------------------------

#[tokio::test]
async fn scenario_6_user_cancel_mid_verification() {
    let user_id = Uuid::new_v4();
    let fees = FeeSchedule { base_fee: 2, per_record_fee: 2 };
    let query = base_query(200, SearchMode::Fuzzy);

    let user_repo = Arc::new(FakeUserRepo::seeded(user_id, 10_000));
    let task_repo = Arc::new(FakeTaskRepo::default());
    let result_repo = Arc::new(FakeResultRepo::default());
    let cache_repo = Arc::new(InMemoryCacheRepository::new());
    let ledger = Arc::new(FakeLedger::seeded(user_id, 10_000));
    let cancel_signal = Arc::new(AtomicBool::new(false));

    let driver = PipelineDriver::new(
        user_repo.clone(),
        task_repo.clone(),
        result_repo.clone(),
        cache_repo.clone(),
        ledger.clone(),
        Arc::new(FakeSearchProvider {
            outcome: SearchOutcome { success: true, people: people_with_phone(200), total_count: Some(200), error_message: None },
        }),
        Arc::new(NeverEnriches),
        Arc::new(FakeExactSearchProvider { outcome: SearchOutcome { success: true, people: vec![], total_count: None, error_message: None } }),
        // Flips the shared cancel signal once 40 verify calls have landed,
        // mimicking a user-initiated cancel observed at the next cohort
        // boundary (the cohort size below is also 40).
        Arc::new(ScriptedVerifier::cancels_after(40, cancel_signal.clone())),
        fees,
        zero_delay_executor_config(40),
    );

    let params = submit_params(user_id, query, true);
    let task = driver.run_task(params, cancel_signal).await.expect("task run must succeed");

    assert_eq!(task.status, SearchTaskStatus::Stopped);
    assert_eq!(task.credits_spent, 82); // 2 base + 40 * 2 processed — the other 160 refunded
    assert_eq!(ledger.balance(user_id).await.unwrap(), 9_918);

    let results = result_repo.list_for_task(&task.id).await.unwrap();
    assert_eq!(results.len(), 40);

    let has_cancel_log = task.logs.iter().any(|entry| entry.message.contains("cancel"));
    assert!(has_cancel_log);
}
