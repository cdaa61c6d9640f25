// [libs/infra/persistence/src/memory_cache.rs]
/*!
 * APARATO: IN-MEMORY CACHE REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: DOBLE EN MEMORIA DE `CacheRepository` PARA EL ARNÉS DE CLI Y PRUEBAS
 *
 * Respaldado por `DashMap` en lugar de un `Mutex<HashMap<..>>`: las
 * lecturas/escrituras concurrentes de envelopes distintos no se serializan
 * entre sí, el mismo motivo por el que el pack de referencia usa `recache`
 * para su caché de proceso.
 */

use async_trait::async_trait;
use dashmap::DashMap;

use tracer_domain_models::CacheEnvelope;

use crate::errors::PersistenceError;
use crate::traits::CacheRepository;

#[derive(Default)]
pub struct InMemoryCacheRepository {
    envelopes: DashMap<String, CacheEnvelope>,
}

impl InMemoryCacheRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheRepository for InMemoryCacheRepository {
    async fn get(&self, key: &str) -> Result<Option<CacheEnvelope>, PersistenceError> {
        Ok(self.envelopes.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, envelope: CacheEnvelope) -> Result<(), PersistenceError> {
        self.envelopes.insert(envelope.key.clone(), envelope);
        Ok(())
    }

    async fn increment_hit(&self, key: &str) -> Result<(), PersistenceError> {
        if let Some(mut entry) = self.envelopes.get_mut(key) {
            entry.hit_count += 1;
        }
        Ok(())
    }
}
