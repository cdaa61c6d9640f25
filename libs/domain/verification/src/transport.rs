// [libs/domain/verification/src/transport.rs]
/*!
 * APARATO: REVERSE-LOOKUP TRANSPORT CONTRACT (ESTRATO L2)
 * RESPONSABILIDAD: ABSTRACCIÓN DE LA LLAMADA AL PROXY, INYECTABLE PARA PRUEBA
 */

use async_trait::async_trait;

use crate::errors::SiteCallError;
use crate::scoring::ScrapedProfile;

/// Cuál de los dos sitios de cruce reverso consultar. El proxy de scraping
/// (C3) decide internamente a qué endpoint físico corresponde cada uno.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReverseLookupSite {
    Primary,
    Fallback,
}

/// Implementada por el adaptador de infraestructura que habla con el
/// proxy de scraping real; un doble de prueba la implementa en memoria.
#[async_trait]
pub trait ReverseLookupTransport: Send + Sync {
    async fn query(&self, site: ReverseLookupSite, phone: &str) -> Result<ScrapedProfile, SiteCallError>;
}
