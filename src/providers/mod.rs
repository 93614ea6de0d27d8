//! Availability source providers
//!
//! Each provider queries one independent backend (WHOIS, a registrar API, a
//! scraped registrar page) and reports its own answer with a confidence
//! score. The reconciliation engine treats them uniformly through
//! [`SourceProvider`].

pub mod godaddy_api;
pub mod godaddy_browser;
pub mod namecheap;
pub mod whois;

// Re-export providers for easy access
pub use godaddy_api::GoDaddyApiProvider;
pub use godaddy_browser::GoDaddyBrowserProvider;
pub use namecheap::NamecheapProvider;
pub use whois::WhoisProvider;

use crate::types::SourceResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for all availability sources
///
/// The cardinal contract: `check_availability` never fails. Every internal
/// error (network, auth, parsing, timeout) is captured and returned as a
/// [`SourceResult`] with `error` set and `confidence` zeroed, so the engine
/// can always partition results on the `error` field alone.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Check one domain against this source
    async fn check_availability(&self, domain: &str) -> SourceResult;

    /// Stable identifier, unique within a registry; also the weight-lookup key
    fn source_name(&self) -> &str;

    /// Static reliability prior in (0, 1], fixed at construction
    fn weight(&self) -> f64;
}

/// Shared providers register as clones; the collaborator keeps its own
/// handle for lifecycle calls (e.g. browser session shutdown).
#[async_trait]
impl<T: SourceProvider + ?Sized> SourceProvider for Arc<T> {
    async fn check_availability(&self, domain: &str) -> SourceResult {
        (**self).check_availability(domain).await
    }

    fn source_name(&self) -> &str {
        (**self).source_name()
    }

    fn weight(&self) -> f64 {
        (**self).weight()
    }
}
