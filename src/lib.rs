//! Domain Verdict - multi-source domain availability checking
//!
//! Queries independent availability sources (WHOIS, registrar APIs, scraped
//! registrar pages) concurrently and reconciles their answers into a single
//! confidence-scored verdict.

pub mod checker;
pub mod error;
pub mod normalize;
pub mod providers;
pub mod types;

// Re-export commonly used types
pub use error::{DomainVerdictError, Result};
pub use types::{
    BrowserConfig, CheckerMetrics, GoDaddyApiConfig, MetricsSnapshot, ReconciledVerdict,
    SourceResult, VerdictStatus,
};

// Re-export main functionality
pub use checker::DomainChecker;
pub use normalize::normalize_domain;
pub use providers::{
    GoDaddyApiProvider, GoDaddyBrowserProvider, NamecheapProvider, SourceProvider, WhoisProvider,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();
    Ok(())
}
