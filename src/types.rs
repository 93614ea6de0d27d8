//! Core types and structures for domain-verdict

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Reconciled availability status for a checked domain
///
/// The serialized strings are consumed verbatim by downstream renderers
/// (progress streaming, report generation), so they must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Unknown,
    Available,
    Unavailable,
    AvailableConflicted,
    UnavailableConflicted,
    AvailableUncertain,
    UnavailableUncertain,
}

impl VerdictStatus {
    /// Stable string form, identical to the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictStatus::Unknown => "unknown",
            VerdictStatus::Available => "available",
            VerdictStatus::Unavailable => "unavailable",
            VerdictStatus::AvailableConflicted => "available_conflicted",
            VerdictStatus::UnavailableConflicted => "unavailable_conflicted",
            VerdictStatus::AvailableUncertain => "available_uncertain",
            VerdictStatus::UnavailableUncertain => "unavailable_uncertain",
        }
    }

    /// True for the `_conflicted` pair
    pub fn is_conflicted(&self) -> bool {
        matches!(
            self,
            VerdictStatus::AvailableConflicted | VerdictStatus::UnavailableConflicted
        )
    }

    /// True for the `_uncertain` pair
    pub fn is_uncertain(&self) -> bool {
        matches!(
            self,
            VerdictStatus::AvailableUncertain | VerdictStatus::UnavailableUncertain
        )
    }
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Answer from a single availability source for one domain
///
/// `available` is `None` when the source could not determine status.
/// A result with `error` set never participates in reconciliation votes,
/// but is kept in the verdict's `sources` list for transparency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceResult {
    /// Stable identifier of the originating provider
    pub source: String,

    /// Availability answer; `None` when undetermined
    pub available: Option<bool>,

    /// Source's self-assessed reliability for this answer, 0.0..=1.0
    pub confidence: f64,

    /// Source-specific auxiliary data (price, registrar, raw response, ...)
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,

    /// Failure description; when set, `available` is unusable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceResult {
    /// A successful determination from a source
    pub fn determined(source: impl Into<String>, available: bool, confidence: f64) -> Self {
        Self {
            source: source.into(),
            available: Some(available),
            confidence,
            details: Map::new(),
            error: None,
        }
    }

    /// A failed check; confidence drops to zero and the answer is unusable
    pub fn failure(source: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            available: None,
            confidence: 0.0,
            details: Map::new(),
            error: Some(error.into()),
        }
    }

    /// Attach one detail entry
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Whether this result may participate in reconciliation
    pub fn is_usable(&self) -> bool {
        self.error.is_none()
    }
}

/// Reconciled verdict for one domain across all registered sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciledVerdict {
    /// Canonical (normalized) domain that was checked
    pub domain: String,

    /// Combined availability answer; `None` when no source could determine it
    pub available: Option<bool>,

    /// Combined confidence, 0.0..=1.0
    pub confidence: f64,

    /// Reconciliation outcome category
    pub status: VerdictStatus,

    /// Number of sources queried
    pub sources_checked: usize,

    /// Number of sources that failed
    pub sources_with_errors: usize,

    /// Whether usable sources disagreed
    pub conflicting_results: bool,

    /// Per-source results in provider registration order, errored ones included
    pub sources: Vec<SourceResult>,

    /// When the check completed
    pub checked_at: DateTime<Utc>,

    /// Wall-clock duration of the whole fan-out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_duration: Option<Duration>,
}

/// Configuration for the GoDaddy availability API provider
///
/// Credentials are supplied by the caller; the library never reads the
/// environment itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoDaddyApiConfig {
    pub api_key: String,
    pub api_secret: String,
    /// Production endpoint when true, OTE (test) endpoint when false
    pub production: bool,
    /// Per-request timeout
    #[serde(skip)]
    pub timeout: Duration,
}

impl Default for GoDaddyApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            production: true,
            timeout: Duration::from_secs(10),
        }
    }
}

impl GoDaddyApiConfig {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            ..Self::default()
        }
    }

    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// True when both credential halves are present
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

/// Configuration for the browser-automation provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// WebDriver endpoint, e.g. `http://localhost:4444`
    pub webdriver_url: String,
    pub headless: bool,
    /// Timeout for page-level operations
    #[serde(skip)]
    pub timeout: Duration,
    pub max_retries: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            headless: true,
            timeout: Duration::from_secs(30),
            max_retries: 2,
        }
    }
}

impl BrowserConfig {
    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.webdriver_url = url.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Internal counters for checker activity
///
/// Shared via `Arc`; all counters are monotonic.
#[derive(Debug, Default)]
pub struct CheckerMetrics {
    domains_checked: AtomicU64,
    provider_errors: AtomicU64,
    conflicts_seen: AtomicU64,
}

impl CheckerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_domains_checked(&self) {
        self.domains_checked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_provider_errors(&self, count: u64) {
        self.provider_errors.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_conflicts(&self) {
        self.conflicts_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            domains_checked: self.domains_checked.load(Ordering::Relaxed),
            provider_errors: self.provider_errors.load(Ordering::Relaxed),
            conflicts_seen: self.conflicts_seen.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`CheckerMetrics`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub domains_checked: u64,
    pub provider_errors: u64,
    pub conflicts_seen: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings() {
        assert_eq!(VerdictStatus::Unknown.as_str(), "unknown");
        assert_eq!(VerdictStatus::Available.as_str(), "available");
        assert_eq!(
            VerdictStatus::AvailableConflicted.as_str(),
            "available_conflicted"
        );
        assert_eq!(
            VerdictStatus::UnavailableUncertain.as_str(),
            "unavailable_uncertain"
        );
    }

    #[test]
    fn test_status_serde_matches_display() {
        for status in [
            VerdictStatus::Unknown,
            VerdictStatus::Available,
            VerdictStatus::Unavailable,
            VerdictStatus::AvailableConflicted,
            VerdictStatus::UnavailableConflicted,
            VerdictStatus::AvailableUncertain,
            VerdictStatus::UnavailableUncertain,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
    }

    #[test]
    fn test_source_result_constructors() {
        let ok = SourceResult::determined("WHOIS", true, 0.7);
        assert_eq!(ok.available, Some(true));
        assert!(ok.is_usable());

        let failed = SourceResult::failure("GoDaddy", "rate limit exceeded");
        assert_eq!(failed.available, None);
        assert_eq!(failed.confidence, 0.0);
        assert!(!failed.is_usable());
    }

    #[test]
    fn test_source_result_details() {
        let result = SourceResult::determined("GoDaddy", true, 0.9)
            .with_detail("price", 12.99)
            .with_detail("currency", "USD");
        assert_eq!(result.details.len(), 2);
        assert_eq!(result.details["currency"], "USD");
    }

    #[test]
    fn test_godaddy_config_credentials() {
        assert!(!GoDaddyApiConfig::default().has_credentials());
        assert!(GoDaddyApiConfig::new("key", "secret").has_credentials());
        assert!(!GoDaddyApiConfig::new("key", "").has_credentials());
    }

    #[test]
    fn test_metrics_counters() {
        let metrics = CheckerMetrics::new();
        metrics.increment_domains_checked();
        metrics.add_provider_errors(2);
        metrics.increment_conflicts();

        let snap = metrics.snapshot();
        assert_eq!(snap.domains_checked, 1);
        assert_eq!(snap.provider_errors, 2);
        assert_eq!(snap.conflicts_seen, 1);
    }
}
