//! Multi-source domain checker
//!
//! `DomainChecker` owns the ordered provider registry, fans a domain check
//! out to every source concurrently, and reconciles the answers into one
//! [`ReconciledVerdict`]. Reconciliation prefers registrar-class sources
//! (direct API or scraped registrar data) over WHOIS when sources disagree.

use crate::normalize::normalize_domain;
use crate::providers::whois::{WhoisProvider, WHOIS_SOURCE_NAME};
use crate::providers::SourceProvider;
use crate::types::{
    CheckerMetrics, MetricsSnapshot, ReconciledVerdict, SourceResult, VerdictStatus,
};
use chrono::Utc;
use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

/// Weight used when a result's source name matches no registered provider
const FALLBACK_WEIGHT: f64 = 0.5;

/// Confidence attached to a verdict resolved by the registrar-class vote
const CONFLICT_CONFIDENCE: f64 = 0.7;

/// Confidence attached to a verdict resolved by WHOIS-only majority
const UNCERTAIN_CONFIDENCE: f64 = 0.5;

/// Core checker that queries all registered sources and reconciles results
pub struct DomainChecker {
    providers: Vec<Box<dyn SourceProvider>>,
    metrics: Arc<CheckerMetrics>,
}

impl DomainChecker {
    /// Create a checker with the default WHOIS provider registered
    pub fn new() -> Self {
        let mut checker = Self::with_providers(Vec::new());
        checker.add_provider(Box::new(WhoisProvider::new()));
        checker
    }

    /// Create a checker with an explicit provider registry and no defaults
    pub fn with_providers(providers: Vec<Box<dyn SourceProvider>>) -> Self {
        Self {
            providers,
            metrics: Arc::new(CheckerMetrics::new()),
        }
    }

    /// Append a provider to the registry.
    ///
    /// Registration order is preserved in every verdict's `sources` list and
    /// decides tie-breaks in the conflict vote.
    pub fn add_provider(&mut self, provider: Box<dyn SourceProvider>) {
        tracing::info!(
            provider = %provider.source_name(),
            weight = %provider.weight(),
            "registered availability provider"
        );
        self.providers.push(provider);
    }

    /// Names of registered providers, in registration order
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.source_name()).collect()
    }

    /// Number of registered providers
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Get shared metrics handle
    pub fn metrics(&self) -> Arc<CheckerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Current metrics snapshot
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Check one domain against every registered source and reconcile.
    ///
    /// Never fails: provider errors become errored `SourceResult` entries
    /// and total source failure is reported as a `status = unknown` verdict.
    pub async fn check_domain(&self, raw_domain: &str) -> ReconciledVerdict {
        let domain = normalize_domain(raw_domain);
        let started = Instant::now();

        tracing::debug!(
            domain = %domain,
            providers = %self.providers.len(),
            "starting multi-source domain check"
        );

        // Joint await over all providers; catch_unwind isolates a panicking
        // provider so its siblings' answers survive
        let checks = self
            .providers
            .iter()
            .map(|provider| AssertUnwindSafe(provider.check_availability(&domain)).catch_unwind());
        let outcomes = join_all(checks).await;

        let results: Vec<SourceResult> = outcomes
            .into_iter()
            .zip(self.providers.iter())
            .map(|(outcome, provider)| {
                outcome.unwrap_or_else(|_| {
                    tracing::error!(
                        provider = %provider.source_name(),
                        "provider panicked during check"
                    );
                    SourceResult::failure(
                        provider.source_name(),
                        format!("provider {} panicked during check", provider.source_name()),
                    )
                })
            })
            .collect();

        let mut verdict = self.reconcile(domain, results);
        verdict.check_duration = Some(started.elapsed());

        self.metrics.increment_domains_checked();
        self.metrics
            .add_provider_errors(verdict.sources_with_errors as u64);
        if verdict.conflicting_results {
            self.metrics.increment_conflicts();
        }

        tracing::info!(
            domain = %verdict.domain,
            status = %verdict.status,
            confidence = %verdict.confidence,
            sources = %verdict.sources_checked,
            errors = %verdict.sources_with_errors,
            conflicting = %verdict.conflicting_results,
            duration_ms = %started.elapsed().as_millis(),
            "domain check completed"
        );

        verdict
    }

    /// Combine per-source results into one verdict
    fn reconcile(&self, domain: String, results: Vec<SourceResult>) -> ReconciledVerdict {
        let sources_checked = results.len();
        let sources_with_errors = results.iter().filter(|r| !r.is_usable()).count();

        let mut verdict = ReconciledVerdict {
            domain,
            available: None,
            confidence: 0.0,
            status: VerdictStatus::Unknown,
            sources_checked,
            sources_with_errors,
            conflicting_results: false,
            sources: Vec::new(),
            checked_at: Utc::now(),
            check_duration: None,
        };

        // Errored results never vote, but stay in the verdict for transparency
        let valid: Vec<&SourceResult> = results.iter().filter(|r| r.is_usable()).collect();

        if valid.is_empty() {
            verdict.sources = results;
            return verdict;
        }

        let first_answer = valid[0].available;
        if valid.iter().all(|r| r.available == first_answer) {
            // Full agreement: confidence is the weight-averaged source confidence
            let total_weight: f64 = valid
                .iter()
                .map(|r| self.provider_weight(&r.source))
                .sum();
            let weighted_confidence: f64 = valid
                .iter()
                .map(|r| r.confidence * self.provider_weight(&r.source))
                .sum();

            verdict.available = first_answer;
            verdict.confidence = if total_weight > 0.0 {
                weighted_confidence / total_weight
            } else {
                0.5
            };
            verdict.status = match first_answer {
                Some(true) => VerdictStatus::Available,
                Some(false) => VerdictStatus::Unavailable,
                None => VerdictStatus::Unknown,
            };
        } else {
            verdict.conflicting_results = true;

            let registrar_class: Vec<&SourceResult> = valid
                .iter()
                .copied()
                .filter(|r| r.source != WHOIS_SOURCE_NAME)
                .collect();

            if !registrar_class.is_empty() {
                // Registrar-class sources outrank WHOIS: weighted vote among them
                let winner = self.weighted_vote(&registrar_class);
                verdict.available = winner;
                verdict.confidence = CONFLICT_CONFIDENCE;
                verdict.status = match winner {
                    Some(true) => VerdictStatus::AvailableConflicted,
                    Some(false) => VerdictStatus::UnavailableConflicted,
                    None => VerdictStatus::Unknown,
                };
            } else {
                // Only WHOIS-class sources disagree: raw majority, ties to false
                let true_votes = valid.iter().filter(|r| r.available == Some(true)).count();
                let false_votes = valid.iter().filter(|r| r.available == Some(false)).count();
                let available = true_votes > false_votes;

                verdict.available = Some(available);
                verdict.confidence = UNCERTAIN_CONFIDENCE;
                verdict.status = if available {
                    VerdictStatus::AvailableUncertain
                } else {
                    VerdictStatus::UnavailableUncertain
                };
            }
        }

        verdict.sources = results;
        verdict
    }

    /// Weighted vote over availability answers.
    ///
    /// Vote mass is each result's provider weight. The tally preserves
    /// first-seen order and the scan uses a strict `>`, so an exact tie
    /// resolves to the answer encountered first in registration order.
    fn weighted_vote(&self, results: &[&SourceResult]) -> Option<bool> {
        let mut tally: Vec<(Option<bool>, f64)> = Vec::new();
        for result in results {
            let weight = self.provider_weight(&result.source);
            match tally.iter_mut().find(|(answer, _)| *answer == result.available) {
                Some((_, mass)) => *mass += weight,
                None => tally.push((result.available, weight)),
            }
        }

        let mut winner: Option<(Option<bool>, f64)> = None;
        for entry in tally {
            if winner.map_or(true, |(_, best)| entry.1 > best) {
                winner = Some(entry);
            }
        }
        winner.and_then(|(answer, _)| answer)
    }

    /// Static weight for a source name; unmatched names get the fallback
    fn provider_weight(&self, source_name: &str) -> f64 {
        self.providers
            .iter()
            .find(|p| p.source_name() == source_name)
            .map(|p| p.weight())
            .unwrap_or(FALLBACK_WEIGHT)
    }
}

impl Default for DomainChecker {
    fn default() -> Self {
        Self::new()
    }
}
