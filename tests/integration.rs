//! Integration tests for domain-verdict

use async_trait::async_trait;
use domain_verdict::{
    normalize_domain, DomainChecker, GoDaddyApiConfig, GoDaddyApiProvider, NamecheapProvider,
    SourceProvider, SourceResult, VerdictStatus, WhoisProvider,
};

/// Test double returning a canned answer
struct CannedProvider {
    name: &'static str,
    weight: f64,
    available: bool,
    confidence: f64,
}

#[async_trait]
impl SourceProvider for CannedProvider {
    async fn check_availability(&self, _domain: &str) -> SourceResult {
        SourceResult::determined(self.name, self.available, self.confidence)
    }

    fn source_name(&self) -> &str {
        self.name
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

#[tokio::test]
async fn test_default_checker_registers_whois() {
    let checker = DomainChecker::new();
    assert_eq!(checker.provider_names(), vec!["WHOIS"]);
    assert_eq!(checker.provider_count(), 1);
}

#[tokio::test]
async fn test_registration_order_reflected_in_verdict() {
    let mut checker = DomainChecker::with_providers(Vec::new());
    checker.add_provider(Box::new(CannedProvider {
        name: "WHOIS",
        weight: 0.6,
        available: true,
        confidence: 0.7,
    }));
    checker.add_provider(Box::new(CannedProvider {
        name: "GoDaddy",
        weight: 0.9,
        available: true,
        confidence: 0.9,
    }));
    checker.add_provider(Box::new(NamecheapProvider::new(None, None, None)));

    let verdict = checker.check_domain("example.io").await;
    let names: Vec<&str> = verdict.sources.iter().map(|s| s.source.as_str()).collect();
    assert_eq!(names, vec!["WHOIS", "GoDaddy", "Namecheap"]);
    assert_eq!(verdict.sources_checked, 3);
}

#[tokio::test]
async fn test_conflicting_sources_end_to_end() {
    // WHOIS sees a registration, the registrar API disagrees: the
    // registrar-class answer wins with fixed 0.7 confidence
    let checker = DomainChecker::with_providers(vec![
        Box::new(CannedProvider {
            name: "WHOIS",
            weight: 0.6,
            available: false,
            confidence: 0.8,
        }),
        Box::new(CannedProvider {
            name: "GoDaddy",
            weight: 0.9,
            available: true,
            confidence: 0.9,
        }),
    ]);

    let verdict = checker.check_domain("test.com").await;
    assert_eq!(verdict.domain, "test.com");
    assert_eq!(verdict.available, Some(true));
    assert_eq!(verdict.confidence, 0.7);
    assert_eq!(verdict.status, VerdictStatus::AvailableConflicted);
    assert!(verdict.conflicting_results);
    assert_eq!(verdict.sources_checked, 2);
    assert_eq!(verdict.sources_with_errors, 0);
}

#[tokio::test]
async fn test_verdict_serializes_stable_status_strings() {
    let checker = DomainChecker::with_providers(vec![
        Box::new(CannedProvider {
            name: "WHOIS",
            weight: 0.6,
            available: false,
            confidence: 0.8,
        }),
        Box::new(CannedProvider {
            name: "GoDaddy",
            weight: 0.9,
            available: true,
            confidence: 0.9,
        }),
    ]);

    let verdict = checker.check_domain("test.com").await;
    let json = serde_json::to_value(&verdict).unwrap();

    assert_eq!(json["status"], "available_conflicted");
    assert_eq!(json["available"], true);
    assert_eq!(json["conflicting_results"], true);
    assert_eq!(json["sources"].as_array().unwrap().len(), 2);
    assert_eq!(json["sources"][0]["source"], "WHOIS");
}

#[tokio::test]
async fn test_stub_registrar_only_errors() {
    let checker =
        DomainChecker::with_providers(vec![Box::new(NamecheapProvider::new(None, None, None))]);

    let verdict = checker.check_domain("example.com").await;
    assert_eq!(verdict.status, VerdictStatus::Unknown);
    assert_eq!(verdict.available, None);
    assert_eq!(verdict.confidence, 0.0);
    assert_eq!(verdict.sources_with_errors, 1);
    // The errored source is still reported
    assert_eq!(verdict.sources[0].source, "Namecheap");
}

#[tokio::test]
async fn test_api_provider_without_credentials_degrades_gracefully() {
    // No network traffic happens here: the credential check short-circuits
    let provider = GoDaddyApiProvider::new(GoDaddyApiConfig::default()).unwrap();
    let mut checker = DomainChecker::with_providers(Vec::new());
    checker.add_provider(Box::new(provider));

    let verdict = checker.check_domain("example.com").await;
    assert_eq!(verdict.status, VerdictStatus::Unknown);
    assert_eq!(verdict.sources_with_errors, 1);
}

#[test]
fn test_normalize_is_exported_and_canonical() {
    assert_eq!(normalize_domain("HTTPS://WWW.Example.com/path"), "example.com");
    assert_eq!(
        normalize_domain(&normalize_domain("HTTPS://WWW.Example.com/path")),
        "example.com"
    );
}

#[test]
fn test_provider_weights() {
    assert_eq!(WhoisProvider::new().weight(), 0.6);
    assert_eq!(NamecheapProvider::new(None, None, None).weight(), 0.85);
    assert_eq!(
        GoDaddyApiProvider::new(GoDaddyApiConfig::new("k", "s"))
            .unwrap()
            .weight(),
        0.9
    );
}

#[test]
fn test_library_initialization() {
    assert!(domain_verdict::init().is_ok());
}
