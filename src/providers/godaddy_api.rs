//! GoDaddy availability API provider
//!
//! One authenticated GET per domain against GoDaddy's
//! `/v1/domains/available` endpoint. Transport-level failures are mapped to
//! distinct error messages so the reconciled verdict can surface rate limits
//! and credential problems; a missing credential pair short-circuits without
//! touching the network.

use crate::error::{DomainVerdictError, Result};
use crate::providers::SourceProvider;
use crate::types::{GoDaddyApiConfig, SourceResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Production API endpoint
const PROD_BASE_URL: &str = "https://api.godaddy.com";
/// OTE (test) API endpoint
const OTE_BASE_URL: &str = "https://api.ote-godaddy.com";

const SOURCE_NAME: &str = "GoDaddy";

/// Domain availability provider using the GoDaddy API
pub struct GoDaddyApiProvider {
    client: Client,
    config: GoDaddyApiConfig,
    base_url: String,
    weight: f64,
}

impl GoDaddyApiProvider {
    pub fn new(config: GoDaddyApiConfig) -> Result<Self> {
        if !config.has_credentials() {
            tracing::warn!("GoDaddy API credentials not provided or incomplete");
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("domain-verdict/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainVerdictError::network(e.to_string(), None, None))?;

        let base_url = if config.production {
            PROD_BASE_URL.to_string()
        } else {
            OTE_BASE_URL.to_string()
        };

        Ok(Self {
            client,
            config,
            base_url,
            weight: 0.9,
        })
    }

    async fn check(&self, domain: &str) -> Result<SourceResult> {
        let url = format!("{}/v1/domains/available", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("domain", domain)])
            .header(
                "Authorization",
                format!(
                    "sso-key {}:{}",
                    self.config.api_key, self.config.api_secret
                ),
            )
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                DomainVerdictError::network(
                    format!("failed to reach GoDaddy API: {}", e),
                    None,
                    Some(url.clone()),
                )
            })?;

        let status = response.status();
        match status.as_u16() {
            429 => {
                return Err(DomainVerdictError::rate_limit(
                    "rate limit exceeded for GoDaddy API",
                    None,
                ))
            }
            401 => {
                return Err(DomainVerdictError::authentication(
                    "authentication failed for GoDaddy API",
                ))
            }
            200 => {}
            code => {
                let body = response.text().await.unwrap_or_default();
                return Err(DomainVerdictError::network(
                    format!("GoDaddy API error: {} - {}", code, body),
                    Some(code),
                    Some(url),
                ));
            }
        }

        let body = response.text().await.map_err(|e| {
            DomainVerdictError::network(e.to_string(), Some(200), Some(url.clone()))
        })?;
        let availability: GoDaddyAvailability = serde_json::from_str(&body)
            .map_err(|e| DomainVerdictError::parse(e.to_string(), Some(body)))?;

        Ok(Self::evaluate(availability))
    }

    /// Map a successful API body to a source result
    fn evaluate(availability: GoDaddyAvailability) -> SourceResult {
        // The API flags non-definitive answers; those get a lower confidence
        let confidence = if availability.definitive { 0.9 } else { 0.7 };

        let mut result =
            SourceResult::determined(SOURCE_NAME, availability.available, confidence)
                .with_detail("definitive", availability.definitive)
                .with_detail("currency", availability.currency.as_str());
        if let Some(price) = availability.price {
            result = result.with_detail("price", price);
        }
        result
    }
}

#[async_trait]
impl SourceProvider for GoDaddyApiProvider {
    async fn check_availability(&self, domain: &str) -> SourceResult {
        if !self.config.has_credentials() {
            return SourceResult::failure(
                SOURCE_NAME,
                "GoDaddy API credentials not configured",
            );
        }

        tracing::debug!(domain = %domain, "GoDaddy API check starting");

        match self.check(domain).await {
            Ok(result) => {
                tracing::debug!(
                    domain = %domain,
                    available = ?result.available,
                    confidence = %result.confidence,
                    "GoDaddy API check completed"
                );
                result
            }
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "GoDaddy API check failed");
                SourceResult::failure(SOURCE_NAME, e.to_string())
            }
        }
    }

    fn source_name(&self) -> &str {
        SOURCE_NAME
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Body of a successful availability response
#[derive(Debug, Deserialize)]
struct GoDaddyAvailability {
    #[serde(default)]
    available: bool,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default = "default_currency")]
    currency: String,
    #[serde(default = "default_definitive")]
    definitive: bool,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_definitive() -> bool {
    true
}
