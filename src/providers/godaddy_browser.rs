//! GoDaddy browser-automation provider
//!
//! Scrapes GoDaddy's public domain-search page through a WebDriver session
//! as an alternative to the availability API. The session is expensive, so
//! it is connected lazily on first use and reused for every subsequent
//! check; the owning collaborator must call [`GoDaddyBrowserProvider::close`]
//! when done. A mutex serializes page use, so concurrent domain checks
//! queue on this provider instead of fighting over one page.

use crate::error::{DomainVerdictError, Result};
use crate::providers::SourceProvider;
use crate::types::{BrowserConfig, SourceResult};
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use regex::Regex;
use tokio::sync::Mutex;

const SEARCH_URL: &str = "https://www.godaddy.com/domainsearch/find";
const SOURCE_NAME: &str = "GoDaddy Browser";

const RESULTS_SELECTOR: &str = ".domain-search-results";
const AVAILABLE_SELECTOR: &str = ".domain-search-results .domain-available";
const UNAVAILABLE_SELECTOR: &str = ".domain-search-results .domain-unavailable";
const PRICE_SELECTOR: &str = ".domain-available .price";
const FOR_SALE_SELECTOR: &str = ".domain-unavailable .for-sale";
const SUGGESTION_SELECTOR: &str = ".domain-suggestions .domain-name";

/// Maximum number of alternative-name suggestions scraped per check
const MAX_SUGGESTIONS: usize = 5;

/// Domain availability provider scraping GoDaddy's search UI
pub struct GoDaddyBrowserProvider {
    config: BrowserConfig,
    weight: f64,
    session: Mutex<Option<Client>>,
}

impl GoDaddyBrowserProvider {
    pub fn new(config: BrowserConfig) -> Self {
        tracing::info!(
            webdriver_url = %config.webdriver_url,
            headless = config.headless,
            timeout_secs = config.timeout.as_secs(),
            "GoDaddy browser provider initialized"
        );

        Self {
            config,
            weight: 0.9,
            session: Mutex::new(None),
        }
    }

    /// Release the shared WebDriver session.
    ///
    /// Safe to call when no session was ever started. After closing, the
    /// next check transparently connects a fresh session.
    pub async fn close(&self) -> Result<()> {
        let mut guard = self.session.lock().await;
        if let Some(client) = guard.take() {
            tracing::info!("closing browser session");
            client.close().await?;
        }
        Ok(())
    }

    /// Connect the session if this is the first use
    async fn ensure_session<'a>(&self, guard: &'a mut Option<Client>) -> Result<&'a Client> {
        match guard {
            Some(client) => Ok(client),
            None => {
                tracing::info!(url = %self.config.webdriver_url, "starting browser session");

                let mut caps = serde_json::map::Map::new();
                let mut args = vec!["--disable-gpu".to_string()];
                if self.config.headless {
                    args.push("--headless".to_string());
                }
                caps.insert(
                    "goog:chromeOptions".to_string(),
                    serde_json::json!({ "args": args }),
                );

                let client = ClientBuilder::native()
                    .capabilities(caps)
                    .connect(&self.config.webdriver_url)
                    .await?;
                Ok(guard.insert(client))
            }
        }
    }

    async fn check(&self, client: &Client, domain: &str) -> Result<SourceResult> {
        client.goto(SEARCH_URL).await?;

        // The search form is the only stable entry point on this page
        client
            .wait()
            .at_most(self.config.timeout)
            .for_element(Locator::Css("input[name=\"domainToCheck\"]"))
            .await
            .map_err(|e| self.map_wait_error("search input", e))?;

        client
            .form(Locator::Css("form"))
            .await?
            .set_by_name("domainToCheck", domain)
            .await?
            .submit()
            .await?;

        client
            .wait()
            .at_most(self.config.timeout)
            .for_element(Locator::Css(RESULTS_SELECTOR))
            .await
            .map_err(|e| self.map_wait_error("search results", e))?;

        let mut result = self.inspect_results(client, domain).await?;

        // Suggestions are opportunistic; their absence is not a failure
        match self.extract_suggestions(client).await {
            Ok(suggestions) if !suggestions.is_empty() => {
                result = result.with_detail("suggestions", suggestions);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "could not extract suggestions");
            }
        }

        Ok(result)
    }

    /// Read the rendered result region and classify the answer
    async fn inspect_results(&self, client: &Client, domain: &str) -> Result<SourceResult> {
        if element_present(client, AVAILABLE_SELECTOR).await? {
            tracing::debug!(domain = %domain, "domain available per GoDaddy page");
            let mut result = SourceResult::determined(SOURCE_NAME, true, 0.9);

            match self.extract_price(client).await {
                Ok(Some(price)) => {
                    result = result.with_detail("price", price);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(domain = %domain, error = %e, "could not extract price");
                }
            }
            return Ok(result);
        }

        if element_present(client, UNAVAILABLE_SELECTOR).await? {
            tracing::debug!(domain = %domain, "domain unavailable per GoDaddy page");
            let mut result = SourceResult::determined(SOURCE_NAME, false, 0.9);

            match self.extract_for_sale(client).await {
                Ok(Some(notice)) => {
                    result = result
                        .with_detail("for_sale", true)
                        .with_detail("for_sale_info", notice);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(domain = %domain, error = %e, "could not extract for-sale notice");
                }
            }
            return Ok(result);
        }

        // Page rendered but neither signal matched
        tracing::warn!(domain = %domain, "could not classify GoDaddy search results");
        Ok(SourceResult::determined(SOURCE_NAME, false, 0.5).with_detail("indeterminate", true))
    }

    async fn extract_price(&self, client: &Client) -> Result<Option<String>> {
        match client.find(Locator::Css(PRICE_SELECTOR)).await {
            Ok(element) => {
                let text = element.text().await?;
                Ok(extract_price_tag(&text))
            }
            Err(CmdError::NoSuchElement(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn extract_for_sale(&self, client: &Client) -> Result<Option<String>> {
        match client.find(Locator::Css(FOR_SALE_SELECTOR)).await {
            Ok(element) => {
                let text = element.text().await?;
                let trimmed = text.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            Err(CmdError::NoSuchElement(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn extract_suggestions(&self, client: &Client) -> Result<Vec<String>> {
        let elements = client.find_all(Locator::Css(SUGGESTION_SELECTOR)).await?;

        let mut suggestions = Vec::new();
        for element in elements.into_iter().take(MAX_SUGGESTIONS) {
            let text = element.text().await?;
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                suggestions.push(trimmed.to_string());
            }
        }
        Ok(suggestions)
    }

    fn map_wait_error(&self, what: &str, err: CmdError) -> DomainVerdictError {
        match err {
            CmdError::WaitTimeout => DomainVerdictError::timeout(
                format!("waiting for {}", what),
                self.config.timeout.as_secs(),
            ),
            other => other.into(),
        }
    }
}

#[async_trait]
impl SourceProvider for GoDaddyBrowserProvider {
    async fn check_availability(&self, domain: &str) -> SourceResult {
        tracing::debug!(domain = %domain, "GoDaddy browser check starting");

        // Holding the lock for the whole flow keeps the page single-user
        let mut guard = self.session.lock().await;

        let client = match self.ensure_session(&mut guard).await {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "browser session unavailable");
                return SourceResult::failure(
                    SOURCE_NAME,
                    format!("error checking domain {} via GoDaddy browser: {}", domain, e),
                );
            }
        };

        match self.check(client, domain).await {
            Ok(result) => {
                tracing::debug!(
                    domain = %domain,
                    available = ?result.available,
                    confidence = %result.confidence,
                    "GoDaddy browser check completed"
                );
                result
            }
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "GoDaddy browser check failed");
                SourceResult::failure(
                    SOURCE_NAME,
                    format!("error checking domain {} via GoDaddy browser: {}", domain, e),
                )
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

async fn element_present(client: &Client, selector: &str) -> Result<bool> {
    match client.find(Locator::Css(selector)).await {
        Ok(_) => Ok(true),
        Err(CmdError::NoSuchElement(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Pull a `$12.99`-style tag out of arbitrary pricing copy
fn extract_price_tag(text: &str) -> Option<String> {
    let re = Regex::new(r"\$[\d,.]+").ok()?;
    re.find(text).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_extraction() {
        assert_eq!(
            extract_price_tag("Buy it now for $12.99/yr*").as_deref(),
            Some("$12.99")
        );
        assert_eq!(
            extract_price_tag("$1,299.00 first year").as_deref(),
            Some("$1,299.00")
        );
        assert_eq!(extract_price_tag("contact us for pricing"), None);
    }

    #[test]
    fn test_provider_identity() {
        let provider = GoDaddyBrowserProvider::new(BrowserConfig::default());
        assert_eq!(provider.source_name(), "GoDaddy Browser");
        assert_eq!(provider.weight(), 0.9);
    }

    #[tokio::test]
    async fn test_close_without_session_is_noop() {
        let provider = GoDaddyBrowserProvider::new(BrowserConfig::default());
        assert!(provider.close().await.is_ok());
    }
}
