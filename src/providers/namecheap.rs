//! Namecheap registrar provider (placeholder)
//!
//! Reserved for a future Namecheap API integration. Until then every check
//! reports a failure result, which the engine excludes from voting while
//! still listing the source in the verdict.

use crate::providers::SourceProvider;
use crate::types::SourceResult;
use async_trait::async_trait;

const SOURCE_NAME: &str = "Namecheap";

/// Domain availability provider using the Namecheap API
pub struct NamecheapProvider {
    weight: f64,
    api_key: Option<String>,
    username: Option<String>,
    client_ip: Option<String>,
}

impl NamecheapProvider {
    pub fn new(
        api_key: Option<String>,
        username: Option<String>,
        client_ip: Option<String>,
    ) -> Self {
        Self {
            weight: 0.85,
            api_key,
            username,
            client_ip,
        }
    }

    /// True once all Namecheap API prerequisites are supplied
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.username.is_some() && self.client_ip.is_some()
    }
}

#[async_trait]
impl SourceProvider for NamecheapProvider {
    async fn check_availability(&self, _domain: &str) -> SourceResult {
        SourceResult::failure(SOURCE_NAME, "Namecheap API integration not implemented yet")
    }

    fn source_name(&self) -> &str {
        SOURCE_NAME
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_errors() {
        let provider = NamecheapProvider::new(None, None, None);
        let result = provider.check_availability("example.com").await;

        assert!(!result.is_usable());
        assert_eq!(result.available, None);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_configuration_detection() {
        let unconfigured = NamecheapProvider::new(Some("key".into()), None, None);
        assert!(!unconfigured.is_configured());

        let configured = NamecheapProvider::new(
            Some("key".into()),
            Some("user".into()),
            Some("203.0.113.7".into()),
        );
        assert!(configured.is_configured());
        assert_eq!(configured.weight(), 0.85);
    }
}
