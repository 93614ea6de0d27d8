//! WHOIS protocol provider
//!
//! Pure Rust WHOIS over TCP/43, no external `whois` binary. The registry
//! answer is parsed for a registered domain name and status values; a record
//! carrying neither is treated as available. WHOIS is asymmetrically more
//! trustworthy when it finds a registration than when it finds nothing ("no
//! record" can also mean a lookup or parsing hiccup), so the two outcomes
//! carry different confidences.

use crate::error::{DomainVerdictError, Result};
use crate::providers::SourceProvider;
use crate::types::SourceResult;
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};

/// Registry identifier; also the key the engine uses to split WHOIS-class
/// results from registrar-class results during conflict resolution.
pub const WHOIS_SOURCE_NAME: &str = "WHOIS";

const AVAILABLE_CONFIDENCE: f64 = 0.7;
const UNAVAILABLE_CONFIDENCE: f64 = 0.8;

/// Domain availability provider using the WHOIS protocol
pub struct WhoisProvider {
    weight: f64,
    /// Pause inserted before every query to respect upstream rate limits
    query_delay: Duration,
    io_timeout: Duration,
}

impl WhoisProvider {
    pub fn new() -> Self {
        Self {
            weight: 0.6,
            query_delay: Duration::from_millis(500),
            io_timeout: Duration::from_secs(10),
        }
    }

    /// Override the pre-query delay (rate-limit pacing)
    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }

    async fn check(&self, domain: &str) -> Result<SourceResult> {
        sleep(self.query_delay).await;

        let raw = self.lookup(domain).await?;
        let record = WhoisRecord::parse(&raw);
        Ok(Self::evaluate(&record, &raw))
    }

    /// Map a parsed record to a source result per the availability rule
    fn evaluate(record: &WhoisRecord, raw: &str) -> SourceResult {
        if record.is_registered() {
            let mut result =
                SourceResult::determined(WHOIS_SOURCE_NAME, false, UNAVAILABLE_CONFIDENCE)
                    .with_detail("status", record.status.join(", "))
                    .with_detail("raw_response", raw);
            if let Some(registrar) = &record.registrar {
                result = result.with_detail("registrar", registrar.as_str());
            }
            if let Some(created) = &record.creation_date {
                result = result.with_detail("creation_date", created.as_str());
            }
            if let Some(expires) = &record.expiration_date {
                result = result.with_detail("expiration_date", expires.as_str());
            }
            result
        } else {
            SourceResult::determined(WHOIS_SOURCE_NAME, true, AVAILABLE_CONFIDENCE)
                .with_detail("raw_response", raw)
        }
    }

    /// Resolve the authoritative server and run the query
    async fn lookup(&self, domain: &str) -> Result<String> {
        let tld = domain
            .rsplit('.')
            .next()
            .filter(|tld| !tld.is_empty())
            .ok_or_else(|| {
                DomainVerdictError::validation(format!("no TLD in domain: {}", domain))
            })?
            .to_lowercase();

        match whois_server_for_tld(&tld) {
            Some(server) => self.query_whois(server, domain).await,
            None => {
                // Unknown TLD: ask IANA for the authoritative server first
                let iana = self.query_whois("whois.iana.org", &tld).await?;
                let server = parse_iana_whois_server(&iana)
                    .or_else(|| parse_iana_refer_server(&iana))
                    .ok_or_else(|| {
                        DomainVerdictError::network(
                            format!("no WHOIS server found for TLD: {}", tld),
                            None,
                            None,
                        )
                    })?;
                self.query_whois(&server, domain).await
            }
        }
    }

    async fn query_whois(&self, server: &str, query: &str) -> Result<String> {
        let addr = format!("{}:43", server);
        let secs = self.io_timeout.as_secs();

        let mut stream = timeout(self.io_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| DomainVerdictError::timeout("WHOIS connect", secs))?
            .map_err(|e| {
                DomainVerdictError::network(
                    format!("WHOIS connect failed: {}", e),
                    None,
                    Some(addr.clone()),
                )
            })?;

        timeout(
            self.io_timeout,
            stream.write_all(format!("{}\r\n", query).as_bytes()),
        )
        .await
        .map_err(|_| DomainVerdictError::timeout("WHOIS write", secs))?
        .map_err(|e| {
            DomainVerdictError::network(
                format!("WHOIS write failed: {}", e),
                None,
                Some(addr.clone()),
            )
        })?;

        let mut buf = Vec::new();
        timeout(self.io_timeout, stream.read_to_end(&mut buf))
            .await
            .map_err(|_| DomainVerdictError::timeout("WHOIS read", secs))?
            .map_err(|e| {
                DomainVerdictError::network(
                    format!("WHOIS read failed: {}", e),
                    None,
                    Some(addr),
                )
            })?;

        Ok(String::from_utf8_lossy(&buf).to_string())
    }
}

impl Default for WhoisProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceProvider for WhoisProvider {
    async fn check_availability(&self, domain: &str) -> SourceResult {
        tracing::debug!(domain = %domain, "WHOIS check starting");

        match self.check(domain).await {
            Ok(result) => {
                tracing::debug!(
                    domain = %domain,
                    available = ?result.available,
                    "WHOIS check completed"
                );
                result
            }
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "WHOIS check failed");
                SourceResult::failure(
                    WHOIS_SOURCE_NAME,
                    format!("error checking domain {} via WHOIS: {}", domain, e),
                )
            }
        }
    }

    fn source_name(&self) -> &str {
        WHOIS_SOURCE_NAME
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Parsed subset of a WHOIS reply
#[derive(Debug, Default)]
struct WhoisRecord {
    domain_name: Option<String>,
    status: Vec<String>,
    registrar: Option<String>,
    creation_date: Option<String>,
    expiration_date: Option<String>,
}

impl WhoisRecord {
    fn parse(raw: &str) -> Self {
        let mut record = Self::default();

        for line in raw.lines() {
            let line = line.trim();
            let lower = line.to_lowercase();

            if let Some(value) = field_value(line, &lower, "domain name:") {
                record.domain_name.get_or_insert(value);
            } else if let Some(value) = field_value(line, &lower, "domain status:")
                .or_else(|| field_value(line, &lower, "status:"))
            {
                record.status.push(value);
            } else if let Some(value) = field_value(line, &lower, "registrar:") {
                record.registrar.get_or_insert(value);
            } else if let Some(value) = field_value(line, &lower, "creation date:")
                .or_else(|| field_value(line, &lower, "created:"))
            {
                record.creation_date.get_or_insert(value);
            } else if let Some(value) = field_value(line, &lower, "expiration date:")
                .or_else(|| field_value(line, &lower, "registry expiry date:"))
                .or_else(|| field_value(line, &lower, "expires:"))
            {
                record.expiration_date.get_or_insert(value);
            }
        }

        record
    }

    /// A record carrying a status or a registered name means the domain is taken
    fn is_registered(&self) -> bool {
        !self.status.is_empty() || self.domain_name.is_some()
    }
}

fn field_value(line: &str, lower: &str, field: &str) -> Option<String> {
    if !lower.starts_with(field) {
        return None;
    }
    let value = line.get(field.len()..)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Convention-based mapping for high-usage TLDs.
/// Unknown TLDs fall back to IANA discovery.
fn whois_server_for_tld(tld: &str) -> Option<&'static str> {
    match tld {
        "com" | "net" => Some("whois.verisign-grs.com"),
        "org" => Some("whois.pir.org"),
        "io" => Some("whois.nic.io"),
        "ai" => Some("whois.nic.ai"),
        "co" => Some("whois.nic.co"),
        "me" => Some("whois.nic.me"),
        "app" | "dev" => Some("whois.nic.google"),
        "xyz" => Some("whois.nic.xyz"),
        _ => None,
    }
}

fn parse_iana_whois_server(iana: &str) -> Option<String> {
    iana.lines().map(str::trim).find_map(|line| {
        let lower = line.to_lowercase();
        if lower.starts_with("whois:") {
            let server = line.splitn(2, ':').nth(1)?.trim();
            (!server.is_empty()).then(|| server.to_string())
        } else {
            None
        }
    })
}

fn parse_iana_refer_server(iana: &str) -> Option<String> {
    iana.lines().map(str::trim).find_map(|line| {
        let lower = line.to_lowercase();
        if lower.starts_with("refer:") {
            let server = line.splitn(2, ':').nth(1)?.trim();
            (!server.is_empty()).then(|| server.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTERED_SAMPLE: &str = r#"
Domain Name: EXAMPLE.COM
Registry Domain ID: 2336799_DOMAIN_COM-VRSN
Registrar: RESERVED-Internet Assigned Numbers Authority
Creation Date: 1995-08-14T04:00:00Z
Registry Expiry Date: 2026-08-13T04:00:00Z
Domain Status: clientDeleteProhibited https://icann.org/epp#clientDeleteProhibited
Domain Status: clientTransferProhibited https://icann.org/epp#clientTransferProhibited
"#;

    const NO_MATCH_SAMPLE: &str = r#"
No match for domain "THISDOMAINDOESNOTEXIST12345.COM".
>>> Last update of whois database: 2025-01-01T00:00:00Z <<<
"#;

    #[test]
    fn test_parse_registered_record() {
        let record = WhoisRecord::parse(REGISTERED_SAMPLE);
        assert!(record.is_registered());
        assert_eq!(record.domain_name.as_deref(), Some("EXAMPLE.COM"));
        assert_eq!(record.status.len(), 2);
        assert!(record.registrar.is_some());
        assert_eq!(
            record.creation_date.as_deref(),
            Some("1995-08-14T04:00:00Z")
        );
        assert_eq!(
            record.expiration_date.as_deref(),
            Some("2026-08-13T04:00:00Z")
        );
    }

    #[test]
    fn test_parse_no_match_record() {
        let record = WhoisRecord::parse(NO_MATCH_SAMPLE);
        assert!(!record.is_registered());
        assert!(record.domain_name.is_none());
        assert!(record.status.is_empty());
    }

    #[test]
    fn test_evaluate_registered() {
        let record = WhoisRecord::parse(REGISTERED_SAMPLE);
        let result = WhoisProvider::evaluate(&record, REGISTERED_SAMPLE);

        assert_eq!(result.available, Some(false));
        assert_eq!(result.confidence, 0.8);
        assert!(result.is_usable());
        assert!(result.details.contains_key("registrar"));
        assert!(result.details.contains_key("raw_response"));
    }

    #[test]
    fn test_evaluate_unregistered() {
        let record = WhoisRecord::parse(NO_MATCH_SAMPLE);
        let result = WhoisProvider::evaluate(&record, NO_MATCH_SAMPLE);

        assert_eq!(result.available, Some(true));
        assert_eq!(result.confidence, 0.7);
        assert!(result.details.contains_key("raw_response"));
    }

    #[test]
    fn test_server_map() {
        assert_eq!(whois_server_for_tld("com"), Some("whois.verisign-grs.com"));
        assert_eq!(whois_server_for_tld("io"), Some("whois.nic.io"));
        assert_eq!(whois_server_for_tld("unknown"), None);
    }

    #[test]
    fn test_iana_whois_parsing() {
        let sample = r#"
domain:       COM
organisation: Verisign Global Registry Services
whois:        whois.verisign-grs.com
status:       ACTIVE
"#;
        assert_eq!(
            parse_iana_whois_server(sample).as_deref(),
            Some("whois.verisign-grs.com")
        );
    }

    #[test]
    fn test_iana_refer_parsing() {
        let sample = "refer: whois.nic.io\n";
        assert_eq!(parse_iana_refer_server(sample).as_deref(), Some("whois.nic.io"));
    }

    #[test]
    fn test_provider_identity() {
        let provider = WhoisProvider::new();
        assert_eq!(provider.source_name(), "WHOIS");
        assert_eq!(provider.weight(), 0.6);
    }
}
