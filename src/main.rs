//! Domain Verdict - multi-source domain availability debug harness
//!
//! Checks one or more domains against every configured source and
//! pretty-prints the reconciled verdicts. Intended for verifying provider
//! configuration (API credentials, WebDriver endpoint) end to end.

use domain_verdict::{
    BrowserConfig, DomainChecker, GoDaddyApiConfig, GoDaddyApiProvider, GoDaddyBrowserProvider,
    ReconciledVerdict, Result, SourceResult,
};
use std::env;
use std::process;
use std::sync::Arc;

/// Domains exercised when none are given on the command line
const DEFAULT_TEST_DOMAINS: &[&str] = &[
    "google.com",
    "thisisarandomdomainthatdoesnotexist12345.com",
    "example.org",
];

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = domain_verdict::init() {
        eprintln!("❌ Failed to initialize: {}", e);
        process::exit(1);
    }

    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && (args[1] == "--help" || args[1] == "-h") {
        print_help();
        return Ok(());
    }

    let domains: Vec<String> = if args.len() > 1 {
        args[1..].to_vec()
    } else {
        DEFAULT_TEST_DOMAINS.iter().map(|s| s.to_string()).collect()
    };

    if let Err(e) = run_checks(&domains).await {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }

    Ok(())
}

async fn run_checks(domains: &[String]) -> Result<()> {
    println!("🔍 Domain Verdict - multi-source availability check");
    println!("═══════════════════════════════════════════════════");
    println!();

    let mut checker = DomainChecker::new();
    let browser = setup_providers(&mut checker)?;

    println!(
        "📡 Sources: {}",
        checker.provider_names().join(", ")
    );
    println!();

    // Verdicts are independent; domains are checked one at a time
    for domain in domains {
        let verdict = checker.check_domain(domain).await;
        display_verdict(&verdict);
    }

    let metrics = checker.metrics_snapshot();
    println!(
        "📊 Checked {} domain(s), {} source error(s), {} conflict(s)",
        metrics.domains_checked, metrics.provider_errors, metrics.conflicts_seen
    );

    if let Some(browser) = browser {
        browser.close().await?;
    }

    Ok(())
}

/// Register every source the environment has configuration for.
///
/// Returns the browser provider handle (if any) so the session can be
/// closed after the run.
fn setup_providers(checker: &mut DomainChecker) -> Result<Option<Arc<GoDaddyBrowserProvider>>> {
    // GoDaddy availability API
    match (env::var("GODADDY_API_KEY"), env::var("GODADDY_API_SECRET")) {
        (Ok(api_key), Ok(api_secret)) => {
            let production = env::var("GODADDY_USE_PRODUCTION")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(true);
            println!(
                "🔧 GoDaddy API configured ({} environment)",
                if production { "production" } else { "OTE" }
            );

            let config = GoDaddyApiConfig::new(api_key, api_secret).with_production(production);
            checker.add_provider(Box::new(GoDaddyApiProvider::new(config)?));
        }
        _ => {
            println!("⚠️  GODADDY_API_KEY / GODADDY_API_SECRET not set, skipping GoDaddy API");
        }
    }

    // GoDaddy page scraping through WebDriver
    let browser = match env::var("WEBDRIVER_URL") {
        Ok(url) => {
            println!("🔧 Browser provider configured (WebDriver at {})", url);
            let config = BrowserConfig::default().with_webdriver_url(url);
            let provider = Arc::new(GoDaddyBrowserProvider::new(config));
            checker.add_provider(Box::new(Arc::clone(&provider)));
            Some(provider)
        }
        Err(_) => None,
    };

    Ok(browser)
}

fn display_verdict(verdict: &ReconciledVerdict) {
    let icon = match verdict.available {
        Some(true) => "✅",
        Some(false) => "❌",
        None => "❓",
    };

    println!("{} {}", icon, verdict.domain);
    println!(
        "   status: {}  confidence: {:.0}%",
        verdict.status,
        verdict.confidence * 100.0
    );
    if verdict.conflicting_results {
        println!("   ⚠️  sources disagreed");
    }

    for source in &verdict.sources {
        display_source(source);
    }
    println!();
}

fn display_source(source: &SourceResult) {
    match &source.error {
        Some(error) => println!("   • {} — error: {}", source.source, error),
        None => {
            let answer = match source.available {
                Some(true) => "available",
                Some(false) => "taken",
                None => "undetermined",
            };
            let mut line = format!(
                "   • {} — {} ({:.0}%)",
                source.source,
                answer,
                source.confidence * 100.0
            );
            if let Some(price) = source.details.get("price") {
                line.push_str(&format!(", price {}", price));
            }
            println!("{}", line);
        }
    }
}

fn print_help() {
    println!("Domain Verdict - multi-source domain availability checking");
    println!();
    println!("USAGE:");
    println!("    domain-verdict [DOMAIN]...");
    println!();
    println!("With no arguments a fixed set of known test domains is checked.");
    println!();
    println!("ENVIRONMENT:");
    println!("    GODADDY_API_KEY          GoDaddy API key");
    println!("    GODADDY_API_SECRET       GoDaddy API secret");
    println!("    GODADDY_USE_PRODUCTION   'true' (default) or 'false' for the OTE endpoint");
    println!("    WEBDRIVER_URL            WebDriver endpoint for the browser provider");
    println!();
    println!("Variables can also be supplied via a .env file.");
}
