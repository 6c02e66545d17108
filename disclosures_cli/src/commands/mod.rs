//! CLI subcommand implementations, one module per item kind.

pub mod entities;
pub mod lobbyist_entities;
pub mod lobbyist_reports;
pub mod reports;

use std::path::Path;

use anyhow::{bail, Result};
use disclosures_lib::disclosures_scrape::ScrapeClient;
use disclosures_lib::{CrawlConfig, CrawlTarget, Crawler, Db, StopReason};

const CAMPAIGN_BASE_URL: &str = "https://disclosures.utah.gov";
const LOBBYIST_BASE_URL: &str = "https://lobbyist.utah.gov";

/// Client pointing at the production sites unless overridden via
/// environment, which the integration setup uses to aim at a local mock.
pub(crate) fn scrape_client() -> ScrapeClient {
    let campaign = std::env::var("DISCLOSURES_CAMPAIGN_BASE_URL")
        .unwrap_or_else(|_| CAMPAIGN_BASE_URL.to_string());
    let lobbyist = std::env::var("DISCLOSURES_LOBBYIST_BASE_URL")
        .unwrap_or_else(|_| LOBBYIST_BASE_URL.to_string());
    ScrapeClient::with_base_urls(&campaign, &lobbyist)
}

pub(crate) fn open_db(path: &Path) -> Result<Db> {
    let db = Db::open(path)?;
    db.init()?;
    Ok(db)
}

/// Runs a crawl with Ctrl-C wired to the interrupt flag. An interrupt is
/// a normal exit; only a fatal stop is an error.
pub(crate) async fn drive_crawl<T: CrawlTarget>(config: CrawlConfig, target: &mut T) -> Result<()> {
    let crawler = Crawler::new(config)?;

    let flag = crawler.interrupt_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupt received; finishing the current item...");
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
        }
    });

    let summary = crawler.run(target).await;
    eprintln!("{summary}");
    if summary.stopped == StopReason::Fatal {
        bail!("crawl aborted on repeated storage failures");
    }
    Ok(())
}

/// Resolves an ID-or-URL argument: the page URL to fetch plus the bare ID.
pub(crate) fn resolve_item(
    input: &str,
    default_url: impl FnOnce(&str) -> String,
) -> Result<(String, String)> {
    let id = disclosures_lib::validation::parse_item_ref(input)?;
    let url = if input.starts_with("http") {
        input.trim_end_matches('/').to_string()
    } else {
        default_url(&id)
    };
    Ok((id, url))
}
