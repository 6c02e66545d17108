//! `import-lobbyist-report` and `crawl-lobbyist-reports`.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use disclosures_lib::disclosures_scrape::parse_lobbyist_report;
use disclosures_lib::{CrawlConfig, DisclosuresError, ImportOutcome, LobbyistReportTarget};

use super::{drive_crawl, open_db, resolve_item, scrape_client};

#[derive(Args)]
pub struct ImportArgs {
    /// Report ID or full report URL
    pub report: String,

    /// Replace the report if it is already stored
    #[arg(long)]
    pub update: bool,

    /// Print the parsed report as JSON before importing
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CrawlArgs {
    /// First report ID
    #[arg(long, default_value = "1")]
    pub start: u64,

    /// Last report ID, inclusive
    #[arg(long)]
    pub end: Option<u64>,

    /// Seconds between requests
    #[arg(long, default_value = "1.0")]
    pub delay: f64,

    /// Stop after this many consecutive missing reports
    #[arg(long, default_value = "100")]
    pub max_failures: u32,

    /// Keep going through failure streaks (for sparse ID ranges)
    #[arg(long)]
    pub ignore_failure_streak: bool,

    /// Skip reports already in the database
    #[arg(long)]
    pub skip_existing: bool,
}

pub async fn run_import(args: &ImportArgs, db_path: &Path) -> Result<()> {
    let client = scrape_client();
    let (id, url) = resolve_item(&args.report, |id| client.lobbyist_report_url(id))?;
    let mut db = open_db(db_path)?;

    if db.lobbyist_report_exists(&id)? && !args.update {
        return Err(DisclosuresError::AlreadyExists(format!("Lobbyist report {id}")).into());
    }

    eprintln!("Fetching lobbyist report from {url}");
    let html = client.fetch_url(&url).await?;
    let report = parse_lobbyist_report(&html, &id, &url)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    match db.import_lobbyist_report(&report, args.update)? {
        ImportOutcome::Inserted(counts) => {
            eprintln!(
                "Imported lobbyist report {id}: {} ({} expenditures)",
                report.principal_name, counts.expenditures
            );
        }
        ImportOutcome::Updated(counts) => {
            eprintln!(
                "Updated lobbyist report {id}: {} ({} expenditures)",
                report.principal_name, counts.expenditures
            );
        }
        ImportOutcome::SkippedExists => {
            return Err(DisclosuresError::AlreadyExists(format!("Lobbyist report {id}")).into());
        }
    }
    Ok(())
}

pub async fn run_crawl(args: &CrawlArgs, db_path: &Path) -> Result<()> {
    let config = CrawlConfig {
        start: args.start,
        end: args.end,
        delay: args.delay,
        max_failures: args.max_failures,
        ignore_failure_streak: args.ignore_failure_streak,
        skip_existing: args.skip_existing,
        ..CrawlConfig::default()
    };
    let client = scrape_client();
    let mut db = open_db(db_path)?;
    drive_crawl(config, &mut LobbyistReportTarget::new(&client, &mut db)).await
}
