//! `import-entity` and `crawl-entities`.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use disclosures_lib::disclosures_scrape::parse_entity;
use disclosures_lib::{CrawlConfig, DisclosuresError, EntityTarget, ImportOutcome};

use super::{drive_crawl, open_db, resolve_item, scrape_client};

#[derive(Args)]
pub struct ImportArgs {
    /// Entity ID or full registration URL
    pub entity: String,

    /// Replace the entity if it is already stored
    #[arg(long)]
    pub update: bool,

    /// Print the parsed entity as JSON before importing
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CrawlArgs {
    /// First entity ID
    #[arg(long, default_value = "1")]
    pub start: u64,

    /// Last entity ID, inclusive
    #[arg(long)]
    pub end: Option<u64>,

    /// Seconds between requests
    #[arg(long, default_value = "2.0")]
    pub delay: f64,

    /// Stop after this many consecutive missing entities
    #[arg(long, default_value = "50")]
    pub max_failures: u32,

    /// Keep going through failure streaks (for sparse ID ranges)
    #[arg(long)]
    pub ignore_failure_streak: bool,

    /// Skip entities already in the database
    #[arg(long)]
    pub skip_existing: bool,

    /// Re-scrape stored entities not refreshed in the last 30 days
    #[arg(long)]
    pub update_existing: bool,
}

pub async fn run_import(args: &ImportArgs, db_path: &Path) -> Result<()> {
    let client = scrape_client();
    let (id, url) = resolve_item(&args.entity, |id| client.entity_url(id))?;
    let mut db = open_db(db_path)?;

    if db.entity_exists(&id)? && !args.update {
        return Err(DisclosuresError::AlreadyExists(format!("Entity {id}")).into());
    }

    eprintln!("Fetching entity from {url}");
    let html = client.fetch_url(&url).await?;
    let entity = parse_entity(&html, &id, &url)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&entity)?);
    }

    match db.import_entity(&entity, args.update)? {
        ImportOutcome::Inserted(counts) => {
            eprintln!(
                "Imported entity {id}: {} ({} officers)",
                entity.name, counts.officers
            );
        }
        ImportOutcome::Updated(counts) => {
            eprintln!(
                "Updated entity {id}: {} ({} officers)",
                entity.name, counts.officers
            );
        }
        ImportOutcome::SkippedExists => {
            return Err(DisclosuresError::AlreadyExists(format!("Entity {id}")).into());
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
        update_existing: args.update_existing,
        ..CrawlConfig::default()
    };
    let client = scrape_client();
    let mut db = open_db(db_path)?;
    drive_crawl(config, &mut EntityTarget::new(&client, &mut db)).await
}
