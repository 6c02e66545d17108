//! Concrete crawl targets: one per item kind, each combining the fetch
//! client, its parser, and the import engine.
//!
//! Every target follows the same shape: existence gate first (skips cost
//! no HTTP request), then fetch, parse, validity check, import. Stored
//! items are skipped unless `update_existing` is set, and `skip_existing`
//! wins over `update_existing` when both are given. A 404 and a
//! placeholder page are both `Invalid` because on these sites an unused
//! ID can render either way.

use disclosures_scrape::{
    parse_entity, parse_lobbyist_entity, parse_lobbyist_report, parse_report, FetchError,
    ScrapeClient,
};

use crate::crawl::{CrawlConfig, CrawlTarget, ItemOutcome};
use crate::db::Db;
use crate::import::ImportOutcome;

/// Registrations scraped again only after this many days.
pub const ENTITY_REFRESH_DAYS: i64 = 30;

fn outcome(result: Result<ImportOutcome, crate::db::DbError>) -> ItemOutcome {
    match result {
        Ok(ImportOutcome::Inserted(counts)) => ItemOutcome::Imported(counts),
        Ok(ImportOutcome::Updated(counts)) => ItemOutcome::Updated(counts),
        Ok(ImportOutcome::SkippedExists) => ItemOutcome::SkippedExisting,
        Err(e) => ItemOutcome::StorageFailed(e.to_string()),
    }
}

pub struct ReportTarget<'a> {
    client: &'a ScrapeClient,
    db: &'a mut Db,
}

impl<'a> ReportTarget<'a> {
    pub fn new(client: &'a ScrapeClient, db: &'a mut Db) -> Self {
        Self { client, db }
    }
}

impl CrawlTarget for ReportTarget<'_> {
    fn label(&self) -> &'static str {
        "report"
    }

    async fn process(&mut self, id: u64, config: &CrawlConfig) -> ItemOutcome {
        let id = id.to_string();
        match self.db.report_exists(&id) {
            Ok(true) if config.skip_existing || !config.update_existing => {
                return ItemOutcome::SkippedExisting
            }
            Ok(_) => {}
            Err(e) => return ItemOutcome::StorageFailed(e.to_string()),
        }
        let html = match self.client.report_page(&id).await {
            Ok(html) => html,
            Err(FetchError::NotFound) => return ItemOutcome::Invalid,
            Err(e) => return ItemOutcome::FetchFailed(e.to_string()),
        };
        let parsed = match parse_report(&html, &id, &self.client.report_url(&id)) {
            Ok(parsed) => parsed,
            Err(e) => return ItemOutcome::ParseFailed(e.to_string()),
        };
        if !parsed.has_data() {
            return ItemOutcome::Invalid;
        }
        outcome(self.db.import_report(&parsed, config.update_existing))
    }
}

pub struct LobbyistReportTarget<'a> {
    client: &'a ScrapeClient,
    db: &'a mut Db,
}

impl<'a> LobbyistReportTarget<'a> {
    pub fn new(client: &'a ScrapeClient, db: &'a mut Db) -> Self {
        Self { client, db }
    }
}

impl CrawlTarget for LobbyistReportTarget<'_> {
    fn label(&self) -> &'static str {
        "lobbyist report"
    }

    async fn process(&mut self, id: u64, config: &CrawlConfig) -> ItemOutcome {
        let id = id.to_string();
        match self.db.lobbyist_report_exists(&id) {
            Ok(true) if config.skip_existing || !config.update_existing => {
                return ItemOutcome::SkippedExisting
            }
            Ok(_) => {}
            Err(e) => return ItemOutcome::StorageFailed(e.to_string()),
        }
        let html = match self.client.lobbyist_report_page(&id).await {
            Ok(html) => html,
            Err(FetchError::NotFound) => return ItemOutcome::Invalid,
            Err(e) => return ItemOutcome::FetchFailed(e.to_string()),
        };
        let parsed =
            match parse_lobbyist_report(&html, &id, &self.client.lobbyist_report_url(&id)) {
                Ok(parsed) => parsed,
                Err(e) => return ItemOutcome::ParseFailed(e.to_string()),
            };
        if !parsed.has_data() {
            return ItemOutcome::Invalid;
        }
        outcome(self.db.import_lobbyist_report(&parsed, config.update_existing))
    }
}

pub struct EntityTarget<'a> {
    client: &'a ScrapeClient,
    db: &'a mut Db,
}

impl<'a> EntityTarget<'a> {
    pub fn new(client: &'a ScrapeClient, db: &'a mut Db) -> Self {
        Self { client, db }
    }
}

impl CrawlTarget for EntityTarget<'_> {
    fn label(&self) -> &'static str {
        "entity"
    }

    async fn process(&mut self, id: u64, config: &CrawlConfig) -> ItemOutcome {
        let id = id.to_string();
        match self.db.entity_exists(&id) {
            Ok(true) if config.skip_existing || !config.update_existing => {
                return ItemOutcome::SkippedExisting
            }
            Ok(true) => match self.db.entity_scraped_within(&id, ENTITY_REFRESH_DAYS) {
                Ok(true) => return ItemOutcome::SkippedFresh,
                Ok(false) => {}
                Err(e) => return ItemOutcome::StorageFailed(e.to_string()),
            },
            Ok(false) => {}
            Err(e) => return ItemOutcome::StorageFailed(e.to_string()),
        }
        let html = match self.client.entity_page(&id).await {
            Ok(html) => html,
            Err(FetchError::NotFound) => return ItemOutcome::Invalid,
            Err(e) => return ItemOutcome::FetchFailed(e.to_string()),
        };
        let parsed = match parse_entity(&html, &id, &self.client.entity_url(&id)) {
            Ok(parsed) => parsed,
            Err(e) => return ItemOutcome::ParseFailed(e.to_string()),
        };
        outcome(self.db.import_entity(&parsed, config.update_existing))
    }
}

pub struct LobbyistEntityTarget<'a> {
    client: &'a ScrapeClient,
    db: &'a mut Db,
}

impl<'a> LobbyistEntityTarget<'a> {
    pub fn new(client: &'a ScrapeClient, db: &'a mut Db) -> Self {
        Self { client, db }
    }
}

impl CrawlTarget for LobbyistEntityTarget<'_> {
    fn label(&self) -> &'static str {
        "lobbyist entity"
    }

    async fn process(&mut self, id: u64, config: &CrawlConfig) -> ItemOutcome {
        let id = id.to_string();
        match self.db.lobbyist_entity_exists(&id) {
            Ok(true) if config.skip_existing || !config.update_existing => {
                return ItemOutcome::SkippedExisting
            }
            Ok(true) => match self
                .db
                .lobbyist_entity_scraped_within(&id, ENTITY_REFRESH_DAYS)
            {
                Ok(true) => return ItemOutcome::SkippedFresh,
                Ok(false) => {}
                Err(e) => return ItemOutcome::StorageFailed(e.to_string()),
            },
            Ok(false) => {}
            Err(e) => return ItemOutcome::StorageFailed(e.to_string()),
        }
        let html = match self.client.lobbyist_entity_page(&id).await {
            Ok(html) => html,
            Err(FetchError::NotFound) => return ItemOutcome::Invalid,
            Err(e) => return ItemOutcome::FetchFailed(e.to_string()),
        };
        let parsed =
            match parse_lobbyist_entity(&html, &id, &self.client.lobbyist_entity_url(&id)) {
                Ok(parsed) => parsed,
                Err(e) => return ItemOutcome::ParseFailed(e.to_string()),
            };
        outcome(self.db.import_lobbyist_entity(&parsed, config.update_existing))
    }
}
