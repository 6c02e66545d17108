//! Library layer for the Utah disclosures importer: SQLite storage, the
//! import/upsert engine, the sequential crawl driver, and input validation.
//!
//! Fetching and parsing live in `disclosures_scrape`; this crate owns
//! everything that touches the database or drives a crawl.

pub mod crawl;
pub mod db;
pub mod error;
pub mod import;
pub mod targets;
pub mod validation;

pub use disclosures_scrape;

pub use crawl::{CrawlConfig, CrawlSummary, CrawlTarget, Crawler, ItemOutcome, StopReason};
pub use db::{Db, DbError};
pub use error::DisclosuresError;
pub use import::{ImportCounts, ImportOutcome};
pub use targets::{EntityTarget, LobbyistEntityTarget, LobbyistReportTarget, ReportTarget};
