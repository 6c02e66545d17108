//! Sequential crawl driver.
//!
//! IDs on the source sites are dense but not contiguous, so the driver
//! walks an ID range one item at a time and stops on a streak of
//! consecutive failures rather than the first miss. Storage failures are
//! tracked on a separate, much shorter fuse: a broken database looks
//! nothing like running off the end of the data.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::DisclosuresError;
use crate::import::ImportCounts;
use crate::validation::{validate_delay, validate_max_failures, validate_range};

/// Parameters for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// First ID to process.
    pub start: u64,
    /// Last ID to process, inclusive. `None` runs until a stop condition.
    pub end: Option<u64>,
    /// Seconds to wait between items.
    pub delay: f64,
    /// Consecutive non-storage failures that end the crawl.
    pub max_failures: u32,
    /// Disable the failure-streak stop, for ranges known to be sparse.
    pub ignore_failure_streak: bool,
    /// Skip IDs already in the database without fetching them.
    pub skip_existing: bool,
    /// Re-fetch and replace existing items (entities honor the staleness
    /// gate first).
    pub update_existing: bool,
    /// Consecutive storage failures treated as fatal.
    pub max_storage_failures: u32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start: 1,
            end: None,
            delay: 1.0,
            max_failures: 10,
            ignore_failure_streak: false,
            skip_existing: false,
            update_existing: false,
            max_storage_failures: 3,
        }
    }
}

impl CrawlConfig {
    pub fn validate(&self) -> Result<(), DisclosuresError> {
        validate_delay(self.delay)?;
        validate_max_failures(self.max_failures)?;
        validate_max_failures(self.max_storage_failures)?;
        validate_range(self.start, self.end)?;
        Ok(())
    }
}

/// What happened to a single ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Imported(ImportCounts),
    Updated(ImportCounts),
    /// Already stored and updating was not requested.
    SkippedExisting,
    /// Already stored and scraped recently enough to leave alone.
    SkippedFresh,
    /// The page exists but holds no real data (placeholder for an unused
    /// ID). Counts toward the failure streak.
    Invalid,
    FetchFailed(String),
    ParseFailed(String),
    StorageFailed(String),
}

/// One kind of crawlable item. Implementations combine a fetch client, a
/// parser, and the import engine.
#[allow(async_fn_in_trait)]
pub trait CrawlTarget {
    /// Item name for progress lines, e.g. "report".
    fn label(&self) -> &'static str;

    async fn process(&mut self, id: u64, config: &CrawlConfig) -> ItemOutcome;
}

/// Why a crawl ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Walked the whole configured range.
    ReachedEnd,
    /// `max_failures` consecutive misses; presumed end of data.
    FailureStreak,
    /// Interrupt flag set; the in-flight item completed first.
    Interrupted,
    /// Consecutive storage failures; the database needs attention.
    Fatal,
}

/// Final accounting for a crawl. Emitted on every terminal path.
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub imported: u64,
    pub updated: u64,
    pub skipped: u64,
    pub failed: u64,
    /// Last ID actually processed; `None` when the crawl stopped before
    /// its first item.
    pub last_id: Option<u64>,
    pub elapsed: Duration,
    pub stopped: StopReason,
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.stopped {
            StopReason::ReachedEnd => "reached end of range",
            StopReason::FailureStreak => "consecutive failure limit",
            StopReason::Interrupted => "interrupted",
            StopReason::Fatal => "fatal storage error",
        };
        write!(
            f,
            "imported {}, updated {}, skipped {}, failed {} (last ID {}, {:.1}s): {}",
            self.imported,
            self.updated,
            self.skipped,
            self.failed,
            self.last_id
                .map_or_else(|| "none".to_string(), |id| id.to_string()),
            self.elapsed.as_secs_f64(),
            reason
        )
    }
}

/// Drives a [`CrawlTarget`] over an ID range.
pub struct Crawler {
    config: CrawlConfig,
    interrupt: Arc<AtomicBool>,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Result<Self, DisclosuresError> {
        config.validate()?;
        Ok(Self {
            config,
            interrupt: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag to set from a Ctrl-C handler. Checked between items; setting
    /// it never abandons an item mid-import.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    pub async fn run<T: CrawlTarget>(&self, target: &mut T) -> CrawlSummary {
        let started = Instant::now();
        let mut summary = CrawlSummary {
            imported: 0,
            updated: 0,
            skipped: 0,
            failed: 0,
            last_id: None,
            elapsed: Duration::ZERO,
            stopped: StopReason::ReachedEnd,
        };
        let mut failure_streak: u32 = 0;
        let mut storage_streak: u32 = 0;
        let mut cursor = self.config.start;
        let label = target.label();

        tracing::info!(
            label,
            start = self.config.start,
            end = ?self.config.end,
            "starting crawl"
        );

        loop {
            if self.interrupted() {
                summary.stopped = StopReason::Interrupted;
                break;
            }
            if self.config.end.is_some_and(|end| cursor > end) {
                summary.stopped = StopReason::ReachedEnd;
                break;
            }

            let outcome = target.process(cursor, &self.config).await;
            summary.last_id = Some(cursor);

            match &outcome {
                ItemOutcome::Imported(counts) => {
                    summary.imported += 1;
                    failure_streak = 0;
                    storage_streak = 0;
                    tracing::info!(label, id = cursor, rows = counts.contributions
                        + counts.expenditures
                        + counts.officers
                        + counts.principals, "imported");
                }
                ItemOutcome::Updated(counts) => {
                    summary.updated += 1;
                    failure_streak = 0;
                    storage_streak = 0;
                    tracing::info!(label, id = cursor, rows = counts.contributions
                        + counts.expenditures
                        + counts.officers
                        + counts.principals, "updated");
                }
                ItemOutcome::SkippedExisting | ItemOutcome::SkippedFresh => {
                    summary.skipped += 1;
                    failure_streak = 0;
                    storage_streak = 0;
                    tracing::debug!(label, id = cursor, "skipped");
                }
                ItemOutcome::Invalid => {
                    summary.failed += 1;
                    failure_streak += 1;
                    storage_streak = 0;
                    tracing::debug!(label, id = cursor, streak = failure_streak, "no data");
                }
                ItemOutcome::FetchFailed(msg) | ItemOutcome::ParseFailed(msg) => {
                    summary.failed += 1;
                    failure_streak += 1;
                    storage_streak = 0;
                    tracing::warn!(label, id = cursor, streak = failure_streak, error = %msg, "failed");
                }
                ItemOutcome::StorageFailed(msg) => {
                    summary.failed += 1;
                    storage_streak += 1;
                    tracing::error!(label, id = cursor, streak = storage_streak, error = %msg, "storage failure");
                }
            }

            if storage_streak >= self.config.max_storage_failures {
                summary.stopped = StopReason::Fatal;
                break;
            }
            if !self.config.ignore_failure_streak && failure_streak >= self.config.max_failures {
                tracing::info!(
                    label,
                    last_id = cursor,
                    streak = failure_streak,
                    "failure streak reached; assuming end of data"
                );
                summary.stopped = StopReason::FailureStreak;
                break;
            }

            cursor += 1;
            self.sleep_between_items().await;
        }

        summary.elapsed = started.elapsed();
        tracing::info!(label, %summary, "crawl finished");
        summary
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::SeqCst)
    }

    /// Sleeps the configured delay in short slices so an interrupt takes
    /// effect promptly instead of after a long delay.
    async fn sleep_between_items(&self) {
        let mut remaining = Duration::from_secs_f64(self.config.delay);
        const SLICE: Duration = Duration::from_millis(200);
        while !remaining.is_zero() && !self.interrupted() {
            let chunk = remaining.min(SLICE);
            tokio::time::sleep(chunk).await;
            remaining -= chunk;
        }
    }
}
