//! Error types for fetching and parsing disclosure pages.

use reqwest::StatusCode;

/// Errors raised while fetching a page over HTTP.
///
/// A 404 gets its own variant because the crawl driver treats "no such
/// item" differently from a transport failure when logging, even though
/// both count toward the consecutive-failure streak.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("page not found")]
    NotFound,
    #[error("unexpected status {status}")]
    Status { status: StatusCode, body: String },
}

/// Errors raised while parsing a fetched page.
///
/// Malformed *data* inside an otherwise recognizable page never produces a
/// `ParseError`; extractors map bad cells to absent/default values. This
/// error means the page as a whole had nothing usable.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    /// No metadata labels, no balance summary, and no classified tables.
    /// Distinct from a valid report that simply has zero line items.
    #[error("page contains no recognizable disclosure content")]
    EmptyPage,
}
