//! Error type for the library layer.

use std::fmt;

use disclosures_scrape::{FetchError, ParseError};

use crate::db::DbError;

/// Errors produced by the library layer, wrapping fetch, parse, and
/// storage failures and adding input validation.
#[derive(Debug)]
pub enum DisclosuresError {
    /// A page fetch failed.
    Fetch(FetchError),
    /// A fetched page could not be parsed.
    Parse(ParseError),
    /// A database operation failed.
    Db(DbError),
    /// User-provided input failed validation.
    InvalidInput(String),
    /// The item already exists and updating was not requested.
    AlreadyExists(String),
}

impl fmt::Display for DisclosuresError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "Fetch error: {}", e),
            Self::Parse(e) => write!(f, "Parse error: {}", e),
            Self::Db(e) => write!(f, "Database error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::AlreadyExists(id) => {
                write!(f, "{} already exists; pass --update to overwrite", id)
            }
        }
    }
}

impl std::error::Error for DisclosuresError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Db(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FetchError> for DisclosuresError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

impl From<ParseError> for DisclosuresError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<DbError> for DisclosuresError {
    fn from(e: DbError) -> Self {
        Self::Db(e)
    }
}
