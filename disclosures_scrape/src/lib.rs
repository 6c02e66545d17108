//! Fetching and HTML parsing for Utah campaign-finance and lobbyist
//! disclosure pages.
//!
//! This crate turns the state's public report, entity, and lobbyist pages
//! into typed records. It performs no storage: callers get back a
//! `Parsed*` value (or a [`ParseError`]) and decide what to do with it.

pub mod address;
pub mod client;
pub mod entity;
pub mod errors;
pub mod extract;
pub mod lobbyist;
mod metadata;
pub mod report;
pub mod tables;
mod user_agent;

pub use self::address::{parse_address, AddressParts};
pub use self::client::ScrapeClient;
pub use self::entity::{
    parse_entity, parse_lobbyist_entity, ParsedEntity, ParsedLobbyistEntity, ParsedOfficer,
    ParsedPrincipal,
};
pub use self::errors::{FetchError, ParseError};
pub use self::lobbyist::{parse_lobbyist_report, LobbyistExpenditureRecord, ParsedLobbyistReport};
pub use self::report::{parse_report, ContributionRecord, ExpenditureRecord, ParsedReport};
