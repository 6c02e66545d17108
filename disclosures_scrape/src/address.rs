//! Best-effort postal address splitting.
//!
//! The pages render addresses as free text. The comma-split heuristic here
//! covers the common "street, city, ST 84xxx" shape; anything else falls
//! back to leaving components empty. Callers must treat every field as
//! optional.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// The two-letter codes accepted in the state position, including DC and
/// territories.
pub const VALID_STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY", "DC", "PR", "VI", "GU", "AS", "MP",
];

/// Components recovered from a free-text address. Empty strings mean the
/// component was not recognized, never that it was absent from the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddressParts {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl AddressParts {
    /// Whether the address resolves outside Utah. `None` when no valid
    /// state code was recovered; absence of evidence is not out-of-state.
    pub fn is_out_of_state(&self) -> Option<bool> {
        if VALID_STATES.contains(&self.state.as_str()) {
            Some(self.state != "UT")
        } else {
            None
        }
    }
}

fn state_zip() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Z]{2})\s+(\d{5}(?:-\d{4})?)").expect("static regex"))
}

/// Splits a free-text address on commas.
///
/// Three or more parts parse as `street, city, "ST zip"`; exactly two as
/// `city, "ST zip"`. One part or an unmatched state/ZIP tail leaves the
/// corresponding fields empty.
pub fn parse_address(raw: &str) -> AddressParts {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let mut result = AddressParts::default();

    let tail = match parts.len() {
        n if n >= 3 => {
            result.street_address = parts[0].to_string();
            result.city = parts[1].to_string();
            Some(parts[2])
        }
        2 => {
            result.city = parts[0].to_string();
            Some(parts[1])
        }
        _ => None,
    };
    if let Some(tail) = tail {
        if let Some(caps) = state_zip().captures(tail) {
            result.state = caps[1].to_string();
            result.zip_code = caps[2].to_string();
        }
    }
    result
}
