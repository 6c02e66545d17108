//! User-Agent resolution for outbound requests.

const DEFAULT_USER_AGENT: &str =
    "UtahDisclosuresBot/1.0 (Utah Political Finance Data Aggregator)";

/// Returns the User-Agent to send with every request.
///
/// Operators can override the default bot identifier with the
/// `DISCLOSURES_USER_AGENT` environment variable.
pub fn get_user_agent() -> String {
    std::env::var("DISCLOSURES_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string())
}
