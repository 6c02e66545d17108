//! HTTP client for the Utah disclosure sites.

use std::time::Duration;

use crate::errors::FetchError;
use crate::user_agent::get_user_agent;

const CAMPAIGN_BASE_URL: &str = "https://disclosures.utah.gov";
const LOBBYIST_BASE_URL: &str = "https://lobbyist.utah.gov";

/// HTTP client for the campaign-finance and lobbyist disclosure sites.
///
/// Both sites share URL structure (`/Search/PublicSearch/Report/{id}` and
/// `/Registration/EntityDetails/{id}`) and differ only in host. Requests
/// go out with the configured User-Agent and a 30-second timeout.
pub struct ScrapeClient {
    http: reqwest::Client,
    campaign_base_url: String,
    lobbyist_base_url: String,
}

impl Default for ScrapeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrapeClient {
    /// Creates a client pointing at the production Utah sites.
    pub fn new() -> Self {
        Self::with_base_urls(CAMPAIGN_BASE_URL, LOBBYIST_BASE_URL)
    }

    /// Creates a client with custom base URLs. Used for testing with wiremock.
    pub fn with_base_urls(campaign: &str, lobbyist: &str) -> Self {
        Self {
            http: build_http_client(),
            campaign_base_url: campaign.trim_end_matches('/').to_string(),
            lobbyist_base_url: lobbyist.trim_end_matches('/').to_string(),
        }
    }

    pub fn report_url(&self, report_id: &str) -> String {
        format!("{}/Search/PublicSearch/Report/{report_id}", self.campaign_base_url)
    }

    pub fn entity_url(&self, entity_id: &str) -> String {
        format!("{}/Registration/EntityDetails/{entity_id}", self.campaign_base_url)
    }

    pub fn lobbyist_report_url(&self, report_id: &str) -> String {
        format!("{}/Search/PublicSearch/Report/{report_id}", self.lobbyist_base_url)
    }

    pub fn lobbyist_entity_url(&self, entity_id: &str) -> String {
        format!("{}/Registration/EntityDetails/{entity_id}", self.lobbyist_base_url)
    }

    /// Fetches a campaign-finance report page, returning the raw HTML.
    pub async fn report_page(&self, report_id: &str) -> Result<String, FetchError> {
        self.fetch_url(&self.report_url(report_id)).await
    }

    /// Fetches a campaign-finance entity registration page.
    pub async fn entity_page(&self, entity_id: &str) -> Result<String, FetchError> {
        self.fetch_url(&self.entity_url(entity_id)).await
    }

    /// Fetches a lobbyist expenditure report page.
    pub async fn lobbyist_report_page(&self, report_id: &str) -> Result<String, FetchError> {
        self.fetch_url(&self.lobbyist_report_url(report_id)).await
    }

    /// Fetches a lobbyist registration page.
    pub async fn lobbyist_entity_page(&self, entity_id: &str) -> Result<String, FetchError> {
        self.fetch_url(&self.lobbyist_entity_url(entity_id)).await
    }

    /// Fetches an arbitrary URL, for imports given an explicit page URL.
    pub async fn fetch_url(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(url, "fetching page");
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        let body = resp.text().await?;
        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!(%status, body = %snippet, "request failed");
            return Err(FetchError::Status {
                status,
                body: snippet,
            });
        }
        Ok(body)
    }
}

fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(get_user_agent())
        .timeout(Duration::from_secs(30))
        .build()
        // Builder only fails on TLS backend misconfiguration, which is a
        // build-environment problem, not a runtime one.
        .unwrap_or_default()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        return body.to_string();
    }
    // Back off to a char boundary; a fixed byte cut can split UTF-8
    let mut cut = MAX;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...[truncated]", &body[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_share_paths_across_hosts() {
        let client = ScrapeClient::with_base_urls("http://cf.test/", "http://lob.test");
        assert_eq!(
            client.report_url("198820"),
            "http://cf.test/Search/PublicSearch/Report/198820"
        );
        assert_eq!(
            client.lobbyist_entity_url("1410867"),
            "http://lob.test/Registration/EntityDetails/1410867"
        );
    }

    #[test]
    fn truncate_body_caps_length() {
        let long = "x".repeat(3000);
        let snippet = truncate_body(&long);
        assert!(snippet.ends_with("...[truncated]"));
        assert!(snippet.len() < long.len());
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn truncate_body_backs_off_mid_character() {
        // 'é' occupies bytes 1999..2001, straddling the cut point
        let long = format!("{}é{}", "x".repeat(1999), "y".repeat(500));
        let snippet = truncate_body(&long);
        assert!(snippet.ends_with("...[truncated]"));
        assert!(!snippet.contains('é'));
    }
}
