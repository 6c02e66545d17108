//! Full pipeline over a mock server: fetch, parse, import, re-crawl.

use disclosures_lib::{CrawlConfig, Crawler, Db, ReportTarget, StopReason};
use disclosures_scrape::ScrapeClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn new_db() -> Db {
    let db = Db::open_in_memory().unwrap();
    db.init().unwrap();
    db
}

async fn mount_report(server: &MockServer, id: u64, fixture: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/Search/PublicSearch/Report/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture(fixture)))
        .mount(server)
        .await;
}

fn config(end: u64) -> CrawlConfig {
    CrawlConfig {
        end: Some(end),
        delay: 0.0,
        ..CrawlConfig::default()
    }
}

#[tokio::test]
async fn crawl_imports_fixture_report() {
    let server = MockServer::start().await;
    mount_report(&server, 1, "report_original.html").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = ScrapeClient::with_base_urls(&server.uri(), &server.uri());
    let mut db = new_db();

    let crawler = Crawler::new(config(3)).unwrap();
    let summary = crawler.run(&mut ReportTarget::new(&client, &mut db)).await;

    assert_eq!(summary.stopped, StopReason::ReachedEnd);
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.failed, 2);

    let (org, total, contributions): (String, String, i64) = db
        .conn()
        .query_row(
            "SELECT organization_name, total_contributions,
                    (SELECT COUNT(*) FROM contributions WHERE report_id = reports.report_id)
             FROM reports WHERE report_id = '1'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(org, "Beehive Good Government PAC");
    assert_eq!(total, "150.00");
    assert_eq!(contributions, 3);
}

#[tokio::test]
async fn recrawl_skips_then_update_replaces() {
    let server = MockServer::start().await;
    mount_report(&server, 1, "report_original.html").await;

    let client = ScrapeClient::with_base_urls(&server.uri(), &server.uri());
    let mut db = new_db();

    let crawler = Crawler::new(config(1)).unwrap();
    let summary = crawler.run(&mut ReportTarget::new(&client, &mut db)).await;
    assert_eq!(summary.imported, 1);

    // Second pass without update: no fetch, no writes
    let requests_before = server.received_requests().await.unwrap().len();
    let summary = crawler.run(&mut ReportTarget::new(&client, &mut db)).await;
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.imported, 0);
    assert_eq!(
        server.received_requests().await.unwrap().len(),
        requests_before
    );

    // The amended filing lands; an update pass replaces the children
    server.reset().await;
    mount_report(&server, 1, "report_amended.html").await;
    let crawler = Crawler::new(CrawlConfig {
        update_existing: true,
        ..config(1)
    })
    .unwrap();
    let summary = crawler.run(&mut ReportTarget::new(&client, &mut db)).await;
    assert_eq!(summary.updated, 1);

    let (total, contributions): (String, i64) = db
        .conn()
        .query_row(
            "SELECT total_contributions,
                    (SELECT COUNT(*) FROM contributions WHERE report_id = reports.report_id)
             FROM reports WHERE report_id = '1'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(total, "250.00");
    assert_eq!(contributions, 4);

    let amended: bool = db
        .conn()
        .query_row(
            "SELECT is_amendment FROM contributions
             WHERE report_id = '1' AND contributor_name = 'New Donor'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(amended);
}
