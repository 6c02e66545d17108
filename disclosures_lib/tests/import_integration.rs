use std::collections::BTreeMap;

use disclosures_lib::{Db, ImportCounts, ImportOutcome};
use disclosures_scrape::{
    ContributionRecord, ExpenditureRecord, ParsedEntity, ParsedLobbyistEntity, ParsedOfficer,
    ParsedPrincipal, ParsedReport,
};
use rust_decimal::Decimal;

fn contribution(name: &str, cents: i64) -> ContributionRecord {
    ContributionRecord {
        date: chrono::NaiveDate::from_ymd_opt(2024, 3, 15),
        date_raw: "3/15/2024".to_string(),
        contributor_name: name.to_string(),
        address: "123 S Main St, Salt Lake City, UT 84101".to_string(),
        amount: Decimal::new(cents, 2),
        is_in_kind: false,
        is_loan: false,
        is_amendment: false,
    }
}

fn expenditure(name: &str, cents: i64) -> ExpenditureRecord {
    ExpenditureRecord {
        date: chrono::NaiveDate::from_ymd_opt(2024, 4, 2),
        date_raw: "4/2/2024".to_string(),
        recipient_name: name.to_string(),
        purpose: "Signs".to_string(),
        amount: Decimal::new(cents, 2),
        is_in_kind: false,
        is_loan: false,
        is_amendment: false,
    }
}

fn sample_report(contributions: Vec<ContributionRecord>) -> ParsedReport {
    let total: Decimal = contributions.iter().map(|c| c.amount).sum();
    ParsedReport {
        report_id: "198820".to_string(),
        source_url: "https://disclosures.utah.gov/Search/PublicSearch/Report/198820".to_string(),
        title: "Contributions and Expenditures For Political Action Committee".to_string(),
        organization_name: "Beehive Good Government PAC".to_string(),
        organization_type: "Political Action Committee".to_string(),
        report_type: "July 15th".to_string(),
        balance_beginning: Decimal::new(10000, 2),
        total_contributions: total,
        total_expenditures: Decimal::new(7500, 2),
        balance_ending: Decimal::new(10000, 2) + total - Decimal::new(7500, 2),
        contributions,
        expenditures: vec![expenditure("Mountain Printing", 4500), expenditure("Valley Media", 3000)],
        raw_metadata: BTreeMap::from([("Name".to_string(), "Beehive Good Government PAC".to_string())]),
        ..ParsedReport::default()
    }
}

fn new_db() -> Db {
    let db = Db::open_in_memory().unwrap();
    db.init().unwrap();
    db
}

fn child_count(db: &Db, table: &str, report_id: &str) -> i64 {
    db.conn()
        .query_row(
            &format!("SELECT COUNT(*) FROM {table} WHERE report_id = ?1"),
            [report_id],
            |row| row.get(0),
        )
        .unwrap()
}

#[test]
fn insert_then_skip_without_update() {
    let mut db = new_db();
    let report = sample_report(vec![
        contribution("Jane Doe", 5000),
        contribution("John Roe", 2500),
        contribution("Desert Holdings LLC", 7500),
    ]);

    let outcome = db.import_report(&report, false).unwrap();
    assert_eq!(
        outcome,
        ImportOutcome::Inserted(ImportCounts {
            contributions: 3,
            expenditures: 2,
            ..ImportCounts::default()
        })
    );
    assert!(db.report_exists("198820").unwrap());

    // Second import without update: zero writes
    let before: String = db
        .conn()
        .query_row(
            "SELECT updated_at FROM reports WHERE report_id = '198820'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(
        db.import_report(&report, false).unwrap(),
        ImportOutcome::SkippedExists
    );
    let after: String = db
        .conn()
        .query_row(
            "SELECT updated_at FROM reports WHERE report_id = '198820'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(before, after);
    assert_eq!(child_count(&db, "contributions", "198820"), 3);
}

#[test]
fn update_replaces_children_exactly() {
    let mut db = new_db();
    db.import_report(
        &sample_report(vec![
            contribution("Jane Doe", 5000),
            contribution("John Roe", 2500),
            contribution("Desert Holdings LLC", 7500),
        ]),
        false,
    )
    .unwrap();

    // Amended filing carries four contributions
    let amended = sample_report(vec![
        contribution("Jane Doe", 5000),
        contribution("John Roe", 2500),
        contribution("Desert Holdings LLC", 7500),
        contribution("New Donor", 10000),
    ]);
    let outcome = db.import_report(&amended, true).unwrap();
    assert_eq!(
        outcome,
        ImportOutcome::Updated(ImportCounts {
            contributions: 4,
            expenditures: 2,
            ..ImportCounts::default()
        })
    );
    assert_eq!(child_count(&db, "contributions", "198820"), 4);
    assert_eq!(child_count(&db, "expenditures", "198820"), 2);

    let total: String = db
        .conn()
        .query_row(
            "SELECT total_contributions FROM reports WHERE report_id = '198820'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(total, "250.00");
}

#[test]
fn reimport_is_idempotent() {
    let mut db = new_db();
    let report = sample_report(vec![contribution("Jane Doe", 5000)]);
    db.import_report(&report, false).unwrap();
    db.import_report(&report, true).unwrap();
    db.import_report(&report, true).unwrap();

    assert_eq!(child_count(&db, "contributions", "198820"), 1);
    let (name, amount): (String, String) = db
        .conn()
        .query_row(
            "SELECT contributor_name, amount FROM contributions WHERE report_id = '198820'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(name, "Jane Doe");
    assert_eq!(amount, "50.00");
}

#[test]
fn failed_update_rolls_back_to_prior_state() {
    let mut db = new_db();
    db.import_report(
        &sample_report(vec![
            contribution("Jane Doe", 5000),
            contribution("John Roe", 2500),
            contribution("Desert Holdings LLC", 7500),
        ]),
        false,
    )
    .unwrap();

    // Force a mid-transaction failure on a marker row
    db.conn()
        .execute_batch(
            "CREATE TRIGGER poison_contribution BEFORE INSERT ON contributions
             WHEN NEW.contributor_name = 'POISON'
             BEGIN SELECT RAISE(ABORT, 'poison row'); END;",
        )
        .unwrap();

    let mut bad = sample_report(vec![
        contribution("Jane Doe", 5000),
        contribution("POISON", 1),
    ]);
    bad.organization_name = "Renamed PAC".to_string();
    assert!(db.import_report(&bad, true).is_err());

    // Parent scalars and all three original children survive untouched
    let name: String = db
        .conn()
        .query_row(
            "SELECT organization_name FROM reports WHERE report_id = '198820'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(name, "Beehive Good Government PAC");
    assert_eq!(child_count(&db, "contributions", "198820"), 3);
    assert_eq!(child_count(&db, "expenditures", "198820"), 2);
}

#[test]
fn entity_officers_replaced_in_order() {
    let mut db = new_db();
    let officer = |name: &str, treasurer: bool| ParsedOfficer {
        name: name.to_string(),
        title: "Officer".to_string(),
        is_treasurer: treasurer,
        ..ParsedOfficer::default()
    };
    let mut entity = ParsedEntity {
        entity_id: "1414358".to_string(),
        source_url: "https://disclosures.utah.gov/Registration/EntityDetails/1414358".to_string(),
        name: "Utah Example PAC".to_string(),
        entity_type: "Political Action Committee".to_string(),
        officers: vec![officer("Alice Anders", false), officer("Bob Baker", true)],
        ..ParsedEntity::default()
    };

    let outcome = db.import_entity(&entity, false).unwrap();
    assert_eq!(
        outcome,
        ImportOutcome::Inserted(ImportCounts {
            officers: 2,
            ..ImportCounts::default()
        })
    );

    entity.officers = vec![officer("Cara Cole", true)];
    db.import_entity(&entity, true).unwrap();

    let rows: Vec<(String, i64, bool)> = db
        .conn()
        .prepare("SELECT name, position, is_treasurer FROM entity_officers WHERE entity_id = '1414358' ORDER BY position")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows, vec![("Cara Cole".to_string(), 0, true)]);
}

#[test]
fn lobbyist_entity_principals_imported() {
    let mut db = new_db();
    let entity = ParsedLobbyistEntity {
        entity_id: "1410867".to_string(),
        source_url: "https://lobbyist.utah.gov/Registration/EntityDetails/1410867".to_string(),
        name: "Pat Quill".to_string(),
        first_name: "Pat".to_string(),
        last_name: "Quill".to_string(),
        principals: vec![
            ParsedPrincipal {
                name: "Acme Corp".to_string(),
                contact: "Jo Contact".to_string(),
            },
            ParsedPrincipal {
                name: "Widget Assn".to_string(),
                contact: String::new(),
            },
        ],
        ..ParsedLobbyistEntity::default()
    };

    let outcome = db.import_lobbyist_entity(&entity, false).unwrap();
    assert_eq!(
        outcome,
        ImportOutcome::Inserted(ImportCounts {
            principals: 2,
            ..ImportCounts::default()
        })
    );
    assert!(db.lobbyist_entity_exists("1410867").unwrap());
    assert!(db.lobbyist_entity_scraped_within("1410867", 30).unwrap());
}
