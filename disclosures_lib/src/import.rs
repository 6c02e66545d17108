//! Import/upsert engine: parsed pages in, rows out.
//!
//! Every import runs in a single transaction. Updates replace the child
//! set wholesale (delete then re-insert) rather than diffing; the source
//! page is the authority on what the child rows are. A failure anywhere
//! mid-import rolls the whole thing back.

use chrono::NaiveDate;
use rusqlite::{params, Transaction};

use disclosures_scrape::{ParsedEntity, ParsedLobbyistEntity, ParsedLobbyistReport, ParsedReport};

use crate::db::{now_timestamp, Db, DbError};

/// Child-row counts written by an import, for progress reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportCounts {
    pub contributions: usize,
    pub expenditures: usize,
    pub officers: usize,
    pub principals: usize,
}

/// What an import call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// New parent row plus children.
    Inserted(ImportCounts),
    /// Existing parent updated, children replaced.
    Updated(ImportCounts),
    /// Parent exists and updating was not requested; nothing written.
    SkippedExists,
}

fn iso(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.to_string())
}

impl Db {
    /// Imports a campaign-finance report and its line items.
    pub fn import_report(
        &mut self,
        report: &ParsedReport,
        update_existing: bool,
    ) -> Result<ImportOutcome, DbError> {
        let exists = self.report_exists(&report.report_id)?;
        if exists && !update_existing {
            return Ok(ImportOutcome::SkippedExists);
        }

        let raw = serde_json::to_string(&report.raw_metadata)?;
        let now = now_timestamp();
        let tx = self.conn.transaction()?;

        if exists {
            tx.execute(
                "UPDATE reports SET source_url = ?2, title = ?3, organization_name = ?4,
                        organization_type = ?5, report_type = ?6, begin_date = ?7,
                        end_date = ?8, due_date = ?9, submit_date = ?10,
                        balance_beginning = ?11, total_contributions = ?12,
                        total_expenditures = ?13, balance_ending = ?14,
                        raw_metadata = ?15, updated_at = ?16, last_scraped_at = ?16
                 WHERE report_id = ?1",
                params![
                    report.report_id,
                    report.source_url,
                    report.title,
                    report.organization_name,
                    report.organization_type,
                    report.report_type,
                    iso(report.begin_date),
                    iso(report.end_date),
                    iso(report.due_date),
                    iso(report.submit_date),
                    report.balance_beginning.to_string(),
                    report.total_contributions.to_string(),
                    report.total_expenditures.to_string(),
                    report.balance_ending.to_string(),
                    raw,
                    now,
                ],
            )?;
            tx.execute(
                "DELETE FROM contributions WHERE report_id = ?1",
                [&report.report_id],
            )?;
            tx.execute(
                "DELETE FROM expenditures WHERE report_id = ?1",
                [&report.report_id],
            )?;
        } else {
            tx.execute(
                "INSERT INTO reports (report_id, source_url, title, organization_name,
                        organization_type, report_type, begin_date, end_date, due_date,
                        submit_date, balance_beginning, total_contributions,
                        total_expenditures, balance_ending, raw_metadata,
                        created_at, updated_at, last_scraped_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16, ?16)",
                params![
                    report.report_id,
                    report.source_url,
                    report.title,
                    report.organization_name,
                    report.organization_type,
                    report.report_type,
                    iso(report.begin_date),
                    iso(report.end_date),
                    iso(report.due_date),
                    iso(report.submit_date),
                    report.balance_beginning.to_string(),
                    report.total_contributions.to_string(),
                    report.total_expenditures.to_string(),
                    report.balance_ending.to_string(),
                    raw,
                    now,
                ],
            )?;
        }

        let counts = insert_report_children(&tx, report)?;
        tx.commit()?;

        tracing::debug!(
            report_id = %report.report_id,
            contributions = counts.contributions,
            expenditures = counts.expenditures,
            updated = exists,
            "imported report"
        );
        Ok(if exists {
            ImportOutcome::Updated(counts)
        } else {
            ImportOutcome::Inserted(counts)
        })
    }

    /// Imports a lobbyist expenditure report and its line items.
    pub fn import_lobbyist_report(
        &mut self,
        report: &ParsedLobbyistReport,
        update_existing: bool,
    ) -> Result<ImportOutcome, DbError> {
        let exists = self.lobbyist_report_exists(&report.report_id)?;
        if exists && !update_existing {
            return Ok(ImportOutcome::SkippedExists);
        }

        let title = if report.title.is_empty() {
            "Lobbyist Expenditure Report"
        } else {
            report.title.as_str()
        };
        let report_type = if report.report_type.is_empty() {
            "Lobbyist Expenditure"
        } else {
            report.report_type.as_str()
        };
        let raw = serde_json::to_string(&report.raw_metadata)?;
        let now = now_timestamp();
        let tx = self.conn.transaction()?;

        if exists {
            tx.execute(
                "UPDATE lobbyist_reports SET source_url = ?2, title = ?3,
                        principal_name = ?4, principal_phone = ?5,
                        principal_street_address = ?6, principal_city = ?7,
                        principal_state = ?8, principal_zip = ?9, report_type = ?10,
                        begin_date = ?11, end_date = ?12, due_date = ?13,
                        submit_date = ?14, total_expenditures = ?15,
                        raw_metadata = ?16, updated_at = ?17, last_scraped_at = ?17
                 WHERE report_id = ?1",
                params![
                    report.report_id,
                    report.source_url,
                    title,
                    report.principal_name,
                    report.principal_phone,
                    report.principal_street_address,
                    report.principal_city,
                    report.principal_state,
                    report.principal_zip,
                    report_type,
                    iso(report.begin_date),
                    iso(report.end_date),
                    iso(report.due_date),
                    iso(report.submit_date),
                    report.total_expenditures.to_string(),
                    raw,
                    now,
                ],
            )?;
            tx.execute(
                "DELETE FROM lobbyist_expenditures WHERE report_id = ?1",
                [&report.report_id],
            )?;
        } else {
            tx.execute(
                "INSERT INTO lobbyist_reports (report_id, source_url, title,
                        principal_name, principal_phone, principal_street_address,
                        principal_city, principal_state, principal_zip, report_type,
                        begin_date, end_date, due_date, submit_date,
                        total_expenditures, raw_metadata,
                        created_at, updated_at, last_scraped_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?17, ?17)",
                params![
                    report.report_id,
                    report.source_url,
                    title,
                    report.principal_name,
                    report.principal_phone,
                    report.principal_street_address,
                    report.principal_city,
                    report.principal_state,
                    report.principal_zip,
                    report_type,
                    iso(report.begin_date),
                    iso(report.end_date),
                    iso(report.due_date),
                    iso(report.submit_date),
                    report.total_expenditures.to_string(),
                    raw,
                    now,
                ],
            )?;
        }

        let mut counts = ImportCounts::default();
        for exp in &report.expenditures {
            tx.execute(
                "INSERT INTO lobbyist_expenditures (report_id, date, date_raw,
                        recipient_name, location, purpose, is_amendment, amount)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    report.report_id,
                    iso(exp.date),
                    exp.date_raw,
                    exp.recipient_name,
                    exp.location,
                    exp.purpose,
                    exp.is_amendment,
                    exp.amount.to_string(),
                ],
            )?;
            counts.expenditures += 1;
        }
        tx.commit()?;

        Ok(if exists {
            ImportOutcome::Updated(counts)
        } else {
            ImportOutcome::Inserted(counts)
        })
    }

    /// Imports an entity registration and its officers.
    pub fn import_entity(
        &mut self,
        entity: &ParsedEntity,
        update_existing: bool,
    ) -> Result<ImportOutcome, DbError> {
        let exists = self.entity_exists(&entity.entity_id)?;
        if exists && !update_existing {
            return Ok(ImportOutcome::SkippedExists);
        }

        let raw = serde_json::to_string(&entity.raw_data)?;
        let now = now_timestamp();
        let tx = self.conn.transaction()?;

        if exists {
            tx.execute(
                "UPDATE entities SET source_url = ?2, name = ?3, also_known_as = ?4,
                        entity_type = ?5, status = ?6, date_created = ?7,
                        street_address = ?8, suite_po_box = ?9, city = ?10,
                        state = ?11, zip_code = ?12, raw_data = ?13,
                        updated_at = ?14, last_scraped_at = ?14
                 WHERE entity_id = ?1",
                params![
                    entity.entity_id,
                    entity.source_url,
                    entity.name,
                    entity.also_known_as,
                    entity.entity_type,
                    entity.status,
                    iso(entity.date_created),
                    entity.street_address,
                    entity.suite_po_box,
                    entity.city,
                    entity.state,
                    entity.zip_code,
                    raw,
                    now,
                ],
            )?;
            tx.execute(
                "DELETE FROM entity_officers WHERE entity_id = ?1",
                [&entity.entity_id],
            )?;
        } else {
            tx.execute(
                "INSERT INTO entities (entity_id, source_url, name, also_known_as,
                        entity_type, status, date_created, street_address,
                        suite_po_box, city, state, zip_code, raw_data,
                        created_at, updated_at, last_scraped_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14, ?14)",
                params![
                    entity.entity_id,
                    entity.source_url,
                    entity.name,
                    entity.also_known_as,
                    entity.entity_type,
                    entity.status,
                    iso(entity.date_created),
                    entity.street_address,
                    entity.suite_po_box,
                    entity.city,
                    entity.state,
                    entity.zip_code,
                    raw,
                    now,
                ],
            )?;
        }

        let mut counts = ImportCounts::default();
        for (position, officer) in entity.officers.iter().enumerate() {
            tx.execute(
                "INSERT INTO entity_officers (entity_id, name, title, phone, email,
                        street_address, city, state, zip_code, position, is_treasurer)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    entity.entity_id,
                    officer.name,
                    officer.title,
                    officer.phone,
                    officer.email,
                    officer.address.street_address,
                    officer.address.city,
                    officer.address.state,
                    officer.address.zip_code,
                    position as i64,
                    officer.is_treasurer,
                ],
            )?;
            counts.officers += 1;
        }
        tx.commit()?;

        Ok(if exists {
            ImportOutcome::Updated(counts)
        } else {
            ImportOutcome::Inserted(counts)
        })
    }

    /// Imports a lobbyist registration and its principal organizations.
    pub fn import_lobbyist_entity(
        &mut self,
        entity: &ParsedLobbyistEntity,
        update_existing: bool,
    ) -> Result<ImportOutcome, DbError> {
        let exists = self.lobbyist_entity_exists(&entity.entity_id)?;
        if exists && !update_existing {
            return Ok(ImportOutcome::SkippedExists);
        }

        let raw = serde_json::to_string(&entity.raw_data)?;
        let now = now_timestamp();
        let tx = self.conn.transaction()?;

        if exists {
            tx.execute(
                "UPDATE lobbyist_entities SET source_url = ?2, first_name = ?3,
                        last_name = ?4, name = ?5, phone = ?6, registration_date = ?7,
                        organization_name = ?8, street_address = ?9, city = ?10,
                        state = ?11, zip_code = ?12, principal_name = ?13,
                        lobbying_purposes = ?14, raw_data = ?15,
                        updated_at = ?16, last_scraped_at = ?16
                 WHERE entity_id = ?1",
                params![
                    entity.entity_id,
                    entity.source_url,
                    entity.first_name,
                    entity.last_name,
                    entity.name,
                    entity.phone,
                    iso(entity.registration_date),
                    entity.organization_name,
                    entity.street_address,
                    entity.city,
                    entity.state,
                    entity.zip_code,
                    entity.principal_name,
                    entity.lobbying_purposes,
                    raw,
                    now,
                ],
            )?;
            tx.execute(
                "DELETE FROM lobbyist_principals WHERE entity_id = ?1",
                [&entity.entity_id],
            )?;
        } else {
            tx.execute(
                "INSERT INTO lobbyist_entities (entity_id, source_url, first_name,
                        last_name, name, phone, registration_date, organization_name,
                        street_address, city, state, zip_code, principal_name,
                        lobbying_purposes, raw_data, created_at, updated_at, last_scraped_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16, ?16)",
                params![
                    entity.entity_id,
                    entity.source_url,
                    entity.first_name,
                    entity.last_name,
                    entity.name,
                    entity.phone,
                    iso(entity.registration_date),
                    entity.organization_name,
                    entity.street_address,
                    entity.city,
                    entity.state,
                    entity.zip_code,
                    entity.principal_name,
                    entity.lobbying_purposes,
                    raw,
                    now,
                ],
            )?;
        }

        let mut counts = ImportCounts::default();
        for (position, principal) in entity.principals.iter().enumerate() {
            tx.execute(
                "INSERT INTO lobbyist_principals (entity_id, name, contact, position)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    entity.entity_id,
                    principal.name,
                    principal.contact,
                    position as i64,
                ],
            )?;
            counts.principals += 1;
        }
        tx.commit()?;

        Ok(if exists {
            ImportOutcome::Updated(counts)
        } else {
            ImportOutcome::Inserted(counts)
        })
    }
}

fn insert_report_children(tx: &Transaction, report: &ParsedReport) -> Result<ImportCounts, DbError> {
    let mut counts = ImportCounts::default();
    for con in &report.contributions {
        tx.execute(
            "INSERT INTO contributions (report_id, date, date_raw, contributor_name,
                    address, is_in_kind, is_loan, is_amendment, amount)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                report.report_id,
                iso(con.date),
                con.date_raw,
                con.contributor_name,
                con.address,
                con.is_in_kind,
                con.is_loan,
                con.is_amendment,
                con.amount.to_string(),
            ],
        )?;
        counts.contributions += 1;
    }
    for exp in &report.expenditures {
        tx.execute(
            "INSERT INTO expenditures (report_id, date, date_raw, recipient_name,
                    purpose, is_in_kind, is_loan, is_amendment, amount)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                report.report_id,
                iso(exp.date),
                exp.date_raw,
                exp.recipient_name,
                exp.purpose,
                exp.is_in_kind,
                exp.is_loan,
                exp.is_amendment,
                exp.amount.to_string(),
            ],
        )?;
        counts.expenditures += 1;
    }
    Ok(counts)
}

impl ImportOutcome {
    /// Total child rows written, zero for skips.
    pub fn child_rows(&self) -> usize {
        match self {
            Self::Inserted(c) | Self::Updated(c) => {
                c.contributions + c.expenditures + c.officers + c.principals
            }
            Self::SkippedExists => 0,
        }
    }
}
