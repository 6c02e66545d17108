//! Parser for campaign-finance disclosure report pages.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html};
use serde::Serialize;

use crate::errors::ParseError;
use crate::extract::{element_text, flag_cell, parse_date};
use crate::metadata;
use crate::tables::{amount_cell_index, classify_tables, row_cells, tbody_rows};

/// One inbound money-movement line on a report.
#[derive(Debug, Clone, Serialize)]
pub struct ContributionRecord {
    /// `None` when the source text did not parse; the original text is
    /// always kept in `date_raw`, never coerced to a sentinel date.
    pub date: Option<NaiveDate>,
    pub date_raw: String,
    pub contributor_name: String,
    pub address: String,
    pub amount: Decimal,
    pub is_in_kind: bool,
    pub is_loan: bool,
    pub is_amendment: bool,
}

/// One outbound money-movement line on a report.
#[derive(Debug, Clone, Serialize)]
pub struct ExpenditureRecord {
    pub date: Option<NaiveDate>,
    pub date_raw: String,
    pub recipient_name: String,
    pub purpose: String,
    pub amount: Decimal,
    pub is_in_kind: bool,
    pub is_loan: bool,
    pub is_amendment: bool,
}

/// A fully parsed campaign-finance disclosure report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedReport {
    pub report_id: String,
    pub source_url: String,
    pub title: String,
    pub organization_name: String,
    pub organization_type: String,
    pub report_type: String,
    pub begin_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub submit_date: Option<NaiveDate>,
    pub balance_beginning: Decimal,
    pub total_contributions: Decimal,
    pub total_expenditures: Decimal,
    pub balance_ending: Decimal,
    pub contributions: Vec<ContributionRecord>,
    pub expenditures: Vec<ExpenditureRecord>,
    /// Every label/value pair found on the page, kept for forward
    /// compatibility even when a label is also mapped to a typed field.
    pub raw_metadata: BTreeMap<String, String>,
}

impl ParsedReport {
    /// False when the report has no line items and every balance scalar is
    /// zero. The live site serves such placeholder pages for unused IDs;
    /// the crawler counts them toward its failure streak instead of
    /// importing an empty shell.
    pub fn has_data(&self) -> bool {
        !self.contributions.is_empty()
            || !self.expenditures.is_empty()
            || !self.balance_beginning.is_zero()
            || !self.total_contributions.is_zero()
            || !self.total_expenditures.is_zero()
            || !self.balance_ending.is_zero()
    }
}

/// Parses a fetched report page.
///
/// Returns [`ParseError::EmptyPage`] only when the page yields no metadata
/// labels, no balance summary, and no line-item tables. A report with full
/// metadata and zero transactions parses successfully with empty lists.
pub fn parse_report(
    html: &str,
    report_id: &str,
    source_url: &str,
) -> Result<ParsedReport, ParseError> {
    let doc = Html::parse_document(html);
    let mut report = ParsedReport {
        report_id: report_id.to_string(),
        source_url: source_url.to_string(),
        ..ParsedReport::default()
    };

    if let Some(title) = metadata::page_title(&doc) {
        // Title format: "Contributions and Expenditures For <type>"
        if let Some((_, org_type)) = title.split_once("For ") {
            report.organization_type = org_type.trim().to_string();
        }
        report.title = title;
    }
    if report.organization_type.is_empty() {
        if let Some(org_type) = metadata::legend_org_type(&doc) {
            report.organization_type = org_type;
        }
    }

    let mut pairs = metadata::fieldset_pairs(&doc, false);
    pairs.extend(metadata::col_md_pairs(&doc));
    let found_metadata = !pairs.is_empty();
    for (label, value) in pairs {
        report.raw_metadata.entry(label).or_insert(value);
    }
    report.organization_name = report.raw_metadata.get("Name").cloned().unwrap_or_default();
    report.report_type = report
        .raw_metadata
        .get("Report Type")
        .cloned()
        .unwrap_or_default();
    report.begin_date = date_field(&report.raw_metadata, "Begin Date");
    report.end_date = date_field(&report.raw_metadata, "End Date");
    report.due_date = date_field(&report.raw_metadata, "Due Date");
    report.submit_date = date_field(&report.raw_metadata, "Submit Date");

    let balance = metadata::balance_pairs(&doc);
    let found_balance = balance.is_some();
    for (label, amount) in balance.unwrap_or_default() {
        match label.as_str() {
            "Balance at Beginning of Reporting Period" => report.balance_beginning = amount,
            "Total Contributions Received" => report.total_contributions = amount,
            "Total Expenditures Made" => report.total_expenditures = amount,
            "Ending Balance" => report.balance_ending = amount,
            // Unrecognized balance rows are data, not errors
            other => {
                report
                    .raw_metadata
                    .entry(other.to_string())
                    .or_insert_with(|| amount.to_string());
            }
        }
    }

    let classified = classify_tables(&doc);
    let found_tables = classified.contributions.is_some() || classified.expenditures.is_some();
    if let Some(table) = classified.contributions {
        for row in tbody_rows(table) {
            if let Some(record) = parse_contribution_row(row) {
                report.contributions.push(record);
            }
        }
    }
    if let Some(table) = classified.expenditures {
        for row in tbody_rows(table) {
            if let Some(record) = parse_expenditure_row(row) {
                report.expenditures.push(record);
            }
        }
    }

    if !found_metadata && !found_balance && !found_tables {
        return Err(ParseError::EmptyPage);
    }
    Ok(report)
}

fn date_field(raw: &BTreeMap<String, String>, label: &str) -> Option<NaiveDate> {
    let value = raw.get(label)?;
    let parsed = parse_date(value);
    if parsed.is_none() {
        tracing::warn!(label, value = %value, "unparsable date field");
    }
    parsed
}

/// The three flag columns sit immediately before the amount column, in the
/// order in-kind, loan, amendment. Returns `false` flags when the row is
/// too short for a given offset rather than misreading a data cell.
fn row_flags(cells: &[ElementRef], amount_idx: usize) -> (bool, bool, bool) {
    let flag_at = |offset: usize| {
        amount_idx
            .checked_sub(offset)
            .filter(|&idx| idx >= 3)
            .map(|idx| flag_cell(cells[idx]))
            .unwrap_or(false)
    };
    (flag_at(3), flag_at(2), flag_at(1))
}

/// Rows with fewer than seven cells are separators or total lines
/// (e.g. a single colspan cell reading "Total") and are skipped.
fn parse_contribution_row(row: ElementRef) -> Option<ContributionRecord> {
    let cells = row_cells(row);
    if cells.len() < 7 {
        return None;
    }
    let amount_idx = amount_cell_index(&cells);
    let (is_in_kind, is_loan, is_amendment) = row_flags(&cells, amount_idx);
    let date_raw = element_text(cells[0]);
    Some(ContributionRecord {
        date: parse_date(&date_raw),
        date_raw,
        contributor_name: element_text(cells[1]),
        address: element_text(cells[2]),
        amount: crate::extract::parse_currency(&element_text(cells[amount_idx])),
        is_in_kind,
        is_loan,
        is_amendment,
    })
}

fn parse_expenditure_row(row: ElementRef) -> Option<ExpenditureRecord> {
    let cells = row_cells(row);
    if cells.len() < 7 {
        return None;
    }
    let amount_idx = amount_cell_index(&cells);
    let (is_in_kind, is_loan, is_amendment) = row_flags(&cells, amount_idx);
    let date_raw = element_text(cells[0]);
    Some(ExpenditureRecord {
        date: parse_date(&date_raw),
        date_raw,
        recipient_name: element_text(cells[1]),
        purpose: element_text(cells[2]),
        amount: crate::extract::parse_currency(&element_text(cells[amount_idx])),
        is_in_kind,
        is_loan,
        is_amendment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAG: &str = r##"<td><a class="anchorLink" href="#">X</a></td>"##;

    fn contribution_row(date: &str, name: &str, amount: &str, loan: bool) -> String {
        format!(
            "<tr><td>{date}</td><td>{name}</td><td>12 Main St, Salt Lake City, UT 84101</td><td></td>{}<td></td><td>{amount}</td></tr>",
            if loan { FLAG } else { "<td></td>" }
        )
    }

    fn page(body_rows: &str) -> String {
        format!(
            r#"<html><head><title>Lieutenant Governor's Office - Contributions and Expenditures For Political Action Committee</title></head>
            <body>
            <fieldset><legend>Political Action Committee Information</legend>
              <div class="dis-cell"><label>Name</label> Example PAC</div>
              <div class="dis-cell"><label>Report Type</label> July 15th</div>
              <div class="dis-cell"><label>Begin Date</label> 1/1/2024</div>
              <div class="dis-cell"><label>End Date</label> 6/30/2024</div>
            </fieldset>
            <h1>Balance Summary</h1>
            <table>
              <tr><td>Balance at Beginning of Reporting Period:</td><td>$100.00</td></tr>
              <tr><td>Total Contributions Received:</td><td>$150.00</td></tr>
              <tr><td>Total Expenditures Made:</td><td>$75.00</td></tr>
              <tr><td>Ending Balance:</td><td>$175.00</td></tr>
            </table>
            <table class="dis-table">
              <thead><tr><th>Itemized Contributions</th></tr></thead>
              <tbody>{body_rows}</tbody>
            </table>
            </body></html>"#
        )
    }

    #[test]
    fn parses_metadata_and_balance() {
        let html = page(&contribution_row("3/15/2024", "Jane Doe", "$150.00", false));
        let report = parse_report(&html, "42", "http://example/42").unwrap();
        assert_eq!(report.organization_name, "Example PAC");
        assert_eq!(report.organization_type, "Political Action Committee");
        assert_eq!(report.report_type, "July 15th");
        assert_eq!(report.begin_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(report.balance_beginning, Decimal::new(10000, 2));
        assert_eq!(report.balance_ending, Decimal::new(17500, 2));
        assert!(report.has_data());
    }

    #[test]
    fn parses_contribution_rows_with_flags() {
        let rows = format!(
            "{}{}",
            contribution_row("3/15/2024", "Jane Doe", "$100.00", false),
            contribution_row("bad date", "John Roe", "$50.00", true),
        );
        let report = parse_report(&page(&rows), "42", "u").unwrap();
        assert_eq!(report.contributions.len(), 2);
        let first = &report.contributions[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(first.amount, Decimal::new(10000, 2));
        assert!(!first.is_loan);
        let second = &report.contributions[1];
        assert_eq!(second.date, None);
        assert_eq!(second.date_raw, "bad date");
        assert!(second.is_loan);
        assert!(!second.is_in_kind);
    }

    #[test]
    fn eight_cell_legacy_rows_keep_flag_alignment() {
        // Older revisions carry an extra flag column before the amount;
        // the loan flag is still two cells left of the amount.
        let row = format!(
            "<tr><td>3/15/2024</td><td>Jane Doe</td><td>Addr</td><td></td><td></td>{FLAG}<td></td><td>$25.00</td></tr>"
        );
        let report = parse_report(&page(&row), "42", "u").unwrap();
        let rec = &report.contributions[0];
        assert_eq!(rec.amount, Decimal::new(2500, 2));
        assert!(rec.is_loan);
        assert!(!rec.is_amendment);
    }

    #[test]
    fn total_rows_skipped() {
        let rows = format!(
            "{}<tr><td colspan=\"7\">Total</td></tr>",
            contribution_row("3/15/2024", "Jane Doe", "$100.00", false)
        );
        let report = parse_report(&page(&rows), "42", "u").unwrap();
        assert_eq!(report.contributions.len(), 1);
    }

    #[test]
    fn metadata_without_rows_is_valid_and_empty() {
        let report = parse_report(&page(""), "42", "u").unwrap();
        assert!(report.contributions.is_empty());
        assert!(report.expenditures.is_empty());
        // Balance scalars are non-zero, so this is a real (if quiet) report
        assert!(report.has_data());
    }

    #[test]
    fn bare_page_is_parse_failure() {
        let err = parse_report("<html><body><p>Error</p></body></html>", "42", "u");
        assert!(matches!(err, Err(ParseError::EmptyPage)));
    }

    #[test]
    fn zero_everything_is_invalid_but_parses() {
        let html = r#"
            <fieldset><div class="dis-cell"><label>Name</label> Dormant PAC</div></fieldset>
            <h1>Balance Summary</h1>
            <table><tr><td>Ending Balance:</td><td>$0.00</td></tr></table>"#;
        let report = parse_report(html, "42", "u").unwrap();
        assert!(!report.has_data());
    }

    #[test]
    fn unknown_balance_labels_land_in_raw_metadata() {
        let html = r#"
            <h1>Balance Summary</h1>
            <table><tr><td>Loan Balance Carried Forward:</td><td>$10.00</td></tr></table>"#;
        let report = parse_report(html, "42", "u").unwrap();
        assert_eq!(
            report.raw_metadata.get("Loan Balance Carried Forward"),
            Some(&"10.00".to_string())
        );
    }
}
