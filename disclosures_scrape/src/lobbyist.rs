//! Parser for lobbyist expenditure report pages.
//!
//! Structurally a sibling of the campaign-finance report parser, with a
//! narrower shape: a single expenditure table, one amendment flag per row,
//! and one balance scalar.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html};
use serde::Serialize;

use crate::errors::ParseError;
use crate::extract::{element_text, flag_cell, parse_currency, parse_date};
use crate::metadata;
use crate::tables::{amount_cell_index, classify_tables, row_cells, tbody_rows};

/// One expenditure line on a lobbyist report:
/// `[date, recipient, location, purpose, amendment, amount]`.
#[derive(Debug, Clone, Serialize)]
pub struct LobbyistExpenditureRecord {
    pub date: Option<NaiveDate>,
    pub date_raw: String,
    pub recipient_name: String,
    pub location: String,
    pub purpose: String,
    pub amount: Decimal,
    pub is_amendment: bool,
}

/// A fully parsed lobbyist expenditure report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedLobbyistReport {
    pub report_id: String,
    pub source_url: String,
    pub title: String,
    /// The principal on whose behalf the expenditures were made. Falls
    /// back to the filer's own name when no principal section exists.
    pub principal_name: String,
    pub principal_phone: String,
    pub principal_street_address: String,
    pub principal_city: String,
    pub principal_state: String,
    pub principal_zip: String,
    pub report_type: String,
    pub begin_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub submit_date: Option<NaiveDate>,
    pub total_expenditures: Decimal,
    pub expenditures: Vec<LobbyistExpenditureRecord>,
    pub raw_metadata: BTreeMap<String, String>,
}

impl ParsedLobbyistReport {
    /// Lobbyist filings are always typed the same on the source site.
    pub fn organization_type(&self) -> &'static str {
        "Lobbyist/Principal"
    }

    /// False for placeholder pages: no line items and a zero total.
    pub fn has_data(&self) -> bool {
        !self.expenditures.is_empty() || !self.total_expenditures.is_zero()
    }
}

/// Parses a fetched lobbyist report page. Same emptiness rule as the
/// campaign-finance parser: [`ParseError::EmptyPage`] only when metadata,
/// balance summary, and expenditure table are all absent.
pub fn parse_lobbyist_report(
    html: &str,
    report_id: &str,
    source_url: &str,
) -> Result<ParsedLobbyistReport, ParseError> {
    let doc = Html::parse_document(html);
    let mut report = ParsedLobbyistReport {
        report_id: report_id.to_string(),
        source_url: source_url.to_string(),
        ..ParsedLobbyistReport::default()
    };

    if let Some(title) = metadata::page_title(&doc) {
        report.title = title;
    }

    let mut pairs = metadata::fieldset_pairs(&doc, true);
    pairs.extend(metadata::col_md_pairs(&doc));
    let found_metadata = !pairs.is_empty();
    for (label, value) in pairs {
        report.raw_metadata.entry(label).or_insert(value);
    }
    report.principal_name = first_of(&report.raw_metadata, &["Principal Name", "Name"]);
    report.principal_phone = first_of(&report.raw_metadata, &["Principal Phone", "Phone"]);
    report.principal_street_address =
        first_of(&report.raw_metadata, &["Principal Street Address"]);
    report.principal_city = first_of(&report.raw_metadata, &["Principal City"]);
    report.principal_state = first_of(&report.raw_metadata, &["Principal State"]);
    report.principal_zip = first_of(&report.raw_metadata, &["Principal Zip"]);
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
        if label.contains("Total Expenditures") {
            report.total_expenditures = amount;
        } else {
            report
                .raw_metadata
                .entry(label)
                .or_insert_with(|| amount.to_string());
        }
    }

    let classified = classify_tables(&doc);
    let found_table = classified.expenditures.is_some();
    if let Some(table) = classified.expenditures {
        for row in tbody_rows(table) {
            if let Some(record) = parse_expenditure_row(row) {
                report.expenditures.push(record);
            }
        }
    }

    if !found_metadata && !found_balance && !found_table {
        return Err(ParseError::EmptyPage);
    }
    Ok(report)
}

fn first_of(raw: &BTreeMap<String, String>, labels: &[&str]) -> String {
    labels
        .iter()
        .find_map(|label| raw.get(*label))
        .cloned()
        .unwrap_or_default()
}

fn date_field(raw: &BTreeMap<String, String>, label: &str) -> Option<NaiveDate> {
    raw.get(label).and_then(|value| parse_date(value))
}

/// Rows shorter than six cells are separators or total lines.
fn parse_expenditure_row(row: ElementRef) -> Option<LobbyistExpenditureRecord> {
    let cells = row_cells(row);
    if cells.len() < 6 {
        return None;
    }
    let amount_idx = amount_cell_index(&cells);
    // The single amendment flag sits immediately before the amount
    let is_amendment = amount_idx
        .checked_sub(1)
        .map(|idx| flag_cell(cells[idx]))
        .unwrap_or(false);
    let date_raw = element_text(cells[0]);
    Some(LobbyistExpenditureRecord {
        date: parse_date(&date_raw),
        date_raw,
        recipient_name: element_text(cells[1]),
        location: element_text(cells[2]),
        purpose: element_text(cells[3]),
        amount: parse_currency(&element_text(cells[amount_idx])),
        is_amendment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expenditure_row(date: &str, recipient: &str, amount: &str, amended: bool) -> String {
        let flag = if amended {
            r##"<td><a class="anchorLink" href="#">A</a></td>"##
        } else {
            "<td></td>"
        };
        format!(
            "<tr><td>{date}</td><td>{recipient}</td><td>Salt Lake City</td><td>Meal</td>{flag}<td>{amount}</td></tr>"
        )
    }

    fn page(body_rows: &str) -> String {
        format!(
            r#"<html><head><title>Lieutenant Governor's Office - Expenditures For Principal</title></head>
            <body>
            <fieldset><legend>Lobbyist Information</legend>
              <div class="dis-cell"><label>Lobbyist Name</label> Pat Q. Lobbyist</div>
              <div class="dis-cell"><label>Report Type</label> Q2</div>
            </fieldset>
            <fieldset><legend>Principal Information</legend>
              <div class="dis-cell"><label>Name</label> Acme Corp</div>
            </fieldset>
            <h1>Balance Summary</h1>
            <table><tr><td>Total Expenditures:</td><td>$210.00</td></tr></table>
            <table class="dis-table">
              <thead><tr><th>Itemized Expenditures</th></tr></thead>
              <tbody>{body_rows}</tbody>
            </table>
            </body></html>"#
        )
    }

    #[test]
    fn parses_metadata_with_principal_prefix() {
        let report =
            parse_lobbyist_report(&page(""), "174643", "http://example/174643").unwrap();
        assert_eq!(report.principal_name, "Acme Corp");
        assert_eq!(report.organization_type(), "Lobbyist/Principal");
        assert_eq!(
            report.raw_metadata.get("Lobbyist Name"),
            Some(&"Pat Q. Lobbyist".to_string())
        );
        assert_eq!(report.total_expenditures, Decimal::new(21000, 2));
    }

    #[test]
    fn parses_six_cell_rows() {
        let rows = format!(
            "{}{}",
            expenditure_row("4/10/2024", "Capitol Grill", "$150.00", false),
            expenditure_row("4/12/2024", "Downtown Deli", "$60.00", true),
        );
        let report = parse_lobbyist_report(&page(&rows), "174643", "u").unwrap();
        assert_eq!(report.expenditures.len(), 2);
        let first = &report.expenditures[0];
        assert_eq!(first.recipient_name, "Capitol Grill");
        assert_eq!(first.location, "Salt Lake City");
        assert_eq!(first.purpose, "Meal");
        assert_eq!(first.amount, Decimal::new(15000, 2));
        assert!(!first.is_amendment);
        assert!(report.expenditures[1].is_amendment);
    }

    #[test]
    fn short_rows_skipped() {
        let rows = format!(
            "{}<tr><td colspan=\"6\">Total</td></tr>",
            expenditure_row("4/10/2024", "Capitol Grill", "$150.00", false)
        );
        let report = parse_lobbyist_report(&page(&rows), "174643", "u").unwrap();
        assert_eq!(report.expenditures.len(), 1);
    }

    #[test]
    fn empty_page_is_error() {
        let err = parse_lobbyist_report("<html><body></body></html>", "1", "u");
        assert!(matches!(err, Err(ParseError::EmptyPage)));
    }

    #[test]
    fn zero_total_no_rows_is_invalid() {
        let html = r#"
            <fieldset><div class="dis-cell"><label>Lobbyist Name</label> Pat</div></fieldset>
            <h1>Balance Summary</h1>
            <table><tr><td>Total Expenditures:</td><td>$0.00</td></tr></table>"#;
        let report = parse_lobbyist_report(html, "1", "u").unwrap();
        assert!(!report.has_data());
    }
}
