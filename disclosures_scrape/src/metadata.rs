//! Label/value harvesting shared by the report and lobbyist parsers.
//!
//! The disclosure pages present report metadata three ways: `<fieldset>`
//! sections with `div.dis-cell` label/value cells, Bootstrap-style
//! `div.row` grids with alternating `col-md-*` label and value divs, and
//! the balance-summary table after its heading. All three are harvested
//! into plain label/value pairs; mapping known labels onto typed fields is
//! the caller's job.

use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html};

use crate::extract::{clean_text, element_text, parse_currency, selector};
use crate::tables::{all_rows, balance_summary_table, row_cells};

fn parenthetical() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\([^)]*\)").expect("static regex"))
}

/// Normalizes a field label: trailing colon and parenthetical notes
/// removed, whitespace collapsed.
pub(crate) fn strip_label(raw: &str) -> String {
    let label = raw.trim().trim_end_matches(':');
    clean_text(&parenthetical().replace_all(label, ""))
}

/// The value paired with a label is the enclosing cell's text minus the
/// label text itself.
pub(crate) fn label_value(cell_text: &str, label_text: &str) -> String {
    match cell_text.strip_prefix(label_text) {
        Some(rest) => rest.trim().trim_start_matches(':').trim().to_string(),
        None => cell_text.replacen(label_text, "", 1).trim().to_string(),
    }
}

/// The page title with the site prefix ("Lieutenant Governor's Office - ")
/// removed.
pub(crate) fn page_title(doc: &Html) -> Option<String> {
    let title_sel = selector("title");
    let full = element_text(doc.select(&title_sel).next()?);
    let (_, report_title) = full.split_once(" - ")?;
    Some(report_title.trim().to_string())
}

/// Label/value pairs from `fieldset div.dis-cell label` structures, in
/// document order. When `prefix_principal` is set, labels inside a
/// fieldset whose `<legend>` mentions "Principal" are prefixed
/// `"Principal "` so they do not collide with the filer's own fields.
pub(crate) fn fieldset_pairs(doc: &Html, prefix_principal: bool) -> Vec<(String, String)> {
    let fieldset_sel = selector("fieldset");
    let legend_sel = selector("legend");
    let cell_sel = selector("div.dis-cell");
    let label_sel = selector("label");

    let mut pairs = Vec::new();
    for fieldset in doc.select(&fieldset_sel) {
        let legend = fieldset
            .select(&legend_sel)
            .next()
            .map(element_text)
            .unwrap_or_default();
        for cell in fieldset.select(&cell_sel) {
            let Some(label) = cell.select(&label_sel).next() else {
                continue;
            };
            let label_text = strip_label(&element_text(label));
            let value = label_value(&element_text(cell), &label_text);
            if label_text.is_empty() || value.is_empty() {
                continue;
            }
            let key = if prefix_principal && legend.contains("Principal") {
                format!("Principal {label_text}")
            } else {
                label_text
            };
            pairs.push((key, value));
        }
    }
    pairs
}

/// Label/value pairs from `div.row` grids where labels and values sit in
/// alternating `col-md-*` columns. A value containing `:` is assumed to be
/// another label cell and the pair is skipped.
pub(crate) fn col_md_pairs(doc: &Html) -> Vec<(String, String)> {
    let row_sel = selector("div.row");
    let col_sel = selector(r#"div[class*="col-md-"]"#);

    let mut pairs = Vec::new();
    for row in doc.select(&row_sel) {
        let cols: Vec<ElementRef> = row.select(&col_sel).collect();
        for pair in cols.chunks_exact(2) {
            let label = strip_label(&element_text(pair[0]));
            let value = element_text(pair[1]);
            if !label.is_empty() && !value.is_empty() && !value.contains(':') {
                pairs.push((label, value));
            }
        }
    }
    pairs
}

/// `<legend>` texts like "Political Action Committee Information" carry
/// the organization type.
pub(crate) fn legend_org_type(doc: &Html) -> Option<String> {
    let legend_sel = selector("legend");
    for legend in doc.select(&legend_sel) {
        let text = element_text(legend);
        if let Some(org_type) = text.strip_suffix(" Information") {
            if !org_type.is_empty() {
                return Some(org_type.to_string());
            }
        }
    }
    None
}

/// Rows of the balance-summary table as (label, amount) pairs.
///
/// Newer pages use two-cell `[label, value]` rows; older ones prepend a
/// line number, `[line#, label, value, ...]`. Rows whose label is a bare
/// number are skipped. Returns `None` when the page has no balance
/// summary at all, which is distinct from an empty table.
pub(crate) fn balance_pairs(doc: &Html) -> Option<Vec<(String, Decimal)>> {
    let table = balance_summary_table(doc)?;
    let mut pairs = Vec::new();
    for row in all_rows(table) {
        let cells = row_cells(row);
        let (label_cell, value_cell) = match cells.len() {
            2 => (cells[0], cells[1]),
            n if n >= 3 => (cells[1], cells[2]),
            _ => continue,
        };
        let label = strip_label(&element_text(label_cell));
        if label.is_empty() || label.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        pairs.push((label, parse_currency(&element_text(value_cell))));
    }
    Some(pairs)
}
