//! Table classification for disclosure pages.
//!
//! The pages carry several `table.dis-table` elements in no reliable order,
//! so classification inspects header text instead of position. The balance
//! summary is the odd one out: it has no distinguishing header and is found
//! as the first table following a "Balance Summary" heading.

use scraper::{ElementRef, Html};

use crate::extract::{element_text, selector};

/// The line-item tables found on a report page. Either side may be absent;
/// an org with no activity that period still files a valid report.
#[derive(Default)]
pub struct ClassifiedTables<'a> {
    pub contributions: Option<ElementRef<'a>>,
    pub expenditures: Option<ElementRef<'a>>,
}

/// Classifies every `table.dis-table` by its `<thead>` text,
/// case-insensitive. "Contribution" without "Expenditure" marks the
/// contributions table; "Expenditure" marks the expenditures table. The
/// first match per category wins; further matches are a data-quality
/// signal and only logged.
pub fn classify_tables(doc: &Html) -> ClassifiedTables<'_> {
    let table_sel = selector("table.dis-table");
    let thead_sel = selector("thead");

    let mut classified = ClassifiedTables::default();
    for table in doc.select(&table_sel) {
        let Some(thead) = table.select(&thead_sel).next() else {
            continue;
        };
        let header = element_text(thead).to_lowercase();
        if header.contains("contribution") && !header.contains("expenditure") {
            if classified.contributions.is_none() {
                classified.contributions = Some(table);
            } else {
                tracing::warn!("multiple contribution tables found; keeping the first");
            }
        } else if header.contains("expenditure") {
            if classified.expenditures.is_none() {
                classified.expenditures = Some(table);
            } else {
                tracing::warn!("multiple expenditure tables found; keeping the first");
            }
        }
    }
    classified
}

/// Finds the table immediately following the "Balance Summary" heading, in
/// document order. Returns `None` when the page has no such heading or no
/// table after it.
pub fn balance_summary_table(doc: &Html) -> Option<ElementRef<'_>> {
    let mut past_heading = false;
    for node in doc.root_element().descendants() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        let name = el.value().name();
        if !past_heading {
            let is_heading = matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6");
            if is_heading && element_text(el).to_lowercase().contains("balance summary") {
                past_heading = true;
            }
        } else if name == "table" {
            return Some(el);
        }
    }
    None
}

/// Rows inside the table's `<tbody>`. A classified table with zero body
/// rows is still a valid (empty) table.
pub fn tbody_rows(table: ElementRef) -> Vec<ElementRef> {
    let row_sel = selector("tbody tr");
    table.select(&row_sel).collect()
}

/// All `<tr>` rows of a table, wherever they sit. The balance summary
/// table has no `<thead>`/`<tbody>` split on older page revisions.
pub fn all_rows(table: ElementRef) -> Vec<ElementRef> {
    let row_sel = selector("tr");
    table.select(&row_sel).collect()
}

/// The `<td>` cells of a row.
pub fn row_cells(row: ElementRef) -> Vec<ElementRef> {
    let cell_sel = selector("td");
    row.select(&cell_sel).collect()
}

/// Index of the amount cell in a line-item row.
///
/// Older page revisions insert an extra flag column, so the amount is not
/// at a fixed offset. Scan right to left for the first cell that carries a
/// `$` or is purely numeric; fall back to the last cell.
pub fn amount_cell_index(cells: &[ElementRef]) -> usize {
    for idx in (0..cells.len()).rev() {
        let text = element_text(cells[idx]);
        let digits = text.replace([',', '.'], "");
        if text.contains('$') || (!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
        {
            return idx;
        }
    }
    cells.len().saturating_sub(1)
}
