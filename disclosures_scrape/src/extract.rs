//! Field extractors: raw cell text to typed values.
//!
//! Every function here is total over its input. Malformed text maps to an
//! absent or default value; extractors never return errors. Callers decide
//! whether an absent value is worth a log line.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use scraper::{ElementRef, Selector};

/// Date formats seen on the disclosure pages, tried in order. `%m`/`%d`
/// accept single digits, so `1/5/2024` parses under the first format.
const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d", "%B %d, %Y"];

/// Parses a selector literal known to be valid at compile time.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector literal")
}

/// Collapses whitespace runs and trims.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Full text content of an element, whitespace-normalized.
pub fn element_text(el: ElementRef) -> String {
    clean_text(&el.text().collect::<String>())
}

/// Converts a currency cell to a fixed-point amount.
///
/// Strips `$`, thousands separators, and surrounding whitespace;
/// `(1,234.56)` is negative. Empty, `--`, or non-numeric text yields zero.
/// The result carries exactly two fractional digits.
pub fn parse_currency(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "--" {
        return Decimal::ZERO;
    }
    let cleaned = trimmed.replace(['$', ','], "");
    let cleaned = cleaned.trim();
    let (digits, negative) = match cleaned.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (inner.trim(), true),
        None => (cleaned, false),
    };
    match digits.parse::<Decimal>() {
        Ok(value) => {
            let value = if negative { -value } else { value };
            value.round_dp(2)
        }
        Err(_) => Decimal::ZERO,
    }
}

/// Parses a loosely-formatted date, returning `None` on failure.
///
/// Callers keep the raw text alongside the parsed value; a `None` here is
/// never coerced to today or some epoch sentinel.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "--" {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// True when a flag cell carries its marker: the pages render set flags as
/// an `a.anchorLink` with a visible letter, and unset flags as an empty
/// cell. A missing column altogether means `false`.
pub fn flag_cell(cell: ElementRef) -> bool {
    let marker = selector("a.anchorLink");
    cell.select(&marker).next().is_some() && !element_text(cell).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    // A bare <td> gets dropped by the fragment parser, so give it a table
    fn first_td(html: &str) -> bool {
        let doc = Html::parse_fragment(&format!("<table><tbody><tr>{html}</tr></tbody></table>"));
        let td = selector("td");
        flag_cell(doc.select(&td).next().unwrap())
    }

    // -- Currency --

    #[test]
    fn currency_plain() {
        assert_eq!(parse_currency("$1,234.56"), Decimal::new(123456, 2));
    }

    #[test]
    fn currency_parenthesized_negative() {
        assert_eq!(parse_currency("(1,234.56)"), Decimal::new(-123456, 2));
    }

    #[test]
    fn currency_parenthesized_with_symbol() {
        assert_eq!(parse_currency("($500.00)"), Decimal::new(-50000, 2));
    }

    #[test]
    fn currency_empty_and_sentinel() {
        assert_eq!(parse_currency(""), Decimal::ZERO);
        assert_eq!(parse_currency("   "), Decimal::ZERO);
        assert_eq!(parse_currency("--"), Decimal::ZERO);
    }

    #[test]
    fn currency_non_numeric() {
        assert_eq!(parse_currency("n/a"), Decimal::ZERO);
    }

    #[test]
    fn currency_no_symbol() {
        assert_eq!(parse_currency("150"), Decimal::new(15000, 2));
    }

    #[test]
    fn currency_round_trip() {
        // extractCurrency(format(a)) == a for representable cent amounts
        for cents in [0i64, 1, 99, 100, 123_456, -50_000, 999_999_99] {
            let amount = Decimal::new(cents, 2);
            assert_eq!(parse_currency(&format!("${}", amount)), amount);
        }
    }

    // -- Dates --

    #[test]
    fn date_us_format() {
        assert_eq!(
            parse_date("3/15/2024"),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
    }

    #[test]
    fn date_iso_format() {
        assert_eq!(
            parse_date("2024-03-15"),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
    }

    #[test]
    fn date_long_format() {
        assert_eq!(
            parse_date("March 15, 2024"),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
    }

    #[test]
    fn date_garbage_is_none() {
        assert_eq!(parse_date("soon"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("--"), None);
    }

    // -- Flags --

    #[test]
    fn flag_set_when_anchor_present() {
        assert!(first_td(r##"<td><a class="anchorLink" href="#">I</a></td>"##));
    }

    #[test]
    fn flag_unset_for_empty_cell() {
        assert!(!first_td("<td></td>"));
    }

    #[test]
    fn flag_unset_for_plain_text() {
        // Text without the marker anchor is not a set flag
        assert!(!first_td("<td>I</td>"));
    }

    #[test]
    fn flag_unset_for_empty_anchor() {
        assert!(!first_td(r##"<td><a class="anchorLink" href="#"></a></td>"##));
    }

    // -- Text --

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  a \n\t b  "), "a b");
        assert_eq!(clean_text(""), "");
    }
}
