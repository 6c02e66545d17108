//! Parsers for registration pages: campaign-finance entities (PACs,
//! parties, corporations) and lobbyist registrations.
//!
//! Both page families render fields as `<label>` tags whose value is the
//! enclosing `<div>`'s text minus the label. Filer information appears
//! before officer and affiliate sections, so field mapping is first-wins.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use scraper::{ElementRef, Html};
use serde::Serialize;

use crate::address::{parse_address, AddressParts};
use crate::errors::ParseError;
use crate::extract::{element_text, parse_date, selector};
use crate::metadata::label_value;
use crate::tables::{row_cells, tbody_rows};

/// An officer attached to a campaign-finance entity, in page order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedOfficer {
    /// Assembled from the first/middle/last name parts.
    pub name: String,
    pub title: String,
    pub phone: String,
    pub email: String,
    pub address: AddressParts,
    /// Set for the section headed "Chief Financial Officer" or
    /// "Treasurer".
    pub is_treasurer: bool,
}

/// A parsed campaign-finance entity registration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedEntity {
    pub entity_id: String,
    pub source_url: String,
    pub name: String,
    pub also_known_as: String,
    pub date_created: Option<NaiveDate>,
    pub entity_type: String,
    pub status: String,
    pub street_address: String,
    pub suite_po_box: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub officers: Vec<ParsedOfficer>,
    /// Every label/value pair on the page, first occurrence per label.
    pub raw_data: BTreeMap<String, String>,
}

/// A principal organization listed on a lobbyist registration.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedPrincipal {
    pub name: String,
    pub contact: String,
}

/// A parsed lobbyist registration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedLobbyistEntity {
    pub entity_id: String,
    pub source_url: String,
    /// Lobbyist full name when personal fields are present, otherwise the
    /// organization or principal name.
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub registration_date: Option<NaiveDate>,
    pub organization_name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub principal_name: String,
    pub lobbying_purposes: String,
    pub principals: Vec<ParsedPrincipal>,
    pub raw_data: BTreeMap<String, String>,
}

/// Label/value pairs for every `<label>` on the page, document order.
/// The value is the nearest ancestor `<div>`'s text minus the label text.
fn label_pairs(doc: &Html) -> Vec<(String, String)> {
    let label_sel = selector("label");
    let mut pairs = Vec::new();
    for label in doc.select(&label_sel) {
        let Some(parent) = enclosing_div(label) else {
            continue;
        };
        let label_text = element_text(label);
        if label_text.is_empty() {
            continue;
        }
        let value = label_value(&element_text(parent), &label_text);
        pairs.push((label_text.trim_end_matches(':').to_string(), value));
    }
    pairs
}

fn enclosing_div(el: ElementRef) -> Option<ElementRef> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "div")
}

fn is_bold_span(el: ElementRef) -> bool {
    el.value().name() == "span"
        && el
            .value()
            .attr("style")
            .is_some_and(|style| style.contains("font-weight: bold"))
}

fn is_officer_header(text: &str) -> bool {
    text.contains("Name of Primary Officer")
        || text.contains("Name of additional")
        || text.contains("Chief Financial Officer")
}

/// Collects officers by walking the document once: a bold `<span>` header
/// opens a section, and labels encountered before the next "Name of"
/// header belong to it. Officers without any name parts are dropped.
fn collect_officers(doc: &Html) -> Vec<ParsedOfficer> {
    struct Section {
        officer: ParsedOfficer,
        first: String,
        middle: String,
        last: String,
    }

    let mut officers = Vec::new();
    let mut current: Option<Section> = None;

    let finish = |section: Option<Section>, out: &mut Vec<ParsedOfficer>| {
        if let Some(mut section) = section {
            let name: Vec<&str> = [&section.first, &section.middle, &section.last]
                .into_iter()
                .map(String::as_str)
                .filter(|part| !part.is_empty())
                .collect();
            if !name.is_empty() {
                section.officer.name = name.join(" ");
                out.push(section.officer);
            }
        }
    };

    for node in doc.root_element().descendants() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        if is_bold_span(el) {
            let text = element_text(el);
            if text.contains("Name of") {
                finish(current.take(), &mut officers);
                if is_officer_header(&text) {
                    current = Some(Section {
                        officer: ParsedOfficer {
                            is_treasurer: text.contains("Chief Financial Officer")
                                || text.contains("Treasurer"),
                            ..ParsedOfficer::default()
                        },
                        first: String::new(),
                        middle: String::new(),
                        last: String::new(),
                    });
                }
            }
            continue;
        }
        let Some(section) = current.as_mut() else {
            continue;
        };
        if el.value().name() != "label" {
            continue;
        }
        let Some(parent) = enclosing_div(el) else {
            continue;
        };
        let label_text = element_text(el);
        let value = label_value(&element_text(parent), &label_text);
        if value.is_empty() {
            continue;
        }
        let label = label_text.trim_end_matches(':');
        if label.contains("First") {
            section.first = value;
        } else if label.contains("Middle") {
            section.middle = value;
        } else if label.contains("Last") {
            section.last = value;
        } else if label == "Title" {
            section.officer.title = value;
        } else if label == "Phone" {
            section.officer.phone = value;
        } else if label == "Email" {
            section.officer.email = value;
        } else if label.contains("Address") {
            section.officer.address = parse_address(&value);
        }
    }
    finish(current, &mut officers);
    officers
}

/// Parses a campaign-finance entity registration page.
pub fn parse_entity(
    html: &str,
    entity_id: &str,
    source_url: &str,
) -> Result<ParsedEntity, ParseError> {
    let doc = Html::parse_document(html);
    let pairs = label_pairs(&doc);
    if pairs.is_empty() {
        return Err(ParseError::EmptyPage);
    }

    let mut entity = ParsedEntity {
        entity_id: entity_id.to_string(),
        source_url: source_url.to_string(),
        ..ParsedEntity::default()
    };
    for (label, value) in pairs {
        if value.is_empty() {
            entity.raw_data.entry(label).or_insert(value);
            continue;
        }
        match label.as_str() {
            "Name" if entity.name.is_empty() => entity.name = value.clone(),
            "Also known as" if entity.also_known_as.is_empty() => {
                entity.also_known_as = value.clone()
            }
            "Date Created" if entity.date_created.is_none() => {
                entity.date_created = parse_date(&value)
            }
            "Type" | "Entity Type" | "Registration Type" if entity.entity_type.is_empty() => {
                entity.entity_type = value.clone()
            }
            "Status" if entity.status.is_empty() => entity.status = value.clone(),
            "Street Address" if entity.street_address.is_empty() => {
                entity.street_address = value.clone()
            }
            "Suite/PO Box" if entity.suite_po_box.is_empty() => {
                entity.suite_po_box = value.clone()
            }
            "City" if entity.city.is_empty() => entity.city = value.clone(),
            "State" if entity.state.is_empty() => entity.state = value.clone(),
            "Zip" if entity.zip_code.is_empty() => entity.zip_code = value.clone(),
            _ => {}
        }
        entity.raw_data.entry(label).or_insert(value);
    }
    entity.officers = collect_officers(&doc);
    Ok(entity)
}

/// Parses a lobbyist registration page.
pub fn parse_lobbyist_entity(
    html: &str,
    entity_id: &str,
    source_url: &str,
) -> Result<ParsedLobbyistEntity, ParseError> {
    let doc = Html::parse_document(html);
    let pairs = label_pairs(&doc);
    if pairs.is_empty() {
        return Err(ParseError::EmptyPage);
    }

    let mut entity = ParsedLobbyistEntity {
        entity_id: entity_id.to_string(),
        source_url: source_url.to_string(),
        ..ParsedLobbyistEntity::default()
    };
    for (label, value) in pairs {
        if value.is_empty() {
            entity.raw_data.entry(label).or_insert(value);
            continue;
        }
        if label.contains("First Name") && entity.first_name.is_empty() {
            entity.first_name = value.clone();
        } else if label.contains("Last Name") && entity.last_name.is_empty() {
            entity.last_name = value.clone();
        } else if label == "Telephone" && entity.phone.is_empty() {
            entity.phone = value.clone();
        } else if label.contains("Registration Date") && entity.registration_date.is_none() {
            entity.registration_date = parse_date(&value);
        } else if label.contains("Organization Name") && entity.organization_name.is_empty() {
            entity.organization_name = value.clone();
        } else if label == "Street Address" && entity.street_address.is_empty() {
            entity.street_address = value.clone();
        } else if label == "City" && entity.city.is_empty() {
            entity.city = value.clone();
        } else if label == "State" && entity.state.is_empty() {
            entity.state = value.clone();
        } else if label == "Zip" && entity.zip_code.is_empty() {
            entity.zip_code = value.clone();
        } else if label.contains("Principal Name") && entity.principal_name.is_empty() {
            entity.principal_name = value.clone();
        } else if (label.contains("General Purposes") || label.contains("Nature"))
            && entity.lobbying_purposes.is_empty()
        {
            entity.lobbying_purposes = value.clone();
        }
        entity.raw_data.entry(label).or_insert(value);
    }

    entity.name = if !entity.first_name.is_empty() && !entity.last_name.is_empty() {
        format!("{} {}", entity.first_name, entity.last_name)
    } else if !entity.organization_name.is_empty() {
        entity.organization_name.clone()
    } else {
        entity.principal_name.clone()
    };

    entity.principals = collect_principals(&doc);
    Ok(entity)
}

/// Principal organizations come from any table whose `<thead>` mentions
/// "Principal", one `[name, contact]` row each. Rows with an empty name
/// are skipped.
fn collect_principals(doc: &Html) -> Vec<ParsedPrincipal> {
    let table_sel = selector("table");
    let thead_sel = selector("thead");
    let mut principals = Vec::new();
    for table in doc.select(&table_sel) {
        let Some(thead) = table.select(&thead_sel).next() else {
            continue;
        };
        if !element_text(thead).contains("Principal") {
            continue;
        }
        for row in tbody_rows(table) {
            let cells = row_cells(row);
            if cells.len() < 2 {
                continue;
            }
            let name = element_text(cells[0]);
            if name.is_empty() {
                continue;
            }
            principals.push(ParsedPrincipal {
                name,
                contact: element_text(cells[1]),
            });
        }
    }
    principals
}
