//! Row-group parsing for survey result pages.
//!
//! Each entry spans up to three consecutive `<tr>` rows: a primary row with
//! exactly five cells, an optional metadata row of badge key/values (marked
//! by a colspan cell), and an optional free-text comment row. Rows that are
//! neither primary nor consumed as continuations are skipped one at a time.

use crate::models::RawRecord;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

const PRIMARY_CELL_COUNT: usize = 5;

fn row_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("tbody tr").expect("static 'tbody tr' selector is valid"))
}

fn cell_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("td").expect("static 'td' selector is valid"))
}

fn div_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("div").expect("static 'div' selector is valid"))
}

fn span_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("span").expect("static 'span' selector is valid"))
}

fn link_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("a[href]").expect("static 'a[href]' selector is valid"))
}

fn badge_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| {
        Selector::parse("div.tw-inline-flex").expect("static badge selector is valid")
    })
}

fn paragraph_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("p").expect("static 'p' selector is valid"))
}

/// Badge fields, in the order the classification rules assign them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeField {
    Term,
    Citizenship,
    Gpa,
    GreVerbal,
    GreQuant,
    GreWriting,
    GreTotal,
}

/// Ordered badge classification rules; first match wins.
///
/// The order is load-bearing: every GRE sub-score label also contains the
/// generic "GRE" substring, so the generic rule must come last.
const BADGE_RULES: &[(fn(&str) -> bool, BadgeField)] = &[
    (|t| t.contains("Fall") || t.contains("Spring"), BadgeField::Term),
    (
        |t| t.contains("American") || t.contains("International"),
        BadgeField::Citizenship,
    ),
    (|t| t.contains("GPA"), BadgeField::Gpa),
    (|t| t.contains("GRE V"), BadgeField::GreVerbal),
    (|t| t.contains("GRE Q"), BadgeField::GreQuant),
    (|t| t.contains("GRE AW"), BadgeField::GreWriting),
    (|t| t.contains("GRE"), BadgeField::GreTotal),
];

/// Classify one badge text against the ordered rule table.
pub fn classify_badge(text: &str) -> Option<BadgeField> {
    BADGE_RULES
        .iter()
        .find(|(matches, _)| matches(text))
        .map(|(_, field)| *field)
}

/// Parse every entry group on one page, in document order.
pub fn parse_page(html: &str, base_url_host: &str) -> Vec<RawRecord> {
    let document = Html::parse_document(html);
    let rows: Vec<ElementRef> = document.select(row_selector()).collect();

    let mut records = Vec::new();
    let mut i = 0;

    while i < rows.len() {
        let row = rows[i];
        let cells: Vec<ElementRef> = row.select(cell_selector()).collect();

        if cells.len() != PRIMARY_CELL_COUNT {
            i += 1;
            continue;
        }

        let mut record = parse_primary_row(&cells, base_url_host);
        i += 1;

        // Greedily consume up to two continuation rows. A following primary
        // row is never a continuation.
        if i < rows.len() && !is_primary_row(&rows[i]) && is_metadata_row(&rows[i]) {
            parse_metadata_row(&rows[i], &mut record);
            i += 1;
        }
        if i < rows.len() && !is_primary_row(&rows[i]) && is_comment_row(&rows[i]) {
            record.comments = Some(row_text(&rows[i]));
            i += 1;
        }

        records.push(record);
    }

    records
}

fn parse_primary_row(cells: &[ElementRef], base_url_host: &str) -> RawRecord {
    let mut record = RawRecord {
        school: non_empty(cell_text(&cells[0])),
        date_added: non_empty(cell_text(&cells[2])),
        status: non_empty(cell_text(&cells[3])),
        ..RawRecord::default()
    };

    // Program and degree live in spans inside the second cell's div.
    if let Some(div) = cells[1].select(div_selector()).next() {
        let spans: Vec<ElementRef> = div.select(span_selector()).collect();
        if let Some(first) = spans.first() {
            record.program = non_empty(element_text(first));
        }
        if let Some(second) = spans.get(1) {
            record.degree = non_empty(element_text(second));
        }
    }

    // Detail link carries the entry identifier as its trailing path segment.
    if let Some(anchor) = cells[4].select(link_selector()).next() {
        if let Some(href) = anchor.value().attr("href") {
            if !href.is_empty() {
                let link = format!("{}{}", base_url_host, href);
                record.id = parse_entry_id(&link);
                record.link = Some(link);
            }
        }
    }

    record
}

fn is_primary_row(row: &ElementRef) -> bool {
    row.select(cell_selector()).count() == PRIMARY_CELL_COUNT
}

fn is_metadata_row(row: &ElementRef) -> bool {
    let class_marker = row
        .value()
        .attr("class")
        .map(|c| c.contains("colspan"))
        .unwrap_or(false);

    class_marker
        || row
            .select(cell_selector())
            .any(|td| td.value().attr("colspan").is_some())
}

fn parse_metadata_row(row: &ElementRef, record: &mut RawRecord) {
    for badge in row.select(badge_selector()) {
        let text = element_text(&badge);
        let Some(field) = classify_badge(&text) else {
            continue;
        };

        match field {
            BadgeField::Term => record.semester_year = Some(text),
            BadgeField::Citizenship => record.citizenship = Some(text),
            BadgeField::Gpa => record.gpa = last_token(&text),
            BadgeField::GreVerbal => record.gre_v = last_token(&text),
            BadgeField::GreQuant => record.gre_q = last_token(&text),
            BadgeField::GreWriting => record.gre_aw = last_token(&text),
            BadgeField::GreTotal => record.gre = last_token(&text),
        }
    }
}

fn is_comment_row(row: &ElementRef) -> bool {
    row.select(paragraph_selector()).next().is_some()
}

/// Trailing path segment of a detail link, when numeric.
pub fn parse_entry_id(link: &str) -> Option<i64> {
    link.rsplit('/').next().and_then(|s| s.parse::<i64>().ok())
}

fn element_text(el: &ElementRef) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("")
}

fn cell_text(cell: &ElementRef) -> String {
    element_text(cell)
}

fn row_text(row: &ElementRef) -> String {
    element_text(row)
}

fn last_token(text: &str) -> Option<String> {
    text.split_whitespace().last().map(|s| s.to_string())
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
