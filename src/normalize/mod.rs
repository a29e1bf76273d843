//! Deterministic cleanup of scraped records.
//!
//! Total and pure: malformed or missing input fields become `None`, never an
//! error. Ingestion prefers a partial record over no record.

use crate::models::{CanonicalRecord, RawRecord};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DIGIT_PATTERN: Regex = Regex::new(r"\d").unwrap();
    static ref TAG_PATTERN: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref LEGACY_TERM_PATTERN: Regex = Regex::new(r"^[A-Za-z]\d{2}$").unwrap();
}

/// Normalize one raw record into the canonical shape.
pub fn normalize(raw: RawRecord) -> CanonicalRecord {
    let school = raw.school.map(|s| strip_digits(&s));
    let comments = raw.comments.map(|c| strip_tags(&c));
    let term = raw.semester_year.map(|t| expand_legacy_term(&t));

    // Program keeps its source pairing: only present when both halves are.
    let program = match (&raw.program, &school) {
        (Some(program), Some(school)) => Some(format!("{}, {}", program, school)),
        _ => None,
    };

    CanonicalRecord {
        id: raw.id,
        program,
        comments,
        date_added: raw.date_added,
        url: raw.link,
        status: raw.status,
        term,
        us_or_international: raw.citizenship,
        degree: raw.degree,
        gre: raw.gre,
        gre_v: raw.gre_v,
        gpa: raw.gpa,
        gre_aw: raw.gre_aw,
    }
}

/// Institution names never contain digits; years and ranks leak in from the
/// source markup.
fn strip_digits(text: &str) -> String {
    DIGIT_PATTERN.replace_all(text, "").to_string()
}

/// Remove tag-shaped substrings (`<...>`) from free text.
fn strip_tags(text: &str) -> String {
    TAG_PATTERN.replace_all(text, "").to_string()
}

/// Expand the legacy two-digit term code: `F18` -> `Fall 2018`,
/// `S09` -> `Spring 2009`. Anything else passes through unchanged.
fn expand_legacy_term(term: &str) -> String {
    if !LEGACY_TERM_PATTERN.is_match(term) {
        return term.to_string();
    }
    match term.chars().next() {
        Some('F') => format!("Fall 20{}", &term[1..]),
        Some('S') => format!("Spring 20{}", &term[1..]),
        _ => term.to_string(),
    }
}
