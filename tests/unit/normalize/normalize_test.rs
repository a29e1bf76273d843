// Unit tests for raw-record cleanup

use gradbridge::models::RawRecord;
use gradbridge::normalize::normalize;

fn raw() -> RawRecord {
    RawRecord {
        id: Some(42),
        school: Some("Johns Hopkins University".to_string()),
        program: Some("Computer Science".to_string()),
        degree: Some("PhD".to_string()),
        date_added: Some("March 01, 2025".to_string()),
        status: Some("Accepted".to_string()),
        link: Some("https://www.thegradcafe.com/result/42".to_string()),
        semester_year: Some("Fall 2025".to_string()),
        ..RawRecord::default()
    }
}

#[test]
fn test_legacy_term_codes_expand() {
    let mut record = raw();
    record.semester_year = Some("F18".to_string());
    assert_eq!(normalize(record).term.as_deref(), Some("Fall 2018"));

    let mut record = raw();
    record.semester_year = Some("S09".to_string());
    assert_eq!(normalize(record).term.as_deref(), Some("Spring 2009"));
}

#[test]
fn test_modern_term_passes_through() {
    let mut record = raw();
    record.semester_year = Some("Fall 2022".to_string());
    assert_eq!(normalize(record).term.as_deref(), Some("Fall 2022"));
}

#[test]
fn test_unknown_legacy_prefix_passes_through() {
    let mut record = raw();
    record.semester_year = Some("W10".to_string());
    assert_eq!(normalize(record).term.as_deref(), Some("W10"));
}

#[test]
fn test_digits_stripped_from_school() {
    let mut record = raw();
    record.school = Some("Purdue University (#4 CS)".to_string());
    let canonical = normalize(record);
    assert_eq!(
        canonical.program.as_deref(),
        Some("Computer Science, Purdue University (# CS)")
    );
}

#[test]
fn test_program_requires_both_halves() {
    let mut record = raw();
    record.program = None;
    assert_eq!(normalize(record).program, None);

    let mut record = raw();
    record.school = None;
    assert_eq!(normalize(record).program, None);
}

#[test]
fn test_tag_shaped_substrings_stripped_from_comments() {
    let mut record = raw();
    record.comments = Some("Good <b>luck</b> everyone<br/>".to_string());
    assert_eq!(
        normalize(record).comments.as_deref(),
        Some("Good luck everyone")
    );
}

#[test]
fn test_missing_fields_become_none() {
    let canonical = normalize(RawRecord::default());
    assert_eq!(canonical.id, None);
    assert_eq!(canonical.program, None);
    assert_eq!(canonical.term, None);
    assert_eq!(canonical.us_or_international, None);
    assert_eq!(canonical.gpa, None);
    assert_eq!(canonical.comments, None);
}

#[test]
fn test_passthrough_fields_survive() {
    let canonical = normalize(raw());
    assert_eq!(canonical.id, Some(42));
    assert_eq!(canonical.status.as_deref(), Some("Accepted"));
    assert_eq!(canonical.date_added.as_deref(), Some("March 01, 2025"));
    assert_eq!(
        canonical.url.as_deref(),
        Some("https://www.thegradcafe.com/result/42")
    );
    assert_eq!(canonical.degree.as_deref(), Some("PhD"));
    assert_eq!(
        canonical.program.as_deref(),
        Some("Computer Science, Johns Hopkins University")
    );
}
