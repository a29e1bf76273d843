// Unit tests for survey page parsing and badge classification

use crate::common::{survey_page, EntryFixture};
use gradbridge::source::parser::{classify_badge, parse_entry_id, parse_page, BadgeField};

const HOST: &str = "https://www.thegradcafe.com";

#[test]
fn test_full_entry_extraction() {
    let entry = EntryFixture::new(50)
        .with_badges(&["Fall 2025", "International", "GPA 3.75", "GRE 321"])
        .with_comment("Great program, heard back fast");
    let html = survey_page(&[entry]);

    let records = parse_page(&html, HOST);
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.id, Some(50));
    assert_eq!(record.school.as_deref(), Some("Johns Hopkins University"));
    assert_eq!(record.program.as_deref(), Some("Computer Science"));
    assert_eq!(record.degree.as_deref(), Some("Masters"));
    assert_eq!(record.date_added.as_deref(), Some("March 01, 2025"));
    assert_eq!(record.status.as_deref(), Some("Accepted on 1 Mar"));
    assert_eq!(
        record.link.as_deref(),
        Some("https://www.thegradcafe.com/result/50")
    );
    assert_eq!(record.semester_year.as_deref(), Some("Fall 2025"));
    assert_eq!(record.citizenship.as_deref(), Some("International"));
    assert_eq!(record.gpa.as_deref(), Some("3.75"));
    assert_eq!(record.gre.as_deref(), Some("321"));
    assert_eq!(
        record.comments.as_deref(),
        Some("Great program, heard back fast")
    );
}

#[test]
fn test_entry_without_continuation_rows() {
    let html = survey_page(&[EntryFixture::new(7)]);

    let records = parse_page(&html, HOST);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, Some(7));
    assert_eq!(records[0].semester_year, None);
    assert_eq!(records[0].gpa, None);
    assert_eq!(records[0].comments, None);
}

#[test]
fn test_consecutive_primary_rows_are_not_continuations() {
    let html = survey_page(&[EntryFixture::new(3), EntryFixture::new(2)]);

    let records = parse_page(&html, HOST);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, Some(3));
    assert_eq!(records[1].id, Some(2));
}

#[test]
fn test_non_primary_rows_are_skipped() {
    let entries = survey_page(&[EntryFixture::new(10)]);
    // Splice an ad row with the wrong cell count between tbody open and the
    // first entry.
    let html = entries.replace(
        "<tbody>",
        "<tbody><tr><td>sponsored</td><td>link</td></tr>",
    );

    let records = parse_page(&html, HOST);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, Some(10));
}

#[test]
fn test_unparseable_link_suffix_gives_no_id() {
    let entry = EntryFixture::new(0).with_link_suffix("see-more");
    let html = survey_page(&[entry]);

    let records = parse_page(&html, HOST);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, None);
    assert_eq!(
        records[0].link.as_deref(),
        Some("https://www.thegradcafe.com/result/see-more")
    );
}

#[test]
fn test_badge_values_take_last_token() {
    let entry = EntryFixture::new(5).with_badges(&["GPA 3.90", "GRE AW 4.5", "GRE V 158"]);
    let html = survey_page(&[entry]);

    let record = &parse_page(&html, HOST)[0];
    assert_eq!(record.gpa.as_deref(), Some("3.90"));
    assert_eq!(record.gre_aw.as_deref(), Some("4.5"));
    assert_eq!(record.gre_v.as_deref(), Some("158"));
}

#[test]
fn test_badge_classification_priority_order() {
    // Sub-score labels contain the generic "GRE" substring; the ordered rule
    // table must route them before the generic rule.
    assert_eq!(classify_badge("GRE V 160"), Some(BadgeField::GreVerbal));
    assert_eq!(classify_badge("GRE Q 165"), Some(BadgeField::GreQuant));
    assert_eq!(classify_badge("GRE AW 4.0"), Some(BadgeField::GreWriting));
    assert_eq!(classify_badge("GRE 325"), Some(BadgeField::GreTotal));

    assert_eq!(classify_badge("Fall 2025"), Some(BadgeField::Term));
    assert_eq!(classify_badge("Spring 2024"), Some(BadgeField::Term));
    assert_eq!(classify_badge("American"), Some(BadgeField::Citizenship));
    assert_eq!(
        classify_badge("International"),
        Some(BadgeField::Citizenship)
    );
    assert_eq!(classify_badge("GPA 3.50"), Some(BadgeField::Gpa));

    assert_eq!(classify_badge("Interview"), None);
}

#[test]
fn test_school_text_is_not_cleaned_at_parse_time() {
    // Digit stripping belongs to the normalizer, not the parser.
    let entry = EntryFixture::new(9).with_school("Purdue University (#4 CS)");
    let html = survey_page(&[entry]);

    let records = parse_page(&html, HOST);
    assert_eq!(
        records[0].school.as_deref(),
        Some("Purdue University (#4 CS)")
    );
}

#[test]
fn test_parse_entry_id() {
    assert_eq!(
        parse_entry_id("https://www.thegradcafe.com/result/123456"),
        Some(123456)
    );
    assert_eq!(parse_entry_id("https://www.thegradcafe.com/result/abc"), None);
    assert_eq!(parse_entry_id(""), None);
}
