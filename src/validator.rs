use tracing::debug;

use crate::model::{BookmarkRecord, Diagnostic, Validation};

const PAGE_WARN_ABOVE: i64 = 1000;
const BASE_OFFSET_WARN_ABOVE: i64 = 1000;
const TITLE_WARN_CHARS: usize = 100;
const ESCAPED_CHARS: [char; 3] = ['(', ')', '\\'];

/// Runs the record and whole-set checks against `base_offset`, the PDF page
/// (1-based) that page 1 of the TOC refers to.
pub fn validate(records: &[BookmarkRecord], base_offset: i64) -> Validation {
    let mut validation = Validation::default();

    for record in records {
        check_page(record, base_offset, &mut validation);
        check_title(record, &mut validation);
    }

    if records.len() > 1 && !is_non_decreasing(records) {
        validation.warnings.push(Diagnostic::warning(
            "page order not monotonic, consider sorting",
            None,
        ));
    }

    if base_offset < 1 {
        validation.errors.push(Diagnostic::error(
            format!("base offset below 1 invalid ({base_offset})"),
            None,
        ));
    } else if base_offset > BASE_OFFSET_WARN_ABOVE {
        validation.warnings.push(Diagnostic::warning(
            format!("base offset unusually large ({base_offset})"),
            None,
        ));
    }

    debug!(
        records = records.len(),
        base_offset,
        errors = validation.errors.len(),
        warnings = validation.warnings.len(),
        "validation finished"
    );

    validation
}

fn check_page(record: &BookmarkRecord, base_offset: i64, validation: &mut Validation) {
    let line = Some(record.source_line);
    let adjusted = record.adjusted_page();
    let final_page = record.final_page(base_offset);

    if adjusted == 0 {
        validation
            .errors
            .push(Diagnostic::error(format!("page number is zero ({adjusted})"), line));
    } else if final_page < 0 {
        validation.errors.push(Diagnostic::error(
            format!("resulting PDF page is negative ({adjusted} -> {final_page})"),
            line,
        ));
    } else if final_page > PAGE_WARN_ABOVE {
        validation.warnings.push(Diagnostic::warning(
            format!("resulting PDF page unusually large ({adjusted} -> {final_page})"),
            line,
        ));
    }
}

fn check_title(record: &BookmarkRecord, validation: &mut Validation) {
    let line = Some(record.source_line);
    let title = record.title.trim();
    let char_count = record.title.chars().count();

    if title.is_empty() {
        validation
            .errors
            .push(Diagnostic::error("title is empty", line));
    } else if char_count > TITLE_WARN_CHARS {
        validation.warnings.push(Diagnostic::warning(
            format!("title unusually long ({char_count} characters)"),
            line,
        ));
    }

    let special: Vec<String> = record
        .title
        .chars()
        .filter(|ch| ESCAPED_CHARS.contains(ch))
        .map(String::from)
        .collect();
    if !special.is_empty() {
        validation.warnings.push(Diagnostic::warning(
            format!(
                "title contains characters that need escaping: {}",
                special.join(" ")
            ),
            line,
        ));
    }
}

fn is_non_decreasing(records: &[BookmarkRecord]) -> bool {
    records
        .windows(2)
        .all(|pair| pair[0].adjusted_page() <= pair[1].adjusted_page())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;

    fn record(title: &str, raw_page: i64, offset_at_parse: i64) -> BookmarkRecord {
        BookmarkRecord {
            title: title.to_string(),
            raw_page,
            source_line: 1,
            offset_at_parse,
        }
    }

    #[test]
    fn empty_records_with_base_offset_one_are_vacuously_valid() {
        let validation = validate(&[], 1);

        assert!(validation.is_valid());
        assert!(validation.errors.is_empty());
        assert!(validation.warnings.is_empty());
    }

    #[test]
    fn zero_page_reports_exactly_one_error() {
        let validation = validate(&[record("Cover", 0, 0)], 1);

        assert_eq!(validation.errors.len(), 1);
        assert!(validation.errors[0].message.contains("zero"));
        assert_eq!(validation.errors[0].severity, Severity::Error);
        assert!(validation.warnings.is_empty());
    }

    #[test]
    fn zero_page_from_offset_cancellation_is_still_zero() {
        let validation = validate(&[record("Preface", 13, -13)], 20);

        assert_eq!(validation.errors.len(), 1);
        assert!(validation.errors[0].message.contains("zero"));
    }

    #[test]
    fn negative_final_page_is_an_error() {
        let validation = validate(&[record("Intro", -3, 0)], 1);

        assert_eq!(validation.errors.len(), 1);
        assert_eq!(
            validation.errors[0].message,
            "resulting PDF page is negative (-3 -> -3)"
        );
    }

    #[test]
    fn negative_adjusted_page_can_be_rescued_by_base_offset() {
        let validation = validate(&[record("Preface", 5, -13)], 12);

        assert!(validation.is_valid());
    }

    #[test]
    fn large_final_page_is_only_a_warning() {
        let validation = validate(&[record("Index", 1001, 0)], 2);

        assert!(validation.is_valid());
        assert_eq!(validation.warnings.len(), 1);
        assert!(validation.warnings[0].message.contains("unusually large"));
    }

    #[test]
    fn final_page_warning_starts_above_one_thousand() {
        let at_limit = validate(&[record("Index", 1000, 0)], 1);
        assert!(at_limit.is_valid());
        assert!(at_limit.warnings.is_empty());

        let past_limit = validate(&[record("Index", 1001, 0)], 1);
        assert!(past_limit.is_valid());
        assert_eq!(past_limit.warnings.len(), 1);
        assert_eq!(
            past_limit.warnings[0].message,
            "resulting PDF page unusually large (1001 -> 1001)"
        );
    }

    #[test]
    fn empty_title_is_an_error() {
        let validation = validate(&[record("   ", 4, 0)], 1);

        assert_eq!(validation.errors.len(), 1);
        assert_eq!(validation.errors[0].message, "title is empty");
    }

    #[test]
    fn long_title_counts_characters_not_bytes() {
        let exactly_limit = "é".repeat(100);
        let over_limit = "é".repeat(101);

        assert!(validate(&[record(&exactly_limit, 1, 0)], 1).warnings.is_empty());

        let validation = validate(&[record(&over_limit, 1, 0)], 1);
        assert_eq!(validation.warnings.len(), 1);
        assert!(validation.warnings[0].message.contains("101 characters"));
    }

    #[test]
    fn special_characters_are_listed_in_order() {
        let validation = validate(&[record(r"Boundary (C:\path)", 3, 0)], 1);

        assert!(validation.is_valid());
        assert_eq!(validation.warnings.len(), 1);
        assert_eq!(
            validation.warnings[0].message,
            r"title contains characters that need escaping: ( \ )"
        );
    }

    #[test]
    fn out_of_order_pages_warn_once() {
        let records = vec![
            record("A", 10, 0),
            record("B", 4, 0),
            record("C", 2, 0),
        ];
        let validation = validate(&records, 1);

        assert!(validation.is_valid());
        assert_eq!(validation.warnings.len(), 1);
        assert!(validation.warnings[0].message.contains("not monotonic"));
    }

    #[test]
    fn repeated_pages_are_still_monotonic() {
        let records = vec![record("Notes", 18, 0), record("Exercises", 18, 0)];

        assert!(validate(&records, 1).warnings.is_empty());
    }

    #[test]
    fn base_offset_bounds() {
        let below = validate(&[], 0);
        assert_eq!(below.errors.len(), 1);
        assert!(below.errors[0].message.contains("below 1"));

        let at_limit = validate(&[], 1000);
        assert!(at_limit.is_valid());
        assert!(at_limit.warnings.is_empty());

        let above = validate(&[], 1001);
        assert!(above.is_valid());
        assert_eq!(above.warnings.len(), 1);
        assert!(above.warnings[0].message.contains("unusually large"));
    }

    #[test]
    fn record_diagnostics_carry_source_line() {
        let mut bad = record("", 0, 0);
        bad.source_line = 7;

        let validation = validate(&[bad], 1);
        assert_eq!(validation.errors.len(), 2);
        assert!(
            validation
                .errors
                .iter()
                .all(|error| error.source_line == Some(7))
        );
    }
}
