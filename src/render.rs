//! pdfmark payload generation and human-readable previews.

use crate::model::{BookmarkRecord, Compilation, Diagnostic, Validation};
use crate::validator::validate;

pub const PAYLOAD_HEADER: &str = "%!PS";

const BANNER_WIDTH: usize = 60;
const RULE_WIDTH: usize = 40;
const REPORT_BANNER_WIDTH: usize = 50;
const REPORT_RULE_WIDTH: usize = 30;
const TITLE_COLUMN_WIDTH: usize = 40;

/// Escapes a title for a PostScript string literal. Backslashes go first so
/// the escapes added for parentheses are not doubled.
pub fn escape_title(title: &str) -> String {
    title
        .replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
        .replace(['\n', '\r', '\t'], " ")
        .trim()
        .to_string()
}

pub fn pdfmark_line(record: &BookmarkRecord, base_offset: i64) -> String {
    format!(
        "[ /Title ({}) /Page {} /OUT pdfmark",
        escape_title(&record.title),
        record.final_page(base_offset)
    )
}

/// `%!PS` followed by one outline pdfmark per record, in input order.
pub fn render_payload(records: &[BookmarkRecord], base_offset: i64) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(PAYLOAD_HEADER.to_string());
    lines.extend(
        records
            .iter()
            .map(|record| pdfmark_line(record, base_offset)),
    );
    lines.join("\n")
}

pub fn render_preview(records: &[BookmarkRecord], base_offset: i64) -> String {
    let validation = validate(records, base_offset);
    preview(records, base_offset, &validation.errors, &validation.warnings)
}

/// A compiled TOC together with its validation result for one base offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub compilation: Compilation,
    pub validation: Validation,
    pub base_offset: i64,
}

impl Report {
    pub fn build(compilation: Compilation, base_offset: i64) -> Self {
        let validation = validate(&compilation.records, base_offset);
        Self {
            compilation,
            validation,
            base_offset,
        }
    }

    pub fn records(&self) -> &[BookmarkRecord] {
        &self.compilation.records
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.validation.errors
    }

    /// Unparsable-line warnings from the compiler, then validator warnings.
    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.compilation
            .warnings
            .iter()
            .chain(&self.validation.warnings)
            .cloned()
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }

    pub fn render_payload(&self) -> String {
        render_payload(self.records(), self.base_offset)
    }

    pub fn render_preview(&self) -> String {
        preview(
            self.records(),
            self.base_offset,
            self.errors(),
            &self.warnings(),
        )
    }

    /// Plain-text report suitable for saving next to the TOC source.
    pub fn render_text_report(&self, source_text: &str) -> String {
        let warnings = self.warnings();
        let mut lines = vec![
            "Bookmark validation report".to_string(),
            "=".repeat(REPORT_BANNER_WIDTH),
            String::new(),
            format!("Base offset: {}", self.base_offset),
            format!("Bookmarks: {}", self.records().len()),
            String::new(),
            "Original TOC:".to_string(),
            "-".repeat(REPORT_RULE_WIDTH),
            source_text.trim_end().to_string(),
            String::new(),
            "Validation results:".to_string(),
            "-".repeat(REPORT_RULE_WIDTH),
        ];

        push_diagnostics(&mut lines, "Errors:", self.errors());
        push_diagnostics(&mut lines, "Warnings:", &warnings);
        lines.push(verdict(self.errors(), &warnings).to_string());

        let mut report = lines.join("\n");
        report.push('\n');
        report
    }
}

fn preview(
    records: &[BookmarkRecord],
    base_offset: i64,
    errors: &[Diagnostic],
    warnings: &[Diagnostic],
) -> String {
    let banner = "=".repeat(BANNER_WIDTH);
    let mut lines = vec![
        banner.clone(),
        "Bookmark preview".to_string(),
        banner.clone(),
        format!("Base offset: TOC page 1 is PDF page {base_offset}"),
        format!("Bookmarks: {}", records.len()),
        String::new(),
        "Bookmark list:".to_string(),
        "-".repeat(RULE_WIDTH),
    ];

    for (index, record) in records.iter().enumerate() {
        lines.push(listing_line(index + 1, record, base_offset));
    }

    lines.push(String::new());
    lines.push(banner.clone());
    lines.push("Generated pdfmark payload:".to_string());
    lines.push(banner.clone());
    lines.push(render_payload(records, base_offset));
    lines.push(String::new());
    lines.push(banner.clone());
    lines.push("Validation summary".to_string());
    lines.push(banner);

    push_diagnostics(&mut lines, "Errors:", errors);
    push_diagnostics(&mut lines, "Warnings:", warnings);
    lines.push(verdict(errors, warnings).to_string());

    lines.join("\n")
}

fn listing_line(index: usize, record: &BookmarkRecord, base_offset: i64) -> String {
    let offset_info = if record.offset_at_parse != 0 {
        format!(" (offset {:+})", record.offset_at_parse)
    } else {
        String::new()
    };

    format!(
        "{index:2}. {title:<width$} (adjusted page {adjusted:2} -> PDF page {final_page:2}){offset_info}",
        title = record.title,
        width = TITLE_COLUMN_WIDTH,
        adjusted = record.adjusted_page(),
        final_page = record.final_page(base_offset),
    )
}

fn push_diagnostics(lines: &mut Vec<String>, heading: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    lines.push(heading.to_string());
    lines.extend(diagnostics.iter().map(|diagnostic| format!("  • {diagnostic}")));
    lines.push(String::new());
}

fn verdict(errors: &[Diagnostic], warnings: &[Diagnostic]) -> &'static str {
    if !errors.is_empty() {
        "Validation failed: fix the errors above before generating bookmarks"
    } else if !warnings.is_empty() {
        "Validation passed with warnings"
    } else {
        "Validation passed: no issues found"
    }
}
