use std::fmt;

use serde::Serialize;

/// One outline entry recovered from a TOC line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookmarkRecord {
    pub title: String,
    /// Page number exactly as written on the line.
    pub raw_page: i64,
    /// 1-based line number in the source text.
    pub source_line: usize,
    /// Cumulative directive offset in effect when the line was parsed.
    pub offset_at_parse: i64,
}

impl BookmarkRecord {
    pub fn adjusted_page(&self) -> i64 {
        self.raw_page.saturating_add(self.offset_at_parse)
    }

    /// Zero-based PDF page index once the base offset is applied.
    pub fn final_page(&self, base_offset: i64) -> i64 {
        self.adjusted_page()
            .saturating_add(base_offset)
            .saturating_sub(1)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<usize>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, source_line: Option<usize>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            source_line,
        }
    }

    pub fn warning(message: impl Into<String>, source_line: Option<usize>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            source_line,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source_line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Output of one compiler run: records in source order plus the warnings
/// raised for lines that carried no page number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Compilation {
    pub records: Vec<BookmarkRecord>,
    pub warnings: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}
