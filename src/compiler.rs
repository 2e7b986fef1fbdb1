//! Line-oriented TOC compiler.
//!
//! Each non-blank line is either an offset directive such as
//! `<!---offset -13--->`, which shifts every following page number, or a
//! bookmark line ending in a page number (`Title ........ 42`). Anything
//! else is reported as a warning and skipped.

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::model::{BookmarkRecord, Compilation, Diagnostic};

const DIRECTIVE_PATTERN: &str = r"<!---\s*offset\s*([+-]?\d+)\s*--->";
const BOOKMARK_PATTERN: &str = r"(.*?)\s*[.\s]*(-?\d+)\s*$";
const DIGIT_PATTERN: &str = r"^\d$";

/// Running state carried from one line to the next.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CompileState {
    pub current_offset: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Blank,
    Directive { delta: i64 },
    Bookmark(BookmarkRecord),
    Unparsable(Diagnostic),
}

#[derive(Debug, Clone)]
pub struct TocCompiler {
    directive: Regex,
    bookmark: Regex,
    digit: Regex,
}

impl TocCompiler {
    pub fn new() -> Result<Self> {
        let directive =
            Regex::new(DIRECTIVE_PATTERN).context("failed to compile offset directive regex")?;
        let bookmark =
            Regex::new(BOOKMARK_PATTERN).context("failed to compile bookmark line regex")?;
        let digit = Regex::new(DIGIT_PATTERN).context("failed to compile digit regex")?;

        Ok(Self {
            directive,
            bookmark,
            digit,
        })
    }

    pub fn compile(&self, text: &str) -> Compilation {
        let mut state = CompileState::default();
        let mut compilation = Compilation::default();

        for (index, line) in text.lines().enumerate() {
            let (next_state, outcome) = self.compile_line(state, index + 1, line);
            state = next_state;

            match outcome {
                LineOutcome::Blank | LineOutcome::Directive { .. } => {}
                LineOutcome::Bookmark(record) => compilation.records.push(record),
                LineOutcome::Unparsable(warning) => compilation.warnings.push(warning),
            }
        }

        compilation
    }

    /// Classifies one source line. Directives are tested before the
    /// bookmark pattern, so `<!---offset 2---> 40` is a directive.
    pub fn compile_line(
        &self,
        state: CompileState,
        line_number: usize,
        line: &str,
    ) -> (CompileState, LineOutcome) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return (state, LineOutcome::Blank);
        }

        if let Some(captures) = self.directive.captures(trimmed) {
            let raw_delta = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            let Ok(delta) = self.parse_number(raw_delta) else {
                return (
                    state,
                    LineOutcome::Unparsable(Diagnostic::warning(
                        format!("offset directive out of range: '{trimmed}'"),
                        Some(line_number),
                    )),
                );
            };

            let next = CompileState {
                current_offset: state.current_offset.saturating_add(delta),
            };
            debug!(
                line = line_number,
                delta,
                current_offset = next.current_offset,
                "offset directive"
            );
            return (next, LineOutcome::Directive { delta });
        }

        let Some(captures) = self.bookmark.captures(trimmed) else {
            debug!(line = line_number, "line has no trailing page number");
            return (
                state,
                LineOutcome::Unparsable(Diagnostic::warning(
                    format!("unparsable, missing page number: '{trimmed}'"),
                    Some(line_number),
                )),
            );
        };

        let title = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let raw_page = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
        let Ok(raw_page) = self.parse_number(raw_page) else {
            return (
                state,
                LineOutcome::Unparsable(Diagnostic::warning(
                    format!("unparsable, page number out of range: '{trimmed}'"),
                    Some(line_number),
                )),
            );
        };

        let record = BookmarkRecord {
            title: title.trim().to_string(),
            raw_page,
            source_line: line_number,
            offset_at_parse: state.current_offset,
        };

        (state, LineOutcome::Bookmark(record))
    }

    /// Parses a signed run of Unicode decimal digits, so `１２` and `١٢`
    /// read as 12 just like the ASCII form.
    fn parse_number(&self, raw: &str) -> Result<i64, std::num::ParseIntError> {
        let ascii: String = raw
            .chars()
            .map(|c| match c {
                '+' | '-' => c,
                _ => self.ascii_digit(c),
            })
            .collect();
        ascii.parse::<i64>()
    }

    /// Decimal digits come in contiguous blocks of ten starting at zero,
    /// so the value is the distance from the start of the run, mod 10.
    fn ascii_digit(&self, c: char) -> char {
        if c.is_ascii_digit() {
            return c;
        }

        let mut start = u32::from(c);
        while let Some(prev) = start.checked_sub(1).and_then(char::from_u32) {
            let mut buf = [0u8; 4];
            if !self.digit.is_match(prev.encode_utf8(&mut buf)) {
                break;
            }
            start -= 1;
        }

        let value = (u32::from(c) - start) % 10;
        char::from_digit(value, 10).unwrap_or(c)
    }
}

pub fn compile(text: &str) -> Result<Compilation> {
    Ok(TocCompiler::new()?.compile(text))
}
