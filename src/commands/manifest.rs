use serde::Serialize;
use tocmark::{BookmarkRecord, Diagnostic, Report};

use crate::util::{now_utc_string, sha256_hex};

const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct ManifestBookmark {
    pub title: String,
    pub raw_page: i64,
    pub source_line: usize,
    pub offset_at_parse: i64,
    pub adjusted_page: i64,
    pub final_page: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlineManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source: String,
    pub source_sha256: String,
    pub base_offset: i64,
    pub valid: bool,
    pub bookmark_count: usize,
    pub bookmarks: Vec<ManifestBookmark>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub payload: String,
}

impl ManifestBookmark {
    fn from_record(record: &BookmarkRecord, base_offset: i64) -> Self {
        Self {
            title: record.title.clone(),
            raw_page: record.raw_page,
            source_line: record.source_line,
            offset_at_parse: record.offset_at_parse,
            adjusted_page: record.adjusted_page(),
            final_page: record.final_page(base_offset),
        }
    }
}

pub fn build_manifest(source_label: &str, source_text: &str, report: &Report) -> OutlineManifest {
    let bookmarks: Vec<ManifestBookmark> = report
        .records()
        .iter()
        .map(|record| ManifestBookmark::from_record(record, report.base_offset))
        .collect();

    OutlineManifest {
        manifest_version: MANIFEST_VERSION,
        generated_at: now_utc_string(),
        source: source_label.to_string(),
        source_sha256: sha256_hex(source_text.as_bytes()),
        base_offset: report.base_offset,
        valid: report.is_valid(),
        bookmark_count: bookmarks.len(),
        bookmarks,
        errors: report.errors().to_vec(),
        warnings: report.warnings(),
        payload: report.render_payload(),
    }
}
