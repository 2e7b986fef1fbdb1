pub mod apply;
pub mod check;
pub mod manifest;
pub mod payload;
pub mod report;
pub mod strip;
pub mod tools;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tocmark::{Report, TocCompiler};
use tracing::{info, warn};

use crate::cli::TocInput;
use crate::util::read_text_input;

/// Source text plus its compiled and validated report.
pub struct LoadedToc {
    pub source: String,
    pub report: Report,
}

pub fn load_toc(input: &TocInput) -> Result<LoadedToc> {
    let source = read_text_input(&input.toc)?;
    let compiler = TocCompiler::new()?;
    let report = Report::build(compiler.compile(&source), input.offset);

    info!(
        toc = %input.toc.display(),
        base_offset = input.offset,
        bookmarks = report.records().len(),
        errors = report.errors().len(),
        warnings = report.warnings().len(),
        "compiled TOC"
    );

    Ok(LoadedToc { source, report })
}

/// Refuses to continue when validation failed or nothing was parsed,
/// unless the caller asked to force output.
pub fn ensure_usable(report: &Report, toc: &Path, force: bool) -> Result<()> {
    for error in report.errors() {
        warn!(error = %error, "validation error");
    }

    if force {
        return Ok(());
    }

    if report.records().is_empty() {
        bail!(
            "no bookmarks could be parsed from {}; check the TOC format",
            toc.display()
        );
    }

    if !report.is_valid() {
        bail!(
            "validation failed with {} error(s); fix them or rerun with --force",
            report.errors().len()
        );
    }

    Ok(())
}

/// Checks that `path` names an existing, non-empty regular file.
pub fn check_input_pdf(path: &Path) -> Result<u64> {
    if !path.exists() {
        bail!("PDF file does not exist: {}", path.display());
    }

    let metadata =
        fs::metadata(path).with_context(|| format!("failed to inspect {}", path.display()))?;
    if !metadata.is_file() {
        bail!("PDF path is not a file: {}", path.display());
    }
    if metadata.len() == 0 {
        bail!("PDF file is empty, it may be damaged: {}", path.display());
    }

    Ok(metadata.len())
}

/// Refuses an output path that resolves to the input file itself.
pub fn ensure_distinct_output(input: &Path, output: &Path) -> Result<()> {
    let input_canon = fs::canonicalize(input)
        .with_context(|| format!("failed to resolve {}", input.display()))?;

    if fs::canonicalize(output).is_ok_and(|output_canon| output_canon == input_canon) {
        bail!(
            "output {} would overwrite the input PDF; choose another --output",
            output.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn input_for(path: PathBuf, offset: i64) -> TocInput {
        TocInput { toc: path, offset }
    }

    #[test]
    fn load_toc_compiles_file_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("toc.txt");
        fs::write(&path, "Preface 1\n<!---offset +2--->\nBody 3\n").expect("write toc");

        let loaded = load_toc(&input_for(path, 5)).expect("load");

        assert_eq!(loaded.report.records().len(), 2);
        assert_eq!(loaded.report.records()[1].adjusted_page(), 5);
        assert_eq!(loaded.report.base_offset, 5);
        assert!(loaded.source.starts_with("Preface 1"));
    }

    #[test]
    fn ensure_usable_gates_on_errors_unless_forced() {
        let toc = Path::new("toc.txt");
        let invalid = Report::build(tocmark::compile("Intro -3").expect("compile"), 1);
        let empty = Report::build(tocmark::compile("").expect("compile"), 1);

        let err = ensure_usable(&invalid, toc, false).expect_err("errors should block");
        assert!(err.to_string().contains("1 error(s)"));
        assert!(ensure_usable(&invalid, toc, true).is_ok());

        let err = ensure_usable(&empty, toc, false).expect_err("empty should block");
        assert!(err.to_string().contains("no bookmarks"));
    }

    #[test]
    fn check_input_pdf_rejects_missing_directory_and_empty_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.pdf");
        let empty = dir.path().join("empty.pdf");
        let real = dir.path().join("book.pdf");
        fs::write(&empty, b"").expect("write empty");
        fs::write(&real, b"%PDF-1.7\n").expect("write pdf");

        assert!(check_input_pdf(&missing).is_err());
        assert!(check_input_pdf(dir.path()).is_err());
        assert!(check_input_pdf(&empty).is_err());
        assert_eq!(check_input_pdf(&real).expect("real pdf"), 9);
    }

    #[test]
    fn ensure_distinct_output_sees_through_path_spelling() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pdf = dir.path().join("book.pdf");
        fs::write(&pdf, b"%PDF-1.7\n").expect("write pdf");

        let same = dir.path().join("sub").join("..").join("book.pdf");
        fs::create_dir(dir.path().join("sub")).expect("mkdir");
        let err = ensure_distinct_output(&pdf, &same).expect_err("same file should fail");
        assert!(err.to_string().contains("would overwrite the input PDF"));

        assert!(ensure_distinct_output(&pdf, &dir.path().join("book_out.pdf")).is_ok());
    }
}
