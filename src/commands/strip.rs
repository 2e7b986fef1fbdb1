use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Result, bail};
use tracing::{debug, info};

use crate::cli::StripArgs;
use crate::commands::tools::{find_qpdf, run_with_timeout, timeout_from_secs};
use crate::commands::{check_input_pdf, ensure_distinct_output};
use crate::util::sibling_path;

pub fn run(args: StripArgs) -> Result<()> {
    check_input_pdf(&args.pdf)?;

    let output_pdf = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.pdf));
    ensure_distinct_output(&args.pdf, &output_pdf)?;

    let qpdf = find_qpdf(args.qpdf_path.as_deref())?;
    info!(program = %qpdf.program.display(), version = %qpdf.version, "using qpdf");

    let qpdf_args = qpdf_args(&args.pdf, &output_pdf);
    debug!(program = %qpdf.program.display(), args = ?qpdf_args, "running qpdf");

    let mut command = Command::new(&qpdf.program);
    command.args(&qpdf_args);
    let output = run_with_timeout(command, "qpdf", timeout_from_secs(args.timeout_secs))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "qpdf exited with {} for {}: {}",
            output.status,
            args.pdf.display(),
            stderr.trim()
        );
    }

    info!(
        input = %args.pdf.display(),
        output = %output_pdf.display(),
        "existing bookmarks removed"
    );

    Ok(())
}

pub fn default_output_path(pdf: &Path) -> PathBuf {
    sibling_path(pdf, "_no_bookmarks", "pdf")
}

/// Rebuilds the document from its pages only, which drops the outline.
pub fn qpdf_args(input: &Path, output: &Path) -> Vec<OsString> {
    vec![
        "--empty".into(),
        "--pages".into(),
        input.into(),
        "1-z".into(),
        "--".into(),
        output.into(),
    ]
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn output_equal_to_input_is_refused_before_qpdf_lookup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pdf = dir.path().join("book.pdf");
        fs::write(&pdf, b"%PDF-1.7\n").expect("write pdf");

        let err = run(StripArgs {
            pdf: pdf.clone(),
            output: Some(pdf.clone()),
            qpdf_path: Some(dir.path().join("missing-qpdf")),
            timeout_secs: 120,
        })
        .expect_err("overwriting the input should fail");

        assert!(err.to_string().contains("would overwrite the input PDF"));
        assert_eq!(fs::read(&pdf).expect("read pdf"), b"%PDF-1.7\n");
    }

    #[test]
    fn qpdf_args_copy_every_page_into_empty_document() {
        let args = qpdf_args(Path::new("in.pdf"), Path::new("in_no_bookmarks.pdf"));
        let rendered: Vec<String> = args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            rendered,
            vec!["--empty", "--pages", "in.pdf", "1-z", "--", "in_no_bookmarks.pdf"]
        );
    }

    #[test]
    fn default_output_sits_beside_input() {
        assert_eq!(
            default_output_path(Path::new("docs/book.pdf")),
            PathBuf::from("docs/book_no_bookmarks.pdf")
        );
    }
}
