use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::cli::ApplyArgs;
use crate::commands::tools::{find_ghostscript, run_with_timeout, timeout_from_secs};
use crate::commands::{check_input_pdf, ensure_distinct_output, ensure_usable, load_toc};
use crate::util::{ensure_directory, sibling_path};

pub fn run(args: ApplyArgs) -> Result<()> {
    let pdf_size = check_input_pdf(&args.pdf)?;
    debug!(pdf = %args.pdf.display(), size_bytes = pdf_size, "input PDF checked");

    let output_pdf = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.pdf));
    ensure_distinct_output(&args.pdf, &output_pdf)?;

    let loaded = load_toc(&args.input)?;
    ensure_usable(&loaded.report, &args.input.toc, args.force)?;

    let ghostscript = find_ghostscript(args.gs_path.as_deref())?;
    info!(
        program = %ghostscript.program.display(),
        version = %ghostscript.version,
        "using ghostscript"
    );

    let output_dir = output_directory(&output_pdf);
    ensure_directory(&output_dir)?;

    let mut pdfmarks = tempfile::Builder::new()
        .prefix(".tocmark-")
        .suffix(".pdfmarks")
        .tempfile_in(&output_dir)
        .with_context(|| format!("failed to create pdfmarks file in {}", output_dir.display()))?;
    writeln!(pdfmarks, "{}", loaded.report.render_payload())
        .and_then(|()| pdfmarks.flush())
        .with_context(|| format!("failed to write {}", pdfmarks.path().display()))?;

    let gs_args = ghostscript_args(&args.pdf, &output_pdf, pdfmarks.path());
    debug!(
        program = %ghostscript.program.display(),
        args = ?gs_args,
        "running ghostscript"
    );
    let mut command = Command::new(&ghostscript.program);
    command.args(&gs_args);
    let result = run_with_timeout(command, "ghostscript", timeout_from_secs(args.timeout_secs));

    if args.keep_pdfmarks {
        keep_pdfmarks(pdfmarks, &sibling_path(&output_pdf, "", "pdfmarks"));
    }

    let output = result?;
    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "ghostscript exited with {} for {}: {}",
            output.status,
            args.pdf.display(),
            if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            }
        );
    }

    info!(
        output = %output_pdf.display(),
        bookmarks = loaded.report.records().len(),
        "bookmarks applied"
    );

    Ok(())
}

pub fn default_output_path(pdf: &Path) -> PathBuf {
    sibling_path(pdf, "_with_bookmarks", "pdf")
}

fn output_directory(output_pdf: &Path) -> PathBuf {
    match output_pdf.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Moves the temporary pdfmarks file to `target`, never replacing an
/// existing file there.
fn keep_pdfmarks(pdfmarks: NamedTempFile, target: &Path) {
    match pdfmarks.persist_noclobber(target) {
        Ok(_) => info!(path = %target.display(), "kept pdfmarks file"),
        Err(err) => warn!(
            path = %target.display(),
            error = %err.error,
            "pdfmarks file not kept"
        ),
    }
}

/// Arguments for a pdfwrite pass that replays `pdfmarks` over `input`.
pub fn ghostscript_args(input: &Path, output: &Path, pdfmarks: &Path) -> Vec<OsString> {
    let mut output_flag = OsString::from("-sOutputFile=");
    output_flag.push(output);

    vec![
        "-dBATCH".into(),
        "-dNOPAUSE".into(),
        "-q".into(),
        "-sDEVICE=pdfwrite".into(),
        output_flag,
        input.into(),
        "-f".into(),
        pdfmarks.into(),
    ]
}
