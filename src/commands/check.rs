use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::CheckArgs;
use crate::commands::manifest::build_manifest;
use crate::commands::{LoadedToc, load_toc};

pub fn run(args: CheckArgs) -> Result<()> {
    let loaded = load_toc(&args.input)?;
    let rendered = render_check(&args, &loaded)?;

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "{rendered}")?;
    output.flush()?;

    let report = &loaded.report;
    if !report.is_valid() {
        bail!(
            "validation failed with {} error(s)",
            report.errors().len()
        );
    }

    info!(
        bookmarks = report.records().len(),
        warnings = report.warnings().len(),
        "validation passed"
    );

    Ok(())
}

/// The preview text, or the JSON manifest with `--json`.
fn render_check(args: &CheckArgs, loaded: &LoadedToc) -> Result<String> {
    if !args.json {
        return Ok(loaded.report.render_preview());
    }

    let manifest = build_manifest(
        &args.input.toc.display().to_string(),
        &loaded.source,
        &loaded.report,
    );
    serde_json::to_string_pretty(&manifest).context("failed to serialize check json output")
}
