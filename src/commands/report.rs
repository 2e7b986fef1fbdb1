use anyhow::Result;
use tracing::info;

use crate::cli::ReportArgs;
use crate::commands::load_toc;
use crate::commands::manifest::build_manifest;
use crate::util::{write_json_pretty, write_text};

pub fn run(args: ReportArgs) -> Result<()> {
    let loaded = load_toc(&args.input)?;
    let report = &loaded.report;

    write_text(&args.output, &report.render_text_report(&loaded.source))?;
    info!(path = %args.output.display(), "wrote validation report");

    if let Some(manifest_path) = &args.manifest_path {
        let manifest = build_manifest(
            &args.input.toc.display().to_string(),
            &loaded.source,
            report,
        );
        write_json_pretty(manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote outline manifest");
    }

    info!(
        valid = report.is_valid(),
        errors = report.errors().len(),
        warnings = report.warnings().len(),
        "report completed"
    );

    Ok(())
}
