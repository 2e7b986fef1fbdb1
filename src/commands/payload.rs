use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use tocmark::Report;
use tracing::info;

use crate::cli::PayloadArgs;
use crate::commands::{ensure_usable, load_toc};
use crate::util::write_text;

pub fn run(args: PayloadArgs) -> Result<()> {
    let loaded = load_toc(&args.input)?;
    ensure_usable(&loaded.report, &args.input.toc, args.force)?;

    match &args.output {
        Some(path) => write_payload_file(path, &loaded.report)?,
        None => {
            let mut output = io::BufWriter::new(io::stdout().lock());
            writeln!(output, "{}", loaded.report.render_payload())?;
            output.flush()?;
        }
    }

    Ok(())
}

pub fn write_payload_file(path: &Path, report: &Report) -> Result<()> {
    let mut payload = report.render_payload();
    payload.push('\n');
    write_text(path, &payload)?;

    info!(
        path = %path.display(),
        bookmarks = report.records().len(),
        "wrote pdfmark payload"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::cli::TocInput;

    #[test]
    fn payload_file_is_written_when_valid() {
        let dir = tempfile::tempdir().expect("tempdir");
        let toc = dir.path().join("toc.txt");
        let output = dir.path().join("out").join("bookmarks.pdfmarks");
        fs::write(&toc, "Chapter 1 ......... 5\n<!---offset +10--->\nChapter 2 15\n")
            .expect("write toc");

        run(PayloadArgs {
            input: TocInput {
                toc,
                offset: 1,
            },
            output: Some(output.clone()),
            force: false,
        })
        .expect("payload should be written");

        assert_eq!(
            fs::read_to_string(&output).expect("read payload"),
            "%!PS\n[ /Title (Chapter 1) /Page 5 /OUT pdfmark\n[ /Title (Chapter 2) /Page 25 /OUT pdfmark\n"
        );
    }

    #[test]
    fn invalid_toc_is_refused_without_force() {
        let dir = tempfile::tempdir().expect("tempdir");
        let toc = dir.path().join("toc.txt");
        let output = dir.path().join("bookmarks.pdfmarks");
        fs::write(&toc, "Cover 0\n").expect("write toc");

        let args = PayloadArgs {
            input: TocInput {
                toc,
                offset: 1,
            },
            output: Some(output.clone()),
            force: false,
        };

        assert!(run(args.clone()).is_err());
        assert!(!output.exists());

        run(PayloadArgs {
            force: true,
            ..args
        })
        .expect("forced payload");
        assert!(
            fs::read_to_string(&output)
                .expect("read payload")
                .contains("[ /Title (Cover) /Page 0 /OUT pdfmark")
        );
    }
}
