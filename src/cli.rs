use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "tocmark",
    version,
    about = "Compile plain-text tables of contents into PDF bookmarks"
)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile and validate a TOC, then print the preview.
    Check(CheckArgs),
    /// Write the pdfmark payload for a TOC.
    Payload(PayloadArgs),
    /// Save a validation report and optional JSON manifest.
    Report(ReportArgs),
    /// Attach the compiled bookmarks to a PDF with Ghostscript.
    Apply(ApplyArgs),
    /// Remove existing bookmarks from a PDF with qpdf.
    Strip(StripArgs),
    /// Report which external PDF tools are available.
    Tools(ToolsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TocInput {
    /// TOC text file, or `-` for stdin.
    #[arg(long)]
    pub toc: PathBuf,

    /// PDF page (1-based) that page 1 of the TOC refers to.
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub offset: i64,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub input: TocInput,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PayloadArgs {
    #[command(flatten)]
    pub input: TocInput,

    /// Defaults to stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Write the payload even when validation reports errors.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: TocInput,

    #[arg(long, default_value = "validation_report.txt")]
    pub output: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub input: TocInput,

    #[arg(long)]
    pub pdf: PathBuf,

    /// Defaults to `<stem>_with_bookmarks.pdf` beside the input PDF.
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub gs_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// Keep the generated pdfmarks beside the output, never replacing an existing file.
    #[arg(long, default_value_t = false)]
    pub keep_pdfmarks: bool,

    /// Kill Ghostscript after this many seconds; 0 disables the limit.
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,
}

#[derive(Args, Debug, Clone)]
pub struct StripArgs {
    #[arg(long)]
    pub pdf: PathBuf,

    /// Defaults to `<stem>_no_bookmarks.pdf` beside the input PDF.
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub qpdf_path: Option<PathBuf>,

    /// Kill qpdf after this many seconds; 0 disables the limit.
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,
}

#[derive(Args, Debug, Clone)]
pub struct ToolsArgs {
    #[arg(long)]
    pub gs_path: Option<PathBuf>,

    #[arg(long)]
    pub qpdf_path: Option<PathBuf>,
}
