//! Discovery of the external Ghostscript and qpdf executables.

use std::env;
use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use crate::cli::ToolsArgs;

const GHOSTSCRIPT_COMMANDS: [&str; 3] = ["gs", "gswin64c", "gswin32c"];
const QPDF_COMMANDS: [&str; 1] = ["qpdf"];
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTool {
    pub program: PathBuf,
    pub version: String,
}

pub fn run(args: ToolsArgs) -> Result<()> {
    match find_ghostscript(args.gs_path.as_deref()) {
        Ok(tool) => info!(
            program = %tool.program.display(),
            version = %tool.version,
            "ghostscript available"
        ),
        Err(err) => warn!(
            error = %err,
            "ghostscript missing (macOS: brew install ghostscript, Debian/Ubuntu: apt-get install ghostscript)"
        ),
    }

    match find_qpdf(args.qpdf_path.as_deref()) {
        Ok(tool) => info!(
            program = %tool.program.display(),
            version = %tool.version,
            "qpdf available"
        ),
        Err(err) => warn!(
            error = %err,
            "qpdf missing (macOS: brew install qpdf, Debian/Ubuntu: apt-get install qpdf)"
        ),
    }

    Ok(())
}

pub fn find_ghostscript(override_path: Option<&Path>) -> Result<ResolvedTool> {
    let mut candidates: Vec<PathBuf> = GHOSTSCRIPT_COMMANDS.iter().map(PathBuf::from).collect();
    candidates.extend(common_ghostscript_paths());
    resolve_tool("ghostscript", override_path, &candidates)
}

pub fn find_qpdf(override_path: Option<&Path>) -> Result<ResolvedTool> {
    let candidates: Vec<PathBuf> = QPDF_COMMANDS.iter().map(PathBuf::from).collect();
    resolve_tool("qpdf", override_path, &candidates)
}

/// An explicit override must work; otherwise the first candidate that
/// answers `--version` wins.
fn resolve_tool(
    name: &str,
    override_path: Option<&Path>,
    candidates: &[PathBuf],
) -> Result<ResolvedTool> {
    if let Some(program) = override_path {
        let version = command_version(program.as_os_str(), &["--version"])
            .with_context(|| format!("configured {name} path is not usable"))?;
        return Ok(ResolvedTool {
            program: program.to_path_buf(),
            version,
        });
    }

    for program in candidates {
        match command_version(program.as_os_str(), &["--version"]) {
            Ok(version) => {
                return Ok(ResolvedTool {
                    program: program.clone(),
                    version,
                });
            }
            Err(err) => debug!(program = %program.display(), error = %err, "candidate rejected"),
        }
    }

    bail!("{name} not found; install it and make sure it is on PATH")
}

pub fn command_version(program: &OsStr, args: &[&str]) -> Result<String> {
    let display = Path::new(program).display();
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to run {} {}", display, args.join(" ")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{} {} failed: {}", display, args.join(" "), stderr.trim());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let source = if stdout.trim().is_empty() {
        stderr.trim()
    } else {
        stdout.trim()
    };

    let version_line = source
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .unwrap_or("unknown");

    Ok(version_line.to_string())
}

/// `None` disables the limit.
pub fn timeout_from_secs(timeout_secs: u64) -> Option<Duration> {
    (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs))
}

/// Runs `command` to completion, killing it once `timeout` elapses.
/// Both pipes are drained on helper threads so a chatty child cannot stall.
pub fn run_with_timeout(
    mut command: Command,
    label: &str,
    timeout: Option<Duration>,
) -> Result<Output> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to execute {label}"))?;

    let stdout = child.stdout.take().map(drain_pipe);
    let stderr = child.stderr.take().map(drain_pipe);
    let started = Instant::now();

    let status = loop {
        if let Some(status) = child
            .try_wait()
            .with_context(|| format!("failed to wait for {label}"))?
        {
            break status;
        }

        if let Some(limit) = timeout {
            if started.elapsed() >= limit {
                if let Err(err) = child.kill() {
                    warn!(program = label, error = %err, "failed to kill timed out process");
                }
                let _ = child.wait();
                bail!("{label} timed out after {}s", limit.as_secs_f64());
            }
        }

        thread::sleep(POLL_INTERVAL);
    };

    Ok(Output {
        status,
        stdout: collect_pipe(stdout),
        stderr: collect_pipe(stderr),
    })
}

fn drain_pipe<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect_pipe(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

fn common_ghostscript_paths() -> Vec<PathBuf> {
    if cfg!(target_os = "windows") {
        return windows_ghostscript_paths();
    }

    let paths: &[&str] = if cfg!(target_os = "macos") {
        &["/usr/local/bin/gs", "/opt/homebrew/bin/gs", "/usr/bin/gs"]
    } else {
        &["/usr/bin/gs", "/usr/local/bin/gs", "/opt/gs/bin/gs"]
    };

    paths
        .iter()
        .map(PathBuf::from)
        .filter(|path| path.exists())
        .collect()
}

/// Expands `<Program Files>\gs\gs*\bin\<exe>` for both program directories.
fn windows_ghostscript_paths() -> Vec<PathBuf> {
    let roots = [
        env::var_os("PROGRAMFILES").unwrap_or_else(|| "C:\\Program Files".into()),
        env::var_os("PROGRAMFILES(X86)").unwrap_or_else(|| "C:\\Program Files (x86)".into()),
    ];

    let mut paths = Vec::new();
    for root in roots {
        let Ok(entries) = std::fs::read_dir(Path::new(&root).join("gs")) else {
            continue;
        };

        let mut versions: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with("gs"))
            })
            .collect();
        versions.sort();

        for version_dir in versions.iter().rev() {
            for exe in ["gswin64c.exe", "gswin32c.exe", "gs.exe"] {
                let candidate = version_dir.join("bin").join(exe);
                if candidate.exists() {
                    paths.push(candidate);
                }
            }
        }
    }

    paths
}
