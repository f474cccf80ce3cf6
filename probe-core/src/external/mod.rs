//! External analyzer tool invocation.
//!
//! This module runs the four analyzer binaries (`file`, `ffprobe`,
//! `identify`, `pdfinfo`) against an input file and captures their output.
//! Tool problems never propagate as errors: a missing binary, a non-zero
//! exit, and a hung process all degrade to a flagged [`ToolResult`] that the
//! orchestrator records and moves past.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::record::ToolStatus;

/// Poll interval while waiting on a running tool.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The fixed set of external analyzer tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Generic type detector (`file`)
    FileType,
    /// Multimedia stream prober (`ffprobe`)
    Ffprobe,
    /// Image prober (ImageMagick `identify`)
    Identify,
    /// Document prober (`pdfinfo`)
    Pdfinfo,
}

impl ToolKind {
    /// The three format-specific tools, in merge precedence order.
    pub const FORMAT_SPECIFIC: [ToolKind; 3] =
        [ToolKind::Ffprobe, ToolKind::Identify, ToolKind::Pdfinfo];

    /// Name of the executable on disk.
    pub fn binary_name(&self) -> &'static str {
        match self {
            ToolKind::FileType => "file",
            ToolKind::Ffprobe => "ffprobe",
            ToolKind::Identify => "identify",
            ToolKind::Pdfinfo => "pdfinfo",
        }
    }

    /// Key used for this tool's sub-section in the final record.
    pub fn section_name(&self) -> &'static str {
        match self {
            ToolKind::FileType => "file",
            ToolKind::Ffprobe => "ffprobe",
            ToolKind::Identify => "identify",
            ToolKind::Pdfinfo => "pdfinfo",
        }
    }

    /// Arguments placed before the input path.
    ///
    /// `ffprobe` is asked for JSON; the others only speak their native
    /// textual formats.
    pub fn args(&self) -> &'static [&'static str] {
        match self {
            ToolKind::FileType => &["--brief", "--mime-type", "--dereference"],
            ToolKind::Ffprobe => &[
                "-v",
                "0",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ],
            ToolKind::Identify => &[],
            ToolKind::Pdfinfo => &[],
        }
    }
}

/// Captured output of one analyzer invocation.
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub status: ToolStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolResult {
    pub fn unavailable() -> Self {
        ToolResult {
            status: ToolStatus::Unavailable,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    fn failed(stdout: String, stderr: String) -> Self {
        ToolResult {
            status: ToolStatus::Failed,
            stdout,
            stderr,
        }
    }
}

/// Runs an analyzer binary against the input file with a bounded execution
/// time.
///
/// The child is polled until it exits or the timeout expires; on expiry it
/// is killed and the invocation is reported as `Failed` with a timeout
/// diagnostic. Stdout and stderr are drained on separate threads so a
/// chatty tool cannot deadlock on a full pipe.
pub fn run_tool(binary: &Path, kind: ToolKind, input: &Path, timeout: Duration) -> ToolResult {
    let mut cmd = Command::new(binary);
    cmd.args(kind.args())
        .arg(input)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    log::debug!(
        "Running {} ({}) on: {}",
        kind.binary_name(),
        binary.display(),
        input.display()
    );

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        // A path that does not resolve to an executable (absent, or present
        // without execute permission) means the analyzer is unavailable.
        Err(e)
            if matches!(
                e.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied
            ) =>
        {
            log::debug!(
                "Analyzer binary {} not found or not executable",
                binary.display()
            );
            return ToolResult::unavailable();
        }
        Err(e) => {
            log::warn!("Failed to start {}: {}", binary.display(), e);
            return ToolResult::failed(String::new(), format!("failed to start: {e}"));
        }
    };

    // Drain pipes concurrently with the wait loop.
    let mut stdout_pipe = child.stdout.take();
    let mut stderr_pipe = child.stderr.take();
    let stdout_handle = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(pipe) = stdout_pipe.as_mut() {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    });
    let stderr_handle = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(pipe) = stderr_pipe.as_mut() {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    });

    // Wait for the process with a deadline.
    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    log::warn!(
                        "{} timed out after {}s on {}",
                        kind.binary_name(),
                        timeout.as_secs(),
                        input.display()
                    );
                    // The reader threads are left to finish on their own:
                    // a killed tool's grandchildren may hold the pipes open
                    // arbitrarily long, so joining here could hang.
                    return ToolResult::failed(
                        String::new(),
                        format!(
                            "{} timed out after {} seconds",
                            kind.binary_name(),
                            timeout.as_secs()
                        ),
                    );
                }
                std::thread::sleep(WAIT_POLL_INTERVAL);
            }
            Err(e) => {
                log::warn!("Error waiting for {}: {}", kind.binary_name(), e);
                let _ = child.kill();
                let _ = child.wait();
                return ToolResult::failed(String::new(), format!("wait failed: {e}"));
            }
        }
    };

    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();

    if !status.success() {
        log::warn!(
            "{} exited with {} on {}",
            kind.binary_name(),
            status.code().map_or_else(|| "signal".to_string(), |c| c.to_string()),
            input.display()
        );
        return ToolResult::failed(stdout, stderr);
    }

    ToolResult {
        status: ToolStatus::Ok,
        stdout,
        stderr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn one_second() -> Duration {
        Duration::from_secs(1)
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let result = run_tool(
            Path::new("/nonexistent/analyzer-binary"),
            ToolKind::Pdfinfo,
            Path::new("/tmp/whatever"),
            one_second(),
        );
        assert_eq!(result.status, ToolStatus::Unavailable);
    }

    #[test]
    fn test_non_executable_binary_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("identify");
        std::fs::write(&binary, "#!/bin/sh\n").unwrap();
        // Default permissions: readable but not executable.
        let result = run_tool(
            &binary,
            ToolKind::Identify,
            Path::new("/tmp/whatever"),
            one_second(),
        );
        assert_eq!(result.status, ToolStatus::Unavailable);
    }

    #[test]
    fn test_successful_invocation_captures_stdout() {
        // pdfinfo takes no extra args, so echo just prints the "input".
        let result = run_tool(
            Path::new("/bin/echo"),
            ToolKind::Pdfinfo,
            Path::new("hello"),
            one_second(),
        );
        assert_eq!(result.status, ToolStatus::Ok);
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[test]
    fn test_nonzero_exit_is_failed() {
        let false_bin = ["/bin/false", "/usr/bin/false"]
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
            .expect("false binary");
        let result = run_tool(
            &false_bin,
            ToolKind::Pdfinfo,
            Path::new("/tmp/whatever"),
            one_second(),
        );
        assert_eq!(result.status, ToolStatus::Failed);
    }

    #[test]
    fn test_hanging_tool_times_out() {
        let sleep_bin = ["/bin/sleep", "/usr/bin/sleep"]
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
            .expect("sleep binary");
        let start = Instant::now();
        // pdfinfo takes no extra args, so this runs "sleep 30".
        let result = run_tool(
            &sleep_bin,
            ToolKind::Pdfinfo,
            Path::new("30"),
            one_second(),
        );
        assert_eq!(result.status, ToolStatus::Failed);
        assert!(result.stderr.contains("timed out"));
        assert!(start.elapsed() < Duration::from_secs(10));
    }
}
