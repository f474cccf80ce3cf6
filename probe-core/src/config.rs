//! Configuration structures and constants for the probe-core library.
//!
//! This module provides the configuration for analyzer tool lookup and
//! invocation behavior: per-tool binary path overrides and the execution
//! timeout applied to every external tool.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ProbeError, ProbeResult};
use crate::external::ToolKind;

// Default constants

/// Default number of seconds an analyzer tool may run before it is killed.
/// External tools probing corrupt files can hang indefinitely.
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

/// Main configuration structure for the probe-core library.
///
/// Holds the filesystem locations of the four analyzer binaries and the
/// per-tool execution timeout. It is typically created by the consumer of
/// the library (e.g., probe-cli) and passed to [`MediaProbe::new`].
///
/// An unset path means "discover the tool": first a PATH lookup, then the
/// tool's well-known system location. A tool that cannot be discovered is
/// simply reported as unavailable by the probe; it never blocks one.
///
/// [`MediaProbe::new`]: crate::probe::MediaProbe::new
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Override for the `file` generic type detector binary
    pub file_path: Option<PathBuf>,

    /// Override for the `ffprobe` multimedia stream prober binary
    pub ffprobe_path: Option<PathBuf>,

    /// Override for the ImageMagick `identify` binary
    pub identify_path: Option<PathBuf>,

    /// Override for the `pdfinfo` document prober binary
    pub pdfinfo_path: Option<PathBuf>,

    /// Maximum wall-clock time one tool invocation may take
    pub tool_timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            file_path: None,
            ffprobe_path: None,
            identify_path: None,
            pdfinfo_path: None,
            tool_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
        }
    }
}

impl ProbeConfig {
    /// Validates the configuration before use.
    pub fn validate(&self) -> ProbeResult<()> {
        if self.tool_timeout.is_zero() {
            return Err(ProbeError::Config(
                "tool timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the configured override for a tool, if any.
    pub fn override_for(&self, kind: ToolKind) -> Option<&Path> {
        match kind {
            ToolKind::FileType => self.file_path.as_deref(),
            ToolKind::Ffprobe => self.ffprobe_path.as_deref(),
            ToolKind::Identify => self.identify_path.as_deref(),
            ToolKind::Pdfinfo => self.pdfinfo_path.as_deref(),
        }
    }

    /// Resolves the binary to invoke for a tool.
    ///
    /// An explicit override is trusted as-is so that callers can point at
    /// binaries outside PATH (or at test doubles). Without an override the
    /// tool is searched on PATH, then at its conventional system location.
    /// `None` means the tool is unavailable for this probe.
    pub fn resolve(&self, kind: ToolKind) -> Option<PathBuf> {
        if let Some(path) = self.override_for(kind) {
            return Some(path.to_path_buf());
        }

        if let Ok(found) = which::which(kind.binary_name()) {
            log::debug!("Found {} on PATH at {}", kind.binary_name(), found.display());
            return Some(found);
        }

        let well_known = Path::new("/usr/bin").join(kind.binary_name());
        if well_known.is_file() {
            return Some(well_known);
        }

        log::debug!("Analyzer '{}' not found", kind.binary_name());
        None
    }
}
