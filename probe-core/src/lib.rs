//! Core library for probing media files with external analyzer tools.
//!
//! This crate combines the output of `ffprobe`, ImageMagick `identify`,
//! `file`, and `pdfinfo` into a single coherent metadata record. Any subset
//! of the tools may be missing, fail, or hang; the probe degrades to
//! whatever the remaining analyzers can report.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use probe_core::{MediaProbe, ProbeConfig};
//! use std::path::Path;
//!
//! let config = ProbeConfig::default();
//! config.validate().unwrap();
//!
//! let probe = MediaProbe::new(config);
//! let record = probe.probe(Path::new("/path/to/movie.mkv")).unwrap();
//! println!("{}", serde_json::to_string_pretty(&record).unwrap());
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod merge;
pub mod parsers;
pub mod probe;
pub mod record;
pub mod select;

// Re-exports for public API
pub use config::{ProbeConfig, DEFAULT_TOOL_TIMEOUT_SECS};
pub use error::{ProbeError, ProbeResult};
pub use external::{ToolKind, ToolResult};
pub use probe::MediaProbe;
pub use record::{
    ContainerInfo, FieldValue, PartialRecord, ProbeRecord, ToolSection, ToolStatus,
};
