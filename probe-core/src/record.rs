//! Metadata record types shared across the probing pipeline.
//!
//! Parsers emit sparse `PartialRecord`s, the merge engine folds them into a
//! single field map, and the orchestrator wraps everything into the final
//! `ProbeRecord` returned to callers and serialized by the CLI.

use serde::Serialize;
use std::collections::BTreeMap;

/// Canonical metadata field names.
///
/// Every parser writes into this fixed vocabulary so that overlapping tools
/// collide on the same key and can be resolved by merge precedence.
pub mod fields {
    pub const FORMAT: &str = "format";
    pub const MIME_TYPE: &str = "mime_type";
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
    pub const DURATION_SECONDS: &str = "duration_seconds";
    pub const CODEC_NAME: &str = "codec_name";
    pub const BIT_RATE: &str = "bit_rate";
    pub const BIT_DEPTH: &str = "bit_depth";
    pub const FRAME_RATE: &str = "frame_rate";
    pub const FRAME_COUNT: &str = "frame_count";
    pub const PIXEL_FORMAT: &str = "pixel_format";
    pub const COLORSPACE: &str = "colorspace";
    pub const SAMPLE_RATE: &str = "sample_rate";
    pub const CHANNELS: &str = "channels";
    pub const PAGE_COUNT: &str = "page_count";
    pub const PAGE_SIZE: &str = "page_size";
    pub const PDF_VERSION: &str = "pdf_version";
    pub const PRODUCER: &str = "producer";
    pub const CREATOR: &str = "creator";
    pub const CREATION_DATE: &str = "creation_date";
    pub const PROBE_NOTE: &str = "probe_note";
}

/// A single typed metadata value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl FieldValue {
    /// An empty text value carries no information and must never displace
    /// a previously set value during merging.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

/// Sparse field map contributed by one parser.
///
/// Field order is stable (sorted by name) so serialized output is
/// deterministic across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartialRecord(BTreeMap<String, FieldValue>);

impl PartialRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, ignoring empty text values.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        let value = value.into();
        if value.is_empty() {
            log::debug!("Ignoring empty value for field '{name}'");
            return;
        }
        self.0.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }
}

/// Status of one analyzer invocation, as recorded in the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    /// Tool ran and exited zero
    Ok,
    /// Tool ran but exited non-zero or timed out
    Failed,
    /// Tool binary could not be located
    Unavailable,
}

/// Per-tool sub-section of the final record.
///
/// Preserves everything a tool reported, whether or not the merged top
/// level promoted it. Failed tools keep their diagnostic output here.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSection {
    pub status: ToolStatus,
    #[serde(skip_serializing_if = "PartialRecord::is_empty")]
    pub fields: PartialRecord,
    /// Stream- or frame-level detail (every ffprobe stream, every
    /// identify frame), beyond the primary entries promoted to `fields`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub streams: Vec<PartialRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

/// File-level facts gathered without any analyzer tool.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerInfo {
    /// Base name of the probed file
    pub name: String,
    /// Size in bytes
    pub size_bytes: u64,
    /// Modification time as seconds since the Unix epoch, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_secs: Option<u64>,
}

/// The final merged, normalized metadata result for one file.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeRecord {
    pub container: ContainerInfo,
    /// Merged top-level fields, one resolved value per field
    pub fields: PartialRecord,
    /// Per-tool sub-sections keyed by tool name
    pub tools: BTreeMap<String, ToolSection>,
}
