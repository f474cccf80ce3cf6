//! Format-specific parsers for analyzer tool output.
//!
//! Each analyzer gets one parser behind the common [`ToolParser`] trait.
//! Parsers are best-effort: output that does not match the expected shape
//! degrades to a partial or empty record, never to an error.

use std::path::Path;

use crate::external::{ToolKind, ToolResult};
use crate::record::PartialRecord;

pub mod ffprobe;
pub mod file_type;
pub mod identify;
pub mod pdfinfo;

/// Parsed output of one tool: the fields promoted toward the merged top
/// level, plus stream/frame-level detail preserved in the tool's
/// sub-section of the final record.
#[derive(Debug, Clone, Default)]
pub struct ParsedTool {
    pub fields: PartialRecord,
    pub streams: Vec<PartialRecord>,
}

/// The capability "produce a PartialRecord from a ToolResult".
pub trait ToolParser {
    fn parse(&self, result: &ToolResult) -> ParsedTool;
}

/// Returns the parser for a tool.
///
/// The generic type parser needs the input path for its extension-based
/// mime refinements; the others are stateless.
pub fn parser_for(kind: ToolKind, input: &Path) -> Box<dyn ToolParser> {
    match kind {
        ToolKind::FileType => Box::new(file_type::FileTypeParser::new(input)),
        ToolKind::Ffprobe => Box::new(ffprobe::FfprobeParser),
        ToolKind::Identify => Box::new(identify::IdentifyParser),
        ToolKind::Pdfinfo => Box::new(pdfinfo::PdfinfoParser),
    }
}
