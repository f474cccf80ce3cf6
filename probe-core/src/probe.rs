//! Probe orchestration: the top-level entry point of the library.
//!
//! A probe is a linear pipeline: validate the input, run the generic type
//! detector, select the applicable format-specific tools, invoke them
//! concurrently, parse what succeeded, and merge everything into one
//! [`ProbeRecord`]. The only fatal condition is a missing or unreadable
//! input file; every tool-level problem degrades to a flagged section in
//! the record.

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::config::ProbeConfig;
use crate::error::{ProbeError, ProbeResult};
use crate::external::{run_tool, ToolKind, ToolResult};
use crate::merge::merge;
use crate::parsers::{parser_for, ParsedTool};
use crate::record::{
    fields, ContainerInfo, FieldValue, PartialRecord, ProbeRecord, ToolSection, ToolStatus,
};

/// Media file prober.
///
/// Stateless apart from its configuration: a single instance may probe
/// different files from multiple threads concurrently.
pub struct MediaProbe {
    config: ProbeConfig,
}

impl MediaProbe {
    pub fn new(config: ProbeConfig) -> Self {
        MediaProbe { config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Probes a file and returns its normalized metadata record.
    ///
    /// Fails only when the input file is missing or not a regular file.
    /// Analyzer availability determines completeness, never success.
    pub fn probe(&self, input: &Path) -> ProbeResult<ProbeRecord> {
        // Init: the input must be an existing regular file.
        let metadata = std::fs::metadata(input).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProbeError::InputNotFound(input.display().to_string())
            } else {
                ProbeError::Io(e)
            }
        })?;
        if !metadata.is_file() {
            return Err(ProbeError::InputNotFound(format!(
                "{} is not a regular file",
                input.display()
            )));
        }
        // Readability is part of the fatal contract: a permission problem
        // surfaces here, not as four analyzers all failing to open the file.
        std::fs::File::open(input)?;
        let container = container_info(input, &metadata);

        // Detect: the generic type detector runs first, unconditionally.
        let detect_result = self.invoke(ToolKind::FileType, input);
        let detect_parsed = parse_if_ok(ToolKind::FileType, input, &detect_result);
        let mime = detect_parsed
            .fields
            .get(fields::MIME_TYPE)
            .and_then(|v| match v {
                FieldValue::Text(s) => Some(s.clone()),
                _ => None,
            });

        // Select: mime-driven when the detector answered, extension
        // heuristics otherwise.
        let selected = crate::select::select_tools(mime.as_deref(), input);
        log::debug!(
            "Probing {} with {:?} (mime: {:?})",
            input.display(),
            selected.iter().map(|t| t.binary_name()).collect::<Vec<_>>(),
            mime
        );

        // Probe: independent invocations, joined before parsing. A tool
        // that fails or hangs cannot affect the others.
        let results: Vec<(ToolKind, ToolResult)> = selected
            .par_iter()
            .map(|&kind| (kind, self.invoke(kind, input)))
            .collect();

        // Parse + Merge: generic detector first, format-specific tools
        // after, so the specific tools win field collisions.
        let parsed: Vec<(ToolKind, ParsedTool, &ToolResult)> = results
            .iter()
            .map(|(kind, result)| (*kind, parse_if_ok(*kind, input, result), result))
            .collect();

        let mut ordered: Vec<&PartialRecord> = Vec::with_capacity(parsed.len() + 1);
        ordered.push(&detect_parsed.fields);
        ordered.extend(parsed.iter().map(|(_, p, _)| &p.fields));
        let mut merged = merge(&ordered);

        let mut tools = BTreeMap::new();
        tools.insert(
            ToolKind::FileType.section_name().to_string(),
            section(&detect_result, detect_parsed),
        );
        for (kind, parsed_tool, result) in parsed {
            tools.insert(kind.section_name().to_string(), section(result, parsed_tool));
        }

        if tools.values().all(|s| s.status == ToolStatus::Unavailable) {
            log::warn!("No analyzer tool available for {}", input.display());
            merged.set(fields::PROBE_NOTE, "no analyzer available");
        }

        Ok(ProbeRecord {
            container,
            fields: merged,
            tools,
        })
    }

    /// Resolves and runs one tool; an unresolvable tool is unavailable.
    fn invoke(&self, kind: ToolKind, input: &Path) -> ToolResult {
        match self.config.resolve(kind) {
            Some(binary) => run_tool(&binary, kind, input, self.config.tool_timeout),
            None => ToolResult::unavailable(),
        }
    }
}

/// Parses a tool's output when it succeeded; anything else contributes an
/// empty record.
fn parse_if_ok(kind: ToolKind, input: &Path, result: &ToolResult) -> ParsedTool {
    if result.status != ToolStatus::Ok {
        return ParsedTool::default();
    }
    parser_for(kind, input).parse(result)
}

/// Builds the per-tool sub-section, keeping diagnostics for failed tools.
fn section(result: &ToolResult, parsed: ParsedTool) -> ToolSection {
    let diagnostic = match result.status {
        ToolStatus::Failed => {
            let text = if result.stderr.trim().is_empty() {
                result.stdout.trim()
            } else {
                result.stderr.trim()
            };
            (!text.is_empty()).then(|| text.to_string())
        }
        _ => None,
    };
    ToolSection {
        status: result.status,
        fields: parsed.fields,
        streams: parsed.streams,
        diagnostic,
    }
}

/// File-level facts that require no analyzer tool.
fn container_info(input: &Path, metadata: &std::fs::Metadata) -> ContainerInfo {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    let modified_secs = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs());
    ContainerInfo {
        name,
        size_bytes: metadata.len(),
        modified_secs,
    }
}
