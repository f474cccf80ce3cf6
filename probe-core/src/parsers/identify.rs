//! Parser for ImageMagick `identify` output.
//!
//! Default `identify` output is line-oriented, one line per frame:
//!
//! ```text
//! rose.jpg JPEG 70x46 70x46+0+0 8-bit sRGB 25.1KB 0.000u 0:00.000
//! anim.gif[0] GIF 300x200 300x200+0+0 8-bit sRGB 256c 12KB 0.000u 0:00.000
//! ```
//!
//! Multi-frame files (animations, multi-page TIFFs) emit one line per frame;
//! the first frame's geometry is promoted to the top level and the frame
//! count is reported alongside.

use crate::external::ToolResult;
use crate::parsers::{ParsedTool, ToolParser};
use crate::record::{fields, PartialRecord};

pub struct IdentifyParser;

impl ToolParser for IdentifyParser {
    fn parse(&self, result: &ToolResult) -> ParsedTool {
        let mut frames = Vec::new();

        for line in result.stdout.lines() {
            if let Some(frame) = parse_frame_line(line, frames.len() as i64) {
                frames.push(frame);
            } else if !line.trim().is_empty() {
                log::debug!("Skipping unrecognized identify line: {line:?}");
            }
        }

        let mut top = PartialRecord::new();
        if let Some(first) = frames.first() {
            for (field, key) in [
                (fields::FORMAT, "format"),
                (fields::WIDTH, "width"),
                (fields::HEIGHT, "height"),
                (fields::BIT_DEPTH, "bit_depth"),
                (fields::COLORSPACE, "colorspace"),
            ] {
                if let Some(value) = first.get(key) {
                    top.set(field, value.clone());
                }
            }
            top.set(fields::FRAME_COUNT, frames.len() as i64);
        }

        ParsedTool {
            fields: top,
            streams: frames,
        }
    }
}

/// Parses one identify output line into a frame record.
///
/// The filename may contain spaces (even `WxH`-shaped words), so the line
/// is anchored on the geometry token that is followed by the canvas
/// geometry (`WxH+X+Y`): the format token sits directly before it, depth
/// and colorspace after. Lines without a canvas token fall back to the
/// first bare `WxH` token.
fn parse_frame_line(line: &str, index: i64) -> Option<PartialRecord> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let geom_pos = (0..tokens.len().saturating_sub(1))
        .find(|&i| parse_geometry(tokens[i]).is_some() && is_canvas_geometry(tokens[i + 1]))
        .or_else(|| tokens.iter().position(|t| parse_geometry(t).is_some()))?;
    let (width, height) = parse_geometry(tokens[geom_pos])?;

    let mut frame = PartialRecord::new();
    frame.set("index", index);
    frame.set("width", width);
    frame.set("height", height);

    if geom_pos > 0 {
        frame.set("format", tokens[geom_pos - 1].to_ascii_lowercase());
    }

    // Remaining tokens: canvas geometry, then "N-bit", then colorspace.
    let mut rest = tokens[geom_pos + 1..].iter();
    for token in rest.by_ref() {
        if let Some(depth) = token.strip_suffix("-bit") {
            if let Ok(depth) = depth.parse::<i64>() {
                frame.set("bit_depth", depth);
            }
            break;
        }
    }
    if let Some(colorspace) = rest.next() {
        frame.set("colorspace", colorspace.to_ascii_lowercase());
    }

    Some(frame)
}

/// Recognizes a canvas geometry token (`WxH+X+Y`).
fn is_canvas_geometry(token: &str) -> bool {
    token
        .split_once('+')
        .is_some_and(|(geom, _)| parse_geometry(geom).is_some())
}

/// Parses a `WIDTHxHEIGHT` geometry token.
fn parse_geometry(token: &str) -> Option<(i64, i64)> {
    let (w, h) = token.split_once('x')?;
    let width = w.parse::<i64>().ok()?;
    let height = h.parse::<i64>().ok()?;
    Some((width, height))
}
