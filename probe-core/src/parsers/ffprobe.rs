//! Parser for `ffprobe -print_format json` output.
//!
//! Extracts container-level format, duration, and bit rate, plus one record
//! per stream. The first video stream and first audio stream encountered are
//! the "primary" streams whose codec/dimensions/duration are promoted to the
//! top level; every stream survives in the tool sub-section.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::external::ToolResult;
use crate::parsers::{ParsedTool, ToolParser};
use crate::record::{fields, PartialRecord};

/// Root ffprobe response structure
#[derive(Debug, Default, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    codec_tag_string: Option<String>,
    profile: Option<String>,
    width: Option<i64>,
    height: Option<i64>,
    sample_aspect_ratio: Option<String>,
    display_aspect_ratio: Option<String>,
    pix_fmt: Option<String>,
    color_space: Option<String>,
    duration: Option<String>,
    r_frame_rate: Option<String>,
    sample_rate: Option<String>,
    sample_fmt: Option<String>,
    channels: Option<i64>,
    channel_layout: Option<String>,
    // bits_per_sample is numeric in ffprobe output; the raw variant is a string
    bits_per_sample: Option<i64>,
    bits_per_raw_sample: Option<String>,
    bit_rate: Option<String>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

impl FfprobeStream {
    fn codec(&self) -> Option<&str> {
        // Some containers only carry the four-character codec tag.
        self.codec_name
            .as_deref()
            .or(self.codec_tag_string.as_deref())
    }

    /// Stream duration in seconds.
    ///
    /// Matroska rarely sets the numeric field and instead stores a
    /// `HH:MM:SS.sss` string in the DURATION tag.
    fn duration_seconds(&self) -> Option<f64> {
        if let Some(d) = self.duration.as_deref().and_then(|d| d.parse::<f64>().ok()) {
            return Some(d);
        }
        self.tags.get("DURATION").and_then(|d| hhmmss_to_secs(d))
    }

    /// Bit depth, preferring the coded depth over the raw-sample depth.
    /// A reported depth of 0 means "unknown" and is dropped.
    fn bit_depth(&self) -> Option<i64> {
        let bits = self.bits_per_sample.or_else(|| {
            self.bits_per_raw_sample
                .as_deref()
                .and_then(|b| b.parse::<i64>().ok())
        })?;
        (bits != 0).then_some(bits)
    }
}

pub struct FfprobeParser;

impl ToolParser for FfprobeParser {
    fn parse(&self, result: &ToolResult) -> ParsedTool {
        let output: FfprobeOutput = match serde_json::from_str(&result.stdout) {
            Ok(output) => output,
            Err(e) => {
                log::debug!("Failed to parse ffprobe JSON output: {e}");
                return ParsedTool::default();
            }
        };

        let mut top = PartialRecord::new();

        if let Some(format) = &output.format {
            if let Some(name) = &format.format_name {
                top.set(fields::FORMAT, name.as_str());
            }
            if let Some(d) = format.duration.as_deref().and_then(|d| d.parse::<f64>().ok()) {
                top.set(fields::DURATION_SECONDS, d);
            }
            if let Some(b) = format.bit_rate.as_deref().and_then(|b| b.parse::<i64>().ok()) {
                top.set(fields::BIT_RATE, b);
            }
        }

        let mut streams = Vec::new();
        let mut primary_video_seen = false;
        let mut primary_audio_seen = false;

        for (index, stream) in output.streams.iter().enumerate() {
            let codec_type = stream.codec_type.as_deref().unwrap_or("data");
            let mut rec = PartialRecord::new();
            rec.set("index", index as i64);
            rec.set("type", codec_type);
            if let Some(codec) = stream.codec() {
                rec.set("codec", codec);
            }
            if let Some(d) = stream.duration_seconds() {
                rec.set("duration_seconds", d);
            }

            match codec_type {
                "video" => {
                    if let Some(w) = stream.width {
                        rec.set("width", w);
                    }
                    if let Some(h) = stream.height {
                        rec.set("height", h);
                    }
                    set_aspect_ratios(&mut rec, stream);
                    if let Some(pix_fmt) = &stream.pix_fmt {
                        rec.set("pixel_format", pix_fmt.as_str());
                    }
                    if let Some(cs) = &stream.color_space {
                        rec.set("color_space", cs.as_str());
                    }
                    if let Some(profile) = &stream.profile {
                        rec.set("codec_profile", profile.as_str());
                    }
                    if let Some(bits) = stream.bit_depth() {
                        rec.set("bits_per_sample", bits);
                    }
                    if let Some(rate) = stream.r_frame_rate.as_deref().and_then(parse_fraction) {
                        rec.set("frame_rate", round2(rate));
                    }
                    if !primary_video_seen {
                        primary_video_seen = true;
                        promote_video(&mut top, stream);
                    }
                }
                "audio" => {
                    if let Some(rate) =
                        stream.sample_rate.as_deref().and_then(|r| r.parse::<i64>().ok())
                    {
                        rec.set("sample_rate", rate);
                    }
                    if let Some(fmt) = &stream.sample_fmt {
                        rec.set("sample_format", fmt.as_str());
                    }
                    if let Some(channels) = stream.channels {
                        rec.set("channels", channels);
                    }
                    if let Some(layout) = channel_layout(stream) {
                        rec.set("channel_layout", layout);
                    }
                    if let Some(bits) = stream.bit_depth() {
                        rec.set("bits_per_sample", bits);
                    }
                    if !primary_audio_seen {
                        primary_audio_seen = true;
                        promote_audio(&mut top, stream);
                    }
                }
                _ => {}
            }

            if let Some(b) = stream.bit_rate.as_deref().and_then(|b| b.parse::<i64>().ok()) {
                rec.set("bit_rate", b);
            }

            // Container tags (titles, language, encoder notes) ride along
            // untouched under a tag: prefix.
            for (key, value) in &stream.tags {
                rec.set(&format!("tag:{key}"), value.as_str());
            }

            streams.push(rec);
        }

        // Without a container duration, fall back to the primary streams.
        if top.get(fields::DURATION_SECONDS).is_none() {
            let stream_duration = output
                .streams
                .iter()
                .filter(|s| {
                    matches!(s.codec_type.as_deref(), Some("video") | Some("audio"))
                })
                .find_map(|s| s.duration_seconds());
            if let Some(d) = stream_duration {
                top.set(fields::DURATION_SECONDS, d);
            }
        }

        ParsedTool {
            fields: top,
            streams,
        }
    }
}

/// Promotes the primary video stream's attributes to the top level.
fn promote_video(top: &mut PartialRecord, stream: &FfprobeStream) {
    if let Some(codec) = stream.codec() {
        top.set(fields::CODEC_NAME, codec);
    }
    if let Some(w) = stream.width {
        top.set(fields::WIDTH, w);
    }
    if let Some(h) = stream.height {
        top.set(fields::HEIGHT, h);
    }
    if let Some(pix_fmt) = &stream.pix_fmt {
        top.set(fields::PIXEL_FORMAT, pix_fmt.as_str());
    }
    if let Some(rate) = stream.r_frame_rate.as_deref().and_then(parse_fraction) {
        top.set(fields::FRAME_RATE, round2(rate));
    }
}

/// Promotes the primary audio stream's attributes to the top level.
///
/// The video codec outranks the audio codec for the merged `codec_name`;
/// audio-only files get theirs because no video stream ever sets it first.
fn promote_audio(top: &mut PartialRecord, stream: &FfprobeStream) {
    if top.get(fields::CODEC_NAME).is_none() {
        if let Some(codec) = stream.codec() {
            top.set(fields::CODEC_NAME, codec);
        }
    }
    if let Some(rate) = stream.sample_rate.as_deref().and_then(|r| r.parse::<i64>().ok()) {
        top.set(fields::SAMPLE_RATE, rate);
    }
    if let Some(channels) = stream.channels {
        top.set(fields::CHANNELS, channels);
    }
}

/// Records sample and display aspect ratios for a video stream.
///
/// Streams that omit the sample aspect ratio are square-pixel by
/// assumption; a missing display aspect ratio is derived from the sample
/// ratio and the frame dimensions.
fn set_aspect_ratios(rec: &mut PartialRecord, stream: &FfprobeStream) {
    let (Some(w), Some(h)) = (stream.width, stream.height) else {
        return;
    };
    if w <= 0 || h <= 0 {
        return;
    }

    let sar = stream
        .sample_aspect_ratio
        .as_deref()
        .and_then(parse_ratio)
        .map(reduce_ratio)
        .unwrap_or((1, 1));
    rec.set("sample_aspect_ratio", format_ratio(sar));

    let dar = stream
        .display_aspect_ratio
        .as_deref()
        .and_then(parse_ratio)
        .map(reduce_ratio)
        .unwrap_or_else(|| reduce_ratio((sar.0 * w, sar.1 * h)));
    rec.set("display_aspect_ratio", format_ratio(dar));
}

/// Channel layout, guessed from the channel count when the stream does not
/// carry one.
fn channel_layout(stream: &FfprobeStream) -> Option<String> {
    if let Some(layout) = &stream.channel_layout {
        return Some(layout.clone());
    }
    match stream.channels {
        Some(1) => Some("mono".to_string()),
        Some(2) => Some("stereo".to_string()),
        _ => None,
    }
}

/// Parses a ratio like "16:9" or "16/9" into a numerator/denominator pair.
fn parse_ratio(s: &str) -> Option<(i64, i64)> {
    let (num, den) = s.split_once(':').or_else(|| s.split_once('/'))?;
    let num = num.trim().parse::<i64>().ok()?;
    let den = den.trim().parse::<i64>().ok()?;
    if num <= 0 || den <= 0 {
        return None;
    }
    Some((num, den))
}

fn reduce_ratio((num, den): (i64, i64)) -> (i64, i64) {
    let d = gcd(num, den);
    if d == 0 {
        (num, den)
    } else {
        (num / d, den / d)
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn format_ratio((num, den): (i64, i64)) -> String {
    format!("{num}:{den}")
}

/// Parses an ffprobe rational like "30000/1001" (or a bare number).
fn parse_fraction(s: &str) -> Option<f64> {
    match s.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse::<f64>().ok()?;
            let den = den.trim().parse::<f64>().ok()?;
            if den == 0.0 {
                None
            } else {
                Some(num / den)
            }
        }
        None => s.trim().parse::<f64>().ok(),
    }
}

/// Parses a `HH:MM:SS.sss` duration string to seconds.
fn hhmmss_to_secs(duration: &str) -> Option<f64> {
    let parts: Vec<&str> = duration.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let hours = parts[0].trim().parse::<f64>().ok()?;
    let minutes = parts[1].trim().parse::<f64>().ok()?;
    let seconds = parts[2].trim().parse::<f64>().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
