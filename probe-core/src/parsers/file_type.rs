//! Parser for the `file` generic type detector.
//!
//! `file --brief --mime-type` prints a single line such as `image/jpeg`.

use std::path::{Path, PathBuf};

use crate::external::ToolResult;
use crate::parsers::{ParsedTool, ToolParser};
use crate::record::{fields, PartialRecord};

pub struct FileTypeParser {
    input: PathBuf,
}

impl FileTypeParser {
    pub fn new(input: &Path) -> Self {
        FileTypeParser {
            input: input.to_path_buf(),
        }
    }
}

impl ToolParser for FileTypeParser {
    fn parse(&self, result: &ToolResult) -> ParsedTool {
        let mut fields_out = PartialRecord::new();

        let mime = result
            .stdout
            .lines()
            .next()
            .map(str::trim)
            .unwrap_or_default();
        if mime.is_empty() || !mime.contains('/') {
            log::debug!("Unrecognized file-type detector output: {:?}", result.stdout);
            return ParsedTool::default();
        }

        let mime = refine_mime(&self.input, mime);
        fields_out.set(fields::MIME_TYPE, mime);

        ParsedTool {
            fields: fields_out,
            streams: Vec::new(),
        }
    }
}

/// Corrects detector results that are known to be too coarse.
///
/// YAML files carry no magic bytes and come back as plain text, so the
/// extension is the better signal there. MPEG program streams share their
/// leading bytes with Targa images and get misdetected as `image/x-tga`;
/// a media extension on a "targa" file is the stronger signal.
fn refine_mime(input: &Path, mime: &str) -> String {
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    if mime == "text/plain" && matches!(ext.as_deref(), Some("yaml") | Some("yml")) {
        return "application/x-yaml".to_string();
    }
    if mime == "image/x-tga"
        && matches!(
            ext.as_deref(),
            Some("mpg") | Some("mpeg") | Some("m2p") | Some("vob")
        )
    {
        return "video/mpeg".to_string();
    }
    mime.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FieldValue, ToolStatus};

    fn ok_result(stdout: &str) -> ToolResult {
        ToolResult {
            status: ToolStatus::Ok,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    #[test]
    fn test_extracts_mime_type() {
        let parser = FileTypeParser::new(Path::new("/tmp/photo.jpg"));
        let parsed = parser.parse(&ok_result("image/jpeg\n"));
        assert_eq!(
            parsed.fields.get(fields::MIME_TYPE),
            Some(&FieldValue::Text("image/jpeg".into()))
        );
    }

    #[test]
    fn test_garbage_output_degrades_to_empty() {
        let parser = FileTypeParser::new(Path::new("/tmp/x"));
        assert!(parser.parse(&ok_result("not a mime type")).fields.is_empty());
        assert!(parser.parse(&ok_result("")).fields.is_empty());
    }

    #[test]
    fn test_yaml_refinement() {
        let parser = FileTypeParser::new(Path::new("/tmp/config.yaml"));
        let parsed = parser.parse(&ok_result("text/plain\n"));
        assert_eq!(
            parsed.fields.get(fields::MIME_TYPE),
            Some(&FieldValue::Text("application/x-yaml".into()))
        );

        // Non-yaml plain text is left alone.
        let parser = FileTypeParser::new(Path::new("/tmp/notes.txt"));
        let parsed = parser.parse(&ok_result("text/plain\n"));
        assert_eq!(
            parsed.fields.get(fields::MIME_TYPE),
            Some(&FieldValue::Text("text/plain".into()))
        );
    }

    #[test]
    fn test_targa_refinement() {
        // MPEG program streams misdetected as targa images.
        let parser = FileTypeParser::new(Path::new("/tmp/capture.mpg"));
        let parsed = parser.parse(&ok_result("image/x-tga\n"));
        assert_eq!(
            parsed.fields.get(fields::MIME_TYPE),
            Some(&FieldValue::Text("video/mpeg".into()))
        );

        // An actual targa file keeps its detected type.
        let parser = FileTypeParser::new(Path::new("/tmp/texture.tga"));
        let parsed = parser.parse(&ok_result("image/x-tga\n"));
        assert_eq!(
            parsed.fields.get(fields::MIME_TYPE),
            Some(&FieldValue::Text("image/x-tga".into()))
        );
    }
}
