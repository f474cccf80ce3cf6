//! Applicability selection: which format-specific tools are worth invoking.
//!
//! The generic detector's mime type drives selection. When the detector is
//! unavailable the file extension is the fallback signal, and when that is
//! inconclusive too, every format-specific tool is invoked speculatively
//! (empty results are discarded by the merge).

use std::path::Path;

use crate::external::ToolKind;

/// Coarse classification of the input derived from its mime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaClass {
    Image,
    /// Audio or video container or raw stream
    TimeBased,
    /// PDF document
    Document,
    Other,
}

/// Classifies a mime type string.
pub fn classify(mime: &str) -> MediaClass {
    if mime.starts_with("image/") {
        MediaClass::Image
    } else if mime.starts_with("audio/") || mime.starts_with("video/") {
        MediaClass::TimeBased
    } else if mime == "application/pdf" {
        MediaClass::Document
    } else {
        MediaClass::Other
    }
}

/// Selects the format-specific tools to invoke.
///
/// With a mime type available the mapping is direct. The `.mkv` extension
/// additionally routes to ffprobe regardless of the detected type, because
/// detectors commonly report Matroska containers under non-media types.
pub fn select_tools(mime: Option<&str>, input: &Path) -> Vec<ToolKind> {
    let mut selected = match mime {
        Some(mime) => match classify(mime) {
            MediaClass::Image => vec![ToolKind::Identify],
            MediaClass::TimeBased => vec![ToolKind::Ffprobe],
            MediaClass::Document => vec![ToolKind::Pdfinfo],
            MediaClass::Other => Vec::new(),
        },
        None => select_by_extension(input),
    };

    if has_extension(input, "mkv") && !selected.contains(&ToolKind::Ffprobe) {
        selected.insert(0, ToolKind::Ffprobe);
    }

    selected
}

/// Extension-based heuristics for when the generic detector is unavailable.
///
/// An unknown extension selects everything; the per-tool results sort out
/// which analyzer actually understood the file.
fn select_by_extension(input: &Path) -> Vec<ToolKind> {
    const IMAGE_EXTS: &[&str] = &["jpg", "jpeg", "png", "gif", "tif", "tiff", "bmp", "webp"];
    const TIME_BASED_EXTS: &[&str] = &[
        "mp4", "m4v", "mov", "avi", "webm", "mpg", "mpeg", "ts", "mp3", "m4a", "wav", "flac",
        "ogg", "opus",
    ];

    let Some(ext) = input.extension().and_then(|e| e.to_str()) else {
        log::debug!("No extension on {}; selecting all analyzers", input.display());
        return ToolKind::FORMAT_SPECIFIC.to_vec();
    };
    let ext = ext.to_ascii_lowercase();

    if IMAGE_EXTS.contains(&ext.as_str()) {
        vec![ToolKind::Identify]
    } else if TIME_BASED_EXTS.contains(&ext.as_str()) || ext == "mkv" {
        vec![ToolKind::Ffprobe]
    } else if ext == "pdf" {
        vec![ToolKind::Pdfinfo]
    } else {
        log::debug!("Unknown extension '.{ext}'; selecting all analyzers");
        ToolKind::FORMAT_SPECIFIC.to_vec()
    }
}

fn has_extension(input: &Path, wanted: &str) -> bool {
    input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_mime_types() {
        assert_eq!(classify("image/png"), MediaClass::Image);
        assert_eq!(classify("audio/flac"), MediaClass::TimeBased);
        assert_eq!(classify("video/mp4"), MediaClass::TimeBased);
        assert_eq!(classify("application/pdf"), MediaClass::Document);
        assert_eq!(classify("application/zip"), MediaClass::Other);
        assert_eq!(classify("text/plain"), MediaClass::Other);
    }

    #[test]
    fn test_mime_driven_selection() {
        let p = Path::new("/tmp/file.bin");
        assert_eq!(select_tools(Some("image/jpeg"), p), vec![ToolKind::Identify]);
        assert_eq!(select_tools(Some("video/mp4"), p), vec![ToolKind::Ffprobe]);
        assert_eq!(
            select_tools(Some("application/pdf"), p),
            vec![ToolKind::Pdfinfo]
        );
        assert!(select_tools(Some("application/zip"), p).is_empty());
    }

    #[test]
    fn test_mkv_extension_special_case() {
        // Matroska routed to ffprobe even when the detector says otherwise.
        let p = Path::new("/tmp/video.mkv");
        assert_eq!(
            select_tools(Some("application/octet-stream"), p),
            vec![ToolKind::Ffprobe]
        );
        // No duplicate when the mime already selected ffprobe.
        assert_eq!(select_tools(Some("video/x-matroska"), p), vec![ToolKind::Ffprobe]);
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(
            select_tools(None, Path::new("/tmp/photo.JPG")),
            vec![ToolKind::Identify]
        );
        assert_eq!(
            select_tools(None, Path::new("/tmp/song.flac")),
            vec![ToolKind::Ffprobe]
        );
        assert_eq!(
            select_tools(None, Path::new("/tmp/doc.pdf")),
            vec![ToolKind::Pdfinfo]
        );
    }

    #[test]
    fn test_inconclusive_selects_all() {
        assert_eq!(
            select_tools(None, Path::new("/tmp/mystery.dat")),
            ToolKind::FORMAT_SPECIFIC.to_vec()
        );
        assert_eq!(
            select_tools(None, Path::new("/tmp/no_extension")),
            ToolKind::FORMAT_SPECIFIC.to_vec()
        );
    }
}
