use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Image extensions rendered inline by the presentation layer
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Video extensions offered as playable attachments
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];

/// Audio extensions offered as playable attachments
pub const AUDIO_EXTENSIONS: &[&str] = &["opus", "mp3", "wav"];

fn attachment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<attached: (.*?)>").unwrap())
}

/// Strip export artifacts from a raw transcript line.
///
/// Narrow no-break space (U+202F) and no-break space (U+00A0) become regular
/// spaces; the left-to-right mark (U+200E) is removed. These characters are
/// artifacts of the export format, not message content.
pub fn normalize_line(line: &str) -> String {
    line.chars()
        .filter_map(|c| match c {
            '\u{202f}' | '\u{a0}' => Some(' '),
            '\u{200e}' => None,
            other => Some(other),
        })
        .collect()
}

/// Broad media classification by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    /// Unrecognized extension; rendered as a plain file link
    Other,
}

impl MediaKind {
    /// Classify a file name by its extension (ASCII case-insensitive).
    pub fn from_file_name(file_name: &str) -> Self {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Image
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Video
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Audio
        } else {
            MediaKind::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Other => "file",
        }
    }
}

/// Reference to an attached media file embedded in a message body.
///
/// Carries the file name only; existence and type resolution are the
/// rendering layer's responsibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub file_name: String,
}

impl MediaRef {
    pub fn kind(&self) -> MediaKind {
        MediaKind::from_file_name(&self.file_name)
    }
}

/// A single parsed transcript entry.
///
/// Sealed entries are immutable; the parser appends continuation lines only
/// while an entry is still open.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub timestamp: NaiveDateTime,
    pub sender: String,
    pub body: String,
}

impl Entry {
    pub fn new(timestamp: NaiveDateTime, sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self { timestamp, sender: sender.into(), body: body.into() }
    }

    /// Calendar date of this entry, used for date-boundary separators
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Append a continuation line to the body with a newline separator
    pub(crate) fn push_line(&mut self, line: &str) {
        self.body.push('\n');
        self.body.push_str(line);
    }

    /// Extract the first `<attached: FILENAME>` marker from the body, if any
    pub fn media_reference(&self) -> Option<MediaRef> {
        attachment_regex()
            .captures(&self.body)
            .map(|caps| MediaRef { file_name: caps[1].to_string() })
    }
}
