use crate::error::RasterError;
use serde::Serialize;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: [u8; 2] = [0xFF, 0xD8];
const RIFF_SIGNATURE: [u8; 4] = *b"RIFF";
const WEBP_SIGNATURE: [u8; 4] = *b"WEBP";

/// Raster container produced by a conversion.
///
/// Always derived from the output bytes, never from the requested MIME type:
/// a host may silently substitute PNG for a type it does not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Png,
    Jpeg,
    Webp,
    Unknown,
}

impl Format {
    pub fn label(self) -> &'static str {
        match self {
            Format::Png => "png",
            Format::Jpeg => "jpeg",
            Format::Webp => "webp",
            Format::Unknown => "unknown",
        }
    }

    /// MIME type for this container, if it is a known one.
    pub fn mime_type(self) -> Option<&'static str> {
        match self {
            Format::Png => Some("image/png"),
            Format::Jpeg => Some("image/jpeg"),
            Format::Webp => Some("image/webp"),
            Format::Unknown => None,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Anything with a stable human-readable identifier.
pub trait Label {
    fn label(&self) -> &'static str;
}

impl Label for RasterError {
    fn label(&self) -> &'static str {
        RasterError::label(*self)
    }
}

impl Label for Format {
    fn label(&self) -> &'static str {
        Format::label(*self)
    }
}

pub fn to_label(value: impl Label) -> &'static str {
    value.label()
}

/// Formats `bytes[pos..pos + n]` as upper-case hex pairs separated by spaces.
///
/// The range is clipped to the buffer, so `pos >= bytes.len()` yields an
/// empty string. Example output for a PNG: `"89 50 4E 47 0D 0A 1A 0A"`.
pub fn image_header(bytes: &[u8], pos: usize, n: usize) -> String {
    let begin = pos.min(bytes.len());
    let end = pos.saturating_add(n).min(bytes.len());
    bytes[begin..end]
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sniffs the container type from fixed-offset signatures.
pub fn detect_format(bytes: &[u8]) -> Format {
    if bytes.starts_with(&PNG_SIGNATURE) {
        Format::Png
    } else if bytes.starts_with(&JPEG_SIGNATURE) {
        Format::Jpeg
    } else if bytes.starts_with(&RIFF_SIGNATURE)
        && bytes.get(8..12) == Some(&WEBP_SIGNATURE[..])
    {
        Format::Webp
    } else {
        Format::Unknown
    }
}
