use super::format::{detect_format, image_header, Format};

/// Owned copy of a conversion result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub bytes: Vec<u8>,
    /// Sniffed from `bytes`, not taken from the requested MIME type
    pub format: Format,
}

impl RasterImage {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let format = detect_format(&bytes);
        Self { bytes, format }
    }

    pub fn header(&self, n: usize) -> String {
        image_header(&self.bytes, 0, n)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
