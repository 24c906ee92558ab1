//! Assertion helpers for tests.

use pretty_assertions::assert_eq;
use svg2raster::{detect_format, Format, RasterError};

use super::Outcome;

/// Assert a callback reported success with bytes of the given format
pub fn assert_success<M>(outcome: &Outcome<M>, format: Format) {
    assert_eq!(outcome.error, RasterError::None);
    assert!(!outcome.bytes.is_empty(), "Expected raster bytes");
    assert_eq!(
        detect_format(&outcome.bytes),
        format,
        "Unexpected header {}",
        svg2raster::image_header(&outcome.bytes, 0, 12)
    );
}

/// Assert a callback reported `error` with an empty byte view
pub fn assert_failure<M>(outcome: &Outcome<M>, error: RasterError) {
    assert_eq!(outcome.error, error);
    assert!(
        outcome.bytes.is_empty(),
        "Failure carried {} bytes",
        outcome.bytes.len()
    );
}

/// Decode raster bytes and return their pixel dimensions
pub fn raster_size(bytes: &[u8]) -> (u32, u32) {
    use image::GenericImageView;
    image::load_from_memory(bytes)
        .expect("output should decode")
        .dimensions()
}
