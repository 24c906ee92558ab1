//! Test fixtures and constants.

/// 40x30 red rectangle
pub const RED_RECT: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="30">
  <rect width="40" height="30" fill="red"/>
</svg>"#;

/// 300x300 rounded square with a circle
pub const ROUNDED_SQUARE: &str = r#"<svg width="300" height="300" xmlns="http://www.w3.org/2000/svg">
  <rect width="300" height="300" x="0" y="0" rx="40" ry="40" fill="lavender"/>
  <circle cx="150" cy="150" r="60" fill="pink" stroke="blue"/>
</svg>"#;

/// Not SVG at all
pub const NOT_SVG: &str = "this is not markup";

/// Truncated document
pub const TRUNCATED_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10""#;

/// Bytes that are not valid UTF-8
pub const INVALID_UTF8: &[u8] = &[b'<', b's', b'v', b'g', 0xFF, 0xFE, b'>'];

pub const PNG_SIGNATURE: &str = "89 50 4E 47 0D 0A 1A 0A";
