//! svg2raster - SVG to PNG/JPEG/WebP through a host rendering environment.
//!
//! A conversion runs a fixed pipeline (encode → load → draw → export) on a
//! [`rendering::Host`] and reports back through a callback that fires exactly
//! once per request. [`rendering::ResvgHost`] is the native host.

pub mod bridge;
pub mod error;
pub mod models;
pub mod rendering;
pub mod services;

pub use error::{ConvertError, HostError, RasterError};
pub use models::{
    detect_format, image_header, to_label, ConvertOptions, Format, HostConfig, Label, RasterImage,
};
pub use rendering::{Host, ResvgHost};
pub use services::{Converter, Stage};
