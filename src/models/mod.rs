pub mod config;
pub mod format;
pub mod raster;
pub mod request;

pub use config::HostConfig;
pub use format::{detect_format, image_header, to_label, Format, Label};
pub use raster::RasterImage;
pub use request::{ConversionRequest, ConvertOptions, DrawTarget};
